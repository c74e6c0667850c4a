/*!
Structs to hold configuration data and global variables.

Configuration comes from an optional TOML file; every key is optional and
falls back to the value in `Cfg::default()`:

```toml
db_path = "bd_instituto.db"
host = "127.0.0.1"
port = 5000
templates_dir = "templates"
static_dir = "static"
session_secure = false
session_idle_minutes = 120
```
*/
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::{inter, store::Store};

#[derive(Deserialize)]
struct ConfigFile {
    db_path: Option<String>,
    host: Option<String>,
    port: Option<u16>,
    templates_dir: Option<String>,
    static_dir: Option<String>,
    session_secure: Option<bool>,
    session_idle_minutes: Option<i64>,
}

#[derive(Debug)]
pub struct Cfg {
    pub db_path: PathBuf,
    pub addr: SocketAddr,
    pub templates_dir: PathBuf,
    pub static_dir: PathBuf,
    /// Whether the session cookie gets the `Secure` attribute.
    pub session_secure: bool,
    /// Sessions expire after this long without a request. `None` means the
    /// cookie lasts as long as the browser session.
    pub session_idle_minutes: Option<i64>,
}

impl std::default::Default for Cfg {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("bd_instituto.db"),
            addr: SocketAddr::from(([127, 0, 0, 1], 5000)),
            templates_dir: PathBuf::from("templates"),
            static_dir: PathBuf::from("static"),
            session_secure: false,
            session_idle_minutes: None,
        }
    }
}

impl Cfg {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let path = path.as_ref();
        let file_contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Unable to read config file: {}", &e))?;
        Cfg::from_toml(&file_contents)
    }

    pub fn from_toml(text: &str) -> Result<Self, String> {
        let cf: ConfigFile = toml::from_str(text)
            .map_err(|e| format!("Unable to deserialize config file: {}", &e))?;

        let mut c = Self::default();

        if let Some(s) = cf.db_path {
            c.db_path = PathBuf::from(s);
        }
        if let Some(s) = cf.host {
            c.addr.set_ip(
                s.parse().map_err(|e| format!(
                    "Error parsing {:?} as IP address: {}",
                    &s, &e
                ))?
            );
        }
        if let Some(n) = cf.port {
            c.addr.set_port(n);
        }
        if let Some(s) = cf.templates_dir {
            c.templates_dir = PathBuf::from(s);
        }
        if let Some(s) = cf.static_dir {
            c.static_dir = PathBuf::from(s);
        }
        if let Some(b) = cf.session_secure {
            c.session_secure = b;
        }
        if let Some(n) = cf.session_idle_minutes {
            if n <= 0 {
                return Err(format!(
                    "session_idle_minutes must be positive (got {}).", n
                ));
            }
            c.session_idle_minutes = Some(n);
        }

        Ok(c)
    }
}

/**
Application state, handed to every handler as axum `State`.

There's nothing mutable in here; the database is reopened per request and
sessions live in the session layer.
*/
#[derive(Clone, Debug)]
pub struct Glob {
    pub store: Store,
    pub addr: SocketAddr,
    pub static_dir: PathBuf,
    pub session_secure: bool,
    pub session_idle_minutes: Option<i64>,
}

/// Ensures the database has all its tables and the templates are loaded,
/// then bundles up what the handlers need.
pub async fn load_configuration(cfg: Cfg) -> Result<Glob, String> {
    log::info!("Configuration:\n{:#?}", &cfg);

    log::trace!("Checking state of data DB...");
    let store = Store::new(&cfg.db_path);
    if let Err(e) = store.ensure_db_schema().await {
        let estr = format!("Unable to ensure state of data DB: {}", &e);
        return Err(estr);
    }
    log::trace!("...data DB okay.");

    inter::init(&cfg.templates_dir)?;

    let glob = Glob {
        store,
        addr: cfg.addr,
        static_dir: cfg.static_dir,
        session_secure: cfg.session_secure,
        session_idle_minutes: cfg.session_idle_minutes,
    };

    Ok(glob)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let c = Cfg::from_toml("").unwrap();
        let d = Cfg::default();
        assert_eq!(c.db_path, d.db_path);
        assert_eq!(c.addr, d.addr);
        assert_eq!(c.addr.port(), 5000);
        assert!(!c.session_secure);
        assert!(c.session_idle_minutes.is_none());
    }

    #[test]
    fn file_values_override_defaults() {
        let c = Cfg::from_toml(r#"
            db_path = "/var/lib/instituto/datos.db"
            host = "0.0.0.0"
            port = 8080
            templates_dir = "/usr/share/instituto/templates"
            session_secure = true
            session_idle_minutes = 30
        "#).unwrap();

        assert_eq!(c.db_path, PathBuf::from("/var/lib/instituto/datos.db"));
        assert_eq!(c.addr, "0.0.0.0:8080".parse::<SocketAddr>().unwrap());
        assert_eq!(c.templates_dir, PathBuf::from("/usr/share/instituto/templates"));
        assert_eq!(c.static_dir, PathBuf::from("static"));
        assert!(c.session_secure);
        assert_eq!(c.session_idle_minutes, Some(30));
    }

    #[test]
    fn bad_values_are_rejected() {
        assert!(Cfg::from_toml("host = \"not.an.ip.address\"").is_err());
        assert!(Cfg::from_toml("port = \"eighty\"").is_err());
        assert!(Cfg::from_toml("session_idle_minutes = 0").is_err());
    }
}
