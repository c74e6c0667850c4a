/*!
Here we go!

```text
instituto [ CONFIG_FILE ]
```

Without a config file every setting takes its default. Set `LOG_LEVEL` in
the environment for more (or less) chatter.
*/
use instituto::config;
use instituto::inter;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(e) = instituto::start_logging() {
        eprintln!("Unable to start logging: {}", &e);
    }
    log::info!("Logging started.");

    let cfg = match std::env::args().nth(1) {
        Some(path) => match config::Cfg::from_file(&path) {
            Ok(cfg) => cfg,
            Err(e) => {
                log::error!("Error reading configuration from {:?}: {}", &path, &e);
                eprintln!("Error reading configuration from {:?}: {}", &path, &e);
                std::process::exit(1);
            },
        },
        None => {
            log::info!("No configuration file given; using defaults.");
            config::Cfg::default()
        },
    };

    let glob = match config::load_configuration(cfg).await {
        Ok(glob) => glob,
        Err(e) => {
            log::error!("Error loading configuration: {}", &e);
            eprintln!("Error loading configuration: {}", &e);
            std::process::exit(1);
        },
    };

    let addr = glob.addr;
    let app = inter::app(glob);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            log::error!("Unable to bind {}: {}", &addr, &e);
            eprintln!("Unable to bind {}: {}", &addr, &e);
            std::process::exit(1);
        },
    };

    log::info!("Listening on {}", &addr);

    if let Err(e) = axum::serve(listener, app).await {
        log::error!("Server error: {}", &e);
        std::process::exit(1);
    }
}
