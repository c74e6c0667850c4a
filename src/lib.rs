/*!
Records of students, courses and enrollments for a small institute, behind a
username/password login.
*/
pub mod auth;
pub mod config;
pub mod inter;
pub mod record;
pub mod store;
pub mod user;

/// Log level named by the `LOG_LEVEL` environment variable, any case;
/// `Warn` when it's unset or unrecognized.
pub fn log_level_from_env() -> simplelog::LevelFilter {
    use simplelog::LevelFilter;

    let level = match std::env::var("LOG_LEVEL") {
        Ok(s) => s.to_ascii_lowercase(),
        Err(_) => return LevelFilter::Warn,
    };
    match level.as_str() {
        "max" | "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "error" => LevelFilter::Error,
        "off" => LevelFilter::Off,
        _ => LevelFilter::Warn,
    }
}

/// Start the terminal logger, showing only this crate's records.
pub fn start_logging() -> Result<(), log::SetLoggerError> {
    use simplelog::{ColorChoice, TermLogger, TerminalMode};

    let log_cfg = simplelog::ConfigBuilder::new()
        .add_filter_allow_str("instituto")
        .build();
    TermLogger::init(log_level_from_env(), log_cfg, TerminalMode::Stdout, ColorChoice::Auto)
}
