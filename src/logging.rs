use std::str::FromStr;

use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};

use crate::config::Config;

/// Install a file logger at the configured path and level.
/// Best-effort: failures are silently ignored (logging must never block a
/// command). Returns whether a logger was installed.
pub fn init(config: &Config) -> bool {
    let level = parse_level(&config.logging.level);
    if level == LevelFilter::Off {
        return false;
    }
    let Some(path) = config.log_path() else {
        return false;
    };
    if let Some(dir) = path.parent() {
        let _ = std::fs::create_dir_all(dir);
    }
    let Ok(file) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
    else {
        return false;
    };

    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .build();
    WriteLogger::init(level, log_config, file).is_ok()
}

/// Parse a level name; unknown or empty names mean `Warn`.
pub fn parse_level(name: &str) -> LevelFilter {
    LevelFilter::from_str(name.trim()).unwrap_or(LevelFilter::Warn)
}

/// Collapse a command to one line and cap its length for log records.
pub fn summarize(command: &str) -> String {
    let oneline = command.replace('\n', "; ");
    oneline.chars().take(200).collect()
}
