use std::str::FromStr;

use tracing::Level;

use crate::config::LoggingSettings;

/// Installs a `tracing-subscriber` fmt subscriber at `level`.
///
/// Unknown level names fall back to `info`. Safe to call more than once;
/// only the first call installs anything. The dispatcher never calls this
/// itself, it only emits events into the span it was built with.
pub fn init(level: &str) {
    let _ = tracing_subscriber::fmt()
        .with_max_level(parse_level(level))
        .with_target(false)
        .try_init();
}

pub fn init_from(settings: &LoggingSettings) {
    init(&settings.level);
}

pub(crate) fn parse_level(level: &str) -> Level {
    match level.trim().to_lowercase().as_str() {
        "warning" => Level::WARN,
        other => Level::from_str(other).unwrap_or(Level::INFO),
    }
}
