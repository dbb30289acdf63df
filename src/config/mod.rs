//! Settings for applications embedding the dispatcher.
//!
//! Nothing in this crate reads configuration on its own; an application
//! calls [`load_config`] and passes `dispatch.ordered` to
//! [`Router::match_and_dispatch`](crate::router::Router::match_and_dispatch)
//! and `logging.level` to [`crate::utils::logging::init_from`].

mod settings;

use crate::config::settings::PartialSettings;
use config::{Config, ConfigError, Environment, File};

pub use settings::{DispatchSettings, LoggingSettings, Settings};

/// Loads settings from `config/default.*` (optional) and `MQTT_*`
/// environment variables, e.g. `MQTT_DISPATCH_ORDERED=false`.
/// A `.env` file in the working directory is honoured.
pub fn load_config() -> Result<Settings, ConfigError> {
    dotenvy::dotenv().ok();

    let builder = Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(
            Environment::with_prefix("MQTT")
                .separator("_")
                .try_parsing(true),
        );

    let config = builder.build()?;
    let partial: PartialSettings = config.try_deserialize()?;
    let default = Settings::default();

    Ok(Settings {
        dispatch: DispatchSettings {
            ordered: partial
                .dispatch
                .as_ref()
                .and_then(|d| d.ordered)
                .unwrap_or(default.dispatch.ordered),
        },
        logging: LoggingSettings {
            level: partial
                .logging
                .as_ref()
                .and_then(|l| l.level.clone())
                .unwrap_or(default.logging.level),
        },
    })
}
