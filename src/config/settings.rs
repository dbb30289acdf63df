use serde::Deserialize;

/// Top-level settings an embedding application passes to the dispatcher.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct Settings {
    pub dispatch: DispatchSettings,
    pub logging: LoggingSettings,
}

/// Selects the dispatch discipline.
///
/// `ordered = true` runs handlers one message at a time in arrival order;
/// `false` runs every matched handler as its own task.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct DispatchSettings {
    pub ordered: bool,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    pub level: String,
}

/// Partial configuration settings loaded from files or environment.
///
/// Missing values are filled from `Settings::default()`.
#[derive(Debug, Deserialize)]
pub struct PartialSettings {
    pub dispatch: Option<PartialDispatchSettings>,
    pub logging: Option<PartialLoggingSettings>,
}

#[derive(Debug, Deserialize)]
pub struct PartialDispatchSettings {
    pub ordered: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct PartialLoggingSettings {
    pub level: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dispatch: DispatchSettings { ordered: true },
            logging: LoggingSettings {
                level: "info".to_string(),
            },
        }
    }
}
