//! Application configuration.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_APP_ID, MESSAGE_WINDOW};

/// Settings an embedding shell hands to the client at construction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    /// Tenant identifier scoping every collaborator path.
    pub app_id: String,
    /// Number of messages kept in each live conversation window.
    pub message_window: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_id: DEFAULT_APP_ID.to_string(),
            message_window: MESSAGE_WINDOW,
        }
    }
}

impl AppConfig {
    /// Parse the JSON shape persisted by the frontend shell.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Build from the environment.
    ///
    /// `CHATUP_APP_ID` overrides the tenant id and `CHATUP_MESSAGE_WINDOW`
    /// the window size. Invalid values fall back to the defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(id) = std::env::var("CHATUP_APP_ID") {
            let id = id.trim().to_string();
            if !id.is_empty() {
                config.app_id = id;
            }
        }

        if let Ok(raw) = std::env::var("CHATUP_MESSAGE_WINDOW") {
            match raw.parse::<usize>() {
                Ok(n) if n > 0 => config.message_window = n,
                _ => eprintln!("WARNING: CHATUP_MESSAGE_WINDOW is invalid, using default"),
            }
        }

        config
    }
}
