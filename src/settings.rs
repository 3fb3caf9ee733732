use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

use crate::error::ConfigError;
use crate::message::MESSAGE_LIMIT;

pub const SETTINGS_PATH: &str = "./data/settings.json";
pub const GEMINI_OPENAI_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/openai";

// Environment variables checked, in order, for the generator key.
const API_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "OPENAI_API_KEY"];

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub generator_api_key: Option<String>, // Key for the text generation backend.
    pub generator_api_base: String,        // OpenAI-compatible endpoint.
    pub model: String,
    pub voting_duration_secs: u64, // How long each vote stays open.
    pub message_limit: usize,      // Longest message the platform accepts.
    pub command_prefix: String,
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            generator_api_key: None,
            generator_api_base: GEMINI_OPENAI_BASE.to_string(),
            model: "gemini-2.0-flash".to_string(),
            voting_duration_secs: 60,
            message_limit: MESSAGE_LIMIT,
            command_prefix: "!".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Settings {
    // Settings from the default path with the environment applied on top.
    // A missing file just means defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = if Path::new(SETTINGS_PATH).exists() {
            Self::load_settings_from_file(SETTINGS_PATH)?
        } else {
            Self::default()
        };
        settings.apply_env(|name| std::env::var(name).ok());
        Ok(settings)
    }

    pub fn load_settings_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path)?;
        let settings = serde_json::from_str(&data)?;
        Ok(settings)
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> io::Result<()> {
        let path = path.as_ref();
        let data = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = fs::File::create(path)?;
        file.write_all(data.as_bytes())?;
        Ok(())
    }

    /// Override the API key from the environment, first non-empty variable wins.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = API_KEY_VARS
            .iter()
            .filter_map(|name| lookup(name))
            .find(|value| !value.trim().is_empty())
        {
            self.generator_api_key = Some(key);
        }
    }

    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.generator_api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::MissingCredential("GEMINI_API_KEY"))
    }

    pub fn voting_duration(&self) -> Duration {
        Duration::from_secs(self.voting_duration_secs)
    }

    pub fn log_level(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Info)
    }
}
