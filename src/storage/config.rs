use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use crate::calendar::ReminderOffset;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub storage: StorageConfig,
    pub notifications: NotificationConfig,
    pub reminders: RemindersConfig,
    pub calendar: CalendarConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StorageConfig {
    pub database: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NotificationConfig {
    pub title: String,
    pub body_template: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RemindersConfig {
    pub presets: Vec<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CalendarConfig {
    pub first_day_of_week: String,
}

impl NotificationConfig {
    pub fn body_for(&self, title: &str) -> String {
        self.body_template.replace("{title}", title)
    }
}

impl RemindersConfig {
    pub fn offsets(&self) -> Vec<ReminderOffset> {
        self.presets.iter().copied().map(ReminderOffset::from_secs).collect()
    }
}

impl CalendarConfig {
    /// Falls back to Monday for unrecognised names.
    pub fn week_start(&self) -> Weekday {
        self.first_day_of_week.parse().unwrap_or(Weekday::Mon)
    }
}

impl Config {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::from)
    }

    pub fn load_or_create() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::from_toml(&content)
        } else {
            let config = Self::default();
            config.save()?;
            Ok(config)
        }
    }

    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("termin-planner")
    }

    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, config_path: &std::path::Path) -> Result<(), ConfigError> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage: StorageConfig {
                database: Self::config_dir().join("termine.db"),
            },
            notifications: NotificationConfig {
                title: "Reminder".to_string(),
                body_template: "Appointment: {title}".to_string(),
            },
            reminders: RemindersConfig {
                presets: ReminderOffset::PRESETS.iter().map(|o| o.as_secs()).collect(),
            },
            calendar: CalendarConfig {
                first_day_of_week: "Monday".to_string(),
            },
        }
    }
}
