//! Global tcal configuration.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use config::{Config, File};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{TCalError, TCalResult};
use crate::ics::format_timestamp;

static DEFAULT_CALENDAR_FILE: &str = "~/calendar.ics";
static DEFAULT_APP_ID: &str = "tcal@localhost";
static DEFAULT_PRODUCT_ID: &str = "-//tcal//tcal-core//EN";

fn default_calendar_file() -> PathBuf {
    PathBuf::from(DEFAULT_CALENDAR_FILE)
}

fn default_app_id() -> String {
    DEFAULT_APP_ID.to_string()
}

fn default_product_id() -> String {
    DEFAULT_PRODUCT_ID.to_string()
}

/// Configuration at ~/.config/tcal/config.toml
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TCalConfig {
    /// The calendar file commands operate on.
    #[serde(default = "default_calendar_file")]
    pub calendar_file: PathBuf,

    /// Namespace appended to generated UIDs.
    #[serde(default = "default_app_id")]
    pub app_id: String,

    /// PRODID written into saved calendars.
    #[serde(default = "default_product_id")]
    pub product_id: String,
}

impl Default for TCalConfig {
    fn default() -> Self {
        TCalConfig {
            calendar_file: default_calendar_file(),
            app_id: default_app_id(),
            product_id: default_product_id(),
        }
    }
}

impl TCalConfig {
    pub fn config_path() -> TCalResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| TCalError::Config("Could not determine config directory".into()))?
            .join("tcal");

        Ok(config_dir.join("config.toml"))
    }

    /// Load the user's config, writing a commented default on first run.
    pub fn load() -> TCalResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> TCalResult<Self> {
        let config: TCalConfig = Config::builder()
            .add_source(File::from(path).required(false))
            .build()
            .map_err(|e| TCalError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| TCalError::Config(e.to_string()))?;

        // UID lines may carry exactly one colon
        if config.app_id.contains(':') {
            return Err(TCalError::Config(format!(
                "app_id '{}' must not contain ':'",
                config.app_id
            )));
        }

        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Save the current config to ~/.config/tcal/config.toml
    pub fn save(&self) -> TCalResult<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> TCalResult<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| TCalError::Config(e.to_string()))?;

        std::fs::write(path, content)
            .map_err(|e| TCalError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> TCalResult<()> {
        let contents = format!(
            "\
# tcal configuration

# Calendar file used when --file is not given:
# calendar_file = \"{}\"

# Namespace for the UIDs of new events (no ':' allowed):
# app_id = \"{}\"

# PRODID written into saved calendars:
# product_id = \"{}\"
",
            DEFAULT_CALENDAR_FILE, DEFAULT_APP_ID, DEFAULT_PRODUCT_ID
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                TCalError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| TCalError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }

    /// The calendar file with `~` expanded.
    pub fn calendar_path(&self) -> PathBuf {
        let full_path_str =
            shellexpand::tilde(&self.calendar_file.to_string_lossy()).into_owned();

        PathBuf::from(full_path_str)
    }

    /// A fresh UID for an event created at `date_stamp`.
    pub fn new_uid(&self, date_stamp: NaiveDateTime) -> String {
        format!(
            "{}-{}@{}",
            format_timestamp(date_stamp),
            Uuid::new_v4().simple(),
            self.app_id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = TCalConfig::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.app_id, DEFAULT_APP_ID);
        assert_eq!(config.product_id, DEFAULT_PRODUCT_ID);
        assert_eq!(config.calendar_file, PathBuf::from(DEFAULT_CALENDAR_FILE));
    }

    #[test]
    fn commented_default_file_parses_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tcal/config.toml");
        TCalConfig::create_default_config(&path).unwrap();

        let config = TCalConfig::load_from(&path).unwrap();
        assert_eq!(config.app_id, DEFAULT_APP_ID);
    }

    #[test]
    fn values_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "app_id = \"planner@example.org\"\ncalendar_file = \"/tmp/work.ics\"\n").unwrap();

        let config = TCalConfig::load_from(&path).unwrap();
        assert_eq!(config.app_id, "planner@example.org");
        assert_eq!(config.calendar_path(), PathBuf::from("/tmp/work.ics"));
        assert_eq!(config.product_id, DEFAULT_PRODUCT_ID);
    }

    #[test]
    fn saved_config_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = TCalConfig {
            calendar_file: PathBuf::from("~/work.ics"),
            ..TCalConfig::default()
        };
        config.save_to(&path).unwrap();

        let loaded = TCalConfig::load_from(&path).unwrap();
        assert_eq!(loaded.calendar_file, PathBuf::from("~/work.ics"));
        assert_eq!(loaded.app_id, DEFAULT_APP_ID);
    }

    #[test]
    fn app_id_with_colon_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "app_id = \"mailto:me\"\n").unwrap();

        assert!(matches!(TCalConfig::load_from(&path), Err(TCalError::Config(_))));
    }

    #[test]
    fn generated_uids_are_unique_and_namespaced() {
        let config = TCalConfig::default();
        let stamp = NaiveDate::from_ymd_opt(2011, 3, 30)
            .unwrap()
            .and_hms_opt(13, 0, 0)
            .unwrap();

        let a = config.new_uid(stamp);
        let b = config.new_uid(stamp);
        assert_ne!(a, b);
        assert!(a.starts_with("20110330T130000-"));
        assert!(a.ends_with("@tcal@localhost"));
        assert!(!a.contains(':'));
    }
}
