//! Handles settings for the application.
//!
//! Values come from an optional TOML file (`config/settings.toml` unless
//! `--config` says otherwise) and from the environment. Nested keys use the
//! `SCHOOLBOT__` prefix (`SCHOOLBOT__TELEGRAM__TOKEN`); the plain `TOKEN` and
//! `NEWSAPI_KEY` variables are honoured too.
use std::collections::HashMap;

use clap::Parser;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use thiserror::Error;

const DEFAULT_CONFIG_PATH: &str = "config/settings";
const ENV_PREFIX: &str = "SCHOOLBOT";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error(
        "telegram token not found: set TOKEN (or SCHOOLBOT__TELEGRAM__TOKEN) in the environment or in .env"
    )]
    MissingToken,
}

#[derive(Debug, Parser)]
#[command(name = "schoolbot", disable_version_flag = true)]
struct Args {
    /// Optional config file path (TOML, extension optional).
    #[arg(long)]
    config: Option<String>,
    /// Override the log level (e.g. debug).
    #[arg(long)]
    level: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct App {
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Telegram {
    pub token: Option<String>,
    pub image_dir: String,
}

impl Default for Telegram {
    fn default() -> Self {
        Self {
            token: None,
            image_dir: "img".to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct News {
    pub api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Weather {
    pub place: String,
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: String,
}

impl Default for Weather {
    fn default() -> Self {
        let location = telegram_bot::Location::default();
        Self {
            place: location.place,
            latitude: location.latitude,
            longitude: location.longitude,
            timezone: location.timezone,
        }
    }
}

impl From<&Weather> for telegram_bot::Location {
    fn from(weather: &Weather) -> Self {
        Self {
            place: weather.place.clone(),
            latitude: weather.latitude,
            longitude: weather.longitude,
            timezone: weather.timezone.clone(),
        }
    }
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

impl Default for Database {
    fn default() -> Self {
        Database::Sqlite("school_data.db".to_string())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub app: App,
    pub telegram: Telegram,
    pub news: News,
    pub weather: Weather,
    pub database: Database,
}

impl Settings {
    pub fn new() -> Result<Self, SettingsError> {
        let args = Args::parse();
        let path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
        let mut settings = Self::load(path, std::env::vars().collect())?;
        if let Some(level) = args.level {
            settings.app.level = level;
        }
        Ok(settings)
    }

    /// Build the settings from `path` and the given environment.
    pub fn load(path: &str, env: HashMap<String, String>) -> Result<Self, SettingsError> {
        let token = non_empty(env.get("TOKEN"));
        let news_key = non_empty(env.get("NEWSAPI_KEY"));

        let mut settings: Settings = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .source(Some(env.into_iter().collect())),
            )
            .build()?
            .try_deserialize()?;

        if non_empty(settings.telegram.token.as_ref()).is_none() {
            settings.telegram.token = token;
        }
        if non_empty(settings.news.api_key.as_ref()).is_none() {
            settings.news.api_key = news_key;
        }
        if settings.telegram.token.is_none() {
            return Err(SettingsError::MissingToken);
        }

        Ok(settings)
    }

    pub fn token(&self) -> &str {
        self.telegram.token.as_deref().unwrap_or_default()
    }
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    const NO_FILE: &str = "config/does-not-exist";

    #[test]
    fn missing_token_is_fatal() {
        let err = Settings::load(NO_FILE, env(&[])).unwrap_err();
        assert!(matches!(err, SettingsError::MissingToken));
    }

    #[test]
    fn blank_token_is_missing() {
        let err = Settings::load(NO_FILE, env(&[("TOKEN", "  ")])).unwrap_err();
        assert!(matches!(err, SettingsError::MissingToken));
    }

    #[test]
    fn plain_env_names_are_honoured() {
        let settings =
            Settings::load(NO_FILE, env(&[("TOKEN", "123:abc"), ("NEWSAPI_KEY", "n")])).unwrap();
        assert_eq!(settings.token(), "123:abc");
        assert_eq!(settings.news.api_key.as_deref(), Some("n"));
        assert_eq!(settings.database, Database::Sqlite("school_data.db".to_string()));
        assert_eq!(settings.app.level, "info");
    }

    #[test]
    fn news_key_is_optional() {
        let settings = Settings::load(NO_FILE, env(&[("TOKEN", "t")])).unwrap();
        assert!(settings.news.api_key.is_none());
    }

    #[test]
    fn prefixed_env_wins_over_plain_names() {
        let settings = Settings::load(
            NO_FILE,
            env(&[("TOKEN", "plain"), ("SCHOOLBOT__TELEGRAM__TOKEN", "prefixed")]),
        )
        .unwrap();
        assert_eq!(settings.token(), "prefixed");
    }

    #[test]
    fn file_values_are_read() {
        let dir = std::env::temp_dir().join(format!("schoolbot-settings-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("settings.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
database = "memory"

[app]
level = "debug"

[telegram]
token = "from-file"
image_dir = "photos"

[weather]
place = "Сочи"
latitude = 43.6
longitude = 39.73
"#
        )
        .unwrap();

        let settings = Settings::load(path.to_str().unwrap(), env(&[])).unwrap();
        assert_eq!(settings.app.level, "debug");
        assert_eq!(settings.token(), "from-file");
        assert_eq!(settings.telegram.image_dir, "photos");
        assert_eq!(settings.weather.place, "Сочи");
        assert_eq!(settings.weather.timezone, "Europe/Moscow");
        assert_eq!(settings.database, Database::Memory);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
