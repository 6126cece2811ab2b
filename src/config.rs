use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::arena::MatchConfig;
use crate::bot::BotKind;
use crate::game::DEFAULT_MOVE_LIMIT;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Top-level configuration file. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub arena: ArenaSettings,
    pub web: WebSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaSettings {
    pub attacker: BotKind,
    pub defender: BotKind,
    pub time_per_move_ms: u64,
    pub move_limit: usize,
    pub seed: Option<u64>,
}

impl Default for ArenaSettings {
    fn default() -> Self {
        ArenaSettings {
            attacker: BotKind::Random,
            defender: BotKind::Heuristic,
            time_per_move_ms: 2000,
            move_limit: DEFAULT_MOVE_LIMIT,
            seed: None,
        }
    }
}

impl From<&ArenaSettings> for MatchConfig {
    fn from(settings: &ArenaSettings) -> Self {
        MatchConfig {
            time_per_move: Duration::from_millis(settings.time_per_move_ms),
            move_limit: settings.move_limit,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebSettings {
    pub bind: String,
    pub static_dir: PathBuf,
    pub bot: BotKind,
    pub seed: Option<u64>,
}

impl Default for WebSettings {
    fn default() -> Self {
        WebSettings {
            bind: "127.0.0.1:3000".to_string(),
            static_dir: PathBuf::from("static"),
            bot: BotKind::Heuristic,
            seed: None,
        }
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_gives_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.arena.move_limit, 1000);
        assert_eq!(config.web.bind, "127.0.0.1:3000");
    }

    #[test]
    fn test_partial_sections_keep_other_defaults() {
        let config: Config =
            serde_json::from_str(r#"{ "arena": { "attacker": "heuristic", "seed": 9 } }"#).unwrap();
        assert_eq!(config.arena.attacker, BotKind::Heuristic);
        assert_eq!(config.arena.defender, BotKind::Heuristic);
        assert_eq!(config.arena.seed, Some(9));
        assert_eq!(config.arena.time_per_move_ms, 2000);
    }

    #[test]
    fn test_match_config_conversion() {
        let settings = ArenaSettings {
            time_per_move_ms: 250,
            move_limit: 40,
            ..ArenaSettings::default()
        };
        let config = MatchConfig::from(&settings);
        assert_eq!(config.time_per_move, Duration::from_millis(250));
        assert_eq!(config.move_limit, 40);
    }

    #[test]
    fn test_human_web_opponent_means_hot_seat() {
        let config: Config = serde_json::from_str(r#"{ "web": { "bot": "human" } }"#).unwrap();
        assert_eq!(config.web.bot, BotKind::Human);
        assert!(config.web.bot.build("nobody", None).is_none());
    }

    #[test]
    fn test_unknown_bot_rejected() {
        let parsed = serde_json::from_str::<Config>(r#"{ "web": { "bot": "oracle" } }"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_load_reports_missing_file() {
        let err = Config::load("/nonexistent/hnefatafl.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_load_reads_file() {
        let file_name = format!("hnefatafl-config-{}.json", std::process::id());
        let path = std::env::temp_dir().join(file_name);
        fs::write(&path, r#"{ "web": { "bind": "0.0.0.0:8080" } }"#).unwrap();
        let config = Config::load(&path).unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(config.web.bind, "0.0.0.0:8080");
        assert_eq!(config.web.bot, BotKind::Heuristic);
    }
}
