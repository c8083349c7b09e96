use std::path::PathBuf;

use aim_core::EngineConfig;

const DEFAULT_DB_FILE: &str = "aim-duel.db";

/// Runtime settings, read from the environment.
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub engine: EngineConfig,
}

fn data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("aim-duel")
}

fn default_database_url() -> String {
    format!(
        "sqlite:{}?mode=rwc",
        data_dir().join(DEFAULT_DB_FILE).display()
    )
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            log::warn!("ignoring {}={:?}: not a valid value", name, raw);
            None
        }
    }
}

impl Settings {
    /// `AIM_CONFIG` (JSON file) first, then individual `AIM_*` overrides.
    pub fn from_env() -> Self {
        let mut engine = match std::env::var("AIM_CONFIG") {
            Ok(path) => match std::fs::read_to_string(&path) {
                Ok(text) => EngineConfig::from_json(&text).unwrap_or_else(|e| {
                    log::warn!("ignoring config file {}: {}", path, e);
                    EngineConfig::default()
                }),
                Err(e) => {
                    log::warn!("cannot read config file {}: {}", path, e);
                    EngineConfig::default()
                }
            },
            Err(_) => EngineConfig::default(),
        };

        if let Some(seed) = env_parse("AIM_SEED") {
            engine.seed = Some(seed);
        }
        if let Some(rounds) = env_parse("AIM_ROUNDS") {
            engine.rounds = rounds;
        }
        if let Some(secs) = env_parse::<u64>("AIM_DRIFT_INTERVAL_SECS") {
            engine.drift_interval_ms = secs * 1000;
        }

        let database_url =
            std::env::var("AIM_DATABASE_URL").unwrap_or_else(|_| default_database_url());

        Self {
            database_url,
            engine: engine.sanitized(),
        }
    }

    /// Directory to create before opening a file-backed database.
    pub fn database_dir(&self) -> Option<PathBuf> {
        let path = self
            .database_url
            .strip_prefix("sqlite:")?
            .split('?')
            .next()?;
        if path.is_empty() || path.starts_with(':') {
            return None;
        }
        PathBuf::from(path).parent().map(PathBuf::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_dir_for_file_urls() {
        let settings = Settings {
            database_url: "sqlite:/tmp/aim/aim-duel.db?mode=rwc".to_string(),
            engine: EngineConfig::default(),
        };
        assert_eq!(settings.database_dir(), Some(PathBuf::from("/tmp/aim")));
    }

    #[test]
    fn no_database_dir_for_memory() {
        let settings = Settings {
            database_url: "sqlite::memory:".to_string(),
            engine: EngineConfig::default(),
        };
        assert_eq!(settings.database_dir(), None);
    }
}
