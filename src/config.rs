use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::blockchain::{DEFAULT_DIFFICULTY, DEFAULT_MINE_DELAY_MS, MAX_DIFFICULTY};
use crate::error::ConfigError;

/// Upper bound for `SNAPSHOT_CAPACITY`; the broadcast buffer is allocated
/// up front.
pub const MAX_SNAPSHOT_CAPACITY: usize = 1024;

/// Runtime settings, read from the environment (and `.env` if present).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub http_port: u16,
    pub tcp_port: u16,
    pub difficulty: u32,
    pub mine_delay: Duration,
    pub snapshot_capacity: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from any key/value source; unset keys take defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let snapshot_capacity = parse_or(&lookup, "SNAPSHOT_CAPACITY", 16)?;
        if !(1..=MAX_SNAPSHOT_CAPACITY).contains(&snapshot_capacity) {
            return Err(ConfigError::Invalid {
                key: "SNAPSHOT_CAPACITY",
                value: snapshot_capacity.to_string(),
                reason: format!("must be between 1 and {MAX_SNAPSHOT_CAPACITY}"),
            });
        }

        let difficulty = parse_or(&lookup, "DIFFICULTY", DEFAULT_DIFFICULTY)?;
        if difficulty > MAX_DIFFICULTY {
            return Err(ConfigError::Invalid {
                key: "DIFFICULTY",
                value: difficulty.to_string(),
                reason: format!("must be at most {MAX_DIFFICULTY}"),
            });
        }

        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            http_port: parse_or(&lookup, "HTTP_PORT", 8080)?,
            tcp_port: parse_or(&lookup, "TCP_PORT", 9000)?,
            difficulty,
            mine_delay: Duration::from_millis(parse_or(
                &lookup,
                "MINE_DELAY_MS",
                DEFAULT_MINE_DELAY_MS,
            )?),
            snapshot_capacity,
        })
    }
}

fn parse_or<T, F>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => {
            let parsed = raw.trim().parse::<T>();
            parsed.map_err(|e| ConfigError::Invalid {
                key,
                reason: e.to_string(),
                value: raw,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.http_port, 8080);
        assert_eq!(config.tcp_port, 9000);
        assert_eq!(config.difficulty, 1);
        assert_eq!(config.mine_delay, Duration::from_secs(1));
        assert_eq!(config.snapshot_capacity, 16);
    }

    #[test]
    fn reads_overrides() {
        let config = config_from(&[
            ("HOST", "0.0.0.0"),
            ("HTTP_PORT", "18080"),
            ("TCP_PORT", " 19000 "),
            ("DIFFICULTY", "3"),
            ("MINE_DELAY_MS", "0"),
        ])
        .unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.http_port, 18080);
        assert_eq!(config.tcp_port, 19000);
        assert_eq!(config.difficulty, 3);
        assert_eq!(config.mine_delay, Duration::ZERO);
    }

    #[test]
    fn rejects_unparseable_port() {
        let err = config_from(&[("TCP_PORT", "ninety")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "TCP_PORT", .. }));
    }

    #[test]
    fn accepts_largest_meetable_difficulty() {
        let config = config_from(&[("DIFFICULTY", "64")]).unwrap();
        assert_eq!(config.difficulty, MAX_DIFFICULTY);
    }

    #[test]
    fn rejects_unmeetable_difficulty() {
        let err = config_from(&[("DIFFICULTY", "65")]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                key: "DIFFICULTY",
                ..
            }
        ));
    }

    #[test]
    fn rejects_oversized_capacity() {
        let err = config_from(&[("SNAPSHOT_CAPACITY", "18446744073709551615")]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                key: "SNAPSHOT_CAPACITY",
                ..
            }
        ));
        assert!(config_from(&[("SNAPSHOT_CAPACITY", "1024")]).is_ok());
        assert!(config_from(&[("SNAPSHOT_CAPACITY", "1025")]).is_err());
    }

    #[test]
    fn rejects_zero_capacity() {
        let err = config_from(&[("SNAPSHOT_CAPACITY", "0")]).unwrap_err();
        assert!(err.to_string().contains("SNAPSHOT_CAPACITY"));
    }
}
