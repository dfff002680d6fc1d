use std::time::{SystemTime, UNIX_EPOCH};

use thiserror::Error;

pub(crate) const SCENE_ENV_VAR: &str = "BRAWL_SCENE";
pub(crate) const SEED_ENV_VAR: &str = "BRAWL_SEED";
pub(crate) const PLAYERS_ENV_VAR: &str = "BRAWL_PLAYERS";
pub(crate) const TICKS_ENV_VAR: &str = "BRAWL_TICKS";
pub(crate) const TPS_ENV_VAR: &str = "BRAWL_TPS";
pub(crate) const INPUT_SCRIPT_ENV_VAR: &str = "BRAWL_INPUT_SCRIPT";

const DEFAULT_SCENE: &str = "saloon";
const DEFAULT_PLAYERS: usize = 1;
const DEFAULT_TICKS: u64 = 600;
const DEFAULT_TPS: u32 = 60;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum ConfigError {
    #[error("{var} must be {expected}, got '{value}'")]
    InvalidValue {
        var: &'static str,
        expected: &'static str,
        value: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct GameConfig {
    pub(crate) scene_id: String,
    pub(crate) seed: u64,
    pub(crate) players: usize,
    pub(crate) ticks: u64,
    /// Ticks per second for wall-clock pacing; 0 runs unpaced.
    pub(crate) tps: u32,
    pub(crate) input_script: Option<String>,
}

impl GameConfig {
    pub(crate) fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |var: &str| {
            lookup(var)
                .map(|raw| raw.trim().to_string())
                .filter(|raw| !raw.is_empty())
        };

        Ok(Self {
            scene_id: read(SCENE_ENV_VAR).unwrap_or_else(|| DEFAULT_SCENE.to_string()),
            seed: match read(SEED_ENV_VAR) {
                Some(raw) => parse_number(SEED_ENV_VAR, "an unsigned 64-bit integer", raw)?,
                None => seed_from_clock(),
            },
            players: match read(PLAYERS_ENV_VAR) {
                Some(raw) => parse_number(PLAYERS_ENV_VAR, "a player count", raw)?,
                None => DEFAULT_PLAYERS,
            },
            ticks: match read(TICKS_ENV_VAR) {
                Some(raw) => parse_number(TICKS_ENV_VAR, "a tick count", raw)?,
                None => DEFAULT_TICKS,
            },
            tps: match read(TPS_ENV_VAR) {
                Some(raw) => parse_number(TPS_ENV_VAR, "ticks per second", raw)?,
                None => DEFAULT_TPS,
            },
            input_script: read(INPUT_SCRIPT_ENV_VAR),
        })
    }
}

fn parse_number<T: std::str::FromStr>(
    var: &'static str,
    expected: &'static str,
    raw: String,
) -> Result<T, ConfigError> {
    raw.parse::<T>()
        .map_err(|_| ConfigError::InvalidValue {
            var,
            expected,
            value: raw,
        })
}

fn seed_from_clock() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos() as u64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<GameConfig, ConfigError> {
        let vars = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>();
        GameConfig::from_lookup(|var| vars.get(var).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = config_from(&[(SEED_ENV_VAR, "5")]).expect("config");
        assert_eq!(config.scene_id, "saloon");
        assert_eq!(config.seed, 5);
        assert_eq!(config.players, 1);
        assert_eq!(config.ticks, 600);
        assert_eq!(config.tps, 60);
        assert_eq!(config.input_script, None);
    }

    #[test]
    fn reads_every_variable() {
        let config = config_from(&[
            (SCENE_ENV_VAR, "cellar"),
            (SEED_ENV_VAR, "99"),
            (PLAYERS_ENV_VAR, "2"),
            (TICKS_ENV_VAR, "10"),
            (TPS_ENV_VAR, "0"),
            (INPUT_SCRIPT_ENV_VAR, " right*3 "),
        ])
        .expect("config");
        assert_eq!(config.scene_id, "cellar");
        assert_eq!(config.players, 2);
        assert_eq!(config.ticks, 10);
        assert_eq!(config.tps, 0);
        assert_eq!(config.input_script.as_deref(), Some("right*3"));
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = config_from(&[(SEED_ENV_VAR, "1"), (SCENE_ENV_VAR, "  ")]).expect("config");
        assert_eq!(config.scene_id, "saloon");
    }

    #[test]
    fn rejects_non_numeric_values() {
        assert_eq!(
            config_from(&[(PLAYERS_ENV_VAR, "two")]),
            Err(ConfigError::InvalidValue {
                var: PLAYERS_ENV_VAR,
                expected: "a player count",
                value: "two".to_string(),
            })
        );
    }
}
