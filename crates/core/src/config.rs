use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub const DEFAULT_CAPACITY: usize = 64;
pub const DEFAULT_OPS: u64 = 100_000;
pub const DEFAULT_SEED: u64 = 0x5eed_f1f0;
pub const ENV_CAPACITY: &str = "RINGFIFO_CAPACITY";
pub const ENV_OPS: &str = "RINGFIFO_OPS";
pub const ENV_SEED: &str = "RINGFIFO_SEED";

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "usize", into = "usize")]
pub struct Capacity(usize);

impl Capacity {
    pub fn new(value: usize) -> Result<Self, ConfigError> {
        if value == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        Ok(Self(value))
    }

    pub fn get(&self) -> usize {
        self.0
    }
}

impl TryFrom<usize> for Capacity {
    type Error = ConfigError;

    fn try_from(value: usize) -> Result<Self, ConfigError> {
        Self::new(value)
    }
}

impl From<Capacity> for usize {
    fn from(value: Capacity) -> Self {
        value.0
    }
}

impl Default for Capacity {
    fn default() -> Self {
        Self(DEFAULT_CAPACITY)
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "u64", into = "u64")]
pub struct OpCount(u64);

impl OpCount {
    pub fn new(value: u64) -> Result<Self, ConfigError> {
        if value == 0 {
            return Err(ConfigError::ZeroOps);
        }
        Ok(Self(value))
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl TryFrom<u64> for OpCount {
    type Error = ConfigError;

    fn try_from(value: u64) -> Result<Self, ConfigError> {
        Self::new(value)
    }
}

impl From<OpCount> for u64 {
    fn from(value: OpCount) -> Self {
        value.0
    }
}

impl Default for OpCount {
    fn default() -> Self {
        Self(DEFAULT_OPS)
    }
}

/// Everything needed to replay a soak run exactly.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SoakConfig {
    pub capacity: Capacity,
    pub ops: OpCount,
    pub seed: u64,
}

impl Default for SoakConfig {
    fn default() -> Self {
        Self {
            capacity: Capacity::default(),
            ops: OpCount::default(),
            seed: DEFAULT_SEED,
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("capacity must be > 0")]
    ZeroCapacity,
    #[error("operation count must be > 0")]
    ZeroOps,
    #[error("{key}: cannot parse {value:?} as a number")]
    InvalidNumber { key: String, value: String },
}

pub trait Env {
    fn var(&self, key: &str) -> Option<String>;
}

#[derive(Clone, Debug, Default)]
pub struct StdEnv;

impl Env for StdEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

#[derive(Clone, Debug, Default)]
pub struct MapEnv {
    vars: std::collections::BTreeMap<String, String>,
}

impl MapEnv {
    pub fn with_var(mut self, key: &str, value: &str) -> Self {
        self.vars.insert(key.to_owned(), value.to_owned());
        self
    }
}

impl Env for MapEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

/// CLI value first, then the environment, then `default`.
pub fn resolve_number<N: FromStr>(
    cli_value: Option<N>,
    env_key: &str,
    env: &impl Env,
    default: N,
) -> Result<N, ConfigError> {
    match cli_value {
        Some(v) => Ok(v),
        None => match env.var(env_key) {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidNumber {
                    key: env_key.to_owned(),
                    value: raw,
                }),
            None => Ok(default),
        },
    }
}

pub fn resolve_soak_config(
    capacity: Option<usize>,
    ops: Option<u64>,
    seed: Option<u64>,
    env: &impl Env,
) -> Result<SoakConfig, ConfigError> {
    Ok(SoakConfig {
        capacity: Capacity::new(resolve_number(capacity, ENV_CAPACITY, env, DEFAULT_CAPACITY)?)?,
        ops: OpCount::new(resolve_number(ops, ENV_OPS, env, DEFAULT_OPS)?)?,
        seed: resolve_number(seed, ENV_SEED, env, DEFAULT_SEED)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_takes_precedence_over_env() {
        let env = MapEnv::default().with_var(ENV_CAPACITY, "8");
        let v = resolve_number(Some(32usize), ENV_CAPACITY, &env, DEFAULT_CAPACITY)
            .expect("valid");
        assert_eq!(v, 32);
    }

    #[test]
    fn env_used_when_cli_missing() {
        let env = MapEnv::default().with_var(ENV_SEED, " 42 ");
        let v = resolve_number::<u64>(None, ENV_SEED, &env, DEFAULT_SEED).expect("valid");
        assert_eq!(v, 42);
    }

    #[test]
    fn default_used_when_both_missing() {
        let env = MapEnv::default();
        let v = resolve_number::<u64>(None, ENV_OPS, &env, 7).expect("valid");
        assert_eq!(v, 7);
    }

    #[test]
    fn unparsable_env_is_reported() {
        let env = MapEnv::default().with_var(ENV_CAPACITY, "lots");
        let err = resolve_number::<usize>(None, ENV_CAPACITY, &env, DEFAULT_CAPACITY)
            .expect_err("not a number");
        assert_eq!(
            err,
            ConfigError::InvalidNumber {
                key: ENV_CAPACITY.to_owned(),
                value: "lots".to_owned(),
            }
        );
    }

    #[test]
    fn zero_capacity_from_env_is_rejected() {
        let env = MapEnv::default().with_var(ENV_CAPACITY, "0");
        assert_eq!(
            resolve_soak_config(None, None, None, &env),
            Err(ConfigError::ZeroCapacity)
        );
        assert_eq!(OpCount::new(0), Err(ConfigError::ZeroOps));
    }

    #[test]
    fn soak_config_round_trips_through_json() {
        let cfg = resolve_soak_config(Some(3), Some(10), Some(99), &MapEnv::default())
            .expect("valid");
        let json = serde_json::to_string(&cfg).expect("serializable");
        assert_eq!(json, r#"{"capacity":3,"ops":10,"seed":99}"#);
        let back: SoakConfig = serde_json::from_str(&json).expect("deserializable");
        assert_eq!(back, cfg);

        let zero: Result<SoakConfig, _> =
            serde_json::from_str(r#"{"capacity":0,"ops":10,"seed":99}"#);
        assert!(zero.is_err());
    }
}
