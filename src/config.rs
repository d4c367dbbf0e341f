use crate::input::RepeatPolicy;
use std::{env, fmt};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_MAX_SESSIONS: usize = 1024;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub key_repeat: RepeatPolicy,
    pub max_sessions: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            key_repeat: RepeatPolicy::Ignore,
            max_sessions: DEFAULT_MAX_SESSIONS,
        }
    }
}

#[derive(Debug)]
pub struct ConfigError {
    pub var: &'static str,
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}: {}", self.var, self.message)
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        if let Some(port) = lookup("PORT") {
            config.port = port.trim().parse().map_err(|err| ConfigError {
                var: "PORT",
                message: format!("{err}"),
            })?;
        }

        if let Some(policy) = lookup("TALLY_KEY_REPEAT") {
            config.key_repeat = policy.parse().map_err(|message| ConfigError {
                var: "TALLY_KEY_REPEAT",
                message,
            })?;
        }

        if let Some(max) = lookup("TALLY_MAX_SESSIONS") {
            config.max_sessions = match max.trim().parse::<usize>() {
                Ok(0) => {
                    return Err(ConfigError {
                        var: "TALLY_MAX_SESSIONS",
                        message: "must be at least 1".to_string(),
                    });
                }
                Ok(value) => value,
                Err(err) => {
                    return Err(ConfigError {
                        var: "TALLY_MAX_SESSIONS",
                        message: format!("{err}"),
                    });
                }
            };
        }

        Ok(config)
    }
}
