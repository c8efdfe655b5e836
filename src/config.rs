use std::time::Duration;

use anyhow::Result;
use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::Deserialize;

pub static CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_mirror_base")]
    pub mirror_base: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_mirror_base() -> String {
    "https://tikwm.com".into()
}

fn default_timeout_secs() -> u64 {
    5
}

fn default_user_agent() -> String {
    concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).into()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mirror_base: default_mirror_base(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl Config {
    pub fn get_config() -> Result<Self> {
        Self::from_figment(
            Figment::new()
                .merge(Toml::file(CONFIG_FILE))
                .merge(Env::prefixed("SQT_")),
        )
    }

    fn from_figment(figment: Figment) -> Result<Self> {
        Ok(figment.extract()?)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use figment::providers::Serialized;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::from_figment(Figment::new()).unwrap();
        assert_eq!("https://tikwm.com", config.mirror_base);
        assert_eq!(Duration::from_secs(5), config.timeout());
        assert!(config.user_agent.starts_with("source-quality-toks/"));
    }

    #[test]
    fn test_override() {
        let config = Config::from_figment(
            Figment::new()
                .merge(Toml::string("mirror_base = \"http://127.0.0.1:8080\""))
                .merge(Serialized::default("timeout_secs", 30)),
        )
        .unwrap();
        assert_eq!("http://127.0.0.1:8080", config.mirror_base);
        assert_eq!(30, config.timeout_secs);
    }

    #[test]
    fn test_bad_type() {
        let result = Config::from_figment(
            Figment::new().merge(Toml::string("timeout_secs = \"soon\"")),
        );
        assert!(result.is_err());
    }
}
