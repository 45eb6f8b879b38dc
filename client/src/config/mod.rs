//! Configuration management

use anyhow::{Context, Result};
use protocol::DISCOVERY_PORT;
use protocol::rules::BUST_LIMIT;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub discovery: DiscoveryConfig,
    pub session: SessionConfig,
    pub strategy: StrategyConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub team_name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    pub udp_port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub read_timeout_sec: u64,
    pub connect_timeout_sec: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyMode {
    /// Ask on stdin for every decision
    Prompt,
    /// Hit below `hit_below`, stand otherwise
    Auto,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    pub mode: StrategyMode,
    pub hit_below: u16,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            team_name: "Team Joker".to_string(),
        }
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            udp_port: DISCOVERY_PORT,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            read_timeout_sec: 10,
            connect_timeout_sec: 5,
        }
    }
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            mode: StrategyMode::Prompt,
            hit_below: 17,
        }
    }
}

impl SessionConfig {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_sec)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_sec)
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!("No config file at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)
            .with_context(|| "Failed to parse config file")?;

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.general.team_name.trim().is_empty() {
            anyhow::bail!("team_name must not be empty");
        }
        if self.session.read_timeout_sec == 0 || self.session.connect_timeout_sec == 0 {
            anyhow::bail!("session timeouts must be greater than zero");
        }
        if !(2..=BUST_LIMIT).contains(&self.strategy.hit_below) {
            anyhow::bail!("hit_below must be between 2 and {}", BUST_LIMIT);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.general.team_name, "Team Joker");
        assert_eq!(config.discovery.udp_port, 13122);
        assert_eq!(config.strategy.mode, StrategyMode::Prompt);
        assert_eq!(config.session.read_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_auto_strategy_section() {
        let config = Config::parse(
            r#"
            [general]
            team_name = "Card Sharks"

            [strategy]
            mode = "auto"
            hit_below = 15
            "#,
        )
        .unwrap();
        assert_eq!(config.general.team_name, "Card Sharks");
        assert_eq!(config.strategy.mode, StrategyMode::Auto);
        assert_eq!(config.strategy.hit_below, 15);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(Config::parse("[strategy]\nhit_below = 22").is_err());
        assert!(Config::parse("[strategy]\nmode = \"psychic\"").is_err());
        assert!(Config::parse("[session]\nread_timeout_sec = 0").is_err());
        assert!(Config::parse("[general]\nteam_name = \"\"").is_err());
    }
}
