//! Server configuration

use anyhow::{Context, Result};
use protocol::{DISCOVERY_PORT, OFFER_INTERVAL};
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use std::path::Path;
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub discovery: DiscoveryConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Name advertised in offers (truncated to 32 bytes on the wire)
    pub server_name: String,
    pub bind_address: IpAddr,
    /// 0 lets the OS pick an ephemeral port
    pub tcp_port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    pub broadcast_address: IpAddr,
    pub udp_port: u16,
    pub offer_interval_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub read_timeout_sec: u64,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            server_name: "Blackjack Dealer".to_string(),
            bind_address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            tcp_port: 0,
        }
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            broadcast_address: IpAddr::V4(Ipv4Addr::BROADCAST),
            udp_port: DISCOVERY_PORT,
            offer_interval_ms: OFFER_INTERVAL.as_millis() as u64,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { read_timeout_sec: 10 }
    }
}

impl DiscoveryConfig {
    pub fn offer_interval(&self) -> Duration {
        Duration::from_millis(self.offer_interval_ms)
    }
}

impl SessionConfig {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_sec)
    }
}

impl Config {
    /// Load configuration from a TOML file, falling back to defaults when
    /// the file does not exist
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!("No config file at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .context("Failed to parse config file")?;

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.general.server_name.trim().is_empty() {
            anyhow::bail!("server_name must not be empty");
        }
        if self.discovery.offer_interval_ms == 0 {
            anyhow::bail!("offer_interval_ms must be greater than zero");
        }
        if self.session.read_timeout_sec == 0 {
            anyhow::bail!("read_timeout_sec must be greater than zero");
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
        assert_eq!(config.general.tcp_port, 0);
        assert_eq!(config.discovery.udp_port, 13122);
        assert_eq!(config.discovery.offer_interval(), Duration::from_secs(1));
        assert_eq!(config.session.read_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_partial_file() {
        let config = Config::parse(
            r#"
            [general]
            server_name = "Lucky Seven"
            tcp_port = 4242

            [session]
            read_timeout_sec = 3
            "#,
        )
        .unwrap();
        assert_eq!(config.general.server_name, "Lucky Seven");
        assert_eq!(config.general.tcp_port, 4242);
        assert_eq!(config.session.read_timeout_sec, 3);
        assert_eq!(config.discovery.udp_port, 13122);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(Config::parse("[discovery]\noffer_interval_ms = 0").is_err());
        assert!(Config::parse("[session]\nread_timeout_sec = 0").is_err());
        assert!(Config::parse("[general]\nserver_name = \"  \"").is_err());
        assert!(Config::parse("[general]\nbind_address = \"not-an-ip\"").is_err());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = Config::load("/nonexistent/blackjack-server.conf").unwrap();
        assert_eq!(config.general.server_name, "Blackjack Dealer");
    }
}
