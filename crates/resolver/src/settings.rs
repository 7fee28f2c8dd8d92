//! Network selection and process-wide resolver configuration.
//!
//! Configuration is read once at startup from an optional TOML file and
//! `LAND_*` environment variables (environment wins). The chosen network
//! fixes the registry addresses for the life of the process.

use crate::errors::ConfigError;
use config::{Config, Environment, File as ConfigFile};
use land_types::Address;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

pub const ENV_PREFIX: &str = "LAND";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Ledger network whose registries the resolver reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    Ropsten,
}

#[derive(Clone, Copy, Debug)]
struct NetworkDefaults {
    name: &'static str,
    land_registry: &'static str,
    estate_registry: &'static str,
    provider_url: &'static str,
}

impl Network {
    fn defaults(&self) -> NetworkDefaults {
        match self {
            Network::Mainnet => NetworkDefaults {
                name: "mainnet",
                land_registry: "0xf87e31492faf9a91b02ee0deaad50d51d56d5d4d",
                estate_registry: "0x959e104e1a4db6317fa58f8295f586e1a978c297",
                provider_url: "https://mainnet.infura.io/",
            },
            Network::Ropsten => NetworkDefaults {
                name: "ropsten",
                land_registry: "0x7a73483784ab79257bb11b96fd62a2c3ae4fb75b",
                estate_registry: "0x124bf28a423b2ca80b3846c3aa0eb944fe7ebb95",
                provider_url: "https://ropsten.infura.io/",
            },
        }
    }

    /// Debug deployments run against the test network.
    pub fn from_debug_flag(debug: bool) -> Self {
        if debug {
            Network::Ropsten
        } else {
            Network::Mainnet
        }
    }

    pub fn name(&self) -> &'static str {
        self.defaults().name
    }

    pub fn default_provider_url(&self) -> &'static str {
        self.defaults().provider_url
    }

    /// Registry deployment addresses for this network.
    pub fn addresses(&self) -> Result<RegistryAddresses, ConfigError> {
        let defaults = self.defaults();
        Ok(RegistryAddresses {
            land_registry: parse_address("LAND registry", defaults.land_registry)?,
            estate_registry: parse_address("Estate registry", defaults.estate_registry)?,
        })
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Network {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Network::Mainnet),
            "ropsten" => Ok(Network::Ropsten),
            other => Err(ConfigError::UnknownNetwork(other.to_string())),
        }
    }
}

fn parse_address(name: &'static str, value: &str) -> Result<Address, ConfigError> {
    Address::parse(value).map_err(|source| ConfigError::InvalidAddress { name, source })
}

/// Deployed registry contracts of one network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryAddresses {
    pub land_registry: Address,
    pub estate_registry: Address,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(ConfigError::UnknownLogFormat(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Immutable resolver configuration, built once per process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    pub network: Network,
    pub provider_url: String,
    pub request_timeout: Duration,
    pub addresses: RegistryAddresses,
    pub logging: LoggingConfig,
}

impl ResolverConfig {
    /// Defaults for a network, with no file or environment applied.
    pub fn for_network(network: Network) -> Result<Self, ConfigError> {
        Ok(Self {
            network,
            provider_url: network.default_provider_url().to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            addresses: network.addresses()?,
            logging: LoggingConfig::default(),
        })
    }

    /// Load from an optional TOML file plus `LAND_*` environment variables.
    ///
    /// A path that is given but missing is an error rather than silently
    /// falling back to defaults.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::FileNotFound(path.to_path_buf()));
            }
            builder = builder.add_source(ConfigFile::from(path));
        }

        builder = builder.add_source(Environment::with_prefix(ENV_PREFIX));

        Self::from_config(&builder.build()?)
    }

    /// Resolve settings from an already assembled [`Config`].
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let network = match get_string(config, "network") {
            Some(value) => value.parse()?,
            None => Network::from_debug_flag(config.get_bool("debug").unwrap_or(false)),
        };

        let mut resolved = Self::for_network(network)?;

        if let Some(url) = get_string(config, "provider_url") {
            resolved.provider_url = url;
        }
        if let Ok(secs) = config.get_int("request_timeout_secs") {
            resolved.request_timeout = Duration::from_secs(secs.max(1) as u64);
        }
        if let Some(level) = get_string(config, "log_level") {
            resolved.logging.level = level;
        }
        if let Some(format) = get_string(config, "log_format") {
            resolved.logging.format = format.parse()?;
        }

        Ok(resolved)
    }
}

fn get_string(config: &Config, key: &str) -> Option<String> {
    config
        .get_string(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;
    use std::io::Write;

    fn from_toml(toml: &str) -> Result<ResolverConfig, ConfigError> {
        let config = Config::builder()
            .add_source(ConfigFile::from_str(toml, FileFormat::Toml))
            .build()?;
        ResolverConfig::from_config(&config)
    }

    #[test]
    fn defaults_to_mainnet() {
        let resolved = from_toml("").unwrap();
        assert_eq!(resolved.network, Network::Mainnet);
        assert_eq!(resolved.provider_url, "https://mainnet.infura.io/");
        assert_eq!(
            resolved.addresses.land_registry.as_str(),
            "0xf87e31492faf9a91b02ee0deaad50d51d56d5d4d"
        );
        assert_eq!(resolved.request_timeout, Duration::from_secs(10));
        assert_eq!(resolved.logging, LoggingConfig::default());
    }

    #[test]
    fn debug_flag_selects_test_network() {
        let resolved = from_toml("debug = true").unwrap();
        assert_eq!(resolved.network, Network::Ropsten);
        assert_eq!(
            resolved.addresses.estate_registry.as_str(),
            "0x124bf28a423b2ca80b3846c3aa0eb944fe7ebb95"
        );
    }

    #[test]
    fn explicit_network_wins_over_debug_flag() {
        let resolved = from_toml("network = \"mainnet\"\ndebug = true").unwrap();
        assert_eq!(resolved.network, Network::Mainnet);
    }

    #[test]
    fn overrides_apply() {
        let resolved = from_toml(
            r#"
            network = "ropsten"
            provider_url = "http://127.0.0.1:8545"
            request_timeout_secs = 3
            log_level = "debug"
            log_format = "json"
            "#,
        )
        .unwrap();
        assert_eq!(resolved.provider_url, "http://127.0.0.1:8545");
        assert_eq!(resolved.request_timeout, Duration::from_secs(3));
        assert_eq!(resolved.logging.level, "debug");
        assert_eq!(resolved.logging.format, LogFormat::Json);
    }

    #[test]
    fn rejects_unknown_network() {
        let err = from_toml("network = \"kovan\"").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownNetwork(name) if name == "kovan"));
    }

    #[test]
    fn missing_file_is_reported() {
        let err = ResolverConfig::load(Some(Path::new("/nonexistent/land.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "network = \"ropsten\"").unwrap();
        writeln!(file, "log_level = \"warn\"").unwrap();

        let resolved = ResolverConfig::load(Some(file.path())).unwrap();
        assert_eq!(resolved.network, Network::Ropsten);
        assert_eq!(resolved.logging.level, "warn");
    }
}
