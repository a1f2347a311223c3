//! Server configuration
//!
//! Read from `HOSTMCP_*` environment variables, falling back to defaults for
//! anything unset.

use {
    crate::validation::SchemaValidation,
    serde::{Deserialize, Serialize},
    std::{
        net::{IpAddr, Ipv4Addr, SocketAddr},
        str::FromStr,
    },
    thiserror::Error,
};

pub const ENV_HOST: &str = "HOSTMCP_HOST";
pub const ENV_PORT: &str = "HOSTMCP_PORT";
pub const ENV_MAX_BODY_BYTES: &str = "HOSTMCP_MAX_BODY_BYTES";
pub const ENV_SCHEMA_VALIDATION: &str = "HOSTMCP_SCHEMA_VALIDATION";
pub const ENV_CORS: &str = "HOSTMCP_CORS";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value '{value}' for {var}: {reason}")]
    InvalidValue {
        var: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    /// Largest accepted request body
    pub max_body_bytes: u64,
    pub schema_validation: SchemaValidation,
    /// Send `Access-Control-*` headers
    pub cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 3000,
            max_body_bytes: 2 * 1024 * 1024, // 2MB
            schema_validation: SchemaValidation::Enforce,
            cors: true,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        Ok(Self {
            host: parse_var(&lookup, ENV_HOST)?.unwrap_or(defaults.host),
            port: parse_var(&lookup, ENV_PORT)?.unwrap_or(defaults.port),
            max_body_bytes: parse_var(&lookup, ENV_MAX_BODY_BYTES)?
                .unwrap_or(defaults.max_body_bytes),
            schema_validation: parse_var(&lookup, ENV_SCHEMA_VALIDATION)?
                .unwrap_or(defaults.schema_validation),
            cors: match lookup(ENV_CORS) {
                Some(raw) => parse_flag(ENV_CORS, &raw)?,
                None => defaults.cors,
            },
        })
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let Some(raw) = lookup(var) else {
        return Ok(None);
    };
    raw.trim()
        .parse()
        .map(Some)
        .map_err(|e: T::Err| ConfigError::InvalidValue {
            var,
            value: raw.clone(),
            reason: e.to_string(),
        })
}

fn parse_flag(var: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            var,
            value: raw.to_string(),
            reason: "expected a boolean".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = ServerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3000");
    }

    #[test]
    fn test_overrides() {
        let config = ServerConfig::from_lookup(lookup(&[
            (ENV_HOST, "0.0.0.0"),
            (ENV_PORT, "8080"),
            (ENV_SCHEMA_VALIDATION, "off"),
            (ENV_CORS, "false"),
        ]))
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.schema_validation, SchemaValidation::Off);
        assert!(!config.cors);
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:8080");
    }

    #[test]
    fn test_invalid_value_names_variable() {
        let err = ServerConfig::from_lookup(lookup(&[(ENV_PORT, "eighty")])).unwrap_err();
        assert!(err.to_string().contains(ENV_PORT));

        let err = ServerConfig::from_lookup(lookup(&[(ENV_CORS, "maybe")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { var: ENV_CORS, .. }));
    }
}
