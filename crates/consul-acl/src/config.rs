//! Client and manager configuration.
//!
//! Settings that are not given explicitly fall back to the same environment
//! variables the Consul CLI reads, with the `CONSUL_HTTP_*` names as the
//! second choice.

use serde::{Deserialize, Serialize};

use crate::error::{AclError, Result};

pub const DEFAULT_ADDRESS: &str = "localhost:8500";
pub const DEFAULT_SCHEME: &str = "http";

/// Connection settings for the ACL service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// `host:port` of the agent.
    pub address: String,
    /// Token used to authenticate management calls.
    pub token: String,
    /// `http` or `https`.
    pub scheme: String,
    pub ca_file: Option<String>,
    pub cert_file: Option<String>,
    pub key_file: Option<String>,
    pub tls_skip_verify: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS.to_string(),
            token: String::new(),
            scheme: DEFAULT_SCHEME.to_string(),
            ca_file: None,
            cert_file: None,
            key_file: None,
            tls_skip_verify: false,
        }
    }
}

impl ClientConfig {
    /// Configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let first = |names: &[&str]| {
            names
                .iter()
                .filter_map(|name| lookup(*name))
                .find(|value| !value.is_empty())
        };

        let defaults = Self::default();
        Self {
            address: first(&["CONSUL_ADDRESS", "CONSUL_HTTP_ADDR"]).unwrap_or(defaults.address),
            token: first(&["CONSUL_TOKEN", "CONSUL_HTTP_TOKEN"]).unwrap_or(defaults.token),
            scheme: first(&["CONSUL_SCHEME", "CONSUL_HTTP_SCHEME"]).unwrap_or(defaults.scheme),
            ca_file: first(&["CONSUL_CA_FILE"]),
            cert_file: first(&["CONSUL_CERT_FILE"]),
            key_file: first(&["CONSUL_KEY_FILE"]),
            tls_skip_verify: first(&["CONSUL_TLS_SKIP_VERIFY"])
                .map(|v| matches!(v.to_ascii_lowercase().as_str(), "true" | "1"))
                .unwrap_or(false),
        }
    }

    /// Check that the settings can be used to reach the service.
    pub fn validate(&self) -> Result<()> {
        if self.address.trim().is_empty() {
            return Err(AclError::InvalidConfig("address must not be empty".into()));
        }
        if !matches!(self.scheme.as_str(), "http" | "https") {
            return Err(AclError::InvalidConfig(format!(
                "scheme must be \"http\" or \"https\", got {:?}",
                self.scheme
            )));
        }
        if self.cert_file.is_some() != self.key_file.is_some() {
            return Err(AclError::InvalidConfig(
                "cert_file and key_file must be set together".into(),
            ));
        }
        Ok(())
    }

    /// `scheme://address`.
    pub fn base_url(&self) -> String {
        format!("{}://{}", self.scheme, self.address)
    }
}

/// Configuration for the [`TokenManager`](crate::TokenManager).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    pub client: ClientConfig,
    /// Present rules read back from the service in canonical order rather
    /// than the order the stored document lists them.
    pub canonicalize_reads: bool,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            client: ClientConfig::default(),
            canonicalize_reads: true,
        }
    }
}
