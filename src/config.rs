//! Configuration Management
//!
//! Resolves credentials, region and endpoint from the environment and from
//! `~/aliyun_sdk_config.json`. Environment values win over the file.

use crate::aliyun::auth::{self, Credentials};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Region used when nothing else names one
pub const DEFAULT_REGION: &str = "cn-hangzhou";

/// SDK configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub access_key_id: Option<String>,
    #[serde(default)]
    pub access_key_secret: Option<String>,
    #[serde(default)]
    pub region_id: Option<String>,
    /// Full base URL replacing the registry endpoint
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Config {
    /// Load `~/aliyun_sdk_config.json` (if present), then apply environment overrides
    pub fn load() -> Result<Self> {
        let mut config = match auth::sdk_config_path() {
            Some(path) if path.exists() => Self::load_from(&path)?,
            _ => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    /// Load a config file without looking at the environment
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))?;
        serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("invalid {}: {}", path.display(), e)))
    }

    /// Save configuration to disk
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::Config(format!("cannot create {}: {}", parent.display(), e)))?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| Error::Config(e.to_string()))?;
        std::fs::write(path, content)
            .map_err(|e| Error::Config(format!("cannot write {}: {}", path.display(), e)))
    }

    /// Overlay values found in `ALIBABA_CLOUD_*` environment variables
    pub fn apply_env(&mut self) {
        if let Some(v) = auth::env_value(auth::ENV_ACCESS_KEY_ID) {
            self.access_key_id = Some(v);
        }
        if let Some(v) = auth::env_value(auth::ENV_ACCESS_KEY_SECRET) {
            self.access_key_secret = Some(v);
        }
        if let Some(v) = auth::env_value(auth::ENV_REGION_ID) {
            self.region_id = Some(v);
        }
        if let Some(v) = auth::env_value(auth::ENV_ENDPOINT) {
            self.endpoint = Some(v);
        }
    }

    /// Builder-style credential override
    pub fn with_credentials(mut self, access_key_id: &str, access_key_secret: &str) -> Self {
        self.access_key_id = Some(access_key_id.to_string());
        self.access_key_secret = Some(access_key_secret.to_string());
        self
    }

    pub fn with_region(mut self, region_id: &str) -> Self {
        self.region_id = Some(region_id.to_string());
        self
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = Some(endpoint.to_string());
        self
    }

    /// Access key pair; both halves are required
    pub fn credentials(&self) -> Result<Credentials> {
        match (&self.access_key_id, &self.access_key_secret) {
            (Some(id), Some(secret)) if !id.is_empty() && !secret.is_empty() => {
                Ok(Credentials::new(id.as_str(), secret.as_str()))
            }
            _ => Err(Error::Config(format!(
                "access key id and secret are required (set {} and {})",
                auth::ENV_ACCESS_KEY_ID,
                auth::ENV_ACCESS_KEY_SECRET
            ))),
        }
    }

    /// Get effective region (config > default)
    pub fn effective_region(&self) -> Result<String> {
        let region = self
            .region_id
            .clone()
            .unwrap_or_else(|| DEFAULT_REGION.to_string());
        if !auth::validate_region_id(&region) {
            return Err(Error::Config(format!("invalid region id: {}", region)));
        }
        Ok(region)
    }

    /// Endpoint override, validated as a URL
    pub fn effective_endpoint(&self) -> Result<Option<String>> {
        match &self.endpoint {
            Some(endpoint) => {
                url::Url::parse(endpoint)
                    .map_err(|e| Error::Config(format!("invalid endpoint {}: {}", endpoint, e)))?;
                Ok(Some(endpoint.clone()))
            }
            None => Ok(None),
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}
