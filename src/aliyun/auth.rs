//! Alibaba Cloud Authentication
//!
//! Access key credentials and the environment/home-directory locations they
//! are read from.

use std::fmt;
use std::path::PathBuf;

/// Environment variable holding the access key id
pub const ENV_ACCESS_KEY_ID: &str = "ALIBABA_CLOUD_ACCESS_KEY_ID";
/// Environment variable holding the access key secret
pub const ENV_ACCESS_KEY_SECRET: &str = "ALIBABA_CLOUD_ACCESS_KEY_SECRET";
/// Environment variable holding the region id
pub const ENV_REGION_ID: &str = "ALIBABA_CLOUD_REGION_ID";
/// Environment variable holding an endpoint override (full base URL)
pub const ENV_ENDPOINT: &str = "ALIBABA_CLOUD_ENDPOINT";

/// File name of the SDK config in the home directory
const SDK_CONFIG_FILE: &str = "aliyun_sdk_config.json";

/// Access key pair used to sign RPC requests
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_key_id: String,
    pub access_key_secret: String,
}

impl Credentials {
    pub fn new(access_key_id: impl Into<String>, access_key_secret: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            access_key_secret: access_key_secret.into(),
        }
    }
}

// Security: never print the secret, and only a hint of the key id
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &mask_credential(&self.access_key_id))
            .field("access_key_secret", &"****")
            .finish()
    }
}

/// Mask sensitive credential values for logging
pub fn mask_credential(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 8 {
        "*".repeat(chars.len())
    } else {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    }
}

/// Read a non-empty environment variable
pub fn env_value(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Location of `~/aliyun_sdk_config.json`
pub fn sdk_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|p| p.join(SDK_CONFIG_FILE))
}

/// Validate a region id such as `cn-hangzhou` or `ap-southeast-1`
pub fn validate_region_id(region: &str) -> bool {
    !region.is_empty()
        && region.len() <= 32
        && !region.starts_with('-')
        && !region.ends_with('-')
        && region
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}
