//! Service Registry - Load service definitions from JSON
//!
//! This module loads the service bindings from embedded JSON files and
//! provides lookup functions for the resource factory.

use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

/// Embedded service JSON files (compiled into the binary)
const SERVICE_FILES: &[&str] = &[include_str!("../resources/ecs.json")];

/// Page size used when a binding does not set one (provider default)
const FALLBACK_PAGE_SIZE: u32 = 10;

/// Lifecycle operations an instance binding can map to wire actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstanceAction {
    Start,
    Stop,
    Reboot,
    Renew,
    Reactivate,
    Delete,
}

impl InstanceAction {
    pub const ALL: [InstanceAction; 6] = [
        InstanceAction::Start,
        InstanceAction::Stop,
        InstanceAction::Reboot,
        InstanceAction::Renew,
        InstanceAction::Reactivate,
        InstanceAction::Delete,
    ];

    /// Key used in the `actions` table of the JSON definitions
    pub fn key(self) -> &'static str {
        match self {
            InstanceAction::Start => "start",
            InstanceAction::Stop => "stop",
            InstanceAction::Reboot => "reboot",
            InstanceAction::Renew => "renew",
            InstanceAction::Reactivate => "reactivate",
            InstanceAction::Delete => "delete",
        }
    }
}

impl fmt::Display for InstanceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Binding of the instance collection and proxy to wire names
#[derive(Debug, Clone, Deserialize)]
pub struct InstanceBinding {
    pub list_action: String,
    /// Dot-separated path to the record array in a list response
    pub response_path: String,
    pub id_field: String,
    pub id_param: String,
    #[serde(default)]
    pub default_page_size: Option<u32>,
    /// Recognized filter keys; empty means any key is passed through
    #[serde(default)]
    pub filters: Vec<String>,
    #[serde(default)]
    pub actions: HashMap<String, String>,
}

impl InstanceBinding {
    /// Wire action name for a lifecycle operation
    pub fn action_name(&self, action: InstanceAction) -> Option<&str> {
        self.actions.get(action.key()).map(|s| s.as_str())
    }

    pub fn page_size(&self) -> u32 {
        self.default_page_size
            .filter(|n| *n > 0)
            .unwrap_or(FALLBACK_PAGE_SIZE)
    }

    /// Check a filter key against the binding's policy
    pub fn accepts_filter(&self, key: &str) -> bool {
        self.filters.is_empty() || self.filters.iter().any(|f| f == key)
    }
}

/// Service definition from JSON
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceDef {
    pub display_name: String,
    pub product: String,
    pub api_version: String,
    /// Host template; `{region}` is replaced with the region id
    pub endpoint: String,
    pub instances: InstanceBinding,
}

impl ServiceDef {
    /// Resolve the API host for a region
    pub fn endpoint_for(&self, region_id: &str) -> String {
        self.endpoint.replace("{region}", region_id)
    }
}

/// Root structure of resources/*.json
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub services: HashMap<String, ServiceDef>,
}

/// Global registry loaded from JSON
static REGISTRY: OnceLock<ServiceConfig> = OnceLock::new();

/// Get the service registry (loads from embedded JSON on first access)
pub fn get_registry() -> &'static ServiceConfig {
    REGISTRY.get_or_init(|| {
        let mut final_config = ServiceConfig {
            services: HashMap::new(),
        };

        for content in SERVICE_FILES {
            let partial: ServiceConfig = serde_json::from_str(content)
                .unwrap_or_else(|e| panic!("Failed to parse embedded service JSON: {}", e));
            final_config.services.extend(partial.services);
        }

        final_config
    })
}

/// Get a service definition by name (case-insensitive)
pub fn get_service(name: &str) -> Option<&'static ServiceDef> {
    get_registry().services.get(&name.to_ascii_lowercase())
}

/// Get all registered service names
pub fn get_all_service_names() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = get_registry()
        .services
        .keys()
        .map(|s| s.as_str())
        .collect();
    names.sort_unstable();
    names
}
