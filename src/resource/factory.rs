//! Resource Factory
//!
//! Resolves a service name to a [`Resource`] whose collections are bound to
//! that service's endpoints.

use super::collection::ResourceCollection;
use super::registry::{get_service, InstanceBinding, ServiceDef};
use super::transport::Transport;
use crate::aliyun::{AcsClient, ClientOptions};
use crate::config::Config;
use crate::error::{RemoteError, Result};
use std::fmt;
use std::sync::Arc;

/// Error code for a service name with no registry entry
pub const SERVICE_NOT_FOUND_CODE: &str = "SDK.ServiceNameNotFound";
/// Provider-compatible message for [`SERVICE_NOT_FOUND_CODE`]
pub const SERVICE_NOT_FOUND_MESSAGE: &str = "You provide is not ECS Service";

fn lookup(service_name: &str) -> Result<&'static ServiceDef> {
    get_service(service_name).ok_or_else(|| {
        tracing::warn!("Unknown service name: {}", service_name);
        RemoteError::client(SERVICE_NOT_FOUND_CODE, SERVICE_NOT_FOUND_MESSAGE).into()
    })
}

/// Top-level resource for one service, region and credential set
#[derive(Clone)]
pub struct Resource {
    service: &'static ServiceDef,
    binding: Arc<InstanceBinding>,
    transport: Arc<dyn Transport>,
}

impl Resource {
    /// Bind a registered service to an existing transport
    pub fn with_transport(service_name: &str, transport: Arc<dyn Transport>) -> Result<Self> {
        let service = lookup(service_name)?;
        Ok(Self {
            service,
            binding: Arc::new(service.instances.clone()),
            transport,
        })
    }

    /// Collection over every instance visible to these credentials
    pub fn instances(&self) -> ResourceCollection {
        ResourceCollection::new(self.transport.clone(), self.binding.clone())
    }

    pub fn service(&self) -> &'static ServiceDef {
        self.service
    }

    pub fn transport(&self) -> Arc<dyn Transport> {
        self.transport.clone()
    }
}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("service", &self.service.product)
            .field("api_version", &self.service.api_version)
            .finish()
    }
}

/// Resolve `service_name` (case-insensitive) and connect it with `config`
///
/// The name is checked before the configuration, so an unknown service is
/// reported as `SDK.ServiceNameNotFound` even without credentials.
pub fn get_resource(service_name: &str, config: &Config) -> Result<Resource> {
    let service = lookup(service_name)?;
    let region_id = config.effective_region()?;
    let client = AcsClient::new(
        config.credentials()?,
        &region_id,
        service,
        ClientOptions {
            endpoint: config.effective_endpoint()?,
            timeout: config.timeout(),
        },
    )?;

    tracing::info!("Using {} in region {}", service.display_name, region_id);
    Resource::with_transport(service_name, Arc::new(client))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, ErrorCategory};

    fn config() -> Config {
        Config::default()
            .with_credentials("testid", "testsecret")
            .with_region("cn-hangzhou")
    }

    #[test]
    fn test_unknown_service_is_client_error() {
        let err = get_resource("rds", &config()).unwrap_err();
        assert_eq!(err.category(), Some(ErrorCategory::Client));
        assert_eq!(err.code(), Some("SDK.ServiceNameNotFound"));
        assert_eq!(err.message(), Some("You provide is not ECS Service"));
    }

    #[test]
    fn test_unknown_service_checked_before_credentials() {
        let err = get_resource("rds", &Config::default()).unwrap_err();
        assert_eq!(err.code(), Some("SDK.ServiceNameNotFound"));
    }

    #[test]
    fn test_resolves_case_insensitively() {
        for name in ["ecs", "ECS"] {
            let resource = get_resource(name, &config()).unwrap();
            assert_eq!(resource.service().product, "Ecs");
            assert_eq!(resource.instances().binding().list_action, "DescribeInstances");
        }
    }

    #[test]
    fn test_missing_credentials_is_config_error() {
        let err = get_resource("ecs", &Config::default()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
