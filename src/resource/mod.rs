//! Resource abstraction layer
//!
//! This module turns a paged list endpoint into a lazy collection of
//! instance proxies. Service bindings are loaded from JSON files at compile
//! time, so wire names live in data rather than code.
//!
//! # Architecture
//!
//! - [`registry`] - Loads and caches service definitions from embedded JSON
//! - [`transport`] - The request/response boundary the engine talks through
//! - [`collection`] - Lazy, filterable, paginated collections
//! - [`instance`] - Per-record proxies with lifecycle actions
//! - `factory` - Resolves a service name to a bound [`Resource`]
//!
//! # Service Definitions
//!
//! Services are defined in JSON files under `src/resources/`:
//! - `ecs.json` - Elastic Compute Service instances
//!
//! # Example
//!
//! ```ignore
//! use alicloud_resource::{get_resource, Config};
//! use futures::TryStreamExt;
//!
//! async fn stopped(config: &Config) -> alicloud_resource::Result<usize> {
//!     let resource = get_resource("ecs", config)?;
//!     let stopped = resource.instances().filter([("Status", "Stopped")])?;
//!     let instances: Vec<_> = stopped.stream().try_collect().await?;
//!     Ok(instances.len())
//! }
//! ```

pub mod collection;
mod factory;
pub mod instance;
pub mod registry;
pub mod transport;

pub use collection::ResourceCollection;
pub use factory::{get_resource, Resource, SERVICE_NOT_FOUND_CODE, SERVICE_NOT_FOUND_MESSAGE};
pub use instance::{Instance, InstanceStatus};
pub use registry::{get_all_service_names, get_service, InstanceAction, InstanceBinding, ServiceDef};
pub use transport::{ActionRequest, ListRequest, Page, Query, Record, Transport};
