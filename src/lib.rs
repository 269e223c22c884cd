//! Resource-oriented client for Alibaba Cloud ECS
//!
//! [`get_resource`] resolves a service name to a [`Resource`]; its
//! [`Resource::instances`] collection is filtered and paginated lazily and
//! yields [`Instance`] proxies that can start, stop, reboot, renew,
//! reactivate and delete the remote instance.

pub mod aliyun;
pub mod config;
pub mod error;
pub mod resource;

pub use config::Config;
pub use error::{Error, ErrorCategory, RemoteError, Result};
pub use resource::{
    get_resource, Instance, InstanceStatus, Page, Resource, ResourceCollection, Transport,
};
