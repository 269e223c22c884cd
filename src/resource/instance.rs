//! Instance proxy
//!
//! An [`Instance`] is a snapshot of one record from a list page plus the
//! transport needed to drive the remote entity. Lifecycle calls do not
//! update the snapshot; use [`Instance::refresh`] to see the new state.

use super::collection::ResourceCollection;
use super::registry::{InstanceAction, InstanceBinding};
use super::transport::{ActionRequest, Record, Transport};
use crate::error::{Error, Result};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Remote lifecycle states reported in the `Status` field
///
/// `Starting -> Running -> Stopping -> Stopped -> (Starting | deleted)`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum InstanceStatus {
    Pending,
    Starting,
    Running,
    Stopping,
    Stopped,
    Other(String),
}

impl InstanceStatus {
    pub fn as_str(&self) -> &str {
        match self {
            InstanceStatus::Pending => "Pending",
            InstanceStatus::Starting => "Starting",
            InstanceStatus::Running => "Running",
            InstanceStatus::Stopping => "Stopping",
            InstanceStatus::Stopped => "Stopped",
            InstanceStatus::Other(s) => s,
        }
    }

    /// In between two stable states
    pub fn is_transitioning(&self) -> bool {
        matches!(
            self,
            InstanceStatus::Pending | InstanceStatus::Starting | InstanceStatus::Stopping
        )
    }
}

impl From<&str> for InstanceStatus {
    fn from(value: &str) -> Self {
        match value {
            "Pending" => InstanceStatus::Pending,
            "Starting" => InstanceStatus::Starting,
            "Running" => InstanceStatus::Running,
            "Stopping" => InstanceStatus::Stopping,
            "Stopped" => InstanceStatus::Stopped,
            other => InstanceStatus::Other(other.to_string()),
        }
    }
}

impl fmt::Display for InstanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One remote compute instance as last fetched
#[derive(Clone)]
pub struct Instance {
    record: Record,
    id: String,
    binding: Arc<InstanceBinding>,
    transport: Arc<dyn Transport>,
}

impl Instance {
    /// Wrap a listed record; fails when it has no string identifier
    pub(crate) fn new(
        record: Record,
        binding: Arc<InstanceBinding>,
        transport: Arc<dyn Transport>,
    ) -> Result<Self> {
        let id = record
            .get(&binding.id_field)
            .and_then(|v| v.as_str())
            .filter(|id| !id.is_empty())
            .ok_or_else(|| Error::UnknownField(binding.id_field.clone()))?
            .to_string();
        Ok(Self {
            record,
            id,
            binding,
            transport,
        })
    }

    /// Field by its provider name, e.g. `InstanceName`
    pub fn get(&self, field: &str) -> Result<&Value> {
        self.record
            .get(field)
            .ok_or_else(|| Error::UnknownField(field.to_string()))
    }

    /// String field by its provider name
    pub fn get_str(&self, field: &str) -> Result<&str> {
        self.get(field)?
            .as_str()
            .ok_or_else(|| Error::UnknownField(field.to_string()))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> Result<&str> {
        self.get_str("InstanceName")
    }

    /// Status at fetch time
    pub fn status(&self) -> Result<InstanceStatus> {
        self.get_str("Status").map(InstanceStatus::from)
    }

    pub fn raw(&self) -> &Record {
        &self.record
    }

    pub async fn start(&self) -> Result<()> {
        self.perform(InstanceAction::Start, Map::new()).await
    }

    pub async fn stop(&self) -> Result<()> {
        self.perform(InstanceAction::Stop, Map::new()).await
    }

    pub async fn reboot(&self) -> Result<()> {
        self.perform(InstanceAction::Reboot, Map::new()).await
    }

    /// Renew a subscription instance for `period` months
    ///
    /// Without a period the request is still sent; the provider rejects it
    /// with `MissingParameter`.
    pub async fn renew(&self, period: Option<u32>) -> Result<()> {
        self.perform(InstanceAction::Renew, period_params(period))
            .await
    }

    pub async fn reactivate(&self, period: Option<u32>) -> Result<()> {
        self.perform(InstanceAction::Reactivate, period_params(period))
            .await
    }

    /// Release the instance. The provider only accepts this once `Stopped`.
    pub async fn delete(&self) -> Result<()> {
        self.perform(InstanceAction::Delete, Map::new()).await
    }

    /// Fetch this instance again; `None` once it no longer exists
    pub async fn refresh(&self) -> Result<Option<Instance>> {
        ResourceCollection::new(self.transport.clone(), self.binding.clone())
            .find_by_id(&self.id)
            .await
    }

    async fn perform(&self, action: InstanceAction, params: Map<String, Value>) -> Result<()> {
        let Some(wire_action) = self.binding.action_name(action) else {
            return Err(Error::Config(format!(
                "no '{}' action bound for {}",
                action, self.binding.list_action
            )));
        };

        tracing::info!(
            "{}: {}={}",
            wire_action,
            self.binding.id_param,
            self.id
        );

        let request = ActionRequest {
            action: wire_action,
            id_param: &self.binding.id_param,
            identifier: &self.id,
            params: &params,
        };
        let response = self.transport.act(&request).await?;

        tracing::debug!(
            "{} accepted for {} (RequestId: {})",
            wire_action,
            self.id,
            response
                .get("RequestId")
                .and_then(|v| v.as_str())
                .unwrap_or("-")
        );
        Ok(())
    }
}

fn period_params(period: Option<u32>) -> Map<String, Value> {
    let mut params = Map::new();
    if let Some(period) = period {
        params.insert("Period".to_string(), Value::from(period));
    }
    params
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("id", &self.id)
            .field("record", &self.record)
            .finish()
    }
}
