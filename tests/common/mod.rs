//! In-memory ECS used by the integration tests
//!
//! Serves `DescribeInstances` pages and applies lifecycle actions with the
//! provider's status rules and error texts. Transitional states only settle
//! when a test calls [`FakeEcs::settle`].

#![allow(dead_code)]

use alicloud_resource::error::{RemoteError, Result};
use alicloud_resource::resource::{ActionRequest, ListRequest, Page, Record, Resource, Transport};
use alicloud_resource::InstanceStatus;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const INCORRECT_STATUS_MESSAGE: &str =
    "The specified instance is in an incorrect status for the requested action; please check the instance status and try again.";
pub const MISSING_PERIOD_MESSAGE: &str =
    "The input parameter \"Period\" that is mandatory for processing this request is not supplied.";
pub const CHARGE_TYPE_MESSAGE: &str =
    "The operation is not permitted due to charge type of the instance.";

pub const STOPPING_ID: &str = "i-bp162a07bhoj5skna4zj";
pub const STOPPED_ID: &str = "i-bp1f3b73z92zsm6ay7ce";
pub const OTHER_STOPPED_ID: &str = "i-bp1igpepkvn9onj9o42e";

#[derive(Debug, Clone)]
struct FakeInstance {
    id: String,
    name: String,
    status: InstanceStatus,
    charge_type: &'static str,
}

impl FakeInstance {
    fn to_record(&self) -> Record {
        let value = json!({
            "InstanceId": self.id,
            "InstanceName": self.name,
            "Status": self.status.as_str(),
            "ZoneId": "cn-hangzhou-b",
            "InstanceType": "ecs.n2.small",
            "InstanceChargeType": self.charge_type,
        });
        value.as_object().cloned().unwrap_or_default()
    }

    fn matches(&self, key: &str, wanted: &Value) -> bool {
        let record = self.to_record();
        if key == "InstanceIds" {
            let ids: Vec<String> = wanted
                .as_str()
                .and_then(|s| serde_json::from_str(s).ok())
                .or_else(|| serde_json::from_value(wanted.clone()).ok())
                .unwrap_or_default();
            return ids.contains(&self.id);
        }
        record.get(key) == Some(wanted)
    }
}

pub struct FakeEcs {
    instances: Mutex<Vec<FakeInstance>>,
    list_calls: AtomicUsize,
    action_calls: AtomicUsize,
}

impl FakeEcs {
    pub fn new(instances: &[(&str, InstanceStatus)]) -> Arc<Self> {
        let instances = instances
            .iter()
            .enumerate()
            .map(|(i, (id, status))| FakeInstance {
                id: id.to_string(),
                name: format!("test-instance-{}", i + 1),
                status: status.clone(),
                charge_type: "PostPaid",
            })
            .collect();
        Arc::new(Self {
            instances: Mutex::new(instances),
            list_calls: AtomicUsize::new(0),
            action_calls: AtomicUsize::new(0),
        })
    }

    /// Three instances, two of them `Stopped`
    pub fn scenario() -> Arc<Self> {
        Self::new(&[
            (STOPPING_ID, InstanceStatus::Stopping),
            (STOPPED_ID, InstanceStatus::Stopped),
            (OTHER_STOPPED_ID, InstanceStatus::Stopped),
        ])
    }

    /// `count` numbered instances alternating Running/Stopped
    pub fn with_population(count: usize) -> Arc<Self> {
        let ids: Vec<(String, InstanceStatus)> = (0..count)
            .map(|i| {
                let status = if i % 2 == 0 {
                    InstanceStatus::Running
                } else {
                    InstanceStatus::Stopped
                };
                (format!("i-{:04}", i), status)
            })
            .collect();
        let borrowed: Vec<(&str, InstanceStatus)> =
            ids.iter().map(|(id, s)| (id.as_str(), s.clone())).collect();
        Self::new(&borrowed)
    }

    /// Finish every in-flight transition
    pub fn settle(&self) {
        for instance in self.instances.lock().unwrap().iter_mut() {
            instance.status = match instance.status {
                InstanceStatus::Starting => InstanceStatus::Running,
                InstanceStatus::Stopping | InstanceStatus::Pending => InstanceStatus::Stopped,
                ref other => other.clone(),
            };
        }
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn action_calls(&self) -> usize {
        self.action_calls.load(Ordering::SeqCst)
    }

    pub fn resource(self: &Arc<Self>) -> Resource {
        Resource::with_transport("ecs", self.clone()).expect("ecs is registered")
    }
}

fn incorrect_status() -> RemoteError {
    RemoteError::server("IncorrectInstanceStatus", INCORRECT_STATUS_MESSAGE).with_http_status(403)
}

#[async_trait]
impl Transport for FakeEcs {
    async fn list(&self, request: &ListRequest<'_>) -> Result<Page> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        assert_eq!(request.action, "DescribeInstances");

        let matching: Vec<Record> = self
            .instances
            .lock()
            .unwrap()
            .iter()
            .filter(|instance| {
                request
                    .query
                    .iter()
                    .all(|(key, wanted)| instance.matches(key, wanted))
            })
            .map(FakeInstance::to_record)
            .collect();

        let size = request.page_size as usize;
        let start = (request.page_number as usize - 1).saturating_mul(size);
        let records = matching.iter().skip(start).take(size).cloned().collect();

        Ok(Page {
            records,
            page_number: request.page_number,
            page_size: request.page_size,
            total_count: Some(matching.len() as u64),
        })
    }

    async fn act(&self, request: &ActionRequest<'_>) -> Result<Value> {
        let call = self.action_calls.fetch_add(1, Ordering::SeqCst);
        assert_eq!(request.id_param, "InstanceId");

        let mut instances = self.instances.lock().unwrap();
        let Some(index) = instances.iter().position(|i| i.id == request.identifier) else {
            return Err(RemoteError::server(
                "InvalidInstanceId.NotFound",
                "The specified InstanceId does not exist.",
            )
            .into());
        };
        let instance = &mut instances[index];

        match request.action {
            "StartInstance" => match instance.status {
                InstanceStatus::Stopped => instance.status = InstanceStatus::Starting,
                _ => return Err(incorrect_status().into()),
            },
            "StopInstance" => match instance.status {
                InstanceStatus::Running => instance.status = InstanceStatus::Stopping,
                _ => return Err(incorrect_status().into()),
            },
            "RebootInstance" => match instance.status {
                InstanceStatus::Running | InstanceStatus::Stopping => {}
                _ => return Err(incorrect_status().into()),
            },
            "RenewInstance" | "ReactivateInstance" => {
                if !request.params.contains_key("Period") {
                    return Err(RemoteError::server("MissingParameter", MISSING_PERIOD_MESSAGE).into());
                }
                if instance.charge_type == "PostPaid" {
                    return Err(
                        RemoteError::server("ChargeTypeViolation", CHARGE_TYPE_MESSAGE).into(),
                    );
                }
            }
            "DeleteInstance" => match instance.status {
                InstanceStatus::Stopped => {
                    instances.remove(index);
                }
                _ => return Err(incorrect_status().into()),
            },
            other => {
                return Err(RemoteError::server(
                    "InvalidAction.NotFound",
                    format!("Specified api {} is not found.", other),
                )
                .into())
            }
        }

        Ok(json!({"RequestId": format!("req-{}", call)}))
    }
}
