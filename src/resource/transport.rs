//! Transport boundary
//!
//! The collection and instance types never talk HTTP themselves; they hand
//! a [`ListRequest`] or [`ActionRequest`] to a [`Transport`] and get back a
//! decoded [`Page`] or the provider's response body.

use crate::error::Result;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Equality filters sent verbatim with a list request
pub type Query = BTreeMap<String, Value>;

/// One decoded entry of a list response
pub type Record = Map<String, Value>;

/// A list request for one page
#[derive(Debug, Clone)]
pub struct ListRequest<'a> {
    pub action: &'a str,
    /// Dot-separated path to the record array in the response body
    pub response_path: &'a str,
    pub query: &'a Query,
    pub page_number: u32,
    pub page_size: u32,
}

/// A lifecycle action on a single entity
#[derive(Debug, Clone)]
pub struct ActionRequest<'a> {
    pub action: &'a str,
    pub id_param: &'a str,
    pub identifier: &'a str,
    pub params: &'a Map<String, Value>,
}

/// One page of a list endpoint
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub records: Vec<Record>,
    pub page_number: u32,
    pub page_size: u32,
    /// Total matches reported by the provider, if it reports one
    pub total_count: Option<u64>,
}

/// Executes requests against the remote API
///
/// Implementations must not retry; the first error goes back to the caller.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetch one page of records.
    async fn list(&self, request: &ListRequest<'_>) -> Result<Page>;

    /// Run an action and return the raw response body.
    async fn act(&self, request: &ActionRequest<'_>) -> Result<Value>;
}

/// Render a query value the way the RPC API expects it
///
/// Strings go as-is, other scalars use their JSON text, and arrays or
/// objects are sent as compact JSON.
pub fn query_value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Extract the record array at a dot-separated path
pub fn extract_records(response: &Value, path: &str) -> Vec<Record> {
    let mut current = response;
    if !path.is_empty() {
        for part in path.split('.') {
            current = match current.get(part) {
                Some(v) => v,
                None => return vec![],
            };
        }
    }

    current
        .as_array()
        .map(|arr| {
            arr.iter()
                .filter_map(|item| item.as_object().cloned())
                .collect()
        })
        .unwrap_or_default()
}
