//! Alibaba Cloud Client
//!
//! RPC client for one service, region and credential set. Implements the
//! [`Transport`] boundary used by collections and instance proxies.

use super::auth::Credentials;
use super::http::AcsHttpClient;
use super::signer;
use crate::error::Result;
use crate::resource::registry::ServiceDef;
use crate::resource::transport::{
    extract_records, query_value_to_string, ActionRequest, ListRequest, Page, Transport,
};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;

/// Connection options that do not come from the service registry
#[derive(Debug, Clone, Default)]
pub struct ClientOptions {
    /// Full base URL replacing `https://<service host>`
    pub endpoint: Option<String>,
    pub timeout: Option<Duration>,
}

/// Main RPC client
#[derive(Clone)]
pub struct AcsClient {
    credentials: Credentials,
    http: AcsHttpClient,
    region_id: String,
    api_version: String,
    base_url: String,
}

impl AcsClient {
    /// Create a client bound to `service` in `region_id`
    pub fn new(
        credentials: Credentials,
        region_id: &str,
        service: &ServiceDef,
        options: ClientOptions,
    ) -> Result<Self> {
        let http = AcsHttpClient::new(options.timeout)?;
        let base_url = options
            .endpoint
            .unwrap_or_else(|| format!("https://{}", service.endpoint_for(region_id)))
            .trim_end_matches('/')
            .to_string();

        tracing::debug!(
            "AcsClient for {} {} at {} ({:?})",
            service.product,
            region_id,
            base_url,
            credentials
        );

        Ok(Self {
            credentials,
            http,
            region_id: region_id.to_string(),
            api_version: service.api_version.clone(),
            base_url,
        })
    }

    pub fn region_id(&self) -> &str {
        &self.region_id
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Parameters every RPC request carries
    fn common_params(&self, action: &str) -> BTreeMap<String, String> {
        let timestamp = chrono::Utc::now()
            .format("%Y-%m-%dT%H:%M:%SZ")
            .to_string();

        BTreeMap::from([
            ("Action".to_string(), action.to_string()),
            ("Version".to_string(), self.api_version.clone()),
            ("Format".to_string(), "JSON".to_string()),
            ("AccessKeyId".to_string(), self.credentials.access_key_id.clone()),
            ("SignatureMethod".to_string(), signer::SIGNATURE_METHOD.to_string()),
            ("SignatureVersion".to_string(), signer::SIGNATURE_VERSION.to_string()),
            ("SignatureNonce".to_string(), uuid::Uuid::new_v4().to_string()),
            ("Timestamp".to_string(), timestamp),
            ("RegionId".to_string(), self.region_id.clone()),
        ])
    }

    /// Call an RPC action with request parameters
    pub async fn call(&self, action: &str, params: BTreeMap<String, String>) -> Result<Value> {
        let mut all_params = params;
        all_params.extend(self.common_params(action));

        let query = signer::signed_query(&all_params, &self.credentials.access_key_secret)?;
        let url = format!("{}/?{}", self.base_url, query);
        self.http.get(action, &url).await
    }
}

#[async_trait]
impl Transport for AcsClient {
    async fn list(&self, request: &ListRequest<'_>) -> Result<Page> {
        let mut params: BTreeMap<String, String> = request
            .query
            .iter()
            .map(|(k, v)| (k.clone(), query_value_to_string(v)))
            .collect();
        params.insert("PageNumber".to_string(), request.page_number.to_string());
        params.insert("PageSize".to_string(), request.page_size.to_string());

        let response = self.call(request.action, params).await?;

        let records = extract_records(&response, request.response_path);
        let page_number = response
            .get("PageNumber")
            .and_then(|v| v.as_u64())
            .and_then(|n| u32::try_from(n).ok())
            .unwrap_or(request.page_number);
        let page_size = response
            .get("PageSize")
            .and_then(|v| v.as_u64())
            .and_then(|n| u32::try_from(n).ok())
            .unwrap_or(request.page_size);
        let total_count = response.get("TotalCount").and_then(|v| v.as_u64());

        Ok(Page {
            records,
            page_number,
            page_size,
            total_count,
        })
    }

    async fn act(&self, request: &ActionRequest<'_>) -> Result<Value> {
        let mut params: BTreeMap<String, String> = request
            .params
            .iter()
            .map(|(k, v)| (k.clone(), query_value_to_string(v)))
            .collect();
        params.insert(request.id_param.to_string(), request.identifier.to_string());

        self.call(request.action, params).await
    }
}
