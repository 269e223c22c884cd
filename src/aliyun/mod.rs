//! Alibaba Cloud API interaction module
//!
//! This module provides the RPC transport used by the resource layer:
//! credentials, request signing, the HTTP client, and the per-service
//! client that implements [`crate::resource::Transport`].
//!
//! # Module Structure
//!
//! - [`auth`] - Access key credentials and where they are read from
//! - [`signer`] - Signature version 1.0 (HMAC-SHA1) request signing
//! - [`http`] - HTTP GET and provider error decoding
//! - [`client`] - RPC client bound to one service and region
//!
//! # Example
//!
//! ```ignore
//! use alicloud_resource::aliyun::{AcsClient, ClientOptions, Credentials};
//! use alicloud_resource::resource::get_service;
//!
//! async fn example() -> alicloud_resource::Result<()> {
//!     let ecs = get_service("ecs").unwrap();
//!     let creds = Credentials::new("LTAI...", "secret");
//!     let client = AcsClient::new(creds, "cn-hangzhou", ecs, ClientOptions::default())?;
//!     let regions = client.call("DescribeRegions", Default::default()).await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod http;
pub mod signer;

pub use auth::Credentials;
pub use client::{AcsClient, ClientOptions};
