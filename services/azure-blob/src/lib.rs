//! Azure Blob Storage listing
//!
//! This crate lists the containers of a storage account and the blobs inside
//! a container, one page at a time, on top of [`reqlist_core`]:
//! - Configuration from env or from a connection string
//! - Anonymous and SAS token access, other signers plug in through [`reqlist_core::SignRequest`]
//! - Primary and read-only secondary endpoints
//!
//! # Example
//!
//! ```rust,no_run
//! use reqlist_azure_blob::{BlobServiceClient, Config, ListBlobsRequest};
//! use reqlist_core::{Context, RequestOptions, Result};
//! use reqlist_http_send_reqwest::ReqwestHttpSend;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let ctx = Context::new().with_http_send(ReqwestHttpSend::default());
//!     let config = Config::try_from_connection_string("UseDevelopmentStorage=true")?;
//!     let client = BlobServiceClient::new(ctx, config)?;
//!
//!     let lister = client
//!         .container_client("photos")
//!         .list_blobs(ListBlobsRequest::new().with_prefix("2024/").with_max_results(100))?;
//!
//!     let mut token = None;
//!     loop {
//!         let segment = lister.next_segment(token.as_ref(), &RequestOptions::default()).await?;
//!         for item in segment.results() {
//!             println!("{}", item.name());
//!         }
//!         token = segment.continuation_token().cloned();
//!         if token.is_none() {
//!             break;
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```

mod constants;

mod config;
pub use config::Config;
mod connection_string;

mod credential;
pub use credential::Credential;

mod request;
pub use request::{
    BlobListingDetails, ContainerListingDetails, ListBlobsRequest, ListContainersRequest,
};
mod item;
pub use item::{
    Blob, BlobDirectory, BlobItem, BlobProperties, ContainerItem, ContainerProperties,
};
mod response;

mod service;
mod list_blobs;
pub use list_blobs::BlobLister;
mod list_containers;
pub use list_containers::ContainerLister;
mod client;
pub use client::{BlobServiceClient, ContainerClient};
