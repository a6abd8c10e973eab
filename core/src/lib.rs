//! Core components for listing storage resources page by page.
//!
//! This crate provides the foundational types and traits for the reqlist ecosystem.
//! Services implement [`ListSegment`] to fetch one page, everything else lives here.
//!
//! ## Overview
//!
//! The crate is built around several key concepts:
//!
//! - **Context**: A container that holds implementations for HTTP sending and environment access
//! - **ContinuationToken**: The opaque, serializable cursor between two pages
//! - **Location affinity**: A listing stays on the endpoint that served its first page
//! - **SegmentedLister**: One paging algorithm exposed as async, cancellable, blocking and begin/end calls
//! - **Pager**: The listing loop, from the first page until no token is returned
//!
//! ## Example
//!
//! ```no_run
//! use reqlist_core::{Context, ListSegment, Page, RequestOptions, Result, SegmentedLister, StorageLocation};
//! use async_trait::async_trait;
//!
//! #[derive(Debug)]
//! struct Numbers;
//!
//! #[async_trait]
//! impl ListSegment for Numbers {
//!     type Item = u32;
//!
//!     fn secondary_available(&self) -> bool {
//!         false
//!     }
//!
//!     async fn list_segment(
//!         &self,
//!         _: &Context,
//!         _: StorageLocation,
//!         marker: Option<&str>,
//!         _: &RequestOptions,
//!     ) -> Result<Page<u32>> {
//!         let start: u32 = marker.map(|v| v.parse().unwrap()).unwrap_or(0);
//!         let next = (start + 10 < 100).then(|| (start + 10).to_string());
//!         Ok(Page { items: (start..start + 10).collect(), next_marker: next })
//!     }
//! }
//!
//! # async fn example() -> Result<()> {
//! let lister = SegmentedLister::new(Context::new(), Numbers);
//!
//! let mut token = None;
//! loop {
//!     let segment = lister.next_segment(token.as_ref(), &RequestOptions::default()).await?;
//!     println!("{:?}", segment.results());
//!     token = segment.continuation_token().cloned();
//!     if token.is_none() {
//!         break;
//!     }
//! }
//! # Ok(())
//! # }
//! ```

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod time;
pub mod utils;

mod error;
pub use error::{Error, ErrorKind, Result, ServiceError};
mod context;
pub use context::{Context, Env, HttpSend, NoopEnv, NoopHttpSend, OsEnv, StaticEnv};

mod api;
pub use api::{ListSegment, Page, SignRequest};
mod location;
pub use location::{resolve_location, LocationMode, StorageLocation};
mod options;
pub use options::RequestOptions;
mod token;
pub use token::ContinuationToken;
mod segment;
pub use segment::ResultSegment;
mod lister;
pub use lister::{PendingSegment, SegmentedLister};
mod pager;
pub use pager::Pager;

#[cfg(test)]
mod memory;

pub use tokio_util::sync::CancellationToken;
