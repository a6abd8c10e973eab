use crate::{Context, RequestOptions, Result, StorageLocation};
use std::fmt::Debug;

/// Page is one page of items as returned by the service.
///
/// `next_marker` is the raw marker found in the response, the lister turns it
/// into a [`ContinuationToken`](crate::ContinuationToken).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// Items in server order.
    pub items: Vec<T>,
    /// Marker of the next page, empty or `None` when the listing is complete.
    pub next_marker: Option<String>,
}

/// ListSegment is the service specific half of a segmented listing.
///
/// Implementations fetch exactly one page from the given location. Location
/// selection, token handling and the calling conventions live in
/// [`SegmentedLister`](crate::SegmentedLister).
#[async_trait::async_trait]
pub trait ListSegment: Debug + Send + Sync + 'static {
    /// Item returned by this listing.
    type Item: Debug + Send + Sync + 'static;

    /// Check if the service has a secondary endpoint configured.
    fn secondary_available(&self) -> bool;

    /// Page size requested from the server, if any.
    fn max_results(&self) -> Option<u32> {
        None
    }

    /// Fetch one page.
    ///
    /// `marker` is the marker of the continuation token, `None` for the first
    /// page.
    async fn list_segment(
        &self,
        ctx: &Context,
        location: StorageLocation,
        marker: Option<&str>,
        options: &RequestOptions,
    ) -> Result<Page<Self::Item>>;
}

/// SignRequest authorizes a request before it is sent.
///
/// reqlist doesn't implement any signing algorithm, services provide simple
/// implementations (anonymous access, SAS tokens) and users can plug their own.
#[async_trait::async_trait]
pub trait SignRequest: Debug + Send + Sync + 'static {
    /// Authorize the request in place.
    async fn sign_request(&self, ctx: &Context, req: &mut http::request::Parts) -> Result<()>;
}
