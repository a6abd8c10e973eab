use std::sync::Arc;

use async_trait::async_trait;
use percent_encoding::utf8_percent_encode;
use reqlist_core::{Context, ListSegment, Page, RequestOptions, Result, StorageLocation};

use crate::constants::AZURE_QUERY_ENCODE_SET;
use crate::response::parse_list_blobs;
use crate::service::ServiceCore;
use crate::{BlobItem, ListBlobsRequest};

/// BlobLister fetches one page of the blobs inside a container.
///
/// Created by [`ContainerClient::list_blobs`](crate::ContainerClient::list_blobs),
/// the request has already been validated.
#[derive(Debug)]
pub struct BlobLister {
    core: Arc<ServiceCore>,
    container: String,
    request: ListBlobsRequest,
}

impl BlobLister {
    pub(crate) fn new(core: Arc<ServiceCore>, container: String, request: ListBlobsRequest) -> Self {
        Self {
            core,
            container,
            request,
        }
    }

    /// The request this lister was created with.
    pub fn request(&self) -> &ListBlobsRequest {
        &self.request
    }
}

#[async_trait]
impl ListSegment for BlobLister {
    type Item = BlobItem;

    fn secondary_available(&self) -> bool {
        self.core.secondary_endpoint.is_some()
    }

    fn max_results(&self) -> Option<u32> {
        self.request.max_results
    }

    async fn list_segment(
        &self,
        ctx: &Context,
        location: StorageLocation,
        marker: Option<&str>,
        options: &RequestOptions,
    ) -> Result<Page<BlobItem>> {
        let path = format!(
            "/{}",
            utf8_percent_encode(&self.container, &AZURE_QUERY_ENCODE_SET)
        );

        let body = self
            .core
            .send_list(ctx, location, &path, self.request.query(), marker, options)
            .await
            .map_err(|e| e.with_context(format!("container: {}", self.container)))?;

        parse_list_blobs(&body)
    }
}
