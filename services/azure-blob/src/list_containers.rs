use std::sync::Arc;

use async_trait::async_trait;
use reqlist_core::{Context, ListSegment, Page, RequestOptions, Result, StorageLocation};

use crate::response::parse_list_containers;
use crate::service::ServiceCore;
use crate::{ContainerItem, ListContainersRequest};

/// ContainerLister fetches one page of the containers of an account.
#[derive(Debug)]
pub struct ContainerLister {
    core: Arc<ServiceCore>,
    request: ListContainersRequest,
}

impl ContainerLister {
    pub(crate) fn new(core: Arc<ServiceCore>, request: ListContainersRequest) -> Self {
        Self { core, request }
    }

    /// The request this lister was created with.
    pub fn request(&self) -> &ListContainersRequest {
        &self.request
    }
}

#[async_trait]
impl ListSegment for ContainerLister {
    type Item = ContainerItem;

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
    ) -> Result<Page<ContainerItem>> {
        let body = self
            .core
            .send_list(ctx, location, "/", self.request.query(), marker, options)
            .await?;

        parse_list_containers(&body)
    }
}
