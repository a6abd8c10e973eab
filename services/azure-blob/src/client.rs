use std::sync::Arc;

use log::debug;
use reqlist_core::{
    Context, ContinuationToken, Error, RequestOptions, Result, ResultSegment, SegmentedLister,
    SignRequest,
};

use crate::service::ServiceCore;
use crate::{
    BlobItem, BlobLister, Config, ContainerItem, ContainerLister, Credential, ListBlobsRequest,
    ListContainersRequest,
};

/// BlobServiceClient lists the containers of a storage account.
///
/// ```no_run
/// use reqlist_azure_blob::{BlobServiceClient, Config, ListContainersRequest};
/// use reqlist_core::{Context, OsEnv, RequestOptions, Result};
///
/// # async fn example() -> Result<()> {
/// let ctx = Context::new().with_env(OsEnv);
/// let config = Config::default().from_env(&ctx)?;
/// let client = BlobServiceClient::new(ctx, config)?;
///
/// let containers = client
///     .list_containers(ListContainersRequest::new())?
///     .pager(RequestOptions::default())
///     .collect()
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct BlobServiceClient {
    ctx: Context,
    core: Arc<ServiceCore>,
}

impl BlobServiceClient {
    /// Create a client from `config`.
    ///
    /// Requests are signed with the credential found in `config`, use
    /// [`BlobServiceClient::with_signer`] to plug another one.
    pub fn new(ctx: Context, config: Config) -> Result<Self> {
        let core = ServiceCore {
            primary_endpoint: config.primary_endpoint()?,
            secondary_endpoint: config.secondary_endpoint(),
            signer: Arc::new(Credential::from_config(&config)),
            defaults: config.request_options(),
        };
        debug!(
            "created blob service client for {}, secondary: {:?}",
            core.primary_endpoint, core.secondary_endpoint
        );

        Ok(Self {
            ctx,
            core: Arc::new(core),
        })
    }

    /// Replace the request signer.
    pub fn with_signer(mut self, signer: impl SignRequest) -> Self {
        let mut core = (*self.core).clone();
        core.signer = Arc::new(signer);
        self.core = Arc::new(core);
        self
    }

    /// Endpoint of the primary location.
    pub fn primary_endpoint(&self) -> &str {
        &self.core.primary_endpoint
    }

    /// Endpoint of the secondary location, if the account has one.
    pub fn secondary_endpoint(&self) -> Option<&str> {
        self.core.secondary_endpoint.as_deref()
    }

    /// Options every listing call of this client is merged with.
    pub fn default_options(&self) -> &RequestOptions {
        &self.core.defaults
    }

    /// Create a client for the container `name`.
    pub fn container_client(&self, name: impl Into<String>) -> ContainerClient {
        ContainerClient {
            ctx: self.ctx.clone(),
            core: self.core.clone(),
            name: name.into(),
        }
    }

    /// Create a lister of the containers matching `request`.
    pub fn list_containers(
        &self,
        request: ListContainersRequest,
    ) -> Result<SegmentedLister<ContainerLister>> {
        request.validate()?;

        Ok(SegmentedLister::new(
            self.ctx.clone(),
            ContainerLister::new(self.core.clone(), request),
        )
        .with_default_options(self.core.defaults))
    }

    /// Fetch the page of containers `token` points to.
    pub async fn list_containers_segmented(
        &self,
        token: Option<&ContinuationToken>,
        request: &ListContainersRequest,
        options: &RequestOptions,
    ) -> Result<ResultSegment<ContainerItem>> {
        self.list_containers(request.clone())?
            .next_segment(token, options)
            .await
    }
}

/// ContainerClient lists the blobs inside one container.
#[derive(Debug, Clone)]
pub struct ContainerClient {
    ctx: Context,
    core: Arc<ServiceCore>,
    name: String,
}

impl ContainerClient {
    /// Name of the container.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Create a lister of the blobs matching `request`.
    ///
    /// Invalid requests are rejected here, before anything is sent.
    pub fn list_blobs(&self, request: ListBlobsRequest) -> Result<SegmentedLister<BlobLister>> {
        if self.name.is_empty() {
            return Err(Error::argument("container name must not be empty"));
        }
        request
            .validate()
            .map_err(|e| e.with_context(format!("container: {}", self.name)))?;

        Ok(SegmentedLister::new(
            self.ctx.clone(),
            BlobLister::new(self.core.clone(), self.name.clone(), request),
        )
        .with_default_options(self.core.defaults))
    }

    /// Fetch the page of blobs `token` points to.
    pub async fn list_blobs_segmented(
        &self,
        token: Option<&ContinuationToken>,
        request: &ListBlobsRequest,
        options: &RequestOptions,
    ) -> Result<ResultSegment<BlobItem>> {
        self.list_blobs(request.clone())?
            .next_segment(token, options)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use reqlist_core::{ErrorKind, LocationMode};

    fn client() -> BlobServiceClient {
        BlobServiceClient::new(
            Context::new(),
            Config {
                account_name: Some("acct".to_string()),
                location_mode: Some(LocationMode::PrimaryThenSecondary),
                ..Default::default()
            },
        )
        .unwrap()
    }

    #[test]
    fn test_new() {
        let client = client();
        assert_eq!(client.primary_endpoint(), "https://acct.blob.core.windows.net");
        assert_eq!(
            client.secondary_endpoint(),
            Some("https://acct-secondary.blob.core.windows.net")
        );
        assert_eq!(
            client.default_options().location_mode,
            Some(LocationMode::PrimaryThenSecondary)
        );

        let err = BlobServiceClient::new(Context::new(), Config::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
    }

    #[test]
    fn test_list_blobs_validates() {
        let err = client()
            .container_client("c")
            .list_blobs(ListBlobsRequest::new().with_delimiter("\\"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Argument);

        let err = client()
            .container_client("")
            .list_blobs(ListBlobsRequest::new())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Argument);

        let lister = client()
            .container_client("c")
            .list_blobs(ListBlobsRequest::new().with_max_results(5))
            .unwrap();
        assert_eq!(
            lister.default_options().location_mode,
            Some(LocationMode::PrimaryThenSecondary)
        );
        assert_eq!(lister.inner().request().max_results, Some(5));
    }
}
