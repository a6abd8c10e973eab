use reqlist_core::{Error, Result};

/// Additional data to include for each listed blob.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlobListingDetails {
    /// Include user metadata.
    pub metadata: bool,
    /// Include snapshots, only valid with a flat listing.
    pub snapshots: bool,
    /// Include blocks that have been uploaded but not committed.
    pub uncommitted_blobs: bool,
    /// Include the properties of the last copy operation.
    pub copy: bool,
    /// Include soft deleted blobs.
    pub deleted: bool,
}

impl BlobListingDetails {
    /// Value of the `include` query, `None` if nothing is requested.
    pub(crate) fn include(&self) -> Option<String> {
        let values: Vec<&str> = [
            (self.snapshots, "snapshots"),
            (self.metadata, "metadata"),
            (self.uncommitted_blobs, "uncommittedblobs"),
            (self.copy, "copy"),
            (self.deleted, "deleted"),
        ]
        .into_iter()
        .filter_map(|(enabled, value)| enabled.then_some(value))
        .collect();

        (!values.is_empty()).then(|| values.join(","))
    }
}

/// Additional data to include for each listed container.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ContainerListingDetails {
    /// Only names and properties.
    #[default]
    None,
    /// Include user metadata.
    Metadata,
}

/// ListBlobsRequest describes a blob listing inside a container.
///
/// The request is validated when the listing is created, an invalid request
/// never reaches the network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListBlobsRequest {
    /// Only blobs whose names begin with this prefix are listed.
    pub prefix: Option<String>,
    /// Character grouping names into virtual directories, defaults to `/`.
    ///
    /// Ignored in a flat listing.
    pub delimiter: String,
    /// Upper bound of the items returned by one page.
    pub max_results: Option<u32>,
    /// Additional data to include.
    pub details: BlobListingDetails,
    /// List every blob instead of grouping them by `delimiter`.
    pub use_flat_listing: bool,
}

impl Default for ListBlobsRequest {
    fn default() -> Self {
        Self {
            prefix: None,
            delimiter: "/".to_string(),
            max_results: None,
            details: BlobListingDetails::default(),
            use_flat_listing: false,
        }
    }
}

impl ListBlobsRequest {
    /// Create a hierarchical listing of the whole container.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Set the delimiter.
    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    /// Set the page size.
    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = Some(max_results);
        self
    }

    /// Set the details to include.
    pub fn with_details(mut self, details: BlobListingDetails) -> Self {
        self.details = details;
        self
    }

    /// Switch between flat and hierarchical listing.
    pub fn with_flat_listing(mut self, flat: bool) -> Self {
        self.use_flat_listing = flat;
        self
    }

    /// Check the request before anything is sent.
    pub fn validate(&self) -> Result<()> {
        if !self.use_flat_listing {
            if self.delimiter.is_empty() {
                return Err(Error::argument("delimiter must not be empty"));
            }
            if self.delimiter == "\\" {
                return Err(Error::argument("delimiter must not be a backslash")
                    .with_context(format!("delimiter: {:?}", self.delimiter)));
            }
        }
        if self.max_results == Some(0) {
            return Err(Error::argument("max_results must be greater than zero"));
        }
        if self.details.snapshots && !self.use_flat_listing {
            return Err(Error::argument(
                "snapshots can only be listed with a flat listing",
            ));
        }
        Ok(())
    }

    /// Query pairs of this request, without the marker and timeout.
    pub(crate) fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("restype", "container".to_string()),
            ("comp", "list".to_string()),
        ];
        if let Some(v) = &self.prefix {
            query.push(("prefix", v.clone()));
        }
        if !self.use_flat_listing {
            query.push(("delimiter", self.delimiter.clone()));
        }
        if let Some(v) = self.max_results {
            query.push(("maxresults", v.to_string()));
        }
        if let Some(v) = self.details.include() {
            query.push(("include", v));
        }
        query
    }
}

/// ListContainersRequest describes a container listing of an account.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListContainersRequest {
    /// Only containers whose names begin with this prefix are listed.
    pub prefix: Option<String>,
    /// Upper bound of the items returned by one page.
    pub max_results: Option<u32>,
    /// Additional data to include.
    pub details: ContainerListingDetails,
}

impl ListContainersRequest {
    /// Create a listing of all containers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Set the page size.
    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = Some(max_results);
        self
    }

    /// Set the details to include.
    pub fn with_details(mut self, details: ContainerListingDetails) -> Self {
        self.details = details;
        self
    }

    /// Check the request before anything is sent.
    pub fn validate(&self) -> Result<()> {
        if self.max_results == Some(0) {
            return Err(Error::argument("max_results must be greater than zero"));
        }
        Ok(())
    }

    pub(crate) fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = vec![("comp", "list".to_string())];
        if let Some(v) = &self.prefix {
            query.push(("prefix", v.clone()));
        }
        if let Some(v) = self.max_results {
            query.push(("maxresults", v.to_string()));
        }
        if self.details == ContainerListingDetails::Metadata {
            query.push(("include", "metadata".to_string()));
        }
        query
    }
}
