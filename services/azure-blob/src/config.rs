use std::fmt::{Debug, Formatter};
use std::time::Duration;

use log::debug;
use reqlist_core::utils::Redact;
use reqlist_core::{Context, Error, LocationMode, RequestOptions, Result};

use crate::connection_string;
use crate::constants::*;

/// Config carries all the configuration for listing an Azure Blob Storage account.
#[derive(Clone, Default)]
#[cfg_attr(test, derive(PartialEq))]
pub struct Config {
    /// `account_name` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AZBLOB_ACCOUNT_NAME`]
    ///
    /// Used to build the default endpoints if `endpoint` is not set.
    pub account_name: Option<String>,
    /// `endpoint` of the primary location, will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AZBLOB_ENDPOINT`]
    pub endpoint: Option<String>,
    /// `secondary_endpoint` of the read-only secondary location, will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AZBLOB_SECONDARY_ENDPOINT`]
    pub secondary_endpoint: Option<String>,
    /// `sas_token` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AZURE_STORAGE_SAS_TOKEN`]
    pub sas_token: Option<String>,
    /// `location_mode` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AZBLOB_LOCATION_MODE`]
    pub location_mode: Option<LocationMode>,
    /// Default server side timeout of every listing request.
    pub server_timeout: Option<Duration>,
    /// Default client side budget of every listing call.
    pub maximum_execution_time: Option<Duration>,
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("account_name", &self.account_name)
            .field("endpoint", &self.endpoint)
            .field("secondary_endpoint", &self.secondary_endpoint)
            .field("sas_token", &Redact::from(&self.sas_token))
            .field("location_mode", &self.location_mode)
            .field("server_timeout", &self.server_timeout)
            .field("maximum_execution_time", &self.maximum_execution_time)
            .finish()
    }
}

impl Config {
    /// Load config from env.
    ///
    /// Values already set on this config are kept.
    pub fn from_env(mut self, ctx: &Context) -> Result<Self> {
        if self.endpoint.is_none() {
            self.endpoint = ctx.env_var(AZBLOB_ENDPOINT);
        }
        if self.secondary_endpoint.is_none() {
            self.secondary_endpoint = ctx.env_var(AZBLOB_SECONDARY_ENDPOINT);
        }
        if self.account_name.is_none() {
            self.account_name = ctx.env_var(AZBLOB_ACCOUNT_NAME);
        }
        if self.sas_token.is_none() {
            self.sas_token = ctx.env_var(AZURE_STORAGE_SAS_TOKEN);
        }
        if self.location_mode.is_none() {
            if let Some(v) = ctx.env_var(AZBLOB_LOCATION_MODE) {
                self.location_mode = Some(
                    v.parse()
                        .map_err(|e: Error| e.with_context(format!("env: {AZBLOB_LOCATION_MODE}")))?,
                );
            }
        }

        Ok(self)
    }

    /// Parses an [Azure connection string][1] into a configuration object.
    ///
    /// The connection string doesn't have to specify all required parameters
    /// because the user is still allowed to set them later directly on the object.
    ///
    /// An example of a connection string looks like:
    ///
    /// ```txt
    /// AccountName=mystorageaccount;
    /// SharedAccessSignature=sv=2021-06-08&ss=b&srt=co&sp=rl&sig=...;
    /// BlobEndpoint=https://mystorageaccount.blob.core.windows.net;
    /// BlobSecondaryEndpoint=https://mystorageaccount-secondary.blob.core.windows.net
    /// ```
    ///
    /// [1]: https://learn.microsoft.com/en-us/azure/storage/common/storage-configure-connection-string
    pub fn try_from_connection_string(conn_str: &str) -> Result<Self> {
        connection_string::parse(conn_str)
    }

    /// Request options every listing call of a client is merged with.
    pub fn request_options(&self) -> RequestOptions {
        RequestOptions {
            location_mode: self.location_mode,
            server_timeout: self.server_timeout,
            maximum_execution_time: self.maximum_execution_time,
        }
    }

    /// Endpoint of the primary location, without trailing `/`.
    pub(crate) fn primary_endpoint(&self) -> Result<String> {
        if let Some(v) = &self.endpoint {
            return Ok(v.trim_end_matches('/').to_string());
        }

        match &self.account_name {
            Some(account) => Ok(format!("https://{account}.blob.core.windows.net")),
            None => Err(Error::config_invalid(
                "either endpoint or account_name must be configured",
            )),
        }
    }

    /// Endpoint of the secondary location, `None` if the account has none.
    ///
    /// The secondary is derived from the account name only when the primary
    /// endpoint is derived as well.
    pub(crate) fn secondary_endpoint(&self) -> Option<String> {
        if let Some(v) = &self.secondary_endpoint {
            return Some(v.trim_end_matches('/').to_string());
        }

        match (&self.endpoint, &self.account_name) {
            (None, Some(account)) => {
                let endpoint = format!("https://{account}-secondary.blob.core.windows.net");
                debug!("derived secondary endpoint {endpoint} from account name");
                Some(endpoint)
            }
            _ => None,
        }
    }
}
