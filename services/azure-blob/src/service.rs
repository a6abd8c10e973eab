use std::sync::Arc;

use bytes::Bytes;
use http::header::{HeaderValue, ACCEPT};
use log::debug;
use percent_encoding::utf8_percent_encode;
use reqlist_core::utils::redact_uri;
use reqlist_core::{Context, Error, RequestOptions, Result, SignRequest, StorageLocation};

use crate::constants::*;
use crate::response::parse_service_error;

/// State shared by the clients and listers of one account.
#[derive(Debug, Clone)]
pub(crate) struct ServiceCore {
    pub primary_endpoint: String,
    pub secondary_endpoint: Option<String>,
    pub signer: Arc<dyn SignRequest>,
    pub defaults: RequestOptions,
}

impl ServiceCore {
    pub fn endpoint(&self, location: StorageLocation) -> Result<&str> {
        match location {
            StorageLocation::Primary => Ok(&self.primary_endpoint),
            StorageLocation::Secondary => self.secondary_endpoint.as_deref().ok_or_else(|| {
                Error::invalid_operation("no secondary endpoint is configured")
            }),
        }
    }

    /// Send one listing request and return the body of the successful response.
    ///
    /// `path` starts with `/` and is appended to the endpoint of `location`.
    pub async fn send_list(
        &self,
        ctx: &Context,
        location: StorageLocation,
        path: &str,
        mut query: Vec<(&'static str, String)>,
        marker: Option<&str>,
        options: &RequestOptions,
    ) -> Result<Bytes> {
        if let Some(v) = marker {
            query.push(("marker", v.to_string()));
        }
        if let Some(v) = options.server_timeout {
            query.push(("timeout", v.as_secs().max(1).to_string()));
        }

        let query = query
            .iter()
            .map(|(k, v)| format!("{k}={}", utf8_percent_encode(v, &AZURE_QUERY_ENCODE_SET)))
            .collect::<Vec<_>>()
            .join("&");
        let url = format!("{}{path}?{query}", self.endpoint(location)?);

        let req = http::Request::get(&url)
            .header(X_MS_VERSION, AZURE_STORAGE_VERSION)
            .header(ACCEPT, HeaderValue::from_static("application/xml"))
            .body(Bytes::new())
            .map_err(|e| {
                Error::argument("failed to build list request")
                    .with_source(e)
                    .with_context(format!("url: {}", redact_uri(&url)))
            })?;

        let (mut parts, body) = req.into_parts();
        self.signer.sign_request(ctx, &mut parts).await?;
        let req = http::Request::from_parts(parts, body);

        debug!("sending list request to {location}: {}", redact_uri(&req.uri().to_string()));

        let resp = ctx.http_send(req).await.map_err(|e| {
            e.with_context(format!("location: {location}"))
                .with_context(format!("url: {}", redact_uri(&url)))
        })?;

        let (parts, body) = resp.into_parts();
        if !parts.status.is_success() {
            let err = parse_service_error(parts.status, &parts.headers, &body);
            debug!("list request to {location} failed: {err}");
            return Err(err.with_context(format!("url: {}", redact_uri(&url))));
        }

        Ok(body)
    }
}
