use std::collections::HashMap;

use log::debug;
use reqlist_core::{Error, Result};

use crate::Config;

// Azurite defaults.
const AZURITE_DEFAULT_STORAGE_ACCOUNT_NAME: &str = "devstoreaccount1";
const AZURITE_DEFAULT_BLOB_URI: &str = "http://127.0.0.1:10000";

/// Parses an [Azure connection string][1].
///
/// [1]: https://learn.microsoft.com/en-us/azure/storage/common/storage-configure-connection-string
pub(crate) fn parse(conn_str: &str) -> Result<Config> {
    let key_values = parse_into_key_values(conn_str)?;

    // Try to read development storage configuration.
    if let Some(config) = collect_development_config(&key_values) {
        return Ok(config);
    }

    if key_values.contains_key("AccountKey") {
        debug!("connection string carries an AccountKey, shared key signing must be plugged in by the caller");
    }

    let (endpoint, secondary_endpoint) = collect_endpoints(&key_values)?;
    Ok(Config {
        account_name: key_values.get("AccountName").cloned(),
        endpoint,
        secondary_endpoint,
        sas_token: key_values.get("SharedAccessSignature").cloned(),
        ..Default::default()
    })
}

fn parse_into_key_values(conn_str: &str) -> Result<HashMap<String, String>> {
    conn_str
        .trim()
        .replace("\n", "")
        .split(';')
        .map(str::trim)
        .filter(|&field| !field.is_empty())
        .map(|field| {
            let (key, value) = field.split_once('=').ok_or_else(|| {
                Error::config_invalid("invalid connection string, expected '=' in field")
                    .with_context(format!("field: {field}"))
            })?;
            Ok((key.to_string(), value.to_string()))
        })
        .collect()
}

fn collect_development_config(key_values: &HashMap<String, String>) -> Option<Config> {
    if key_values.get("UseDevelopmentStorage").map(String::as_str) != Some("true") {
        return None;
    }

    let account_name = key_values
        .get("AccountName")
        .cloned()
        .unwrap_or(AZURITE_DEFAULT_STORAGE_ACCOUNT_NAME.to_string());
    let development_proxy_uri = key_values
        .get("DevelopmentStorageProxyUri")
        .map(|v| v.trim_end_matches('/').to_string())
        .unwrap_or(AZURITE_DEFAULT_BLOB_URI.to_string());

    Some(Config {
        endpoint: Some(format!("{development_proxy_uri}/{account_name}")),
        secondary_endpoint: Some(format!("{development_proxy_uri}/{account_name}-secondary")),
        account_name: Some(account_name),
        ..Default::default()
    })
}

/// Parses the primary and secondary endpoints from the key-value pairs if possible.
///
/// Users are still able to later supplement configuration with an endpoint,
/// so endpoint-related fields aren't enforced.
fn collect_endpoints(
    key_values: &HashMap<String, String>,
) -> Result<(Option<String>, Option<String>)> {
    if let Some(endpoint) = key_values.get("BlobEndpoint") {
        return Ok((
            Some(endpoint.clone()),
            key_values.get("BlobSecondaryEndpoint").cloned(),
        ));
    }

    let (account_name, endpoint_suffix) = match (
        key_values.get("AccountName"),
        key_values.get("EndpointSuffix"),
    ) {
        (Some(name), Some(suffix)) => (name, suffix),
        // Can't build an endpoint if one of them is missing
        _ => return Ok((None, key_values.get("BlobSecondaryEndpoint").cloned())),
    };

    let protocol = key_values
        .get("DefaultEndpointsProtocol")
        .map(String::as_str)
        .unwrap_or("https");
    if protocol != "http" && protocol != "https" {
        return Err(Error::config_invalid("invalid DefaultEndpointsProtocol")
            .with_context(format!("protocol: {protocol}")));
    }

    Ok((
        Some(format!("{protocol}://{account_name}.blob.{endpoint_suffix}")),
        Some(format!(
            "{protocol}://{account_name}-secondary.blob.{endpoint_suffix}"
        )),
    ))
}
