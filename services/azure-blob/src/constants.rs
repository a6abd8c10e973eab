use percent_encoding::{AsciiSet, NON_ALPHANUMERIC};

// Headers used in azure services.
pub const X_MS_VERSION: &str = "x-ms-version";
pub const X_MS_ERROR_CODE: &str = "x-ms-error-code";
pub const X_MS_REQUEST_ID: &str = "x-ms-request-id";

/// REST API version sent with every listing request.
pub const AZURE_STORAGE_VERSION: &str = "2023-01-03";

// Env values used in azure services.
pub const AZBLOB_ENDPOINT: &str = "AZBLOB_ENDPOINT";
pub const AZBLOB_SECONDARY_ENDPOINT: &str = "AZBLOB_SECONDARY_ENDPOINT";
pub const AZBLOB_ACCOUNT_NAME: &str = "AZBLOB_ACCOUNT_NAME";
pub const AZBLOB_LOCATION_MODE: &str = "AZBLOB_LOCATION_MODE";
pub const AZURE_STORAGE_SAS_TOKEN: &str = "AZURE_STORAGE_SAS_TOKEN";

pub static AZURE_QUERY_ENCODE_SET: AsciiSet = NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'/')
    .remove(b'~');
