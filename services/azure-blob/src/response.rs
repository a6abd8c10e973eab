//! Decoding of the listing responses.

use std::collections::HashMap;

use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use percent_encoding::percent_decode_str;
use quick_xml::de;
use reqlist_core::time::parse_http_date;
use reqlist_core::{Error, Page, Result, ServiceError};
use serde::Deserialize;

use crate::constants::{X_MS_ERROR_CODE, X_MS_REQUEST_ID};
use crate::{Blob, BlobDirectory, BlobItem, BlobProperties, ContainerItem, ContainerProperties};

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct ListBlobsResponse {
    blobs: BlobsXml,
    next_marker: Option<String>,
}

#[derive(Default, Debug, Deserialize)]
#[serde(default)]
struct BlobsXml {
    // Blobs and prefixes are interleaved in name order.
    #[serde(rename = "$value")]
    entries: Vec<BlobEntryXml>,
}

#[derive(Debug, Deserialize)]
enum BlobEntryXml {
    Blob(BlobXml),
    BlobPrefix(BlobPrefixXml),
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct BlobXml {
    name: NameXml,
    snapshot: Option<String>,
    deleted: bool,
    properties: BlobPropertiesXml,
    metadata: HashMap<String, String>,
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct BlobPrefixXml {
    name: NameXml,
}

/// Names that aren't valid XML are percent encoded by the server.
#[derive(Default, Debug, Deserialize)]
#[serde(default)]
struct NameXml {
    #[serde(rename = "@Encoded")]
    encoded: bool,
    #[serde(rename = "$text")]
    value: String,
}

impl NameXml {
    fn into_name(self) -> Result<String> {
        if !self.encoded {
            return Ok(self.value);
        }
        percent_decode_str(&self.value)
            .decode_utf8()
            .map(|v| v.into_owned())
            .map_err(|e| {
                Error::unexpected("failed to decode encoded blob name")
                    .with_source(e)
                    .with_context(format!("name: {}", self.value))
            })
    }
}

#[derive(Default, Debug, Deserialize)]
#[serde(default)]
struct BlobPropertiesXml {
    #[serde(rename = "Last-Modified")]
    last_modified: Option<String>,
    #[serde(rename = "Etag")]
    etag: Option<String>,
    #[serde(rename = "Content-Length")]
    content_length: u64,
    #[serde(rename = "Content-Type")]
    content_type: Option<String>,
    #[serde(rename = "Content-MD5")]
    content_md5: Option<String>,
    #[serde(rename = "BlobType")]
    blob_type: Option<String>,
    #[serde(rename = "LeaseStatus")]
    lease_status: Option<String>,
    #[serde(rename = "LeaseState")]
    lease_state: Option<String>,
    #[serde(rename = "CopyId")]
    copy_id: Option<String>,
    #[serde(rename = "CopyStatus")]
    copy_status: Option<String>,
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct ListContainersResponse {
    containers: ContainersXml,
    next_marker: Option<String>,
}

#[derive(Default, Debug, Deserialize)]
#[serde(default)]
struct ContainersXml {
    #[serde(rename = "Container")]
    items: Vec<ContainerXml>,
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct ContainerXml {
    name: String,
    properties: ContainerPropertiesXml,
    metadata: HashMap<String, String>,
}

#[derive(Default, Debug, Deserialize)]
#[serde(default)]
struct ContainerPropertiesXml {
    #[serde(rename = "Last-Modified")]
    last_modified: Option<String>,
    #[serde(rename = "Etag")]
    etag: Option<String>,
    #[serde(rename = "LeaseStatus")]
    lease_status: Option<String>,
    #[serde(rename = "LeaseState")]
    lease_state: Option<String>,
    #[serde(rename = "PublicAccess")]
    public_access: Option<String>,
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct ErrorResponse {
    code: Option<String>,
    message: Option<String>,
}

/// Empty elements like `<Content-MD5 />` carry no value.
fn non_empty(v: Option<String>) -> Option<String> {
    v.filter(|v| !v.is_empty())
}

fn parse_last_modified(v: Option<String>) -> Result<Option<reqlist_core::time::DateTime>> {
    non_empty(v).map(|v| parse_http_date(&v)).transpose()
}

fn body_as_str(body: &Bytes) -> Result<&str> {
    std::str::from_utf8(body)
        .map_err(|e| Error::unexpected("response body is not valid utf-8").with_source(e))
}

impl BlobXml {
    fn into_item(self) -> Result<BlobItem> {
        let p = self.properties;
        let blob = Blob {
            name: self.name.into_name()?,
            snapshot: non_empty(self.snapshot),
            deleted: self.deleted,
            properties: BlobProperties {
                etag: non_empty(p.etag),
                last_modified: parse_last_modified(p.last_modified)?,
                content_length: p.content_length,
                content_type: non_empty(p.content_type),
                content_md5: non_empty(p.content_md5),
                lease_status: non_empty(p.lease_status),
                lease_state: non_empty(p.lease_state),
                copy_id: non_empty(p.copy_id),
                copy_status: non_empty(p.copy_status),
            },
            metadata: self.metadata,
        };

        match p.blob_type.as_deref() {
            Some("BlockBlob") => Ok(BlobItem::BlockBlob(blob)),
            Some("PageBlob") => Ok(BlobItem::PageBlob(blob)),
            Some("AppendBlob") => Ok(BlobItem::AppendBlob(blob)),
            v => Err(Error::unexpected("service returned an unknown blob type")
                .with_context(format!("blob: {}", blob.name))
                .with_context(format!("blob_type: {v:?}"))),
        }
    }
}

/// Decode the body of a successful List Blobs response.
pub(crate) fn parse_list_blobs(body: &Bytes) -> Result<Page<BlobItem>> {
    let body = body_as_str(body)?;
    let resp: ListBlobsResponse = de::from_str(body).map_err(|e| {
        Error::unexpected("failed to parse list blobs response")
            .with_source(e)
            .with_context(format!("response_length: {}", body.len()))
    })?;

    let items = resp
        .blobs
        .entries
        .into_iter()
        .map(|entry| match entry {
            BlobEntryXml::Blob(v) => v.into_item(),
            BlobEntryXml::BlobPrefix(v) => Ok(BlobItem::Directory(BlobDirectory {
                name: v.name.into_name()?,
            })),
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Page {
        items,
        next_marker: non_empty(resp.next_marker),
    })
}

/// Decode the body of a successful List Containers response.
pub(crate) fn parse_list_containers(body: &Bytes) -> Result<Page<ContainerItem>> {
    let body = body_as_str(body)?;
    let resp: ListContainersResponse = de::from_str(body).map_err(|e| {
        Error::unexpected("failed to parse list containers response")
            .with_source(e)
            .with_context(format!("response_length: {}", body.len()))
    })?;

    let items = resp
        .containers
        .items
        .into_iter()
        .map(|v| {
            let p = v.properties;
            Ok(ContainerItem {
                name: v.name,
                properties: ContainerProperties {
                    etag: non_empty(p.etag),
                    last_modified: parse_last_modified(p.last_modified)?,
                    lease_status: non_empty(p.lease_status),
                    lease_state: non_empty(p.lease_state),
                    public_access: non_empty(p.public_access),
                },
                metadata: v.metadata,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Page {
        items,
        next_marker: non_empty(resp.next_marker),
    })
}

/// Build the error of a non-success response.
///
/// The error code is taken from the `x-ms-error-code` header, falling back to
/// the `<Error><Code>` element of the body.
pub(crate) fn parse_service_error(status: StatusCode, headers: &HeaderMap, body: &Bytes) -> Error {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string())
    };

    // Bodies of HEAD requests or proxies may not be xml at all.
    let detail = std::str::from_utf8(body)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .and_then(|v| de::from_str::<ErrorResponse>(v).ok())
        .unwrap_or_default();

    Error::service(ServiceError {
        status,
        code: non_empty(header(X_MS_ERROR_CODE)).or(non_empty(detail.code)),
        message: non_empty(detail.message).map(|v| v.trim().to_string()),
        request_id: header(X_MS_REQUEST_ID),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use reqlist_core::ErrorKind;

    #[test]
    fn test_parse_list_blobs() {
        let _ = env_logger::builder().is_test(true).try_init();

        let content = r#"<?xml version="1.0" encoding="utf-8"?>
<EnumerationResults ServiceEndpoint="https://myaccount.blob.core.windows.net/" ContainerName="mycontainer">
  <Prefix>photos/</Prefix>
  <Marker />
  <MaxResults>3</MaxResults>
  <Delimiter>/</Delimiter>
  <Blobs>
    <Blob>
      <Name>photos/a.jpg</Name>
      <Properties>
        <Creation-Time>Wed, 09 Sep 2009 09:20:02 GMT</Creation-Time>
        <Last-Modified>Wed, 09 Sep 2009 09:20:02 GMT</Last-Modified>
        <Etag>0x8CBFF45D8A29A19</Etag>
        <Content-Length>100</Content-Length>
        <Content-Type>image/jpeg</Content-Type>
        <Content-Encoding />
        <Content-MD5 />
        <BlobType>BlockBlob</BlobType>
        <LeaseStatus>unlocked</LeaseStatus>
        <LeaseState>available</LeaseState>
      </Properties>
      <Metadata>
        <Color>blue</Color>
      </Metadata>
    </Blob>
    <BlobPrefix>
      <Name>photos/b/</Name>
    </BlobPrefix>
    <Blob>
      <Name Encoded="true">photos/%EF%BF%BF.log</Name>
      <Properties>
        <Content-Length>4096</Content-Length>
        <BlobType>PageBlob</BlobType>
      </Properties>
      <Metadata />
    </Blob>
  </Blobs>
  <NextMarker>2!80!bWFya2Vy</NextMarker>
</EnumerationResults>"#;

        let page = parse_list_blobs(&Bytes::from(content)).expect("xml deserialize must success");

        assert_eq!(page.next_marker.as_deref(), Some("2!80!bWFya2Vy"));
        assert_eq!(page.items.len(), 3);

        let blob = page.items[0].as_blob().unwrap();
        assert!(matches!(page.items[0], BlobItem::BlockBlob(_)));
        assert_eq!(blob.name, "photos/a.jpg");
        assert_eq!(blob.properties.content_length, 100);
        assert_eq!(blob.properties.content_md5, None);
        assert_eq!(blob.properties.etag.as_deref(), Some("0x8CBFF45D8A29A19"));
        assert_eq!(
            blob.properties.last_modified,
            Some(chrono::Utc.with_ymd_and_hms(2009, 9, 9, 9, 20, 2).unwrap())
        );
        assert_eq!(blob.metadata.get("Color").map(String::as_str), Some("blue"));

        assert_eq!(
            page.items[1],
            BlobItem::Directory(BlobDirectory {
                name: "photos/b/".to_string()
            })
        );

        assert!(matches!(page.items[2], BlobItem::PageBlob(_)));
        assert_eq!(page.items[2].name(), "photos/\u{FFFF}.log");
        assert!(page.items[2].as_blob().unwrap().metadata.is_empty());
    }

    #[test]
    fn test_parse_last_page() {
        let content = r#"<?xml version="1.0" encoding="utf-8"?>
<EnumerationResults ServiceEndpoint="http://127.0.0.1:10000/devstoreaccount1" ContainerName="empty">
  <Prefix>nothing</Prefix>
  <Blobs />
  <NextMarker />
</EnumerationResults>"#;

        let page = parse_list_blobs(&Bytes::from(content)).unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.next_marker, None);
    }

    #[test]
    fn test_parse_unknown_blob_type() {
        let content = r#"<EnumerationResults><Blobs><Blob><Name>x</Name><Properties><BlobType>TapeBlob</BlobType></Properties></Blob></Blobs></EnumerationResults>"#;

        let err = parse_list_blobs(&Bytes::from(content)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unexpected);
    }

    #[test]
    fn test_parse_invalid_body() {
        let err = parse_list_blobs(&Bytes::from_static(b"<EnumerationResults><Blobs>")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unexpected);
    }

    #[test]
    fn test_parse_list_containers() {
        let content = r#"<?xml version="1.0" encoding="utf-8"?>
<EnumerationResults ServiceEndpoint="https://myaccount.blob.core.windows.net">
  <Prefix>logs</Prefix>
  <MaxResults>2</MaxResults>
  <Containers>
    <Container>
      <Name>logs-2024</Name>
      <Properties>
        <Last-Modified>Tue, 01 Mar 2022 08:12:34 GMT</Last-Modified>
        <Etag>"0x8D9FB5C3C8A5A3A"</Etag>
        <LeaseStatus>unlocked</LeaseStatus>
        <LeaseState>available</LeaseState>
        <PublicAccess>blob</PublicAccess>
      </Properties>
      <Metadata>
        <Owner>ops</Owner>
      </Metadata>
    </Container>
    <Container>
      <Name>logs-2025</Name>
      <Properties />
    </Container>
  </Containers>
  <NextMarker>/myaccount/logs-2026</NextMarker>
</EnumerationResults>"#;

        let page = parse_list_containers(&Bytes::from(content)).unwrap();
        assert_eq!(page.next_marker.as_deref(), Some("/myaccount/logs-2026"));
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].name, "logs-2024");
        assert_eq!(
            page.items[0].properties.public_access.as_deref(),
            Some("blob")
        );
        assert_eq!(
            page.items[0].metadata.get("Owner").map(String::as_str),
            Some("ops")
        );
        assert_eq!(page.items[1].properties, ContainerProperties::default());
    }

    #[test]
    fn test_parse_service_error() {
        let body = Bytes::from(
            r#"<?xml version="1.0" encoding="utf-8"?><Error><Code>ContainerNotFound</Code><Message>The specified container does not exist.
RequestId:ab2a5bba-001e-0059-3a4b-2a1fd2000000</Message></Error>"#,
        );

        let err = parse_service_error(StatusCode::NOT_FOUND, &HeaderMap::new(), &body);
        assert_eq!(err.kind(), ErrorKind::Service);
        assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
        assert_eq!(err.service_code(), Some("ContainerNotFound"));
        assert!(err
            .service_error()
            .and_then(|v| v.message.as_deref())
            .unwrap()
            .starts_with("The specified container does not exist."));
    }

    #[test]
    fn test_parse_service_error_prefers_header() {
        let mut headers = HeaderMap::new();
        headers.insert(X_MS_ERROR_CODE, "SequenceNumberConditionNotMet".parse().unwrap());
        headers.insert(X_MS_REQUEST_ID, "req-1".parse().unwrap());

        let err = parse_service_error(StatusCode::PRECONDITION_FAILED, &headers, &Bytes::new());
        assert_eq!(err.service_code(), Some("SequenceNumberConditionNotMet"));
        assert_eq!(
            err.service_error().and_then(|v| v.request_id.as_deref()),
            Some("req-1")
        );
    }
}
