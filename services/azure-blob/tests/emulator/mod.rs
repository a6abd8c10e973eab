//! In memory blob service speaking the listing protocol.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::fmt::Write;
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use http::{Response, StatusCode};
use quick_xml::escape::escape;
use reqlist_core::{HttpSend, Result};

pub const ACCOUNT: &str = "acct";
pub const PRIMARY_HOST: &str = "primary.test";
pub const SECONDARY_HOST: &str = "secondary.test";

pub fn primary_endpoint() -> String {
    format!("http://{PRIMARY_HOST}/{ACCOUNT}")
}

pub fn secondary_endpoint() -> String {
    format!("http://{SECONDARY_HOST}/{ACCOUNT}")
}

/// One request as seen by the emulator.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub host: String,
    pub path: String,
    pub query: HashMap<String, String>,
}

#[derive(Debug, Clone)]
struct StoredBlob {
    blob_type: &'static str,
    metadata: Vec<(String, String)>,
}

#[derive(Debug, Default)]
struct State {
    containers: BTreeMap<String, BTreeMap<String, StoredBlob>>,
    requests: Vec<Recorded>,
    failures: VecDeque<(StatusCode, &'static str, bool)>,
    empty_pages: usize,
    required_sig: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Emulator {
    state: Arc<Mutex<State>>,
}

impl Emulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_container(self, name: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .containers
            .entry(name.to_string())
            .or_default();
        self
    }

    pub fn with_blob(self, container: &str, name: &str, blob_type: &'static str) -> Self {
        self.with_blob_metadata(container, name, blob_type, &[])
    }

    pub fn with_blob_metadata(
        self,
        container: &str,
        name: &str,
        blob_type: &'static str,
        metadata: &[(&str, &str)],
    ) -> Self {
        self.state
            .lock()
            .unwrap()
            .containers
            .entry(container.to_string())
            .or_default()
            .insert(
                name.to_string(),
                StoredBlob {
                    blob_type,
                    metadata: metadata
                        .iter()
                        .map(|(k, v)| (k.to_string(), v.to_string()))
                        .collect(),
                },
            );
        self
    }

    /// Reject requests whose query doesn't carry `sig=<sig>`.
    pub fn with_required_sig(self, sig: &str) -> Self {
        self.state.lock().unwrap().required_sig = Some(sig.to_string());
        self
    }

    /// Answer the next request with an error, the code is sent in the
    /// `x-ms-error-code` header if `in_header`, in the body otherwise.
    pub fn fail_next(&self, status: StatusCode, code: &'static str, in_header: bool) {
        self.state
            .lock()
            .unwrap()
            .failures
            .push_back((status, code, in_header));
    }

    /// Answer the next `n` listing requests with an empty page.
    pub fn empty_pages(&self, n: usize) {
        self.state.lock().unwrap().empty_pages = n;
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn hosts(&self) -> Vec<String> {
        self.requests().into_iter().map(|v| v.host).collect()
    }

    fn handle(&self, req: &http::Request<Bytes>) -> (StatusCode, Vec<(&'static str, String)>, String) {
        let host = req.uri().host().unwrap_or_default().to_string();
        let path = req.uri().path().to_string();
        let query: HashMap<String, String> = form_urlencoded::parse(
            req.uri().query().unwrap_or_default().as_bytes(),
        )
        .into_owned()
        .collect();

        let mut state = self.state.lock().unwrap();
        state.requests.push(Recorded {
            host: host.clone(),
            path: path.clone(),
            query: query.clone(),
        });

        if let Some((status, code, in_header)) = state.failures.pop_front() {
            return error(status, code, in_header);
        }
        if host != PRIMARY_HOST && host != SECONDARY_HOST {
            return error(StatusCode::BAD_REQUEST, "InvalidUri", false);
        }
        if !req.headers().contains_key("x-ms-version") {
            return error(StatusCode::BAD_REQUEST, "MissingRequiredHeader", false);
        }
        if let Some(sig) = &state.required_sig {
            if query.get("sig") != Some(sig) {
                return error(StatusCode::FORBIDDEN, "AuthenticationFailed", false);
            }
        }

        let segments: Vec<&str> = path.trim_matches('/').split('/').collect();
        let prefix = query.get("prefix").cloned().unwrap_or_default();
        let marker = query.get("marker").cloned().unwrap_or_default();
        let max_results: usize = query
            .get("maxresults")
            .and_then(|v| v.parse().ok())
            .unwrap_or(5000);

        let empty = state.empty_pages > 0;
        if empty {
            state.empty_pages -= 1;
        }

        match segments.as_slice() {
            [ACCOUNT] if query.get("comp").map(String::as_str) == Some("list") => {
                let names: Vec<String> = state
                    .containers
                    .keys()
                    .filter(|v| v.starts_with(&prefix) && v.as_str() >= marker.as_str())
                    .cloned()
                    .collect();
                let (page, next) = paginate(names, max_results, empty, &marker);
                (StatusCode::OK, vec![], list_containers_body(&page, next))
            }
            [ACCOUNT, container]
                if query.get("restype").map(String::as_str) == Some("container")
                    && query.get("comp").map(String::as_str) == Some("list") =>
            {
                let Some(blobs) = state.containers.get(*container) else {
                    return error(StatusCode::NOT_FOUND, "ContainerNotFound", true);
                };
                let delimiter = query.get("delimiter").cloned();
                let include_metadata = query
                    .get("include")
                    .is_some_and(|v| v.split(',').any(|v| v == "metadata"));

                // Entry names in order, directories collapsed.
                let mut entries: Vec<String> = Vec::new();
                for name in blobs.keys() {
                    if !name.starts_with(&prefix) || name.as_str() < marker.as_str() {
                        continue;
                    }
                    let entry = match &delimiter {
                        Some(d) => match name[prefix.len()..].find(d.as_str()) {
                            Some(idx) => name[..prefix.len() + idx + d.len()].to_string(),
                            None => name.clone(),
                        },
                        None => name.clone(),
                    };
                    if entries.last() != Some(&entry) {
                        entries.push(entry);
                    }
                }

                let (page, next) = paginate(entries, max_results, empty, &marker);
                let body = list_blobs_body(container, blobs, &page, next, include_metadata);
                (StatusCode::OK, vec![], body)
            }
            _ => error(StatusCode::BAD_REQUEST, "InvalidQueryParameterValue", false),
        }
    }
}

fn paginate(
    mut names: Vec<String>,
    max_results: usize,
    empty: bool,
    marker: &str,
) -> (Vec<String>, Option<String>) {
    if empty {
        let next = names.first().cloned().or_else(|| Some(marker.to_string()));
        return (vec![], next.filter(|v| !v.is_empty()));
    }

    if names.len() > max_results {
        let rest = names.split_off(max_results);
        (names, rest.into_iter().next())
    } else {
        (names, None)
    }
}

fn error(
    status: StatusCode,
    code: &'static str,
    in_header: bool,
) -> (StatusCode, Vec<(&'static str, String)>, String) {
    let mut headers = vec![("x-ms-request-id", "emulator-request".to_string())];
    if in_header {
        headers.push(("x-ms-error-code", code.to_string()));
    }
    let body = format!(
        r#"<?xml version="1.0" encoding="utf-8"?><Error><Code>{code}</Code><Message>emulated {code}</Message></Error>"#
    );
    (status, headers, body)
}

fn list_containers_body(names: &[String], next: Option<String>) -> String {
    let mut body = String::from(r#"<?xml version="1.0" encoding="utf-8"?><EnumerationResults ServiceEndpoint="http://primary.test/acct"><Containers>"#);
    for name in names {
        write!(
            body,
            "<Container><Name>{}</Name><Properties><Last-Modified>Tue, 01 Mar 2022 08:12:34 GMT</Last-Modified><Etag>\"0x1\"</Etag><LeaseStatus>unlocked</LeaseStatus><LeaseState>available</LeaseState></Properties></Container>",
            escape(name.as_str())
        )
        .unwrap();
    }
    write!(
        body,
        "</Containers><NextMarker>{}</NextMarker></EnumerationResults>",
        escape(next.unwrap_or_default().as_str())
    )
    .unwrap();
    body
}

fn list_blobs_body(
    container: &str,
    blobs: &BTreeMap<String, StoredBlob>,
    entries: &[String],
    next: Option<String>,
    include_metadata: bool,
) -> String {
    let mut body = format!(
        r#"<?xml version="1.0" encoding="utf-8"?><EnumerationResults ServiceEndpoint="http://primary.test/acct" ContainerName="{}"><Blobs>"#,
        escape(container)
    );
    for name in entries {
        match blobs.get(name) {
            Some(blob) => {
                write!(
                    body,
                    "<Blob><Name>{}</Name><Properties><Last-Modified>Tue, 01 Mar 2022 08:12:34 GMT</Last-Modified><Etag>0x8D9</Etag><Content-Length>{}</Content-Length><Content-Type>application/octet-stream</Content-Type><Content-MD5 /><BlobType>{}</BlobType><LeaseStatus>unlocked</LeaseStatus><LeaseState>available</LeaseState></Properties>",
                    escape(name.as_str()),
                    name.len(),
                    blob.blob_type
                )
                .unwrap();
                if include_metadata {
                    body.push_str("<Metadata>");
                    for (k, v) in &blob.metadata {
                        write!(body, "<{k}>{}</{k}>", escape(v.as_str())).unwrap();
                    }
                    body.push_str("</Metadata>");
                }
                body.push_str("</Blob>");
            }
            None => {
                write!(
                    body,
                    "<BlobPrefix><Name>{}</Name></BlobPrefix>",
                    escape(name.as_str())
                )
                .unwrap();
            }
        }
    }
    write!(
        body,
        "</Blobs><NextMarker>{}</NextMarker></EnumerationResults>",
        escape(next.unwrap_or_default().as_str())
    )
    .unwrap();
    body
}

#[async_trait::async_trait]
impl HttpSend for Emulator {
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<Response<Bytes>> {
        let (status, headers, body) = self.handle(&req);

        let mut resp = Response::builder()
            .status(status)
            .header("content-type", "application/xml");
        for (k, v) in headers {
            resp = resp.header(k, v);
        }
        Ok(resp.body(Bytes::from(body)).unwrap())
    }
}
