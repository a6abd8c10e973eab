//! Continuation token of a segmented listing.
//!
//! The token is the only listing state a caller keeps between two pages. Its
//! XML form is stable and may be stored by callers, so both the hand written
//! reader/writer and the serde implementation produce the same layout:
//!
//! ```xml
//! <ContinuationToken>
//!   <Version>2.0</Version>
//!   <Type>Blob</Type>
//!   <NextMarker>2!96!MDAwMDE5IWJiMSEwMDAwMjgh</NextMarker>
//!   <TargetLocation>Primary</TargetLocation>
//! </ContinuationToken>
//! ```

use crate::{Error, Result, StorageLocation};
use quick_xml::escape::escape;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::io::Write;

const TOKEN_ELEMENT: &str = "ContinuationToken";
const VERSION_ELEMENT: &str = "Version";
const TYPE_ELEMENT: &str = "Type";
const NEXT_MARKER_ELEMENT: &str = "NextMarker";
const TARGET_LOCATION_ELEMENT: &str = "TargetLocation";

const TOKEN_VERSION: &str = "2.0";
const TOKEN_TYPE: &str = "Blob";

/// ContinuationToken is the opaque cursor returned by a segmented listing.
///
/// `None` in place of a token means the listing is complete. A token is
/// replaced wholesale by the next page; the only supported mutation is
/// clearing its target location to lift the location pin.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "TokenDocument", into = "TokenDocument")]
pub struct ContinuationToken {
    next_marker: Option<String>,
    target_location: Option<StorageLocation>,
}

impl ContinuationToken {
    /// Create a new token.
    pub fn new(next_marker: Option<String>, target_location: Option<StorageLocation>) -> Self {
        Self {
            next_marker,
            target_location,
        }
    }

    /// The server issued marker of the next page.
    pub fn next_marker(&self) -> Option<&str> {
        self.next_marker.as_deref()
    }

    /// The location the next page must be fetched from.
    pub fn target_location(&self) -> Option<StorageLocation> {
        self.target_location
    }

    /// Replace the target location.
    ///
    /// Setting it to `None` allows the next page to be served by any location
    /// the request options allow.
    pub fn set_target_location(&mut self, location: Option<StorageLocation>) {
        self.target_location = location;
    }

    /// Lift the location pin of this token.
    pub fn clear_target_location(&mut self) {
        self.target_location = None;
    }

    /// Serialize this token into a standalone XML document.
    pub fn to_xml(&self) -> Result<String> {
        let mut writer = Writer::new(Vec::new());
        self.write_xml(&mut writer)?;
        Ok(String::from_utf8(writer.into_inner())?)
    }

    /// Parse a token from an XML document.
    ///
    /// The `<ContinuationToken>` element may be the document root or nested
    /// at any depth inside other elements.
    pub fn from_xml(s: &str) -> Result<Self> {
        let mut reader = Reader::from_str(s);
        Self::read_xml(&mut reader)
    }

    /// Write the `<ContinuationToken>` element at the writer's current position.
    ///
    /// Nothing else is written, so the token can be embedded in an enclosing
    /// document.
    pub fn write_xml<W: Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        write_event(writer, Event::Start(BytesStart::new(TOKEN_ELEMENT)))?;
        write_text_element(writer, VERSION_ELEMENT, TOKEN_VERSION)?;
        write_text_element(writer, TYPE_ELEMENT, TOKEN_TYPE)?;
        if let Some(marker) = &self.next_marker {
            write_text_element(writer, NEXT_MARKER_ELEMENT, marker)?;
        }
        if let Some(location) = self.target_location {
            write_text_element(writer, TARGET_LOCATION_ELEMENT, location.as_str())?;
        }
        write_event(writer, Event::End(BytesEnd::new(TOKEN_ELEMENT)))
    }

    /// Read the next `<ContinuationToken>` element from the reader.
    ///
    /// The reader config is left untouched. Everything before the element is skipped. After a successful read the
    /// reader is positioned right after `</ContinuationToken>`. Unknown child
    /// elements are ignored.
    pub fn read_xml(reader: &mut Reader<&[u8]>) -> Result<Self> {
        loop {
            match read_event(reader)? {
                Event::Start(e) if e.local_name().as_ref() == TOKEN_ELEMENT.as_bytes() => {
                    return Self::read_fields(reader);
                }
                Event::Empty(e) if e.local_name().as_ref() == TOKEN_ELEMENT.as_bytes() => {
                    return Ok(Self::default());
                }
                Event::Eof => {
                    return Err(Error::format(format!(
                        "no <{TOKEN_ELEMENT}> element found in document"
                    )));
                }
                _ => {}
            }
        }
    }

    fn read_fields(reader: &mut Reader<&[u8]>) -> Result<Self> {
        let mut token = Self::default();

        loop {
            match read_event(reader)? {
                Event::Start(e) => {
                    let name = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                    match name.as_str() {
                        VERSION_ELEMENT => check_version(&read_text(reader, &name)?)?,
                        TYPE_ELEMENT => check_type(&read_text(reader, &name)?)?,
                        NEXT_MARKER_ELEMENT => {
                            token.next_marker = Some(read_text(reader, &name)?);
                        }
                        TARGET_LOCATION_ELEMENT => {
                            let location = read_text(reader, &name)?;
                            token.target_location = Some(location.parse()?);
                        }
                        _ => {
                            reader.read_to_end(e.name()).map_err(|err| {
                                Error::format("failed to skip unknown element")
                                    .with_source(err)
                                    .with_context(format!("element: {name}"))
                            })?;
                        }
                    }
                }
                Event::Empty(e) => {
                    if e.local_name().as_ref() == NEXT_MARKER_ELEMENT.as_bytes() {
                        token.next_marker = Some(String::new());
                    }
                }
                Event::End(e) if e.local_name().as_ref() == TOKEN_ELEMENT.as_bytes() => {
                    return Ok(token);
                }
                // Whitespace between child elements.
                Event::Text(t) if t.iter().all(|b| is_xml_whitespace(*b)) => {}
                Event::Text(_) | Event::CData(_) => {
                    return Err(Error::format(format!(
                        "unexpected text inside <{TOKEN_ELEMENT}>"
                    )));
                }
                Event::Eof => {
                    return Err(Error::format(format!(
                        "unexpected end of document inside <{TOKEN_ELEMENT}>"
                    )));
                }
                _ => {}
            }
        }
    }
}

fn check_version(version: &str) -> Result<()> {
    if version.starts_with("2.") {
        Ok(())
    } else {
        Err(Error::format(format!(
            "unsupported continuation token version: {version}"
        )))
    }
}

fn check_type(kind: &str) -> Result<()> {
    if kind == TOKEN_TYPE {
        Ok(())
    } else {
        Err(Error::format(format!(
            "unexpected continuation token type: {kind}"
        )))
    }
}

/// The characters XML readers trim around text.
fn is_xml_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n')
}

fn read_event<'a>(reader: &mut Reader<&'a [u8]>) -> Result<Event<'a>> {
    reader.read_event().map_err(|e| {
        Error::format("malformed continuation token document")
            .with_source(e)
            .with_context(format!("position: {}", reader.buffer_position()))
    })
}

/// Read the text content of a leaf element whose start tag was just consumed.
fn read_text(reader: &mut Reader<&[u8]>, name: &str) -> Result<String> {
    let mut value = String::new();

    loop {
        match read_event(reader)? {
            Event::Text(t) => {
                let text = t.unescape().map_err(|e| {
                    Error::format("invalid escape in continuation token")
                        .with_source(e)
                        .with_context(format!("element: {name}"))
                })?;
                value.push_str(&text);
            }
            Event::CData(t) => value.push_str(&String::from_utf8_lossy(&t.into_inner())),
            Event::End(e) if e.local_name().as_ref() == name.as_bytes() => return Ok(value),
            Event::Start(_) | Event::Empty(_) => {
                return Err(Error::format(format!(
                    "unexpected child element inside <{name}>"
                )));
            }
            Event::Eof => {
                return Err(Error::format(format!(
                    "unexpected end of document inside <{name}>"
                )));
            }
            _ => {}
        }
    }
}

fn write_event<W: Write>(writer: &mut Writer<W>, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| Error::unexpected("failed to write continuation token").with_source(e))
}

fn write_text_element<W: Write>(writer: &mut Writer<W>, name: &str, value: &str) -> Result<()> {
    write_event(writer, Event::Start(BytesStart::new(name)))?;
    write_event(writer, Event::Text(BytesText::from_escaped(escape_text(value))))?;
    write_event(writer, Event::End(BytesEnd::new(name)))
}

/// Escape `value` as element text.
///
/// Leading and trailing whitespace is written as character references.
/// Readers that trim text do so before unescaping, so the value survives.
fn escape_text(value: &str) -> Cow<'_, str> {
    let is_ws = |c: char| c.is_ascii() && is_xml_whitespace(c as u8);
    let body = value.trim_matches(is_ws);
    if body.len() == value.len() {
        return escape(value);
    }

    let lead = &value[..value.len() - value.trim_start_matches(is_ws).len()];
    let tail = &value[lead.len() + body.len()..];

    let mut out = String::with_capacity(value.len() + 8);
    for c in lead.chars() {
        out.push_str(&format!("&#{};", c as u32));
    }
    out.push_str(&escape(body));
    for c in tail.chars() {
        out.push_str(&format!("&#{};", c as u32));
    }
    Cow::Owned(out)
}

/// Serde representation of a token, shared by every serde format.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename = "ContinuationToken", rename_all = "PascalCase")]
struct TokenDocument {
    #[serde(default)]
    version: Option<String>,
    #[serde(rename = "Type", default)]
    kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    next_marker: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    target_location: Option<String>,
}

impl From<ContinuationToken> for TokenDocument {
    fn from(token: ContinuationToken) -> Self {
        TokenDocument {
            version: Some(TOKEN_VERSION.to_string()),
            kind: Some(TOKEN_TYPE.to_string()),
            next_marker: token.next_marker,
            target_location: token.target_location.map(|v| v.as_str().to_string()),
        }
    }
}

impl TryFrom<TokenDocument> for ContinuationToken {
    type Error = Error;

    fn try_from(doc: TokenDocument) -> Result<Self> {
        if let Some(version) = &doc.version {
            check_version(version)?;
        }
        if let Some(kind) = &doc.kind {
            check_type(kind)?;
        }

        let target_location = doc
            .target_location
            .as_deref()
            .map(str::parse::<StorageLocation>)
            .transpose()?;

        Ok(ContinuationToken {
            next_marker: doc.next_marker,
            target_location,
        })
    }
}
