//! Time related utils.

use crate::{Error, Result};
use chrono::Utc;

/// DateTime is the alias for `chrono::DateTime<Utc>`.
pub type DateTime = chrono::DateTime<Utc>;

/// Parse http date like `Sun, 06 Nov 1994 08:49:37 GMT`.
///
/// Storage services report `Last-Modified` in this format.
pub fn parse_http_date(s: &str) -> Result<DateTime> {
    let t = chrono::DateTime::parse_from_rfc2822(s.trim()).map_err(|e| {
        Error::unexpected("failed to parse http date")
            .with_source(e)
            .with_context(format!("input: {s}"))
    })?;

    Ok(t.with_timezone(&Utc))
}
