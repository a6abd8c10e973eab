//! Storage locations and the location affinity of a listing.
//!
//! A storage account can be served by a primary endpoint and, when geo
//! replication is enabled, by a read-only secondary endpoint. Replicas may
//! lag behind each other, so once a listing has been served by one of them the
//! continuation token is pinned to it and the remaining pages must be fetched
//! from the same endpoint.

use crate::{ContinuationToken, Error, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The endpoint a request is sent to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StorageLocation {
    /// The primary endpoint.
    Primary,
    /// The read-only secondary endpoint.
    Secondary,
}

impl StorageLocation {
    /// The textual name used in continuation tokens.
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageLocation::Primary => "Primary",
            StorageLocation::Secondary => "Secondary",
        }
    }
}

impl fmt::Display for StorageLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageLocation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "Primary" => Ok(StorageLocation::Primary),
            "Secondary" => Ok(StorageLocation::Secondary),
            v => Err(Error::format(format!("unknown storage location: {v}"))),
        }
    }
}

/// LocationMode decides which endpoints a request may be sent to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LocationMode {
    /// Only the primary endpoint.
    #[default]
    PrimaryOnly,
    /// The primary endpoint first, the secondary one is allowed.
    PrimaryThenSecondary,
    /// Only the secondary endpoint.
    SecondaryOnly,
    /// The secondary endpoint first, the primary one is allowed.
    SecondaryThenPrimary,
}

impl LocationMode {
    /// The location used when nothing pins the request.
    pub fn first_location(&self) -> StorageLocation {
        match self {
            LocationMode::PrimaryOnly | LocationMode::PrimaryThenSecondary => {
                StorageLocation::Primary
            }
            LocationMode::SecondaryOnly | LocationMode::SecondaryThenPrimary => {
                StorageLocation::Secondary
            }
        }
    }

    /// Check if requests under this mode may be served by `location`.
    pub fn allows(&self, location: StorageLocation) -> bool {
        !matches!(
            (self, location),
            (LocationMode::PrimaryOnly, StorageLocation::Secondary)
                | (LocationMode::SecondaryOnly, StorageLocation::Primary)
        )
    }
}

impl FromStr for LocationMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "primaryonly" | "primary_only" => Ok(LocationMode::PrimaryOnly),
            "primarythensecondary" | "primary_then_secondary" => {
                Ok(LocationMode::PrimaryThenSecondary)
            }
            "secondaryonly" | "secondary_only" => Ok(LocationMode::SecondaryOnly),
            "secondarythenprimary" | "secondary_then_primary" => {
                Ok(LocationMode::SecondaryThenPrimary)
            }
            _ => Err(Error::config_invalid(format!("unknown location mode: {s}"))),
        }
    }
}

/// Decide the location the next page must be fetched from.
///
/// A token pinned to a location wins over the mode's preference, but it must
/// still be allowed by the mode. Clearing the token's target location lifts
/// the pin.
pub fn resolve_location(
    mode: LocationMode,
    token: Option<&ContinuationToken>,
    secondary_available: bool,
) -> Result<StorageLocation> {
    let location = match token.and_then(|t| t.target_location()) {
        Some(pinned) => {
            if !mode.allows(pinned) {
                return Err(Error::invalid_operation(format!(
                    "continuation token is pinned to the {pinned} location which location mode {mode:?} does not allow"
                ))
                .with_context("hint: clear the target location of the token to continue on another location"));
            }
            debug!("continuation token pins the listing to {pinned}");
            pinned
        }
        None => mode.first_location(),
    };

    if location == StorageLocation::Secondary && !secondary_available {
        return Err(Error::invalid_operation(
            "the request must be sent to the secondary location but no secondary endpoint is configured",
        ));
    }

    Ok(location)
}
