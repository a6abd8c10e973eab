use std::collections::HashMap;

use reqlist_core::time::DateTime;

/// BlobItem is one entry of a blob listing.
///
/// The variant is decided by the blob type reported by the service. In a
/// hierarchical listing, names sharing a prefix up to the delimiter are
/// grouped into a [`BlobItem::Directory`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlobItem {
    /// A block blob.
    BlockBlob(Blob),
    /// A page blob.
    PageBlob(Blob),
    /// An append blob.
    AppendBlob(Blob),
    /// A virtual directory.
    Directory(BlobDirectory),
}

impl BlobItem {
    /// Full name of this entry, directories end with the delimiter.
    pub fn name(&self) -> &str {
        match self {
            BlobItem::BlockBlob(v) | BlobItem::PageBlob(v) | BlobItem::AppendBlob(v) => &v.name,
            BlobItem::Directory(v) => &v.name,
        }
    }

    /// The blob of this entry, `None` for a directory.
    pub fn as_blob(&self) -> Option<&Blob> {
        match self {
            BlobItem::BlockBlob(v) | BlobItem::PageBlob(v) | BlobItem::AppendBlob(v) => Some(v),
            BlobItem::Directory(_) => None,
        }
    }

    /// Check if this entry is a virtual directory.
    pub fn is_directory(&self) -> bool {
        matches!(self, BlobItem::Directory(_))
    }
}

/// A blob returned by a listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Blob {
    /// Name of the blob.
    pub name: String,
    /// Snapshot time, set when snapshots are listed.
    pub snapshot: Option<String>,
    /// Whether the blob is soft deleted.
    pub deleted: bool,
    /// System properties.
    pub properties: BlobProperties,
    /// User metadata, empty unless requested.
    pub metadata: HashMap<String, String>,
}

/// System properties of a blob.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlobProperties {
    pub etag: Option<String>,
    pub last_modified: Option<DateTime>,
    pub content_length: u64,
    pub content_type: Option<String>,
    pub content_md5: Option<String>,
    pub lease_status: Option<String>,
    pub lease_state: Option<String>,
    pub copy_id: Option<String>,
    pub copy_status: Option<String>,
}

/// A virtual directory of a hierarchical listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobDirectory {
    /// Prefix shared by the blobs inside, including the trailing delimiter.
    pub name: String,
}

/// A container returned by a listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerItem {
    /// Name of the container.
    pub name: String,
    /// System properties.
    pub properties: ContainerProperties,
    /// User metadata, empty unless requested.
    pub metadata: HashMap<String, String>,
}

/// System properties of a container.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerProperties {
    pub etag: Option<String>,
    pub last_modified: Option<DateTime>,
    pub lease_status: Option<String>,
    pub lease_state: Option<String>,
    pub public_access: Option<String>,
}
