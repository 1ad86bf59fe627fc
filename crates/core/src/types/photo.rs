//! Opaque photo reference attached to recipes.

use serde::{Deserialize, Serialize};

/// A photo stored by the backend's blob storage.
///
/// Uploads carry raw bytes; values read back from the backend may instead
/// carry a direct URL. Either way the sync layer passes the value through
/// untouched.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhotoBlob {
    /// Raw image content.
    Bytes(Vec<u8>),
    /// Direct URL served by blob storage.
    Url(String),
}

impl PhotoBlob {
    /// Wrap raw image bytes.
    #[must_use]
    pub const fn from_bytes(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }

    /// Reference a photo by URL.
    #[must_use]
    pub fn from_url(url: impl Into<String>) -> Self {
        Self::Url(url.into())
    }

    /// The direct URL, if this blob is URL-backed.
    #[must_use]
    pub fn direct_url(&self) -> Option<&str> {
        match self {
            Self::Url(url) => Some(url),
            Self::Bytes(_) => None,
        }
    }
}

// Byte payloads can be megabytes; print the length only.
impl std::fmt::Debug for PhotoBlob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bytes(bytes) => f
                .debug_struct("PhotoBlob::Bytes")
                .field("len", &bytes.len())
                .finish(),
            Self::Url(url) => f.debug_tuple("PhotoBlob::Url").field(url).finish(),
        }
    }
}
