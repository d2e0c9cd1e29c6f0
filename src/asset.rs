//! Request and response types for the cache layer
//!
//! A request is identified by its [`AssetKey`]: the uppercased method plus
//! the normalized URL (lowercased scheme/host, default port elided, fragment
//! stripped, query preserved). Same key = same cache slot.

use crate::error::{LarderError, LarderResult};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use url::Url;

/// Request methods understood by the cache layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Head,
    Post,
    Put,
    Delete,
    Patch,
}

impl Method {
    /// The canonical wire spelling
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Head => "HEAD",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
        }
    }

    /// Parse from any-case spelling
    pub fn parse(s: &str) -> LarderResult<Self> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "HEAD" => Ok(Self::Head),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "DELETE" => Ok(Self::Delete),
            "PATCH" => Ok(Self::Patch),
            other => Err(LarderError::UnsupportedMethod(other.to_string())),
        }
    }

    /// Whether this method carries a request body on the wire
    pub fn has_body(&self) -> bool {
        matches!(self, Self::Post | Self::Put | Self::Patch)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An outgoing resource request subject to interception
#[derive(Debug, Clone)]
pub struct AssetRequest {
    /// Request method
    pub method: Method,
    /// Absolute request URL
    pub url: Url,
    /// Request headers (name, value)
    pub headers: Vec<(String, String)>,
    /// Request body (empty for bodyless methods)
    pub body: Vec<u8>,
}

impl AssetRequest {
    /// Create a GET request for a URL
    pub fn get(url: Url) -> Self {
        Self {
            method: Method::Get,
            url,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    /// The normalized cache key for this request
    pub fn key(&self) -> AssetKey {
        AssetKey::new(self.method, &self.url)
    }
}

/// Normalized cache key: method + URL with fragment stripped
///
/// The `url` crate already lowercases scheme/host and drops default ports at
/// parse time, so normalization here only removes the fragment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssetKey {
    canonical: String,
}

impl AssetKey {
    /// Build a key from a method and an absolute URL
    pub fn new(method: Method, url: &Url) -> Self {
        let mut url = url.clone();
        url.set_fragment(None);
        Self {
            canonical: format!("{} {}", method.as_str(), url),
        }
    }

    /// The canonical string form ("GET https://host/path?q=1")
    pub fn as_str(&self) -> &str {
        &self.canonical
    }

    /// Hex SHA-256 of the canonical form, used as the on-disk entry name
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.canonical.as_bytes());
        hex::encode(hasher.finalize())
    }
}

impl fmt::Display for AssetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.canonical)
    }
}

/// A response as held by the cache: status, headers and body bytes
///
/// Stored entries and live network responses share this type, so callers
/// cannot tell which source served a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers (name, value)
    pub headers: Vec<(String, String)>,
    /// Response body
    pub body: Vec<u8>,
}

impl StoredResponse {
    /// Create a response from its parts
    pub fn new(status: u16, headers: Vec<(String, String)>, body: Vec<u8>) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Whether the status is in the 2xx range
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Look up a header value, case-insensitive on the name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// The Content-Type header, if any
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }
}
