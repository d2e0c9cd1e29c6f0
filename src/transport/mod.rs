//! Network transport abstraction
//!
//! The cache manager never talks to the network directly; it goes through
//! this trait so the transport can be swapped for a scripted double in tests
//! and so cache-first ordering (lookup before any network attempt) is
//! enforced in one place.

pub mod http;

pub use http::HttpTransport;

use crate::asset::{AssetRequest, StoredResponse};
use crate::error::LarderResult;
use async_trait::async_trait;

/// Abstract network transport
///
/// A returned response may carry any status; non-2xx is still a response,
/// not an error. Errors mean the request could not be carried out at all
/// (unreachable host, timeout, connection refused).
#[async_trait]
pub trait Transport: Send + Sync {
    /// Forward a request to the network, unmodified
    async fn fetch(&self, request: &AssetRequest) -> LarderResult<StoredResponse>;
}
