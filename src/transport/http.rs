//! HTTP transport backed by ureq
//!
//! ureq is blocking, so requests run on the tokio blocking pool. Non-2xx
//! statuses are returned as responses (`http_status_as_error(false)`); only
//! transport-level failures surface as errors.

use crate::asset::{AssetRequest, Method, StoredResponse};
use crate::error::{LarderError, LarderResult};
use crate::manifest::NetworkConfig;
use crate::transport::Transport;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;
use ureq::Agent;

/// Live network transport
pub struct HttpTransport {
    agent: Agent,
}

impl HttpTransport {
    /// Create a transport with the manifest's network settings
    pub fn new(network: &NetworkConfig) -> Self {
        let config = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(network.timeout_secs)))
            .http_status_as_error(false)
            .build();
        Self {
            agent: Agent::new_with_config(config),
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(&self, request: &AssetRequest) -> LarderResult<StoredResponse> {
        let agent = self.agent.clone();
        let request = request.clone();
        debug!(method = %request.method, url = %request.url, "forwarding to network");

        tokio::task::spawn_blocking(move || fetch_blocking(&agent, &request))
            .await
            .map_err(|e| LarderError::Internal(format!("transport task failed: {}", e)))?
    }
}

fn with_headers<Any>(
    mut builder: ureq::RequestBuilder<Any>,
    headers: &[(String, String)],
) -> ureq::RequestBuilder<Any> {
    for (name, value) in headers {
        builder = builder.header(name, value);
    }
    builder
}

fn fetch_blocking(agent: &Agent, request: &AssetRequest) -> LarderResult<StoredResponse> {
    let url = request.url.as_str();

    let result = match request.method {
        Method::Get => with_headers(agent.get(url), &request.headers).call(),
        Method::Head => with_headers(agent.head(url), &request.headers).call(),
        Method::Delete => with_headers(agent.delete(url), &request.headers).call(),
        Method::Post => with_headers(agent.post(url), &request.headers).send(&request.body[..]),
        Method::Put => with_headers(agent.put(url), &request.headers).send(&request.body[..]),
        Method::Patch => with_headers(agent.patch(url), &request.headers).send(&request.body[..]),
    };

    let mut response = result.map_err(|e| LarderError::network(url, e.to_string()))?;

    let status = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect();
    let body = response
        .body_mut()
        .read_to_vec()
        .map_err(|e| LarderError::network(url, format!("reading body: {}", e)))?;

    Ok(StoredResponse::new(status, headers, body))
}
