//! HTTP client for the RAG backend

use std::time::Duration;

use log::debug;

use super::request::{Endpoint, RagRequest, RagResponse};
use crate::settings::BackendConfig;

/// Errors from a single backend call
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{endpoint} returned HTTP {status}")]
    Status { endpoint: &'static str, status: u16 },

    #[error("could not decode response: {0}")]
    Decode(reqwest::Error),

    #[error("{detail}")]
    Generic { detail: String },
}

impl BackendError {
    pub fn generic(msg: impl Into<String>) -> Self {
        Self::Generic { detail: msg.into() }
    }
}

/// Anything that can answer a question posted to an endpoint.
///
/// The real implementation is [`BackendClient`]; tests substitute scripted ones.
pub trait RagBackend: Send + Sync {
    fn ask(&self, endpoint: Endpoint, request: &RagRequest) -> Result<RagResponse, BackendError>;
}

/// Blocking JSON client. Each call is independent: no retries, no caching.
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::blocking::Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(None::<Duration>)
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn post(
        &self,
        endpoint: Endpoint,
        request: &RagRequest,
    ) -> Result<RagResponse, BackendError> {
        let url = format!("{}{}", self.base_url, endpoint.path());
        debug!("POST {url}");

        let response = self.http.post(&url).json(request).send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Status {
                endpoint: endpoint.path(),
                status: status.as_u16(),
            });
        }

        response.json::<RagResponse>().map_err(BackendError::Decode)
    }
}

impl RagBackend for BackendClient {
    fn ask(&self, endpoint: Endpoint, request: &RagRequest) -> Result<RagResponse, BackendError> {
        self.post(endpoint, request)
    }
}
