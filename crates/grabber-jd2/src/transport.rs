//! HTTP transport seam
//!
//! The client only ever issues GETs with a handful of query parameters, so the
//! seam is a single method. [`HttpTransport`] is the production implementation.

use std::sync::Arc;
use std::time::Duration;

use url::Url;

use crate::error::TransportError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportRequest {
    pub url: String,
    pub params: Vec<(String, String)>,
    pub timeout: Duration,
}

impl TransportRequest {
    /// Value of the first query parameter called `name`
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Blocking GET transport. Non-2xx responses are returned, not raised.
pub trait Transport: Send + Sync {
    fn get(&self, request: &TransportRequest) -> Result<TransportResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn get(&self, request: &TransportRequest) -> Result<TransportResponse, TransportError> {
        (**self).get(request)
    }
}

/// `reqwest` blocking client, pooled and reused across calls.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }

    pub fn from_client(client: reqwest::blocking::Client) -> Self {
        Self { client }
    }
}

impl Transport for HttpTransport {
    fn get(&self, request: &TransportRequest) -> Result<TransportResponse, TransportError> {
        let url = Url::parse_with_params(&request.url, &request.params).map_err(|source| {
            TransportError::InvalidUrl {
                url: request.url.clone(),
                source,
            }
        })?;

        let response = self.client.get(url).timeout(request.timeout).send()?;
        let status = response.status().as_u16();
        let body = response.text()?;

        tracing::trace!(url = %request.url, status, "JD2 response");

        Ok(TransportResponse { status, body })
    }
}
