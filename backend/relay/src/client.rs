//! # Vault Client
//!
//! One bounded call per request. No retries, no circuit breaking: a slow or
//! absent vault turns into a [`ForwardError`] as soon as the timeout lapses.
use std::time::Duration;

use form::{Operation, RecordPayload};
use reqwest::{Client, Method, RequestBuilder};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

pub const RECORDS_PATH: &str = "/api/postdata/db";
pub const LIST_PATH: &str = "/api/getdata/db";

#[derive(Error, Debug)]
pub enum ForwardError {
    #[error("persistence service did not answer within {}s", .0.as_secs_f32())]
    Timeout(Duration),

    #[error("persistence service unreachable: {0}")]
    Unreachable(#[source] reqwest::Error),

    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("unreadable response from persistence service: {0}")]
    Decode(#[source] reqwest::Error),
}

impl ForwardError {
    /// Status the vault answered with, if it answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ForwardError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub struct VaultClient {
    http: Client,
    base_url: String,
    timeout: Duration,
}

fn method(operation: Operation) -> Method {
    match operation {
        Operation::Insert => Method::POST,
        Operation::Upsert => Method::PUT,
        Operation::Delete => Method::DELETE,
    }
}

impl VaultClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            http: Client::builder().timeout(timeout).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn forward(
        &self,
        operation: Operation,
        payload: &RecordPayload,
    ) -> Result<Value, ForwardError> {
        let request = self
            .http
            .request(method(operation), format!("{}{RECORDS_PATH}", self.base_url))
            .json(payload);

        self.send(request).await
    }

    pub async fn list(&self) -> Result<Value, ForwardError> {
        let request = self.http.get(format!("{}{LIST_PATH}", self.base_url));

        self.send(request).await
    }

    async fn send(&self, request: RequestBuilder) -> Result<Value, ForwardError> {
        let response = request.send().await.map_err(|e| self.classify(e))?;
        let status = response.status();
        debug!("Vault answered {status}");

        if status.is_success() {
            return response.json::<Value>().await.map_err(|e| {
                if e.is_timeout() {
                    ForwardError::Timeout(self.timeout)
                } else {
                    ForwardError::Decode(e)
                }
            });
        }

        let body = response.text().await.map_err(|e| self.classify(e))?;
        let message = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|json| json.get("message")?.as_str().map(str::to_string))
            .unwrap_or_else(|| {
                if body.trim().is_empty() {
                    status.to_string()
                } else {
                    body
                }
            });

        warn!("Vault rejected request with {status}: {message}");
        Err(ForwardError::Rejected {
            status: status.as_u16(),
            message,
        })
    }

    fn classify(&self, e: reqwest::Error) -> ForwardError {
        if e.is_timeout() {
            ForwardError::Timeout(self.timeout)
        } else {
            ForwardError::Unreachable(e)
        }
    }
}
