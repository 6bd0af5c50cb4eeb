//! Push notification gateway.
//!
//! Delivery itself is an external service; the server only hands it a device
//! token plus a title and body.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Serialize;
use thiserror::Error;
use url::Url;

use crate::config::PushGatewayConfig;

/// Errors that can occur when delivering a push message.
#[derive(Debug, Error)]
pub enum PushError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Gateway returned an error response.
    #[error("gateway error: {status} - {message}")]
    Gateway { status: u16, message: String },

    /// Client could not be configured.
    #[error("invalid gateway configuration: {0}")]
    Config(String),
}

/// A single push message addressed to one device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PushMessage {
    pub token: String,
    pub title: String,
    pub body: String,
}

/// Something that can deliver push messages.
#[async_trait]
pub trait PushGateway: Send + Sync {
    /// Deliver one message.
    async fn send(&self, message: &PushMessage) -> Result<(), PushError>;
}

/// Pick the gateway for `config`: HTTP when an endpoint is set, logging otherwise.
///
/// # Errors
///
/// Returns `PushError::Config` if the HTTP client cannot be built.
pub fn gateway_from_config(
    config: Option<&PushGatewayConfig>,
) -> Result<Arc<dyn PushGateway>, PushError> {
    match config {
        Some(config) => {
            tracing::info!(url = %config.url, "Using HTTP push gateway");
            Ok(Arc::new(HttpPushGateway::new(config)?))
        }
        None => {
            tracing::info!("No push gateway configured, reminders will only be logged");
            Ok(Arc::new(LogPushGateway))
        }
    }
}

/// Gateway that only logs messages. Used when no endpoint is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogPushGateway;

#[async_trait]
impl PushGateway for LogPushGateway {
    async fn send(&self, message: &PushMessage) -> Result<(), PushError> {
        tracing::info!(
            title = %message.title,
            body = %message.body,
            "Push message (log gateway)"
        );
        Ok(())
    }
}

/// Gateway that POSTs `{token, title, body}` JSON to an HTTP endpoint.
#[derive(Clone)]
pub struct HttpPushGateway {
    client: reqwest::Client,
    url: Url,
}

impl HttpPushGateway {
    /// Create a gateway client.
    ///
    /// # Errors
    ///
    /// Returns error if the API key is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(config: &PushGatewayConfig) -> Result<Self, PushError> {
        let mut headers = HeaderMap::new();

        if let Some(key) = &config.api_key {
            let auth_value = format!("Bearer {}", key.expose_secret());
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&auth_value)
                    .map_err(|e| PushError::Config(format!("Invalid API key format: {e}")))?,
            );
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            url: config.url.clone(),
        })
    }
}

#[async_trait]
impl PushGateway for HttpPushGateway {
    async fn send(&self, message: &PushMessage) -> Result<(), PushError> {
        let response = self
            .client
            .post(self.url.clone())
            .json(message)
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(PushError::Gateway {
                status: status.as_u16(),
                message,
            });
        }

        Ok(())
    }
}
