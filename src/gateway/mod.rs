//! Authenticated HTTP access to the strike backend.
//!
//! One [`Gateway`] is shared by every store. Each public method performs
//! exactly one REST call; nothing is retried or cached here. Calls that need
//! a bearer token fail fast with [`StrikeError::Unauthenticated`] when none is
//! set, without touching the network.

pub mod activities;
pub mod auth;
pub mod cards;
pub mod dashboard;
pub mod leads;
pub mod tasks;

use parking_lot::RwLock;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::config::AppConfig;
use crate::error::{Result, StrikeError};

#[derive(Clone)]
pub struct Gateway {
    inner: Arc<Inner>,
}

struct Inner {
    client: RwLock<Client>,
    base_url: RwLock<String>,
    token: RwLock<Option<String>>,
}

/// Error body shape. `detail` is either a message or a list of field errors.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<serde_json::Value>,
}

fn build_client(timeout_secs: u64) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs.max(1)))
        .build()
        .map_err(|e| StrikeError::Network(format!("could not build HTTP client: {}", e)))
}

impl Gateway {
    pub fn new(config: &AppConfig) -> Result<Self> {
        Ok(Self {
            inner: Arc::new(Inner {
                client: RwLock::new(build_client(config.request_timeout_secs)?),
                base_url: RwLock::new(config.backend_url.trim_end_matches('/').to_string()),
                token: RwLock::new(None),
            }),
        })
    }

    /// Points the gateway at a new backend; the session token is kept.
    pub fn reconfigure(&self, config: &AppConfig) -> Result<()> {
        let client = build_client(config.request_timeout_secs)?;
        *self.inner.client.write() = client;
        *self.inner.base_url.write() = config.backend_url.trim_end_matches('/').to_string();
        Ok(())
    }

    pub fn base_url(&self) -> String {
        self.inner.base_url.read().clone()
    }

    pub fn set_token(&self, token: impl Into<String>) {
        *self.inner.token.write() = Some(token.into());
    }

    pub fn clear_token(&self) {
        *self.inner.token.write() = None;
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.token.read().is_some()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.inner.base_url.read(), path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let client = self.inner.client.read().clone();
        client.request(method, self.url(path))
    }

    fn authed(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let token = self
            .inner
            .token
            .read()
            .clone()
            .ok_or(StrikeError::Unauthenticated)?;
        Ok(self.request(method, path).bearer_auth(token))
    }

    async fn execute(builder: RequestBuilder) -> Result<Response> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let detail = error_detail(&body)
            .unwrap_or_else(|| format!("Request failed with status {}", status.as_u16()));
        log::warn!("backend returned {}: {}", status, detail);
        Err(StrikeError::Api {
            status: status.as_u16(),
            detail,
        })
    }

    async fn execute_json<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T> {
        let response = Self::execute(builder).await?;
        response
            .json()
            .await
            .map_err(|e| StrikeError::Decode(e.to_string()))
    }

    /// Authenticated GET bound to `cancel`.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        cancel: &CancellationToken,
    ) -> Result<T> {
        let builder = self.authed(Method::GET, path)?.query(query);
        log::debug!("GET {}", path);
        cancellable(cancel, Self::execute_json(builder)).await
    }

    async fn send_json<B: serde::Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T> {
        log::debug!("{} {}", method, path);
        let builder = self.authed(method, path)?.json(body);
        Self::execute_json(builder).await
    }

    /// Authenticated call whose response body is not needed.
    async fn send_unit(&self, method: Method, path: &str, query: &[(&str, &str)]) -> Result<()> {
        log::debug!("{} {}", method, path);
        let builder = self.authed(method, path)?.query(query);
        Self::execute(builder).await.map(|_| ())
    }
}

/// Races `fut` against `cancel`. A cancelled call yields
/// [`StrikeError::Cancelled`] and its result is dropped.
pub async fn cancellable<T, F>(cancel: &CancellationToken, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(StrikeError::Cancelled),
        out = fut => out,
    }
}

fn error_detail(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    match parsed.detail? {
        serde_json::Value::String(msg) if !msg.trim().is_empty() => Some(msg),
        serde_json::Value::Array(items) => items
            .iter()
            .find_map(|item| item.get("msg").and_then(|m| m.as_str()))
            .map(str::to_string),
        _ => None,
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub async fn gateway_for(server: &mockito::ServerGuard) -> Gateway {
        let config = AppConfig {
            backend_url: server.url(),
            request_timeout_secs: 5,
            default_currency: "USD".to_string(),
        };
        let gateway = Gateway::new(&config).unwrap();
        gateway.set_token("tok");
        gateway
    }

    pub fn lead_json(id: &str, name: &str, stage: &str) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "name": name,
            "phone": "555-0100",
            "stage": stage,
            "priority": "medium",
            "user_id": "u1",
            "created_at": "2024-05-01T09:00:00Z"
        })
    }
}
