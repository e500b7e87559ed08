//! Authenticated access to the remote order service.

use std::{collections::HashSet, time::Duration};

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::{de::IgnoredAny, Deserialize};
use shared::{
    domain::{Order, OrderDraft, OrderId},
    error::ApiMessage,
    session::SessionContext,
};
use thiserror::Error;
use tracing::{debug, info, warn};

const VALIDATION_FALLBACK: &str = "Invalid booking details";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("HTTP error! status: {status}")]
    Http { status: u16, message: Option<String> },
    #[error("validation failed: {message}")]
    Validation { message: String },
    #[error("failed to decode response: {0}")]
    Decode(String),
}

/// Failure of the list read path.
pub type FetchError = GatewayError;

impl GatewayError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Text the server attached to the failure, if it sent any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Http { message, .. } => message.as_deref(),
            Self::Validation { message } => Some(message),
            Self::Transport(_) | Self::Decode(_) => None,
        }
    }

    fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

#[async_trait]
pub trait OrderGateway: Send + Sync {
    /// Full snapshot of the orders visible to the signed-in agent.
    async fn fetch_all(&self, session: &SessionContext) -> Result<Vec<Order>, FetchError>;

    /// Not idempotent: a repeat after success may come back as not-found.
    async fn delete_order(&self, session: &SessionContext, id: &OrderId)
        -> Result<(), GatewayError>;

    async fn create_order(
        &self,
        session: &SessionContext,
        draft: &OrderDraft,
    ) -> Result<Order, GatewayError>;
}

pub struct HttpOrderGateway {
    http: Client,
    server_url: String,
}

impl HttpOrderGateway {
    pub fn new(server_url: impl Into<String>, timeout: Duration) -> Result<Self, GatewayError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(GatewayError::from_reqwest)?;
        Ok(Self::with_client(http, server_url))
    }

    pub fn with_client(http: Client, server_url: impl Into<String>) -> Self {
        Self {
            http,
            server_url: server_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }
}

#[async_trait]
impl OrderGateway for HttpOrderGateway {
    async fn fetch_all(&self, session: &SessionContext) -> Result<Vec<Order>, FetchError> {
        let response = self
            .http
            .get(format!("{}/orders", self.server_url))
            .bearer_auth(session.token())
            .send()
            .await
            .map_err(GatewayError::from_reqwest)?;
        let response = ensure_success(response).await?;

        // The backend answers `null` when the agent has no orders yet.
        let entries: Option<Vec<SnapshotEntry>> = response
            .json()
            .await
            .map_err(|err| GatewayError::Decode(err.to_string()))?;
        let orders = dedupe_by_id(readable_orders(entries.unwrap_or_default()));
        debug!(count = orders.len(), "orders: fetched snapshot");
        Ok(orders)
    }

    async fn delete_order(
        &self,
        session: &SessionContext,
        id: &OrderId,
    ) -> Result<(), GatewayError> {
        let response = self
            .http
            .delete(format!("{}/delete-order/{}", self.server_url, id))
            .bearer_auth(session.token())
            .send()
            .await
            .map_err(GatewayError::from_reqwest)?;
        ensure_success(response).await?;
        info!(order_id = %id, "orders: deleted");
        Ok(())
    }

    async fn create_order(
        &self,
        session: &SessionContext,
        draft: &OrderDraft,
    ) -> Result<Order, GatewayError> {
        let response = self
            .http
            .post(format!("{}/create-order", self.server_url))
            .bearer_auth(session.token())
            .json(draft)
            .send()
            .await
            .map_err(GatewayError::from_reqwest)?;

        let status = response.status();
        if status == StatusCode::BAD_REQUEST || status == StatusCode::UNPROCESSABLE_ENTITY {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Validation {
                message: ApiMessage::from_body(&body)
                    .unwrap_or_else(|| VALIDATION_FALLBACK.to_string()),
            });
        }

        let order: Order = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|err| GatewayError::Decode(err.to_string()))?;
        info!(order_id = %order.id, "orders: created");
        Ok(order)
    }
}

async fn ensure_success(response: Response) -> Result<Response, GatewayError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(GatewayError::Http {
        status: status.as_u16(),
        message: ApiMessage::from_body(&body),
    })
}

/// One element of the `/orders` array. A record that does not decode as an
/// [`Order`] is skipped instead of failing the whole snapshot.
#[derive(Deserialize)]
#[serde(untagged)]
enum SnapshotEntry {
    Order(Order),
    Unreadable(IgnoredAny),
}

fn readable_orders(entries: Vec<SnapshotEntry>) -> Vec<Order> {
    let total = entries.len();
    let orders: Vec<Order> = entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match entry {
            SnapshotEntry::Order(order) => Some(order),
            SnapshotEntry::Unreadable(_) => {
                warn!(index, "orders: skipping unreadable record");
                None
            }
        })
        .collect();
    if orders.len() != total {
        warn!(
            dropped = total - orders.len(),
            "orders: snapshot contained unreadable records"
        );
    }
    orders
}

/// Keeps the first record for each identifier.
fn dedupe_by_id(orders: Vec<Order>) -> Vec<Order> {
    let mut seen = HashSet::with_capacity(orders.len());
    let total = orders.len();
    let unique: Vec<Order> = orders
        .into_iter()
        .filter(|order| seen.insert(order.id.clone()))
        .collect();
    if unique.len() != total {
        warn!(
            dropped = total - unique.len(),
            "orders: snapshot contained duplicate identifiers"
        );
    }
    unique
}

#[cfg(test)]
#[path = "tests/gateway_tests.rs"]
mod tests;
