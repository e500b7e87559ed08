//! Create and delete, each followed by a full authoritative refetch.

use std::sync::Arc;

use shared::domain::{Order, OrderDraft, OrderId};
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    controller::{BookingListController, FetchOutcome, Notice},
    gateway::GatewayError,
};

pub const DELETE_SUCCESS_NOTICE: &str = "Booking deleted successfully";
pub const DELETE_FAILURE_FALLBACK: &str = "Failed to delete booking";
pub const CREATE_FAILURE_FALLBACK: &str = "Failed to create booking";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MutationError {
    #[error("failed to delete order {id}: {source}")]
    Delete {
        id: OrderId,
        #[source]
        source: GatewayError,
    },
    #[error("failed to create order: {0}")]
    Create(#[source] GatewayError),
}

impl MutationError {
    /// Server-provided text when present, otherwise a generic failure line.
    pub fn user_message(&self) -> String {
        let (source, fallback) = match self {
            Self::Delete { source, .. } => (source, DELETE_FAILURE_FALLBACK),
            Self::Create(source) => (source, CREATE_FAILURE_FALLBACK),
        };
        source
            .server_message()
            .map(str::to_string)
            .unwrap_or_else(|| fallback.to_string())
    }

    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Create(GatewayError::Validation { .. })
                | Self::Delete {
                    source: GatewayError::Validation { .. },
                    ..
                }
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Created {
    pub order: Order,
    pub refetch: FetchOutcome,
}

pub struct MutationCoordinator {
    list: Arc<BookingListController>,
}

impl MutationCoordinator {
    pub fn new(list: Arc<BookingListController>) -> Self {
        Self { list }
    }

    /// On success the refetch starts only after the delete has resolved.
    /// On failure local state is left untouched and the user is notified.
    pub async fn delete(&self, id: &OrderId) -> Result<FetchOutcome, MutationError> {
        info!(order_id = %id, "deleting booking");
        match self
            .list
            .gateway()
            .delete_order(self.list.session(), id)
            .await
        {
            Ok(()) => {
                self.list.notify(Notice::success(DELETE_SUCCESS_NOTICE));
                Ok(self.list.refetch().await)
            }
            Err(source) => {
                let err = MutationError::Delete {
                    id: id.clone(),
                    source,
                };
                warn!(order_id = %id, error = %err, "delete rejected");
                self.list.notify(Notice::failure(err.user_message()));
                Err(err)
            }
        }
    }

    /// Submits the booking form. The creation surface closes only on success;
    /// failures are returned for the form to display.
    pub async fn create(&self, draft: &OrderDraft) -> Result<Created, MutationError> {
        let order = self
            .list
            .gateway()
            .create_order(self.list.session(), draft)
            .await
            .map_err(|source| {
                warn!(error = %source, "create rejected; keeping form open");
                MutationError::Create(source)
            })?;

        info!(order_id = %order.id, "booking created");
        self.list.close_create().await;
        let refetch = self.list.refetch().await;
        Ok(Created { order, refetch })
    }
}

#[cfg(test)]
#[path = "tests/mutations_tests.rs"]
mod tests;
