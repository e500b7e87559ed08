//! In-memory order backend with call accounting for controller tests.

use std::{collections::VecDeque, time::Duration};

use async_trait::async_trait;
use chrono::NaiveDate;
use shared::{
    domain::{Order, OrderDraft, OrderId},
    session::SessionContext,
};
use tokio::sync::Mutex;

use crate::gateway::{FetchError, GatewayError, OrderGateway};

/// One scripted answer to `fetch_all`; unscripted calls return the current
/// server-side orders immediately.
pub(crate) struct ScriptedFetch {
    pub delay: Duration,
    pub result: Result<Vec<Order>, FetchError>,
}

#[derive(Default)]
pub(crate) struct FakeGateway {
    pub orders: Mutex<Vec<Order>>,
    pub script: Mutex<VecDeque<ScriptedFetch>>,
    pub fetch_calls: Mutex<usize>,
    pub delete_calls: Mutex<Vec<OrderId>>,
    pub create_calls: Mutex<Vec<OrderDraft>>,
    pub delete_error: Mutex<Option<GatewayError>>,
    pub create_error: Mutex<Option<GatewayError>>,
    /// Records the order of gateway calls, e.g. `["fetch", "delete:1", "fetch"]`.
    pub journal: Mutex<Vec<String>>,
}

impl FakeGateway {
    pub fn with_orders(orders: Vec<Order>) -> Self {
        Self {
            orders: Mutex::new(orders),
            ..Self::default()
        }
    }

    pub async fn push_fetch(&self, delay: Duration, result: Result<Vec<Order>, FetchError>) {
        self.script
            .lock()
            .await
            .push_back(ScriptedFetch { delay, result });
    }

    pub async fn fetch_count(&self) -> usize {
        *self.fetch_calls.lock().await
    }
}

#[async_trait]
impl OrderGateway for FakeGateway {
    async fn fetch_all(&self, _session: &SessionContext) -> Result<Vec<Order>, FetchError> {
        *self.fetch_calls.lock().await += 1;
        self.journal.lock().await.push("fetch".to_string());
        let scripted = self.script.lock().await.pop_front();
        match scripted {
            Some(ScriptedFetch { delay, result }) => {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                result
            }
            None => Ok(self.orders.lock().await.clone()),
        }
    }

    async fn delete_order(
        &self,
        _session: &SessionContext,
        id: &OrderId,
    ) -> Result<(), GatewayError> {
        self.delete_calls.lock().await.push(id.clone());
        self.journal.lock().await.push(format!("delete:{id}"));
        if let Some(err) = self.delete_error.lock().await.clone() {
            return Err(err);
        }
        let mut orders = self.orders.lock().await;
        let before = orders.len();
        orders.retain(|order| &order.id != id);
        if orders.len() == before {
            return Err(GatewayError::Http {
                status: 404,
                message: Some("Order not found".into()),
            });
        }
        Ok(())
    }

    async fn create_order(
        &self,
        _session: &SessionContext,
        draft: &OrderDraft,
    ) -> Result<Order, GatewayError> {
        self.create_calls.lock().await.push(draft.clone());
        self.journal.lock().await.push("create".to_string());
        if let Some(err) = self.create_error.lock().await.clone() {
            return Err(err);
        }
        let mut orders = self.orders.lock().await;
        let mut created = order(&format!("new-{}", orders.len() + 1), &draft.order_date);
        created.sender_name = draft.sender_name.clone();
        created.receiver_name = draft.receiver_name.clone();
        created.cake_name = draft.cake_name.clone();
        created.advance_payment = draft.advance_payment;
        created.balance_payment = draft.balance_payment;
        orders.push(created.clone());
        Ok(created)
    }
}

pub(crate) fn order(id: &str, order_date: &str) -> Order {
    serde_json::from_value(serde_json::json!({ "_id": id, "order_date": order_date }))
        .expect("order")
}

pub(crate) fn june(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, day).expect("date")
}

pub(crate) fn session() -> SessionContext {
    SessionContext::new("token", "agent-1", "Meena", "agent")
}

pub(crate) fn ids(orders: &[Order]) -> Vec<&str> {
    orders.iter().map(|order| order.id.as_str()).collect()
}
