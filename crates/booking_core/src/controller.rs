//! Booking list synchronization: fetch lifecycle, date filtering and the
//! loading / empty-state gating for one mounted list screen.

use std::{
    sync::{Arc, Weak},
    time::Duration,
};

use chrono::NaiveDate;
use serde::Deserialize;
use shared::{
    dates::format_order_date,
    domain::{Order, OrderSummary},
    session::SessionContext,
};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

use crate::{
    date_filter::filter_by_date,
    empty_state_timer::{EmptyStateTimer, TimerPhase, DEFAULT_EMPTY_STATE_DELAY},
    gateway::{FetchError, OrderGateway},
};

/// What clears the loading placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadingGate {
    /// Loading clears when the empty-state countdown expires; the countdown
    /// restarts on every recomputation of the filtered list.
    #[default]
    Timer,
    /// Loading clears once the first fetch settles and the empty state
    /// follows the filtered list immediately.
    FetchSettled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListOptions {
    pub empty_state_delay: Duration,
    pub loading_gate: LoadingGate,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            empty_state_delay: DEFAULT_EMPTY_STATE_DELAY,
            loading_gate: LoadingGate::Timer,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListPhase {
    /// Blocking placeholder; neither list nor empty message is shown.
    Loading,
    ReadyWithData,
    ReadyEmpty,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub orders: Vec<Order>,
    pub filtered_orders: Vec<Order>,
    pub selected_date: NaiveDate,
    pub is_loading: bool,
    pub is_refreshing: bool,
    pub show_empty: bool,
    pub is_create_open: bool,
    pub last_fetch_error: Option<FetchError>,
}

impl ViewState {
    fn initial(selected_date: NaiveDate) -> Self {
        Self {
            orders: Vec::new(),
            filtered_orders: Vec::new(),
            selected_date,
            is_loading: true,
            is_refreshing: false,
            show_empty: false,
            is_create_open: false,
            last_fetch_error: None,
        }
    }

    pub fn phase(&self) -> ListPhase {
        if self.is_loading {
            ListPhase::Loading
        } else if self.show_empty && self.filtered_orders.is_empty() {
            ListPhase::ReadyEmpty
        } else {
            ListPhase::ReadyWithData
        }
    }

    /// False while the placeholder is up, and while an empty filtered list
    /// still waits for the countdown to raise the empty message.
    pub fn is_settled(&self) -> bool {
        !self.is_loading && (self.show_empty || !self.filtered_orders.is_empty())
    }

    pub fn summary(&self) -> OrderSummary {
        OrderSummary::of(&self.filtered_orders)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Failure,
}

/// A message the user must acknowledge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Failure,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum ListEvent {
    ViewChanged(ViewState),
    Notice(Notice),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied { count: usize },
    /// A newer fetch was started before this one resolved; its result was discarded.
    Superseded,
    /// The previous orders are kept.
    Failed(FetchError),
    /// The controller was disposed; nothing was applied.
    Detached,
}

struct ListState {
    view: ViewState,
    latest_generation: u64,
    refreshes_in_flight: usize,
    timer: EmptyStateTimer,
    timer_epoch: u64,
    disposed: bool,
}

pub struct BookingListController {
    gateway: Arc<dyn OrderGateway>,
    session: SessionContext,
    loading_gate: LoadingGate,
    inner: Mutex<ListState>,
    events: broadcast::Sender<ListEvent>,
}

impl BookingListController {
    pub fn new(
        gateway: Arc<dyn OrderGateway>,
        session: SessionContext,
        options: ListOptions,
        today: NaiveDate,
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(256);
        Arc::new(Self {
            gateway,
            session,
            loading_gate: options.loading_gate,
            inner: Mutex::new(ListState {
                view: ViewState::initial(today),
                latest_generation: 0,
                refreshes_in_flight: 0,
                timer: EmptyStateTimer::new(options.empty_state_delay),
                timer_epoch: 0,
                disposed: false,
            }),
            events,
        })
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub(crate) fn gateway(&self) -> &Arc<dyn OrderGateway> {
        &self.gateway
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ListEvent> {
        self.events.subscribe()
    }

    pub async fn view(&self) -> ViewState {
        self.inner.lock().await.view.clone()
    }

    pub async fn empty_state_timer_phase(&self) -> TimerPhase {
        self.inner.lock().await.timer.phase()
    }

    /// Computes the initial (empty) filtered list, then performs the first fetch.
    pub async fn mount(self: &Arc<Self>) -> FetchOutcome {
        {
            let mut guard = self.inner.lock().await;
            if guard.disposed {
                return FetchOutcome::Detached;
            }
            info!(
                agent = %self.session.user_id(),
                date = %format_order_date(guard.view.selected_date),
                "booking list mounted"
            );
            self.recompute(&mut guard);
            self.publish(&guard);
        }
        self.refetch().await
    }

    /// Replaces the order snapshot with a fresh one from the gateway. Only
    /// the most recently started fetch may apply its result.
    pub async fn refetch(self: &Arc<Self>) -> FetchOutcome {
        let generation = {
            let mut guard = self.inner.lock().await;
            if guard.disposed {
                return FetchOutcome::Detached;
            }
            guard.latest_generation += 1;
            guard.latest_generation
        };

        let result = self.gateway.fetch_all(&self.session).await;

        let mut guard = self.inner.lock().await;
        if guard.disposed {
            debug!(generation, "fetch resolved after dispose; ignoring");
            return FetchOutcome::Detached;
        }
        if generation != guard.latest_generation {
            debug!(
                generation,
                latest = guard.latest_generation,
                "fetch superseded by a newer request; discarding"
            );
            return FetchOutcome::Superseded;
        }

        let outcome = match result {
            Ok(orders) => {
                let count = orders.len();
                guard.view.orders = orders;
                guard.view.last_fetch_error = None;
                FetchOutcome::Applied { count }
            }
            Err(err) => {
                warn!(generation, error = %err, "failed to fetch orders; keeping previous list");
                guard.view.last_fetch_error = Some(err.clone());
                FetchOutcome::Failed(err)
            }
        };

        if self.loading_gate == LoadingGate::FetchSettled {
            guard.view.is_loading = false;
        }
        if matches!(outcome, FetchOutcome::Applied { .. }) {
            self.recompute(&mut guard);
        } else {
            self.sync_settled_empty_flag(&mut guard);
        }
        self.publish(&guard);
        outcome
    }

    /// Pull-to-refresh. The refreshing flag stays up while any refresh is
    /// in flight and drops whether the fetch succeeded or not.
    pub async fn refresh(self: &Arc<Self>) -> FetchOutcome {
        {
            let mut guard = self.inner.lock().await;
            if guard.disposed {
                return FetchOutcome::Detached;
            }
            guard.refreshes_in_flight += 1;
            guard.view.is_refreshing = true;
            self.publish(&guard);
        }

        let outcome = self.refetch().await;

        let mut guard = self.inner.lock().await;
        if !guard.disposed {
            guard.refreshes_in_flight = guard.refreshes_in_flight.saturating_sub(1);
            guard.view.is_refreshing = guard.refreshes_in_flight > 0;
            self.publish(&guard);
        }
        outcome
    }

    pub async fn select_date(self: &Arc<Self>, date: NaiveDate) {
        let mut guard = self.inner.lock().await;
        if guard.disposed {
            return;
        }
        debug!(date = %format_order_date(date), "selected date changed");
        guard.view.selected_date = date;
        self.recompute(&mut guard);
        self.publish(&guard);
    }

    pub async fn open_create(&self) {
        self.set_create_open(true).await;
    }

    pub async fn close_create(&self) {
        self.set_create_open(false).await;
    }

    /// Tears the screen down: cancels the countdown and turns any later
    /// fetch completion or expiry into a no-op.
    pub async fn dispose(&self) {
        let mut guard = self.inner.lock().await;
        if guard.disposed {
            return;
        }
        guard.disposed = true;
        guard.timer.cancel();
        info!("booking list disposed");
    }

    pub(crate) fn notify(&self, notice: Notice) {
        let _ = self.events.send(ListEvent::Notice(notice));
    }

    async fn set_create_open(&self, open: bool) {
        let mut guard = self.inner.lock().await;
        if guard.disposed || guard.view.is_create_open == open {
            return;
        }
        guard.view.is_create_open = open;
        self.publish(&guard);
    }

    fn recompute(self: &Arc<Self>, state: &mut ListState) {
        let was_empty = state.view.filtered_orders.is_empty();
        state.view.filtered_orders = filter_by_date(&state.view.orders, state.view.selected_date);
        match self.loading_gate {
            LoadingGate::Timer => {
                // Only an expiry may raise the flag. A date that stays empty
                // keeps it, anything else drops it at once.
                if !(was_empty && state.view.filtered_orders.is_empty()) {
                    state.view.show_empty = false;
                }
                self.arm_empty_state_timer(state);
            }
            LoadingGate::FetchSettled => self.sync_settled_empty_flag(state),
        }
    }

    fn sync_settled_empty_flag(&self, state: &mut ListState) {
        if self.loading_gate == LoadingGate::FetchSettled {
            state.view.show_empty = !state.view.is_loading && state.view.filtered_orders.is_empty();
        }
    }

    fn arm_empty_state_timer(self: &Arc<Self>, state: &mut ListState) {
        state.timer_epoch += 1;
        let epoch = state.timer_epoch;
        let controller: Weak<Self> = Arc::downgrade(self);
        state.timer.arm(async move {
            if let Some(controller) = controller.upgrade() {
                controller.on_empty_state_timer(epoch).await;
            }
        });
    }

    async fn on_empty_state_timer(&self, epoch: u64) {
        let mut guard = self.inner.lock().await;
        if guard.disposed || guard.timer_epoch != epoch {
            return;
        }
        guard.view.is_loading = false;
        guard.view.show_empty = guard.view.filtered_orders.is_empty();
        debug!(
            show_empty = guard.view.show_empty,
            filtered = guard.view.filtered_orders.len(),
            "empty-state countdown expired"
        );
        self.publish(&guard);
    }

    fn publish(&self, state: &ListState) {
        let _ = self
            .events
            .send(ListEvent::ViewChanged(state.view.clone()));
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
