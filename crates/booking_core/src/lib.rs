//! Booking list synchronization for the delivery agent's cake-booking screen.

pub mod controller;
pub mod date_filter;
pub mod empty_state_timer;
pub mod gateway;
pub mod mutations;
pub mod settings;

pub use controller::{
    BookingListController, FetchOutcome, ListEvent, ListOptions, ListPhase, LoadingGate, Notice,
    NoticeKind, ViewState,
};
pub use date_filter::filter_by_date;
pub use empty_state_timer::{EmptyStateTimer, TimerPhase, DEFAULT_EMPTY_STATE_DELAY};
pub use gateway::{FetchError, GatewayError, HttpOrderGateway, OrderGateway};
pub use mutations::{Created, MutationCoordinator, MutationError};
pub use settings::{load_settings, ClientSettings, SettingsError};

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;
