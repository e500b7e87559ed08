//! One-shot countdown that gates the "no orders" state.

use std::{future::Future, time::Duration};

use tokio::task::JoinHandle;

pub const DEFAULT_EMPTY_STATE_DELAY: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerPhase {
    Idle,
    Armed,
    Expired,
}

/// At most one countdown is pending at a time: arming again aborts the
/// previous one before the new one starts.
#[derive(Debug)]
pub struct EmptyStateTimer {
    delay: Duration,
    pending: Option<JoinHandle<()>>,
}

impl EmptyStateTimer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Must be called from within a tokio runtime.
    pub fn arm<F>(&mut self, on_expire: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            on_expire.await;
        }));
    }

    /// Returns true when a countdown was still pending.
    pub fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some(handle) => {
                let was_pending = !handle.is_finished();
                handle.abort();
                was_pending
            }
            None => false,
        }
    }

    pub fn phase(&self) -> TimerPhase {
        match &self.pending {
            None => TimerPhase::Idle,
            Some(handle) if handle.is_finished() => TimerPhase::Expired,
            Some(_) => TimerPhase::Armed,
        }
    }
}

impl Default for EmptyStateTimer {
    fn default() -> Self {
        Self::new(DEFAULT_EMPTY_STATE_DELAY)
    }
}

impl Drop for EmptyStateTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
