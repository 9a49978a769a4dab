use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// How a timed wait ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerOutcome {
    Elapsed,
    Cancelled,
}

/// Cancels whichever wait a [`CancellableTimer`] is currently in, or the
/// next one if the owner has not called [`CancellableTimer::reset`] since.
#[derive(Debug, Clone)]
pub struct TimerCanceller {
    generation: Arc<watch::Sender<u64>>,
}

impl TimerCanceller {
    pub fn cancel(&self) {
        self.generation.send_modify(|g| *g = g.wrapping_add(1));
        tracing::debug!("Timer cancellation requested");
    }
}

/// Delay primitive used for the splash, countdown and processing stages.
#[derive(Debug)]
pub struct CancellableTimer {
    generation: watch::Receiver<u64>,
}

/// Create a timer and the handle that cancels it.
pub fn cancellable_timer() -> (TimerCanceller, CancellableTimer) {
    let (tx, rx) = watch::channel(0u64);
    (
        TimerCanceller {
            generation: Arc::new(tx),
        },
        CancellableTimer { generation: rx },
    )
}

impl CancellableTimer {
    /// Forget every cancellation issued so far.
    ///
    /// Call this before publishing the state that makes a wait visible, so a
    /// cancel sent in reaction to that state is not lost.
    pub fn reset(&mut self) {
        drop(self.generation.borrow_and_update());
    }

    /// Wait for `duration` unless cancelled first.
    pub async fn sleep(&mut self, duration: Duration) -> TimerOutcome {
        let sleep = tokio::time::sleep(duration);
        tokio::pin!(sleep);

        tokio::select! {
            _ = &mut sleep => TimerOutcome::Elapsed,
            changed = self.generation.changed() => match changed {
                Ok(()) => TimerOutcome::Cancelled,
                Err(_) => {
                    // Every canceller is gone; nothing can interrupt us now.
                    (&mut sleep).await;
                    TimerOutcome::Elapsed
                }
            },
        }
    }

    /// Count down from `from` to 1, calling `on_tick` with each value before
    /// waiting one `interval`.
    pub async fn countdown<F>(&mut self, from: u32, interval: Duration, mut on_tick: F) -> TimerOutcome
    where
        F: FnMut(u32),
    {
        self.reset();
        for remaining in (1..=from).rev() {
            on_tick(remaining);
            if self.sleep(interval).await == TimerOutcome::Cancelled {
                return TimerOutcome::Cancelled;
            }
        }
        TimerOutcome::Elapsed
    }
}
