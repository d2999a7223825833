use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::trace;

/// Single-slot delayed trigger
///
/// Each [`schedule`](Self::schedule) call re-arms the trigger and cancels whatever
/// was armed before, so only the last call within the interval ever fires. A
/// generation counter backs up task abortion: a timer that already woke up still
/// checks that it is the latest arming before running its action.
pub struct DebounceScheduler {
    interval: Duration,
    generation: Arc<AtomicU64>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl DebounceScheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            generation: Arc::new(AtomicU64::new(0)),
            pending: Mutex::new(None),
        }
    }

    /// Quiet period before an armed action fires
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Arm `action` to run after the interval, replacing any pending action
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule<F>(&self, action: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let mut pending = self.pending.lock();
        let armed = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        if let Some(previous) = pending.take() {
            previous.abort();
        }

        let generation = Arc::clone(&self.generation);
        let interval = self.interval;
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(interval).await;
            if generation.load(Ordering::Acquire) != armed {
                trace!(armed, "Debounced trigger superseded");
                return;
            }
            action();
        }));
    }

    /// Drop any pending action without running it
    pub fn cancel(&self) {
        let mut pending = self.pending.lock();
        self.generation.fetch_add(1, Ordering::AcqRel);
        if let Some(previous) = pending.take() {
            previous.abort();
        }
    }

    /// Whether an armed action has neither fired nor been cancelled
    pub fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }
}

impl Drop for DebounceScheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counter() -> (Arc<AtomicUsize>, impl Fn() -> Box<dyn FnOnce() + Send>) {
        let fired = Arc::new(AtomicUsize::new(0));
        let handle = Arc::clone(&fired);
        (fired, move || {
            let fired = Arc::clone(&handle);
            Box::new(move || {
                fired.fetch_add(1, Ordering::SeqCst);
            })
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_only_last_schedule_fires() {
        let scheduler = DebounceScheduler::new(Duration::from_millis(300));
        let (fired, action) = counter();

        for _ in 0..5 {
            scheduler.schedule(action());
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert!(scheduler.is_pending());

        tokio::time::sleep(Duration::from_millis(250)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(!scheduler.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_prevents_firing() {
        let scheduler = DebounceScheduler::new(Duration::from_millis(300));
        let (fired, action) = counter();

        scheduler.schedule(action());
        tokio::time::sleep(Duration::from_millis(200)).await;
        scheduler.cancel();
        tokio::time::sleep(Duration::from_millis(500)).await;

        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert!(!scheduler.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_separate_quiet_periods_fire_separately() {
        let scheduler = DebounceScheduler::new(Duration::from_millis(300));
        let (fired, action) = counter();

        scheduler.schedule(action());
        tokio::time::sleep(Duration::from_millis(400)).await;
        scheduler.schedule(action());
        tokio::time::sleep(Duration::from_millis(400)).await;

        assert_eq!(fired.load(Ordering::SeqCst), 2);
    }
}
