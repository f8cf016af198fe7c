//! One-shot cancellable timers
//!
//! Debounce windows, countdown ticks and the pre-speech delay all go through
//! [`Scheduler::schedule_once`]. A task whose [`CancelToken`] has been
//! cancelled never runs.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// Handle to a scheduled task
#[derive(Debug, Clone, Default)]
pub struct CancelToken(CancellationToken);

impl CancelToken {
    /// Prevent the task from running (idempotent)
    pub fn cancel(&self) {
        self.0.cancel();
    }

    /// Check if the task was cancelled
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.is_cancelled()
    }
}

/// Runs a task once after a delay
pub trait Scheduler: Send + Sync {
    /// Schedule `task` to run after `delay`
    fn schedule_once(&self, delay: Duration, task: Box<dyn FnOnce() + Send>) -> CancelToken;
}

/// Scheduler backed by the tokio timer wheel
///
/// Follows `tokio::time::pause`, so tests can drive it with a paused clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioScheduler;

impl Scheduler for TokioScheduler {
    fn schedule_once(&self, delay: Duration, task: Box<dyn FnOnce() + Send>) -> CancelToken {
        let token = CancellationToken::new();
        let guard = token.clone();

        tokio::spawn(async move {
            tokio::select! {
                biased;
                () = guard.cancelled() => {}
                () = tokio::time::sleep(delay) => {
                    if !guard.is_cancelled() {
                        task();
                    }
                }
            }
        });

        CancelToken(token)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn counter_task(counter: &Arc<AtomicUsize>) -> Box<dyn FnOnce() + Send> {
        let counter = Arc::clone(counter);
        Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_task_runs_after_delay() {
        let counter = Arc::new(AtomicUsize::new(0));
        let _token = TokioScheduler.schedule_once(Duration::from_millis(800), counter_task(&counter));

        tokio::time::sleep(Duration::from_millis(799)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_task_never_runs() {
        let counter = Arc::new(AtomicUsize::new(0));
        let token = TokioScheduler.schedule_once(Duration::from_millis(800), counter_task(&counter));

        tokio::time::sleep(Duration::from_millis(400)).await;
        token.cancel();
        assert!(token.is_cancelled());

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }
}
