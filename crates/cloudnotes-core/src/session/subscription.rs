//! Cancellable handles for in-flight backend requests.

use std::future::Future;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use tokio::task::JoinHandle;

const PENDING: u8 = 0;
const CANCELLED: u8 = 1;
const COMPLETED: u8 = 2;

/// Shared flag deciding, exactly once, whether a request was cancelled or
/// completed. Whichever of [`CancelToken::cancel`] and `complete` runs
/// first wins.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicU8>);

impl CancelToken {
    /// Returns `false` when the request had already completed.
    pub fn cancel(&self) -> bool {
        self.transition(CANCELLED)
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst) == CANCELLED
    }

    /// Claim the completion. Returns `false` when the request was cancelled.
    pub(crate) fn complete(&self) -> bool {
        self.transition(COMPLETED)
    }

    fn transition(&self, to: u8) -> bool {
        self.0
            .compare_exchange(PENDING, to, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }
}

/// Handle to one backend request and its completion.
///
/// Cancelling before completion suppresses the completion, including any
/// state change or callback it would have delivered. Cancelling afterwards
/// is a no-op. Dropping the handle detaches it; the request still runs.
#[derive(Debug)]
pub struct Subscription {
    token: CancelToken,
    pub(super) task: JoinHandle<()>,
}

impl Subscription {
    /// Spawn `body` on the runtime with a fresh cancel token.
    ///
    /// Must be called from within a tokio runtime.
    pub(crate) fn spawn<F, Fut>(body: F) -> Self
    where
        F: FnOnce(CancelToken) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let token = CancelToken::default();
        let task = tokio::spawn(body(token.clone()));
        Self { token, task }
    }

    pub fn cancel(&self) {
        if self.token.cancel() {
            self.task.abort();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Wait for the request task to end.
    ///
    /// The completion may still be queued for the UI loop when this
    /// returns; use `SessionOrchestrator::flush` to wait for it to be applied.
    pub async fn finished(self) {
        if let Err(error) = self.task.await {
            if !error.is_cancelled() {
                tracing::error!("Request task failed: {}", error);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::oneshot;

    use super::*;

    #[tokio::test]
    async fn cancel_before_completion_stops_task() {
        let (release_tx, release_rx) = oneshot::channel::<()>();
        let (done_tx, mut done_rx) = oneshot::channel::<()>();

        let subscription = Subscription::spawn(move |_token| async move {
            let _ = release_rx.await;
            let _ = done_tx.send(());
        });

        subscription.cancel();
        assert!(subscription.is_cancelled());
        let _ = release_tx.send(());
        subscription.finished().await;
        assert!(done_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn cancel_after_completion_is_noop() {
        let (done_tx, done_rx) = oneshot::channel();
        let subscription = Subscription::spawn(move |token| async move {
            let _ = done_tx.send(token.complete());
        });
        assert!(done_rx.await.unwrap());

        subscription.cancel();
        assert!(!subscription.is_cancelled());
        subscription.finished().await;
    }

    #[tokio::test]
    async fn cancelled_token_refuses_completion() {
        let (seen_tx, seen_rx) = oneshot::channel();
        let (go_tx, go_rx) = oneshot::channel::<()>();
        let subscription = Subscription::spawn(move |token| async move {
            let _ = go_rx.await;
            let _ = seen_tx.send(token.complete());
        });

        // Cancel the token only; the task observes it when it tries to complete.
        assert!(subscription.token.cancel());
        let _ = go_tx.send(());
        assert!(!seen_rx.await.unwrap());
        subscription.finished().await;
    }

    #[test]
    fn first_transition_wins() {
        let token = CancelToken::default();
        assert!(token.complete());
        assert!(!token.cancel());
        assert!(!token.is_cancelled());
    }
}
