use std::{future::Future, sync::Arc};

use tokio::sync::watch;

use crate::error::{ClientError, ClientResult};

/// Cooperative cancellation signal shared between a caller and one request.
///
/// Clones observe the same signal. Once cancelled a token stays cancelled.
#[derive(Debug, Clone)]
pub struct CancelToken {
    state: Arc<watch::Sender<bool>>,
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelToken {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            state: Arc::new(tx),
        }
    }

    pub fn cancel(&self) {
        self.state.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.state.borrow()
    }

    /// Resolves once the token is cancelled.
    pub async fn cancelled(&self) {
        let mut rx = self.state.subscribe();
        // The sender lives in `self`, so `wait_for` cannot observe a closed channel.
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }

    /// Drives `work` unless the token fires first, in which case the work is dropped.
    pub async fn run<T, F>(&self, work: F) -> ClientResult<T>
    where
        F: Future<Output = ClientResult<T>>,
    {
        if self.is_cancelled() {
            return Err(ClientError::Cancelled);
        }
        tokio::select! {
            biased;
            _ = self.cancelled() => Err(ClientError::Cancelled),
            result = work => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn cancelled_token_short_circuits_work() {
        let token = CancelToken::new();
        token.cancel();

        let result = token.run(async { Ok::<_, ClientError>(1) }).await;
        assert!(matches!(result, Err(ClientError::Cancelled)));
    }

    #[tokio::test]
    async fn cancel_interrupts_pending_work() {
        let token = CancelToken::new();
        let canceller = token.clone();

        let pending = token.run(async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok::<_, ClientError>(())
        });
        let (result, ()) = tokio::join!(pending, async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            canceller.cancel();
        });

        assert!(matches!(result, Err(ClientError::Cancelled)));
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn untouched_token_lets_work_finish() {
        let token = CancelToken::new();
        let result = token.run(async { Ok::<_, ClientError>("done") }).await;
        assert_eq!(result.expect("work should complete"), "done");
    }
}
