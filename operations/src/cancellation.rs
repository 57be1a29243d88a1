use {
    std::{pin::Pin, sync::Arc},
    tokio::sync::watch,
};

/// A sticky cancellation signal shared by every clone.
///
/// Once [`Cancellation::cancel`] is called, every current and future listener observes it.
#[derive(Debug, Clone)]
pub struct Cancellation {
    signal: Arc<watch::Sender<bool>>,
}

impl Default for Cancellation {
    fn default() -> Self {
        Self::new()
    }
}

impl Cancellation {
    pub fn new() -> Self {
        let (signal, _) = watch::channel(false);

        Self {
            signal: Arc::new(signal),
        }
    }

    /// Signals cancellation.
    pub fn cancel(&self) {
        self.signal.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.signal.borrow()
    }

    /// Resolves once cancellation has been signalled, immediately if it already was.
    pub fn listener(&self) -> Pin<Box<dyn Future<Output = ()> + Send + Sync>> {
        let mut rx = self.signal.subscribe();

        Box::pin(async move {
            rx.wait_for(|cancelled| *cancelled).await.ok();
        })
    }
}
