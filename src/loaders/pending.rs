use anyhow::{anyhow, Context, Result};
use futures::channel::oneshot;
use std::task::Poll;
use std::thread;

/// Result of a loader running on a worker thread
///
/// Poll it once per frame; dropping it abandons the result.
pub struct PendingLoad<T> {
    label: String,
    receiver: oneshot::Receiver<Result<T>>,
}

impl<T: Send + 'static> PendingLoad<T> {
    /// Run `load` on its own thread
    pub fn spawn<F>(label: impl Into<String>, load: F) -> Result<Self>
    where
        F: FnOnce() -> Result<T> + Send + 'static,
    {
        let label = label.into();
        let (sender, receiver) = oneshot::channel();

        thread::Builder::new()
            .name(format!("load {}", label))
            .spawn(move || {
                // The receiver may be gone if the view was torn down mid-load
                let _ = sender.send(load());
            })
            .context(format!("Failed to spawn loader thread for {}", label))?;

        Ok(Self { label, receiver })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Check for the result without blocking
    pub fn poll(&mut self) -> Poll<Result<T>> {
        match self.receiver.try_recv() {
            Ok(Some(result)) => Poll::Ready(result),
            Ok(None) => Poll::Pending,
            Err(oneshot::Canceled) => Poll::Ready(Err(anyhow!(
                "loader for {} stopped without a result",
                self.label
            ))),
        }
    }
}
