use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Tracks the client's background tasks so shutdown can wait for them.
#[derive(Default)]
pub struct TaskManager {
    handles: Vec<JoinHandle<()>>,
}

impl TaskManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn<F>(&mut self, future: F)
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        self.handles.push(tokio::spawn(future));
    }

    /// Waits up to `grace` for every tracked task to finish, then aborts
    /// whatever is still running. Panics are logged, not propagated.
    pub async fn shutdown(&mut self, grace: Duration) {
        let deadline = Instant::now() + grace;

        for mut handle in std::mem::take(&mut self.handles) {
            match tokio::time::timeout_at(deadline, &mut handle).await {
                Ok(Err(e)) if e.is_panic() => {
                    tracing::error!("Background task panicked: {}", e);
                }
                Ok(_) => {}
                Err(_) => {
                    tracing::warn!("Background task still running after {:?}, aborting", grace);
                    handle.abort();
                }
            }
        }
    }
}
