//! Background jobs that run on a fixed interval alongside the server

mod renew_watch;
pub use renew_watch::{RenewGmailWatch, renew_gmail_watch};

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::api::AppState;

#[async_trait]
pub trait PeriodicJob: Send + Sync + 'static {
    fn interval(&self) -> Duration;

    async fn run_job(&self, state: &AppState);
}

/// Spawn a job in its own tokio task. The first run happens
/// immediately, then once per `interval`.
pub fn spawn_periodic_job<J: PeriodicJob>(state: Arc<AppState>, job: J) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(job.interval());
        loop {
            interval.tick().await;
            job.run_job(&state).await;
        }
    });
}
