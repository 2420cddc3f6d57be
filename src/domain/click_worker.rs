//! Background worker persisting queued click events.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Semaphore, mpsc};
use tokio_retry::RetryIf;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{debug, error, info, warn};

use crate::domain::click_event::ClickEvent;
use crate::domain::repositories::ClickRepository;
use crate::error::AppError;

/// Retries after the first failed write.
const MAX_RETRIES: usize = 3;

/// Consumes click events until every sender is dropped.
///
/// Up to `concurrency` writes run at once. Each write is retried with
/// exponential backoff while the store reports a retryable failure. Events
/// that still fail are logged and counted in
/// `snaplink_click_write_failures_total`; they never reach the redirect path.
///
/// Returns after the channel closes and all in-flight writes have finished.
pub async fn run_click_worker<C>(
    mut rx: mpsc::Receiver<ClickEvent>,
    click_repository: Arc<C>,
    concurrency: usize,
) where
    C: ClickRepository + 'static,
{
    let concurrency = concurrency.max(1);
    let semaphore = Arc::new(Semaphore::new(concurrency));

    while let Some(event) = rx.recv().await {
        let Ok(permit) = semaphore.clone().acquire_owned().await else {
            break;
        };

        let repository = click_repository.clone();
        tokio::spawn(async move {
            let _permit = permit;
            persist_click(repository.as_ref(), event).await;
        });
    }

    let in_flight = u32::try_from(concurrency).unwrap_or(u32::MAX);
    if semaphore.acquire_many(in_flight).await.is_err() {
        warn!("Click worker semaphore closed before draining");
    }

    info!("Click worker stopped");
}

async fn persist_click<C: ClickRepository + ?Sized>(repository: &C, event: ClickEvent) {
    let new_click = event.into_new_click();
    let code = new_click.short_code.clone();
    let strategy = ExponentialBackoff::from_millis(10)
        .max_delay(Duration::from_secs(1))
        .map(jitter)
        .take(MAX_RETRIES);

    // Every attempt writes the same click, so a write that committed after
    // reporting a failure is found again instead of duplicated.
    let result = RetryIf::spawn(
        strategy,
        || {
            let new_click = new_click.clone();
            async move { repository.record_click(new_click).await }
        },
        AppError::is_retryable,
    )
    .await;

    match result {
        Ok(click) => {
            metrics::counter!("snaplink_clicks_recorded_total").increment(1);
            debug!(code = %click.short_code, timestamp = %click.timestamp, "Click recorded");
        }
        Err(e) => {
            metrics::counter!("snaplink_click_write_failures_total").increment(1);
            error!(code = %code, error = %e, "Failed to record click");
        }
    }
}
