use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::Instrument;

use crate::error::ProviderError;
use crate::trips::TripRecord;

/// Runs `query` once per trip with at most `concurrency` calls in flight.
///
/// Results come back in trip order regardless of completion order.
pub async fn dispatch_ordered<T, F, Fut>(
    trips: &[TripRecord],
    concurrency: usize,
    query: F,
) -> Vec<Result<T, ProviderError>>
where
    T: Send + 'static,
    F: Fn(TripRecord) -> Fut,
    Fut: Future<Output = Result<T, ProviderError>> + Send + 'static,
{
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut tasks = Vec::with_capacity(trips.len());

    for (index, trip) in trips.iter().enumerate() {
        let sem = semaphore.clone();
        let fut = query(trip.clone());
        let span = tracing::debug_span!("trip_query", index);

        tasks.push(tokio::spawn(
            async move {
                let Ok(_permit) = sem.acquire().await else {
                    return Err(ProviderError::query("dispatch", "semaphore closed"));
                };
                fut.await
            }
            .instrument(span),
        ));
    }

    let mut results = Vec::with_capacity(tasks.len());
    for task in tasks {
        results.push(task.await.unwrap_or_else(|e| {
            Err(ProviderError::query("dispatch", format!("query task failed: {e}")))
        }));
    }
    results
}
