//! Persistence of check-in visits.
//!
//! Handlers depend only on [`VisitRecorder`]; the composition root decides
//! what sits behind it. Anything with an `insert(id, place_id)` operation
//! qualifies, including a plain async closure.

pub mod sqlite;

use std::future::Future;

use async_trait::async_trait;
use thiserror::Error;

pub use sqlite::SqliteVisitStore;

/// Error returned by a persistence backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Records a visit of user `id` at `place_id`.
///
/// Called at most once per request. Implementations own their own retry and
/// locking policy; callers never retry.
#[async_trait]
pub trait VisitRecorder: Send + Sync {
    async fn insert(&self, id: i64, place_id: i64) -> Result<(), StoreError>;
}

#[async_trait]
impl<F, Fut> VisitRecorder for F
where
    F: Fn(i64, i64) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), StoreError>> + Send + 'static,
{
    async fn insert(&self, id: i64, place_id: i64) -> Result<(), StoreError> {
        (self)(id, place_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_closure_is_a_recorder() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let recorder: Arc<dyn VisitRecorder> = Arc::new(move |id: i64, place_id: i64| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                if id == place_id {
                    Err(StoreError::Unavailable("same id".into()))
                } else {
                    Ok(())
                }
            }
        });

        assert!(recorder.insert(1, 42).await.is_ok());
        assert!(recorder.insert(7, 7).await.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
