use std::time::Instant;
use std::{
    future::Future,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

/// Metric names recorded for a transaction. Generated by the `#[transaction]` macro.
#[derive(Copy, Clone, Debug)]
pub struct TransactionLabels {
    pub success: &'static str,
    pub error: &'static str,
    pub latency: &'static str,
}

/// Transaction hook used by the `#[transaction]` macro. Not intended to be used manually.
pub async fn transaction_hook<T, R, E>(labels: TransactionLabels, func: T) -> T::Output
where
    T: Future<Output = Result<R, E>>,
{
    if let Ok(hook) = TRANSACTION_HOOK.try_with(|v| v.clone()) {
        let start = Instant::now();
        let res = func.await;
        let elapsed = start.elapsed();

        #[cfg(feature = "metrics")]
        {
            metrics::describe_histogram!(labels.latency, metrics::Unit::Seconds, "");
            metrics::histogram!(labels.latency).record(elapsed.as_secs_f64());
        }
        #[cfg(not(feature = "metrics"))]
        let _ = (labels, elapsed);

        if res.is_ok() {
            hook.success.fetch_add(1, Ordering::Relaxed);
            #[cfg(feature = "metrics")]
            metrics::counter!(labels.success).increment(1);
        } else {
            hook.error.fetch_add(1, Ordering::Relaxed);
            #[cfg(feature = "metrics")]
            metrics::counter!(labels.error).increment(1);
        }

        res
    } else {
        tracing::warn!("No hook available.");
        func.await
    }
}

#[derive(Clone, Default)]
pub(crate) struct TransactionData {
    pub success: Arc<AtomicU64>,
    pub error: Arc<AtomicU64>,
}

impl TransactionData {
    pub fn success(&self) -> u64 {
        self.success.load(Ordering::Relaxed)
    }

    pub fn error(&self) -> u64 {
        self.error.load(Ordering::Relaxed)
    }
}

tokio::task_local! {
    pub(crate) static TRANSACTION_HOOK: TransactionData;
}
