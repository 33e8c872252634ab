use crate::error::RequestError;
use crate::http::Requester;
use crate::performance::metrics::WorkerStats;
use crate::performance::stop::StopCoordinator;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

/// What every worker shares: the time budget, the stop flag and the target.
#[derive(Clone)]
pub struct WorkerContext {
    pub requester: Arc<dyn Requester>,
    pub stop: StopCoordinator,
    pub session_start: Instant,
    pub duration: Duration,
    pub timeout: Duration,
}

/// Runs one worker to completion and hands its snapshot to the reducer.
///
/// A panicking worker reports an empty snapshot so the reducer still hears
/// from every worker.
pub async fn run_worker(worker_id: usize, ctx: WorkerContext, tx: mpsc::Sender<WorkerStats>) {
    let stats = match AssertUnwindSafe(worker_loop(worker_id, &ctx))
        .catch_unwind()
        .await
    {
        Ok(stats) => stats,
        Err(_) => {
            warn!(worker_id, "worker panicked, reporting an empty snapshot");
            WorkerStats::new()
        }
    };

    if tx.send(stats).await.is_err() {
        warn!(worker_id, "stats reducer gone before worker reported");
    }
}

pub async fn worker_loop(worker_id: usize, ctx: &WorkerContext) -> WorkerStats {
    let mut stats = WorkerStats::new();
    debug!(worker_id, "worker started");

    // The exit check runs before each attempt; an attempt in flight always completes.
    while ctx.session_start.elapsed() < ctx.duration && !ctx.stop.is_stopped() {
        let started = Instant::now();
        let result = match tokio::time::timeout(ctx.timeout, ctx.requester.send()).await {
            Ok(result) => result,
            Err(_) => Err(RequestError::Timeout(ctx.timeout)),
        };

        match result {
            Ok(exchange) => stats.record_success(started.elapsed(), exchange.bytes),
            Err(err) => {
                trace!(worker_id, error = %err, "request failed");
                stats.record_error();
            }
        }

        tokio::task::yield_now().await;
    }

    debug!(
        worker_id,
        requests = stats.request_count,
        errors = stats.error_count,
        "worker finished"
    );
    stats
}
