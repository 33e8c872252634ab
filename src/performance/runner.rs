use crate::config::LoadConfig;
use crate::http::Requester;
use crate::performance::metrics::{AggregateStats, WorkerStats};
use crate::performance::stop::StopCoordinator;
use crate::performance::worker::{run_worker, WorkerContext};
use futures::stream::{Stream, StreamExt};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// A running load test: `concurrency` workers plus the channel they report on.
pub struct LoadSession {
    concurrency: usize,
    stop: StopCoordinator,
    snapshots: mpsc::Receiver<WorkerStats>,
    started: Instant,
}

impl LoadSession {
    /// Spawns one task per configured worker and returns without waiting.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(config: &LoadConfig, requester: Arc<dyn Requester>) -> Self {
        let (tx, snapshots) = mpsc::channel(config.concurrency);
        let stop = StopCoordinator::new();
        let started = Instant::now();

        let ctx = WorkerContext {
            requester,
            stop: stop.clone(),
            session_start: started,
            duration: config.duration,
            timeout: config.timeout,
        };

        for worker_id in 0..config.concurrency {
            tokio::spawn(run_worker(worker_id, ctx.clone(), tx.clone()));
        }

        info!(
            url = %config.url,
            method = %config.method,
            workers = config.concurrency,
            duration = ?config.duration,
            "load session started"
        );

        Self {
            concurrency: config.concurrency,
            stop,
            snapshots,
            started,
        }
    }

    pub fn stop_handle(&self) -> StopCoordinator {
        self.stop.clone()
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Reduces worker snapshots until every worker has reported once.
    ///
    /// Each item on `interrupts` requests a cooperative stop; the reduction
    /// keeps going until all workers have wound down and reported.
    pub async fn collect<S>(mut self, interrupts: S) -> AggregateStats
    where
        S: Stream<Item = ()> + Unpin,
    {
        let mut aggregate = AggregateStats::new();
        let mut interrupts = interrupts.fuse();
        let mut interrupts_open = true;

        while aggregate.responders < self.concurrency {
            tokio::select! {
                interrupt = interrupts.next(), if interrupts_open => match interrupt {
                    Some(()) => {
                        if self.stop.stop() {
                            info!(
                                pending = self.concurrency - aggregate.responders,
                                "stop requested, waiting for workers"
                            );
                        }
                    }
                    None => interrupts_open = false,
                },
                snapshot = self.snapshots.recv() => match snapshot {
                    Some(stats) => {
                        aggregate.merge(&stats);
                        debug!(
                            responders = aggregate.responders,
                            requests = stats.request_count,
                            "merged worker snapshot"
                        );
                    }
                    None => {
                        warn!(
                            responders = aggregate.responders,
                            expected = self.concurrency,
                            "workers exited without reporting"
                        );
                        break;
                    }
                },
            }
        }

        aggregate
    }
}

/// Process interrupts (Ctrl-C) as a stream of stop requests.
pub fn interrupt_signal() -> impl Stream<Item = ()> + Unpin {
    Box::pin(futures::stream::unfold((), |()| async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => Some(((), ())),
            Err(err) => {
                warn!(error = %err, "unable to listen for interrupt signal");
                None
            }
        }
    }))
}
