use std::time::Duration;

/// Starting value for minimum latency. Any real exchange replaces it.
pub const MIN_LATENCY_SENTINEL: Duration = Duration::MAX;

/// Counters owned by a single worker for the length of its loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerStats {
    pub request_count: u64,
    pub error_count: u64,
    pub total_bytes: u64,
    /// Sum over successful attempts only.
    pub total_latency: Duration,
    pub min_latency: Duration,
    pub max_latency: Duration,
}

impl Default for WorkerStats {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkerStats {
    pub fn new() -> Self {
        Self {
            request_count: 0,
            error_count: 0,
            total_bytes: 0,
            total_latency: Duration::ZERO,
            min_latency: MIN_LATENCY_SENTINEL,
            max_latency: Duration::ZERO,
        }
    }

    pub fn record_success(&mut self, latency: Duration, bytes: u64) {
        self.request_count += 1;
        self.total_bytes += bytes;
        self.total_latency += latency;
        self.min_latency = self.min_latency.min(latency);
        self.max_latency = self.max_latency.max(latency);
    }

    pub fn record_error(&mut self) {
        self.request_count += 1;
        self.error_count += 1;
    }

    pub fn successes(&self) -> u64 {
        self.request_count.saturating_sub(self.error_count)
    }
}

/// Running totals across every worker snapshot received so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateStats {
    pub request_count: u64,
    pub error_count: u64,
    pub total_bytes: u64,
    pub total_latency: Duration,
    pub min_latency: Duration,
    pub max_latency: Duration,
    pub responders: usize,
}

impl Default for AggregateStats {
    fn default() -> Self {
        Self::new()
    }
}

impl AggregateStats {
    pub fn new() -> Self {
        Self {
            request_count: 0,
            error_count: 0,
            total_bytes: 0,
            total_latency: Duration::ZERO,
            min_latency: MIN_LATENCY_SENTINEL,
            max_latency: Duration::ZERO,
            responders: 0,
        }
    }

    /// Folds one worker snapshot in. Order of merges does not affect the result.
    pub fn merge(&mut self, stats: &WorkerStats) {
        self.request_count += stats.request_count;
        self.error_count += stats.error_count;
        self.total_bytes += stats.total_bytes;
        self.total_latency += stats.total_latency;
        self.min_latency = self.min_latency.min(stats.min_latency);
        self.max_latency = self.max_latency.max(stats.max_latency);
        self.responders += 1;
    }

    pub fn successes(&self) -> u64 {
        self.request_count.saturating_sub(self.error_count)
    }

    /// Derived metrics, or [`Outcome::NoStatistics`] when no attempt succeeded.
    pub fn summarize(&self) -> Outcome {
        if self.request_count == 0
            || self.successes() == 0
            || self.responders == 0
            || self.min_latency == MIN_LATENCY_SENTINEL
        {
            return Outcome::NoStatistics {
                attempts: self.request_count,
                errors: self.error_count,
            };
        }

        let avg_thread_duration = divide(self.total_latency, self.responders as u128);
        let avg_request_time = divide(self.total_latency, self.request_count as u128);

        Outcome::Summary(LoadSummary {
            total_requests: self.request_count,
            errors: self.error_count,
            total_bytes: self.total_bytes,
            avg_thread_duration,
            requests_per_second: per_second(self.request_count as f64, avg_thread_duration),
            bytes_per_second: per_second(self.total_bytes as f64, avg_thread_duration),
            avg_request_time,
            min_latency: self.min_latency,
            max_latency: self.max_latency,
        })
    }
}

fn divide(total: Duration, by: u128) -> Duration {
    Duration::from_nanos((total.as_nanos() / by) as u64)
}

fn per_second(amount: f64, over: Duration) -> f64 {
    if over.is_zero() {
        0.0
    } else {
        amount / over.as_secs_f64()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadSummary {
    pub total_requests: u64,
    pub errors: u64,
    pub total_bytes: u64,
    /// Summed latency divided by the number of workers.
    pub avg_thread_duration: Duration,
    pub requests_per_second: f64,
    pub bytes_per_second: f64,
    pub avg_request_time: Duration,
    pub min_latency: Duration,
    pub max_latency: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Summary(LoadSummary),
    NoStatistics { attempts: u64, errors: u64 },
}
