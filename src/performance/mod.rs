pub mod metrics;
pub mod monitor;
pub mod runner;
pub mod stop;
pub mod worker;

pub use metrics::{AggregateStats, LoadSummary, Outcome, WorkerStats};
pub use runner::{interrupt_signal, LoadSession};
pub use stop::StopCoordinator;
