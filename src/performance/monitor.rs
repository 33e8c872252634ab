use crate::performance::metrics::{LoadSummary, Outcome};
use crate::utils::{format_duration, ByteSize};
use owo_colors::OwoColorize;
use std::fmt::Write;
use std::time::Duration;

pub const NO_STATISTICS_MESSAGE: &str = "No statistics collected / no requests found";

/// Prints the final report for a finished session.
pub fn print_outcome(outcome: &Outcome, wall_clock: Duration) {
    println!();
    match outcome {
        Outcome::Summary(summary) => {
            print!("{}", render_summary(summary, wall_clock));
            if summary.errors > 0 {
                println!(
                    "{} {} of {} requests failed",
                    "⚠".yellow(),
                    summary.errors.to_string().bright_white(),
                    summary.total_requests
                );
            }
        }
        Outcome::NoStatistics { attempts, errors } => {
            print!("{} {}", "✗".red(), render_no_statistics(*attempts, *errors));
        }
    }
}

pub fn render_no_statistics(attempts: u64, errors: u64) -> String {
    let mut out = format!("{}\n", NO_STATISTICS_MESSAGE);
    if attempts > 0 {
        let _ = writeln!(out, "  {} attempts, {} errors", attempts, errors);
    }
    out
}

pub fn render_summary(summary: &LoadSummary, wall_clock: Duration) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = writeln!(
        out,
        "{} requests in {}, {} read",
        summary.total_requests,
        format_duration(summary.avg_thread_duration),
        ByteSize(summary.total_bytes as f64)
    );
    let _ = writeln!(out, "Test Duration:\t\t{}", format_duration(wall_clock));
    let _ = writeln!(out, "Requests/sec:\t\t{:.2}", summary.requests_per_second);
    let _ = writeln!(out, "Transfer/sec:\t\t{}", ByteSize(summary.bytes_per_second));
    let _ = writeln!(out, "Avg Req Time:\t\t{}", format_duration(summary.avg_request_time));
    let _ = writeln!(out, "Fastest Request:\t{}", format_duration(summary.min_latency));
    let _ = writeln!(out, "Slowest Request:\t{}", format_duration(summary.max_latency));
    let _ = writeln!(out, "Number of Errors:\t{}", summary.errors);
    out
}
