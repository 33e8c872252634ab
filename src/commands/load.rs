use anyhow::Result;
use futures::StreamExt;
use owo_colors::OwoColorize;
use std::sync::Arc;
use std::time::Instant;

use crate::config::LoadConfig;
use crate::http::HttpRequester;
use crate::performance::monitor::print_outcome;
use crate::performance::{interrupt_signal, LoadSession};
use crate::ui::spinner::Spinner;

pub async fn handle_load(config: LoadConfig) -> Result<()> {
    println!(
        "{} Running {}s test @ {}",
        "→".cyan(),
        config.duration.as_secs().to_string().bright_white(),
        config.url.as_str().bright_white()
    );
    println!(
        "  {} worker(s) running concurrently",
        config.concurrency.to_string().bright_white()
    );

    let requester = Arc::new(HttpRequester::new(&config)?);

    let started = Instant::now();
    let session = LoadSession::start(&config, requester);

    let spinner = Spinner::new("Generating load...");
    let interrupts = interrupt_signal().inspect(|_| {
        spinner.set_message("Waiting for in-flight requests...");
        spinner.println("stopping...");
    });

    let aggregate = session.collect(interrupts).await;
    let wall_clock = started.elapsed();
    spinner.finish();

    print_outcome(&aggregate.summarize(), wall_clock);

    Ok(())
}
