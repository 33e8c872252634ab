use barrage::cli::{normalize_args, Cli};
use barrage::commands::load;
use barrage::config::UserConfig;
use clap::{CommandFactory, Parser};
use owo_colors::OwoColorize;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse_from(normalize_args(std::env::args_os()));

    if cli.version {
        println!("Version: {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    if cli.url.is_none() {
        Cli::command().print_help()?;
        return Ok(());
    }

    let config = match UserConfig::load().and_then(|user| cli.into_config(&user)) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{} {}", "error:".red().bold(), err);
            eprintln!();
            Cli::command().print_help()?;
            std::process::exit(2);
        }
    };

    load::handle_load(config).await
}
