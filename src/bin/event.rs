//! Prints the first open event from the Gamma API and exits.

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use polyterm::config::Config;
use polyterm::error::AppError;
use polyterm::fetcher::FetchClient;

#[tokio::main]
async fn main() {
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .with_writer(std::io::stderr)
        .init();

    let client = match FetchClient::new(&cfg) {
        Ok(c) => c,
        Err(e) => {
            error!("HTTP client error: {e}");
            std::process::exit(1);
        }
    };

    match client.fetch_first_event().await {
        Ok(event) => {
            info!(id = %event.id, "fetched event");
            println!("{}", event.title);
            println!("slug: {}", event.display_slug());
            if event.volume > 0.0 || event.liquidity > 0.0 {
                println!("volume: {:.0}  liquidity: {:.0}", event.volume, event.liquidity);
            }
        }
        Err(AppError::EmptyResult) => {
            eprintln!("Error: no events returned");
            std::process::exit(1);
        }
        Err(e) => {
            error!(kind = e.kind(), "event fetch failed: {e}");
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
