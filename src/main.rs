//! Pokecache - An in-memory response cache with time-based expiration
//!
//! Interactive shell over the cache. Reads commands from stdin until
//! `exit`, end of input, or Ctrl+C.

use anyhow::Context;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pokecache::repl::{spawn_line_reader, Repl};
use pokecache::{Cache, CachedFetcher, Config, FileSource};

/// Main entry point for the cache shell.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the cache, which starts its reaper
/// 4. Run the read-eval-print loop
/// 5. Stop the reaper on exit
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so they don't interleave with command output.
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pokecache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::from_env();
    info!("Configuration loaded: ttl={}ms", config.ttl_ms);

    let cache = Cache::new(config.ttl());
    let current_dir = std::env::current_dir().context("failed to resolve working directory")?;
    let repl = Repl::new(CachedFetcher::new(cache.clone(), FileSource::new(current_dir)));

    // Stdin is read on its own thread so Ctrl+C never waits on a pending read.
    let mut lines = spawn_line_reader(std::io::BufReader::new(std::io::stdin()));
    let mut stdout = std::io::stdout();

    tokio::select! {
        result = repl.run(&mut lines, &config.prompt, &mut stdout) => result?,
        _ = signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down...");
        }
    }

    cache.shutdown().await;
    info!("Shutdown complete");
    Ok(())
}
