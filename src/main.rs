//! cse-indexer: stream Google CSE result URLs for a query.
//!
//! Usage: cse-indexer <engine-id> <query> [site]
//!
//! Result URLs are written to stdout, one per line, as each results page is
//! extracted. Diagnostics go to stderr via tracing. Exit code is 0 when the
//! search completes (including a search with no results), 1 when the search
//! fails, and 2 on bad arguments.

use cse_indexer::output::LinkPrinter;
use cse_indexer::session::SearchRequest;
use cse_indexer::{load_yaml_config, search, Config};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
                .add_directive("chromiumoxide::handler=off".parse().unwrap())
                .add_directive("chromiumoxide::conn=off".parse().unwrap()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn parse_args() -> Option<SearchRequest> {
    let mut args = std::env::args().skip(1);
    let engine_id = args.next()?;
    let query = args.next()?;
    let site = args.next();
    Some(SearchRequest::new(engine_id, query, site))
}

#[tokio::main]
async fn main() {
    init_tracing();

    let Some(request) = parse_args() else {
        eprintln!("usage: cse-indexer <engine-id> <query> [site]");
        std::process::exit(2);
    };

    let config = match load_yaml_config() {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("failed to load config.yaml, using defaults: {e}");
            Config::default()
        }
    };

    let stdout = std::io::stdout().lock();
    let mut sink = LinkPrinter::new(stdout);

    let code = match search::run_search(&config, &request, &mut sink).await {
        Ok(outcome) => {
            tracing::info!(
                links = sink.emitted(),
                duplicates = sink.duplicates(),
                ?outcome,
                "indexing complete"
            );
            0
        }
        Err(e) => {
            tracing::error!("indexing failed: {e}");
            1
        }
    };

    std::process::exit(code);
}
