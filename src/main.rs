//! File Resolver - cached file records from the content-processing API
//!
//! Serves assembled file records (details plus transcript segments) over
//! HTTP, resolving each file ID against the upstream API once and caching
//! the finished result.

mod cache;
mod config;
mod file;
mod resolver;
mod server;
mod upstream;

use anyhow::{anyhow, Context, Result};
use std::env;
use std::sync::Arc;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use cache::{MokaRecordCache, RecordCache};
use config::Config;
use resolver::Resolver;
use server::AppState;
use upstream::{HttpUpstreamClient, UpstreamClient};

/// CLI command
#[derive(Debug, PartialEq)]
enum Command {
    /// Run the HTTP server (default)
    Serve {
        upstream: Option<String>,
        listen: Option<String>,
    },
    /// Resolve a single file ID and print it as JSON
    Resolve {
        file_id: String,
        upstream: Option<String>,
    },
    /// Show help
    Help,
}

fn print_help() {
    eprintln!(
        r#"File Resolver - assembled file records from the content-processing API

USAGE:
    file-resolver [serve] [--upstream <url>] [--listen <addr>]
    file-resolver resolve <file_id> [--upstream <url>]
    file-resolver help

COMMANDS:
    serve    Run the HTTP server (default)
    resolve  Resolve one file ID and print the record as JSON
    help     Show this help message

ROUTES:
    GET /file/:fileid             Resolve a file record
    GET /protected/file/:fileid   Same, requires an Authorization header
    GET /health                   Service and cache status

ENVIRONMENT:
    UPSTREAM_BASE_URL      Upstream API base URL (default http://interview-api.snackable.ai)
    LISTEN_ADDR            HTTP listen address (default 0.0.0.0:8080)
    UPSTREAM_TIMEOUT_SECS  Per-request upstream timeout (default 30)
    PAGE_SIZE              Listing rows per page (default 5, the service default)
    MAX_PAGES              Stop the listing scan after this many pages (default unlimited)
    PAGING_ERROR_POLICY    propagate | not-found (default propagate)
    CACHE_CAPACITY         Maximum cached records (default 10000)
    CACHE_TTL_SECS         Cached record lifetime (default none)
    LOOKUP_TIMEOUT_SECS    Deadline for one uncached resolution (default none)
    RUST_LOG               Log level (trace, debug, info, warn, error)
"#
    );
}

fn parse_args(args: &[String]) -> Result<Command> {
    let mut positional = Vec::new();
    let mut upstream = None;
    let mut listen = None;

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--upstream" => {
                upstream = Some(
                    iter.next()
                        .cloned()
                        .ok_or_else(|| anyhow!("--upstream requires a URL"))?,
                );
            }
            "--listen" => {
                listen = Some(
                    iter.next()
                        .cloned()
                        .ok_or_else(|| anyhow!("--listen requires an address"))?,
                );
            }
            "--help" | "-h" => return Ok(Command::Help),
            _ => positional.push(arg.clone()),
        }
    }

    match positional.first().map(String::as_str) {
        None | Some("serve") => Ok(Command::Serve { upstream, listen }),
        Some("resolve") => {
            let file_id = positional
                .get(1)
                .cloned()
                .ok_or_else(|| anyhow!("Usage: file-resolver resolve <file_id>"))?;
            Ok(Command::Resolve { file_id, upstream })
        }
        Some("help") => Ok(Command::Help),
        Some(other) => Err(anyhow!("Unknown command: {}", other)),
    }
}

/// Wire the upstream client, cache and resolver together
fn build_state(config: &Config) -> Result<AppState> {
    let upstream = HttpUpstreamClient::new(&config.upstream_base_url, config.request_timeout)
        .context("Failed to create upstream client")?;
    let cache = Arc::new(MokaRecordCache::with_config(
        config.cache_capacity,
        config.cache_ttl,
    ));
    let resolver = Resolver::with_config(
        Arc::new(upstream) as Arc<dyn UpstreamClient>,
        Arc::clone(&cache) as Arc<dyn RecordCache>,
        config.resolver.clone(),
    );
    Ok(AppState::new(Arc::new(resolver), cache))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let log_level = env::var("RUST_LOG")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(Level::INFO);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args: Vec<String> = env::args().collect();
    let command = match parse_args(&args) {
        Ok(cmd) => cmd,
        Err(e) => {
            eprintln!("Error: {}", e);
            print_help();
            std::process::exit(1);
        }
    };

    let config = Config::from_env().context("Failed to load configuration")?;

    match command {
        Command::Serve { upstream, listen } => {
            let mut config = config;
            if let Some(url) = upstream {
                config = config.with_upstream(&url);
            }
            if let Some(addr) = listen {
                config = config.with_listen_addr(&addr)?;
            }

            info!(
                upstream = %config.upstream_base_url,
                page_size = config.resolver.page_size,
                policy = ?config.resolver.paging_error_policy,
                cache_capacity = config.cache_capacity,
                "Starting file resolver"
            );

            let state = build_state(&config)?;
            if let Err(e) = server::serve(state, config.listen_addr).await {
                error!(error = %e, "Server failed");
                return Err(e);
            }
        }
        Command::Resolve { file_id, upstream } => {
            let config = match upstream {
                Some(url) => config.with_upstream(&url),
                None => config,
            };

            let state = build_state(&config)?;
            let record = state
                .resolver
                .resolve(&file_id)
                .await
                .with_context(|| format!("Failed to resolve '{}'", file_id))?;

            println!("{}", serde_json::to_string_pretty(&*record)?);
        }
        Command::Help => {
            print_help();
        }
    }

    Ok(())
}
