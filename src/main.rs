//! Dokbot — chat service entry point.
//!
//! Startup sequence:
//!   1. Load .env (if present)
//!   2. Parse CLI flags
//!   3. Load config
//!   4. Init logger (CLI `-v` flags > `RUST_LOG` > config)
//!   5. Build document store, completion provider, blob backend
//!   6. Spawn Ctrl-C → shutdown watcher
//!   7. Serve HTTP until shutdown

use std::path::Path;

use tokio_util::sync::CancellationToken;
use tracing::info;

use dokbot::{blob, config, error, llm, logger, server};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), error::AppError> {
    // Load .env if present — ignore errors (file is optional).
    let _ = dotenvy::dotenv();

    let args = parse_cli_args();

    let config = config::load(args.config_path.as_deref().map(Path::new))?;

    let effective_log_level = args.log_level.unwrap_or(config.log_level.as_str());
    logger::init(effective_log_level, args.log_level.is_some())?;

    info!(
        app_name = %config.app_name,
        bind = %config.server.bind,
        llm_provider = %config.llm.provider,
        blob_backend = %config.blob.backend,
        log_level = %effective_log_level,
        "config loaded"
    );

    let completion = llm::providers::build(&config.llm, config.openai_api_key.clone())
        .map_err(|e| error::AppError::Config(e.to_string()))?;
    let blobs = blob::build(&config.blob, config.storage_sas.clone())?;
    let state = server::build_state(&config, completion, blobs);

    // Shared shutdown token — Ctrl-C cancels it, the server drains and exits.
    let shutdown = CancellationToken::new();
    let ctrlc_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("ctrl-c received — initiating shutdown");
            ctrlc_token.cancel();
        }
    });

    server::run(&config.server.bind, state, shutdown).await
}

struct CliArgs {
    log_level: Option<&'static str>,
    config_path: Option<String>,
}

fn parse_cli_args() -> CliArgs {
    let mut verbosity = 0u8;
    let mut config_path = None;

    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                println!("Usage: dokbot [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -h, --help            Print help");
                println!("  -f, --config <PATH>   Path to configuration file (default: config/default.toml)");
                println!("  -v, -vv, -vvv, -vvvv  Increase logging verbosity");
                std::process::exit(0);
            }
            "-f" | "--config" => {
                if let Some(path) = iter.next() {
                    config_path = Some(path);
                } else {
                    eprintln!("error: -f/--config requires a path argument");
                    std::process::exit(1);
                }
            }
            "--verbose" => verbosity = verbosity.saturating_add(1),
            a if a.starts_with('-') && a.len() > 1 && a.chars().skip(1).all(|c| c == 'v') => {
                verbosity = verbosity.saturating_add((a.len() - 1) as u8);
            }
            _ => {}
        }
    }

    // Each -v raises verbosity one tier from the config default:
    //   -v      → warn
    //   -vv     → info
    //   -vvv    → debug
    //   -vvvv+  → trace
    let log_level = match verbosity {
        0 => None,
        1 => Some("warn"),
        2 => Some("info"),
        3 => Some("debug"),
        _ => Some("trace"),
    };

    CliArgs { log_level, config_path }
}
