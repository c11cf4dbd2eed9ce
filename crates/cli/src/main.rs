//! Grayshop CLI - terminal storefront.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! grayshop products --category 数码 --sort price_asc
//!
//! # Log in (token is kept in .grayshop/storage.json)
//! grayshop login alice secret1
//!
//! # Cart and checkout
//! grayshop add 3 --quantity 2
//! grayshop cart
//! grayshop checkout
//!
//! # Orders
//! grayshop orders
//! grayshop pay 12
//!
//! # Interactive session that keeps its state between commands
//! grayshop shell
//! ```
//!
//! # Environment Variables
//!
//! - `GRAYSHOP_API_BASE` - Backend base URL (default `http://127.0.0.1:8080`)
//! - `GRAYSHOP_TOKEN_FILE` - Token storage file
//! - `GRAYSHOP_TOKEN_KEY` - Key of the token inside that file
//! - `GRAYSHOP_PAGE_SIZE` - Orders per page
//! - `SENTRY_DSN` - Enables error reporting when set

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use grayshop_storefront::api::ApiClient;
use grayshop_storefront::app::App;
use grayshop_storefront::config::StorefrontConfig;
use grayshop_storefront::navigation::{Navigator, Route};
use grayshop_storefront::token_store::FileTokenStore;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::{CliError, Command};

#[derive(Parser)]
#[command(name = "grayshop")]
#[command(author, version, about = "Grayshop terminal storefront")]
struct Cli {
    /// Backend base URL (overrides `GRAYSHOP_API_BASE`)
    #[arg(long, global = true)]
    api_base: Option<String>,

    /// Token storage file (overrides `GRAYSHOP_TOKEN_FILE`)
    #[arg(long, global = true)]
    token_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry.dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry
                .environment
                .clone()
                .map(std::borrow::Cow::Owned),
            sample_rate: config.sentry.sample_rate,
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

fn load_config(cli: &Cli) -> Result<StorefrontConfig, CliError> {
    let mut config = StorefrontConfig::from_env()?;
    if let Some(api_base) = &cli.api_base {
        config = config.with_api_base(api_base)?;
    }
    if let Some(token_file) = &cli.token_file {
        config.token_file.clone_from(token_file);
    }
    Ok(config)
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            // Tracing is not up yet.
            #[allow(clippy::print_stderr)]
            {
                eprintln!("grayshop: {e}");
            }
            return ExitCode::FAILURE;
        }
    };

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "grayshop_storefront=info,grayshop=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!("Failed to start runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli.command, &config)) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!("Command failed: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Run one command. Returns `false` when the storefront reported an error.
async fn run(command: Command, config: &StorefrontConfig) -> Result<bool, CliError> {
    let tokens = Arc::new(FileTokenStore::new(
        config.token_file.clone(),
        config.token_key.clone(),
    ));
    let api = ApiClient::new(config, tokens, Navigator::new(Route::Catalog))?;
    let mut app = App::new(api, config.page_size);

    match command {
        Command::Shell => {
            commands::shell::run(&mut app).await?;
            Ok(true)
        }
        command => commands::execute(&mut app, command).await,
    }
}
