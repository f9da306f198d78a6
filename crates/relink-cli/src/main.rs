//! relink — replace legacy `gs://` references in a collection with resolved URLs.
//!
//! Configuration comes from the environment (see `relink_core::Config`);
//! flags override the sweep settings. Exit status: 0 on success, 1 when the
//! sweep aborted or a record failed, 2 on configuration errors.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use relink_cli::{
    build_store, exit_code_for, init_tracing, summary_lines, EXIT_CONFIG_ERROR,
};
use relink_core::config::parse_expiry;
use relink_core::Config;
use relink_services::{error_chain, FailurePolicy, Sweep, SweepOptions};

const MAX_URL_LEN: usize = 96;

#[derive(Parser, Debug)]
#[command(name = "relink")]
#[command(about = "Replace legacy gs:// references with long-lived download URLs")]
struct Args {
    /// Collection to sweep (overrides SWEEP_COLLECTION)
    #[arg(long)]
    collection: Option<String>,

    /// Field holding the storage reference (overrides SWEEP_FIELD)
    #[arg(long)]
    field: Option<String>,

    /// URL expiry, RFC 3339 or YYYY-MM-DD (overrides SWEEP_URL_EXPIRY)
    #[arg(long, value_name = "INSTANT")]
    expires_at: Option<String>,

    /// Report matching records without resolving or writing
    #[arg(long)]
    dry_run: bool,

    /// Keep going after a record fails instead of aborting
    #[arg(long)]
    continue_on_error: bool,

    /// Print the full report as JSON
    #[arg(long)]
    json: bool,

    /// Seed file for DOCUMENT_STORE=memory: a JSON object of id -> document
    #[arg(long, value_name = "FILE")]
    seed: Option<PathBuf>,
}

fn load_config(args: &Args) -> anyhow::Result<Config> {
    let mut config = Config::from_env()?;

    if let Some(collection) = &args.collection {
        config.sweep.collection_name = collection.clone();
    }
    if let Some(field) = &args.field {
        config.sweep.field_name = field.clone();
    }
    if let Some(expires_at) = &args.expires_at {
        config.sweep.url_expiry = parse_expiry(expires_at)?;
    }

    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %format!("{:#}", e), "Invalid configuration");
            return ExitCode::from(EXIT_CONFIG_ERROR);
        }
    };

    let collaborators = async {
        let store = build_store(&config, args.seed.as_deref())
            .await
            .context("Failed to set up document store")?;
        let resolver =
            relink_storage::create_resolver(&config).context("Failed to set up URL resolver")?;
        anyhow::Ok((store, resolver))
    }
    .await;

    let (store, resolver) = match collaborators {
        Ok(pair) => pair,
        Err(e) => {
            tracing::error!(error = %format!("{:#}", e), "Setup failed");
            return ExitCode::from(EXIT_CONFIG_ERROR);
        }
    };

    tracing::info!(
        collection = %config.sweep.collection_name,
        field = %config.sweep.field_name,
        bucket_root = %config.sweep.bucket_root,
        backend = %resolver.backend_type(),
        expires_at = %config.sweep.url_expiry.to_rfc3339(),
        "Starting sweep"
    );

    let options = SweepOptions {
        policy: if args.continue_on_error {
            FailurePolicy::Continue
        } else {
            FailurePolicy::Abort
        },
        dry_run: args.dry_run,
    };

    let result = Sweep::new(config.sweep.clone(), store, resolver)
        .with_options(options)
        .run()
        .await;

    match &result {
        Ok(report) if args.json => match serde_json::to_string_pretty(report) {
            Ok(out) => println!("{}", out),
            Err(e) => tracing::error!(error = %e, "Failed to serialize report"),
        },
        Ok(report) => {
            for line in summary_lines(report, MAX_URL_LEN) {
                println!("{}", line);
            }
        }
        Err(e) => tracing::error!(error = %error_chain(e), "Sweep failed"),
    }

    ExitCode::from(exit_code_for(&result))
}
