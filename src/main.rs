//! phone-append: enrich a JSON dataset of phone numbers with contacts from a
//! waterfall of lookup vendors, geocode their addresses, export the result,
//! or serve address lookdowns over HTTP.

mod cli;
mod export;

use anyhow::{bail, Context};
use clap::Parser;
use phone_append_config::{
    validate_config, validate_server_credentials, AppConfig, ConfigLoader, ProviderEntry,
    ENV_PREFIX,
};
use phone_append_metrics::{init_tracing, RunId};
use phone_append_orchestrator::{
    Checkpointer, ConfirmGate, DatasetStore, GeocodingPass, InterruptFlag, JsonFileStore, RunAll,
    StdinPrompt, WaterfallOrchestrator,
};
use phone_append_providers::{LookupProvider, Registries};
use phone_append_server::{serve, Credentials, ServiceContext};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn, Instrument};

use crate::cli::Args;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = load_config(&args)?;
    init_tracing(&config.logging.level, config.logging.json)?;

    if !args.has_action() {
        warn!("No actions specified. Use --lookup and/or --geocode, --export-csv, or --server.");
        return Ok(());
    }
    if args.server && (args.lookup || args.geocode) {
        bail!("--server cannot be combined with --lookup or --geocode");
    }

    let registries = Registries::builtin()?;

    if args.server {
        run_server(&config, &registries).await
    } else {
        run_passes(&args, &config, &registries).await
    }
}

fn load_config(args: &Args) -> anyhow::Result<AppConfig> {
    let mut config = match &args.config {
        Some(path) => ConfigLoader::from_file_with_env(path, ENV_PREFIX)
            .with_context(|| format!("loading {}", path.display()))?,
        None => ConfigLoader::from_env()?,
    };
    args.apply(&mut config);
    validate_config(&config)?;
    Ok(config)
}

fn instantiate_vendors(
    registries: &Registries,
    entries: &[ProviderEntry],
) -> anyhow::Result<Vec<Arc<dyn LookupProvider>>> {
    entries
        .iter()
        .map(|entry| {
            registries
                .lookup
                .instantiate(&entry.provider, &entry.settings)
                .map_err(anyhow::Error::from)
        })
        .collect()
}

async fn run_server(config: &AppConfig, registries: &Registries) -> anyhow::Result<()> {
    validate_server_credentials(config)?;
    let credentials = Credentials::new(&config.server.sid, &config.server.token)?;
    let vendors = instantiate_vendors(registries, &config.server.vendors)?;
    let bind: SocketAddr = config
        .server
        .bind
        .parse()
        .with_context(|| format!("invalid bind address {}", config.server.bind))?;

    // default SIGINT handling: nothing to checkpoint here
    serve(ServiceContext::new(credentials, vendors), bind).await?;
    Ok(())
}

async fn run_passes(args: &Args, config: &AppConfig, registries: &Registries) -> anyhow::Result<()> {
    let gate: Arc<dyn ConfirmGate> = if config.lookup.run_all {
        Arc::new(RunAll)
    } else {
        Arc::new(StdinPrompt)
    };

    // every provider is built before the dataset is touched
    let waterfall = if args.lookup {
        let providers = instantiate_vendors(registries, &config.lookup.waterfall)?;
        Some(
            WaterfallOrchestrator::new(providers, gate.clone())
                .with_checkpoint_every(config.dataset.checkpoint_every),
        )
    } else {
        None
    };

    let geocoding = if args.geocode {
        let entry = &config.geocoding.provider;
        let geocoder = registries
            .geocoders
            .instantiate(&entry.provider, &entry.settings)?;
        Some(
            GeocodingPass::new(geocoder, Duration::from_millis(config.geocoding.pause_ms))
                .with_gate(gate.clone()),
        )
    } else {
        None
    };

    let store = Arc::new(JsonFileStore::new(&config.dataset.path));
    let mut records = store
        .load()
        .await
        .with_context(|| format!("loading dataset {}", config.dataset.path.display()))?;

    let interrupt = InterruptFlag::new();
    interrupt.install_ctrl_c_handler();
    let mut checkpointer = Checkpointer::new(store.clone(), interrupt);
    let run_id = RunId::new();
    info!(%run_id, records = records.len(), "Dataset loaded");

    if let Some(orchestrator) = waterfall {
        let summary = orchestrator
            .run(&mut records, &mut checkpointer)
            .instrument(run_id.pass_span("lookup"))
            .await?;
        info!(
            resolved = summary.resolved,
            exhausted = summary.exhausted,
            "Lookups finished"
        );
    }

    if let Some(pass) = geocoding {
        let summary = pass
            .run(&mut records, &mut checkpointer)
            .instrument(run_id.pass_span("geocode"))
            .await?;
        info!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            "Geocoding finished"
        );
    }

    if let Some(path) = &args.export_csv {
        let rows = export::export_csv(&records, path)
            .with_context(|| format!("writing {}", path.display()))?;
        info!(rows, path = %path.display(), "CSV exported");
    }

    Ok(())
}
