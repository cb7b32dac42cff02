//! Hyperbolic CLI entrypoint.
//!
//! This is the main entrypoint for the hyperbolic command-line tool.

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use hyperbolic_cli::catalog::{OfferOrder, OfferSelection, OnDemandOrder, OnDemandTier, SpotOrder};
use hyperbolic_cli::cli::{Cli, Commands, OutputFormatter, RentCommands};
use hyperbolic_cli::config::{CredentialStore, DisplayDefaults, API_KEY_ENV};
use hyperbolic_cli::error::Result;
use hyperbolic_cli::instances::{InstanceId, InstanceService};
use hyperbolic_cli::marketplace::HyperbolicClient;

use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Printed when the API fails with an internal server error.
const SERVER_TROUBLE_HINT: &str =
    "The server is temporarily experiencing issues. Please try again in a few moments.";

/// Main entrypoint.
fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose);

    if let Ok(path) = dotenvy::dotenv() {
        debug!("Loaded environment from: {}", path.display());
    }

    // Run async runtime
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            if e.upstream_status() == Some(500) {
                eprintln!("{SERVER_TROUBLE_HINT}");
            }
            ExitCode::FAILURE
        }
    }
}

/// Initializes the logging system.
///
/// Logs go to stderr so JSON output on stdout stays parseable.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Main async entry point.
async fn run(cli: Cli) -> Result<()> {
    let formatter = OutputFormatter::new(cli.output);
    let store = credential_store(cli.config)?;

    match cli.command {
        Commands::Auth { api_key } => cmd_auth(&store, &api_key, &formatter),
        Commands::Instances { instance_id } => {
            let client = connect(&store, &cli.api_url)?;
            cmd_instances(client, instance_id.as_deref(), &formatter).await
        }
        Commands::Terminate { instance_id, yes } => {
            let client = connect(&store, &cli.api_url)?;
            cmd_terminate(client, &instance_id, yes, &formatter).await
        }
        Commands::Balance => {
            let client = connect(&store, &cli.api_url)?;
            cmd_balance(&client, &formatter).await
        }
        Commands::Account => {
            let client = connect(&store, &cli.api_url)?;
            cmd_account(&client, &formatter).await
        }
        Commands::Spot { all } => {
            let client = connect_public(&store, &cli.api_url)?;
            cmd_offers(&client, all, OfferOrder::PriceFirst, &formatter).await
        }
        Commands::View { all } => {
            let client = connect_public(&store, &cli.api_url)?;
            cmd_offers(&client, all, OfferOrder::ModelFirst, &formatter).await
        }
        Commands::Ondemand => {
            let client = connect(&store, &cli.api_url)?;
            cmd_ondemand(&client, &formatter).await
        }
        Commands::Rent { market } => cmd_rent(&store, &cli.api_url, market, &formatter).await,
    }
}

/// Builds the credential store from `--config` or the default location.
fn credential_store(config: Option<PathBuf>) -> Result<CredentialStore> {
    let store = match config {
        Some(path) => CredentialStore::with_path(path)
            .with_env_override(std::env::var(API_KEY_ENV).ok()),
        None => CredentialStore::from_env()?,
    };
    debug!("Using credential file: {}", store.path().display());
    Ok(store)
}

/// Resolves the API key and creates a client.
fn connect(store: &CredentialStore, api_url: &str) -> Result<HyperbolicClient> {
    let api_key = store.api_key()?;
    HyperbolicClient::with_base_url(&api_key, api_url)
}

/// Creates a client for public endpoints, authenticated when a key exists.
fn connect_public(store: &CredentialStore, api_url: &str) -> Result<HyperbolicClient> {
    match store.api_key() {
        Ok(api_key) => HyperbolicClient::with_base_url(&api_key, api_url),
        Err(e) => {
            debug!("Browsing without an API key: {e}");
            HyperbolicClient::anonymous(api_url)
        }
    }
}

/// Writes command output to stdout.
fn emit(output: &str) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(output.as_bytes())?;
    if !output.ends_with('\n') {
        stdout.write_all(b"\n")?;
    }
    stdout.flush()?;
    Ok(())
}

/// Save the API key.
fn cmd_auth(store: &CredentialStore, api_key: &str, formatter: &OutputFormatter) -> Result<()> {
    store.save_api_key(api_key)?;
    emit(&formatter.format_key_saved(store.path()))
}

/// List instances or show one.
async fn cmd_instances(
    client: HyperbolicClient,
    instance_id: Option<&str>,
    formatter: &OutputFormatter,
) -> Result<()> {
    let service = InstanceService::new(client);

    let Some(id) = instance_id else {
        let registry = service.list_all().await?;
        return emit(&formatter.format_listing(&registry, service.defaults()));
    };

    match service.detail(id).await? {
        Some(detail) => emit(&formatter.format_detail(&detail)),
        None => emit(&formatter.format_not_found(id)),
    }
}

/// Terminate an instance.
async fn cmd_terminate(
    client: HyperbolicClient,
    instance_id: &str,
    yes: bool,
    formatter: &OutputFormatter,
) -> Result<()> {
    if !yes {
        let kind = match InstanceId::parse(instance_id) {
            InstanceId::Spot(_) => "spot instance",
            InstanceId::OnDemand(_) => "on-demand rental",
        };
        eprint!("Terminate {kind} {instance_id}? This cannot be undone. [y/N] ");
        std::io::stderr().flush()?;

        let mut input = String::new();
        std::io::stdin().lock().read_line(&mut input)?;

        if !input.trim().eq_ignore_ascii_case("y") {
            eprintln!("Termination cancelled.");
            return Ok(());
        }
    }

    let service = InstanceService::new(client);
    match service.terminate(instance_id).await? {
        Some(terminated) => {
            info!("Terminated {} {}", terminated.family, terminated.id);
            emit(&formatter.format_terminated(&terminated))
        }
        None => emit(&formatter.format_not_found(instance_id)),
    }
}

/// Show the account balance.
async fn cmd_balance(client: &HyperbolicClient, formatter: &OutputFormatter) -> Result<()> {
    let balance = client.current_balance().await?;
    emit(&formatter.format_balance(&balance))
}

/// Show account information.
async fn cmd_account(client: &HyperbolicClient, formatter: &OutputFormatter) -> Result<()> {
    let account = client.account().await?;
    emit(&formatter.format_account(&account))
}

/// Show spot availability.
async fn cmd_offers(
    client: &HyperbolicClient,
    all: bool,
    order: OfferOrder,
    formatter: &OutputFormatter,
) -> Result<()> {
    let listing = client.marketplace_listing().await?;
    let selection = OfferSelection::new(&listing, all, order, &DisplayDefaults::default());

    match order {
        OfferOrder::PriceFirst => emit(&formatter.format_spot_offers(&listing, &selection)),
        OfferOrder::ModelFirst => emit(&formatter.format_offer_view(&listing, &selection)),
    }
}

/// Show on-demand pricing.
async fn cmd_ondemand(client: &HyperbolicClient, formatter: &OutputFormatter) -> Result<()> {
    let options = client.on_demand_options().await?;
    let tiers = OnDemandTier::from_options(&options, &DisplayDefaults::default())?;
    emit(&formatter.format_on_demand_options(&options, &tiers))
}

/// Rent from the spot or on-demand marketplace.
///
/// Orders are validated before the API key is resolved.
async fn cmd_rent(
    store: &CredentialStore,
    api_url: &str,
    market: RentCommands,
    formatter: &OutputFormatter,
) -> Result<()> {
    match market {
        RentCommands::Spot {
            cluster_name,
            node_name,
            gpu_count,
            ports,
        } => {
            let order = SpotOrder::new(&cluster_name, &node_name, gpu_count, &ports)?;
            let client = connect(store, api_url)?;
            let response = order.submit(&client).await?;
            emit(&formatter.format_spot_rented(&order, response.as_ref()))
        }
        RentCommands::Ondemand {
            instance_type,
            gpu_count,
            network_type,
        } => {
            let order =
                OnDemandOrder::new(instance_type.into(), gpu_count, network_type.map(Into::into))?;
            let client = connect(store, api_url)?;
            let rental = order.submit(&client).await?;
            if let Some(rental) = &rental {
                info!("Rented {} {}", order.family(), rental.id);
            }
            emit(&formatter.format_on_demand_rented(&order, rental.as_ref()))
        }
    }
}
