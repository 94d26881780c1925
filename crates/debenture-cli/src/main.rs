mod args;
mod commands;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::OutputFormat;
use debenture_client::{connect, CallError, Config, DebentureService};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "debenture")]
#[command(about = "Client for the Soroban debenture contracts", long_about = None)]
#[command(version)]
struct Cli {
    /// Stellar network (mainnet, testnet, futurenet)
    #[arg(long, global = true)]
    network: Option<String>,

    /// Soroban RPC endpoint
    #[arg(long, global = true)]
    rpc_url: Option<String>,

    /// TOML configuration file
    #[arg(long, global = true, env = "DEBENTURE_CONFIG")]
    config: Option<PathBuf>,

    /// Serve reads from fixtures and refuse writes
    #[arg(long, global = true)]
    offline: bool,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "human")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Total supply, value locked and latest IPCA
    Dashboard {
        /// Holder whose deposited bonds are reported (defaults to the signing account)
        #[arg(long)]
        holder: Option<String>,
    },

    /// Monthly IPCA history
    IpcaHistory {
        /// Number of months to fetch
        #[arg(long, default_value = "12")]
        months: u32,
    },

    /// Bond characteristics from the bond storage contract
    Bond {
        /// Fields to read (default: all)
        fields: Vec<String>,
    },

    /// Price of one bond from the payment pool
    BondPrice,

    /// Buy bonds through the payment pool
    Buy {
        /// Number of bonds
        #[arg(long)]
        amount: i128,
    },

    /// Mint test tokens from the faucet
    Mint,

    /// Simulate a read-only contract call
    View {
        /// Contract address (C...)
        contract: String,

        /// Function name
        method: String,

        /// Arguments as type:value, e.g. i128:42 address:G... vec:[u32:1,u32:2]
        args: Vec<String>,

        /// Untyped arguments as a JSON array, converted by shape
        #[arg(long)]
        json_args: Option<String>,
    },

    /// Sign and submit a contract call
    Invoke {
        /// Contract address (C...)
        contract: String,

        /// Function name
        method: String,

        /// Arguments as type:value
        args: Vec<String>,

        /// Untyped arguments as a JSON array, converted by shape
        #[arg(long)]
        json_args: Option<String>,
    },

    /// Look up a submitted transaction
    TxStatus {
        /// Transaction hash (hex)
        hash: String,
    },

    /// Check the RPC endpoint
    Health,

    /// Generate a new keypair
    Keygen,
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "debenture=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut overrides = HashMap::new();
    if let Some(network) = &cli.network {
        overrides.insert("DEBENTURE_NETWORK".to_string(), network.clone());
    }
    if let Some(rpc_url) = &cli.rpc_url {
        overrides.insert("DEBENTURE_RPC_URL".to_string(), rpc_url.clone());
    }
    if cli.offline {
        overrides.insert("DEBENTURE_MODE".to_string(), "offline".to_string());
    }
    Ok(Config::load(cli.config.as_deref(), &overrides)?)
}

async fn run(cli: Cli) -> Result<()> {
    if let Commands::Keygen = cli.command {
        return commands::keygen(cli.format);
    }

    let config = load_config(&cli)?;
    debug!(?config, "Resolved configuration");
    let format = cli.format;

    match &cli.command {
        Commands::TxStatus { hash } => {
            if cli.offline {
                bail!("tx-status needs network access and cannot run with --offline");
            }
            return commands::tx_status(&config, hash, format).await;
        }
        Commands::Health => {
            if cli.offline {
                bail!("health needs network access and cannot run with --offline");
            }
            return commands::health(&config, format).await;
        }
        _ => {}
    }

    let caller = connect(&config).context("Failed to initialize contract client")?;
    let service = DebentureService::new(caller.clone(), config.contracts.clone());

    match cli.command {
        Commands::Dashboard { holder } => {
            commands::dashboard(&service, &config, holder.as_deref(), format).await?;
        }
        Commands::IpcaHistory { months } => {
            commands::ipca_history(&service, &config, months, format).await?;
        }
        Commands::Bond { fields } => {
            commands::bond(&service, &config, &fields, format).await?;
        }
        Commands::BondPrice => {
            commands::bond_price(&service, format).await?;
        }
        Commands::Buy { amount } => {
            commands::buy(&service, amount, format).await?;
        }
        Commands::Mint => {
            commands::mint(&service, format).await?;
        }
        Commands::View {
            contract,
            method,
            args: raw_args,
            json_args,
        } => {
            let args = args::parse_args(&raw_args, json_args.as_deref(), &config.address_heuristic)?;
            commands::view(&caller, &contract, &method, args, format).await?;
        }
        Commands::Invoke {
            contract,
            method,
            args: raw_args,
            json_args,
        } => {
            let args = args::parse_args(&raw_args, json_args.as_deref(), &config.address_heuristic)?;
            commands::invoke(&caller, &contract, &method, args, format).await?;
        }
        Commands::TxStatus { .. } | Commands::Health | Commands::Keygen => {}
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    // .env is optional
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    init_tracing();

    if let Err(err) = run(cli).await {
        eprintln!("{} {}", "Error:".red().bold(), err);
        for cause in err.chain().skip(1) {
            eprintln!("  caused by: {}", cause);
        }
        if let Some(call) = err.downcast_ref::<CallError>() {
            eprintln!("  {}", call.user_message().yellow());
        }
        std::process::exit(1);
    }
}
