use anyhow::{bail, Context, Result};
use colored::Colorize;
use debenture_client::render::{render, to_json};
use debenture_client::{
    CallError, Config, ContractCaller, ContractRole, DebentureService, Mode, Signer, StellarRpcClient,
    TransactionReceipt, Value, BOND_FIELDS,
};
use serde_json::json;
use std::sync::Arc;
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
}

#[derive(Tabled)]
struct FieldRow {
    #[tabled(rename = "Field")]
    field: String,
    #[tabled(rename = "Value")]
    value: String,
}

#[derive(Tabled)]
struct IpcaRow {
    #[tabled(rename = "Month")]
    month: u32,
    #[tabled(rename = "IPCA")]
    value: String,
}

fn print_json(value: serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn outcome_json<T: Into<serde_json::Value>>(result: Result<T, CallError>) -> serde_json::Value {
    match result {
        Ok(v) => {
            let v: serde_json::Value = v.into();
            json!({ "ok": v })
        }
        Err(e) => json!({ "error": e.to_string(), "kind": format!("{:?}", e.kind()) }),
    }
}

fn outcome_human(result: &Result<String, CallError>) -> String {
    match result {
        Ok(v) => v.clone(),
        Err(e) => format!("ERROR: {}", e.user_message()).red().to_string(),
    }
}

fn header(title: &str, config: &Config) {
    let mode = match config.mode {
        Mode::Live => "live".green(),
        Mode::Offline => "offline".yellow(),
    };
    println!("\n{} ({} | {})", title.bold().cyan(), config.network.to_string().bright_blue(), mode);
    println!("{}", "=".repeat(60).cyan());
}

pub async fn dashboard(
    service: &DebentureService,
    config: &Config,
    holder: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    let dashboard = service.dashboard(holder).await;

    if format == OutputFormat::Json {
        return print_json(json!({
            "total_supply": outcome_json(dashboard.total_supply.map(|v| to_json(&v))),
            "total_value_locked": outcome_json(dashboard.total_value_locked.map(|v| to_json(&v))),
            "latest_ipca": outcome_json(dashboard.latest_ipca),
        }));
    }

    header("Debenture Dashboard", config);
    println!(
        "  Total supply:       {}",
        outcome_human(&dashboard.total_supply.map(|v| render(&v)))
    );
    println!(
        "  Total value locked: {}",
        outcome_human(&dashboard.total_value_locked.map(|v| render(&v)))
    );
    println!(
        "  Latest IPCA:        {}",
        outcome_human(&dashboard.latest_ipca.map(|v| format!("{:.2}%", v)))
    );
    println!();
    Ok(())
}

pub async fn ipca_history(
    service: &DebentureService,
    config: &Config,
    months: u32,
    format: OutputFormat,
) -> Result<()> {
    let history = service.ipca_history(months).await;

    if format == OutputFormat::Json {
        let points: Vec<_> = history
            .into_iter()
            .map(|p| json!({ "month": p.index, "value": outcome_json(p.value) }))
            .collect();
        return print_json(json!(points));
    }

    header("IPCA History", config);
    let rows: Vec<IpcaRow> = history
        .into_iter()
        .map(|p| IpcaRow {
            month: p.index,
            value: outcome_human(&p.value.map(|v| format!("{:.2}%", v))),
        })
        .collect();
    println!("{}", Table::new(rows).with(Style::rounded()).to_string());
    Ok(())
}

pub async fn bond(
    service: &DebentureService,
    config: &Config,
    fields: &[String],
    format: OutputFormat,
) -> Result<()> {
    let names: Vec<&str> = if fields.is_empty() {
        BOND_FIELDS.to_vec()
    } else {
        fields.iter().map(String::as_str).collect()
    };
    let results = service.bond_fields(&names).await;

    if format == OutputFormat::Json {
        let mut object = serde_json::Map::new();
        for (name, result) in results {
            object.insert(name, outcome_json(result));
        }
        return print_json(serde_json::Value::Object(object));
    }

    header("Bond Characteristics", config);
    let rows: Vec<FieldRow> = results
        .into_iter()
        .map(|(field, result)| FieldRow {
            field,
            value: outcome_human(&result),
        })
        .collect();
    println!("{}", Table::new(rows).with(Style::rounded()).to_string());
    Ok(())
}

pub async fn bond_price(service: &DebentureService, format: OutputFormat) -> Result<()> {
    let price = service
        .bond_price()
        .await
        .context("Failed to fetch bond price")?;

    if format == OutputFormat::Json {
        return print_json(json!({ "denomination": price.to_string() }));
    }
    println!("{} {}", "Bond price (denomination):".bold(), price.to_string().green());
    Ok(())
}

fn print_receipt(receipt: &TransactionReceipt, action: &str, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        return print_json(json!({
            "hash": receipt.hash,
            "status": receipt.status,
            "raw": receipt.raw,
        }));
    }

    println!("\n{} {}", "✓".green(), action.bold());
    println!("  Transaction: {}", receipt.identifier().bright_black());
    if let Some(status) = &receipt.status {
        println!("  Status: {}", status.bright_blue());
    }
    Ok(())
}

pub async fn buy(service: &DebentureService, amount: i128, format: OutputFormat) -> Result<()> {
    let receipt = service
        .buy_bonds(amount)
        .await
        .with_context(|| format!("Failed to buy {} bond(s)", amount))?;
    print_receipt(&receipt, &format!("Purchase of {} bond(s) submitted", amount), format)
}

pub async fn mint(service: &DebentureService, format: OutputFormat) -> Result<()> {
    let receipt = service.mint().await.context("Failed to mint from faucet")?;
    print_receipt(&receipt, "Faucet mint submitted", format)
}

pub async fn view(
    caller: &Arc<dyn ContractCaller>,
    contract: &str,
    method: &str,
    args: Vec<Value>,
    format: OutputFormat,
) -> Result<()> {
    let value = caller
        .call_view(contract, method, &args)
        .await
        .with_context(|| format!("View call {} failed", method))?;

    if format == OutputFormat::Json {
        return print_json(json!({ "type": value.type_name(), "value": to_json(&value) }));
    }
    println!("{}", render(&value));
    Ok(())
}

pub async fn invoke(
    caller: &Arc<dyn ContractCaller>,
    contract: &str,
    method: &str,
    args: Vec<Value>,
    format: OutputFormat,
) -> Result<()> {
    let receipt = caller
        .call_mutation(contract, method, &args)
        .await
        .with_context(|| format!("Invocation of {} failed", method))?;
    print_receipt(&receipt, &format!("{} submitted", method), format)
}

pub async fn tx_status(config: &Config, hash: &str, format: OutputFormat) -> Result<()> {
    if hash.len() != 64 || hex::decode(hash).is_err() {
        bail!("transaction hash must be 64 hex characters");
    }
    let rpc = StellarRpcClient::new(&config.rpc_url);
    let status = rpc
        .get_transaction(hash)
        .await
        .context("Failed to fetch transaction status")?;

    if format == OutputFormat::Json {
        return print_json(serde_json::to_value(&status)?);
    }

    let colored_status = match status.status.as_str() {
        "SUCCESS" => status.status.green(),
        "FAILED" => status.status.red(),
        _ => status.status.yellow(),
    };
    println!("{} {}", "Status:".bold(), colored_status);
    if let Some(ledger) = status.ledger {
        println!("  Ledger: {}", ledger);
    }
    if let Some(created_at) = &status.created_at {
        println!("  Created at: {}", created_at);
    }
    Ok(())
}

pub async fn health(config: &Config, format: OutputFormat) -> Result<()> {
    let rpc = StellarRpcClient::new(&config.rpc_url);
    let (health, ledger) = futures::join!(rpc.get_health(), rpc.get_latest_ledger());
    let health = health.context("RPC node unreachable")?;
    let ledger = ledger.context("Failed to fetch latest ledger")?;

    if format == OutputFormat::Json {
        return print_json(json!({
            "network": config.network.to_string(),
            "rpc_url": config.rpc_url,
            "mode": config.mode.to_string(),
            "status": health,
            "latest_ledger": ledger,
            "contracts_configured": config.contracts.configured(),
        }));
    }

    header("RPC Health", config);
    println!("  Endpoint:      {}", config.rpc_url);
    println!("  Status:        {}", health.green());
    println!("  Latest ledger: {}", ledger);
    println!(
        "  Contracts:     {}/{} configured",
        config.contracts.configured(),
        ContractRole::ALL.len()
    );
    Ok(())
}

pub fn keygen(format: OutputFormat) -> Result<()> {
    let signer = Signer::generate();

    if format == OutputFormat::Json {
        return print_json(json!({
            "public_key": signer.address(),
            "secret_key": signer.secret_strkey(),
        }));
    }

    println!("{}", "New keypair".bold().cyan());
    println!("  Public key: {}", signer.address().green());
    println!("  Secret key: {}", signer.secret_strkey().yellow());
    println!(
        "\n{}",
        "Store the secret in DEBENTURE_SECRET_KEY and fund the account before use.".bright_black()
    );
    Ok(())
}
