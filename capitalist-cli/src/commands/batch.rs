//! Batch commands - submit signed payment batches and inspect them

use std::path::Path;

use anyhow::{Context, Result};
use capitalist_core::domain::payment::render_batch;
use capitalist_core::{BatchAccounts, Payment};
use colored::Colorize;

use super::get_client;
use crate::output::{create_table, format_amount, success, warning};

/// Read a JSON array of payments
fn load_payments(file: &Path) -> Result<Vec<Payment>> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read payments file {}", file.display()))?;
    let payments: Vec<Payment> = serde_json::from_str(&content)
        .with_context(|| format!("Invalid payments file {}", file.display()))?;
    Ok(payments)
}

pub fn run_import(
    config_path: &Path,
    file: &Path,
    accounts: &BatchAccounts,
    dry_run: bool,
    json: bool,
) -> Result<()> {
    let payments = load_payments(file)?;
    if payments.is_empty() {
        anyhow::bail!("Payments file {} contains no payments", file.display());
    }

    if dry_run {
        let batch = render_batch(&payments);
        if json {
            println!("{}", serde_json::to_string_pretty(&serde_json::json!({ "batch": batch }))?);
            return Ok(());
        }

        warning("DRY RUN - batch not submitted");
        println!();

        let mut table = create_table();
        table.set_header(vec!["#", "Amount", "Record"]);
        for (i, (payment, line)) in payments.iter().zip(batch.lines()).enumerate() {
            table.add_row(vec![
                (i + 1).to_string(),
                format_amount(payment.amount(), payment.currency()),
                line.to_string(),
            ]);
        }
        println!("{}", table);
        return Ok(());
    }

    let client = get_client(config_path)?;
    let data = client.import_batch_advanced(&payments, accounts)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&data)?);
        return Ok(());
    }

    success(&format!("Submitted batch of {} payments", payments.len()));
    if let Some(batch_id) = data.get("batch_id") {
        let batch_id = batch_id
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| batch_id.to_string());
        println!("  Batch ID: {}", batch_id);
    }

    Ok(())
}

pub fn run_info(
    config_path: &Path,
    batch_id: &str,
    page_size: u32,
    start_offset: u32,
    json: bool,
) -> Result<()> {
    let client = get_client(config_path)?;
    let data = client.get_batch_info_paged(batch_id, page_size, start_offset)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&data)?);
        return Ok(());
    }

    println!("{} {}", "Batch".bold(), batch_id);
    println!("{}", serde_json::to_string_pretty(&data)?);

    Ok(())
}
