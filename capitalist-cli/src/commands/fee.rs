//! Fee command - look up the fee for a document

use std::path::Path;

use anyhow::Result;
use colored::Colorize;
use rust_decimal::Decimal;

use super::get_client;

pub fn run(
    config_path: &Path,
    document_type: &str,
    source_account: &str,
    amount: Decimal,
    dest_account: Option<&str>,
    wiretag: Option<&str>,
    json: bool,
) -> Result<()> {
    let client = get_client(config_path)?;
    let data =
        client.get_document_fee(document_type, source_account, amount, dest_account, wiretag)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&data)?);
        return Ok(());
    }

    println!("{} {} from {}", "Fee for".bold(), document_type, source_account);
    match data.as_object() {
        Some(fields) => {
            for (key, value) in fields {
                let value = value.as_str().map(str::to_string).unwrap_or_else(|| value.to_string());
                println!("  {}: {}", key, value);
            }
        }
        None => println!("  {}", data),
    }

    Ok(())
}
