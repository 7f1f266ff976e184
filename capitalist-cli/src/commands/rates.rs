//! Rates command - show currency conversion rates

use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use super::get_client;
use crate::output::{create_table, warning};

pub fn run(config_path: &Path, json: bool) -> Result<()> {
    let client = get_client(config_path)?;
    let rates = client.currency_rates()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&rates)?);
        return Ok(());
    }

    if rates.is_empty() {
        warning("The server returned no rates.");
        return Ok(());
    }

    println!("{}", "Currency Rates".bold());
    println!();

    let mut table = create_table();
    table.set_header(vec!["Type", "Amount", "From", "To"]);
    for rate in &rates {
        table.add_row(vec![
            rate.rate_type.to_string(),
            rate.amount.to_string(),
            rate.amount_currency.clone(),
            rate.target_currency.clone(),
        ]);
    }
    println!("{}", table);

    Ok(())
}
