//! Accounts command - list accounts and balances

use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use super::get_client;
use crate::output::{create_table, format_amount, warning};

pub fn run(config_path: &Path, json: bool) -> Result<()> {
    let client = get_client(config_path)?;
    let accounts = client.accounts()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&accounts)?);
        return Ok(());
    }

    if accounts.is_empty() {
        warning("No accounts found.");
        return Ok(());
    }

    println!("{}", "Accounts".bold());
    println!();

    let mut table = create_table();
    table.set_header(vec!["Number", "Name", "Balance", "Blocked", "Available"]);
    for account in &accounts {
        table.add_row(vec![
            account.number.clone(),
            account.name.clone(),
            format_amount(account.balance, &account.currency),
            format_amount(account.blocked_amount, &account.currency),
            format_amount(account.available(), &account.currency),
        ]);
    }
    println!("{}", table);

    Ok(())
}
