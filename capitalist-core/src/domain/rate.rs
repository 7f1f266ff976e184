//! Currency rate domain model

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::account::deserialize_amount;

/// Rate table a quote comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RateType {
    #[serde(rename = "buy")]
    Buy,
    #[serde(rename = "sell")]
    Sell,
    #[serde(rename = "uahSell")]
    UahSell,
}

impl RateType {
    /// Every rate table, in the order results are reported
    pub const ALL: [RateType; 3] = [RateType::Buy, RateType::Sell, RateType::UahSell];

    /// Key under `data.rates`
    pub fn as_str(&self) -> &'static str {
        match self {
            RateType::Buy => "buy",
            RateType::Sell => "sell",
            RateType::UahSell => "uahSell",
        }
    }
}

impl fmt::Display for RateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wire shape of one entry under `data.rates[type]`
#[derive(Debug, Deserialize)]
struct RateEntry {
    #[serde(deserialize_with = "deserialize_amount")]
    amount: Decimal,
    #[serde(rename = "amountCur")]
    amount_cur: String,
    target: String,
}

/// A single conversion quote
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrencyRate {
    #[serde(rename = "type")]
    pub rate_type: RateType,
    pub amount: Decimal,
    pub amount_currency: String,
    pub target_currency: String,
}

impl CurrencyRate {
    /// Parse one rate entry, tagging it with the table it was listed under
    pub fn parse_json(value: &JsonValue, rate_type: RateType) -> serde_json::Result<Self> {
        let entry = RateEntry::deserialize(value)?;
        Ok(Self {
            rate_type,
            amount: entry.amount,
            amount_currency: entry.amount_cur,
            target_currency: entry.target,
        })
    }
}
