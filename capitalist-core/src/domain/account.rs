//! Account domain model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// A Capitalist account snapshot as returned by `get_accounts`
///
/// Wire names follow the API (`blockedAmount`); serializing emits the
/// same names so a snapshot can be stored and re-read verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub name: String,
    #[serde(deserialize_with = "deserialize_amount")]
    pub balance: Decimal,
    #[serde(rename = "blockedAmount", deserialize_with = "deserialize_amount")]
    pub blocked_amount: Decimal,
    /// Currency code, e.g. "RUR", "USD"
    pub currency: String,
    /// Unique account number, e.g. "U0123456"
    #[serde(deserialize_with = "deserialize_number")]
    pub number: String,
}

impl Account {
    /// Parse one entry of `data.accounts`
    pub fn parse_json(value: &JsonValue) -> serde_json::Result<Self> {
        Account::deserialize(value)
    }

    /// Balance not held by pending operations
    pub fn available(&self) -> Decimal {
        self.balance - self.blocked_amount
    }
}

/// Deserialize amount that can be number or string
pub(crate) fn deserialize_amount<'de, D>(deserializer: D) -> std::result::Result<Decimal, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;
    let value: JsonValue = Deserialize::deserialize(deserializer)?;
    match value {
        JsonValue::Number(n) => n
            .to_string()
            .parse::<Decimal>()
            .map_err(|e| D::Error::custom(format!("invalid decimal: {}", e))),
        JsonValue::String(s) => s
            .trim()
            .parse::<Decimal>()
            .map_err(|e| D::Error::custom(format!("invalid decimal: {}", e))),
        _ => Err(D::Error::custom("expected number or string for amount")),
    }
}

/// Account numbers are strings on the wire but tolerate bare numbers
fn deserialize_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;
    let value: JsonValue = Deserialize::deserialize(deserializer)?;
    match value {
        JsonValue::Number(n) => Ok(n.to_string()),
        JsonValue::String(s) => Ok(s),
        _ => Err(D::Error::custom("expected number or string for account number")),
    }
}
