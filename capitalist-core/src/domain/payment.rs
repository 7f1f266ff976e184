//! Payment records for batch import
//!
//! Each payment renders to one `;`-separated line: the payee method codename
//! followed by the field values in a fixed per-method order. Unset optional
//! fields are dropped from the line entirely. The rendered batch is what gets
//! signed, so the exact text matters byte for byte.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Separator between fields of a batch record
pub const FIELD_SEPARATOR: &str = ";";

/// Separator between records of a batch
pub const RECORD_SEPARATOR: &str = "\n";

/// Something that can be written as a line of a batch file
pub trait BatchRecord {
    /// Payee method codename, the first field of the record
    fn codename(&self) -> &'static str;

    /// Field values in wire order; `None` means the field is unset
    fn fields(&self) -> Vec<Option<String>>;

    /// Render the record line
    fn as_batch_record(&self) -> String {
        std::iter::once(self.codename().to_string())
            .chain(self.fields().into_iter().flatten())
            .collect::<Vec<_>>()
            .join(FIELD_SEPARATOR)
    }
}

/// Transfer to another Capitalist account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InternalPayment {
    pub capitalist_id: String,
    pub amount: Decimal,
    pub currency: String,
    pub internal_id: String,
    #[serde(default)]
    pub destination: Option<String>,
}

/// Transfer to a WebMoney purse, optionally with protection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebMoneyPayment {
    pub wm_id: String,
    pub amount: Decimal,
    pub currency: String,
    pub internal_id: String,
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub protection_code: Option<String>,
    #[serde(default)]
    pub protection_period: Option<u32>,
}

/// Payout to a Russian bank card with holder name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardRussianPayment {
    pub card_number: String,
    pub amount: Decimal,
    pub currency: String,
    pub internal_id: String,
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

/// Payout to a card identified by number only
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardPayment {
    pub card_number: String,
    pub amount: Decimal,
    pub currency: String,
    pub internal_id: String,
    #[serde(default)]
    pub destination: Option<String>,
}

/// Payout to an international card, with full cardholder details
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InternationalCardPayment {
    pub card_number: String,
    pub amount: Decimal,
    pub currency: String,
    pub internal_id: String,
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub card_first_name: Option<String>,
    #[serde(default)]
    pub card_last_name: Option<String>,
    #[serde(default)]
    pub birthday_date: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub country_alpha2: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub card_expiration_month: Option<String>,
    #[serde(default)]
    pub card_expiration_year: Option<String>,
}

/// Payout to an e-wallet or a mobile phone balance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletPayment {
    pub number: String,
    pub amount: Decimal,
    pub currency: String,
    pub internal_id: String,
    #[serde(default)]
    pub destination: Option<String>,
}

/// A single batch payment, tagged by payee method
///
/// Methods sharing a field layout share a payload type; the variant alone
/// decides the codename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Payment {
    Internal(InternalPayment),
    WebMoney(WebMoneyPayment),
    CardRussian(CardRussianPayment),
    #[serde(rename = "card2card_russian")]
    Card2CardRussian(CardPayment),
    CardUkrainian(CardPayment),
    CardWorldwide(InternationalCardPayment),
    CardCis(InternationalCardPayment),
    Yandex(WalletPayment),
    Qiwi(WalletPayment),
    #[serde(rename = "megafon")]
    MegaFon(WalletPayment),
    Beeline(WalletPayment),
    Mts(WalletPayment),
    Tele2(WalletPayment),
}

impl Payment {
    /// Amount being paid out
    pub fn amount(&self) -> Decimal {
        match self {
            Payment::Internal(p) => p.amount,
            Payment::WebMoney(p) => p.amount,
            Payment::CardRussian(p) => p.amount,
            Payment::Card2CardRussian(p) | Payment::CardUkrainian(p) => p.amount,
            Payment::CardWorldwide(p) | Payment::CardCis(p) => p.amount,
            Payment::Yandex(p)
            | Payment::Qiwi(p)
            | Payment::MegaFon(p)
            | Payment::Beeline(p)
            | Payment::Mts(p)
            | Payment::Tele2(p) => p.amount,
        }
    }

    /// Currency of the amount
    pub fn currency(&self) -> &str {
        match self {
            Payment::Internal(p) => &p.currency,
            Payment::WebMoney(p) => &p.currency,
            Payment::CardRussian(p) => &p.currency,
            Payment::Card2CardRussian(p) | Payment::CardUkrainian(p) => &p.currency,
            Payment::CardWorldwide(p) | Payment::CardCis(p) => &p.currency,
            Payment::Yandex(p)
            | Payment::Qiwi(p)
            | Payment::MegaFon(p)
            | Payment::Beeline(p)
            | Payment::Mts(p)
            | Payment::Tele2(p) => &p.currency,
        }
    }
}

impl BatchRecord for Payment {
    fn codename(&self) -> &'static str {
        match self {
            Payment::Internal(_) => "CAPITALIST",
            Payment::WebMoney(_) => "WM",
            Payment::CardRussian(_) => "RUCARD",
            Payment::Card2CardRussian(_) => "RUCARDP2P_DYN",
            Payment::CardUkrainian(_) => "UKRCARD",
            Payment::CardWorldwide(_) => "WORLDCARD",
            Payment::CardCis(_) => "SNGCARD",
            Payment::Yandex(_) => "YANDEX",
            Payment::Qiwi(_) => "QIWI",
            Payment::MegaFon(_) => "MEGAFON",
            Payment::Beeline(_) => "BEELINE",
            Payment::Mts(_) => "MTS",
            Payment::Tele2(_) => "TELE2",
        }
    }

    fn fields(&self) -> Vec<Option<String>> {
        match self {
            Payment::Internal(p) => vec![
                Some(p.capitalist_id.clone()),
                Some(p.amount.to_string()),
                Some(p.currency.clone()),
                Some(p.internal_id.clone()),
                p.destination.clone(),
            ],
            Payment::WebMoney(p) => vec![
                Some(p.wm_id.clone()),
                Some(p.amount.to_string()),
                Some(p.currency.clone()),
                Some(p.internal_id.clone()),
                p.destination.clone(),
                p.protection_code.clone(),
                p.protection_period.map(|days| days.to_string()),
            ],
            Payment::CardRussian(p) => vec![
                Some(p.card_number.clone()),
                Some(p.amount.to_string()),
                Some(p.currency.clone()),
                Some(p.internal_id.clone()),
                p.destination.clone(),
                p.first_name.clone(),
                p.last_name.clone(),
            ],
            Payment::Card2CardRussian(p) | Payment::CardUkrainian(p) => vec![
                Some(p.card_number.clone()),
                Some(p.amount.to_string()),
                Some(p.currency.clone()),
                Some(p.internal_id.clone()),
                p.destination.clone(),
            ],
            Payment::CardWorldwide(p) | Payment::CardCis(p) => vec![
                Some(p.card_number.clone()),
                Some(p.amount.to_string()),
                Some(p.currency.clone()),
                Some(p.internal_id.clone()),
                p.destination.clone(),
                p.card_first_name.clone(),
                p.card_last_name.clone(),
                p.birthday_date.clone(),
                p.address.clone(),
                p.country_alpha2.clone(),
                p.city.clone(),
                p.card_expiration_month.clone(),
                p.card_expiration_year.clone(),
            ],
            Payment::Yandex(p)
            | Payment::Qiwi(p)
            | Payment::MegaFon(p)
            | Payment::Beeline(p)
            | Payment::Mts(p)
            | Payment::Tele2(p) => vec![
                Some(p.number.clone()),
                Some(p.amount.to_string()),
                Some(p.currency.clone()),
                Some(p.internal_id.clone()),
                p.destination.clone(),
            ],
        }
    }
}

/// Render a whole batch: one record per line, no trailing newline
pub fn render_batch<R: BatchRecord>(records: &[R]) -> String {
    records
        .iter()
        .map(BatchRecord::as_batch_record)
        .collect::<Vec<_>>()
        .join(RECORD_SEPARATOR)
}
