//! Core domain entities
//!
//! Value objects parsed from API responses and the payment records sent in
//! batches. Pure data - no I/O.

mod account;
pub mod payment;
mod rate;
pub mod result;

pub use account::Account;
pub use payment::{
    BatchRecord, CardPayment, CardRussianPayment, InternalPayment, InternationalCardPayment,
    Payment, WalletPayment, WebMoneyPayment,
};
pub use rate::{CurrencyRate, RateType};
