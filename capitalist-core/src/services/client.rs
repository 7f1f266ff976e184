//! Capitalist API client
//!
//! Builds authenticated envelopes, dispatches them through the transport and
//! turns the replies into domain values.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use serde_json::Value as JsonValue;

use crate::adapters::http::HttpTransport;
use crate::config::Config;
use crate::domain::payment::{render_batch, BatchRecord};
use crate::domain::result::{Error, Result};
use crate::domain::{Account, CurrencyRate, RateType};
use crate::ports::{Payload, Transport};
use crate::services::auth::{Authenticator, Signer};
use crate::services::envelope;
use crate::services::retry::RetryPolicy;

/// Verification method sent with signed batches
const VERIFICATION_TYPE_SIGNATURE: &str = "SIGNATURE";

/// Settlement accounts per currency for a batch import
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchAccounts {
    pub rur: String,
    pub usd: String,
    pub eur: String,
    pub btc: String,
}

/// Client for the Capitalist payment API
///
/// Owns one transport, one authenticator bound to it and, when a private
/// key was supplied, one signer. Calls block until the reply (and any
/// retries) are done.
pub struct Capitalist<T: Transport = HttpTransport> {
    login: String,
    transport: Arc<T>,
    authenticator: Authenticator<T>,
    signer: Option<Signer>,
    retry: RetryPolicy,
}

impl Capitalist<HttpTransport> {
    /// Client against the production API (or `CAPITALIST_API_URL`)
    pub fn new(login: &str, password: &str) -> Result<Self> {
        let transport = HttpTransport::new().map_err(|e| Error::Config(format!("{:#}", e)))?;
        Ok(Self::with_transport(transport, login, password))
    }

    /// Client built from a loaded configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;

        let transport =
            HttpTransport::with_options(&config.api_url, Duration::from_secs(config.timeout_secs))
                .map_err(|e| Error::Config(format!("{:#}", e)))?;

        let client = Self::with_transport(transport, &config.login, &config.password)
            .with_retry_settings(config.max_attempts, Duration::from_millis(config.retry_delay_ms));

        match &config.private_key_path {
            Some(path) => client.with_private_key_file(path),
            None => Ok(client),
        }
    }
}

impl<T: Transport> Capitalist<T> {
    /// Client over any transport
    pub fn with_transport(transport: T, login: &str, password: &str) -> Self {
        let transport = Arc::new(transport);
        let authenticator = Authenticator::new(Arc::clone(&transport), login, password);
        Self {
            login: login.to_string(),
            transport,
            authenticator,
            signer: None,
            retry: RetryPolicy::transport(),
        }
    }

    /// Enable batch signing with a PEM private key
    pub fn with_private_key(mut self, pem: &[u8]) -> Result<Self> {
        self.signer = Some(Signer::from_pem(pem)?);
        Ok(self)
    }

    /// Enable batch signing with a PEM private key read from disk
    pub fn with_private_key_file(self, path: &Path) -> Result<Self> {
        let pem = std::fs::read(path)?;
        self.with_private_key(&pem)
    }

    /// Change attempt bound and delay for both requests and the handshake.
    /// The retryable error kinds of each stay as they are.
    pub fn with_retry_settings(mut self, max_attempts: u32, delay: Duration) -> Self {
        self.retry = self.retry.with_max_attempts(max_attempts).with_delay(delay);
        self.authenticator = self.authenticator.with_retry_policy(
            RetryPolicy::token_fetch()
                .with_max_attempts(max_attempts)
                .with_delay(delay),
        );
        self
    }

    pub fn login(&self) -> &str {
        &self.login
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn authenticator(&self) -> &Authenticator<T> {
        &self.authenticator
    }

    pub fn has_signer(&self) -> bool {
        self.signer.is_some()
    }

    /// Send an authenticated request and return the `data` of the reply
    ///
    /// `data` carries the operation-specific fields; `operation`, `login`,
    /// `token` and `encrypted_password` are added (and win over any
    /// same-named field). Network failures are retried; rejections are not.
    pub fn secure_request(&self, operation: &str, data: Payload) -> Result<JsonValue> {
        self.retry.run(operation, || {
            let session = self.authenticator.session()?;

            let mut payload = data.clone();
            payload.insert("operation".to_string(), JsonValue::from(operation));
            payload.insert("login".to_string(), JsonValue::from(self.login.as_str()));
            payload.insert("token".to_string(), JsonValue::from(session.token()));
            payload.insert(
                "encrypted_password".to_string(),
                JsonValue::from(session.encrypted_password().password()?),
            );

            tracing::debug!(operation, transport = self.transport.name(), "sending request");
            let response = self.transport.request(&payload)?;
            envelope::into_data(response)
        })
    }

    /// All accounts, in server order
    pub fn accounts(&self) -> Result<Vec<Account>> {
        let data = self.secure_request("get_accounts", Payload::new())?;
        let accounts = data
            .get("accounts")
            .and_then(JsonValue::as_array)
            .ok_or_else(|| Error::malformed("missing `accounts` list"))?;

        accounts
            .iter()
            .map(|value| {
                Account::parse_json(value)
                    .map_err(|e| Error::malformed(format!("invalid account: {}", e)))
            })
            .collect()
    }

    /// Conversion rates, grouped by table (buy, sell, uahSell) in that order
    pub fn currency_rates(&self) -> Result<Vec<CurrencyRate>> {
        let data = self.secure_request("currency_rates", Payload::new())?;
        let tables = data
            .get("rates")
            .ok_or_else(|| Error::malformed("missing `rates` object"))?;

        let mut rates = Vec::new();
        for rate_type in RateType::ALL {
            let entries = tables
                .get(rate_type.as_str())
                .and_then(JsonValue::as_array)
                .ok_or_else(|| {
                    Error::malformed(format!("missing `rates.{}` list", rate_type.as_str()))
                })?;

            for entry in entries {
                let rate = CurrencyRate::parse_json(entry, rate_type).map_err(|e| {
                    Error::malformed(format!("invalid {} rate: {}", rate_type.as_str(), e))
                })?;
                rates.push(rate);
            }
        }
        Ok(rates)
    }

    /// Sign and submit a batch of payments
    ///
    /// Requires a private key; without one this fails before any network call.
    pub fn import_batch_advanced<R: BatchRecord>(
        &self,
        payments: &[R],
        accounts: &BatchAccounts,
    ) -> Result<JsonValue> {
        let signer = self.signer.as_ref().ok_or_else(|| {
            Error::improperly_configured(
                "Provide private key and/or passphrase to be able to sign data.",
            )
        })?;

        let batch = render_batch(payments);
        let signature = signer.sign(batch.as_bytes())?;

        let mut data = Payload::new();
        data.insert("batch".to_string(), JsonValue::from(batch));
        data.insert(
            "verification_type".to_string(),
            JsonValue::from(VERIFICATION_TYPE_SIGNATURE),
        );
        data.insert("verification_data".to_string(), JsonValue::from(signature));
        data.insert("account_RUR".to_string(), JsonValue::from(accounts.rur.as_str()));
        data.insert("account_USD".to_string(), JsonValue::from(accounts.usd.as_str()));
        data.insert("account_EUR".to_string(), JsonValue::from(accounts.eur.as_str()));
        data.insert("account_BTC".to_string(), JsonValue::from(accounts.btc.as_str()));

        tracing::info!(records = payments.len(), "submitting signed batch");
        self.secure_request("import_batch_advanced", data)
    }

    /// Fee the server would charge for a document
    ///
    /// `dest_account` and `wiretag` are only sent when non-empty.
    pub fn get_document_fee(
        &self,
        document_type: &str,
        source_account: &str,
        amount: Decimal,
        dest_account: Option<&str>,
        wiretag: Option<&str>,
    ) -> Result<JsonValue> {
        let mut data = Payload::new();
        data.insert("document_type".to_string(), JsonValue::from(document_type));
        data.insert("source_account".to_string(), JsonValue::from(source_account));
        data.insert("amount".to_string(), JsonValue::from(amount.to_string()));
        if let Some(dest_account) = dest_account.filter(|s| !s.is_empty()) {
            data.insert("dest_account".to_string(), JsonValue::from(dest_account));
        }
        if let Some(wiretag) = wiretag.filter(|s| !s.is_empty()) {
            data.insert("wiretag".to_string(), JsonValue::from(wiretag));
        }
        self.secure_request("get_document_fee", data)
    }

    /// First record of a batch
    pub fn get_batch_info(&self, batch_id: &str) -> Result<JsonValue> {
        self.get_batch_info_paged(batch_id, 1, 0)
    }

    /// A page of batch records
    pub fn get_batch_info_paged(
        &self,
        batch_id: &str,
        page_size: u32,
        start_offset: u32,
    ) -> Result<JsonValue> {
        let mut data = Payload::new();
        data.insert("batch_id".to_string(), JsonValue::from(batch_id));
        data.insert("page_size".to_string(), JsonValue::from(page_size));
        data.insert("start_offset".to_string(), JsonValue::from(start_offset));
        self.secure_request("get_batch_info", data)
    }
}

impl<T: Transport> std::fmt::Debug for Capitalist<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Capitalist")
            .field("login", &self.login)
            .field("transport", &self.transport.name())
            .field("signer", &self.signer.is_some())
            .field("retry", &self.retry)
            .finish()
    }
}
