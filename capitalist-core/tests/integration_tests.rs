//! Integration tests for the Capitalist client
//!
//! The network is replaced by the scripted `MockTransport`; everything above
//! it (handshake, envelopes, retries, encryption, signing) runs for real.
//!
//! Run with: cargo test --test integration_tests -- --nocapture

use std::str::FromStr;
use std::sync::Arc;

use base64::Engine;
use rsa::pkcs8::DecodePrivateKey;
use rsa::traits::PublicKeyParts;
use rsa::{Pkcs1v15Encrypt, Pkcs1v15Sign, RsaPrivateKey};
use rust_decimal::Decimal;
use serde_json::json;
use sha1::{Digest, Sha1};
use tempfile::TempDir;

use capitalist_core::adapters::mock::MockTransport;
use capitalist_core::domain::{InternationalCardPayment, WalletPayment};
use capitalist_core::{
    BatchAccounts, Capitalist, Error, ErrorKind, Payload, Payment, RateType,
};

// ============================================================================
// Test Helpers
// ============================================================================

const TEST_KEY_PEM: &str = include_str!("fixtures/test_key.pem");

fn test_key() -> RsaPrivateKey {
    RsaPrivateKey::from_pkcs8_pem(TEST_KEY_PEM).expect("fixture key should parse")
}

/// Mock with a successful handshake already queued
fn authenticated_mock() -> Arc<MockTransport> {
    let key = test_key();
    let mock = Arc::new(MockTransport::new());
    mock.push_token("session-token", &key.n().to_str_radix(16), &key.e().to_str_radix(16));
    mock
}

fn client(mock: &Arc<MockTransport>) -> Capitalist<Arc<MockTransport>> {
    Capitalist::with_transport(Arc::clone(mock), "demo-login", "demo-password")
}

fn signing_client(mock: &Arc<MockTransport>) -> Capitalist<Arc<MockTransport>> {
    client(mock)
        .with_private_key(TEST_KEY_PEM.as_bytes())
        .expect("fixture key should load")
}

fn qiwi(number: &str, amount: &str, internal_id: &str) -> Payment {
    Payment::Qiwi(WalletPayment {
        number: number.to_string(),
        amount: Decimal::from_str(amount).unwrap(),
        currency: "UAH".to_string(),
        internal_id: internal_id.to_string(),
        destination: None,
    })
}

fn batch_accounts() -> BatchAccounts {
    BatchAccounts {
        rur: "R0000001".to_string(),
        usd: "U0000002".to_string(),
        eur: "E0000003".to_string(),
        btc: "B0000004".to_string(),
    }
}

// ============================================================================
// Authentication
// ============================================================================

#[test]
fn test_every_request_carries_session_credentials() {
    let mock = authenticated_mock();
    mock.push_ok(json!({"accounts": []}))
        .push_ok(json!({"rates": {"buy": [], "sell": [], "uahSell": []}}));

    let client = client(&mock);
    client.accounts().unwrap();
    client.currency_rates().unwrap();

    assert_eq!(
        mock.operations(),
        vec!["get_token", "get_accounts", "currency_rates"]
    );

    let key = test_key();
    for request in &mock.requests()[1..] {
        assert_eq!(request["login"], "demo-login");
        assert_eq!(request["token"], "session-token");

        let ciphertext = hex::decode(request["encrypted_password"].as_str().unwrap()).unwrap();
        let clear = key.decrypt(Pkcs1v15Encrypt, &ciphertext).unwrap();
        assert_eq!(clear, b"demo-password");
    }
}

#[test]
fn test_expired_token_is_not_refreshed() {
    let mock = authenticated_mock();
    mock.push_ok(json!({"accounts": []}))
        .push_rejection(10, "token expired");

    let client = client(&mock);
    client.accounts().unwrap();

    let err = client.accounts().unwrap_err();
    assert!(matches!(err, Error::Rejected { code: 10, .. }));
    assert_eq!(mock.count("get_token"), 1);
}

// ============================================================================
// Accounts and rates
// ============================================================================

#[test]
fn test_accounts_preserve_server_order() {
    let mock = authenticated_mock();
    mock.push_ok(json!({
        "accounts": [
            {"name": "Zeta", "balance": "1.00", "blockedAmount": "0", "currency": "USD", "number": "U9"},
            {"name": "Alpha", "balance": "250.50", "blockedAmount": "50.50", "currency": "RUR", "number": "R1"},
            {"name": "Mid", "balance": 3, "blockedAmount": 0, "currency": "EUR", "number": "E5"}
        ]
    }));

    let accounts = client(&mock).accounts().unwrap();
    let numbers: Vec<&str> = accounts.iter().map(|a| a.number.as_str()).collect();
    assert_eq!(numbers, vec!["U9", "R1", "E5"]);

    assert_eq!(accounts[1].name, "Alpha");
    assert_eq!(accounts[1].balance, Decimal::new(25050, 2));
    assert_eq!(accounts[1].blocked_amount, Decimal::new(5050, 2));
    assert_eq!(accounts[1].available(), Decimal::new(200, 0));
}

#[test]
fn test_accounts_with_bad_entry_is_malformed() {
    let mock = authenticated_mock();
    mock.push_ok(json!({"accounts": [{"name": "no numbers"}]}));

    let err = client(&mock).accounts().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedResponse);
}

#[test]
fn test_single_buy_rate() {
    let mock = authenticated_mock();
    mock.push_ok(json!({
        "rates": {
            "buy": [{"amount": "1", "amountCur": "USD", "target": "UAH"}],
            "sell": [],
            "uahSell": []
        }
    }));

    let rates = client(&mock).currency_rates().unwrap();
    assert_eq!(rates.len(), 1);
    assert_eq!(rates[0].rate_type, RateType::Buy);
    assert_eq!(rates[0].amount, Decimal::ONE);
    assert_eq!(rates[0].amount_currency, "USD");
    assert_eq!(rates[0].target_currency, "UAH");
}

#[test]
fn test_rates_ordered_by_type_then_entry() {
    let mock = authenticated_mock();
    mock.push_ok(json!({
        "rates": {
            "uahSell": [{"amount": "41.2", "amountCur": "EUR", "target": "UAH"}],
            "sell": [
                {"amount": "90", "amountCur": "USD", "target": "RUR"},
                {"amount": "0.9", "amountCur": "USD", "target": "EUR"}
            ],
            "buy": [{"amount": "100", "amountCur": "EUR", "target": "RUR"}]
        }
    }));

    let rates = client(&mock).currency_rates().unwrap();
    let tags: Vec<(RateType, &str)> = rates
        .iter()
        .map(|r| (r.rate_type, r.target_currency.as_str()))
        .collect();
    assert_eq!(
        tags,
        vec![
            (RateType::Buy, "RUR"),
            (RateType::Sell, "RUR"),
            (RateType::Sell, "EUR"),
            (RateType::UahSell, "UAH"),
        ]
    );
}

// ============================================================================
// Batch import
// ============================================================================

#[test]
fn test_import_batch_signs_exact_batch_text() {
    let mock = authenticated_mock();
    mock.push_ok(json!({"batch_id": "B-42"}));

    let payments = vec![
        qiwi("380991234567", "10.50", "abc1"),
        Payment::CardCis(InternationalCardPayment {
            card_number: "4111111111111111".to_string(),
            amount: Decimal::new(2000, 2),
            currency: "USD".to_string(),
            internal_id: "abc2".to_string(),
            destination: None,
            card_first_name: Some("IVAN".to_string()),
            card_last_name: Some("PETROV".to_string()),
            birthday_date: None,
            address: None,
            country_alpha2: Some("KZ".to_string()),
            city: None,
            card_expiration_month: Some("01".to_string()),
            card_expiration_year: Some("2030".to_string()),
        }),
    ];

    let result = signing_client(&mock)
        .import_batch_advanced(&payments, &batch_accounts())
        .unwrap();
    assert_eq!(result["batch_id"], "B-42");

    let request = &mock.requests()[1];
    let batch = request["batch"].as_str().unwrap();
    assert_eq!(
        batch,
        "QIWI;380991234567;10.50;UAH;abc1\nSNGCARD;4111111111111111;20.00;USD;abc2;IVAN;PETROV;KZ;01;2030"
    );
    assert_eq!(request["operation"], "import_batch_advanced");
    assert_eq!(request["verification_type"], "SIGNATURE");
    assert_eq!(request["account_RUR"], "R0000001");
    assert_eq!(request["account_USD"], "U0000002");
    assert_eq!(request["account_EUR"], "E0000003");
    assert_eq!(request["account_BTC"], "B0000004");

    let signature = base64::engine::general_purpose::STANDARD
        .decode(request["verification_data"].as_str().unwrap())
        .unwrap();
    let public_key = test_key().to_public_key();
    assert!(public_key
        .verify(Pkcs1v15Sign::new::<Sha1>(), &Sha1::digest(batch.as_bytes()), &signature)
        .is_ok());
}

#[test]
fn test_import_batch_without_key_makes_no_calls() {
    let mock = Arc::new(MockTransport::new());

    let err = client(&mock)
        .import_batch_advanced(&[qiwi("1", "1", "x")], &batch_accounts())
        .unwrap_err();

    assert!(matches!(err, Error::ImproperlyConfigured(_)));
    assert!(mock.requests().is_empty());
}

#[test]
fn test_import_batch_rejection_is_not_resubmitted() {
    let mock = authenticated_mock();
    mock.push_rejection(21, "insufficient funds");

    let err = signing_client(&mock)
        .import_batch_advanced(&[qiwi("1", "1", "x")], &batch_accounts())
        .unwrap_err();

    assert!(matches!(err, Error::Rejected { code: 21, .. }));
    assert_eq!(mock.count("import_batch_advanced"), 1);
}

#[test]
fn test_private_key_from_file() {
    let temp_dir = TempDir::new().unwrap();
    let key_path = temp_dir.path().join("batch.pem");
    std::fs::write(&key_path, TEST_KEY_PEM).unwrap();

    let mock = Arc::new(MockTransport::new());
    let client = client(&mock).with_private_key_file(&key_path).unwrap();
    assert!(client.has_signer());

    let missing = temp_dir.path().join("missing.pem");
    let err = Capitalist::with_transport(MockTransport::new(), "l", "p")
        .with_private_key_file(&missing)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
}

// ============================================================================
// Retries
// ============================================================================

#[test]
fn test_transport_failures_retried_up_to_bound() {
    let mock = authenticated_mock();
    mock.push_failure("reset").push_failure("reset").push_ok(json!({"accounts": []}));

    let accounts = client(&mock).accounts().unwrap();
    assert!(accounts.is_empty());
    assert_eq!(mock.count("get_accounts"), 3);
    assert_eq!(mock.count("get_token"), 1);
}

#[test]
fn test_transport_failure_exhaustion_surfaces_transport_error() {
    let mock = authenticated_mock();
    for _ in 0..3 {
        mock.push_failure("unreachable");
    }
    mock.push_ok(json!({"accounts": []}));

    let err = client(&mock).accounts().unwrap_err();
    match err {
        Error::Transport(failure) => {
            assert_eq!(failure.operation(), Some("get_accounts"));
            assert_eq!(failure.request()["token"], "session-token");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(mock.count("get_accounts"), 3);
    assert_eq!(mock.remaining(), 1);
}

#[test]
fn test_raw_operations_return_data() {
    let mock = authenticated_mock();
    mock.push_ok(json!({"fee": "1.25", "currency": "USD"}))
        .push_ok(json!({"records": [{"state": "PROCESSED"}], "total": 40}));

    let client = client(&mock);
    let fee = client
        .get_document_fee("IMPORT_BATCH", "U0000002", Decimal::new(100, 0), Some("U7"), None)
        .unwrap();
    assert_eq!(fee["fee"], "1.25");

    let info = client.get_batch_info_paged("B-42", 20, 20).unwrap();
    assert_eq!(info["total"], 40);

    let requests = mock.requests();
    assert_eq!(requests[2]["page_size"], 20);
    assert_eq!(requests[2]["start_offset"], 20);

    let fee_request: &Payload = &requests[1];
    assert_eq!(fee_request["document_type"], "IMPORT_BATCH");
    assert_eq!(fee_request["dest_account"], "U7");
    assert!(!fee_request.contains_key("wiretag"));
}
