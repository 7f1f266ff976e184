//! Authentication and signing
//!
//! The API authenticates every call with a session token plus the account
//! password encrypted under a server-supplied RSA public key (PKCS#1 v1.5).
//! Batch imports are additionally signed with the client's own RSA key
//! (PKCS#1 v1.5 over SHA-1).

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use base64::Engine;
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs8::DecodePrivateKey;
use rsa::rand_core::CryptoRngCore;
use rsa::{BigUint, Pkcs1v15Encrypt, Pkcs1v15Sign, RsaPrivateKey, RsaPublicKey};
use serde_json::Value as JsonValue;
use sha1::{Digest, Sha1};

use crate::domain::result::{Error, Result};
use crate::ports::{Payload, Transport};
use crate::services::envelope::{self, required_str};
use crate::services::retry::RetryPolicy;

// =============================================================================
// Password encryption
// =============================================================================

/// Account password bound to the server's RSA public key
///
/// Each call to [`password`](Self::password) produces a fresh ciphertext:
/// PKCS#1 v1.5 encryption pads with random bytes, so two results for the
/// same password differ. Only decryption on the server side is stable.
#[derive(Clone)]
pub struct EncryptedPassword {
    password: Vec<u8>,
    public_key: RsaPublicKey,
}

impl EncryptedPassword {
    /// Build from the clear password and the hex modulus/exponent of `get_token`
    pub fn new(password: &str, modulus_hex: &str, exponent_hex: &str) -> Result<Self> {
        let modulus = parse_hex_uint(modulus_hex, "modulus")?;
        let exponent = parse_hex_uint(exponent_hex, "exponent")?;
        let public_key = RsaPublicKey::new(modulus, exponent)
            .map_err(|e| Error::KeyMaterial(format!("unusable RSA public key: {}", e)))?;

        Ok(Self {
            password: password.as_bytes().to_vec(),
            public_key,
        })
    }

    pub fn public_key(&self) -> &RsaPublicKey {
        &self.public_key
    }

    /// Encrypt the password and hex-encode the ciphertext
    pub fn password(&self) -> Result<String> {
        self.password_with_rng(&mut rand::thread_rng())
    }

    /// Same as [`password`](Self::password) with a caller-supplied RNG
    pub fn password_with_rng<R: CryptoRngCore>(&self, rng: &mut R) -> Result<String> {
        let ciphertext = self.public_key.encrypt(rng, Pkcs1v15Encrypt, &self.password)?;
        Ok(hex::encode(ciphertext))
    }
}

impl fmt::Debug for EncryptedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptedPassword")
            .field("password", &"<redacted>")
            .field("public_key", &self.public_key)
            .finish()
    }
}

/// Parse an unsigned big integer written in hex (optional `0x` prefix)
fn parse_hex_uint(value: &str, what: &str) -> Result<BigUint> {
    let digits = value.trim();
    let digits = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
        .unwrap_or(digits);

    if digits.is_empty() {
        return Err(Error::KeyMaterial(format!("empty RSA {}", what)));
    }

    let invalid = || Error::KeyMaterial(format!("RSA {} is not valid hex: {:?}", what, value));
    // parse_bytes tolerates '_' separators and a leading '+'
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(invalid());
    }

    BigUint::parse_bytes(digits.as_bytes(), 16).ok_or_else(invalid)
}

// =============================================================================
// Batch signing
// =============================================================================

/// Signs batch payloads with the client's private key
pub struct Signer {
    key: RsaPrivateKey,
}

impl Signer {
    /// Load an unencrypted PEM private key (PKCS#8 or PKCS#1)
    pub fn from_pem(pem: &[u8]) -> Result<Self> {
        let pem = std::str::from_utf8(pem)
            .map_err(|_| Error::KeyMaterial("private key is not valid PEM text".to_string()))?;

        if pem.contains("ENCRYPTED") {
            return Err(Error::KeyMaterial(
                "passphrase-protected private keys are not supported".to_string(),
            ));
        }

        let key = RsaPrivateKey::from_pkcs8_pem(pem)
            .or_else(|_| RsaPrivateKey::from_pkcs1_pem(pem))
            .map_err(|e| Error::KeyMaterial(format!("failed to parse private key: {}", e)))?;

        Ok(Self { key })
    }

    /// SHA-1 digest of `message`, signed with PKCS#1 v1.5, base64-encoded
    ///
    /// Deterministic: the same key and message always give the same signature.
    pub fn sign(&self, message: &[u8]) -> Result<String> {
        let digest = Sha1::digest(message);
        let signature = self.key.sign(Pkcs1v15Sign::new::<Sha1>(), &digest)?;
        Ok(base64::engine::general_purpose::STANDARD.encode(signature))
    }

    pub fn public_key(&self) -> RsaPublicKey {
        self.key.to_public_key()
    }
}

impl fmt::Debug for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signer").finish_non_exhaustive()
    }
}

// =============================================================================
// Session handshake
// =============================================================================

/// Credentials established by one `get_token` handshake
#[derive(Debug, Clone)]
pub struct Session {
    token: String,
    encrypted_password: EncryptedPassword,
}

impl Session {
    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn encrypted_password(&self) -> &EncryptedPassword {
        &self.encrypted_password
    }
}

#[derive(Debug)]
enum AuthState {
    Unauthenticated,
    Authenticated(Session),
}

/// Fetches and caches the session token and encrypted password
///
/// Starts unauthenticated; the first access to the session performs the
/// handshake. The state lock is held for the whole handshake, so threads
/// racing on first access trigger exactly one `get_token` call. The session
/// is kept for the lifetime of the authenticator: there is no expiry or
/// refresh, and a later rejection does not re-authenticate.
pub struct Authenticator<T: Transport> {
    transport: Arc<T>,
    login: String,
    password: String,
    retry: RetryPolicy,
    state: Mutex<AuthState>,
}

impl<T: Transport> Authenticator<T> {
    pub fn new(transport: Arc<T>, login: &str, password: &str) -> Self {
        Self {
            transport,
            login: login.to_string(),
            password: password.to_string(),
            retry: RetryPolicy::token_fetch(),
            state: Mutex::new(AuthState::Unauthenticated),
        }
    }

    /// Replace the handshake retry policy
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn login(&self) -> &str {
        &self.login
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(*self.lock_state(), AuthState::Authenticated(_))
    }

    /// Perform the handshake now, replacing any cached session
    pub fn setup(&self) -> Result<()> {
        let mut state = self.lock_state();
        *state = AuthState::Authenticated(self.handshake()?);
        Ok(())
    }

    /// Return the cached session, performing the handshake if there is none
    pub fn session(&self) -> Result<Session> {
        let mut state = self.lock_state();
        if let AuthState::Authenticated(session) = &*state {
            return Ok(session.clone());
        }

        let session = self.handshake()?;
        *state = AuthState::Authenticated(session.clone());
        Ok(session)
    }

    /// Make sure a session exists without handing it out
    pub fn ensure_authenticated(&self) -> Result<()> {
        self.session().map(|_| ())
    }

    /// Session token, authenticating first if needed
    pub fn token(&self) -> Result<String> {
        Ok(self.session()?.token)
    }

    /// Encrypted password, authenticating first if needed
    pub fn encrypted_password(&self) -> Result<EncryptedPassword> {
        Ok(self.session()?.encrypted_password)
    }

    fn lock_state(&self) -> MutexGuard<'_, AuthState> {
        // The state is only ever replaced whole, so a poisoned lock still holds a valid value
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn handshake(&self) -> Result<Session> {
        let data = self.retry.run("get_token", || self.request_token())?;

        let token = required_str(&data, "token")?;
        let modulus = required_str(&data, "modulus")?;
        let exponent = required_str(&data, "exponent")?;
        let encrypted_password = EncryptedPassword::new(&self.password, modulus, exponent)?;

        tracing::info!(login = %self.login, "session established");
        Ok(Session {
            token: token.to_string(),
            encrypted_password,
        })
    }

    fn request_token(&self) -> Result<JsonValue> {
        let mut payload = Payload::new();
        payload.insert("operation".to_string(), JsonValue::from("get_token"));
        payload.insert("login".to_string(), JsonValue::from(self.login.as_str()));

        tracing::debug!(operation = "get_token", "requesting session token");
        let response = self.transport.request(&payload)?;
        envelope::into_data(response)
    }
}

impl<T: Transport> fmt::Debug for Authenticator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Authenticator")
            .field("transport", &self.transport.name())
            .field("login", &self.login)
            .field("authenticated", &self.is_authenticated())
            .finish_non_exhaustive()
    }
}
