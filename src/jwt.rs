//! JSON Web Token issuance and validation
//! Author: kartik4091
//! Created: 2025-06-04
//!
//! Compact JWS tokens signed with HMAC-SHA2 (HS256/384/512) or RSA PKCS#1
//! v1.5 (RS256/384/512). HMAC secrets must be at least as long as the hash
//! output of the chosen algorithm, so 32 bytes for HS256.

use std::fmt;
use std::str::FromStr;
use std::time::Duration as StdDuration;

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine as _;
use chrono::{DateTime, TimeDelta, Utc};
use hmac::digest::KeyInit;
use hmac::{Hmac, Mac};
use openssl::hash::MessageDigest;
use openssl::pkey::PKey;
use openssl::rsa::Rsa;
use openssl::sign::{Signer, Verifier};
use rand::RngCore;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Sha256, Sha384, Sha512};
use tracing::{debug, instrument};

use crate::config::JwtConfig;
use crate::error::{Error, ErrorKind, Result};

pub const TOKEN_PREFIX: &str = "Bearer ";
pub const MIN_SECRET_LEN: usize = 32;
pub const RSA_KEY_BITS: u32 = 2048;

const ACCESS_TOKEN_LIFETIME_SECS: i64 = 60 * 60;
const REFRESH_TOKEN_LIFETIME_SECS: i64 = 7 * 24 * 60 * 60;
const REFRESH_GRACE_PERIOD_SECS: i64 = 24 * 60 * 60;
const RESERVED_CLAIMS: [&str; 3] = ["sub", "iat", "exp"];

/// Supported signing algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Algorithm {
    HS256,
    HS384,
    HS512,
    RS256,
    RS384,
    RS512,
}

impl Algorithm {
    pub fn as_str(self) -> &'static str {
        match self {
            Algorithm::HS256 => "HS256",
            Algorithm::HS384 => "HS384",
            Algorithm::HS512 => "HS512",
            Algorithm::RS256 => "RS256",
            Algorithm::RS384 => "RS384",
            Algorithm::RS512 => "RS512",
        }
    }

    pub fn is_hmac(self) -> bool {
        matches!(self, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512)
    }

    /// Minimum HMAC key length in bytes.
    fn min_key_len(self) -> usize {
        match self {
            Algorithm::HS384 => 48,
            Algorithm::HS512 => 64,
            _ => MIN_SECRET_LEN,
        }
    }

    fn message_digest(self) -> MessageDigest {
        match self {
            Algorithm::HS256 | Algorithm::RS256 => MessageDigest::sha256(),
            Algorithm::HS384 | Algorithm::RS384 => MessageDigest::sha384(),
            Algorithm::HS512 | Algorithm::RS512 => MessageDigest::sha512(),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "HS256" => Ok(Algorithm::HS256),
            "HS384" => Ok(Algorithm::HS384),
            "HS512" => Ok(Algorithm::HS512),
            "RS256" => Ok(Algorithm::RS256),
            "RS384" => Ok(Algorithm::RS384),
            "RS512" => Ok(Algorithm::RS512),
            other => Err(Error::TokenUnsupported(format!("Unsupported algorithm: {}", other))),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Header {
    alg: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    typ: Option<String>,
}

/// Decoded token payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    #[serde(flatten)]
    pub custom: Map<String, Value>,
}

impl Claims {
    /// Registered claims in `custom` are ignored; the explicit fields win.
    pub fn new(subject: &str, custom: &Map<String, Value>, issued_at: DateTime<Utc>, ttl: TimeDelta) -> Result<Self> {
        let expires = issued_at
            .checked_add_signed(ttl)
            .ok_or_else(|| Error::validation("Token lifetime out of range"))?;
        let mut custom = custom.clone();
        for key in RESERVED_CLAIMS {
            custom.remove(key);
        }
        Ok(Self {
            sub: Some(subject.to_string()),
            iat: Some(issued_at.timestamp()),
            exp: Some(expires.timestamp()),
            custom,
        })
    }

    /// Looks up a registered or custom claim by name.
    pub fn get(&self, key: &str) -> Option<Value> {
        match key {
            "sub" => self.sub.clone().map(Value::from),
            "iat" => self.iat.map(Value::from),
            "exp" => self.exp.map(Value::from),
            _ => self.custom.get(key).cloned(),
        }
    }

    pub fn expiration(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|exp| DateTime::from_timestamp(exp, 0))
    }

    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        self.iat.and_then(|iat| DateTime::from_timestamp(iat, 0))
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.exp.map_or(false, |exp| now.timestamp() > exp)
    }
}

/// Outcome of a detailed validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenValidationResult {
    valid: bool,
    message: String,
}

impl TokenValidationResult {
    fn new(valid: bool, message: impl Into<String>) -> Self {
        Self {
            valid,
            message: message.into(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// PEM-encoded RSA key pair
#[derive(Debug, Clone)]
pub struct RsaKeyPair {
    pub private_pem: String,
    pub public_pem: String,
}

/// Key material used to check a signature
enum VerifyKey<'a> {
    Secret(&'a [u8]),
    RsaPublicPem(&'a [u8]),
}

// Input checks

fn require_secret(secret: &[u8]) -> Result<()> {
    if secret.iter().all(u8::is_ascii_whitespace) {
        return Err(Error::validation("Secret key cannot be empty"));
    }
    Ok(())
}

fn require_text(value: &str, what: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::validation(format!("{} cannot be empty", what)));
    }
    Ok(())
}

fn require_key_len(secret: &[u8], alg: Algorithm) -> Result<()> {
    if secret.len() < alg.min_key_len() {
        return Err(Error::validation(format!(
            "{} requires a secret of at least {} bytes, got {}",
            alg,
            alg.min_key_len(),
            secret.len()
        )));
    }
    Ok(())
}

// Signing primitives

fn keyed_mac<M: Mac + KeyInit>(key: &[u8], data: &[u8]) -> Result<M> {
    let mut mac = <M as KeyInit>::new_from_slice(key)
        .map_err(|_| Error::validation("Invalid HMAC key length"))?;
    Mac::update(&mut mac, data);
    Ok(mac)
}

fn hmac_sign(alg: Algorithm, key: &[u8], data: &[u8]) -> Result<Vec<u8>> {
    let tag = match alg {
        Algorithm::HS256 => keyed_mac::<Hmac<Sha256>>(key, data)?.finalize().into_bytes().to_vec(),
        Algorithm::HS384 => keyed_mac::<Hmac<Sha384>>(key, data)?.finalize().into_bytes().to_vec(),
        Algorithm::HS512 => keyed_mac::<Hmac<Sha512>>(key, data)?.finalize().into_bytes().to_vec(),
        other => return Err(Error::TokenUnsupported(format!("{} is not an HMAC algorithm", other))),
    };
    Ok(tag)
}

/// Constant-time tag comparison.
fn hmac_verify(alg: Algorithm, key: &[u8], data: &[u8], signature: &[u8]) -> Result<bool> {
    let matches = match alg {
        Algorithm::HS256 => keyed_mac::<Hmac<Sha256>>(key, data)?.verify_slice(signature).is_ok(),
        Algorithm::HS384 => keyed_mac::<Hmac<Sha384>>(key, data)?.verify_slice(signature).is_ok(),
        Algorithm::HS512 => keyed_mac::<Hmac<Sha512>>(key, data)?.verify_slice(signature).is_ok(),
        other => return Err(Error::TokenUnsupported(format!("{} is not an HMAC algorithm", other))),
    };
    Ok(matches)
}

fn rsa_sign(alg: Algorithm, private_pem: &[u8], data: &[u8]) -> Result<Vec<u8>> {
    let key = PKey::private_key_from_pem(private_pem)?;
    let mut signer = Signer::new(alg.message_digest(), &key)?;
    signer.update(data)?;
    Ok(signer.sign_to_vec()?)
}

fn rsa_verify(alg: Algorithm, public_pem: &[u8], data: &[u8], signature: &[u8]) -> Result<bool> {
    let key = PKey::public_key_from_pem(public_pem)?;
    let mut verifier = Verifier::new(alg.message_digest(), &key)?;
    verifier.update(data)?;
    // openssl reports a malformed signature as an error stack, not `false`
    Ok(verifier.verify(signature).unwrap_or(false))
}

// Encoding

fn encode_segment<T: Serialize>(value: &T) -> Result<String> {
    Ok(URL_SAFE_NO_PAD.encode(serde_json::to_vec(value)?))
}

fn decode_segment(segment: &str, what: &str) -> Result<Vec<u8>> {
    URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|e| Error::TokenMalformed(format!("Invalid base64 in {}: {}", what, e)))
}

fn encode_token(claims: &Claims, alg: Algorithm, sign: impl FnOnce(&[u8]) -> Result<Vec<u8>>) -> Result<String> {
    let header = Header {
        alg: alg.as_str().to_string(),
        typ: Some("JWT".to_string()),
    };
    let signing_input = format!("{}.{}", encode_segment(&header)?, encode_segment(claims)?);
    let signature = sign(signing_input.as_bytes())?;
    Ok(format!("{}.{}", signing_input, URL_SAFE_NO_PAD.encode(signature)))
}

/// Token split into its decoded parts
struct ParsedToken<'a> {
    alg: Algorithm,
    claims: Claims,
    signing_input: &'a str,
    signature: Vec<u8>,
}

fn parse_token(token: &str) -> Result<ParsedToken<'_>> {
    let token = token.trim();
    let (signing_input, signature_b64) = token
        .rsplit_once('.')
        .ok_or_else(|| Error::TokenMalformed("JWT must have three segments".into()))?;
    let (header_b64, payload_b64) = signing_input
        .split_once('.')
        .ok_or_else(|| Error::TokenMalformed("JWT must have three segments".into()))?;
    if payload_b64.contains('.') {
        return Err(Error::TokenMalformed("JWT must have three segments".into()));
    }

    let header: Header = serde_json::from_slice(&decode_segment(header_b64, "header")?)
        .map_err(|e| Error::TokenMalformed(format!("Invalid header: {}", e)))?;
    let alg: Algorithm = header.alg.parse()?;
    if signature_b64.is_empty() {
        return Err(Error::TokenUnsupported("Unsigned tokens are not accepted".into()));
    }

    let claims: Claims = serde_json::from_slice(&decode_segment(payload_b64, "payload")?)
        .map_err(|e| Error::TokenMalformed(format!("Invalid claims: {}", e)))?;
    let signature = decode_segment(signature_b64, "signature")?;

    Ok(ParsedToken {
        alg,
        claims,
        signing_input,
        signature,
    })
}

/// Checks the signature only; expiry is left to the caller.
fn decode_verified(key: VerifyKey<'_>, token: &str) -> Result<(Algorithm, Claims)> {
    let parsed = parse_token(token)?;
    let data = parsed.signing_input.as_bytes();

    let valid = match key {
        VerifyKey::Secret(secret) => {
            if !parsed.alg.is_hmac() {
                return Err(Error::TokenUnsupported(format!(
                    "{} tokens cannot be verified with a shared secret",
                    parsed.alg
                )));
            }
            require_key_len(secret, parsed.alg)?;
            hmac_verify(parsed.alg, secret, data, &parsed.signature)?
        }
        VerifyKey::RsaPublicPem(pem) => {
            if parsed.alg.is_hmac() {
                return Err(Error::TokenUnsupported(format!(
                    "{} tokens cannot be verified with an RSA key",
                    parsed.alg
                )));
            }
            rsa_verify(parsed.alg, pem, data, &parsed.signature)?
        }
    };

    if !valid {
        return Err(Error::InvalidSignature);
    }
    Ok((parsed.alg, parsed.claims))
}

fn check_expiry(claims: Claims) -> Result<Claims> {
    if claims.is_expired_at(Utc::now()) {
        let subject = claims.sub.clone().unwrap_or_default();
        return Err(Error::TokenExpired(format!("Token for '{}' has expired", subject)));
    }
    Ok(claims)
}

// Issuance

/// HS256 token for `subject` that expires after `ttl`. A negative `ttl` yields an expired token.
#[instrument(skip(secret, claims))]
pub fn generate_token(
    secret: impl AsRef<[u8]>,
    subject: &str,
    claims: &Map<String, Value>,
    ttl: TimeDelta,
) -> Result<String> {
    generate_token_with_algorithm(secret, subject, claims, ttl, Algorithm::HS256)
}

pub fn generate_access_token(secret: impl AsRef<[u8]>, subject: &str, claims: &Map<String, Value>) -> Result<String> {
    generate_token(secret, subject, claims, TimeDelta::seconds(ACCESS_TOKEN_LIFETIME_SECS))
}

/// Seven-day token tagged `token_type=refresh`.
pub fn generate_refresh_token(secret: impl AsRef<[u8]>, subject: &str) -> Result<String> {
    let mut claims = Map::new();
    claims.insert("token_type".into(), Value::from("refresh"));
    generate_token(secret, subject, &claims, TimeDelta::seconds(REFRESH_TOKEN_LIFETIME_SECS))
}

#[instrument(skip(secret, claims))]
pub fn generate_token_with_algorithm(
    secret: impl AsRef<[u8]>,
    subject: &str,
    claims: &Map<String, Value>,
    ttl: TimeDelta,
    alg: Algorithm,
) -> Result<String> {
    let secret = secret.as_ref();
    require_secret(secret)?;
    require_text(subject, "Subject")?;
    if !alg.is_hmac() {
        return Err(Error::validation(format!("{} needs an RSA private key", alg)));
    }
    require_key_len(secret, alg)?;

    let claims = Claims::new(subject, claims, Utc::now(), ttl)?;
    encode_token(&claims, alg, |data| hmac_sign(alg, secret, data))
}

/// Signs with a PEM-encoded RSA private key (PKCS#1 or PKCS#8).
#[instrument(skip(private_pem, claims))]
pub fn generate_token_with_rsa_key(
    private_pem: &[u8],
    subject: &str,
    claims: &Map<String, Value>,
    ttl: TimeDelta,
    alg: Algorithm,
) -> Result<String> {
    if private_pem.is_empty() {
        return Err(Error::validation("Private key cannot be empty"));
    }
    require_text(subject, "Subject")?;
    if alg.is_hmac() {
        return Err(Error::validation(format!("{} needs a shared secret", alg)));
    }

    let claims = Claims::new(subject, claims, Utc::now(), ttl)?;
    encode_token(&claims, alg, |data| rsa_sign(alg, private_pem, data))
}

// Validation and extraction

pub fn validate_token(secret: impl AsRef<[u8]>, token: &str) -> bool {
    match extract_claims(secret, token) {
        Ok(_) => true,
        Err(e) => {
            debug!("Token rejected: {}", e);
            false
        }
    }
}

pub fn validate_token_with_rsa_key(public_pem: &[u8], token: &str) -> bool {
    let result = require_text(token, "Token")
        .and_then(|_| decode_verified(VerifyKey::RsaPublicPem(public_pem), token))
        .and_then(|(_, claims)| check_expiry(claims));
    match result {
        Ok(_) => true,
        Err(e) => {
            debug!("Token rejected: {}", e);
            false
        }
    }
}

/// Verifies signature and expiry, then returns the payload.
pub fn extract_claims(secret: impl AsRef<[u8]>, token: &str) -> Result<Claims> {
    let secret = secret.as_ref();
    require_secret(secret)?;
    require_text(token, "Token")?;
    let (_, claims) = decode_verified(VerifyKey::Secret(secret), token)?;
    check_expiry(claims)
}

pub fn extract_claims_safely(secret: impl AsRef<[u8]>, token: &str) -> Option<Claims> {
    extract_claims(secret, token)
        .map_err(|e| debug!("Could not extract claims: {}", e))
        .ok()
}

pub fn extract_subject(secret: impl AsRef<[u8]>, token: &str) -> Result<String> {
    extract_claims(secret, token)?
        .sub
        .ok_or_else(|| Error::TokenMalformed("Token has no subject".into()))
}

pub fn extract_subject_safely(secret: impl AsRef<[u8]>, token: &str) -> Option<String> {
    extract_subject(secret, token)
        .map_err(|e| debug!("Could not extract subject: {}", e))
        .ok()
}

/// `Ok(true)` for a correctly signed token past its expiry.
pub fn is_token_expired(secret: impl AsRef<[u8]>, token: &str) -> Result<bool> {
    let secret = secret.as_ref();
    require_secret(secret)?;
    require_text(token, "Token")?;
    let (_, claims) = decode_verified(VerifyKey::Secret(secret), token)?;
    Ok(claims.is_expired_at(Utc::now()))
}

pub fn extract_claim(secret: impl AsRef<[u8]>, token: &str, key: &str) -> Result<Option<Value>> {
    Ok(extract_claims(secret, token)?.get(key))
}

/// A present claim of the wrong shape is a parse error.
pub fn extract_claim_as<T: DeserializeOwned>(secret: impl AsRef<[u8]>, token: &str, key: &str) -> Result<Option<T>> {
    match extract_claim(secret, token, key)? {
        Some(value) => serde_json::from_value(value)
            .map(Some)
            .map_err(|e| Error::parse(format!("Claim '{}' has an unexpected type: {}", key, e))),
        None => Ok(None),
    }
}

pub fn extract_claim_or_default<T: DeserializeOwned>(
    secret: impl AsRef<[u8]>,
    token: &str,
    key: &str,
    default: T,
) -> T {
    match extract_claim_as(secret, token, key) {
        Ok(Some(value)) => value,
        Ok(None) => default,
        Err(e) => {
            debug!("Falling back to default for claim '{}': {}", key, e);
            default
        }
    }
}

fn refresh_with_grace(secret: &[u8], token: &str, ttl: TimeDelta, grace: TimeDelta) -> Result<String> {
    require_secret(secret)?;
    require_text(token, "Token")?;
    let (alg, claims) = decode_verified(VerifyKey::Secret(secret), token)?;

    let now = Utc::now();
    if let Some(expired_at) = claims.expiration().filter(|_| claims.is_expired_at(now)) {
        if now - expired_at > grace {
            return Err(Error::TokenExpired("Token expired beyond refresh grace period".into()));
        }
        debug!("Refreshing an expired token");
    }

    let subject = claims
        .sub
        .clone()
        .ok_or_else(|| Error::TokenMalformed("Token has no subject".into()))?;
    let renewed = Claims::new(&subject, &claims.custom, now, ttl)?;
    encode_token(&renewed, alg, |data| hmac_sign(alg, secret, data))
}

/// Re-issues `token` with a fresh lifetime. Tokens that expired within the
/// last 24 hours are still accepted.
#[instrument(skip(secret, token))]
pub fn refresh_token(secret: impl AsRef<[u8]>, token: &str, ttl: TimeDelta) -> Result<String> {
    refresh_with_grace(secret.as_ref(), token, ttl, TimeDelta::seconds(REFRESH_GRACE_PERIOD_SECS))
}

/// True when the token expires within `buffer`, or already has.
pub fn is_token_expiring_soon(secret: impl AsRef<[u8]>, token: &str, buffer: TimeDelta) -> Result<bool> {
    let secret = secret.as_ref();
    require_secret(secret)?;
    require_text(token, "Token")?;
    let (_, claims) = decode_verified(VerifyKey::Secret(secret), token)?;
    match claims.expiration() {
        Some(exp) => Ok(exp - Utc::now() < buffer),
        None => Ok(false),
    }
}

pub fn get_expiration_date(secret: impl AsRef<[u8]>, token: &str) -> Result<DateTime<Utc>> {
    extract_claims(secret, token)?
        .expiration()
        .ok_or_else(|| Error::TokenMalformed("Token has no expiration".into()))
}

/// Time left before expiry, zero once expired.
pub fn get_token_remaining_time(secret: impl AsRef<[u8]>, token: &str) -> Result<StdDuration> {
    match get_expiration_date(secret, token) {
        Ok(exp) => Ok((exp - Utc::now()).to_std().unwrap_or(StdDuration::ZERO)),
        Err(e) if e.kind() == ErrorKind::TokenExpired => Ok(StdDuration::ZERO),
        Err(e) => Err(e),
    }
}

/// Payload of a structurally valid token, without checking signature or expiry.
pub fn decode_token_without_validation(token: &str) -> Result<Claims> {
    require_text(token, "Token")?;
    Ok(parse_token(token)?.claims)
}

pub fn validate_token_with_details(secret: impl AsRef<[u8]>, token: &str) -> TokenValidationResult {
    let secret = secret.as_ref();
    if require_secret(secret).is_err() || token.trim().is_empty() {
        return TokenValidationResult::new(false, "JWT token is empty or null");
    }
    match extract_claims(secret, token) {
        Ok(_) => TokenValidationResult::new(true, "Valid"),
        Err(Error::TokenExpired(_)) => TokenValidationResult::new(false, "Token is expired"),
        Err(Error::TokenUnsupported(_)) => TokenValidationResult::new(false, "Unsupported JWT token format"),
        Err(Error::TokenMalformed(_)) => TokenValidationResult::new(false, "Malformed JWT token"),
        Err(Error::InvalidSignature) => TokenValidationResult::new(false, "Invalid JWT signature"),
        Err(e) => TokenValidationResult::new(false, format!("JWT token validation failed: {}", e)),
    }
}

// Keys and headers

/// Base64 of 32 random bytes, suitable for HS256.
pub fn generate_random_secret_key() -> String {
    let mut key = [0u8; MIN_SECRET_LEN];
    rand::thread_rng().fill_bytes(&mut key);
    STANDARD.encode(key)
}

pub fn generate_rsa_key_pair() -> Result<RsaKeyPair> {
    let rsa = Rsa::generate(RSA_KEY_BITS)?;
    let key = PKey::from_rsa(rsa)?;
    let private_pem = String::from_utf8(key.private_key_to_pem_pkcs8()?)
        .map_err(|e| Error::parse(e.to_string()))?;
    let public_pem = String::from_utf8(key.public_key_to_pem()?)
        .map_err(|e| Error::parse(e.to_string()))?;
    Ok(RsaKeyPair {
        private_pem,
        public_pem,
    })
}

/// Decodes a base64 HMAC secret and checks its length.
pub fn parse_secret_key(encoded: &str) -> Result<Vec<u8>> {
    require_text(encoded, "Secret key")?;
    let key = STANDARD
        .decode(encoded.trim())
        .map_err(|e| Error::parse(format!("Secret key is not valid base64: {}", e)))?;
    require_key_len(&key, Algorithm::HS256)?;
    Ok(key)
}

pub fn extract_token_from_header(header: &str) -> Option<String> {
    extract_token_with_prefix(header, TOKEN_PREFIX)
}

fn extract_token_with_prefix(header: &str, prefix: &str) -> Option<String> {
    let token = header.strip_prefix(prefix)?.trim();
    (!token.is_empty()).then(|| token.to_string())
}

pub fn create_authorization_header(token: &str) -> Result<String> {
    require_text(token, "Token")?;
    Ok(format!("{}{}", TOKEN_PREFIX, token))
}

/// Issues and checks HS256 tokens under a configured lifetime policy
pub struct TokenService {
    secret: Vec<u8>,
    config: JwtConfig,
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("secret", &"<redacted>")
            .field("config", &self.config)
            .finish()
    }
}

impl TokenService {
    pub fn new(secret: impl Into<Vec<u8>>, config: JwtConfig) -> Result<Self> {
        let secret = secret.into();
        require_secret(&secret)?;
        require_key_len(&secret, Algorithm::HS256)?;
        Ok(Self { secret, config })
    }

    pub fn config(&self) -> &JwtConfig {
        &self.config
    }

    pub fn issue_access_token(&self, subject: &str, claims: &Map<String, Value>) -> Result<String> {
        generate_token(
            &self.secret,
            subject,
            claims,
            TimeDelta::seconds(self.config.access_token_lifetime_secs),
        )
    }

    pub fn issue_refresh_token(&self, subject: &str) -> Result<String> {
        let mut claims = Map::new();
        claims.insert("token_type".into(), Value::from("refresh"));
        generate_token(
            &self.secret,
            subject,
            &claims,
            TimeDelta::seconds(self.config.refresh_token_lifetime_secs),
        )
    }

    pub fn validate(&self, token: &str) -> TokenValidationResult {
        validate_token_with_details(&self.secret, token)
    }

    pub fn claims(&self, token: &str) -> Result<Claims> {
        extract_claims(&self.secret, token)
    }

    /// New access token, honouring the configured grace period for expired input.
    pub fn refresh(&self, token: &str) -> Result<String> {
        refresh_with_grace(
            &self.secret,
            token,
            TimeDelta::seconds(self.config.access_token_lifetime_secs),
            TimeDelta::seconds(self.config.refresh_grace_period_secs),
        )
    }

    pub fn token_from_header(&self, header: &str) -> Option<String> {
        extract_token_with_prefix(header, &self.config.token_prefix)
    }

    pub fn authorization_header(&self, token: &str) -> Result<String> {
        require_text(token, "Token")?;
        Ok(format!("{}{}", self.config.token_prefix, token))
    }
}
