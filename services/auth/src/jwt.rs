//! JWT service for session token generation and validation
//!
//! Tokens are HS256-signed with a shared secret and carry the user id as
//! the subject. They are stateless: validity is signature plus expiry, and
//! the caller re-checks the user record on every request.

use anyhow::Result;
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

use crate::error::{AuthError, AuthResult};

const DEFAULT_SECRET: &str = "fallback_secret_key";
const DEFAULT_EXPIRES_IN: u64 = 7 * 24 * 60 * 60; // 7 days

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Shared secret for signing and verifying tokens
    pub secret: String,
    /// Token lifetime in seconds (default: 7 days)
    pub expires_in: u64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: DEFAULT_SECRET.to_string(),
            expires_in: DEFAULT_EXPIRES_IN,
        }
    }
}

impl JwtConfig {
    /// Create a new JwtConfig from environment variables
    ///
    /// # Environment Variables
    /// - `JWT_SECRET`: signing secret (default: a development fallback, logged as a warning)
    /// - `JWT_EXPIRES_IN`: token lifetime such as `3600`, `30m`, `12h` or `7d` (default: `7d`)
    pub fn from_env() -> Result<Self> {
        let secret = match std::env::var("JWT_SECRET") {
            Ok(secret) if !secret.is_empty() => secret,
            _ => {
                warn!("JWT_SECRET not set, using the development fallback secret");
                DEFAULT_SECRET.to_string()
            }
        };

        let expires_in = match std::env::var("JWT_EXPIRES_IN") {
            Ok(value) => parse_lifetime(&value)
                .ok_or_else(|| anyhow::anyhow!("Invalid JWT_EXPIRES_IN value: {}", value))?,
            Err(_) => DEFAULT_EXPIRES_IN,
        };

        Ok(JwtConfig { secret, expires_in })
    }
}

/// Parse a token lifetime: plain seconds or a number with an `s`, `m`, `h`
/// or `d` suffix
pub fn parse_lifetime(value: &str) -> Option<u64> {
    static LIFETIME_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = LIFETIME_REGEX.get_or_init(|| {
        Regex::new(r"^\s*(\d+)\s*([smhd]?)\s*$").expect("Failed to compile lifetime regex")
    });

    let captures = regex.captures(value)?;
    let amount: u64 = captures[1].parse().ok()?;
    let unit = match &captures[2] {
        "m" => 60,
        "h" => 60 * 60,
        "d" => 24 * 60 * 60,
        _ => 1,
    };

    amount.checked_mul(unit).filter(|seconds| *seconds > 0)
}

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: String,
    /// Issued at time
    pub iat: u64,
    /// Expiration time
    pub exp: u64,
}

impl Claims {
    /// The user id the token was issued for
    pub fn user_id(&self) -> AuthResult<u64> {
        self.sub.parse().map_err(|_| AuthError::TokenInvalid)
    }
}

/// JWT service
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    config: JwtConfig,
}

impl JwtService {
    /// Initialize a new JWT service
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;

        JwtService {
            encoding_key,
            decoding_key,
            validation,
            config,
        }
    }

    /// Generate a session token for a user
    pub fn generate_token(&self, user_id: u64) -> AuthResult<String> {
        let now = now_secs();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now,
            exp: now + self.config.expires_in,
        };

        self.encode_claims(&claims)
    }

    fn encode_claims(&self, claims: &Claims) -> AuthResult<String> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(AuthError::TokenIssue)
    }

    /// Validate a token and return the claims
    pub fn validate_token(&self, token: &str) -> AuthResult<Claims> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!("Token rejected: {}", e);
                match e.kind() {
                    ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                    _ => AuthError::TokenInvalid,
                }
            })
    }

    /// Get the token lifetime in seconds
    pub fn expires_in(&self) -> u64 {
        self.config.expires_in
    }
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
