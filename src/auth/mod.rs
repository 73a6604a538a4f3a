//! Token handling: claim decoding, the trust policy and signature verification.
//!
//! Session construction lives in [`crate::middleware::auth`]; this module only
//! knows about tokens and roles.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("no bearer token provided")]
    Unauthenticated,

    #[error("malformed token: {0}")]
    MalformedToken(String),

    #[error("invalid or expired token: {0}")]
    InvalidToken(String),

    #[error("JWT secret not configured")]
    SecretMissing,

    #[error("JWT generation error: {0}")]
    TokenGeneration(String),
}

/// Role carried in the `userType` claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    JobSeeker,
    Recruiter,
    SuperAdmin,
    Unknown(String),
}

impl Role {
    /// Roles exempted from signature verification when the trust flag is on.
    pub fn is_privileged(&self) -> bool {
        matches!(self, Role::SuperAdmin | Role::Recruiter)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Role::JobSeeker => "JobSeeker",
            Role::Recruiter => "Recruiter",
            Role::SuperAdmin => "Super Admin",
            Role::Unknown(raw) => raw,
        }
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::Unknown(String::new())
    }
}

impl From<String> for Role {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "Super Admin" | "SuperAdmin" => Role::SuperAdmin,
            "Recruiter" => Role::Recruiter,
            "JobSeeker" | "Job Seeker" => Role::JobSeeker,
            _ => Role::Unknown(raw),
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Token payload. Untrusted until it has come back from [`verify`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "userId", deserialize_with = "subject_id")]
    pub user_id: i64,
    #[serde(rename = "userType", default)]
    pub user_type: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
}

impl Claims {
    pub fn new(user_id: i64, user_type: Role, expiry_hours: i64) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            user_type,
            exp: Some((now + Duration::hours(expiry_hours)).timestamp()),
            iat: Some(now.timestamp()),
        }
    }
}

// Issuers have put the subject in as both a number and a numeric string.
fn subject_id<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Subject {
        Number(i64),
        Text(String),
    }

    match Subject::deserialize(deserializer)? {
        Subject::Number(n) => Ok(n),
        Subject::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("userId '{}' is not an integer", s))),
    }
}

/// Which path a request's session is built through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStrategy {
    /// Signature and expiry checked against the shared secret.
    VerifiedSession,
    /// Claims accepted as decoded. Security-relevant shortcut: every use is audited.
    TrustedClaimSession,
}

#[derive(Debug, Clone, Copy)]
pub struct TrustPolicy {
    pub trust_privileged_claims: bool,
}

impl TrustPolicy {
    pub fn new(trust_privileged_claims: bool) -> Self {
        Self { trust_privileged_claims }
    }

    pub fn strategy(&self, role: &Role) -> AuthStrategy {
        if self.trust_privileged_claims && role.is_privileged() {
            AuthStrategy::TrustedClaimSession
        } else {
            AuthStrategy::VerifiedSession
        }
    }
}

/// Decode the payload without checking signature or expiry.
pub fn decode_unverified(token: &str) -> Result<Claims, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation)
        .map(|data| data.claims)
        .map_err(|e| AuthError::MalformedToken(e.to_string()))
}

/// Full HS256 signature and expiry verification.
pub fn verify(token: &str, secret: &str) -> Result<Claims, AuthError> {
    if secret.is_empty() {
        return Err(AuthError::SecretMissing);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::new(Algorithm::HS256);

    decode::<Claims>(token, &decoding_key, &validation)
        .map(|data| data.claims)
        .map_err(|e| AuthError::InvalidToken(e.to_string()))
}

pub fn generate_jwt(claims: &Claims, secret: &str) -> Result<String, AuthError> {
    if secret.is_empty() {
        return Err(AuthError::SecretMissing);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), claims, &encoding_key)
        .map_err(|e| AuthError::TokenGeneration(e.to_string()))
}
