//! Signature and claim verification for tokens issued by the authorization
//! server.
//!
//! A [`TokenVerifier`] holds one ES256 public key and the issuer it belongs
//! to. Tokens are accepted only if the signature matches under ES256, the
//! `exp`, `nbf` and `iat` claims are present and consistent with the current
//! time, `iss` equals the issuer, and `aud` equals `<client_id>@<issuer>`.
//!
//! Every rejection surfaces as [`AuthError::InvalidToken`]; the reason is only
//! logged.

use std::fmt;

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, get_current_timestamp};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::AuthError;
use crate::authority::{UCLIF_HOST, UCLIF_PUBLIC_KEY};
use crate::error::Diagnostic;

const ALGORITHM: Algorithm = Algorithm::ES256;
const REQUIRED_CLAIMS: [&str; 5] = ["exp", "nbf", "iat", "iss", "aud"];
const MAX_LEEWAY: u64 = 3600;

#[derive(Clone)]
pub struct TokenVerifier {
    key: DecodingKey,
    issuer: String,
    leeway: u64,
}

impl TokenVerifier {
    /// Verifier for the production authorization server.
    pub fn uclif() -> Result<Self, AuthError> {
        Self::from_ec_pem(UCLIF_PUBLIC_KEY, UCLIF_HOST)
    }

    /// Builds a verifier from a PEM-encoded P-256 public key.
    pub fn from_ec_pem(pem: &str, issuer: impl Into<String>) -> Result<Self, AuthError> {
        let key = DecodingKey::from_ec_pem(pem.as_bytes()).map_err(|_| AuthError::InvalidKey)?;
        Ok(Self {
            key,
            issuer: issuer.into(),
            leeway: 0,
        })
    }

    /// Clock skew tolerated on `exp`, `nbf` and `iat`, in seconds. Capped at
    /// one hour.
    pub fn with_leeway(mut self, seconds: u64) -> Self {
        self.leeway = seconds.min(MAX_LEEWAY);
        self
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn algorithm(&self) -> Algorithm {
        ALGORITHM
    }

    /// The only audience a token for `client_id` may carry.
    pub fn audience_for(&self, client_id: &str) -> String {
        format!("{client_id}@{}", self.issuer)
    }

    pub fn decode_and_verify(&self, token: &str, client_id: &str) -> Result<Claims, AuthError> {
        self.verify(token, client_id).map_err(|reason| {
            debug!(client_id, %reason, "rejected token");
            AuthError::InvalidToken
        })
    }

    pub(crate) fn verify(&self, token: &str, client_id: &str) -> Result<Claims, Diagnostic> {
        let mut validation = Validation::new(ALGORITHM);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[self.audience_for(client_id)]);
        validation.set_required_spec_claims(&REQUIRED_CLAIMS);
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.leeway = self.leeway;

        let data = decode::<RawClaims>(token, &self.key, &validation)
            .map_err(|err| Diagnostic::from(&err))?;
        let raw = data.claims;

        let iat = raw.iat.ok_or(Diagnostic::MissingClaim)?;
        if iat > get_current_timestamp().saturating_add(self.leeway) {
            return Err(Diagnostic::IssuedInFuture);
        }

        Ok(Claims {
            iss: raw.iss,
            aud: raw.aud,
            iat,
            nbf: raw.nbf,
            exp: raw.exp,
            jti: raw.jti,
            extra: raw.extra,
        })
    }
}

impl fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("issuer", &self.issuer)
            .field("algorithm", &ALGORITHM)
            .field("leeway", &self.leeway)
            .finish_non_exhaustive()
    }
}

#[derive(Deserialize)]
struct RawClaims {
    iss: String,
    aud: String,
    iat: Option<u64>,
    nbf: u64,
    exp: u64,
    jti: Option<String>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

/// Payload of a token that passed verification.
///
/// Only [`TokenVerifier::decode_and_verify`] produces values of this type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Claims {
    iss: String,
    aud: String,
    iat: u64,
    nbf: u64,
    exp: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    jti: Option<String>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl Claims {
    pub fn issuer(&self) -> &str {
        &self.iss
    }

    pub fn audience(&self) -> &str {
        &self.aud
    }

    /// Unix timestamps, in seconds.
    pub fn issued_at(&self) -> u64 {
        self.iat
    }

    pub fn not_before(&self) -> u64 {
        self.nbf
    }

    pub fn expires_at(&self) -> u64 {
        self.exp
    }

    pub fn token_id(&self) -> Option<&str> {
        self.jti.as_deref()
    }

    /// Identity or scope claim by name, e.g. `"email"` or `"groups"`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.extra.get(name)
    }

    pub fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }
}
