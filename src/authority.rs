use crate::{AuthError, TokenVerifier};

pub const UCLIF_HOST: &str = "uclif.philonas.net";
pub const UCLIF_AUTHORIZE_URL: &str = "https://uclif.philonas.net/oauth2/authorize";
pub const UCLIF_TOKEN_URL: &str = "https://uclif.philonas.net/oauth2/token";

pub(crate) const UCLIF_PUBLIC_KEY: &str = "-----BEGIN PUBLIC KEY-----
MFkwEwYHKoZIzj0CAQYIKoZIzj0DAQcDQgAEpu+SHlObpG0B98efRA94sAsTcLc1
usiRZlk80e3mTajFPJy+cIt2/ZxP6AiUOtsT8HLO7JX0OB79ff4oUF7m0g==
-----END PUBLIC KEY-----
";

/// The authorization server a flow talks to: where users are sent, where
/// codes are exchanged, and how its tokens are verified.
#[derive(Debug, Clone)]
pub struct Authority {
    authorize_url: String,
    token_url: String,
    verifier: TokenVerifier,
}

impl Authority {
    pub fn uclif() -> Result<Self, AuthError> {
        Ok(Self::new(
            UCLIF_AUTHORIZE_URL,
            UCLIF_TOKEN_URL,
            TokenVerifier::uclif()?,
        ))
    }

    pub fn new(
        authorize_url: impl Into<String>,
        token_url: impl Into<String>,
        verifier: TokenVerifier,
    ) -> Self {
        Self {
            authorize_url: authorize_url.into(),
            token_url: token_url.into(),
            verifier,
        }
    }

    pub fn authorize_url(&self) -> &str {
        &self.authorize_url
    }

    pub fn token_url(&self) -> &str {
        &self.token_url
    }

    pub fn verifier(&self) -> &TokenVerifier {
        &self.verifier
    }
}
