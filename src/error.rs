use thiserror::Error;

/// Everything that can go wrong while building requests, exchanging codes, or
/// verifying tokens.
///
/// `ExchangeFailed` and `InvalidToken` carry no detail; the failing check is
/// only reported through `tracing`.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid client_id")]
    InvalidClientId,

    #[error("invalid client_secret")]
    InvalidClientSecret,

    #[error("invalid redirect_uri")]
    InvalidRedirectUri,

    #[error("invalid code")]
    InvalidCode,

    #[error("invalid state")]
    InvalidState,

    #[error("invalid stored state")]
    InvalidStoredState,

    #[error("at least one scope is required")]
    EmptyScopes,

    #[error("unknown scope: {0:?}")]
    UnknownScope(String),

    #[error("missing {0} in callback")]
    MissingCallbackParameter(&'static str),

    #[error("invalid {0} in callback")]
    InvalidCallbackParameter(&'static str),

    #[error("state mismatch")]
    StateMismatch,

    #[error("authorization denied: {error}")]
    AuthorizationDenied {
        error: String,
        description: Option<String>,
    },

    #[error("token acquisition or validation failed")]
    ExchangeFailed,

    #[error("invalid token")]
    InvalidToken,

    #[error("invalid verification key")]
    InvalidKey,

    #[error("os rng error: {message}")]
    OsRng { message: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("http client error: {0}")]
    Http(#[from] reqwest::Error),

    #[cfg(feature = "local-server")]
    #[error("local server timed out after {timeout:?}")]
    LocalServerTimeout { timeout: std::time::Duration },

    #[cfg(feature = "local-server")]
    #[error("local server error: {message}")]
    LocalServer { message: String },
}

impl AuthError {
    /// Errors raised while constructing a flow from its credentials.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidClientId
                | Self::InvalidClientSecret
                | Self::InvalidRedirectUri
                | Self::InvalidKey
                | Self::Http(_)
        )
    }

    /// Malformed caller input, rejected before any network or crypto work.
    pub fn is_request_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidCode
                | Self::InvalidState
                | Self::InvalidStoredState
                | Self::EmptyScopes
                | Self::UnknownScope(_)
                | Self::MissingCallbackParameter(_)
                | Self::InvalidCallbackParameter(_)
                | Self::StateMismatch
                | Self::AuthorizationDenied { .. }
        )
    }

    /// The remote exchange or the presented token could not be trusted.
    pub fn is_verification_error(&self) -> bool {
        matches!(self, Self::ExchangeFailed | Self::InvalidToken)
    }
}

/// Reason a token or exchange was rejected. Only ever written to logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Diagnostic {
    Transport,
    HttpStatus,
    MalformedBody,
    MissingTokenType,
    WrongTokenType,
    MissingExpiresIn,
    InvalidExpiresIn,
    MissingAccessToken,
    MalformedAccessToken,
    Signature,
    Algorithm,
    Expired,
    NotYetValid,
    IssuedInFuture,
    Issuer,
    Audience,
    MissingClaim,
    Malformed,
}

impl Diagnostic {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Transport => "transport",
            Self::HttpStatus => "http_status",
            Self::MalformedBody => "malformed_body",
            Self::MissingTokenType => "missing_token_type",
            Self::WrongTokenType => "wrong_token_type",
            Self::MissingExpiresIn => "missing_expires_in",
            Self::InvalidExpiresIn => "invalid_expires_in",
            Self::MissingAccessToken => "missing_access_token",
            Self::MalformedAccessToken => "malformed_access_token",
            Self::Signature => "signature",
            Self::Algorithm => "algorithm",
            Self::Expired => "expired",
            Self::NotYetValid => "not_yet_valid",
            Self::IssuedInFuture => "issued_in_future",
            Self::Issuer => "issuer",
            Self::Audience => "audience",
            Self::MissingClaim => "missing_claim",
            Self::Malformed => "malformed",
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&jsonwebtoken::errors::Error> for Diagnostic {
    fn from(err: &jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::InvalidSignature | ErrorKind::InvalidEcdsaKey => Self::Signature,
            ErrorKind::InvalidAlgorithm
            | ErrorKind::InvalidAlgorithmName
            | ErrorKind::MissingAlgorithm => Self::Algorithm,
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::ImmatureSignature => Self::NotYetValid,
            ErrorKind::InvalidIssuer => Self::Issuer,
            ErrorKind::InvalidAudience => Self::Audience,
            ErrorKind::MissingRequiredClaim(_) => Self::MissingClaim,
            _ => Self::Malformed,
        }
    }
}
