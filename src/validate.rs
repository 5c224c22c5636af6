//! Lexical checks over identifiers exchanged with the authorization server.
//!
//! Every predicate returns `false` on malformed input and never panics.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

static CLIENT_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$")
        .expect("client id pattern is valid")
});

static HEX_64: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9a-f]{64}$").expect("hex pattern is valid"));

static COMPACT_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_-]+\.[A-Za-z0-9_-]+\.[A-Za-z0-9_-]*$")
        .expect("compact token pattern is valid")
});

const REDIRECT_SCHEMES: &[&str] = &["http", "https"];

/// Lowercase canonical UUID, e.g. `0f8fad5b-d9cb-469f-a165-70867728950e`.
pub fn validate_client_id(client_id: &str) -> bool {
    CLIENT_ID.is_match(client_id)
}

pub fn validate_client_secret(client_secret: &str) -> bool {
    HEX_64.is_match(client_secret)
}

pub fn validate_state(state: &str) -> bool {
    HEX_64.is_match(state)
}

pub fn validate_code(code: &str) -> bool {
    HEX_64.is_match(code)
}

/// Absolute `http`/`https` URI with a non-empty host.
pub fn validate_redirect_uri(redirect_uri: &str) -> bool {
    let Ok(url) = Url::parse(redirect_uri) else {
        return false;
    };
    REDIRECT_SCHEMES.contains(&url.scheme()) && url.host_str().is_some_and(|host| !host.is_empty())
}

/// Three dot-separated base64url segments. The signature segment may be empty,
/// which only ever describes an unsigned token that verification rejects.
pub fn validate_access_token(access_token: &str) -> bool {
    COMPACT_TOKEN.is_match(access_token)
}
