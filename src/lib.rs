//! OAuth 2.0 relying-party client for the UCLIF authorization server.
//!
//! [`ConfidentialClient`] runs the authorization code grant and holds a client
//! secret; [`PublicClient`] runs the implicit grant. Both hand out a fresh
//! CSRF state per request, leave storing it to the caller, and only return
//! claims from tokens whose ES256 signature, lifetime, issuer and audience
//! check out.

mod authority;
mod confidential;
mod error;
mod identity;
#[cfg(feature = "local-server")]
mod local_server;
mod public;
mod scope;
mod state;
mod types;
mod uri;
pub mod validate;
mod verifier;

pub use authority::{Authority, UCLIF_AUTHORIZE_URL, UCLIF_HOST, UCLIF_TOKEN_URL};
pub use confidential::ConfidentialClient;
pub use error::AuthError;
pub use identity::ClientIdentity;
#[cfg(feature = "local-server")]
pub use local_server::LocalServer;
pub use public::PublicClient;
pub use scope::Scope;
pub use state::create_state;
pub use types::{
    AuthorizationCallback, AuthorizationRequest, ImplicitCallback, ResponseType, TokenResponse,
};
pub use uri::create_uri;
pub use verifier::{Claims, TokenVerifier};
