use tracing::warn;

use crate::state::states_match;
use crate::validate::validate_state;
use crate::{
    AuthError, Authority, AuthorizationRequest, Claims, ClientIdentity, ResponseType, Scope,
};

/// Client without a secret; receives its token directly in the redirect
/// fragment (implicit grant).
#[derive(Debug, Clone)]
pub struct PublicClient {
    identity: ClientIdentity,
    authority: Authority,
}

impl PublicClient {
    pub fn new(
        client_id: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Result<Self, AuthError> {
        Ok(Self {
            identity: ClientIdentity::public(client_id, redirect_uri)?,
            authority: Authority::uclif()?,
        })
    }

    pub fn with_authority(mut self, authority: Authority) -> Self {
        self.authority = authority;
        self
    }

    pub fn identity(&self) -> &ClientIdentity {
        &self.identity
    }

    pub fn authority(&self) -> &Authority {
        &self.authority
    }

    pub fn build_authorization_url(
        &self,
        scopes: &[Scope],
    ) -> Result<AuthorizationRequest, AuthError> {
        AuthorizationRequest::build(&self.authority, &self.identity, ResponseType::Token, scopes)
    }

    /// Verifies signature and claims only. The callback's state is not
    /// looked at; use [`verify_callback`](Self::verify_callback) for that.
    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        self.authority
            .verifier()
            .decode_and_verify(token, self.identity.client_id())
    }

    /// Checks the returned state against the stored one, then verifies the
    /// token delivered alongside it.
    pub fn verify_callback(
        &self,
        token: &str,
        returned_state: &str,
        stored_state: &str,
    ) -> Result<Claims, AuthError> {
        if !validate_state(returned_state) {
            return Err(AuthError::InvalidState);
        }
        if !validate_state(stored_state) {
            return Err(AuthError::InvalidStoredState);
        }
        if !states_match(returned_state, stored_state) {
            warn!(
                client_id = self.identity.client_id(),
                "callback state does not match stored state"
            );
            return Err(AuthError::StateMismatch);
        }
        self.verify_token(token)
    }
}
