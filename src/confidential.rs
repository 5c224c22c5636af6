use std::time::Duration;

use reqwest::{Client, header::ACCEPT, redirect::Policy};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::Diagnostic;
use crate::state::states_match;
use crate::validate::{validate_access_token, validate_code, validate_state};
use crate::{
    AuthError, Authority, AuthorizationRequest, Claims, ClientIdentity, ResponseType, Scope,
    TokenResponse,
};
#[cfg(feature = "local-server")]
use crate::LocalServer;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const BEARER: &str = "Bearer";

/// Server-side client holding a secret; uses the authorization code grant.
#[derive(Debug, Clone)]
pub struct ConfidentialClient {
    identity: ClientIdentity,
    authority: Authority,
    http: Client,
}

impl ConfidentialClient {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Result<Self, AuthError> {
        let identity = ClientIdentity::confidential(client_id, client_secret, redirect_uri)?;
        Ok(Self {
            identity,
            authority: Authority::uclif()?,
            http: http_client(DEFAULT_TIMEOUT)?,
        })
    }

    pub fn with_authority(mut self, authority: Authority) -> Self {
        self.authority = authority;
        self
    }

    /// Bounds the token exchange request. Defaults to ten seconds.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, AuthError> {
        self.http = http_client(timeout)?;
        Ok(self)
    }

    pub fn identity(&self) -> &ClientIdentity {
        &self.identity
    }

    pub fn authority(&self) -> &Authority {
        &self.authority
    }

    /// Builds a `response_type=code` request with a fresh state. The caller
    /// must store `state` and hand it back to [`exchange_code`](Self::exchange_code).
    pub fn build_authorization_url(
        &self,
        scopes: &[Scope],
    ) -> Result<AuthorizationRequest, AuthError> {
        AuthorizationRequest::build(&self.authority, &self.identity, ResponseType::Code, scopes)
    }

    /// Trades an authorization code for a verified token.
    ///
    /// The stored state is spent by this call whatever the outcome; callers
    /// must discard it and start over with a new request on failure.
    pub async fn exchange_code(
        &self,
        code: &str,
        returned_state: &str,
        stored_state: &str,
    ) -> Result<TokenResponse, AuthError> {
        if !validate_code(code) {
            return Err(AuthError::InvalidCode);
        }
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

        self.request_token(code).await.map_err(|reason| {
            warn!(
                client_id = self.identity.client_id(),
                token_url = self.authority.token_url(),
                %reason,
                "token exchange failed"
            );
            AuthError::ExchangeFailed
        })
    }

    /// Verifies a token obtained outside [`exchange_code`](Self::exchange_code).
    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        self.authority
            .verifier()
            .decode_and_verify(token, self.identity.client_id())
    }

    #[cfg(feature = "local-server")]
    pub async fn run_local_flow<F>(
        &self,
        scopes: &[Scope],
        timeout: Option<Duration>,
        on_authorize: F,
    ) -> Result<TokenResponse, AuthError>
    where
        F: FnOnce(&AuthorizationRequest) -> Result<(), AuthError>,
    {
        let request = self.build_authorization_url(scopes)?;
        let mut server = LocalServer::new(self.identity.redirect_uri())?;
        if let Some(timeout) = timeout {
            server = server.with_timeout(timeout);
        }
        let listener = server.bind()?;

        let handle = tokio::spawn(async move { server.listen_with_async(listener).await });

        if let Err(err) = on_authorize(&request) {
            handle.abort();
            return Err(err);
        }

        let callback = handle.await.map_err(|err| AuthError::LocalServer {
            message: err.to_string(),
        })??;

        self.exchange_code(&callback.code, &callback.state, &request.state)
            .await
    }

    async fn request_token(&self, code: &str) -> Result<TokenResponse, Diagnostic> {
        let form = [
            ("grant_type", "authorization_code"),
            ("client_id", self.identity.client_id()),
            ("client_secret", self.identity.client_secret().unwrap_or_default()),
            ("redirect_uri", self.identity.redirect_uri()),
            ("code", code),
        ];

        let response = self
            .http
            .post(self.authority.token_url())
            .header(ACCEPT, "application/json")
            .form(&form)
            .send()
            .await
            .map_err(|err| {
                debug!(error = %err, "token request did not complete");
                Diagnostic::Transport
            })?;

        let status = response.status();
        if !status.is_success() {
            debug!(status = status.as_u16(), "token endpoint answered with an error");
            return Err(Diagnostic::HttpStatus);
        }

        let body = response.text().await.map_err(|_| Diagnostic::Transport)?;
        let raw: RawTokenResponse =
            serde_json::from_str(&body).map_err(|_| Diagnostic::MalformedBody)?;

        let token_type = match raw.token_type {
            None => return Err(Diagnostic::MissingTokenType),
            Some(Value::String(token_type)) if token_type == BEARER => token_type,
            Some(_) => return Err(Diagnostic::WrongTokenType),
        };

        let expires_in = raw
            .expires_in
            .ok_or(Diagnostic::MissingExpiresIn)?
            .as_u64()
            .ok_or(Diagnostic::InvalidExpiresIn)?;

        let access_token = match raw.access_token {
            None => return Err(Diagnostic::MissingAccessToken),
            Some(Value::String(token)) if validate_access_token(&token) => token,
            Some(_) => return Err(Diagnostic::MalformedAccessToken),
        };

        let claims = self
            .authority
            .verifier()
            .verify(&access_token, self.identity.client_id())?;

        Ok(TokenResponse {
            token_type,
            expires_in,
            access_token,
            claims,
        })
    }
}

#[derive(Deserialize)]
struct RawTokenResponse {
    token_type: Option<Value>,
    expires_in: Option<Value>,
    access_token: Option<Value>,
}

fn http_client(timeout: Duration) -> Result<Client, AuthError> {
    Ok(Client::builder()
        .timeout(timeout)
        .redirect(Policy::none())
        .build()?)
}
