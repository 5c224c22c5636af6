use serde::Serialize;
use url::{Url, form_urlencoded};

use crate::uri::create_uri;
use crate::{AuthError, Authority, Claims, ClientIdentity, Scope, create_state};

/// `response_type` sent to the authorization endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseType {
    /// Authorization code grant, for confidential clients.
    Code,
    /// Implicit grant; the token comes back in the redirect fragment.
    Token,
}

impl ResponseType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Code => "code",
            Self::Token => "token",
        }
    }
}

/// Where to send the user, and the state the caller must keep until the
/// callback arrives.
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    pub authorization_url: String,
    pub state: String,
    pub scope: String,
}

impl AuthorizationRequest {
    pub(crate) fn build(
        authority: &Authority,
        identity: &ClientIdentity,
        response_type: ResponseType,
        scopes: &[Scope],
    ) -> Result<Self, AuthError> {
        let scope = Scope::join(scopes)?;
        let state = create_state()?;

        let authorization_url = create_uri(
            authority.authorize_url(),
            &[
                ("response_type", response_type.as_str()),
                ("client_id", identity.client_id()),
                ("redirect_uri", identity.redirect_uri()),
                ("scope", scope.as_str()),
                ("state", state.as_str()),
            ],
            &[],
            true,
        )?;

        Ok(Self {
            authorization_url,
            state,
            scope,
        })
    }
}

/// Query parameters delivered to the redirect URI in the code flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationCallback {
    pub code: String,
    pub state: String,
}

impl AuthorizationCallback {
    pub fn from_url(callback_url: &str) -> Result<Self, AuthError> {
        let url = Url::parse(callback_url)?;
        let params = CallbackParams::parse(url.query().unwrap_or_default())?;
        Ok(Self {
            code: params.code.ok_or(AuthError::MissingCallbackParameter("code"))?,
            state: params.state.ok_or(AuthError::MissingCallbackParameter("state"))?,
        })
    }
}

/// Fragment parameters delivered to the redirect URI in the implicit flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImplicitCallback {
    pub access_token: String,
    pub state: String,
    pub token_type: Option<String>,
    pub expires_in: Option<u64>,
}

impl ImplicitCallback {
    pub fn from_url(callback_url: &str) -> Result<Self, AuthError> {
        let url = Url::parse(callback_url)?;
        let params = CallbackParams::parse(url.fragment().unwrap_or_default())?;
        Ok(Self {
            access_token: params
                .access_token
                .ok_or(AuthError::MissingCallbackParameter("access_token"))?,
            state: params.state.ok_or(AuthError::MissingCallbackParameter("state"))?,
            token_type: params.token_type,
            expires_in: params
                .expires_in
                .map(|value| {
                    value
                        .parse()
                        .map_err(|_| AuthError::InvalidCallbackParameter("expires_in"))
                })
                .transpose()?,
        })
    }
}

#[derive(Default)]
struct CallbackParams {
    code: Option<String>,
    state: Option<String>,
    access_token: Option<String>,
    token_type: Option<String>,
    expires_in: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

impl CallbackParams {
    fn parse(encoded: &str) -> Result<Self, AuthError> {
        let mut params = Self::default();
        for (key, value) in form_urlencoded::parse(encoded.as_bytes()) {
            let slot = match key.as_ref() {
                "code" => &mut params.code,
                "state" => &mut params.state,
                "access_token" => &mut params.access_token,
                "token_type" => &mut params.token_type,
                "expires_in" => &mut params.expires_in,
                "error" => &mut params.error,
                "error_description" => &mut params.error_description,
                _ => continue,
            };
            *slot = Some(value.into_owned());
        }

        if let Some(error) = params.error {
            return Err(AuthError::AuthorizationDenied {
                error,
                description: params.error_description,
            });
        }
        Ok(params)
    }
}

/// Result of a successful code exchange.
#[derive(Debug, Clone, Serialize)]
pub struct TokenResponse {
    pub token_type: String,
    /// Lifetime of the access token in seconds.
    pub expires_in: u64,
    pub access_token: String,
    pub claims: Claims,
}

#[cfg(test)]
mod tests {
    use super::{AuthorizationCallback, ImplicitCallback};
    use crate::AuthError;

    #[test]
    fn parses_code_callback() {
        let callback =
            AuthorizationCallback::from_url("https://app.example/info?code=abc123&state=state456")
                .unwrap();
        assert_eq!(callback.code, "abc123");
        assert_eq!(callback.state, "state456");
    }

    #[test]
    fn code_callback_requires_code_and_state() {
        let result = AuthorizationCallback::from_url("https://app.example/info?state=state456");
        assert!(matches!(
            result,
            Err(AuthError::MissingCallbackParameter("code"))
        ));

        let result = AuthorizationCallback::from_url("https://app.example/info?code=abc123");
        assert!(matches!(
            result,
            Err(AuthError::MissingCallbackParameter("state"))
        ));
    }

    #[test]
    fn surfaces_authorization_error() {
        let result = AuthorizationCallback::from_url(
            "https://app.example/info?error=access_denied&error_description=User+declined&state=s",
        );
        match result {
            Err(AuthError::AuthorizationDenied { error, description }) => {
                assert_eq!(error, "access_denied");
                assert_eq!(description.as_deref(), Some("User declined"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn parses_implicit_callback_fragment() {
        let callback = ImplicitCallback::from_url(
            "https://app.example/cb#access_token=a.b.c&token_type=Bearer&expires_in=3600&state=s1",
        )
        .unwrap();
        assert_eq!(callback.access_token, "a.b.c");
        assert_eq!(callback.state, "s1");
        assert_eq!(callback.token_type.as_deref(), Some("Bearer"));
        assert_eq!(callback.expires_in, Some(3600));
    }

    #[test]
    fn implicit_callback_rejects_malformed_expiry() {
        for expires_in in ["soon", "-5", "3.5", ""] {
            let url = format!("https://app.example/cb#access_token=a.b.c&expires_in={expires_in}&state=s1");
            assert!(matches!(
                ImplicitCallback::from_url(&url),
                Err(AuthError::InvalidCallbackParameter("expires_in"))
            ));
        }

        let callback = ImplicitCallback::from_url("https://app.example/cb#access_token=a.b.c&state=s1")
            .unwrap();
        assert_eq!(callback.expires_in, None);
    }

    #[test]
    fn implicit_callback_ignores_query() {
        let result = ImplicitCallback::from_url("https://app.example/cb?access_token=a.b.c&state=s1");
        assert!(matches!(
            result,
            Err(AuthError::MissingCallbackParameter("access_token"))
        ));
    }
}
