use std::fmt;

use crate::AuthError;
use crate::validate::{validate_client_id, validate_client_secret, validate_redirect_uri};

/// Credentials a flow presents to the authorization server, checked once at
/// construction.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientIdentity {
    client_id: String,
    client_secret: Option<String>,
    redirect_uri: String,
}

impl ClientIdentity {
    pub fn confidential(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Result<Self, AuthError> {
        let client_id = checked_client_id(client_id.into())?;
        let client_secret = client_secret.into();
        if !validate_client_secret(&client_secret) {
            return Err(AuthError::InvalidClientSecret);
        }
        let redirect_uri = checked_redirect_uri(redirect_uri.into())?;

        Ok(Self {
            client_id,
            client_secret: Some(client_secret),
            redirect_uri,
        })
    }

    pub fn public(
        client_id: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Result<Self, AuthError> {
        Ok(Self {
            client_id: checked_client_id(client_id.into())?,
            client_secret: None,
            redirect_uri: checked_redirect_uri(redirect_uri.into())?,
        })
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn client_secret(&self) -> Option<&str> {
        self.client_secret.as_deref()
    }

    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }
}

impl fmt::Debug for ClientIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientIdentity")
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "<redacted>"))
            .field("redirect_uri", &self.redirect_uri)
            .finish()
    }
}

fn checked_client_id(client_id: String) -> Result<String, AuthError> {
    if validate_client_id(&client_id) {
        Ok(client_id)
    } else {
        Err(AuthError::InvalidClientId)
    }
}

fn checked_redirect_uri(redirect_uri: String) -> Result<String, AuthError> {
    if validate_redirect_uri(&redirect_uri) {
        Ok(redirect_uri)
    } else {
        Err(AuthError::InvalidRedirectUri)
    }
}
