use url::Url;

use crate::AuthError;

/// The part of a loopback redirect URI the listener needs: where to bind and
/// which path to answer on.
#[derive(Debug, Clone)]
pub(super) struct RedirectTarget {
    pub(super) host: String,
    pub(super) port: u16,
    pub(super) path: String,
}

impl RedirectTarget {
    pub(super) fn parse(redirect_uri: &str) -> Result<Self, AuthError> {
        let url = Url::parse(redirect_uri)?;
        if url.scheme() != "http" {
            return Err(AuthError::InvalidRedirectUri);
        }

        let host = url.host_str().ok_or(AuthError::InvalidRedirectUri)?;
        let port = url
            .port_or_known_default()
            .ok_or(AuthError::InvalidRedirectUri)?;

        Ok(Self {
            host: host.to_string(),
            port,
            path: url.path().to_string(),
        })
    }

    pub(super) fn callback_url(&self, query: &str) -> String {
        let base = format!("http://{}:{}{}", self.host, self.port, self.path);
        if query.is_empty() {
            base
        } else {
            format!("{base}?{query}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::RedirectTarget;
    use crate::AuthError;

    #[test]
    fn parses_redirect_target() {
        let target = RedirectTarget::parse("http://localhost:8765/info").unwrap();
        assert_eq!(target.host, "localhost");
        assert_eq!(target.port, 8765);
        assert_eq!(target.path, "/info");
        assert_eq!(
            target.callback_url("code=1&state=2"),
            "http://localhost:8765/info?code=1&state=2"
        );
    }

    #[test]
    fn rejects_https_redirect() {
        let result = RedirectTarget::parse("https://app.example/info");
        assert!(matches!(result, Err(AuthError::InvalidRedirectUri)));
    }
}
