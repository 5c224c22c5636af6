use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{Router, routing::get};
use tokio::net::TcpListener as TokioTcpListener;
use tokio::sync::oneshot;
use tracing::{debug, info};

use crate::{AuthError, AuthorizationCallback};

use super::http::{
    LocalServerState, callback_handler, fallback_handler, send_callback, wait_for_callback,
};
use super::target::RedirectTarget;

const DEFAULT_SUCCESS_HTML: &str = r#"<!doctype html>
<html>
  <head><meta charset="utf-8" /><title>Signed in</title></head>
  <body>
    <p>Sign-in complete. You may close this window.</p>
  </body>
</html>
"#;

const DEFAULT_ERROR_HTML: &str = r#"<!doctype html>
<html>
  <head><meta charset="utf-8" /><title>Sign-in error</title></head>
  <body>
    <p>Sign-in failed. You may close this window and try again.</p>
  </body>
</html>
"#;

/// Answers exactly one code-flow callback on a loopback `http` redirect URI.
#[derive(Debug, Clone)]
pub struct LocalServer {
    target: RedirectTarget,
    success_html: String,
    error_html: String,
    timeout: Option<Duration>,
}

impl LocalServer {
    pub fn new(redirect_uri: &str) -> Result<Self, AuthError> {
        Ok(Self {
            target: RedirectTarget::parse(redirect_uri)?,
            success_html: DEFAULT_SUCCESS_HTML.to_string(),
            error_html: DEFAULT_ERROR_HTML.to_string(),
            timeout: None,
        })
    }

    pub fn with_success_html(mut self, html: impl Into<String>) -> Self {
        self.success_html = html.into();
        self
    }

    pub fn with_error_html(mut self, html: impl Into<String>) -> Self {
        self.error_html = html.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn bind(&self) -> Result<TcpListener, AuthError> {
        TcpListener::bind((self.target.host.as_str(), self.target.port)).map_err(AuthError::from)
    }

    pub async fn listen_with_async(
        &self,
        listener: TcpListener,
    ) -> Result<AuthorizationCallback, AuthError> {
        let (callback_tx, callback_rx) = oneshot::channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let callback_tx = Arc::new(Mutex::new(Some(callback_tx)));

        let state = LocalServerState {
            target: self.target.clone(),
            success_html: self.success_html.clone(),
            error_html: self.error_html.clone(),
            callback_tx: callback_tx.clone(),
        };

        let app = Router::new()
            .route(&state.target.path, get(callback_handler))
            .fallback(fallback_handler)
            .with_state(state);

        listener.set_nonblocking(true)?;
        let listener = TokioTcpListener::from_std(listener)?;
        info!(addr = ?listener.local_addr().ok(), path = %self.target.path, "waiting for callback");

        let server = axum::serve(listener, app).with_graceful_shutdown(async move {
            let _ = shutdown_rx.await;
        });

        let callback_tx_for_server = callback_tx.clone();
        let server_handle = tokio::spawn(async move {
            if let Err(err) = server.await {
                let error = AuthError::LocalServer {
                    message: err.to_string(),
                };
                send_callback(&callback_tx_for_server, Err(error));
            }
        });

        let callback = wait_for_callback(callback_rx, self.timeout).await;
        debug!(received = callback.is_ok(), "callback listener finished");

        let _ = shutdown_tx.send(());
        let _ = server_handle.await;

        callback
    }

    pub async fn listen_once_async(&self) -> Result<AuthorizationCallback, AuthError> {
        let listener = self.bind()?;
        self.listen_with_async(listener).await
    }
}
