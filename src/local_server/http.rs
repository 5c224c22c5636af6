use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{RawQuery, State},
    http::StatusCode,
    response::{Html, IntoResponse},
};
use tokio::sync::oneshot;
use tracing::debug;

use crate::{AuthError, AuthorizationCallback};

use super::target::RedirectTarget;

type CallbackResult = Result<AuthorizationCallback, AuthError>;
type CallbackSender = oneshot::Sender<CallbackResult>;
type CallbackReceiver = oneshot::Receiver<CallbackResult>;
type SharedCallbackSender = Arc<Mutex<Option<CallbackSender>>>;

#[derive(Clone)]
pub(super) struct LocalServerState {
    pub(super) target: RedirectTarget,
    pub(super) success_html: String,
    pub(super) error_html: String,
    pub(super) callback_tx: SharedCallbackSender,
}

pub(super) fn send_callback(callback_tx: &SharedCallbackSender, callback: CallbackResult) {
    if let Ok(mut guard) = callback_tx.lock() {
        if let Some(sender) = guard.take() {
            let _ = sender.send(callback);
        }
    }
}

pub(super) async fn callback_handler(
    State(state): State<LocalServerState>,
    RawQuery(query): RawQuery,
) -> impl IntoResponse {
    let LocalServerState {
        target,
        success_html,
        error_html,
        callback_tx,
    } = state;

    let callback_url = target.callback_url(&query.unwrap_or_default());
    match AuthorizationCallback::from_url(&callback_url) {
        Ok(callback) => {
            send_callback(&callback_tx, Ok(callback));
            (StatusCode::OK, Html(success_html))
        }
        Err(AuthError::MissingCallbackParameter(name)) => {
            debug!(missing = name, "ignoring incomplete callback");
            (StatusCode::BAD_REQUEST, Html(error_html))
        }
        Err(error) => {
            send_callback(&callback_tx, Err(error));
            (StatusCode::BAD_REQUEST, Html(error_html))
        }
    }
}

pub(super) async fn fallback_handler(State(state): State<LocalServerState>) -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Html(state.error_html))
}

pub(super) async fn wait_for_callback(
    callback_rx: CallbackReceiver,
    timeout: Option<Duration>,
) -> CallbackResult {
    let closed = |_| AuthError::LocalServer {
        message: "callback channel closed".to_string(),
    };

    match timeout {
        Some(timeout) => tokio::time::timeout(timeout, callback_rx)
            .await
            .map_err(|_| AuthError::LocalServerTimeout { timeout })?
            .map_err(closed)?,
        None => callback_rx.await.map_err(closed)?,
    }
}
