//! File serving and WebSocket upgrade.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::ws::WebSocketUpgrade;
use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::http::{Uri, header};
use axum::response::{IntoResponse, Redirect, Response};

use crate::error::ServerError;
use crate::inject::inject_reload_client;
use crate::live_reload;
use crate::mime::{content_type_for, is_html};
use crate::root::RequestTarget;
use crate::state::AppState;

/// Handle any request.
///
/// Genuine upgrade requests hand the connection over to the live reload
/// channel; everything else is served from disk.
pub(crate) async fn serve(
    State(state): State<Arc<AppState>>,
    upgrade: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
    uri: Uri,
) -> Response {
    if let Ok(ws) = upgrade {
        return ws.on_upgrade(move |socket| live_reload::handle_socket(socket, state));
    }

    match serve_file(&state, &uri).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

/// Read the file behind `uri`, injecting the reload client into HTML.
///
/// Directories requested without a trailing slash are redirected first.
async fn serve_file(state: &AppState, uri: &Uri) -> Result<Response, ServerError> {
    let path = match state.root.resolve_request(uri.path()).await {
        Some(RequestTarget::File(path)) => path,
        Some(RequestTarget::Directory) => return Ok(directory_redirect(uri)),
        None => return Err(ServerError::NotFound),
    };

    let content = tokio::fs::read(&path).await?;
    let body = if is_html(&path) {
        inject_reload_client(content, state.port)
    } else {
        content
    };

    Ok(([(header::CONTENT_TYPE, content_type_for(&path))], body).into_response())
}

fn directory_redirect(uri: &Uri) -> Response {
    let location = match uri.query() {
        Some(query) => format!("{}/?{query}", uri.path()),
        None => format!("{}/", uri.path()),
    };
    Redirect::permanent(&location).into_response()
}
