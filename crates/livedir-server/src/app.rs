//! Router construction.

use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Create the application router.
///
/// Every path goes through one handler: WebSocket upgrades join the live
/// reload channel, everything else is looked up under the served root.
pub(crate) fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .fallback(handlers::files::serve)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
