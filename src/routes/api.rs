use axum::{
    Router,
    routing::post,
};
use tower_http::trace::TraceLayer;

use crate::handlers::{analysis, challenge};
use crate::state::AppState;
use std::sync::Arc;

pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/challenge", post(challenge::challenge_handler))
        .route("/challenge/prefetch", post(challenge::prefetch_handler))
        .route("/analysis", post(analysis::analysis_handler))
        .layer(TraceLayer::new_for_http())
}
