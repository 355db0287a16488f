use axum::{routing::post, Router};
use std::sync::Arc;

use crate::handlers::{register_device_handler, FirebaseState};

/// Device registration routes, mounted under `/api` by the backend.
pub fn routes(state: Arc<FirebaseState>) -> Router {
    Router::new()
        .route("/users/{user_id}/devices", post(register_device_handler))
        .with_state(state)
}
