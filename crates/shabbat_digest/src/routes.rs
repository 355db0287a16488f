use axum::{
    routing::{delete, get, post},
    Router,
};
use shabbat_common::{method_not_allowed, preflight};
use std::sync::Arc;

use crate::handlers::{
    add_tip_handler, delete_tip_handler, list_tips_handler, send_shabbat_email_handler,
    DigestState,
};

/// Digest trigger and tips admin, mounted under `/api` by the backend.
pub fn routes(state: Arc<DigestState>) -> Router {
    Router::new()
        .route(
            "/send-shabbat-email",
            post(send_shabbat_email_handler)
                .options(preflight)
                .fallback(method_not_allowed),
        )
        .route("/admin/tips", get(list_tips_handler).post(add_tip_handler))
        .route("/admin/tips/{id}", delete(delete_tip_handler))
        .with_state(state)
}
