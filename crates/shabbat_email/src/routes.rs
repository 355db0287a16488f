// --- File: crates/shabbat_email/src/routes.rs ---
use axum::{routing::post, Router};
use shabbat_common::{method_not_allowed, preflight};
use std::sync::Arc;

use crate::handlers::{send_reminder_email_handler, EmailState};

pub fn routes(state: Arc<EmailState>) -> Router {
    Router::new()
        .route(
            "/send-reminder-email",
            post(send_reminder_email_handler)
                .options(preflight)
                .fallback(method_not_allowed),
        )
        .with_state(state)
}
