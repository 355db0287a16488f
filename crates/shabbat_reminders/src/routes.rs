use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::handlers::{
    check_reminders_handler, get_reminders_handler, get_subscription_handler,
    put_reminders_handler, put_subscription_handler, RemindersState,
};

/// Reminder and subscription routes, mounted under `/api` by the backend.
pub fn routes(state: Arc<RemindersState>) -> Router {
    Router::new()
        .route(
            "/users/{user_id}/reminders",
            get(get_reminders_handler).put(put_reminders_handler),
        )
        .route(
            "/users/{user_id}/reminders/check",
            post(check_reminders_handler),
        )
        .route(
            "/users/{user_id}/subscription",
            get(get_subscription_handler).put(put_subscription_handler),
        )
        .with_state(state)
}
