// --- File: crates/shabbat_times/src/routes.rs ---
use axum::{routing::get, Router};
use std::sync::Arc;

use crate::handlers::{
    get_times_handler, get_user_city_handler, get_user_times_handler, put_user_city_handler,
    search_cities_handler, TimesState,
};

/// Times and city routes, mounted under `/api` by the backend.
pub fn routes(state: Arc<TimesState>) -> Router {
    Router::new()
        .route("/shabbat-times", get(get_times_handler))
        .route("/users/{user_id}/shabbat-times", get(get_user_times_handler))
        .route("/cities", get(search_cities_handler))
        .route(
            "/users/{user_id}/city",
            get(get_user_city_handler).put(put_user_city_handler),
        )
        .with_state(state)
}
