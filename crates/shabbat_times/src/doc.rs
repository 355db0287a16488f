// --- File: crates/shabbat_times/src/doc.rs ---
#![cfg(feature = "openapi")]

use utoipa::OpenApi;

use crate::cities::City;
use crate::format::FormattedTimes;
use crate::handlers::{SaveCityRequest, TimesResponse};
use shabbat_common::models::SavedCity;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::get_times_handler,
        crate::handlers::get_user_times_handler,
        crate::handlers::search_cities_handler,
        crate::handlers::put_user_city_handler,
        crate::handlers::get_user_city_handler,
    ),
    components(schemas(TimesResponse, FormattedTimes, City, SaveCityRequest, SavedCity)),
    tags(
        (name = "Times", description = "Candle-lighting and sunset times"),
        (name = "Cities", description = "City catalog and the user's saved city")
    )
)]
pub struct TimesApiDoc;
