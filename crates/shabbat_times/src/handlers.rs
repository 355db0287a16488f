// --- File: crates/shabbat_times/src/handlers.rs ---
use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use shabbat_common::models::SavedCity;
use shabbat_common::{not_found, validation_error, ShabbatError};
use shabbat_config::AppConfig;
use shabbat_db::{SavedCityRepository, ShabbatStore};
use std::sync::Arc;
use tracing::info;

use crate::cities::{coordinate_errors, search_cities, validate_location, City};
use crate::format::FormattedTimes;
use crate::occasion::{Occasion, OccasionCalculator};

// Shared state for the times and city routes
#[derive(Clone)]
pub struct TimesState {
    pub config: Arc<AppConfig>,
    pub calculator: OccasionCalculator,
    pub store: Arc<dyn ShabbatStore>,
}

#[derive(Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams, utoipa::ToSchema))]
pub struct TimesQuery {
    pub latitude: f64,
    pub longitude: f64,
    /// Minutes before sunset; defaults to the configured offset.
    pub offset_minutes: Option<i64>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct TimesResponse {
    pub date: NaiveDate,
    pub sunset: DateTime<Utc>,
    pub candle_lighting: DateTime<Utc>,
    pub offset_minutes: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city_name: Option<String>,
    pub formatted: FormattedTimes,
}

impl TimesResponse {
    pub fn new(occasion: Occasion, city_name: Option<String>, tz: Tz) -> Self {
        let formatted = FormattedTimes::for_occasion(&occasion, tz);
        Self {
            date: occasion.date,
            sunset: occasion.sunset,
            candle_lighting: occasion.candle_lighting,
            offset_minutes: occasion.offset_minutes,
            city_name,
            formatted,
        }
    }
}

#[derive(Deserialize, Debug, Default)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams, utoipa::ToSchema))]
pub struct CitySearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SaveCityRequest {
    pub city_name: String,
    #[serde(default)]
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Upcoming Friday times for arbitrary coordinates.
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/shabbat-times",
    params(TimesQuery),
    responses(
        (status = 200, description = "Times for the next occasion", body = TimesResponse),
        (status = 400, description = "Coordinates out of range or negative offset"),
        (status = 422, description = "No sunset at this location on that date")
    ),
    tag = "Times"
))]
pub async fn get_times_handler(
    State(state): State<Arc<TimesState>>,
    Query(query): Query<TimesQuery>,
) -> Result<Json<TimesResponse>, ShabbatError> {
    let errors = coordinate_errors(query.latitude, query.longitude);
    if !errors.is_empty() {
        return Err(validation_error(errors));
    }
    let offset = query
        .offset_minutes
        .unwrap_or(state.config.shabbat.candle_lighting_offset_minutes);

    let occasion =
        state
            .calculator
            .occasion_times(query.latitude, query.longitude, offset, Utc::now())?;
    Ok(Json(TimesResponse::new(
        occasion,
        None,
        state.calculator.tz(),
    )))
}

/// Upcoming Friday times at the user's saved city.
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/users/{user_id}/shabbat-times",
    params(("user_id" = String, Path, description = "Anonymous user id")),
    responses(
        (status = 200, description = "Times for the next occasion", body = TimesResponse),
        (status = 404, description = "User has no saved city"),
        (status = 422, description = "No sunset at this location on that date")
    ),
    tag = "Times"
))]
pub async fn get_user_times_handler(
    State(state): State<Arc<TimesState>>,
    Path(user_id): Path<String>,
) -> Result<Json<TimesResponse>, ShabbatError> {
    let city = state
        .store
        .find_city(&user_id)
        .await?
        .ok_or_else(|| not_found(format!("No saved city for user {}", user_id)))?;

    let occasion = state.calculator.occasion_times(
        city.latitude,
        city.longitude,
        state.config.shabbat.candle_lighting_offset_minutes,
        Utc::now(),
    )?;
    Ok(Json(TimesResponse::new(
        occasion,
        Some(city.city_name),
        state.calculator.tz(),
    )))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/cities",
    params(CitySearchQuery),
    responses((status = 200, description = "Up to five matching cities", body = [City])),
    tag = "Cities"
))]
pub async fn search_cities_handler(Query(query): Query<CitySearchQuery>) -> Json<Vec<City>> {
    Json(search_cities(&query.q))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    put,
    path = "/users/{user_id}/city",
    params(("user_id" = String, Path, description = "Anonymous user id")),
    request_body = SaveCityRequest,
    responses(
        (status = 200, description = "City saved", body = SavedCity),
        (status = 400, description = "Missing name or coordinates out of range")
    ),
    tag = "Cities"
))]
pub async fn put_user_city_handler(
    State(state): State<Arc<TimesState>>,
    Path(user_id): Path<String>,
    Json(request): Json<SaveCityRequest>,
) -> Result<Json<SavedCity>, ShabbatError> {
    let errors = validate_location(&request.city_name, request.latitude, request.longitude);
    if !errors.is_empty() {
        return Err(validation_error(errors));
    }

    let saved = state
        .store
        .upsert_city(SavedCity {
            user_id,
            city_name: request.city_name.trim().to_string(),
            country: request.country.trim().to_string(),
            latitude: request.latitude,
            longitude: request.longitude,
            updated_at: None,
        })
        .await?;
    info!("User {} saved city {}", saved.user_id, saved.city_name);
    Ok(Json(saved))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/users/{user_id}/city",
    params(("user_id" = String, Path, description = "Anonymous user id")),
    responses(
        (status = 200, description = "The saved city", body = SavedCity),
        (status = 404, description = "No saved city")
    ),
    tag = "Cities"
))]
pub async fn get_user_city_handler(
    State(state): State<Arc<TimesState>>,
    Path(user_id): Path<String>,
) -> Result<Json<SavedCity>, ShabbatError> {
    state
        .store
        .find_city(&user_id)
        .await?
        .map(Json)
        .ok_or_else(|| not_found(format!("No saved city for user {}", user_id)))
}
