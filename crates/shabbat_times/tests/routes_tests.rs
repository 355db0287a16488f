use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Weekday};
use chrono_tz::Tz;
use serde_json::{json, Value};
use shabbat_config::AppConfig;
use shabbat_db::MemoryShabbatStore;
use shabbat_times::handlers::TimesState;
use shabbat_times::routes::routes;
use shabbat_times::{OccasionCalculator, SolarError, SolarTimeProvider, SunTimes};
use std::sync::Arc;
use tower::ServiceExt;

/// Sunset at 20:00 UTC on every date.
struct EightPmSunset;

impl SolarTimeProvider for EightPmSunset {
    fn sun_times_for(
        &self,
        date: NaiveDate,
        _latitude: f64,
        _longitude: f64,
    ) -> Result<SunTimes, SolarError> {
        let sunset = date
            .and_time(NaiveTime::from_hms_opt(20, 0, 0).unwrap())
            .and_utc();
        Ok(SunTimes {
            sunrise: sunset - Duration::hours(14),
            solar_noon: sunset - Duration::hours(7),
            sunset,
        })
    }
}

fn create_app() -> Router {
    let state = Arc::new(TimesState {
        config: Arc::new(AppConfig::default()),
        calculator: OccasionCalculator::new(Arc::new(EightPmSunset), Tz::UTC),
        store: Arc::new(MemoryShabbatStore::new()),
    });
    routes(state)
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn put_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_times_for_coordinates() {
    let (status, body) = send(
        create_app(),
        get("/shabbat-times?latitude=48.8566&longitude=2.3522"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let date = NaiveDate::parse_from_str(body["date"].as_str().unwrap(), "%Y-%m-%d").unwrap();
    assert_eq!(date.weekday(), Weekday::Fri);
    assert_eq!(body["offset_minutes"], 18);
    assert_eq!(body["formatted"]["sunset"], "08:00 PM");
    assert_eq!(body["formatted"]["candle_lighting"], "07:42 PM");
    assert!(body.get("city_name").is_none());
}

#[tokio::test]
async fn test_custom_offset_and_bad_coordinates() {
    let (status, body) = send(
        create_app(),
        get("/shabbat-times?latitude=48.8566&longitude=2.3522&offset_minutes=40"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["formatted"]["candle_lighting"], "07:20 PM");

    let (status, body) = send(create_app(), get("/shabbat-times?latitude=123&longitude=0")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Latitude must be between -90 and 90");

    let (status, _) = send(
        create_app(),
        get("/shabbat-times?latitude=10&longitude=0&offset_minutes=-3"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_city_search() {
    let (status, body) = send(create_app(), get("/cities?q=par")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([{
        "name": "Paris", "country": "France", "latitude": 48.8566, "longitude": 2.3522
    }]));

    let (_, body) = send(create_app(), get("/cities")).await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_saved_city_drives_user_times() {
    let app = create_app();

    let (status, _) = send(app.clone(), get("/users/u1/shabbat-times")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(
        app.clone(),
        put_json(
            "/users/u1/city",
            json!({"city_name": "Paris", "country": "France", "latitude": 48.8566, "longitude": 2.3522}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["city_name"], "Paris");

    let (status, body) = send(app.clone(), get("/users/u1/city")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["country"], "France");

    let (status, body) = send(app, get("/users/u1/shabbat-times")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["city_name"], "Paris");
}

#[tokio::test]
async fn test_invalid_city_is_not_saved() {
    let app = create_app();
    let (status, body) = send(
        app.clone(),
        put_json(
            "/users/u2/city",
            json!({"city_name": "", "latitude": 100.0, "longitude": 0.0}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["fields"].as_array().unwrap().len(), 2);

    let (status, _) = send(app, get("/users/u2/city")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
