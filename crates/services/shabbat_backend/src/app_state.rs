use axum::{extract::State, http::HeaderName, routing::get, Json, Router};
use http::{header, Method};
use serde::Serialize;
use shabbat_common::services::ServiceFactory;
use shabbat_config::{AppConfig, ConfigError};
use shabbat_db::ShabbatStore;
use shabbat_digest::{handlers::DigestState, DigestJob};
use shabbat_email::handlers::EmailState;
use shabbat_firebase::handlers::FirebaseState;
use shabbat_reminders::{handlers::RemindersState, DeliveryDispatcher, ReminderRule, ReminderService};
use shabbat_times::{handlers::TimesState, OccasionCalculator};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::service_factory::ShabbatServiceFactory;

/// Everything the routers and the reminder poller share.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn ShabbatStore>,
    pub service_factory: Arc<dyn ServiceFactory>,
    pub calculator: OccasionCalculator,
    pub reminders: Arc<ReminderService>,
    pub digest: Arc<DigestJob>,
}

impl AppState {
    /// Wires the production senders from `config`.
    pub fn new(config: Arc<AppConfig>, store: Arc<dyn ShabbatStore>) -> Result<Self, ConfigError> {
        let service_factory = Arc::new(ShabbatServiceFactory::new(&config, store.clone()));
        Self::with_service_factory(config, store, service_factory)
    }

    /// Same as [`AppState::new`] with a caller-supplied factory, e.g. one
    /// handing out recording senders in tests.
    pub fn with_service_factory(
        config: Arc<AppConfig>,
        store: Arc<dyn ShabbatStore>,
        service_factory: Arc<dyn ServiceFactory>,
    ) -> Result<Self, ConfigError> {
        let tz = config.tz()?;
        let shabbat = &config.shabbat;
        let calculator = OccasionCalculator::spa(shabbat.delta_t_seconds, tz);

        let reminders = Arc::new(ReminderService::new(
            store.clone(),
            calculator.clone(),
            DeliveryDispatcher::from_factory(service_factory.as_ref()),
            ReminderRule::from_config(shabbat, tz),
            shabbat.candle_lighting_offset_minutes,
        ));

        let unsubscribe_base_url = config
            .email
            .as_ref()
            .map(|email| email.unsubscribe_base_url.clone())
            .unwrap_or_default();
        let digest = Arc::new(DigestJob::new(
            store.clone(),
            calculator.clone(),
            service_factory.email_transport(),
            unsubscribe_base_url,
            shabbat.candle_lighting_offset_minutes,
        ));

        Ok(Self {
            config,
            store,
            service_factory,
            calculator,
            reminders,
            digest,
        })
    }

    /// All API routes under `/api`, behind the CORS policy browsers need.
    pub fn router(&self) -> Router {
        let times_router = shabbat_times::routes::routes(Arc::new(TimesState {
            config: self.config.clone(),
            calculator: self.calculator.clone(),
            store: self.store.clone(),
        }));
        let email_router = shabbat_email::routes::routes(Arc::new(EmailState {
            transport: self.service_factory.email_transport(),
        }));
        let devices_router = shabbat_firebase::routes(Arc::new(FirebaseState {
            store: self.store.clone(),
        }));
        let reminders_router = shabbat_reminders::routes(Arc::new(RemindersState {
            store: self.store.clone(),
            service: self.reminders.clone(),
        }));
        let digest_router = shabbat_digest::routes(Arc::new(DigestState {
            job: self.digest.clone(),
            store: self.store.clone(),
        }));

        let api_router = Router::new()
            .route("/", get(|| async { "Welcome to the Shabbat Times API!" }))
            .route("/health", get(health_handler))
            .with_state(self.store.clone())
            .merge(times_router)
            .merge(email_router)
            .merge(devices_router)
            .merge(reminders_router)
            .merge(digest_router);

        Router::new().nest("/api", api_router).layer(cors_layer())
    }
}

#[derive(Serialize, Debug)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: bool,
}

async fn health_handler(State(store): State<Arc<dyn ShabbatStore>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        database: store.is_healthy().await,
    })
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
        ])
}
