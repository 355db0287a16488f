use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use shabbat_backend::AppState;
use shabbat_common::models::ChannelKind;
use shabbat_common::services::{
    BoxFuture, ChannelSender, DeliveryError, DeliveryReceipt, EmailMessage, EmailTransport,
    ServiceFactory,
};
use shabbat_config::AppConfig;
use shabbat_db::{MemoryShabbatStore, ShabbatStore};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

#[derive(Default)]
struct RecordingTransport {
    sent: Mutex<Vec<EmailMessage>>,
}

impl EmailTransport for RecordingTransport {
    fn send_email<'a>(
        &'a self,
        message: &'a EmailMessage,
    ) -> BoxFuture<'a, DeliveryReceipt, DeliveryError> {
        self.sent.lock().unwrap().push(message.clone());
        Box::pin(async { Ok(DeliveryReceipt::accepted(ChannelKind::Email)) })
    }
}

struct EmailOnlyFactory {
    transport: Arc<RecordingTransport>,
}

impl ServiceFactory for EmailOnlyFactory {
    fn sender(&self, _channel: ChannelKind) -> Option<Arc<dyn ChannelSender>> {
        None
    }

    fn email_transport(&self) -> Option<Arc<dyn EmailTransport>> {
        Some(self.transport.clone())
    }
}

fn default_app() -> Router {
    let store: Arc<dyn ShabbatStore> = Arc::new(MemoryShabbatStore::new());
    AppState::new(Arc::new(AppConfig::default()), store)
        .unwrap()
        .router()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 64)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health_reports_store() {
    let app = default_app();
    let request = Request::builder()
        .uri("/api/health")
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok", "database": true }));
}

#[tokio::test]
async fn test_cors_preflight_allows_any_origin() {
    let app = default_app();
    let request = Request::builder()
        .method("OPTIONS")
        .uri("/api/users/u1/reminders")
        .header("origin", "https://shabbattimes.example")
        .header("access-control-request-method", "PUT")
        .header("access-control-request-headers", "content-type,apikey")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers["access-control-allow-origin"], "*");
    let methods = headers["access-control-allow-methods"].to_str().unwrap();
    assert!(methods.contains("PUT"));
    assert!(methods.contains("DELETE"));
}

#[tokio::test]
async fn test_routers_are_mounted_under_api() {
    let app = default_app();

    let (status, body) = send(&app, post_json("/api/users/u1/reminders/check", json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "no_preferences");

    let request = Request::builder()
        .uri("/api/users/u1/subscription")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["subscribed_to_friday_email"], false);
}

#[tokio::test]
async fn test_email_routes_disabled_without_transport() {
    let app = default_app();

    let (status, body) = send(&app, post_json("/api/send-shabbat-email", json!({}))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Email service is disabled");
}

#[tokio::test]
async fn test_factory_transport_reaches_email_routes() {
    let transport = Arc::new(RecordingTransport::default());
    let store: Arc<dyn ShabbatStore> = Arc::new(MemoryShabbatStore::new());
    let state = AppState::with_service_factory(
        Arc::new(AppConfig::default()),
        store,
        Arc::new(EmailOnlyFactory {
            transport: transport.clone(),
        }),
    )
    .unwrap();
    let app = state.router();

    let (status, body) = send(
        &app,
        post_json(
            "/api/send-reminder-email",
            json!({
                "emailAddress": "dana@example.com",
                "candleLightingTime": "06:12 PM",
                "cityName": "Haifa"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let sent = transport.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "dana@example.com");
    assert!(sent[0].html.contains("Haifa"));
}
