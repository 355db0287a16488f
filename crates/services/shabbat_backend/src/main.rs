use shabbat_backend::AppState;
use shabbat_common::logging;
use shabbat_config::load_config;
use shabbat_db::open_store;
use shabbat_reminders::start_reminder_polling;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{info, Level};

#[tokio::main]
async fn main() {
    logging::init_with_level(Level::INFO);

    let config = Arc::new(load_config().expect("Failed to load config"));
    let store = open_store(&config).await.expect("Failed to open store");
    let state = AppState::new(config.clone(), store).expect("Invalid time zone");

    #[allow(unused_mut)] // only the openapi feature adds to it
    let mut app = state.router();

    // Conditionally add Swagger UI and JSON endpoint if openapi feature enabled
    #[cfg(feature = "openapi")]
    {
        use shabbat_digest::doc::DigestApiDoc;
        use shabbat_email::doc::EmailApiDoc;
        use shabbat_firebase::doc::FirebaseApiDoc;
        use shabbat_reminders::doc::RemindersApiDoc;
        use shabbat_times::doc::TimesApiDoc;
        use utoipa::OpenApi;
        use utoipa_swagger_ui::SwaggerUi;

        #[derive(OpenApi)]
        #[openapi(
            info(
                title = "Shabbat Times API",
                version = "0.1.0",
                description = "Candle lighting, reminders and the Friday digest"
            ),
            servers( (url = "/api", description = "Main API Prefix")),
        )]
        struct ApiDoc;

        let mut openapi_doc = ApiDoc::openapi();
        openapi_doc.merge(TimesApiDoc::openapi());
        openapi_doc.merge(RemindersApiDoc::openapi());
        openapi_doc.merge(FirebaseApiDoc::openapi());
        openapi_doc.merge(EmailApiDoc::openapi());
        openapi_doc.merge(DigestApiDoc::openapi());
        info!("Adding Swagger UI at /api/docs");

        let swagger_ui = SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", openapi_doc);
        app = app.merge(swagger_ui);
    }

    let poller = if config.use_reminder_poller {
        let interval = Duration::from_secs(config.shabbat.poll_interval_seconds);
        info!("Starting reminder poller every {:?}", interval);
        Some(start_reminder_polling(state.reminders.clone(), interval))
    } else {
        info!("Reminder poller disabled; reminders fire only on manual checks");
        None
    };

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await.expect("Failed to bind");
    info!("Starting server at http://{}", addr);
    info!("API endpoints available at http://{}/api", addr);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    if let Some(poller) = poller {
        poller.shutdown().await;
    }
    info!("Server stopped");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        logging::log_error(e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
