//! Wiring for the Shabbat times server: the sender factory and the shared
//! application state that builds every router.

pub mod app_state;
pub mod service_factory;

pub use app_state::{AppState, HealthResponse};
pub use service_factory::ShabbatServiceFactory;
