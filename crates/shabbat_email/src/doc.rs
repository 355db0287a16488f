// --- File: crates/shabbat_email/src/doc.rs ---
#![cfg(feature = "openapi")]

use utoipa::OpenApi;

use crate::handlers::{ReminderEmailRequest, TriggerResponse};

#[derive(OpenApi)]
#[openapi(
    paths(crate::handlers::send_reminder_email_handler),
    components(schemas(ReminderEmailRequest, TriggerResponse)),
    tags((name = "Email", description = "Transactional reminder email"))
)]
pub struct EmailApiDoc;
