#![cfg(feature = "openapi")]

use utoipa::OpenApi;

use crate::handlers::{
    ReminderCheckResponse, ReminderPreferencesBody, ReminderPreferencesRequest, SubscriptionBody,
};
use shabbat_common::models::ChannelKind;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::get_reminders_handler,
        crate::handlers::put_reminders_handler,
        crate::handlers::check_reminders_handler,
        crate::handlers::get_subscription_handler,
        crate::handlers::put_subscription_handler,
    ),
    components(schemas(
        ReminderPreferencesBody,
        ReminderPreferencesRequest,
        ReminderCheckResponse,
        SubscriptionBody,
        ChannelKind
    )),
    tags((name = "Reminders", description = "Reminder preferences and digest subscription"))
)]
pub struct RemindersApiDoc;
