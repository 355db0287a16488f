#![cfg(feature = "openapi")]

use utoipa::OpenApi;

use crate::handlers::{DigestRequest, DigestResponse, NewTipRequest};
use shabbat_common::models::ShabbatTip;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::send_shabbat_email_handler,
        crate::handlers::list_tips_handler,
        crate::handlers::add_tip_handler,
        crate::handlers::delete_tip_handler,
    ),
    components(schemas(DigestRequest, DigestResponse, NewTipRequest, ShabbatTip)),
    tags(
        (name = "Digest", description = "Friday digest email"),
        (name = "Tips", description = "Tips shown in the digest")
    )
)]
pub struct DigestApiDoc;
