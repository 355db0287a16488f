//! HTML bodies for the reminder and digest emails.

use askama::Template;
use shabbat_common::services::{EmailMessage, REMINDER_TITLE};

use crate::error::EmailError;

pub const REMINDER_SUBJECT: &str = REMINDER_TITLE;
pub const DIGEST_SUBJECT: &str = "Shabbat Times - Friday Digest";

#[derive(Template)]
#[template(path = "email/reminder.html")]
pub struct ReminderEmail<'a> {
    pub city_name: &'a str,
    pub candle_lighting_time: &'a str,
}

impl ReminderEmail<'_> {
    pub fn to_message(&self, to: &str) -> Result<EmailMessage, EmailError> {
        Ok(EmailMessage {
            to: to.to_string(),
            subject: REMINDER_SUBJECT.to_string(),
            html: self.render()?,
        })
    }
}

/// Times are pre-formatted by the caller.
#[derive(Template)]
#[template(path = "email/digest.html")]
pub struct DigestEmail<'a> {
    pub city_name: &'a str,
    pub candle_lighting: &'a str,
    pub sunset: &'a str,
    pub havdalah: &'a str,
    pub tip: &'a str,
    pub unsubscribe_url: &'a str,
}

impl DigestEmail<'_> {
    pub fn to_message(&self, to: &str) -> Result<EmailMessage, EmailError> {
        Ok(EmailMessage {
            to: to.to_string(),
            subject: DIGEST_SUBJECT.to_string(),
            html: self.render()?,
        })
    }
}
