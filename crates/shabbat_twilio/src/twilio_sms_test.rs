#[cfg(test)]
mod tests {
    use crate::twilio_sms::TwilioSmsSender;
    use shabbat_config::TwilioConfig;

    fn config(base: Option<&str>) -> TwilioConfig {
        TwilioConfig {
            account_sid: "AC123".to_string(),
            auth_token: "token".to_string(),
            phone_number: "+15550001111".to_string(),
            api_base_url: base.map(str::to_string),
        }
    }

    #[test]
    fn test_messages_url_defaults_to_twilio() {
        let sender = TwilioSmsSender::new(&config(None));
        assert_eq!(
            sender.messages_url(),
            "https://api.twilio.com/2010-04-01/Accounts/AC123/Messages.json"
        );
    }

    #[test]
    fn test_messages_url_trims_trailing_slash() {
        let sender = TwilioSmsSender::new(&config(Some("http://localhost:9999/")));
        assert_eq!(
            sender.messages_url(),
            "http://localhost:9999/2010-04-01/Accounts/AC123/Messages.json"
        );
    }

    #[test]
    fn test_debug_hides_auth_token() {
        let sender = TwilioSmsSender::new(&config(None));
        assert!(!format!("{:?}", sender).contains("token\""));
    }
}
