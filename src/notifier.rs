//! Outbound SMS transport — voip.ms REST sendSMS.

use crate::config::TransportConfig;

/// Fixed REST endpoint for the messaging transport.
pub const API_URL: &str = "https://voip.ms/api/v1/rest.php";

/// Maximum message length the transport accepts.
pub const MAX_SMS_CHARS: usize = 160;

/// Outcome of one send, logged only — the loop never branches on it.
#[derive(Debug, Clone)]
pub struct NotificationResult {
    pub destination: String,
    /// Raw response body, or the error text on transport failure.
    pub transport_response: String,
}

/// SMS sender over the HTTP transport.
pub struct Notifier {
    client: reqwest::Client,
    config: TransportConfig,
}

impl Notifier {
    pub fn new(config: TransportConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Send one SMS. No retry; any transport error becomes the response text.
    pub async fn send(&self, message: &str, destination: &str) -> NotificationResult {
        let params = sms_params(&self.config, destination, message);
        let transport_response = match self.client.get(API_URL).query(&params).send().await {
            Ok(resp) => resp
                .text()
                .await
                .unwrap_or_else(|e| format!("response read error: {e}")),
            Err(e) => format!("request error: {e}"),
        };

        NotificationResult {
            destination: destination.to_string(),
            transport_response,
        }
    }
}

/// Build the sendSMS query parameters, truncating the message to the
/// transport maximum. Truncation happens after final assembly, so it may
/// cut mid-word or mid-field.
fn sms_params(
    config: &TransportConfig,
    destination: &str,
    message: &str,
) -> Vec<(&'static str, String)> {
    vec![
        ("api_username", config.username.clone()),
        ("api_password", config.password.clone()),
        ("method", "sendSMS".to_string()),
        ("did", config.did.clone()),
        ("dst", destination.to_string()),
        ("message", truncate_chars(message, MAX_SMS_CHARS)),
    ]
}

/// Take the first `max` characters of `s`.
fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transport() -> TransportConfig {
        TransportConfig {
            username: "voipuser".into(),
            password: "voippass".into(),
            did: "5550000".into(),
        }
    }

    #[test]
    fn short_message_transmitted_verbatim() {
        let message = "short alert";
        assert_eq!(truncate_chars(message, MAX_SMS_CHARS), message);
    }

    #[test]
    fn exactly_160_chars_untouched() {
        let message = "x".repeat(160);
        assert_eq!(truncate_chars(&message, MAX_SMS_CHARS), message);
    }

    #[test]
    fn long_message_cut_to_first_160_chars() {
        let message = "a".repeat(200);
        let truncated = truncate_chars(&message, MAX_SMS_CHARS);
        assert_eq!(truncated.chars().count(), 160);
        assert_eq!(truncated, &message[..160]);
    }

    #[test]
    fn truncation_counts_chars_not_bytes() {
        let message = "é".repeat(200);
        let truncated = truncate_chars(&message, MAX_SMS_CHARS);
        assert_eq!(truncated.chars().count(), 160);
    }

    #[test]
    fn params_carry_truncated_message() {
        let long = "b".repeat(500);
        let params = sms_params(&transport(), "5551111", &long);
        let message = &params
            .iter()
            .find(|(k, _)| *k == "message")
            .expect("message param")
            .1;
        assert_eq!(message.chars().count(), 160);
    }

    #[test]
    fn params_include_transport_identity() {
        let params = sms_params(&transport(), "5551111", "hi");
        let get = |key: &str| {
            params
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.as_str())
        };
        assert_eq!(get("api_username"), Some("voipuser"));
        assert_eq!(get("method"), Some("sendSMS"));
        assert_eq!(get("did"), Some("5550000"));
        assert_eq!(get("dst"), Some("5551111"));
    }
}
