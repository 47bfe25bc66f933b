//! SMS delivery through the Africa's Talking bulk messaging API

use serde::Serialize;

use super::NotifyError;

const BULK_MESSAGING_URL: &str = "https://api.africastalking.com/version1/messaging/bulk";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BulkMessage<'a> {
    username: &'a str,
    message: &'a str,
    phone_numbers: Vec<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sender_id: Option<&'a str>,
}

#[derive(Debug, Clone)]
pub struct SmsClient {
    http: reqwest::Client,
    api_key: String,
    username: String,
    sender_id: Option<String>,
}

impl SmsClient {
    pub fn new(
        http: reqwest::Client,
        api_key: String,
        username: String,
        sender_id: Option<String>,
    ) -> Self {
        Self {
            http,
            api_key,
            username,
            sender_id,
        }
    }

    pub async fn send(&self, to: &str, message: &str) -> Result<(), NotifyError> {
        let payload = BulkMessage {
            username: &self.username,
            message,
            phone_numbers: vec![to],
            sender_id: self.sender_id.as_deref(),
        };

        let resp = self
            .http
            .post(BULK_MESSAGING_URL)
            .header("apiKey", &self.api_key)
            .header(http::header::ACCEPT, "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(|e| NotifyError::Sms(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(NotifyError::Sms(format!("status {status}: {body}")));
        }

        let body: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| NotifyError::Sms(e.to_string()))?;
        tracing::info!(
            to = to,
            result = %body["SMSMessageData"]["Message"],
            "SMS sent"
        );
        Ok(())
    }
}
