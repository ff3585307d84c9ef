//! Minimal Telegram Bot API client: long-polled updates in, messages out.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::info;

const API_BASE: &str = "https://api.telegram.org";

/// Extra headroom on the HTTP timeout for long-poll requests, which are
/// expected to hang for the full poll duration.
const LONG_POLL_GRACE: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct TelegramClient {
    client: Client,
    token: String,
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub from: Option<User>,
    pub chat: Chat,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: i64,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct GetUpdatesRequest {
    timeout: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    offset: Option<i64>,
    allowed_updates: &'static [&'static str],
}

impl TelegramClient {
    pub fn new(token: String, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout + LONG_POLL_GRACE)
            .build()
            .expect("Failed to create HTTP client");
        Self { client, token }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{API_BASE}/bot{}/{}", self.token, method)
    }

    /// Long-poll for new updates, returning after `poll_timeout` at the latest.
    pub async fn get_updates(
        &self,
        offset: Option<i64>,
        poll_timeout: Duration,
    ) -> Result<Vec<Update>> {
        let request = GetUpdatesRequest {
            timeout: poll_timeout.as_secs(),
            offset,
            allowed_updates: &["message"],
        };

        let response = self
            .client
            .post(self.method_url("getUpdates"))
            .timeout(poll_timeout + LONG_POLL_GRACE)
            .json(&request)
            .send()
            .await
            .context("Failed to send getUpdates request")?;

        let body: ApiResponse<Vec<Update>> = check_status(response)
            .await?
            .json()
            .await
            .context("Failed to parse getUpdates response")?;
        into_result(body, "getUpdates")
    }

    /// Send a MarkdownV2-formatted message.
    pub async fn send_markdown(&self, chat_id: i64, text: &str) -> Result<()> {
        self.send_message(chat_id, text, Some("MarkdownV2")).await
    }

    /// Send a plain-text message (no markup interpretation).
    pub async fn send_plain(&self, chat_id: i64, text: &str) -> Result<()> {
        self.send_message(chat_id, text, None).await
    }

    async fn send_message(&self, chat_id: i64, text: &str, parse_mode: Option<&str>) -> Result<()> {
        let request = SendMessageRequest {
            chat_id,
            text,
            parse_mode,
        };

        let response = self
            .client
            .post(self.method_url("sendMessage"))
            .json(&request)
            .send()
            .await
            .context("Failed to send sendMessage request")?;

        let body: ApiResponse<Message> = check_status(response)
            .await?
            .json()
            .await
            .context("Failed to parse sendMessage response")?;
        let message = into_result(body, "sendMessage")?;
        info!(
            "Sent message {} to chat {}",
            message.message_id, message.chat.id
        );
        Ok(())
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let error_text = response
        .text()
        .await
        .unwrap_or_else(|_| "<unreadable body>".to_string());
    Err(anyhow!("Telegram API error: {} - {}", status, error_text))
}

fn into_result<T>(body: ApiResponse<T>, method: &str) -> Result<T> {
    if !body.ok {
        return Err(anyhow!(
            "Telegram {} returned ok=false: {}",
            method,
            body.description.unwrap_or_else(|| "no description".to_string())
        ));
    }
    body.result
        .ok_or_else(|| anyhow!("Telegram {} returned ok=true but no result", method))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_get_updates_payload() {
        let payload = r#"{
            "ok": true,
            "result": [{
                "update_id": 101,
                "message": {
                    "message_id": 7,
                    "from": {"id": 42, "is_bot": false, "first_name": "A"},
                    "chat": {"id": -100123, "type": "group"},
                    "text": "/check"
                }
            }]
        }"#;
        let body: ApiResponse<Vec<Update>> = serde_json::from_str(payload).unwrap();
        let updates = into_result(body, "getUpdates").unwrap();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].update_id, 101);

        let message = updates[0].message.as_ref().unwrap();
        assert_eq!(message.chat.id, -100123);
        assert_eq!(message.from.as_ref().unwrap().id, 42);
        assert_eq!(message.text.as_deref(), Some("/check"));
    }

    #[test]
    fn test_api_error_payload_surfaces_description() {
        let payload = r#"{"ok": false, "description": "Unauthorized"}"#;
        let body: ApiResponse<Vec<Update>> = serde_json::from_str(payload).unwrap();
        let err = into_result(body, "getUpdates").unwrap_err();
        assert!(err.to_string().contains("Unauthorized"));
    }

    #[test]
    fn test_send_message_request_omits_parse_mode_when_plain() {
        let request = SendMessageRequest {
            chat_id: 5,
            text: "hi",
            parse_mode: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("parse_mode").is_none());

        let request = SendMessageRequest {
            chat_id: 5,
            text: "hi",
            parse_mode: Some("MarkdownV2"),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["parse_mode"], "MarkdownV2");
    }
}
