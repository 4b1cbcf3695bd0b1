//! Transactional email API client
//!
//! Posts messages to a Postmark-compatible HTTP API. When delivery is
//! disabled in configuration, messages are only logged.

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;

use crate::config::EmailConfig;
use crate::error::{AppError, AppResult};

/// Header carrying the API server token
const TOKEN_HEADER: &str = "X-Postmark-Server-Token";

/// A rendered message ready to send
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html_body: String,
    pub text_body: String,
}

/// Email API client
#[derive(Clone)]
pub struct EmailClient {
    client: Client,
    base_url: String,
    sender: String,
    authorization_token: String,
    enabled: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html_body: &'a str,
    text_body: &'a str,
}

impl EmailClient {
    /// Create a new client from configuration
    pub fn new(config: &EmailConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build email client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            sender: config.sender.clone(),
            authorization_token: config.authorization_token.clone(),
            enabled: config.enabled,
        })
    }

    #[cfg(test)]
    pub fn with_base_url(config: &EmailConfig, base_url: &str) -> AppResult<Self> {
        let mut client = Self::new(config)?;
        client.base_url = base_url.trim_end_matches('/').to_string();
        Ok(client)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Deliver one message
    pub async fn send(&self, message: &EmailMessage) -> AppResult<()> {
        if !self.enabled {
            tracing::info!(
                to = %message.to,
                subject = %message.subject,
                "Email delivery disabled; message not sent"
            );
            return Ok(());
        }

        let url = format!("{}/email", self.base_url);
        let body = SendEmailRequest {
            from: &self.sender,
            to: &message.to,
            subject: &message.subject,
            html_body: &message.html_body,
            text_body: &message.text_body,
        };

        let response = self
            .client
            .post(&url)
            .header(TOKEN_HEADER, &self.authorization_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("Email API request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalService(format!(
                "Email API error {}: {}",
                status, error_text
            )));
        }

        tracing::debug!(to = %message.to, subject = %message.subject, "Email sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(enabled: bool) -> EmailConfig {
        EmailConfig {
            enabled,
            api_base_url: "http://127.0.0.1:9".to_string(),
            authorization_token: "token".to_string(),
            sender: "no-reply@msme.local".to_string(),
            timeout_ms: 200,
            site_url: "http://localhost".to_string(),
        }
    }

    fn message() -> EmailMessage {
        EmailMessage {
            to: "owner@example.com".to_string(),
            subject: "Hello".to_string(),
            html_body: "<p>Hello</p>".to_string(),
            text_body: "Hello".to_string(),
        }
    }

    #[test]
    fn request_body_uses_api_field_names() {
        let body = SendEmailRequest {
            from: "a@x",
            to: "b@x",
            subject: "s",
            html_body: "h",
            text_body: "t",
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["From"], "a@x");
        assert_eq!(json["HtmlBody"], "h");
        assert_eq!(json["TextBody"], "t");
    }

    #[test]
    fn disabled_client_does_not_call_api() {
        let client = EmailClient::new(&config(false)).unwrap();
        assert!(!client.is_enabled());
        assert!(tokio_test::block_on(client.send(&message())).is_ok());
    }

    #[tokio::test]
    async fn unreachable_api_is_external_error() {
        let client = EmailClient::with_base_url(&config(true), "http://127.0.0.1:9/").unwrap();
        let err = client.send(&message()).await.unwrap_err();
        assert!(matches!(err, AppError::ExternalService(_)));
    }
}
