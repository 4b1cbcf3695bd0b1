//! Email notifications sent after directory state changes
//!
//! Delivery is fire-and-forget: the message is handed to a background task
//! once the triggering write has committed, and failures are only logged.

use crate::external::{EmailClient, EmailMessage};
use crate::models::VerificationStatus;

/// Event a business is told about
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// Registration stored and waiting for review
    RegistrationReceived { business_name: String },
    /// Review finished with the given status
    StatusChanged {
        business_name: String,
        status: VerificationStatus,
    },
    /// Password-reset code
    PasswordResetCode { otp: String, expiry_minutes: i64 },
}

impl Notification {
    /// Render the message for one recipient; `None` when the event sends nothing
    pub fn render(&self, to: &str, site_url: &str) -> Option<EmailMessage> {
        let (subject, lines) = match self {
            Notification::RegistrationReceived { business_name } => (
                "Your MSME registration has been received".to_string(),
                vec![
                    format!("Thank you for registering {} in the MSME Business Directory.", business_name),
                    "Our team will review your details and let you know once your listing is verified.".to_string(),
                ],
            ),
            Notification::StatusChanged {
                business_name,
                status: VerificationStatus::Verified,
            } => (
                "Your MSME listing has been verified".to_string(),
                vec![
                    format!("Good news: {} is now verified and visible in the directory.", business_name),
                    format!("You can sign in at {} to keep your details up to date.", site_url),
                ],
            ),
            Notification::StatusChanged {
                business_name,
                status: VerificationStatus::Unverified,
            } => (
                "Your MSME listing could not be verified".to_string(),
                vec![
                    format!("We were unable to verify the listing for {}.", business_name),
                    format!("Please sign in at {} and review the information you submitted.", site_url),
                ],
            ),
            Notification::StatusChanged {
                status: VerificationStatus::Pending,
                ..
            } => return None,
            Notification::PasswordResetCode { otp, expiry_minutes } => (
                "Your password reset code".to_string(),
                vec![
                    format!("Your one-time code is {}.", otp),
                    format!("It expires in {} minutes. If you did not request a reset, ignore this email.", expiry_minutes),
                ],
            ),
        };

        let text_body = lines.join("\n\n");
        let html_body = lines
            .iter()
            .map(|line| format!("<p>{}</p>", escape_html(line)))
            .collect::<String>();

        Some(EmailMessage {
            to: to.to_string(),
            subject,
            html_body,
            text_body,
        })
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Sends notifications through the email client
#[derive(Clone)]
pub struct NotificationService {
    client: EmailClient,
    site_url: String,
}

impl NotificationService {
    pub fn new(client: EmailClient, site_url: impl Into<String>) -> Self {
        Self {
            client,
            site_url: site_url.into(),
        }
    }

    /// Queue a notification for background delivery
    pub fn dispatch(&self, to: &str, notification: Notification) {
        let Some(message) = notification.render(to, &self.site_url) else {
            return;
        };

        let client = self.client.clone();
        tokio::spawn(async move {
            if let Err(e) = client.send(&message).await {
                tracing::warn!(to = %message.to, subject = %message.subject, "Email delivery failed: {}", e);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_status_sends_nothing() {
        let n = Notification::StatusChanged {
            business_name: "Acme".into(),
            status: VerificationStatus::Pending,
        };
        assert!(n.render("a@b.c", "http://site").is_none());
    }

    #[test]
    fn verified_message_names_business() {
        let n = Notification::StatusChanged {
            business_name: "Acme Bakery".into(),
            status: VerificationStatus::Verified,
        };
        let msg = n.render("owner@acme.sz", "http://site").unwrap();
        assert_eq!(msg.to, "owner@acme.sz");
        assert!(msg.subject.contains("verified"));
        assert!(msg.text_body.contains("Acme Bakery"));
    }

    #[test]
    fn otp_message_carries_code_and_expiry() {
        let n = Notification::PasswordResetCode {
            otp: "042917".into(),
            expiry_minutes: 10,
        };
        let msg = n.render("x@y.z", "http://site").unwrap();
        assert!(msg.text_body.contains("042917"));
        assert!(msg.text_body.contains("10 minutes"));
    }

    #[test]
    fn html_body_is_escaped() {
        let n = Notification::RegistrationReceived {
            business_name: "<script>Tom & Co</script>".into(),
        };
        let msg = n.render("x@y.z", "http://site").unwrap();
        assert!(!msg.html_body.contains("<script>"));
        assert!(msg.html_body.contains("Tom &amp; Co"));
    }
}
