//! Outbound email transport. The pipeline produces a body; this module only
//! delivers it. Sends are never retried.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub const SEND_SUCCESS_MESSAGE: &str = "Email Sent Successfully";

#[derive(Debug, Clone, Deserialize)]
pub struct OutboundEmail {
    pub sender_address: String,
    /// SMTP password or app password for `sender_address`.
    pub sender_credential: String,
    pub recipient_address: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SendOutcome {
    pub success: bool,
    pub message: String,
}

impl SendOutcome {
    fn sent() -> Self {
        Self {
            success: true,
            message: SEND_SUCCESS_MESSAGE.to_string(),
        }
    }

    fn failed(detail: impl std::fmt::Display) -> Self {
        Self {
            success: false,
            message: format!("Failed: {detail}"),
        }
    }
}

#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, email: &OutboundEmail) -> SendOutcome;
}

/// STARTTLS SMTP relay authenticated with the sender's own credentials.
pub struct SmtpMailer {
    host: String,
    port: u16,
}

impl SmtpMailer {
    pub fn new(host: String, port: u16) -> Self {
        Self { host, port }
    }

    async fn try_send(&self, email: &OutboundEmail) -> Result<(), String> {
        let message = Message::builder()
            .from(
                email
                    .sender_address
                    .parse()
                    .map_err(|e| format!("Invalid from address: {e}"))?,
            )
            .to(email
                .recipient_address
                .parse()
                .map_err(|e| format!("Invalid to address: {e}"))?)
            .subject(email.subject.as_str())
            .header(ContentType::TEXT_PLAIN)
            .body(email.body.clone())
            .map_err(|e| format!("Failed to build email: {e}"))?;

        let creds = Credentials::new(
            email.sender_address.clone(),
            email.sender_credential.clone(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.host)
            .map_err(|e| format!("SMTP relay error: {e}"))?
            .port(self.port)
            .credentials(creds)
            .build();

        mailer
            .send(message)
            .await
            .map_err(|e| format!("SMTP send error: {e}"))?;

        Ok(())
    }
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn send(&self, email: &OutboundEmail) -> SendOutcome {
        match self.try_send(email).await {
            Ok(()) => {
                info!("Outreach email sent to {}", email.recipient_address);
                SendOutcome::sent()
            }
            Err(e) => {
                warn!("Outreach email to {} failed: {e}", email.recipient_address);
                SendOutcome::failed(e)
            }
        }
    }
}

#[cfg(test)]
pub mod testing {
    use std::sync::Mutex;

    use super::*;

    /// Records sends instead of delivering them.
    #[derive(Default)]
    pub struct RecordingTransport {
        pub sent: Mutex<Vec<OutboundEmail>>,
    }

    #[async_trait]
    impl MailTransport for RecordingTransport {
        async fn send(&self, email: &OutboundEmail) -> SendOutcome {
            self.sent.lock().unwrap().push(email.clone());
            SendOutcome::sent()
        }
    }
}
