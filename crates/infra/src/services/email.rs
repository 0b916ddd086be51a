use super::TransportConfigError;
use crate::config::EmailConfig;
use nudge_domain::DeliveryStatus;
use reqwest::Client;
use serde::Serialize;
use std::sync::Mutex;
use tracing::error;

#[derive(Debug, Clone, PartialEq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[async_trait::async_trait]
pub trait IEmailTransport: Send + Sync {
    fn ensure_configured(&self) -> Result<(), TransportConfigError>;
    /// Never fails, the outcome is reported as a `DeliveryStatus`
    async fn send(&self, message: &EmailMessage) -> DeliveryStatus;
}

#[derive(Debug, Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: Vec<&'a str>,
    subject: &'a str,
    html: &'a str,
}

/// Sends through a Resend compatible json API
pub struct HttpEmailTransport {
    client: Client,
    config: Option<EmailConfig>,
}

impl HttpEmailTransport {
    pub fn new(config: Option<EmailConfig>) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

#[async_trait::async_trait]
impl IEmailTransport for HttpEmailTransport {
    fn ensure_configured(&self) -> Result<(), TransportConfigError> {
        self.config
            .as_ref()
            .map(|_| ())
            .ok_or(TransportConfigError::Email)
    }

    async fn send(&self, message: &EmailMessage) -> DeliveryStatus {
        let config = match &self.config {
            Some(config) => config,
            None => return DeliveryStatus::Skipped,
        };
        let body = SendEmailRequest {
            from: &config.from,
            to: vec![&message.to],
            subject: &message.subject,
            html: &message.html,
        };

        match self
            .client
            .post(&config.api_url)
            .header("authorization", format!("Bearer {}", config.api_key))
            .json(&body)
            .send()
            .await
        {
            Ok(res) if res.status().is_success() => DeliveryStatus::Sent,
            Ok(res) => {
                let status = res.status();
                let text = res.text().await.unwrap_or_default();
                error!(
                    "[Rejected] Email API responded with status: {}. Body: {}",
                    status, text
                );
                DeliveryStatus::Failed
            }
            Err(e) => {
                error!("[Network Error] Email API error. Error message: {:?}", e);
                DeliveryStatus::Error
            }
        }
    }
}

/// Records messages instead of sending them
pub struct InMemoryEmailTransport {
    configured: bool,
    outcome: Mutex<DeliveryStatus>,
    sent: Mutex<Vec<EmailMessage>>,
}

impl InMemoryEmailTransport {
    pub fn new() -> Self {
        Self {
            configured: true,
            outcome: Mutex::new(DeliveryStatus::Sent),
            sent: Mutex::new(vec![]),
        }
    }

    pub fn unconfigured() -> Self {
        Self {
            configured: false,
            ..Self::new()
        }
    }

    /// Status reported by subsequent sends
    pub fn set_outcome(&self, status: DeliveryStatus) {
        *self.outcome.lock().unwrap() = status;
    }

    /// Every message passed to `send`, whatever the outcome
    pub fn messages(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }
}

impl Default for InMemoryEmailTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl IEmailTransport for InMemoryEmailTransport {
    fn ensure_configured(&self) -> Result<(), TransportConfigError> {
        if self.configured {
            Ok(())
        } else {
            Err(TransportConfigError::Email)
        }
    }

    async fn send(&self, message: &EmailMessage) -> DeliveryStatus {
        self.sent.lock().unwrap().push(message.clone());
        *self.outcome.lock().unwrap()
    }
}
