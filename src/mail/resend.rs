// Resend delivery client
// POSTs the composed email as JSON with bearer authentication

use async_trait::async_trait;

use super::{EmailSender, OutboundEmail, SendReceipt};
use crate::config::MailConfig;
use crate::error::MailError;
use crate::logger;

/// HTTP client for the Resend `emails` endpoint
///
/// Holds one pooled `reqwest::Client` for the life of the process.
pub struct ResendClient {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
}

impl ResendClient {
    pub fn new(config: &MailConfig) -> Result<Self, MailError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
        })
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.is_empty()
    }
}

#[async_trait]
impl EmailSender for ResendClient {
    async fn send(&self, email: &OutboundEmail) -> Result<SendReceipt, MailError> {
        if !self.has_api_key() {
            return Err(MailError::MissingApiKey);
        }

        let response = self
            .http
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(email)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MailError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        // A 2xx without a readable receipt still counts as delivered
        let body = response.text().await?;
        Ok(serde_json::from_str(&body).unwrap_or_else(|err| {
            logger::log_warning(&format!(
                "Delivery accepted with unparseable receipt ({err}): {body}"
            ));
            SendReceipt::default()
        }))
    }
}
