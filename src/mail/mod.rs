//! Outbound email module
//!
//! The relay only ever talks to the delivery service through [`EmailSender`],
//! so the concrete client is chosen once at startup and tests can swap in a
//! fake.

mod resend;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::MailConfig;
use crate::contact::{Attachment, ContactForm};
use crate::error::MailError;

pub use resend::ResendClient;

/// A fully composed notification, in the delivery API's JSON shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboundEmail {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
    pub reply_to: String,
    pub attachments: Vec<Attachment>,
}

impl OutboundEmail {
    /// Address the rendered notification from the fixed sender to the fixed
    /// recipient, with replies going to the submitter.
    pub fn compose(
        mail: &MailConfig,
        form: &ContactForm,
        html: String,
        attachments: Vec<Attachment>,
    ) -> Self {
        Self {
            from: mail.from.clone(),
            to: vec![mail.to.clone()],
            subject: mail.subject.clone(),
            html,
            reply_to: form.email.clone(),
            attachments,
        }
    }
}

/// What the delivery service hands back for an accepted message
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SendReceipt {
    #[serde(default)]
    pub id: Option<String>,
}

/// A transactional email delivery service
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, email: &OutboundEmail) -> Result<SendReceipt, MailError>;
}
