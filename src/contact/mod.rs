//! Contact submission module
//!
//! Request-scoped data extracted from a contact form post, plus the pipeline
//! stages that operate on it:
//! - `ingest`: multipart body → [`Submission`]
//! - `validate`: [`Submission`] fields → [`ContactForm`]
//! - `render`: [`ContactForm`] → HTML notification

pub mod ingest;
pub mod render;
pub mod validate;

use std::collections::HashMap;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hyper::body::Bytes;
use serde::{Serialize, Serializer};

pub use ingest::{ingest, IngestLimits};
pub use render::render_notification;
pub use validate::{validate, ContactForm, MissingFields};

/// One uploaded file with non-empty content
///
/// Serializes as `{"filename": ..., "content": "<base64>"}`, the shape the
/// delivery API expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attachment {
    /// Client-supplied, untrusted
    pub filename: String,
    #[serde(serialize_with = "serialize_base64")]
    pub content: Bytes,
}

fn serialize_base64<S: Serializer>(content: &Bytes, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&STANDARD.encode(content))
}

/// Everything parsed out of one multipart body
#[derive(Debug, Default)]
pub struct Submission {
    pub fields: HashMap<String, String>,
    /// In arrival order
    pub attachments: Vec<Attachment>,
}
