//! Multipart ingestion
//!
//! Consumes a `multipart/form-data` body in a single pass. Text parts land in
//! the field map; file parts are buffered chunk by chunk and kept only when
//! they carry at least one byte. A part is a file part when it has a filename
//! parameter or is declared `application/octet-stream`.

use std::error::Error as StdError;

use futures_util::Stream;
use hyper::body::Bytes;
use multer::{Constraints, Multipart, SizeLimit};

use super::{Attachment, Submission};
use crate::error::IngestError;

const OCTET_STREAM: &str = "application/octet-stream";

/// Filename for a file part, or `None` for a text part.
///
/// Octet-stream parts without a filename are named after their field.
fn file_part_name(field: &multer::Field<'_>) -> Option<String> {
    if let Some(filename) = field.file_name() {
        return Some(filename.to_string());
    }
    let is_binary = field
        .content_type()
        .is_some_and(|mime| mime.essence_str() == OCTET_STREAM);
    is_binary.then(|| field.name().unwrap_or("attachment").to_string())
}

/// Size limits applied while reading the body
#[derive(Debug, Clone, Copy, Default)]
pub struct IngestLimits {
    /// Cap on the whole body stream
    pub max_body_bytes: Option<u64>,
    /// Cap on any single part
    pub max_part_bytes: Option<u64>,
}

impl IngestLimits {
    fn constraints(self) -> Constraints {
        let mut limit = SizeLimit::new();
        if let Some(max) = self.max_body_bytes {
            limit = limit.whole_stream(max);
        }
        if let Some(max) = self.max_part_bytes {
            limit = limit.per_field(max);
        }
        Constraints::new().size_limit(limit)
    }
}

/// Parse a multipart body into a [`Submission`].
///
/// `content_type` is the raw request header; the boundary is taken from it.
/// Any parser or stream error aborts the whole ingestion.
pub async fn ingest<S, O, E>(
    content_type: Option<&str>,
    body: S,
    limits: IngestLimits,
) -> Result<Submission, IngestError>
where
    S: Stream<Item = Result<O, E>> + Send + 'static,
    O: Into<Bytes> + 'static,
    E: Into<Box<dyn StdError + Send + Sync>> + 'static,
{
    let boundary =
        multer::parse_boundary(content_type.unwrap_or_default()).map_err(IngestError::Boundary)?;
    let mut multipart = Multipart::with_constraints(body, boundary, limits.constraints());

    let mut submission = Submission::default();

    while let Some(mut field) = multipart.next_field().await? {
        // A filename parameter, even an empty one, or an octet-stream type marks a file part
        if let Some(filename) = file_part_name(&field) {
            let mut buffer = Vec::new();
            while let Some(chunk) = field.chunk().await? {
                buffer.extend_from_slice(&chunk);
            }
            if !buffer.is_empty() {
                submission.attachments.push(Attachment {
                    filename,
                    content: Bytes::from(buffer),
                });
            }
            continue;
        }

        let name = field.name().map(ToString::to_string);
        let value = field.text().await?;
        if let Some(name) = name {
            submission.fields.insert(name, value);
        }
    }

    Ok(submission)
}
