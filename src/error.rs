//! Error types
//!
//! Every failure past the request gate ends up as a [`RelayError`], which the
//! handler logs in full and answers with a detail-free 500.

use std::error::Error;
use std::fmt::{self, Display, Formatter};

/// Failure while consuming the multipart request body
#[derive(Debug)]
pub enum IngestError {
    /// The `Content-Type` header is missing, not multipart, or has no boundary
    Boundary(multer::Error),
    /// The body stream was malformed, unreadable, or exceeded a size limit
    Multipart(multer::Error),
}

impl Display for IngestError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boundary(err) => write!(f, "invalid multipart content type: {err}"),
            Self::Multipart(err) => write!(f, "malformed multipart body: {err}"),
        }
    }
}

impl Error for IngestError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Boundary(err) | Self::Multipart(err) => Some(err),
        }
    }
}

impl From<multer::Error> for IngestError {
    #[inline]
    fn from(err: multer::Error) -> Self {
        Self::Multipart(err)
    }
}

/// Failure while handing the notification to the delivery service
#[derive(Debug)]
pub enum MailError {
    /// No API key was configured at startup
    MissingApiKey,
    /// The request never completed (DNS, TLS, connection reset, ...)
    Transport(reqwest::Error),
    /// The service answered with a non-success status
    Rejected { status: u16, body: String },
}

impl Display for MailError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingApiKey => f.write_str("email API key is not configured"),
            Self::Transport(err) => write!(f, "email API request failed: {err}"),
            Self::Rejected { status, body } => {
                write!(f, "email API rejected the message ({status}): {body}")
            }
        }
    }
}

impl Error for MailError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Transport(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for MailError {
    #[inline]
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err)
    }
}

/// Anything that sends a submission down the 500 path
#[derive(Debug)]
pub enum RelayError {
    Ingest(IngestError),
    Delivery(MailError),
}

impl Display for RelayError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ingest(err) => Display::fmt(err, f),
            Self::Delivery(err) => Display::fmt(err, f),
        }
    }
}

impl Error for RelayError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Ingest(err) => Some(err),
            Self::Delivery(err) => Some(err),
        }
    }
}

impl From<IngestError> for RelayError {
    #[inline]
    fn from(err: IngestError) -> Self {
        Self::Ingest(err)
    }
}

impl From<MailError> for RelayError {
    #[inline]
    fn from(err: MailError) -> Self {
        Self::Delivery(err)
    }
}
