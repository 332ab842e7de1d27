//! Contact relay pipeline
//!
//! ingest → validate → render → send, with one error boundary around the
//! whole thing. Validation failures are answered locally; everything else
//! that goes wrong is logged and collapsed into the generic 500.

use std::error::Error as StdError;

use http_body_util::{BodyExt, Full};
use hyper::body::{Body, Bytes};
use hyper::header::CONTENT_TYPE;
use hyper::{Request, Response};

use crate::config::AppState;
use crate::contact::{self, IngestLimits, MissingFields};
use crate::error::RelayError;
use crate::http;
use crate::logger;
use crate::mail::OutboundEmail;

/// How a well-formed pass through the pipeline ended
enum Outcome {
    Sent,
    Invalid(MissingFields),
}

/// Relay one POSTed submission and build the response for it
pub async fn handle_submission<B>(req: Request<B>, state: &AppState) -> Response<Full<Bytes>>
where
    B: Body + Send + 'static,
    B::Data: Into<Bytes> + Send + 'static,
    B::Error: Into<Box<dyn StdError + Send + Sync>> + Send + 'static,
{
    match relay(req, state).await {
        Ok(Outcome::Sent) => http::build_success_response(),
        Ok(Outcome::Invalid(missing)) => {
            logger::log_warning(&format!("Rejected submission, {missing}"));
            http::build_400_response()
        }
        Err(err) => {
            logger::log_relay_failure(&err);
            http::build_500_response()
        }
    }
}

async fn relay<B>(req: Request<B>, state: &AppState) -> Result<Outcome, RelayError>
where
    B: Body + Send + 'static,
    B::Data: Into<Bytes> + Send + 'static,
    B::Error: Into<Box<dyn StdError + Send + Sync>> + Send + 'static,
{
    let config = &state.config;
    let content_type = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string);
    let limits = IngestLimits {
        max_body_bytes: Some(config.http.max_body_size),
        max_part_bytes: config.mail.max_attachment_bytes,
    };

    let submission = contact::ingest(
        content_type.as_deref(),
        req.into_body().into_data_stream(),
        limits,
    )
    .await?;

    logger::log_submission(
        submission.fields.len(),
        submission.attachments.len(),
        submission.attachments.iter().map(|a| a.content.len()).sum(),
    );

    let form = match contact::validate(&submission.fields) {
        Ok(form) => form,
        Err(missing) => return Ok(Outcome::Invalid(missing)),
    };

    let html = contact::render_notification(&form, config.mail.escape_html);
    let email = OutboundEmail::compose(&config.mail, &form, html, submission.attachments);

    let receipt = state.mailer.send(&email).await?;
    logger::log_delivery(receipt.id.as_deref());

    Ok(Outcome::Sent)
}
