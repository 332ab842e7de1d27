// Application state module
// Immutable per-process state shared by every connection

use std::sync::Arc;

use super::types::Config;
use crate::mail::EmailSender;

/// Application state
///
/// Built once at startup and shared read-only across requests. The email
/// sender is injected so tests can substitute a fake delivery service.
pub struct AppState {
    pub config: Config,
    pub mailer: Arc<dyn EmailSender>,
}

impl AppState {
    pub fn new(config: Config, mailer: Arc<dyn EmailSender>) -> Self {
        Self { config, mailer }
    }
}
