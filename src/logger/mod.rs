//! Logger module
//!
//! Provides logging utilities for the relay including:
//! - Server lifecycle logging
//! - Access logging with multiple formats
//! - Submission, delivery and failure logging
//! - File-based logging support

mod format;
pub mod writer;

pub use format::AccessLogEntry;

use crate::config::Config;
use std::fmt::Write;
use std::net::SocketAddr;

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    writer::init(
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
    )
}

/// Write to info/access log
fn write_info(message: &str) {
    match writer::get() {
        Some(w) => w.write_access(message),
        None => println!("{message}"),
    }
}

/// Write to error log
fn write_error(message: &str) {
    match writer::get() {
        Some(w) => w.write_error(message),
        None => eprintln!("{message}"),
    }
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    write_info("======================================");
    write_info("Contact relay started");
    write_info(&format!(
        "Listening on: http://{addr}{}",
        config.http.route_path
    ));
    write_info(&format!("Allowed origin: {}", config.http.allowed_origin));
    write_info(&format!("Delivering to: {}", config.mail.to));
    write_info(&format!("Log level: {}", config.logging.level));
    if let Some(workers) = config.server.workers {
        write_info(&format!("Worker threads: {workers}"));
    }
    if let Some(ref path) = config.logging.access_log_file {
        write_info(&format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write_info(&format!("Error log: {path}"));
    }
    write_info("======================================\n");
}

pub fn log_shutdown(signal: &str, active: usize) {
    write_info(&format!(
        "[Shutdown] {signal} received, draining {active} active connection(s)"
    ));
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    write_info(&format!("[Connection] Accepted from: {peer_addr}"));
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    write_error(&format!("[ERROR] Failed to serve connection: {err:?}"));
}

pub fn log_error(message: &str) {
    write_error(&format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write_error(&format!("[WARN] {message}"));
}

/// Log a parsed submission; field values stay out of the logs
pub fn log_submission(fields: usize, attachments: usize, attachment_bytes: usize) {
    write_info(&format!(
        "[Relay] Submission parsed: {fields} field(s), {attachments} attachment(s), {attachment_bytes} bytes"
    ));
}

pub fn log_delivery(receipt_id: Option<&str>) {
    write_info(&format!(
        "[Relay] Email accepted for delivery, id={}",
        receipt_id.unwrap_or("-")
    ));
}

/// Log the full cause of a 500; the client only ever sees a generic body
pub fn log_relay_failure(err: &(dyn std::error::Error + 'static)) {
    let mut message = format!("[RELAY ERROR] {err}");
    let mut source = err.source();
    while let Some(cause) = source {
        let _ = write!(message, "\n  caused by: {cause}");
        source = cause.source();
    }
    write_error(&message);
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    write_info(&entry.format(format));
}
