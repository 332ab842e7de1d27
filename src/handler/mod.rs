//! Request handler module
//!
//! The request gate (routing, method dispatch, CORS) and the contact relay
//! pipeline behind it.

pub mod relay;
pub mod router;

// Re-export main entry point
pub use router::handle_request;
