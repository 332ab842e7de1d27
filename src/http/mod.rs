//! HTTP protocol layer module
//!
//! Response builders and CORS headers, decoupled from the relay pipeline.

pub mod response;

// Re-export commonly used types
pub use response::{
    apply_cors, build_400_response, build_404_response, build_405_response, build_413_response,
    build_500_response, build_health_response, build_preflight_response, build_success_response,
};
