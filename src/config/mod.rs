// Configuration module entry point
// Loads layered configuration and holds the per-process application state

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::{Config, MailConfig};

/// Environment variable holding the email delivery API key
pub const API_KEY_ENV: &str = "RESEND_API_KEY";

impl Config {
    /// Load configuration from specified file path (without extension)
    /// Default config file is "config.toml" when no path specified
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("RELAY")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("performance.shutdown_grace", 10)?
            .set_default("http.route_path", "/api/send")?
            .set_default("http.allowed_origin", "https://cinedot.in")?
            .set_default("http.server_name", "contact-relay/0.1")?
            .set_default("http.max_body_size", 10_485_760)? // 10MB
            .set_default("mail.api_url", "https://api.resend.com/emails")?
            .set_default("mail.from", "Cinedot Contact <onboarding@resend.dev>")?
            .set_default("mail.to", "info@cinedot.in")?
            .set_default("mail.subject", "📩 New Contact Form Submission — Cinedot")?
            .set_override_option("mail.api_key", std::env::var(API_KEY_ENV).ok())?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

#[cfg(test)]
pub(crate) fn test_config() -> Config {
    use types::{HealthConfig, HttpConfig, LoggingConfig, PerformanceConfig, ServerConfig};

    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            workers: None,
        },
        logging: LoggingConfig {
            level: "info".to_string(),
            access_log: false,
            access_log_format: "combined".to_string(),
            access_log_file: None,
            error_log_file: None,
        },
        performance: PerformanceConfig {
            keep_alive_timeout: 75,
            read_timeout: 30,
            write_timeout: 30,
            max_connections: None,
            shutdown_grace: 10,
        },
        http: HttpConfig {
            route_path: "/api/send".to_string(),
            allowed_origin: "https://cinedot.in".to_string(),
            server_name: "contact-relay/test".to_string(),
            max_body_size: 1_048_576,
        },
        health: HealthConfig::default(),
        mail: MailConfig {
            api_url: "http://127.0.0.1:9/emails".to_string(),
            api_key: "re_test".to_string(),
            from: "Cinedot Contact <onboarding@resend.dev>".to_string(),
            to: "info@cinedot.in".to_string(),
            subject: "📩 New Contact Form Submission — Cinedot".to_string(),
            max_attachment_bytes: None,
            escape_html: false,
        },
    }
}
