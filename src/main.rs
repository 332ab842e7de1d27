use std::sync::Arc;

mod config;
mod contact;
mod error;
mod handler;
mod http;
mod logger;
mod mail;
mod server;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Optional config file path (without extension) as the only argument
    let config_path = std::env::args().nth(1).unwrap_or_else(|| "config".to_string());
    let cfg = config::Config::load_from(&config_path)?;
    logger::init(&cfg)?;

    // Create Tokio runtime, sizing the worker pool from configuration
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }

    let runtime = runtime_builder.build()?;
    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let listener = server::create_reusable_listener(addr)?;

    let mailer = mail::ResendClient::new(&cfg.mail)?;
    if !mailer.has_api_key() {
        logger::log_warning(&format!(
            "{} is not set; every submission will fail with 500",
            config::API_KEY_ENV
        ));
    }

    logger::log_server_start(&addr, &cfg);

    let state = Arc::new(config::AppState::new(cfg, Arc::new(mailer)));
    server::start_server_loop(listener, state).await;

    Ok(())
}
