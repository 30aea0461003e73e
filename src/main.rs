use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use wasm_devserver::config::{Config, Site};
use wasm_devserver::error::Result;
use wasm_devserver::server::{self, ConnectionOptions, Server};
use wasm_devserver::{handler, logger};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            logger::log_error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let cfg = Config::load()?;
    logger::init(&cfg)?;
    let site = Arc::new(Site::from_config(&cfg)?);

    // Create the Tokio runtime, sizing the worker pool from config
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    let result = runtime.block_on(async_main(&cfg, site));
    // Connections still open past the grace period are dropped here
    runtime.shutdown_timeout(Duration::from_millis(100));
    result
}

async fn async_main(cfg: &Config, site: Arc<Site>) -> Result<()> {
    let addr = cfg.get_socket_addr()?;
    let signals = server::start_signal_handler()?;

    let server = Server::bind(
        addr,
        handler::site_handler(Arc::clone(&site)),
        ConnectionOptions::from_config(cfg),
    )?;
    let local_addr = server.local_addr()?;

    logger::log_server_start(&local_addr, &cfg.server.title);
    logger::log_root(site.root());

    server.run_until(async move { signals.wait().await }).await;

    logger::log_shutdown();
    Ok(())
}
