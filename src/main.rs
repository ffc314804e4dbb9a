mod forward_service;
mod http_client;
mod server_config;
mod std_logger;

use std::io::{ErrorKind, Result};
use std::sync::Arc;
use actix_web::{App, HttpServer};
use clap::Parser;
use log::info;
use forward_service::forward_config::ForwardConfig;
use forward_service::{FORWARD_PATH, UPSTREAM_ORIGIN};
use server_config::ServerConfig;

#[actix_web::main]
async fn main() -> Result<()> {
    let config = ServerConfig::parse();

    std_logger::init(config.log_level)
        .map_err(|error| std::io::Error::new(ErrorKind::Other, error))?;

    let http_client = config.http_client_config()
        .to_client()
        .map_err(|error| std::io::Error::new(ErrorKind::Other, error))?;

    let forward_config = Arc::new(ForwardConfig::default());

    info!("Forwarding GET '{}' to '{}'.", FORWARD_PATH, UPSTREAM_ORIGIN);
    let server = HttpServer::new(move || {
        App::new()
            .configure(forward_service::routes(http_client.clone(), forward_config.clone()))
    })
        .workers(config.worker_count)
        .bind((config.bind.as_str(), config.port))?;

    info!("Proxy server listening on {}:{}", config.bind, config.port);
    server.run().await
}
