use std::sync::Arc;
use actix_web::web;
use reqwest::Client;
use crate::forward_service::forward_config::ForwardConfig;
use crate::forward_service::forward_factory::ForwardRouteServiceFactory;

pub mod body;
pub mod forward_config;
pub mod forward_error;
pub mod forward_factory;
pub mod forward_route_service;
pub mod headers;
pub mod target;

/// Every matched request is sent here; not configurable.
pub const UPSTREAM_ORIGIN: &str = "https://hub.docker.com";

/// The only forwarded route. Matched literally, trailing slash included.
pub const FORWARD_PATH: &str = "/v2/namespaces/pegi3s/repositories/";

/// Registers the forwarding route on an app.
///
/// Only `GET` on [`FORWARD_PATH`] reaches the forwarder; other methods on the path
/// get the resource's 405 and other paths fall through to the app's 404.
pub fn routes(http_client: Client, config: Arc<ForwardConfig>) -> impl FnOnce(&mut web::ServiceConfig) {
  move |cfg: &mut web::ServiceConfig| {
    let factory = ForwardRouteServiceFactory::create(http_client, config);
    cfg.service(web::resource(FORWARD_PATH).route(web::get().service(factory)));
  }
}
