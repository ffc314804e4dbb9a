use std::convert::Infallible;
use std::sync::Arc;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use futures_core::future::LocalBoxFuture;
use log::{debug, error};
use reqwest::{Client, Url};
use crate::forward_service::forward_config::ForwardConfig;
use crate::forward_service::forward_error::ForwardError;
use crate::forward_service::forward_route_service::ForwardRouteService;

pub struct ForwardRouteServiceFactory {
  pub config: Arc<ForwardConfig>,
  pub http_client: Client,
}

impl ServiceFactory<ServiceRequest> for ForwardRouteServiceFactory {
  type Response = ServiceResponse;
  type Error = Infallible;
  type Config = ();
  type Service = ForwardRouteService;
  type InitError = ();
  type Future = LocalBoxFuture<'static, Result<Self::Service, Self::InitError>>;

  fn new_service(&self, _: Self::Config) -> Self::Future {
    let origin = resolve_origin(&self.config.origin);
    let http_client = self.http_client.clone();

    Box::pin(async move {
      match origin {
        Ok(origin) => {
          debug!("Forwarder ready for origin {}", origin);
          Ok(ForwardRouteService { origin, http_client })
        }
        Err(err) => {
          error!("{}", err);
          Err(())
        }
      }
    })
  }
}

impl ForwardRouteServiceFactory {
  pub fn create(http_client: Client, config: Arc<ForwardConfig>) -> Self {
    Self {
      config,
      http_client,
    }
  }
}

/// Checks the origin is a bare `http`/`https` scheme and host and strips any
/// trailing slash, so request paths can be appended as-is.
pub fn resolve_origin(origin: &str) -> Result<Arc<str>, ForwardError> {
  let url = Url::parse(origin).map_err(|err| {
    ForwardError::RequestConstruction(format!("invalid upstream origin '{}': {}", origin, err))
  })?;

  let bare = matches!(url.scheme(), "http" | "https")
    && url.host().is_some()
    && url.path() == "/"
    && url.query().is_none()
    && url.fragment().is_none();

  if !bare {
    return Err(ForwardError::RequestConstruction(format!(
      "upstream origin '{}' must be a plain http(s) scheme and host",
      origin
    )));
  }

  Ok(Arc::from(origin.trim_end_matches('/')))
}
