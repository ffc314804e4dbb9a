use std::convert::Infallible;
use std::sync::Arc;
use actix_web::body::SizedStream;
use actix_web::dev::{self, Payload, Service, ServiceRequest, ServiceResponse};
use actix_web::{HttpRequest, HttpResponse, ResponseError};
use futures_core::future::LocalBoxFuture;
use log::{error, info};
use reqwest::{Client, Request};
use crate::forward_service::body::{self, RelayBody};
use crate::forward_service::forward_error::ForwardError;
use crate::forward_service::{headers, target};

/// Forwards one inbound request to the upstream origin and relays the answer.
pub struct ForwardRouteService {
  pub(super) origin: Arc<str>,
  pub(super) http_client: Client,
}

impl Service<ServiceRequest> for ForwardRouteService {
  type Response = ServiceResponse;
  type Error = Infallible;
  type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

  dev::always_ready!();

  fn call(&self, req: ServiceRequest) -> Self::Future {
    let (http_request, payload) = req.into_parts();
    let origin = self.origin.clone();
    let http_client = self.http_client.clone();

    Box::pin(async move {
      let response = match ForwardRouteService::forward(&http_client, &origin, &http_request, payload).await {
        Ok(response) => response,
        Err(err) => {
          error!("{}", err);
          err.error_response()
        }
      };

      Ok(ServiceResponse::new(http_request, response))
    })
  }
}

impl ForwardRouteService {
  async fn forward(
    http_client: &Client,
    origin: &str,
    inbound: &HttpRequest,
    payload: Payload,
  ) -> Result<HttpResponse, ForwardError> {
    info!("Forwarding request for {}", inbound.uri());

    let request = ForwardRouteService::init_request(http_client, origin, inbound, payload)?;
    info!("Dispatching {} {}", request.method(), request.url());

    // One attempt, never retried.
    let upstream = http_client
      .execute(request)
      .await
      .map_err(|err| ForwardError::UpstreamDispatch(err.to_string()))?;
    info!("Upstream responded with {}", upstream.status());

    let mut response = headers::client_response_head(upstream.status(), upstream.headers());
    let content_length = upstream.content_length();
    let relay = RelayBody::new(Box::pin(upstream.bytes_stream()));

    let response = match content_length {
      Some(length) => response.body(SizedStream::new(length, relay)),
      None => response.streaming(relay),
    };

    Ok(response)
  }

  fn init_request(
    http_client: &Client,
    origin: &str,
    inbound: &HttpRequest,
    payload: Payload,
  ) -> Result<Request, ForwardError> {
    let url = target::rewrite(origin, inbound.path(), inbound.query_string())?;

    let mut builder = http_client
      .request(inbound.method().clone(), url)
      .headers(headers::outbound_headers(inbound.headers()));

    if body::has_body(inbound.headers()) {
      builder = builder.body(body::request_body(payload));
    }

    builder
      .build()
      .map_err(|err| ForwardError::RequestConstruction(err.to_string()))
  }
}
