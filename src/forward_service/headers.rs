use actix_web::http::header::{HeaderMap as InboundHeaders, ACCESS_CONTROL_ALLOW_ORIGIN, HOST};
use actix_web::{HttpResponse, HttpResponseBuilder};
use reqwest::header::HeaderMap;
use reqwest::StatusCode;

/// Copies every inbound header line onto the outbound request.
///
/// Duplicate lines survive in their original order. `Host` is left to the
/// transport, which derives it from the target url.
pub fn outbound_headers(inbound: &InboundHeaders) -> HeaderMap {
  let mut headers = HeaderMap::with_capacity(inbound.len());

  for (name, value) in inbound.iter() {
    if name == HOST {
      continue;
    }

    headers.append(name.clone(), value.clone());
  }

  headers
}

/// Starts the client response: CORS overlay first, then every upstream line.
///
/// Upstream lines are appended, not merged, so an upstream
/// `Access-Control-Allow-Origin` ends up next to the injected one.
pub fn client_response_head(status: StatusCode, upstream: &HeaderMap) -> HttpResponseBuilder {
  let mut response = HttpResponse::build(status);
  response.insert_header((ACCESS_CONTROL_ALLOW_ORIGIN, "*"));

  for (name, value) in upstream.iter() {
    response.append_header((name.clone(), value.clone()));
  }

  response
}
