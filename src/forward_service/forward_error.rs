use actix_web::http::StatusCode;
use actix_web::ResponseError;
use thiserror::Error;

/// Terminal failures of a single forwarded request. None of them is retried.
#[derive(Debug, Error)]
pub enum ForwardError {
  /// The outbound request could not be built. Upstream was never contacted.
  #[error("unable to construct upstream request: {0}")]
  RequestConstruction(String),
  #[error("upstream request failed: {0}")]
  UpstreamDispatch(String),
  /// Raised after the response head was already sent to the client.
  #[error("relaying upstream body failed: {0}")]
  ResponseRelay(String),
}

impl ResponseError for ForwardError {
  fn status_code(&self) -> StatusCode {
    match self {
      ForwardError::RequestConstruction(_) => StatusCode::INTERNAL_SERVER_ERROR,
      ForwardError::UpstreamDispatch(_) => StatusCode::BAD_GATEWAY,
      ForwardError::ResponseRelay(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}
