use crate::forward_service::UPSTREAM_ORIGIN;

pub struct ForwardConfig {
  pub origin: Box<str>,
}

impl Default for ForwardConfig {
  fn default() -> Self {
    Self {
      origin: Box::from(UPSTREAM_ORIGIN),
    }
  }
}

impl ForwardConfig {
  /// Points the route at another origin. Used by tests to stand in for the registry.
  #[cfg(test)]
  pub fn with_origin(origin: &str) -> Self {
    Self {
      origin: Box::from(origin),
    }
  }
}
