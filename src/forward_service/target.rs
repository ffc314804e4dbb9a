use reqwest::Url;

use crate::forward_service::forward_error::ForwardError;

/// Joins the resolved origin with the inbound path and reattaches the raw query.
///
/// Only the path is taken from the inbound request so scheme and host of the
/// origin are never prefixed twice. The query is neither decoded nor filtered.
/// A query the url parser would percent-encode (`'`, space, `"`, `<`, `>`,
/// non-ascii) cannot reach upstream byte-identical and is refused.
pub fn rewrite(origin: &str, path: &str, query: &str) -> Result<Url, ForwardError> {
  let mut target = String::with_capacity(origin.len() + path.len() + query.len() + 1);
  target.push_str(origin);
  target.push_str(path);

  if !query.is_empty() {
    target.push('?');
    target.push_str(query);
  }

  let url = Url::parse(&target)
    .map_err(|err| ForwardError::RequestConstruction(format!("invalid target '{}': {}", target, err)))?;

  let expected = if query.is_empty() { None } else { Some(query) };
  if url.query() != expected {
    return Err(ForwardError::RequestConstruction(format!(
      "query '{}' cannot be forwarded verbatim, it would be sent as '{}'",
      query,
      url.query().unwrap_or_default()
    )));
  }

  Ok(url)
}
