use reqwest::redirect::Policy;
use reqwest::Client;

/// Outbound client shared by every worker.
///
/// No request timeout is set: a silent upstream keeps the request open.
#[derive(Default)]
pub struct HttpClientConfig {
  pub http_proxy: Option<String>,
  pub user: Option<String>,
  pub pass: Option<String>,
}

impl HttpClientConfig {
  pub fn to_client(self) -> Result<Client, reqwest::Error> {
    let HttpClientConfig {
      http_proxy,
      user,
      pass,
    } = self;
    let mut client_builder = reqwest::ClientBuilder::new();

    if let Some(proxy_url) = http_proxy {
      let mut proxy = reqwest::Proxy::all(proxy_url)?;

      if let (Some(user_name), Some(password)) = (user, pass) {
        proxy = proxy.basic_auth(&user_name, &password);
      }

      client_builder = client_builder.proxy(proxy);
    }

    let client = client_builder.redirect(Policy::default()).build()?;

    Ok(client)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn builds_without_egress_proxy() {
    assert!(HttpClientConfig::default().to_client().is_ok());
  }

  #[test]
  fn builds_with_authenticated_socks_proxy() {
    let config = HttpClientConfig {
      http_proxy: Some("socks5://127.0.0.1:1080".into()),
      user: Some("registry".into()),
      pass: Some("secret".into()),
    };

    assert!(config.to_client().is_ok());
  }

  #[test]
  fn builds_with_http_proxy_without_credentials() {
    let config = HttpClientConfig {
      http_proxy: Some("http://proxy.internal:3128".into()),
      user: Some("only-user".into()),
      pass: None,
    };

    assert!(config.to_client().is_ok());
  }
}
