use clap::Parser;
use log::LevelFilter;
use crate::http_client::HttpClientConfig;

pub const DEFAULT_PORT: u16 = 8080;
const DEFAULT_WORKER_COUNT: usize = 4;
const DEFAULT_BIND: &str = "0.0.0.0";

/// Forwards registry listing requests to Docker Hub with a permissive CORS header.
#[derive(Parser, Debug)]
#[command(name = "hub_proxy", version, about)]
pub struct ServerConfig {
    /// Address to listen on.
    #[arg(long, env = "HTTP_BIND", default_value = DEFAULT_BIND)]
    pub bind: String,

    #[arg(long, env = "HTTP_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    #[arg(long, env = "HTTP_WORKER_COUNT", default_value_t = DEFAULT_WORKER_COUNT)]
    pub worker_count: usize,

    /// Egress proxy used to reach the registry (http, https or socks5 url).
    #[arg(long, env = "HTTP_PROXY_URL")]
    pub proxy_url: Option<String>,

    #[arg(long, env = "HTTP_PROXY_USER")]
    pub proxy_user: Option<String>,

    #[arg(long, env = "HTTP_PROXY_PASS")]
    pub proxy_pass: Option<String>,

    /// off, error, warn, info, debug or trace.
    #[arg(long, env = "LOG_LEVEL", default_value_t = LevelFilter::Info)]
    pub log_level: LevelFilter,
}

impl ServerConfig {
    pub fn http_client_config(&self) -> HttpClientConfig {
        HttpClientConfig {
            http_proxy: self.proxy_url.clone(),
            user: self.proxy_user.clone(),
            pass: self.proxy_pass.clone(),
        }
    }
}
