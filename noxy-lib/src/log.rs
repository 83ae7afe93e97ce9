use std::net::SocketAddr;
pub use tracing::{debug, error, info, warn};

/// Compact access log emitted once per request with the final status code.
#[derive(Debug, Clone)]
pub struct MessageLog {
  pub client_addr: String,
  pub method: String,
  pub host: String,
  pub p_and_q: String,
  pub version: hyper::Version,
  pub ua: String,
  pub status: String,
}

impl<T> From<&hyper::Request<T>> for MessageLog {
  fn from(req: &hyper::Request<T>) -> Self {
    let header_mapper = |v: hyper::header::HeaderName| {
      req
        .headers()
        .get(v)
        .map_or_else(|| "", |s| s.to_str().unwrap_or(""))
        .to_string()
    };
    Self {
      client_addr: "".to_string(),
      method: req.method().to_string(),
      host: header_mapper(hyper::header::HOST),
      p_and_q: req
        .uri()
        .path_and_query()
        .map_or_else(|| "", |v| v.as_str())
        .to_string(),
      version: req.version(),
      ua: header_mapper(hyper::header::USER_AGENT),
      status: "".to_string(),
    }
  }
}

impl MessageLog {
  pub fn client_addr(&mut self, client_addr: &SocketAddr) -> &mut Self {
    self.client_addr = client_addr.to_string();
    self
  }
  pub fn status_code(&mut self, status_code: &hyper::StatusCode) -> &mut Self {
    self.status = status_code.to_string();
    self
  }

  pub fn output(&self) {
    info!(
      "{} <- {} -- {} {} {:?} -- {} \"{}\"",
      self.host, self.client_addr, self.method, self.p_and_q, self.version, self.status, self.ua,
    );
  }
}
