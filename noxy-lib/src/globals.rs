use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc,
};
use std::net::SocketAddr;
use tokio::time::Duration;

/// Global object containing the proxy configuration and shared objects like counters.
/// Note that there is no Mutex or RwLock here; this is the immutable context shared
/// among async tasks.
pub struct Globals {
  /// Configuration parameters for the proxy transport
  pub proxy_config: ProxyConfig,

  /// Shared context - Counter for serving requests
  pub request_count: RequestCount,

  /// Shared context - Async task runtime handler
  pub runtime_handle: tokio::runtime::Handle,

  /// Shared context - Notify object to stop the proxy service
  pub term_notify: Option<Arc<tokio::sync::Notify>>,
}

/// Configuration parameters for the proxy transport
#[derive(PartialEq, Eq, Clone)]
pub struct ProxyConfig {
  /// listen socket address
  pub listen_socket: SocketAddr,
  /// upstream application the downstream handler forwards requests to
  pub upstream_uri: hyper::Uri,
  /// TCP listen backlog
  pub tcp_listen_backlog: u32,
  /// max number of simultaneously served requests
  pub max_clients: usize,
  /// keep-alive timeout for idle connections to the upstream and notification endpoint
  pub upstream_idle_timeout: Duration,
}

/// Configuration for the notification relay as supplied by the host runtime.
/// Carried as raw strings and validated exactly once when the middleware is built.
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct NotifyConfig {
  /// response header inspected for the encoded notification payload
  pub notify_header: String,
  /// http endpoint the decoded payload is posted to
  pub notify_url: String,
  /// ordered list of request header names relayed to the notification call
  pub forward_headers: Vec<String>,
}

#[derive(Debug, Clone, Default)]
/// Counter for serving requests
pub struct RequestCount(Arc<AtomicUsize>);

impl RequestCount {
  pub fn current(&self) -> usize {
    self.0.load(Ordering::Relaxed)
  }

  pub fn increment(&self) -> usize {
    self.0.fetch_add(1, Ordering::Relaxed)
  }

  pub fn decrement(&self) -> usize {
    let mut count;
    while {
      count = self.0.load(Ordering::Relaxed);
      count > 0
        && self
          .0
          .compare_exchange(count, count - 1, Ordering::Relaxed, Ordering::Relaxed)
          != Ok(count)
    } {}
    count
  }
}
