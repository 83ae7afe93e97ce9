use thiserror::Error;

pub type NoxyResult<T> = std::result::Result<T, NoxyError>;

/// Describes things that can go wrong in noxy
#[derive(Debug, Error)]
pub enum NoxyError {
  // general errors
  #[error("IO error: {0}")]
  Io(#[from] std::io::Error),

  // configuration errors, raised before any request is served
  #[error("notify_header cannot be empty")]
  EmptyNotifyHeader,
  #[error("notify_url cannot be empty")]
  EmptyNotifyUrl,
  #[error("Invalid header name in notify settings: {0}")]
  InvalidNotifyHeaderName(#[from] http::header::InvalidHeaderName),
  #[error("Invalid notify url: {0}")]
  InvalidNotifyUrl(#[from] http::uri::InvalidUri),

  // hyper errors
  #[error("hyper body manipulation error: {0}")]
  HyperBodyManipulationError(String),

  // response writer errors
  #[error("{0} is not a hijackable response writer")]
  HijackUnsupported(&'static str),

  // notification errors
  #[error("Failed to post notification: {0}")]
  FailedToPostNotification(String),

  // forwarder errors
  #[error("Invalid upstream uri: {0}")]
  InvalidUpstreamUri(String),
  #[error("Failed to fetch from upstream: {0}")]
  FailedToFetchFromUpstream(String),

  // handler errors
  #[error("Failed to build message handler: {0}")]
  FailedToBuildMessageHandler(#[from] crate::message_handler::NotifyHandlerBuilderError),

  // proxy errors
  #[error("Failed to build proxy: {0}")]
  FailedToBuildProxy(#[from] crate::proxy::ProxyBuilderError),
}
