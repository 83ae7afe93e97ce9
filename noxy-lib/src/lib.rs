mod constants;
mod error;
mod forwarder;
mod globals;
mod hyper_ext;
mod log;
mod message_handler;
mod notifier;
mod proxy;

use crate::{
  error::*,
  forwarder::Forwarder,
  globals::Globals,
  hyper_ext::rt::LocalExecutor,
  log::*,
  message_handler::{NotifyHandlerBuilder, NotifySettings},
  notifier::NotifyClient,
  proxy::ProxyBuilder,
};
use hyper_util::server::conn::auto::Builder as ConnectionBuilder;
use std::sync::Arc;

pub use crate::{
  error::{NoxyError, NoxyResult},
  globals::{NotifyConfig, ProxyConfig},
};
pub mod reexports {
  pub use hyper::Uri;
}

/// Entrypoint that builds the notification relay middleware from the given configuration
/// and serves requests at the configured socket address until termination.
pub async fn entrypoint(
  proxy_config: &ProxyConfig,
  notify_config: &NotifyConfig,
  runtime_handle: &tokio::runtime::Handle,
  term_notify: Option<Arc<tokio::sync::Notify>>,
) -> NoxyResult<()> {
  // For initial message logging
  info!("Listening on {}", proxy_config.listen_socket);
  info!("Upstream application: {}", proxy_config.upstream_uri);
  info!("Notification endpoint: {}", notify_config.notify_url);
  if !notify_config.forward_headers.is_empty() {
    info!(
      "Request headers forwarded to the notification endpoint: {}",
      notify_config.forward_headers.join(", ")
    );
  }

  // Validated exactly once, before any handler is wrapped. An empty notify header
  // or url is rejected here and no request is ever served.
  let notify_settings = NotifySettings::try_from(notify_config)?;

  // build global shared context
  let globals = Arc::new(Globals {
    proxy_config: proxy_config.clone(),
    request_count: Default::default(),
    runtime_handle: runtime_handle.clone(),
    term_notify,
  });

  // build message handler wrapping the upstream forwarder with the notify middleware
  let forwarder = Arc::new(Forwarder::try_new(&globals)?);
  let notifier = Arc::new(NotifyClient::try_new(&globals)?);
  let msg_handler = Arc::new(
    NotifyHandlerBuilder::default()
      .inner(forwarder)
      .notifier(notifier)
      .settings(notify_settings)
      .build()?,
  );

  let connection_builder = Arc::new(ConnectionBuilder::new(LocalExecutor::new(runtime_handle.clone())));

  let proxy = ProxyBuilder::default()
    .globals(globals.clone())
    .listening_on(globals.proxy_config.listen_socket)
    .connection_builder(connection_builder)
    .msg_handler(msg_handler)
    .build()?;

  proxy.start().await
}
