use crate::{
  error::{NoxyError, NoxyResult},
  globals::Globals,
  hyper_ext::{
    body::{BoxBody, IncomingOr, ResponseBody},
    rt::LocalExecutor,
  },
  message_handler::PostNotification,
};
use async_trait::async_trait;
use http::{Request, Response};
use hyper_util::client::legacy::{
  connect::{Connect, HttpConnector},
  Client,
};
use std::sync::Arc;

/// Http client delivering notification requests to the configured endpoint.
/// Fire-and-forget from the proxied client's perspective: no retry, and no timeout
/// beyond the transport defaults, so a hanging endpoint stalls the response.
pub struct NotifyClient<C = hyper_rustls::HttpsConnector<HttpConnector>>
where
  C: Send + Sync + Connect + Clone + 'static,
{
  inner: Client<C, BoxBody>,
}

#[async_trait]
impl<C> PostNotification for NotifyClient<C>
where
  C: Send + Sync + Connect + Clone + 'static,
{
  async fn post(&self, req: Request<BoxBody>) -> NoxyResult<Response<ResponseBody>> {
    self
      .inner
      .request(req)
      .await
      .map(|res| res.map(IncomingOr::Left))
      .map_err(|e| NoxyError::FailedToPostNotification(e.to_string()))
  }
}

impl NotifyClient<hyper_rustls::HttpsConnector<HttpConnector>> {
  /// Build the notification client with rustls
  pub fn try_new(globals: &Arc<Globals>) -> NoxyResult<Self> {
    let builder = hyper_rustls::HttpsConnectorBuilder::new().with_platform_verifier();

    let mut http = HttpConnector::new();
    http.enforce_http(false);
    http.set_reuse_address(true);
    http.set_keepalive(Some(globals.proxy_config.upstream_idle_timeout));

    let connector = builder.https_or_http().enable_all_versions().wrap_connector(http);
    let inner = Client::builder(LocalExecutor::new(globals.runtime_handle.clone())).build::<_, BoxBody>(connector);

    Ok(Self { inner })
  }
}
