use super::{
  response_buffer::{FlushGuard, ResponseWriter},
  utils_headers::{apply_forward_headers, collect_forward_headers, single_header_value},
};
use crate::{
  constants::NOTIFY_CONTENT_TYPE,
  error::{NoxyError, NoxyResult},
  globals::NotifyConfig,
  hyper_ext::body::{full, BoxBody, RequestBody, ResponseBody},
  log::*,
};
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use bytes::Bytes;
use derive_builder::Builder;
use http::{header, HeaderMap, HeaderName, Method, Request, Response, StatusCode, Uri};
use http_body_util::BodyExt;
use std::sync::Arc;

#[async_trait]
/// Downstream request handler wrapped by the notify middleware: accepts a request and
/// writes status, headers and body into the given writer.
pub trait RequestHandler: Send + Sync {
  async fn serve(&self, req: Request<RequestBody>, writer: &mut dyn ResponseWriter) -> NoxyResult<()>;
}

#[async_trait]
/// Transport delivering a fully built notification request to the notification endpoint.
pub trait PostNotification: Send + Sync {
  async fn post(&self, req: Request<BoxBody>) -> NoxyResult<Response<ResponseBody>>;
}

/// Validated notification settings. The conversion from the raw configuration is the
/// construction contract: it fails before any handler is wrapped, and no partially
/// built middleware is observable.
#[derive(Clone, Debug)]
pub struct NotifySettings {
  notify_header: HeaderName,
  notify_url: Uri,
  forward_headers: Vec<HeaderName>,
}

impl TryFrom<&NotifyConfig> for NotifySettings {
  type Error = NoxyError;

  fn try_from(config: &NotifyConfig) -> Result<Self, Self::Error> {
    if config.notify_header.is_empty() {
      return Err(NoxyError::EmptyNotifyHeader);
    }
    if config.notify_url.is_empty() {
      return Err(NoxyError::EmptyNotifyUrl);
    }
    let notify_header = HeaderName::from_bytes(config.notify_header.as_bytes())?;
    let notify_url: Uri = config.notify_url.parse()?;
    let forward_headers = config
      .forward_headers
      .iter()
      .map(|name| HeaderName::from_bytes(name.as_bytes()))
      .collect::<Result<Vec<_>, _>>()?;
    Ok(Self {
      notify_header,
      notify_url,
      forward_headers,
    })
  }
}

#[derive(Builder)]
/// Http message handler implementing the response interception and notification relay
/// protocol around a downstream request handler: the response is buffered, the notify
/// header is inspected, its decoded payload is posted to the notification endpoint, and
/// the response is delivered to the client with the notify header stripped.
pub struct NotifyHandler {
  /// downstream handler producing the actual response
  inner: Arc<dyn RequestHandler>,
  /// transport for the notification side-request
  notifier: Arc<dyn PostNotification>,
  /// validated notification settings
  settings: NotifySettings,
}

impl NotifyHandler {
  /// Handle a single request. The notification side-path is fully contained: nothing
  /// below alters the status, headers or body the client receives, and the buffered
  /// response is flushed exactly once on every exit path.
  pub async fn serve(&self, req: Request<RequestBody>, writer: &mut dyn ResponseWriter) -> NoxyResult<()> {
    // Forward-header values come from the inbound request and must be captured before
    // the request is handed downstream.
    let forwarded = collect_forward_headers(&self.settings.forward_headers, req.headers());

    // The guard owns delivery: it removes the notify header and flushes the buffered
    // response when this scope exits, also on error returns and unwinds.
    let mut guard = FlushGuard::new(writer, self.settings.notify_header.clone());
    self.inner.serve(req, guard.writer()).await?;

    let Some(value) = single_header_value(guard.writer().headers(), &self.settings.notify_header) else {
      return Ok(());
    };
    let payload = match general_purpose::STANDARD.decode(value) {
      Ok(v) => v,
      Err(e) => {
        error!("Failed to decode notify header value: {e}");
        return Ok(());
      }
    };

    let notify_req = self.build_notify_request(Bytes::from(payload), &forwarded);
    match self.notifier.post(notify_req).await {
      Err(e) => error!("Failed to post notification: {e}"),
      Ok(res) if res.status() == StatusCode::ACCEPTED => info!("Notify success"),
      Ok(res) => match res.into_body().collect().await {
        Ok(body) => warn!("Notify failed: {}", String::from_utf8_lossy(&body.to_bytes())),
        Err(e) => error!("Failed to read notify response body: {e}"),
      },
    }

    Ok(())
  }

  /// Build the notification request: POST to the configured url carrying the decoded
  /// payload, with the forwarded request headers set verbatim.
  fn build_notify_request(&self, payload: Bytes, forwarded: &HeaderMap) -> Request<BoxBody> {
    let mut notify_req = Request::builder()
      .method(Method::POST)
      .uri(self.settings.notify_url.clone())
      .header(header::CONTENT_TYPE, NOTIFY_CONTENT_TYPE)
      .body(full(payload))
      .unwrap();
    apply_forward_headers(notify_req.headers_mut(), forwarded);
    notify_req
  }
}
