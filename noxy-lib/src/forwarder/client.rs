use crate::{
  error::{NoxyError, NoxyResult},
  globals::Globals,
  hyper_ext::{body::RequestBody, rt::LocalExecutor},
  log::*,
  message_handler::{RequestHandler, ResponseWriter},
};
use async_trait::async_trait;
use http::{header, uri::Scheme, HeaderMap, HeaderValue, Request, Response, StatusCode, Uri, Version};
use http_body_util::BodyExt;
use hyper_util::client::legacy::{
  connect::{Connect, HttpConnector},
  Client,
};
use std::sync::Arc;

/// Hop header values which are removed before forwarding to the upstream
const HOP_HEADERS: &[&str] = &[
  "connection",
  "te",
  "trailer",
  "keep-alive",
  "proxy-connection",
  "proxy-authenticate",
  "proxy-authorization",
  "transfer-encoding",
  "upgrade",
];

/// Forwarder http client responsible for relaying requests to the single configured
/// upstream application and writing its response into the response writer.
pub struct Forwarder<C = hyper_rustls::HttpsConnector<HttpConnector>>
where
  C: Send + Sync + Connect + Clone + 'static,
{
  inner: Client<C, RequestBody>,
  upstream_uri: Uri,
}

#[async_trait]
impl<C> RequestHandler for Forwarder<C>
where
  C: Send + Sync + Connect + Clone + 'static,
{
  async fn serve(&self, mut req: Request<RequestBody>, writer: &mut dyn ResponseWriter) -> NoxyResult<()> {
    generate_request_forwarded(&mut req, &self.upstream_uri)?;
    debug!("Forwarding request to upstream: {}", req.uri());

    match self.inner.request(req).await {
      Ok(response) => write_response(response, writer).await,
      Err(e) => {
        error!("Failed to fetch from upstream: {e}");
        writer.write_status(StatusCode::BAD_GATEWAY);
        Ok(())
      }
    }
  }
}

impl Forwarder<hyper_rustls::HttpsConnector<HttpConnector>> {
  /// Build the forwarder client with rustls. Request forwarding is handled over
  /// http/1.1 or h2 regardless of the incoming protocol version.
  pub fn try_new(globals: &Arc<Globals>) -> NoxyResult<Self> {
    let builder = hyper_rustls::HttpsConnectorBuilder::new().with_platform_verifier();

    let mut http = HttpConnector::new();
    http.enforce_http(false);
    http.set_reuse_address(true);
    http.set_keepalive(Some(globals.proxy_config.upstream_idle_timeout));

    let connector = builder.https_or_http().enable_all_versions().wrap_connector(http);
    let inner = Client::builder(LocalExecutor::new(globals.runtime_handle.clone())).build::<_, RequestBody>(connector);

    Ok(Self {
      inner,
      upstream_uri: globals.proxy_config.upstream_uri.clone(),
    })
  }
}

/// Manipulate a request message sent from a client to forward it to the upstream
/// application: hop headers removed, host header and uri rewritten to the upstream.
fn generate_request_forwarded(req: &mut Request<RequestBody>, upstream_uri: &Uri) -> NoxyResult<()> {
  let headers = req.headers_mut();
  remove_connection_header(headers);
  remove_hop_header(headers);
  override_host_header(headers, upstream_uri)?;

  let scheme = upstream_uri
    .scheme()
    .ok_or_else(|| NoxyError::InvalidUpstreamUri("no scheme".to_string()))?;
  let authority = upstream_uri
    .authority()
    .ok_or_else(|| NoxyError::InvalidUpstreamUri("no authority".to_string()))?;
  let p_and_q = match req.uri().path_and_query() {
    Some(pq) => pq.to_string(),
    None => "/".to_string(),
  };
  *req.uri_mut() = Uri::builder()
    .scheme(scheme.as_str())
    .authority(authority.as_str())
    .path_and_query(p_and_q)
    .build()
    .map_err(|e| NoxyError::InvalidUpstreamUri(e.to_string()))?;

  // Change version to http/1.1 when the destination scheme is plaintext http
  if upstream_uri.scheme() == Some(&Scheme::HTTP) {
    *req.version_mut() = Version::HTTP_11;
  }

  Ok(())
}

/// Copy an upstream response into the response writer. The body is read to the end
/// here; buffering semantics are inherent to the interception protocol upstairs.
async fn write_response<B>(response: Response<B>, writer: &mut dyn ResponseWriter) -> NoxyResult<()>
where
  B: hyper::body::Body,
  B::Error: std::fmt::Display,
{
  let (parts, body) = response.into_parts();
  for (name, value) in parts.headers.iter() {
    writer.headers().append(name.clone(), value.clone());
  }
  writer.write_status(parts.status);

  let body = body
    .collect()
    .await
    .map_err(|e| NoxyError::HyperBodyManipulationError(e.to_string()))?
    .to_bytes();
  writer.write_body(&body);
  Ok(())
}

/// overwrite HOST value with the upstream hostname (like 192.168.xx.x seen from noxy)
fn override_host_header(headers: &mut HeaderMap, upstream_uri: &Uri) -> NoxyResult<()> {
  let mut upstream_host = upstream_uri
    .host()
    .ok_or_else(|| NoxyError::InvalidUpstreamUri("no hostname".to_string()))?
    .to_string();
  // add port if it is not default
  if let Some(port) = upstream_uri.port_u16() {
    upstream_host = format!("{}:{}", upstream_host, port);
  }

  // overwrite host header, this removes all the HOST header values
  headers.insert(
    header::HOST,
    HeaderValue::from_str(&upstream_host).map_err(|e| NoxyError::InvalidUpstreamUri(e.to_string()))?,
  );
  Ok(())
}

/// Remove headers enumerated by the connection header
fn remove_connection_header(headers: &mut HeaderMap) {
  if let Some(values) = headers.get(header::CONNECTION) {
    if let Ok(v) = values.clone().to_str() {
      for m in v.split(',') {
        if !m.is_empty() {
          headers.remove(m.trim());
        }
      }
    }
  }
}

/// Remove hop headers
fn remove_hop_header(headers: &mut HeaderMap) {
  HOP_HEADERS.iter().for_each(|key| {
    headers.remove(*key);
  });
}
