use super::response_buffer::{HijackedIo, ResponseWriter};
use crate::{
  error::{NoxyError, NoxyResult},
  hyper_ext::body::{full, BoxBody},
};
use bytes::{BufMut, BytesMut};
use http::{HeaderMap, Response, StatusCode};

/// Concrete writer allocated per request at the proxy layer. Accumulates whatever the
/// handler chain flushes and is converted into a hyper response afterwards.
// TODO: wire hyper upgrade into the hijack capability once the forwarder handles
// websocket upstreams
#[derive(Default)]
pub struct SyntheticWriter {
  headers: HeaderMap,
  status: StatusCode,
  body: BytesMut,
}

impl SyntheticWriter {
  /// Convert the accumulated parts into the response sent back to the client.
  pub fn into_response(self) -> Response<BoxBody> {
    let mut response = Response::builder()
      .status(self.status)
      .body(full(self.body.freeze()))
      .unwrap();
    *response.headers_mut() = self.headers;
    response
  }
}

impl ResponseWriter for SyntheticWriter {
  fn headers(&mut self) -> &mut HeaderMap {
    &mut self.headers
  }

  fn write_body(&mut self, chunk: &[u8]) -> usize {
    self.body.put_slice(chunk);
    chunk.len()
  }

  fn write_status(&mut self, status: StatusCode) {
    self.status = status;
  }

  fn hijack(&mut self) -> NoxyResult<Box<dyn HijackedIo>> {
    Err(NoxyError::HijackUnsupported(std::any::type_name::<Self>()))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use http_body_util::BodyExt;

  #[tokio::test]
  async fn accumulated_parts_become_the_client_response() {
    let mut writer = SyntheticWriter::default();
    writer.headers().insert("content-type", "text/plain".parse().unwrap());
    writer.headers().append("set-cookie", "a=1".parse().unwrap());
    writer.headers().append("set-cookie", "b=2".parse().unwrap());
    writer.write_status(StatusCode::NOT_FOUND);
    writer.write_body(b"nothing here");

    let response = writer.into_response();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(response.headers().get("content-type").unwrap(), "text/plain");
    let cookies = response
      .headers()
      .get_all("set-cookie")
      .iter()
      .collect::<Vec<_>>();
    assert_eq!(cookies.len(), 2);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"nothing here");
  }

  #[test]
  fn status_defaults_to_ok() {
    let writer = SyntheticWriter::default();
    assert_eq!(writer.into_response().status(), StatusCode::OK);
  }

  #[test]
  fn hijack_is_unsupported() {
    let mut writer = SyntheticWriter::default();
    let err = writer.hijack().unwrap_err();
    assert!(matches!(err, NoxyError::HijackUnsupported(_)));
  }
}
