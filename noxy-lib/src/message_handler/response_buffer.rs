use crate::error::NoxyResult;
use bytes::{BufMut, BytesMut};
use http::{HeaderMap, HeaderName, StatusCode};
use tokio::io::{AsyncRead, AsyncWrite};

/// Raw duplex connection surrendered by a response writer that supports hijacking.
pub trait HijackedIo: AsyncRead + AsyncWrite + Send + Unpin + std::fmt::Debug {}
impl<T> HijackedIo for T where T: AsyncRead + AsyncWrite + Send + Unpin + std::fmt::Debug {}

/// Outbound response sink as seen by a request handler.
pub trait ResponseWriter: Send {
  /// Header collection of the response under construction. Mutations are visible to
  /// everything else holding this writer and persist into the final transmission.
  fn headers(&mut self) -> &mut HeaderMap;

  /// Append a chunk of body bytes. Returns the number of bytes accepted; never errors.
  fn write_body(&mut self, chunk: &[u8]) -> usize;

  /// Record the response status code.
  fn write_status(&mut self, status: StatusCode);

  /// Surrender the underlying connection for raw bidirectional io. Writers backed by a
  /// sink without this capability fail with an error naming the sink's concrete type.
  fn hijack(&mut self) -> NoxyResult<Box<dyn HijackedIo>>;
}

/// Buffering writer standing in for the real sink until the response headers can be
/// inspected. The status code and body bytes are held back until [`flush`](Self::flush);
/// headers pass straight through to the wrapped sink.
pub struct ResponseBuffer<'a> {
  inner: &'a mut dyn ResponseWriter,
  body: BytesMut,
  status: StatusCode,
}

impl<'a> ResponseBuffer<'a> {
  pub fn new(inner: &'a mut dyn ResponseWriter) -> Self {
    Self {
      inner,
      body: BytesMut::new(),
      status: StatusCode::OK,
    }
  }

  /// Write the recorded status code and then the buffered body to the wrapped sink, in
  /// that order. Invoked exactly once per request, after header inspection is complete.
  pub fn flush(&mut self) {
    self.inner.write_status(self.status);
    self.inner.write_body(&self.body);
  }
}

impl ResponseWriter for ResponseBuffer<'_> {
  fn headers(&mut self) -> &mut HeaderMap {
    self.inner.headers()
  }

  fn write_body(&mut self, chunk: &[u8]) -> usize {
    self.body.put_slice(chunk);
    chunk.len()
  }

  fn write_status(&mut self, status: StatusCode) {
    self.status = status;
  }

  fn hijack(&mut self) -> NoxyResult<Box<dyn HijackedIo>> {
    self.inner.hijack()
  }
}

/// Deletes the notify header and flushes the buffered response when dropped, so the
/// client receives a well-formed response on every exit path of the handler chain.
pub(super) struct FlushGuard<'a> {
  buffer: ResponseBuffer<'a>,
  notify_header: HeaderName,
}

impl<'a> FlushGuard<'a> {
  pub(super) fn new(inner: &'a mut dyn ResponseWriter, notify_header: HeaderName) -> Self {
    Self {
      buffer: ResponseBuffer::new(inner),
      notify_header,
    }
  }

  pub(super) fn writer(&mut self) -> &mut ResponseBuffer<'a> {
    &mut self.buffer
  }
}

impl Drop for FlushGuard<'_> {
  fn drop(&mut self) {
    self.buffer.headers().remove(&self.notify_header);
    self.buffer.flush();
  }
}
