use super::socket::bind_tcp_socket;
use crate::{
  error::*,
  globals::Globals,
  hyper_ext::{
    body::{BoxBody, IncomingOr},
    rt::LocalExecutor,
  },
  log::*,
  message_handler::{NotifyHandler, SyntheticWriter},
};
use derive_builder::Builder;
use http::{Request, Response};
use hyper::{body::Incoming, service::service_fn};
use hyper_util::{rt::TokioIo, server::conn::auto::Builder as ConnectionBuilder};
use std::{net::SocketAddr, sync::Arc};

/// Serve one request: allocate a writer, run the notify middleware over it and convert
/// whatever was flushed into the final response. A handler error is logged here but the
/// flushed response is delivered regardless, so the notification side-path can never
/// alter what the client receives.
async fn serve_request(
  req: Request<Incoming>,
  handler: Arc<NotifyHandler>,
  client_addr: SocketAddr,
) -> NoxyResult<Response<BoxBody>> {
  let mut log_data = MessageLog::from(&req);
  log_data.client_addr(&client_addr);

  let mut writer = SyntheticWriter::default();
  if let Err(e) = handler.serve(req.map(IncomingOr::Left), &mut writer).await {
    error!("Failed to handle request: {e}");
  }

  let response = writer.into_response();
  log_data.status_code(&response.status()).output();
  Ok(response)
}

#[derive(Builder)]
/// Proxy main object responsible to serve requests received from clients at the given socket address.
pub struct Proxy {
  /// global context shared among async tasks
  globals: Arc<Globals>,
  /// listen socket address
  listening_on: SocketAddr,
  /// hyper connection builder serving http request
  connection_builder: Arc<ConnectionBuilder<LocalExecutor>>,
  /// message handler serving incoming http request
  msg_handler: Arc<NotifyHandler>,
}

impl Proxy {
  /// Serves requests coming through the given connection
  fn serve_connection<I>(&self, stream: I, peer_addr: SocketAddr)
  where
    I: hyper::rt::Read + hyper::rt::Write + Send + Unpin + 'static,
  {
    let request_count = self.globals.request_count.clone();
    if request_count.increment() > self.globals.proxy_config.max_clients {
      request_count.decrement();
      return;
    }
    debug!("Request incoming: current # {}", request_count.current());

    let server_clone = self.connection_builder.clone();
    let msg_handler_clone = self.msg_handler.clone();
    self.globals.runtime_handle.clone().spawn(async move {
      server_clone
        .serve_connection_with_upgrades(
          stream,
          service_fn(move |req: Request<Incoming>| serve_request(req, msg_handler_clone.clone(), peer_addr)),
        )
        .await
        .ok();

      request_count.decrement();
      debug!("Request processed: current # {}", request_count.current());
    });
  }

  /// Accept loop for incoming connections (HTTP cleartext)
  async fn listener_service(&self) -> NoxyResult<()> {
    let tcp_socket = bind_tcp_socket(&self.listening_on)?;
    let tcp_listener = tcp_socket.listen(self.globals.proxy_config.tcp_listen_backlog)?;
    info!("Start TCP proxy serving with HTTP request");
    while let Ok((stream, client_addr)) = tcp_listener.accept().await {
      self.serve_connection(TokioIo::new(stream), client_addr);
    }
    Ok(())
  }

  /// Entrypoint of the serving loop; honors the termination notify when one is given.
  pub async fn start(&self) -> NoxyResult<()> {
    match &self.globals.term_notify {
      Some(term) => {
        tokio::select! {
          res = self.listener_service() => res,
          _ = term.notified() => {
            info!("Proxy service got termination notice");
            Ok(())
          }
        }
      }
      None => self.listener_service().await,
    }
  }
}
