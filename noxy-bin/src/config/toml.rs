use crate::{
  constants::*,
  error::{anyhow, ensure},
};
use noxy_lib::{reexports::Uri, ProxyConfig};
use serde::Deserialize;
use std::{fs, net::SocketAddr};
use tokio::time::Duration;

#[derive(Deserialize, Debug, Default, PartialEq, Eq, Clone)]
pub struct ConfigToml {
  pub listen_port: Option<u16>,
  pub listen_ipv6: Option<bool>,
  pub tcp_listen_backlog: Option<u32>,
  pub max_clients: Option<usize>,
  pub upstream: Option<String>,
  pub notify: Option<NotifyOption>,
}

#[derive(Deserialize, Debug, Default, PartialEq, Eq, Clone)]
pub struct NotifyOption {
  pub notify_header: Option<String>,
  pub notify_url: Option<String>,
  pub forward_headers: Option<Vec<String>>,
}

impl ConfigToml {
  pub fn new(config_file: &str) -> std::result::Result<Self, anyhow::Error> {
    let config_str = fs::read_to_string(config_file)?;

    toml::from_str(&config_str).map_err(|e| anyhow!(e))
  }
}

impl TryInto<ProxyConfig> for &ConfigToml {
  type Error = anyhow::Error;

  fn try_into(self) -> std::result::Result<ProxyConfig, Self::Error> {
    let listen_port = self.listen_port.ok_or_else(|| anyhow!("listen_port must be specified"))?;
    let listen_address = if let Some(true) = self.listen_ipv6 {
      LISTEN_ADDRESS_V6
    } else {
      LISTEN_ADDRESS_V4
    };
    let listen_socket: SocketAddr = format!("{listen_address}:{listen_port}").parse()?;

    let upstream = self.upstream.as_ref().ok_or_else(|| anyhow!("upstream must be specified"))?;
    let upstream_uri: Uri = upstream.parse().map_err(|e| anyhow!("Invalid upstream uri: {e}"))?;
    ensure!(
      upstream_uri.scheme().is_some() && upstream_uri.authority().is_some(),
      "Upstream uri must carry scheme and authority"
    );

    Ok(ProxyConfig {
      listen_socket,
      upstream_uri,
      tcp_listen_backlog: self.tcp_listen_backlog.unwrap_or(DEFAULT_TCP_LISTEN_BACKLOG),
      max_clients: self.max_clients.unwrap_or(DEFAULT_MAX_CLIENTS),
      upstream_idle_timeout: Duration::from_secs(DEFAULT_UPSTREAM_IDLE_TIMEOUT_SEC),
    })
  }
}
