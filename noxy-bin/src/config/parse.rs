use super::toml::ConfigToml;
use crate::error::anyhow;
use clap::Arg;
use noxy_lib::{NotifyConfig, ProxyConfig};

/// Parsed options
pub struct Opts {
  pub config_file_path: String,
}

/// Parse arg values passed from cli
pub fn parse_opts() -> Result<Opts, anyhow::Error> {
  let _ = include_str!("../../Cargo.toml");
  let options = clap::command!().arg(
    Arg::new("config_file")
      .long("config")
      .short('c')
      .value_name("FILE")
      .required(true)
      .help("Configuration file path like ./config.toml"),
  );
  let matches = options.get_matches();

  ///////////////////////////////////
  let config_file_path = matches.get_one::<String>("config_file").unwrap().to_owned();

  Ok(Opts { config_file_path })
}

/// Build proxy and notify settings from the parsed toml.
/// The notify table must be present; its field values are validated by the middleware
/// construction itself, before any request is served.
pub fn build_settings(config: &ConfigToml) -> std::result::Result<(ProxyConfig, NotifyConfig), anyhow::Error> {
  // proxy transport config
  let proxy_config: ProxyConfig = config.try_into()?;

  // notify spec
  let notify = config.notify.as_ref().ok_or_else(|| anyhow!("Missing notify spec"))?;
  let notify_config = NotifyConfig {
    notify_header: notify.notify_header.clone().unwrap_or_default(),
    notify_url: notify.notify_url.clone().unwrap_or_default(),
    forward_headers: notify.forward_headers.clone().unwrap_or_default(),
  };

  Ok((proxy_config, notify_config))
}
