#[global_allocator]
static ALLOC: mimalloc::MiMalloc = mimalloc::MiMalloc;

mod config;
mod constants;
mod error;
mod log;

use crate::{
  config::{build_settings, parse_opts, ConfigToml},
  log::*,
};
use noxy_lib::entrypoint;

fn main() {
  init_logger();

  let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
  runtime_builder.enable_all();
  runtime_builder.thread_name("noxy");
  let runtime = runtime_builder.build().unwrap();

  runtime.block_on(async {
    let Ok(parsed_opts) = parse_opts() else {
      error!("Invalid options");
      std::process::exit(1);
    };

    if let Err(e) = noxy_service(&parsed_opts.config_file_path, runtime.handle().clone()).await {
      error!("noxy service exited: {e}");
      std::process::exit(1);
    }
  });
}

async fn noxy_service(config_file_path: &str, runtime_handle: tokio::runtime::Handle) -> Result<(), anyhow::Error> {
  info!("Start noxy service");
  let config_toml = match ConfigToml::new(config_file_path) {
    Ok(v) => v,
    Err(e) => {
      error!("Invalid toml file: {e}");
      std::process::exit(1);
    }
  };
  let (proxy_conf, notify_conf) = match build_settings(&config_toml) {
    Ok(v) => v,
    Err(e) => {
      error!("Invalid configuration: {e}");
      return Err(anyhow::anyhow!(e));
    }
  };
  entrypoint(&proxy_conf, &notify_conf, &runtime_handle, None)
    .await
    .map_err(|e| anyhow::anyhow!(e))
}
