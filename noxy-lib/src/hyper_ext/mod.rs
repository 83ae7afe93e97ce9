mod body_type;
mod executor;

pub(crate) mod rt {
  pub(crate) use super::executor::LocalExecutor;
}
pub(crate) mod body {
  pub(crate) use super::body_type::{empty, full, BoxBody, IncomingOr, RequestBody, ResponseBody};
}
