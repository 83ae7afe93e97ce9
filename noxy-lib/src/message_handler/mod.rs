mod handler_main;
mod response_buffer;
mod synthetic_response;
mod utils_headers;

pub(crate) use handler_main::{
  NotifyHandler, NotifyHandlerBuilder, NotifyHandlerBuilderError, NotifySettings, PostNotification, RequestHandler,
};
pub(crate) use response_buffer::{HijackedIo, ResponseWriter};
pub(crate) use synthetic_response::SyntheticWriter;
