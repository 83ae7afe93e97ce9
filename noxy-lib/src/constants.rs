/// Content type set on every notification request
pub const NOTIFY_CONTENT_TYPE: &str = "application/json";
