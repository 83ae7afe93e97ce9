pub use anyhow::{anyhow, ensure};
