pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod types;
pub mod utils;

pub use config::ClientConfig;
pub use error::{ClientError, Result};
