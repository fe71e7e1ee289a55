pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod server;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::cli::CliConfig;

pub use crate::adapters::HttpDogApi;
pub use crate::config::ServerConfig;
pub use crate::core::{DogQuery, DogSearch};
pub use crate::utils::error::{ProxyError, Result};
