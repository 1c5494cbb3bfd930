pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::{GoogleSheetsClient, LocalStorage};
pub use config::CliConfig;
pub use core::runner::{run_timestamp, FetchRunner, RunSummary};
pub use utils::error::{EtlError, Result};
