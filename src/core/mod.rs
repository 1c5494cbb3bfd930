pub mod dedupe;
pub mod fetch;
pub mod normalize;
pub mod runner;

pub use crate::domain::model::{PlatformResult, Record, WorksheetData};
pub use crate::domain::ports::{ConfigProvider, SheetsClient, Storage};
pub use crate::utils::error::Result;
