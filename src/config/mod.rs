use crate::domain::model::PlatformSource;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_path, Validate};
use clap::Parser;
use once_cell::sync::Lazy;

/// Environment variable holding the service-account credential JSON. Read
/// once here; nothing below the config layer touches the environment.
pub const SERVICE_ACCOUNT_ENV: &str = "GOOGLE_SERVICE_ACCOUNT";

// The scraper writes one spreadsheet per platform; ids are fixed per client.
static PLATFORMS: Lazy<Vec<PlatformSource>> = Lazy::new(|| {
    vec![
        PlatformSource {
            name: "instagram".to_string(),
            sheet_id: "1V6t6GaDA7fCzIHxWfaBzn2P87pHcQ8hnqV__6fZpIBU".to_string(),
        },
        PlatformSource {
            name: "facebook".to_string(),
            sheet_id: "1CQwuMGNzc2eOAu9nvdKLvJXplnPcPkZ3XlS8XgpzBoY".to_string(),
        },
    ]
});

#[derive(Debug, Clone, Parser)]
#[command(name = "sheets-etl")]
#[command(about = "Fetches influencer metrics from Google Sheets into JSON snapshots")]
pub struct CliConfig {
    #[arg(long, default_value = "data")]
    pub output_path: String,

    #[arg(long, default_value = "raw_data")]
    pub worksheet: String,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl CliConfig {
    /// Credential material for the Sheets client. Missing variable is a
    /// fatal configuration error, raised before any network activity.
    pub fn service_account_json(&self) -> Result<String> {
        std::env::var(SERVICE_ACCOUNT_ENV).map_err(|_| EtlError::MissingConfigError {
            field: format!("{SERVICE_ACCOUNT_ENV} environment variable"),
        })
    }
}

impl ConfigProvider for CliConfig {
    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn worksheet(&self) -> &str {
        &self.worksheet
    }

    fn platforms(&self) -> &[PlatformSource] {
        &PLATFORMS
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_path("output_path", &self.output_path)?;
        validate_non_empty_string("worksheet", &self.worksheet)?;
        Ok(())
    }
}
