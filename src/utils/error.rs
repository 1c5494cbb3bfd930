use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("JWT signing failed: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("Sheets API returned {status}: {message}")]
    SheetsApiError { status: u16, message: String },

    #[error("Token exchange failed: {message}")]
    AuthError { message: String },

    // Recoverable: the orchestrator matches on this variant and degrades to
    // an empty platform result instead of aborting the run.
    #[error("Worksheet '{worksheet}' not found in sheet {sheet_id}")]
    WorksheetNotFound { sheet_id: String, worksheet: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for {field} ('{value}'): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, EtlError>;
