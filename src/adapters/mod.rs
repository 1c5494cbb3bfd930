// Adapters layer: concrete implementations for external systems (Google
// Sheets API, local snapshot storage).

pub mod google;
pub mod local;

pub use google::GoogleSheetsClient;
pub use local::LocalStorage;
