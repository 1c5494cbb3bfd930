use crate::domain::model::{PlatformSource, WorksheetData};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Read-only boundary to the spreadsheet backend.
#[async_trait]
pub trait SheetsClient: Send + Sync {
    /// Every data row of a worksheet, first row treated as the header. A
    /// missing worksheet surfaces as `EtlError::WorksheetNotFound`.
    async fn all_records(&self, sheet_id: &str, worksheet: &str) -> Result<WorksheetData>;

    /// Raw (formula-preserving) cell contents for a single-column A1 range,
    /// one entry per row.
    async fn formula_column(
        &self,
        sheet_id: &str,
        worksheet: &str,
        range: &str,
    ) -> Result<Vec<String>>;
}

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn output_path(&self) -> &str;
    fn worksheet(&self) -> &str;
    fn platforms(&self) -> &[PlatformSource];
}
