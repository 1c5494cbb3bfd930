use crate::core::fetch::fetch_platform;
use crate::domain::model::{CombinedSnapshot, PlatformSnapshot};
use crate::domain::ports::{ConfigProvider, SheetsClient, Storage};
use crate::utils::error::Result;
use serde::Serialize;

/// What one run produced, for the CLI to report.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub files_written: Vec<String>,
    pub counts: Vec<(String, usize)>,
}

/// Drives the whole fetch: one platform at a time, per-platform snapshot
/// after each fetch, combined snapshot last. A fatal platform error aborts
/// the run before the combined file is written.
pub struct FetchRunner<C: SheetsClient, S: Storage, P: ConfigProvider> {
    client: C,
    storage: S,
    config: P,
}

impl<C: SheetsClient, S: Storage, P: ConfigProvider> FetchRunner<C, S, P> {
    pub fn new(client: C, storage: S, config: P) -> Self {
        Self {
            client,
            storage,
            config,
        }
    }

    pub async fn run(&self, generated: &str) -> Result<RunSummary> {
        let mut combined = CombinedSnapshot::new(generated);
        let mut summary = RunSummary::default();

        for platform in self.config.platforms() {
            tracing::info!("Fetching {} data...", platform.name);
            let result = fetch_platform(
                &self.client,
                &platform.sheet_id,
                self.config.worksheet(),
                &platform.name,
            )
            .await?;

            let filename = format!("superbetin_{}.json", platform.name);
            self.write_json(
                &filename,
                &PlatformSnapshot {
                    generated,
                    platform: &platform.name,
                    result: &result,
                },
            )
            .await?;

            summary.counts.push((platform.name.clone(), result.count));
            summary.files_written.push(filename);
            combined.insert(&platform.name, result)?;
        }

        self.write_json("superbetin.json", &combined).await?;
        summary.files_written.push("superbetin.json".to_string());

        Ok(summary)
    }

    async fn write_json<T: Serialize>(&self, filename: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        self.storage.write_file(filename, json.as_bytes()).await?;
        tracing::info!("Data saved: {}/{}", self.config.output_path(), filename);
        Ok(())
    }
}

/// Run timestamp, local time, reused verbatim in every file of one run.
pub fn run_timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}
