use crate::core::dedupe::dedupe;
use crate::core::normalize::normalize_post_url;
use crate::domain::model::{PlatformResult, POST_ID_HEADER};
use crate::domain::ports::SheetsClient;
use crate::utils::error::{EtlError, Result};

/// Fetches one platform's worksheet, enriches rows with normalized post URLs
/// and deduplicates by Post ID.
///
/// A missing worksheet yields an empty result and the run continues; a failed
/// formula read skips enrichment but keeps the rows. Every other client error
/// is fatal and propagates.
pub async fn fetch_platform<C: SheetsClient>(
    client: &C,
    sheet_id: &str,
    worksheet: &str,
    platform: &str,
) -> Result<PlatformResult> {
    let data = match client.all_records(sheet_id, worksheet).await {
        Ok(data) => data,
        Err(EtlError::WorksheetNotFound { .. }) => {
            tracing::warn!(
                "Worksheet '{}' not found in {} sheet, returning empty result",
                worksheet,
                platform
            );
            return Ok(PlatformResult::empty(sheet_id, worksheet));
        }
        Err(e) => return Err(e),
    };
    tracing::info!("Fetched {} records from {}", data.records.len(), platform);

    let mut records = data.records;
    if let Some(column) = data.headers.iter().position(|h| h == POST_ID_HEADER) {
        if !records.is_empty() {
            let letter = column_letter(column);
            let range = format!("{letter}2:{letter}{}", records.len() + 1);
            match client.formula_column(sheet_id, worksheet, &range).await {
                Ok(cells) => {
                    let mut enriched = 0usize;
                    for (record, raw) in records.iter_mut().zip(cells.iter()) {
                        if let Some(url) = normalize_post_url(raw) {
                            record.set_post_url(url);
                            enriched += 1;
                        }
                    }
                    tracing::debug!("Resolved {} post URLs for {}", enriched, platform);
                }
                Err(e) => {
                    tracing::warn!(
                        "Could not read post links for {}, continuing without URLs: {}",
                        platform,
                        e
                    );
                }
            }
        }
    }

    let outcome = dedupe(records);
    if outcome.removed > 0 {
        tracing::info!(
            "Removed {} duplicate posts from {}",
            outcome.removed,
            platform
        );
    }

    Ok(PlatformResult {
        sheet_id: sheet_id.to_string(),
        worksheet: worksheet.to_string(),
        count: outcome.records.len(),
        data: outcome.records,
    })
}

/// Zero-based column index to its A1 letter ("A", "B", ..., "AA", ...).
fn column_letter(index: usize) -> String {
    let mut letters = Vec::new();
    let mut n = index + 1;
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}
