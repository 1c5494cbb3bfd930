use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Column headers the pipeline depends on. All other columns pass through
/// untouched.
pub const POST_ID_HEADER: &str = "Post ID";
pub const VIEWS_HEADER: &str = "Impressions/Views";
pub const POST_URL_FIELD: &str = "Post URL";

/// One data row read as an ordered column-header → cell-value mapping.
/// Spreadsheet columns are not statically known, so the shape stays dynamic;
/// the typed accessors below cover the two fields the pipeline cares about.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    pub fields: Map<String, Value>,
}

impl Record {
    /// Pairs a data row with the header row, padding short rows with empty
    /// strings so every record carries every column.
    pub fn from_row(headers: &[String], row: &[Value]) -> Self {
        let mut fields = Map::with_capacity(headers.len());
        for (i, header) in headers.iter().enumerate() {
            let cell = row.get(i).cloned().unwrap_or(Value::String(String::new()));
            fields.insert(header.clone(), cell);
        }
        Self { fields }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// The post identifier, if present and non-empty. Sheets may hand back
    /// numeric ids depending on cell formatting.
    pub fn post_id(&self) -> Option<String> {
        match self.fields.get(POST_ID_HEADER)? {
            Value::String(s) => {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// The view/impression count. Display values carry thousands separators
    /// ("12,345"); absent or unparseable values count as zero.
    pub fn view_count(&self) -> i64 {
        match self.fields.get(VIEWS_HEADER) {
            Some(Value::Number(n)) => n.as_i64().unwrap_or(0),
            Some(Value::String(s)) => s.trim().replace(',', "").parse().unwrap_or(0),
            _ => 0,
        }
    }

    pub fn set_post_url(&mut self, url: String) {
        self.fields
            .insert(POST_URL_FIELD.to_string(), Value::String(url));
    }

    pub fn post_url(&self) -> Option<&str> {
        self.fields.get(POST_URL_FIELD).and_then(Value::as_str)
    }
}

/// One worksheet read: the header row plus every data row as a Record.
#[derive(Debug, Clone, Default)]
pub struct WorksheetData {
    pub headers: Vec<String>,
    pub records: Vec<Record>,
}

/// A platform bound to the spreadsheet it is scraped into.
#[derive(Debug, Clone)]
pub struct PlatformSource {
    pub name: String,
    pub sheet_id: String,
}

/// The fetched, enriched and deduplicated rows for one platform. Immutable
/// once assembled; written out and discarded.
#[derive(Debug, Clone, Serialize)]
pub struct PlatformResult {
    pub sheet_id: String,
    pub worksheet: String,
    pub count: usize,
    pub data: Vec<Record>,
}

impl PlatformResult {
    pub fn empty(sheet_id: &str, worksheet: &str) -> Self {
        Self {
            sheet_id: sheet_id.to_string(),
            worksheet: worksheet.to_string(),
            count: 0,
            data: Vec::new(),
        }
    }
}

/// Envelope for the per-platform snapshot file.
#[derive(Serialize)]
pub struct PlatformSnapshot<'a> {
    pub generated: &'a str,
    pub platform: &'a str,
    #[serde(flatten)]
    pub result: &'a PlatformResult,
}

/// Envelope for the combined snapshot file. Platforms serialize in insertion
/// order, which is the configuration order.
#[derive(Serialize)]
pub struct CombinedSnapshot {
    pub generated: String,
    pub platforms: Map<String, Value>,
}

impl CombinedSnapshot {
    pub fn new(generated: &str) -> Self {
        Self {
            generated: generated.to_string(),
            platforms: Map::new(),
        }
    }

    pub fn insert(&mut self, platform: &str, result: PlatformResult) -> serde_json::Result<()> {
        self.platforms
            .insert(platform.to_string(), serde_json::to_value(result)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn headers() -> Vec<String> {
        vec![
            POST_ID_HEADER.to_string(),
            "Account Name".to_string(),
            VIEWS_HEADER.to_string(),
        ]
    }

    #[test]
    fn test_from_row_pads_short_rows() {
        let record = Record::from_row(&headers(), &[json!("abc123")]);
        assert_eq!(record.get(POST_ID_HEADER), Some(&json!("abc123")));
        assert_eq!(record.get("Account Name"), Some(&json!("")));
        assert_eq!(record.get(VIEWS_HEADER), Some(&json!("")));
    }

    #[test]
    fn test_post_id_trims_and_rejects_empty() {
        let record = Record::from_row(&headers(), &[json!(" abc123 ")]);
        assert_eq!(record.post_id().as_deref(), Some("abc123"));

        let record = Record::from_row(&headers(), &[json!("   ")]);
        assert_eq!(record.post_id(), None);

        let record = Record::from_row(&headers(), &[]);
        assert_eq!(record.post_id(), None);
    }

    #[test]
    fn test_post_id_accepts_numeric_cells() {
        let record = Record::from_row(&headers(), &[json!(17895439)]);
        assert_eq!(record.post_id().as_deref(), Some("17895439"));
    }

    #[test]
    fn test_view_count_strips_thousands_separators() {
        let record = Record::from_row(&headers(), &[json!("a"), json!("x"), json!("1,234,567")]);
        assert_eq!(record.view_count(), 1_234_567);
    }

    #[test]
    fn test_view_count_accepts_plain_numbers() {
        let record = Record::from_row(&headers(), &[json!("a"), json!("x"), json!(42)]);
        assert_eq!(record.view_count(), 42);

        let record = Record::from_row(&headers(), &[json!("a"), json!("x"), json!("42")]);
        assert_eq!(record.view_count(), 42);
    }

    #[test]
    fn test_view_count_defaults_to_zero() {
        let record = Record::from_row(&headers(), &[json!("a")]);
        assert_eq!(record.view_count(), 0);

        let record = Record::from_row(&headers(), &[json!("a"), json!("x"), json!("n/a")]);
        assert_eq!(record.view_count(), 0);
    }

    #[test]
    fn test_record_serializes_in_column_order() {
        let record = Record::from_row(&headers(), &[json!("a"), json!("x"), json!("5")]);
        let serialized = serde_json::to_string(&record).unwrap();
        assert_eq!(
            serialized,
            r#"{"Post ID":"a","Account Name":"x","Impressions/Views":"5"}"#
        );
    }
}
