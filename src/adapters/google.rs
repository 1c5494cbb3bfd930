use crate::domain::model::{Record, WorksheetData};
use crate::domain::ports::SheetsClient;
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;

const DEFAULT_BASE_URL: &str = "https://sheets.googleapis.com";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const OAUTH_SCOPES: &str = "https://www.googleapis.com/auth/spreadsheets.readonly \
                            https://www.googleapis.com/auth/drive.readonly";
const TOKEN_LIFETIME_SECS: i64 = 3600;
const TOKEN_EXPIRY_SLACK_SECS: i64 = 60;

/// The fields of a Google service-account key this client needs.
#[derive(Debug, Deserialize)]
struct ServiceAccountKey {
    client_email: String,
    private_key: String,
    #[serde(default = "default_token_uri")]
    token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

#[derive(Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: i64,
}

#[derive(Debug)]
struct CachedToken {
    token: String,
    expires_at: i64,
}

#[derive(Debug)]
enum Auth {
    ServiceAccount {
        key: ServiceAccountKey,
        cached: Mutex<Option<CachedToken>>,
    },
    StaticToken(String),
}

#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

/// Sheets v4 REST client authenticated by a service account (OAuth2
/// JWT-bearer grant). Tokens are cached until shortly before expiry.
#[derive(Debug)]
pub struct GoogleSheetsClient {
    http: Client,
    base_url: String,
    auth: Auth,
}

impl GoogleSheetsClient {
    /// Builds a client from the service-account credential JSON. Fails on
    /// malformed credential material; no network is touched until the first
    /// fetch.
    pub fn new(credential_json: &str) -> Result<Self> {
        let key: ServiceAccountKey =
            serde_json::from_str(credential_json).map_err(|e| EtlError::ConfigError {
                message: format!("Invalid service account credential JSON: {e}"),
            })?;
        Ok(Self {
            http: Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            auth: Auth::ServiceAccount {
                key,
                cached: Mutex::new(None),
            },
        })
    }

    /// Client with a fixed bearer token against an injected endpoint. Used
    /// by tests to skip the token exchange.
    pub fn with_static_token(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into(),
            auth: Auth::StaticToken(token.into()),
        }
    }

    async fn bearer_token(&self) -> Result<String> {
        match &self.auth {
            Auth::StaticToken(token) => Ok(token.clone()),
            Auth::ServiceAccount { key, cached } => {
                let mut guard = cached.lock().await;
                let now = chrono::Utc::now().timestamp();
                if let Some(cache) = guard.as_ref() {
                    if cache.expires_at - TOKEN_EXPIRY_SLACK_SECS > now {
                        return Ok(cache.token.clone());
                    }
                }
                let fresh = self.exchange_token(key, now).await?;
                let token = fresh.token.clone();
                *guard = Some(fresh);
                Ok(token)
            }
        }
    }

    async fn exchange_token(&self, key: &ServiceAccountKey, now: i64) -> Result<CachedToken> {
        let claims = Claims {
            iss: &key.client_email,
            scope: OAUTH_SCOPES,
            aud: &key.token_uri,
            iat: now,
            exp: now + TOKEN_LIFETIME_SECS,
        };
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())?;
        let assertion = encode(&Header::new(Algorithm::RS256), &claims, &encoding_key)?;

        tracing::debug!("Requesting access token from {}", key.token_uri);
        let response = self
            .http
            .post(&key.token_uri)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EtlError::AuthError {
                message: format!("{status}: {body}"),
            });
        }

        let token: TokenResponse = response.json().await?;
        let lifetime = if token.expires_in > 0 {
            token.expires_in
        } else {
            TOKEN_LIFETIME_SECS
        };
        Ok(CachedToken {
            token: token.access_token,
            expires_at: now + lifetime,
        })
    }

    /// One `spreadsheets.values.get` call. A 400 for an unparseable range is
    /// how the API reports a missing worksheet; that maps to the recoverable
    /// `WorksheetNotFound`. Everything else non-2xx is fatal.
    async fn values(
        &self,
        sheet_id: &str,
        range: &str,
        render_option: &str,
    ) -> Result<Vec<Vec<Value>>> {
        let mut url = url::Url::parse(&self.base_url).map_err(|e| EtlError::ConfigError {
            message: format!("Invalid Sheets base URL '{}': {e}", self.base_url),
        })?;
        url.path_segments_mut()
            .map_err(|_| EtlError::ConfigError {
                message: format!("Sheets base URL '{}' cannot carry a path", self.base_url),
            })?
            .pop_if_empty()
            .extend(["v4", "spreadsheets", sheet_id, "values", range]);
        url.query_pairs_mut()
            .append_pair("valueRenderOption", render_option);

        let token = self.bearer_token().await?;
        tracing::debug!("GET {}", url);
        let response = self.http.get(url).bearer_auth(token).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if status == StatusCode::BAD_REQUEST && body.contains("Unable to parse range") {
                return Err(EtlError::WorksheetNotFound {
                    sheet_id: sheet_id.to_string(),
                    worksheet: worksheet_of(range).to_string(),
                });
            }
            return Err(EtlError::SheetsApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        let value_range: ValueRange = response.json().await?;
        Ok(value_range.values)
    }
}

#[async_trait]
impl SheetsClient for GoogleSheetsClient {
    async fn all_records(&self, sheet_id: &str, worksheet: &str) -> Result<WorksheetData> {
        let mut rows = self.values(sheet_id, worksheet, "FORMATTED_VALUE").await?;
        if rows.is_empty() {
            return Ok(WorksheetData::default());
        }
        let header_row = rows.remove(0);
        let headers: Vec<String> = header_row.iter().map(cell_text).collect();
        let records = rows
            .iter()
            .map(|row| Record::from_row(&headers, row))
            .collect();
        Ok(WorksheetData { headers, records })
    }

    async fn formula_column(
        &self,
        sheet_id: &str,
        worksheet: &str,
        range: &str,
    ) -> Result<Vec<String>> {
        let full_range = format!("{worksheet}!{range}");
        let rows = self.values(sheet_id, &full_range, "FORMULA").await?;
        Ok(rows
            .iter()
            .map(|row| row.first().map(cell_text).unwrap_or_default())
            .collect())
    }
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Worksheet part of an A1 range ("raw_data!B2:B5" -> "raw_data").
fn worksheet_of(range: &str) -> &str {
    range.split('!').next().unwrap_or(range)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{POST_ID_HEADER, VIEWS_HEADER};
    use httpmock::prelude::*;
    use serde_json::json;

    fn client_for(server: &MockServer) -> GoogleSheetsClient {
        GoogleSheetsClient::with_static_token(server.base_url(), "test-token")
    }

    #[tokio::test]
    async fn test_all_records_parses_grid() {
        let server = MockServer::start();
        let grid = json!({
            "range": "raw_data!A1:C3",
            "majorDimension": "ROWS",
            "values": [
                [POST_ID_HEADER, "Account Name", VIEWS_HEADER],
                ["abc", "acct1", "1,200"],
                ["def", "acct2"]
            ]
        });
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/v4/spreadsheets/sheet-1/values/raw_data")
                .query_param("valueRenderOption", "FORMATTED_VALUE")
                .header("authorization", "Bearer test-token");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(grid);
        });

        let client = client_for(&server);
        let data = client.all_records("sheet-1", "raw_data").await.unwrap();

        mock.assert();
        assert_eq!(
            data.headers,
            vec![POST_ID_HEADER, "Account Name", VIEWS_HEADER]
        );
        assert_eq!(data.records.len(), 2);
        assert_eq!(data.records[0].view_count(), 1200);
        // Short row padded to header width.
        assert_eq!(data.records[1].get(VIEWS_HEADER), Some(&json!("")));
    }

    #[tokio::test]
    async fn test_all_records_empty_worksheet() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET)
                .path("/v4/spreadsheets/sheet-1/values/raw_data");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(json!({"range": "raw_data!A1:Z1000", "majorDimension": "ROWS"}));
        });

        let client = client_for(&server);
        let data = client.all_records("sheet-1", "raw_data").await.unwrap();

        assert!(data.headers.is_empty());
        assert!(data.records.is_empty());
    }

    #[tokio::test]
    async fn test_missing_worksheet_maps_to_not_found() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET)
                .path("/v4/spreadsheets/sheet-1/values/raw_data");
            then.status(400)
                .header("Content-Type", "application/json")
                .json_body(json!({
                    "error": {
                        "code": 400,
                        "message": "Unable to parse range: raw_data",
                        "status": "INVALID_ARGUMENT"
                    }
                }));
        });

        let client = client_for(&server);
        let err = client.all_records("sheet-1", "raw_data").await.unwrap_err();

        assert!(matches!(
            err,
            EtlError::WorksheetNotFound { ref worksheet, .. } if worksheet == "raw_data"
        ));
    }

    #[tokio::test]
    async fn test_authorization_failure_is_fatal() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET)
                .path("/v4/spreadsheets/sheet-1/values/raw_data");
            then.status(403)
                .header("Content-Type", "application/json")
                .json_body(json!({"error": {"code": 403, "status": "PERMISSION_DENIED"}}));
        });

        let client = client_for(&server);
        let err = client.all_records("sheet-1", "raw_data").await.unwrap_err();

        assert!(matches!(err, EtlError::SheetsApiError { status: 403, .. }));
    }

    #[tokio::test]
    async fn test_formula_column_requests_formula_render() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/v4/spreadsheets/sheet-1/values/raw_data!A2:A4")
                .query_param("valueRenderOption", "FORMULA");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(json!({
                    "values": [
                        [r#"=HYPERLINK("https://x.test/1","p1")"#],
                        ["https://x.test/2"],
                        []
                    ]
                }));
        });

        let client = client_for(&server);
        let cells = client
            .formula_column("sheet-1", "raw_data", "A2:A4")
            .await
            .unwrap();

        mock.assert();
        assert_eq!(cells.len(), 3);
        assert_eq!(cells[0], r#"=HYPERLINK("https://x.test/1","p1")"#);
        assert_eq!(cells[1], "https://x.test/2");
        assert_eq!(cells[2], "");
    }

    #[test]
    fn test_rejects_invalid_credential_json() {
        let err = GoogleSheetsClient::new("not json").unwrap_err();
        assert!(matches!(err, EtlError::ConfigError { .. }));

        // Valid JSON but not a service-account key.
        let err = GoogleSheetsClient::new(r#"{"kind": "wrong"}"#).unwrap_err();
        assert!(matches!(err, EtlError::ConfigError { .. }));
    }

    #[test]
    fn test_worksheet_of_range() {
        assert_eq!(worksheet_of("raw_data!B2:B5"), "raw_data");
        assert_eq!(worksheet_of("raw_data"), "raw_data");
    }
}
