use std::time::Duration;

use reqwest::Url;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::config::SHEETS_TIMEOUT_SECS;
use crate::error::{AppError, Result};
use crate::store::RecordStore;
use crate::types::{SaleRecord, RECORD_COLUMNS};

/// Remote spreadsheet backend speaking the Sheets v4 `values` API.
/// The first row of the range is the header row.
pub struct SheetsStore {
    client: reqwest::Client,
    api_url: Url,
    spreadsheet_id: String,
    range: String,
    access_token: Option<String>,
}

/// Body of `GET .../values/{range}`. `values` is absent when the sheet is empty.
#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

impl SheetsStore {
    pub fn new(
        api_url: &str,
        spreadsheet_id: String,
        range: String,
        access_token: Option<String>,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(SHEETS_TIMEOUT_SECS))
            .build()?;
        let api_url = Url::parse(api_url)
            .map_err(|e| AppError::Config(format!("SHEETS_API_URL is not a valid URL: {e}")))?;
        Ok(Self {
            client,
            api_url,
            spreadsheet_id,
            range,
            access_token,
        })
    }

    /// `{api}/spreadsheets/{id}/values/{range}` with every segment percent-encoded.
    fn values_url(&self, range_suffix: &str) -> Result<Url> {
        let range = format!("{}{range_suffix}", self.range);
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|_| AppError::Config("SHEETS_API_URL cannot be a base URL".to_string()))?
            .pop_if_empty()
            .extend([
                "spreadsheets",
                self.spreadsheet_id.as_str(),
                "values",
                range.as_str(),
            ]);
        Ok(url)
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.access_token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn fetch_values(&self) -> Result<Vec<Vec<String>>> {
        let url = self.values_url("")?;
        let resp: ValueRange = self
            .authorize(self.client.get(url))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(resp
            .values
            .into_iter()
            .map(|row| row.iter().map(cell_to_string).collect())
            .collect())
    }
}

impl RecordStore for SheetsStore {
    fn kind(&self) -> &'static str {
        "sheets"
    }

    async fn load_all(&self) -> Result<Vec<SaleRecord>> {
        let rows = self.fetch_values().await?;
        records_from_rows(&rows)
    }

    async fn append(&self, record: &SaleRecord) -> Result<()> {
        // An empty sheet gets its header row in the same call as the first record.
        let has_header = !self.fetch_values().await?.is_empty();
        let mut values: Vec<Vec<String>> = Vec::with_capacity(2);
        if !has_header {
            debug!("Sheet range {:?} is empty, writing header row", self.range);
            values.push(RECORD_COLUMNS.iter().map(|c| c.to_string()).collect());
        }
        values.push(record.to_cells());

        let mut url = self.values_url(":append")?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", "RAW")
            .append_pair("insertDataOption", "INSERT_ROWS");

        self.authorize(self.client.post(url))
            .json(&json!({ "values": values }))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

fn cell_to_string(v: &serde_json::Value) -> String {
    match v {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Header row first, then records. Trailing empty cells are omitted by the API,
/// so short rows are padded before parsing.
fn records_from_rows(rows: &[Vec<String>]) -> Result<Vec<SaleRecord>> {
    let Some((header, body)) = rows.split_first() else {
        return Ok(Vec::new());
    };
    if !header.iter().map(|h| h.trim()).eq(RECORD_COLUMNS.iter().copied()) {
        return Err(AppError::Backend(format!(
            "unexpected sheet header {header:?}, expected {RECORD_COLUMNS:?}"
        )));
    }

    body.iter()
        .filter(|row| row.iter().any(|c| !c.trim().is_empty()))
        .map(|row| {
            let mut cells = row.clone();
            cells.resize(RECORD_COLUMNS.len(), String::new());
            SaleRecord::from_cells(&cells)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SaleCategory;
    use axum::extract::State;
    use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
    use axum::response::{IntoResponse, Response};
    use axum::{Json, Router};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use std::sync::{Arc, Mutex};

    fn rows(data: &[&[&str]]) -> Vec<Vec<String>> {
        data.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn empty_sheet_has_no_records() {
        assert!(records_from_rows(&[]).unwrap().is_empty());
    }

    #[test]
    fn parses_rows_under_header() {
        let data = rows(&[
            &RECORD_COLUMNS,
            &["Zunaira", "Laimina Falcons", "Part-Time", "50", "300.5", "2025-04-20"],
            &["", "", "", "", "", ""],
            &["Harsh", "Charles United", "Hourly", "25", "0", "2025-04-21"],
        ]);
        let records = records_from_rows(&data).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].player, "Zunaira");
        assert_eq!(records[0].category, SaleCategory::PartTime);
        assert_eq!(records[0].amount, dec!(300.5));
        assert_eq!(records[1].score, 25);
    }

    #[test]
    fn wrong_header_is_malformed() {
        let data = rows(&[&["Who", "What"], &["Alice", "100"]]);
        assert!(records_from_rows(&data).is_err());
    }

    #[test]
    fn numeric_cells_are_stringified() {
        assert_eq!(cell_to_string(&json!(100)), "100");
        assert_eq!(cell_to_string(&json!("Hourly")), "Hourly");
        assert_eq!(cell_to_string(&serde_json::Value::Null), "");
    }

    #[test]
    fn values_url_encodes_range() {
        let store = SheetsStore::new(
            "https://sheets.example.com/v4",
            "abc123".to_string(),
            "Sales Log".to_string(),
            None,
        )
        .unwrap();
        let url = store.values_url(":append").unwrap();
        assert_eq!(
            url.as_str(),
            "https://sheets.example.com/v4/spreadsheets/abc123/values/Sales%20Log:append"
        );
    }

    // -----------------------------------------------------------------------
    // Local stand-in for the values API
    // -----------------------------------------------------------------------

    #[derive(Default)]
    struct SheetDouble {
        rows: Vec<Vec<serde_json::Value>>,
        reject_appends: bool,
        /// (method, path + query, authorization header, JSON body)
        requests: Vec<(Method, String, Option<String>, serde_json::Value)>,
    }

    type Shared = Arc<Mutex<SheetDouble>>;

    async fn values_api(
        State(sheet): State<Shared>,
        method: Method,
        uri: Uri,
        headers: HeaderMap,
        body: String,
    ) -> Response {
        let auth = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body: serde_json::Value = serde_json::from_str(&body).unwrap_or_default();
        let mut sheet = sheet.lock().unwrap();
        sheet
            .requests
            .push((method.clone(), uri.to_string(), auth, body.clone()));

        if method == Method::POST {
            if sheet.reject_appends {
                return (StatusCode::FORBIDDEN, "read-only sheet").into_response();
            }
            if let Some(rows) = body["values"].as_array() {
                for row in rows {
                    sheet.rows.push(row.as_array().cloned().unwrap_or_default());
                }
            }
            return Json(json!({ "updates": { "updatedRows": sheet.rows.len() } })).into_response();
        }

        // The real API omits "values" entirely for an empty range.
        if sheet.rows.is_empty() {
            Json(json!({ "range": "Sales" })).into_response()
        } else {
            Json(json!({ "range": "Sales", "values": sheet.rows })).into_response()
        }
    }

    async fn serve_sheet(sheet: Shared) -> SheetsStore {
        let app = Router::new().fallback(values_api).with_state(sheet);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        SheetsStore::new(
            &format!("http://{addr}/v4"),
            "sheet-1".to_string(),
            "Sales".to_string(),
            Some("tok-123".to_string()),
        )
        .unwrap()
    }

    fn record(player: &str, runs: u32, category: SaleCategory) -> SaleRecord {
        SaleRecord {
            player: player.to_string(),
            team: "Charles United".to_string(),
            category,
            score: runs,
            amount: dec!(1234.56),
            date: NaiveDate::from_ymd_opt(2025, 4, 22).unwrap(),
        }
    }

    #[tokio::test]
    async fn first_append_writes_header_then_records_load_back() {
        let sheet = Shared::default();
        let store = serve_sheet(Arc::clone(&sheet)).await;

        assert!(store.load_all().await.unwrap().is_empty());

        let first = record("Harsh", 100, SaleCategory::FullTime);
        let second = record("Arpita", 25, SaleCategory::Hourly);
        store.append(&first).await.unwrap();
        store.append(&second).await.unwrap();

        {
            let sheet = sheet.lock().unwrap();
            let posts: Vec<_> = sheet.requests.iter().filter(|r| r.0 == Method::POST).collect();
            assert_eq!(posts.len(), 2);

            let (_, uri, auth, body) = posts[0];
            assert_eq!(
                uri.as_str(),
                "/v4/spreadsheets/sheet-1/values/Sales:append?valueInputOption=RAW&insertDataOption=INSERT_ROWS"
            );
            assert_eq!(auth.as_deref(), Some("Bearer tok-123"));
            assert_eq!(body["values"][0], json!(RECORD_COLUMNS));
            assert_eq!(body["values"][1], json!(first.to_cells()));
            assert_eq!(body["values"].as_array().unwrap().len(), 2);

            let (_, _, _, body) = posts[1];
            assert_eq!(body["values"], json!([second.to_cells()]));

            assert!(sheet
                .requests
                .iter()
                .all(|r| r.2.as_deref() == Some("Bearer tok-123")));
        }

        assert_eq!(store.load_all().await.unwrap(), vec![first, second]);
    }

    #[tokio::test]
    async fn rejected_append_is_an_error() {
        let sheet = Shared::default();
        sheet.lock().unwrap().reject_appends = true;
        let store = serve_sheet(Arc::clone(&sheet)).await;

        let err = store
            .append(&record("Harsh", 100, SaleCategory::FullTime))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Http(_)));
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(sheet.lock().unwrap().rows.is_empty());
    }

    #[tokio::test]
    async fn numeric_cells_from_the_sheet_parse() {
        let sheet = Shared::default();
        sheet.lock().unwrap().rows = vec![
            RECORD_COLUMNS.iter().map(|c| json!(c)).collect(),
            vec![
                json!("Laxmi"),
                json!("Laimina Falcons"),
                json!("Part-Time"),
                json!(50),
                json!(99.5),
                json!("2025-05-02"),
            ],
        ];
        let store = serve_sheet(sheet).await;

        let records = store.load_all().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].score, 50);
        assert_eq!(records[0].amount, dec!(99.5));
    }
}
