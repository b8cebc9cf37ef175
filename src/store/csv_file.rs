use std::io::ErrorKind;
use std::path::PathBuf;

use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::error::{AppError, Result};
use crate::store::RecordStore;
use crate::types::{SaleRecord, RECORD_COLUMNS};

/// Flat-file backend. One header row, then one row per sale, appended in place.
pub struct CsvStore {
    path: PathBuf,
}

impl CsvStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RecordStore for CsvStore {
    fn kind(&self) -> &'static str {
        "csv"
    }

    /// A missing file is an empty league, not an error.
    async fn load_all(&self) -> Result<Vec<SaleRecord>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(b) => b,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("{} does not exist yet", self.path.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };
        parse_records(&bytes)
    }

    async fn append(&self, record: &SaleRecord) -> Result<()> {
        let needs_header = match tokio::fs::metadata(&self.path).await {
            Ok(meta) => meta.len() == 0,
            Err(e) if e.kind() == ErrorKind::NotFound => true,
            Err(e) => return Err(e.into()),
        };

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        if needs_header {
            writer.write_record(RECORD_COLUMNS)?;
        }
        writer.write_record(record.to_cells())?;
        let bytes = writer
            .into_inner()
            .map_err(|e| AppError::Backend(format!("CSV buffer flush failed: {e}")))?;

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(&bytes).await?;
        file.sync_all().await?;
        Ok(())
    }
}

/// Parse a CSV body whose header row must match the persisted layout.
fn parse_records(bytes: &[u8]) -> Result<Vec<SaleRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let headers = reader.headers()?.clone();
    if headers.is_empty() {
        return Ok(Vec::new());
    }
    if !headers.iter().eq(RECORD_COLUMNS.iter().copied()) {
        return Err(AppError::Backend(format!(
            "unexpected CSV header {:?}, expected {:?}",
            headers.iter().collect::<Vec<_>>(),
            RECORD_COLUMNS
        )));
    }

    let mut records = Vec::new();
    for row in reader.records() {
        let cells: Vec<String> = row?.iter().map(str::to_string).collect();
        records.push(SaleRecord::from_cells(&cells)?);
    }
    Ok(records)
}
