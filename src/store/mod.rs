pub mod cache;
pub mod csv_file;
#[cfg(test)]
pub mod memory;
pub mod sheets;
pub mod sqlite;

use std::future::Future;

use tracing::info;

use crate::config::{BackendKind, Config};
use crate::error::{AppError, Result};
use crate::types::SaleRecord;

pub use cache::RecordCache;
pub use csv_file::CsvStore;
pub use sheets::SheetsStore;
pub use sqlite::SqliteStore;

/// Persistence capability shared by every backend: read everything, append one.
///
/// `append` must only return `Ok` once the backend has accepted the record.
pub trait RecordStore: Send + Sync + 'static {
    /// Short backend name for logs and `/health`.
    fn kind(&self) -> &'static str;

    fn load_all(&self) -> impl Future<Output = Result<Vec<SaleRecord>>> + Send;

    fn append(&self, record: &SaleRecord) -> impl Future<Output = Result<()>> + Send;
}

// ---------------------------------------------------------------------------
// Backend: selected once at startup from RECORD_BACKEND
// ---------------------------------------------------------------------------

pub enum Backend {
    Csv(CsvStore),
    Sheets(SheetsStore),
    Sqlite(SqliteStore),
}

impl Backend {
    pub async fn from_config(cfg: &Config) -> Result<Self> {
        let backend = match cfg.backend {
            BackendKind::Csv => Backend::Csv(CsvStore::new(cfg.data_file.clone())),
            BackendKind::Sheets => {
                let spreadsheet_id = cfg.sheets_spreadsheet_id.clone().ok_or_else(|| {
                    AppError::Config("SHEETS_SPREADSHEET_ID is not set".to_string())
                })?;
                Backend::Sheets(SheetsStore::new(
                    &cfg.sheets_api_url,
                    spreadsheet_id,
                    cfg.sheets_range.clone(),
                    cfg.sheets_access_token.clone(),
                )?)
            }
            BackendKind::Sqlite => Backend::Sqlite(SqliteStore::connect(&cfg.db_path).await?),
        };
        info!("Record store ready: {}", backend.describe(cfg));
        Ok(backend)
    }

    fn describe(&self, cfg: &Config) -> String {
        match self {
            Backend::Csv(_) => format!("csv file {}", cfg.data_file.display()),
            Backend::Sheets(_) => format!("spreadsheet range {:?}", cfg.sheets_range),
            Backend::Sqlite(_) => format!("sqlite database {}", cfg.db_path),
        }
    }
}

impl RecordStore for Backend {
    fn kind(&self) -> &'static str {
        match self {
            Backend::Csv(s) => s.kind(),
            Backend::Sheets(s) => s.kind(),
            Backend::Sqlite(s) => s.kind(),
        }
    }

    async fn load_all(&self) -> Result<Vec<SaleRecord>> {
        match self {
            Backend::Csv(s) => s.load_all().await,
            Backend::Sheets(s) => s.load_all().await,
            Backend::Sqlite(s) => s.load_all().await,
        }
    }

    async fn append(&self, record: &SaleRecord) -> Result<()> {
        match self {
            Backend::Csv(s) => s.append(record).await,
            Backend::Sheets(s) => s.append(record).await,
            Backend::Sqlite(s) => s.append(record).await,
        }
    }
}
