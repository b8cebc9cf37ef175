use std::path::PathBuf;
use std::time::Duration;

use crate::error::{AppError, Result};

pub const SHEETS_API_URL: &str = "https://sheets.googleapis.com/v4";

/// Default CSV file holding the sale records.
pub const DATA_FILE: &str = "sales_data.csv";

/// How long a loaded record set is served from cache before the backend is hit again.
pub const CACHE_TTL_SECS: u64 = 30;

/// Timeout for remote spreadsheet calls.
pub const SHEETS_TIMEOUT_SECS: u64 = 15;

/// Runs awarded per client type when the league file does not override them.
pub mod run_values {
    pub const FULL_TIME: u32 = 100;
    pub const PART_TIME: u32 = 50;
    pub const HOURLY: u32 = 25;
}

/// Which record store the server reads from and appends to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendKind {
    Csv,
    Sheets,
    Sqlite,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BackendKind::Csv => "csv",
            BackendKind::Sheets => "sheets",
            BackendKind::Sqlite => "sqlite",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for BackendKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(BackendKind::Csv),
            "sheets" | "gsheets" => Ok(BackendKind::Sheets),
            "sqlite" => Ok(BackendKind::Sqlite),
            other => Err(AppError::Config(format!(
                "RECORD_BACKEND must be csv, sheets or sqlite (got {other:?})"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub api_port: u16,
    /// RECORD_BACKEND
    pub backend: BackendKind,
    /// CSV backend file (DATA_FILE)
    pub data_file: PathBuf,
    /// SQLite backend file (DB_PATH)
    pub db_path: String,
    pub sheets_api_url: String,
    pub sheets_spreadsheet_id: Option<String>,
    /// Sheet name or A1 range that holds the records (SHEETS_RANGE)
    pub sheets_range: String,
    pub sheets_access_token: Option<String>,
    pub cache_ttl: Duration,
    /// Optional TOML file overriding the built-in league (LEAGUE_FILE)
    pub league_file: Option<PathBuf>,
    /// Gate for the submit form; None leaves the form open (ADMIN_PASSWORD)
    pub admin_password: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let backend = std::env::var("RECORD_BACKEND")
            .unwrap_or_else(|_| "csv".to_string())
            .parse::<BackendKind>()?;

        let cfg = Self {
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            api_port: std::env::var("API_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse::<u16>()
                .map_err(|_| AppError::Config("API_PORT must be a valid port number".to_string()))?,
            backend,
            data_file: std::env::var("DATA_FILE")
                .unwrap_or_else(|_| DATA_FILE.to_string())
                .into(),
            db_path: std::env::var("DB_PATH").unwrap_or_else(|_| "scoreboard.db".to_string()),
            sheets_api_url: std::env::var("SHEETS_API_URL")
                .unwrap_or_else(|_| SHEETS_API_URL.to_string()),
            sheets_spreadsheet_id: non_empty_var("SHEETS_SPREADSHEET_ID"),
            sheets_range: std::env::var("SHEETS_RANGE").unwrap_or_else(|_| "Sheet1".to_string()),
            sheets_access_token: non_empty_var("SHEETS_ACCESS_TOKEN"),
            cache_ttl: Duration::from_secs(
                std::env::var("CACHE_TTL_SECS")
                    .unwrap_or_else(|_| CACHE_TTL_SECS.to_string())
                    .parse::<u64>()
                    .unwrap_or(CACHE_TTL_SECS),
            ),
            league_file: non_empty_var("LEAGUE_FILE").map(PathBuf::from),
            admin_password: non_empty_var("ADMIN_PASSWORD"),
        };

        if cfg.backend == BackendKind::Sheets && cfg.sheets_spreadsheet_id.is_none() {
            return Err(AppError::Config(
                "SHEETS_SPREADSHEET_ID is required when RECORD_BACKEND=sheets".to_string(),
            ));
        }

        Ok(cfg)
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
