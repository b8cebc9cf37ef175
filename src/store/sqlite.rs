use std::str::FromStr;

use chrono::NaiveDate;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool};

use crate::error::{AppError, Result};
use crate::store::RecordStore;
use crate::types::{parse_amount, SaleRecord};

/// Row shape of the `sales` table. Column meanings follow the persisted layout.
#[derive(Debug, sqlx::FromRow)]
struct SaleRow {
    name: String,
    team: String,
    sales_type: String,
    runs: i64,
    /// Decimal text, so cents survive the round trip exactly.
    sales_amount: String,
    sale_date: String,
}

impl TryFrom<SaleRow> for SaleRecord {
    type Error = AppError;

    fn try_from(r: SaleRow) -> Result<Self> {
        Ok(SaleRecord {
            player: r.name,
            team: r.team,
            category: r.sales_type.parse()?,
            score: u32::try_from(r.runs)
                .map_err(|_| AppError::Backend(format!("runs out of range: {}", r.runs)))?,
            amount: parse_amount(&r.sales_amount)?,
            date: NaiveDate::parse_from_str(&r.sale_date, "%Y-%m-%d")
                .map_err(|_| AppError::Backend(format!("bad sale_date: {:?}", r.sale_date)))?,
        })
    }
}

/// Local SQLite backend; rows come back in insertion order.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn connect(db_path: &str) -> Result<Self> {
        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{db_path}"))?
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(opts).await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }
}

impl RecordStore for SqliteStore {
    fn kind(&self) -> &'static str {
        "sqlite"
    }

    async fn load_all(&self) -> Result<Vec<SaleRecord>> {
        let rows: Vec<SaleRow> = sqlx::query_as(
            r#"
            SELECT name, team, sales_type, runs, sales_amount, sale_date
            FROM sales
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(SaleRecord::try_from).collect()
    }

    async fn append(&self, record: &SaleRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO sales (name, team, sales_type, runs, sales_amount, sale_date)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.player)
        .bind(&record.team)
        .bind(record.category.as_str())
        .bind(i64::from(record.score))
        .bind(record.amount.to_string())
        .bind(record.date.format("%Y-%m-%d").to_string())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
