use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Team label written for a player the roster does not know.
pub const UNKNOWN_TEAM: &str = "Unknown";

// ---------------------------------------------------------------------------
// Sale category
// ---------------------------------------------------------------------------

/// Client type of a sale. Serialized exactly as stored in the `Sales Type` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SaleCategory {
    #[serde(rename = "Full-Time")]
    FullTime,
    #[serde(rename = "Part-Time")]
    PartTime,
    #[serde(rename = "Hourly")]
    Hourly,
}

impl SaleCategory {
    /// Every category in display order.
    pub const ALL: [SaleCategory; 3] = [
        SaleCategory::FullTime,
        SaleCategory::PartTime,
        SaleCategory::Hourly,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SaleCategory::FullTime => "Full-Time",
            SaleCategory::PartTime => "Part-Time",
            SaleCategory::Hourly => "Hourly",
        }
    }
}

impl std::fmt::Display for SaleCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SaleCategory {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        SaleCategory::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| AppError::Validation(format!("unknown sales type: {s:?}")))
    }
}

// ---------------------------------------------------------------------------
// Sale record
// ---------------------------------------------------------------------------

/// One persisted sale. Field order and names match the stored column layout:
/// `Name, Team, Sales Type, Runs, Sales Amount, Date`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleRecord {
    #[serde(rename = "Name")]
    pub player: String,
    #[serde(rename = "Team")]
    pub team: String,
    #[serde(rename = "Sales Type")]
    pub category: SaleCategory,
    #[serde(rename = "Runs")]
    pub score: u32,
    #[serde(rename = "Sales Amount")]
    pub amount: Decimal,
    /// ISO `YYYY-MM-DD`.
    #[serde(rename = "Date")]
    pub date: NaiveDate,
}

/// Header row of the persisted layout.
pub const RECORD_COLUMNS: [&str; 6] = ["Name", "Team", "Sales Type", "Runs", "Sales Amount", "Date"];

impl SaleRecord {
    /// Cells in column order, as written to a spreadsheet row.
    pub fn to_cells(&self) -> Vec<String> {
        vec![
            self.player.clone(),
            self.team.clone(),
            self.category.to_string(),
            self.score.to_string(),
            self.amount.to_string(),
            self.date.format("%Y-%m-%d").to_string(),
        ]
    }

    /// Parse a row of cells in column order.
    pub fn from_cells(cells: &[String]) -> Result<Self> {
        if cells.len() < RECORD_COLUMNS.len() {
            return Err(AppError::Backend(format!(
                "row has {} cells, expected {}",
                cells.len(),
                RECORD_COLUMNS.len()
            )));
        }
        let score = parse_runs(&cells[3])?;
        let amount = parse_amount(&cells[4])?;
        let date = NaiveDate::parse_from_str(cells[5].trim(), "%Y-%m-%d")
            .map_err(|_| AppError::Backend(format!("bad Date value: {:?}", cells[5])))?;
        Ok(Self {
            player: cells[0].trim().to_string(),
            // Rows written before the player was rostered carry a blank team.
            team: match cells[1].trim() {
                "" => UNKNOWN_TEAM.to_string(),
                team => team.to_string(),
            },
            category: cells[2].parse()?,
            score,
            amount,
            date,
        })
    }
}

/// Runs may have been written as `100` or `100.0`; anything that is not a
/// whole number in `u32` range makes the row malformed.
fn parse_runs(cell: &str) -> Result<u32> {
    let bad = || AppError::Backend(format!("bad Runs value: {cell:?}"));
    let runs = cell.trim().parse::<f64>().map_err(|_| bad())?;
    if !runs.is_finite() || runs.fract() != 0.0 || runs < 0.0 || runs > f64::from(u32::MAX) {
        return Err(bad());
    }
    Ok(runs as u32)
}

/// Plain decimal, or scientific notation as some spreadsheet exports write it.
pub fn parse_amount(cell: &str) -> Result<Decimal> {
    let raw = cell.trim();
    raw.parse::<Decimal>()
        .or_else(|_| Decimal::from_scientific(raw))
        .map_err(|_| AppError::Backend(format!("bad Sales Amount value: {cell:?}")))
}

// ---------------------------------------------------------------------------
// Aggregates
// ---------------------------------------------------------------------------

/// Derived total for one player or one team. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateRow {
    pub key: String,
    pub total_score: u64,
    pub total_amount: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn category_parses_stored_labels() {
        assert_eq!("Full-Time".parse::<SaleCategory>().unwrap(), SaleCategory::FullTime);
        assert_eq!("part-time".parse::<SaleCategory>().unwrap(), SaleCategory::PartTime);
        assert_eq!(" Hourly ".parse::<SaleCategory>().unwrap(), SaleCategory::Hourly);
        assert!("Contract".parse::<SaleCategory>().is_err());
    }

    #[test]
    fn cells_follow_column_order() {
        let record = SaleRecord {
            player: "Fahad".to_string(),
            team: "Charles United".to_string(),
            category: SaleCategory::PartTime,
            score: 50,
            amount: dec!(12.5),
            date: NaiveDate::from_ymd_opt(2025, 4, 20).unwrap(),
        };
        let cells = record.to_cells();
        assert_eq!(cells, vec!["Fahad", "Charles United", "Part-Time", "50", "12.5", "2025-04-20"]);
        assert_eq!(SaleRecord::from_cells(&cells).unwrap(), record);
    }

    #[test]
    fn short_row_is_rejected() {
        let cells = vec!["Fahad".to_string(), "Charles United".to_string()];
        assert!(SaleRecord::from_cells(&cells).is_err());
    }

    fn cells_with_runs(runs: &str) -> Vec<String> {
        ["Fahad", "Charles United", "Full-Time", runs, "10", "2025-04-20"]
            .map(String::from)
            .to_vec()
    }

    #[test]
    fn whole_runs_parse_with_or_without_fraction() {
        assert_eq!(SaleRecord::from_cells(&cells_with_runs("100")).unwrap().score, 100);
        assert_eq!(SaleRecord::from_cells(&cells_with_runs("100.0")).unwrap().score, 100);
        assert_eq!(SaleRecord::from_cells(&cells_with_runs(" 0 ")).unwrap().score, 0);
    }

    #[test]
    fn negative_fractional_or_overflowing_runs_are_malformed() {
        for runs in ["-25", "100.9", "1e12", "4294967296", "NaN", "inf", ""] {
            assert!(
                matches!(SaleRecord::from_cells(&cells_with_runs(runs)), Err(AppError::Backend(_))),
                "{runs:?}"
            );
        }
    }

    #[test]
    fn amounts_keep_exact_decimals() {
        assert_eq!(parse_amount("0.1").unwrap() + parse_amount("0.2").unwrap(), dec!(0.3));
        assert_eq!(parse_amount(" 2500.0 ").unwrap(), dec!(2500));
        assert_eq!(parse_amount("1.5e3").unwrap(), dec!(1500));
        assert!(parse_amount("lots").is_err());
    }
}
