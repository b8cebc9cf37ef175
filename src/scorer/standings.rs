use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::league::{League, Team};
use crate::types::{AggregateRow, SaleRecord};

/// League-wide headline numbers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub total_runs: u64,
    pub total_sales: Decimal,
}

/// Runs and sales per player, highest runs first.
pub fn aggregate_by_player(records: &[SaleRecord]) -> Vec<AggregateRow> {
    aggregate_by(records, |r| r.player.as_str())
}

/// Runs and sales per team, highest runs first. Uses the team stored on each
/// record, not the current roster.
pub fn aggregate_by_team(records: &[SaleRecord]) -> Vec<AggregateRow> {
    aggregate_by(records, |r| r.team.as_str())
}

/// Group on exact key equality, then sort descending by runs. The sort is
/// stable, so tied keys keep the order in which they first appear in `records`.
fn aggregate_by<F>(records: &[SaleRecord], key: F) -> Vec<AggregateRow>
where
    F: Fn(&SaleRecord) -> &str,
{
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut rows: Vec<AggregateRow> = Vec::new();

    for record in records {
        let k = key(record);
        let idx = *index.entry(k).or_insert_with(|| {
            rows.push(AggregateRow {
                key: k.to_string(),
                total_score: 0,
                total_amount: Decimal::ZERO,
            });
            rows.len() - 1
        });
        rows[idx].total_score += u64::from(record.score);
        rows[idx].total_amount += record.amount;
    }

    rows.sort_by(|a, b| b.total_score.cmp(&a.total_score));
    rows
}

pub fn totals(records: &[SaleRecord]) -> Totals {
    records.iter().fold(Totals::default(), |acc, r| Totals {
        total_runs: acc.total_runs + u64::from(r.score),
        total_sales: acc.total_sales + r.amount,
    })
}

/// Runs for every rostered team in roster order, zero for teams with no sales.
pub fn head_to_head<'a>(league: &'a League, team_rows: &[AggregateRow]) -> Vec<(&'a Team, u64)> {
    league
        .teams()
        .iter()
        .map(|team| {
            let runs = team_rows
                .iter()
                .find(|row| row.key == team.name)
                .map_or(0, |row| row.total_score);
            (team, runs)
        })
        .collect()
}
