use std::sync::Arc;

use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::error::Result;
use crate::league::League;
use crate::store::{RecordCache, RecordStore};
use crate::types::{SaleCategory, SaleRecord, UNKNOWN_TEAM};

/// A validated sale as it comes off the input boundary. `amount` is already
/// known to be non-negative.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitRequest {
    pub player: String,
    pub category: SaleCategory,
    pub amount: Decimal,
    /// Defaults to today's local date.
    pub submitted_at: Option<NaiveDate>,
}

/// Turns a request into a stored record: resolves the team, derives runs,
/// appends, then invalidates the read cache.
pub struct SubmissionHandler<S> {
    league: Arc<League>,
    store: Arc<S>,
    cache: Arc<RecordCache>,
}

impl<S> Clone for SubmissionHandler<S> {
    fn clone(&self) -> Self {
        Self {
            league: Arc::clone(&self.league),
            store: Arc::clone(&self.store),
            cache: Arc::clone(&self.cache),
        }
    }
}

impl<S: RecordStore> SubmissionHandler<S> {
    pub fn new(league: Arc<League>, store: Arc<S>, cache: Arc<RecordCache>) -> Self {
        Self { league, store, cache }
    }

    /// The record that `submit` would append.
    pub fn build_record(&self, req: SubmitRequest) -> SaleRecord {
        let team = match self.league.team_of(&req.player) {
            Some(team) => team.name.clone(),
            None => {
                warn!(player = %req.player, "Player is not on the roster, recording team as {UNKNOWN_TEAM}");
                UNKNOWN_TEAM.to_string()
            }
        };
        SaleRecord {
            score: self.league.runs().runs(req.category),
            team,
            player: req.player,
            category: req.category,
            amount: req.amount,
            date: req.submitted_at.unwrap_or_else(|| Local::now().date_naive()),
        }
    }

    /// Append a sale. The cache is only invalidated after the backend accepted
    /// the record; on failure it is left untouched and the error is returned.
    pub async fn submit(&self, req: SubmitRequest) -> Result<SaleRecord> {
        let record = self.build_record(req);
        self.store.append(&record).await?;
        self.cache.invalidate();

        info!(
            event = "SALE_RECORDED",
            player = %record.player,
            team = %record.team,
            category = %record.category,
            runs = record.score,
            amount = %record.amount,
            "Sale recorded for {} ({}) - {} runs, {}",
            record.player, record.category, record.score, record.amount,
        );
        Ok(record)
    }
}
