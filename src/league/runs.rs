use serde::{Deserialize, Serialize};

use crate::config::run_values;
use crate::types::SaleCategory;

/// Runs awarded per client type. Fixed for the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunTable {
    pub full_time: u32,
    pub part_time: u32,
    pub hourly: u32,
}

impl RunTable {
    /// Score of a sale. Depends on nothing but the category.
    pub fn runs(&self, category: SaleCategory) -> u32 {
        match category {
            SaleCategory::FullTime => self.full_time,
            SaleCategory::PartTime => self.part_time,
            SaleCategory::Hourly => self.hourly,
        }
    }

    /// `(category, runs)` pairs in display order, for the legend and the form.
    pub fn entries(&self) -> Vec<(SaleCategory, u32)> {
        SaleCategory::ALL.into_iter().map(|c| (c, self.runs(c))).collect()
    }
}

impl Default for RunTable {
    fn default() -> Self {
        Self {
            full_time: run_values::FULL_TIME,
            part_time: run_values::PART_TIME,
            hourly: run_values::HOURLY,
        }
    }
}
