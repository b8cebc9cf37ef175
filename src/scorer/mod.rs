pub mod standings;

pub use standings::{aggregate_by_player, aggregate_by_team, head_to_head, totals, Totals};
