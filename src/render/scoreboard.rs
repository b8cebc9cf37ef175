use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::league::roster::NEUTRAL_COLOR;
use crate::league::League;
use crate::scorer::{aggregate_by_player, aggregate_by_team, head_to_head, totals, Totals};
use crate::types::SaleRecord;

// ---------------------------------------------------------------------------
// View model, shared by the HTML page and /api/scoreboard
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerStanding {
    pub rank: usize,
    pub name: String,
    /// Rostered team, None when the player is not on the roster.
    pub team: Option<String>,
    pub color: String,
    pub runs: u64,
    pub sales: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamStanding {
    pub rank: usize,
    pub name: String,
    pub color: String,
    pub runs: u64,
    pub sales: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamScore {
    pub name: String,
    pub color: String,
    pub runs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunLegendEntry {
    pub category: String,
    pub runs: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scoreboard {
    pub league: String,
    pub dates: String,
    pub players: Vec<PlayerStanding>,
    pub teams: Vec<TeamStanding>,
    pub head_to_head: Vec<TeamScore>,
    pub totals: Totals,
    pub run_legend: Vec<RunLegendEntry>,
    /// Non-fatal message to show instead of data, e.g. after a failed load.
    pub notice: Option<String>,
}

impl Scoreboard {
    pub fn build(league: &League, records: &[SaleRecord], notice: Option<String>) -> Self {
        let players = aggregate_by_player(records)
            .into_iter()
            .enumerate()
            .map(|(i, row)| {
                let team = league.team_of(&row.key);
                PlayerStanding {
                    rank: i + 1,
                    team: team.map(|t| t.name.clone()),
                    color: team.map_or_else(|| NEUTRAL_COLOR.to_string(), |t| t.color.clone()),
                    name: row.key,
                    runs: row.total_score,
                    sales: row.total_amount,
                }
            })
            .collect();

        let team_rows = aggregate_by_team(records);
        let head_to_head = head_to_head(league, &team_rows)
            .into_iter()
            .map(|(team, runs)| TeamScore {
                name: team.name.clone(),
                color: team.color.clone(),
                runs,
            })
            .collect();
        let teams = team_rows
            .into_iter()
            .enumerate()
            .map(|(i, row)| TeamStanding {
                rank: i + 1,
                color: league
                    .team_named(&row.key)
                    .map_or_else(|| NEUTRAL_COLOR.to_string(), |t| t.color.clone()),
                name: row.key,
                runs: row.total_score,
                sales: row.total_amount,
            })
            .collect();

        let run_legend = league
            .runs()
            .entries()
            .into_iter()
            .map(|(category, runs)| RunLegendEntry {
                category: category.to_string(),
                runs,
            })
            .collect();

        Self {
            league: league.name.clone(),
            dates: league.dates.clone(),
            players,
            teams,
            head_to_head,
            totals: totals(records),
            run_legend,
            notice,
        }
    }

    /// True when there is nothing to tabulate; the page shows a "no data" state.
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    #[cfg(test)]
    pub fn player(&self, name: &str) -> Option<&PlayerStanding> {
        self.players.iter().find(|p| p.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::sale;

    #[test]
    fn players_are_colored_by_roster_team() {
        let league = League::builtin();
        let records = vec![
            sale("Fahad", "Charles United", 100, 10.0),
            sale("Laxmi", "Laimina Falcons", 50, 5.0),
            sale("Stranger", "Unknown", 25, 1.0),
        ];
        let board = Scoreboard::build(&league, &records, None);

        let fahad = board.player("Fahad").unwrap();
        assert_eq!(fahad.color, "green");
        assert_eq!(fahad.team.as_deref(), Some("Charles United"));
        assert_eq!(fahad.rank, 1);

        assert_eq!(board.player("Laxmi").unwrap().color, "blue");

        let stranger = board.player("Stranger").unwrap();
        assert_eq!(stranger.color, NEUTRAL_COLOR);
        assert!(stranger.team.is_none());

        assert_eq!(board.teams.last().unwrap().color, NEUTRAL_COLOR);
        assert_eq!(board.totals.total_runs, 175);
    }

    #[test]
    fn empty_records_build_empty_board() {
        let board = Scoreboard::build(&League::builtin(), &[], None);
        assert!(board.is_empty());
        assert!(board.teams.is_empty());
        assert_eq!(board.head_to_head.len(), 2);
        assert!(board.head_to_head.iter().all(|t| t.runs == 0));
        assert_eq!(board.run_legend.len(), 3);
    }
}
