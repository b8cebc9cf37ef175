use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{AppError, Result};
use crate::league::RunTable;

/// Colors handed out to teams whose league file entry has none.
const TEAM_PALETTE: &[&str] = &["green", "blue", "darkorange", "purple", "teal", "crimson"];

/// Neutral color for players the roster does not know.
pub const NEUTRAL_COLOR: &str = "black";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub name: String,
    /// CSS color used for the team's players and head-to-head score.
    pub color: String,
    pub players: Vec<String>,
}

// ---------------------------------------------------------------------------
// League file (TOML)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct LeagueFile {
    name: Option<String>,
    dates: Option<String>,
    #[serde(default)]
    runs: RunTable,
    teams: Vec<TeamEntry>,
}

#[derive(Debug, Deserialize)]
struct TeamEntry {
    name: String,
    color: Option<String>,
    players: Vec<String>,
}

// ---------------------------------------------------------------------------
// League
// ---------------------------------------------------------------------------

/// Roster plus run table. Built once at startup and passed to every component
/// that needs it; never mutated afterwards.
#[derive(Debug, Clone)]
pub struct League {
    pub name: String,
    /// Free-form tournament dates shown under the title.
    pub dates: String,
    teams: Vec<Team>,
    runs: RunTable,
    /// player name → index into `teams`
    player_team: HashMap<String, usize>,
}

impl League {
    /// Build a league, rejecting duplicate team names and players listed on
    /// more than one team.
    pub fn new(
        name: impl Into<String>,
        dates: impl Into<String>,
        teams: Vec<Team>,
        runs: RunTable,
    ) -> Result<Self> {
        let mut player_team = HashMap::new();
        for (idx, team) in teams.iter().enumerate() {
            if team.name.trim().is_empty() {
                return Err(AppError::Roster("team name must not be empty".to_string()));
            }
            if teams[..idx].iter().any(|t| t.name == team.name) {
                return Err(AppError::Roster(format!("team {:?} listed twice", team.name)));
            }
            for player in &team.players {
                if let Some(prev) = player_team.insert(player.clone(), idx) {
                    return Err(AppError::Roster(format!(
                        "player {player:?} is on both {:?} and {:?}",
                        teams[prev].name, team.name
                    )));
                }
            }
        }

        Ok(Self {
            name: name.into(),
            dates: dates.into(),
            teams,
            runs,
            player_team,
        })
    }

    /// The league the scoreboard ships with.
    pub fn builtin() -> Self {
        let teams = vec![
            Team {
                name: "Charles United".to_string(),
                color: "green".to_string(),
                players: ["Fahad", "Charlotte", "Parameshwari", "Arpita", "Harsh", "Shailja"]
                    .map(String::from)
                    .to_vec(),
            },
            Team {
                name: "Laimina Falcons".to_string(),
                color: "blue".to_string(),
                players: ["Zunaira", "Anushka", "Jhalak", "Farman", "Gurjeet", "Laxmi"]
                    .map(String::from)
                    .to_vec(),
            },
        ];
        let player_team = teams
            .iter()
            .enumerate()
            .flat_map(|(idx, t)| t.players.iter().map(move |p| (p.clone(), idx)))
            .collect();

        Self {
            name: "Global Premier League".to_string(),
            dates: "April 14 - May 14".to_string(),
            teams,
            runs: RunTable::default(),
            player_team,
        }
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let file: LeagueFile = toml::from_str(content)?;
        let teams = file
            .teams
            .into_iter()
            .enumerate()
            .map(|(idx, t)| Team {
                name: t.name,
                color: t
                    .color
                    .unwrap_or_else(|| TEAM_PALETTE[idx % TEAM_PALETTE.len()].to_string()),
                players: t.players,
            })
            .collect();
        Self::new(
            file.name.unwrap_or_else(|| "League".to_string()),
            file.dates.unwrap_or_default(),
            teams,
            file.runs,
        )
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let league = Self::from_toml(&content)?;
        info!(
            "Loaded league {:?} from {}: {} teams, {} players",
            league.name,
            path.as_ref().display(),
            league.teams.len(),
            league.player_team.len(),
        );
        Ok(league)
    }

    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    pub fn runs(&self) -> &RunTable {
        &self.runs
    }

    pub fn team_of(&self, player: &str) -> Option<&Team> {
        self.player_team.get(player).map(|&idx| &self.teams[idx])
    }

    pub fn team_named(&self, team: &str) -> Option<&Team> {
        self.teams.iter().find(|t| t.name == team)
    }

    /// Every rostered player, team by team in roster order.
    pub fn players(&self) -> impl Iterator<Item = &str> {
        self.teams
            .iter()
            .flat_map(|t| t.players.iter().map(String::as_str))
    }
}
