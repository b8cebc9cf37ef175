use rust_decimal::{Decimal, RoundingStrategy};
use serde::Deserialize;

// ---------------------------------------------------------------------------
// API response types (mirror render/scoreboard.rs and api/routes.rs shapes)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Default)]
#[allow(dead_code)]
pub struct Scoreboard {
    pub league: String,
    pub dates: String,
    pub players: Vec<PlayerStanding>,
    pub teams: Vec<TeamStanding>,
    pub head_to_head: Vec<TeamScore>,
    pub totals: Totals,
    pub run_legend: Vec<RunLegendEntry>,
    pub notice: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlayerStanding {
    pub rank: usize,
    pub name: String,
    pub team: Option<String>,
    pub color: String,
    pub runs: u64,
    pub sales: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TeamStanding {
    pub rank: usize,
    pub name: String,
    pub color: String,
    pub runs: u64,
    pub sales: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TeamScore {
    pub name: String,
    pub color: String,
    pub runs: u64,
}

#[derive(Debug, Clone, Copy, Deserialize, Default)]
pub struct Totals {
    pub total_runs: u64,
    pub total_sales: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RunLegendEntry {
    pub category: String,
    pub runs: u32,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[allow(dead_code)]
pub struct HealthResponse {
    pub backend: Option<String>,
    pub last_load_ok: Option<bool>,
    pub records_loaded: Option<u64>,
    pub appends_total: Option<u64>,
    pub append_failures: Option<u64>,
    pub last_append_at_secs: Option<u64>,
}

// ---------------------------------------------------------------------------
// App state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionStatus {
    Connected,
    Error(String),
    Connecting,
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub status: ConnectionStatus,
    pub board: Scoreboard,
    pub health: HealthResponse,
    pub last_refresh: std::time::Instant,
    pub base_url: String,
}

impl AppState {
    pub fn new(base_url: String) -> Self {
        Self {
            status: ConnectionStatus::Connecting,
            board: Scoreboard::default(),
            health: HealthResponse::default(),
            last_refresh: std::time::Instant::now(),
            base_url,
        }
    }

    pub async fn refresh(&mut self, client: &reqwest::Client) {
        let board_url = format!("{}/api/scoreboard", self.base_url);
        let health_url = format!("{}/health", self.base_url);

        let (board_res, health_res) = tokio::join!(
            client.get(&board_url).send(),
            client.get(&health_url).send(),
        );

        let board_resp = match board_res {
            Ok(r) => r,
            Err(e) => {
                self.status = ConnectionStatus::Error(format!("{e}"));
                return;
            }
        };

        match board_resp.json::<Scoreboard>().await {
            Ok(board) => {
                self.board = board;
                self.status = ConnectionStatus::Connected;
                self.last_refresh = std::time::Instant::now();

                if let Ok(h) = health_res {
                    if let Ok(health) = h.json::<HealthResponse>().await {
                        self.health = health;
                    }
                }
            }
            Err(e) => {
                self.status = ConnectionStatus::Error(format!("parse error: {e}"));
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

/// `$1,234.50` style, matching the web page.
pub fn format_money(amount: Decimal) -> String {
    let rounded = amount
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        .max(Decimal::ZERO);
    let digits = format!("{rounded:.2}");
    let (whole, cents) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));
    let mut grouped = String::new();
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("${grouped}.{cents}")
}

pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{head}…")
    }
}

#[allow(dead_code)]
fn main() {
    // Shared by src/bin/tui.rs; the entry point lives there.
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn money_groups_thousands() {
        assert_eq!(format_money(dec!(0)), "$0.00");
        assert_eq!(format_money(dec!(1234.5)), "$1,234.50");
        assert_eq!(format_money(dec!(1000000)), "$1,000,000.00");
    }

    #[test]
    fn truncate_marks_cut_names() {
        assert_eq!(truncate("Fahad", 10), "Fahad");
        assert_eq!(truncate("Parameshwari", 6), "Param…");
    }

    #[test]
    fn scoreboard_payload_deserializes() {
        let body = r#"{"league":"L","dates":"","players":[],"teams":[],
            "head_to_head":[{"name":"A","color":"green","runs":0}],
            "totals":{"total_runs":25,"total_sales":"0.3"},"run_legend":[],"notice":null}"#;
        let board: Scoreboard = serde_json::from_str(body).unwrap();
        assert_eq!(board.head_to_head[0].name, "A");
        assert_eq!(board.totals.total_sales, dec!(0.3));
    }
}
