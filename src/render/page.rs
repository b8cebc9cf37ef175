use std::borrow::Cow;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::league::League;
use crate::render::scoreboard::{PlayerStanding, Scoreboard, TeamStanding};
use crate::types::SaleCategory;

const STYLE: &str = r#"
body { font-family: sans-serif; margin: 0 auto; max-width: 1100px; padding: 0 16px; }
h1, h4 { text-align: center; }
h4 { color: grey; }
.columns { display: flex; gap: 32px; }
.columns > section { flex: 1; }
.styled-table { border-collapse: collapse; width: 100%; margin: 0 auto; font-size: 16px; box-shadow: 0 0 20px rgba(0, 0, 0, 0.15); }
.styled-table thead tr { background-color: #007bff; color: #ffffff; text-align: left; }
.styled-table th, .styled-table td { padding: 12px 15px; }
.styled-table tbody tr { border-bottom: 1px solid #dddddd; }
.styled-table tbody tr:nth-of-type(even) { background-color: #f3f3f3; }
.styled-table tbody tr:last-of-type { border-bottom: 2px solid #007bff; }
.versus { display: flex; justify-content: center; gap: 80px; font-size: 24px; text-align: center; }
.versus span { font-size: 32px; }
.metrics { display: flex; justify-content: space-around; font-size: 20px; margin: 24px 0; }
.metrics b { display: block; font-size: 32px; }
.no-data { text-align: center; color: grey; padding: 24px; border: 1px dashed #bbb; }
.flash { padding: 12px; margin: 12px 0; border-radius: 4px; }
.flash.success { background: #e6f4ea; color: #1e4620; }
.flash.error { background: #fdecea; color: #611a15; }
form label { display: block; margin: 8px 0; }
"#;

/// Inline result of a submission, shown next to the form.
#[derive(Debug, Clone, PartialEq)]
pub enum Flash {
    Success(String),
    Error(String),
}

/// What the submit form offers.
pub struct FormView<'a> {
    pub league: &'a League,
    /// Whether the form asks for the admin password.
    pub gated: bool,
}

pub fn render_page(board: &Scoreboard, form: &FormView<'_>, flash: Option<&Flash>) -> String {
    let title = escape_html(&board.league);
    let mut html = String::with_capacity(8 * 1024);

    html.push_str(&format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n\
         <h1>🎉🏏 {title} Scoreboard 🏏🎉</h1>\n"
    ));
    if !board.dates.is_empty() {
        html.push_str(&format!("<h4>Tournament Dates: {}</h4>\n", escape_html(&board.dates)));
    }
    html.push_str("<hr>\n");

    if let Some(notice) = &board.notice {
        html.push_str(&format!("<div class=\"flash error\">{}</div>\n", escape_html(notice)));
    }

    if board.is_empty() {
        html.push_str("<div class=\"no-data\">No sales recorded yet.</div>\n");
    } else {
        html.push_str("<div class=\"columns\">\n<section>\n");
        html.push_str("<h2 style=\"color: gold; text-align: center;\">🥇 Top Scorers</h2>\n");
        html.push_str(&player_table(&board.players));
        html.push_str("</section>\n<section>\n");
        html.push_str("<h2 style=\"color: #4CAF50; text-align: center;\">🏆 Team Standings</h2>\n");
        html.push_str(&team_table(&board.teams));
        html.push_str("</section>\n</div>\n");
    }

    html.push_str("<hr>\n<div class=\"versus\">\n");
    for team in &board.head_to_head {
        html.push_str(&format!(
            "<div><b>{}</b><br><span style=\"color: {};\">🏏 {}</span></div>\n",
            escape_html(&team.name),
            escape_html(&team.color),
            team.runs
        ));
    }
    html.push_str("</div>\n");

    html.push_str(&format!(
        "<div class=\"metrics\"><div>Total Runs 🏏<b>{}</b></div>\
         <div>Total Sales 💰<b>{}</b></div></div>\n",
        board.totals.total_runs,
        format_money(board.totals.total_sales)
    ));

    let legend: Vec<String> = board
        .run_legend
        .iter()
        .map(|e| format!("{} ({})", e.runs, escape_html(&e.category)))
        .collect();
    html.push_str(&format!(
        "<p style=\"text-align: center;\">Runs: {}</p>\n<hr>\n",
        legend.join(" | ")
    ));

    html.push_str(&submit_form(form, flash));
    html.push_str("</body>\n</html>\n");
    html
}

fn player_table(players: &[PlayerStanding]) -> String {
    let rows: String = players
        .iter()
        .map(|p| {
            format!(
                "<tr><td>{}</td><td><span style=\"color: {};\">{}</span></td><td>{}</td>\
                 <td>{}</td><td>{}</td></tr>\n",
                p.rank,
                escape_html(&p.color),
                escape_html(&p.name),
                escape_html(p.team.as_deref().unwrap_or("-")),
                p.runs,
                format_money(p.sales)
            )
        })
        .collect();
    format!(
        "<table class=\"styled-table\">\n<thead><tr><th>#</th><th>Name</th><th>Team</th>\
         <th>Runs</th><th>Sales Amount</th></tr></thead>\n<tbody>\n{rows}</tbody>\n</table>\n"
    )
}

fn team_table(teams: &[TeamStanding]) -> String {
    let rows: String = teams
        .iter()
        .map(|t| {
            format!(
                "<tr><td>{}</td><td><span style=\"color: {};\">{}</span></td><td>{}</td><td>{}</td></tr>\n",
                t.rank,
                escape_html(&t.color),
                escape_html(&t.name),
                t.runs,
                format_money(t.sales)
            )
        })
        .collect();
    format!(
        "<table class=\"styled-table\">\n<thead><tr><th>#</th><th>Team</th>\
         <th>Runs</th><th>Sales Amount</th></tr></thead>\n<tbody>\n{rows}</tbody>\n</table>\n"
    )
}

fn submit_form(form: &FormView<'_>, flash: Option<&Flash>) -> String {
    let open = if flash.is_some() { " open" } else { "" };
    let mut out = format!("<details{open}>\n<summary>🔐 Admin: Submit a Sale</summary>\n");

    match flash {
        Some(Flash::Success(msg)) => {
            out.push_str(&format!("<div class=\"flash success\">✅ {}</div>\n", escape_html(msg)));
        }
        Some(Flash::Error(msg)) => {
            out.push_str(&format!("<div class=\"flash error\">❌ {}</div>\n", escape_html(msg)));
        }
        None => {}
    }

    out.push_str("<form method=\"post\" action=\"/sales\">\n<label>Salesperson <select name=\"player\">\n");
    for player in form.league.players() {
        let p = escape_html(player);
        out.push_str(&format!("<option value=\"{p}\">{p}</option>\n"));
    }
    out.push_str("</select></label>\n<label>Type of Client <select name=\"category\">\n");
    for category in SaleCategory::ALL {
        out.push_str(&format!("<option value=\"{category}\">{category}</option>\n"));
    }
    out.push_str(
        "</select></label>\n<label>💰 Sales Amount \
         <input type=\"number\" name=\"amount\" min=\"0\" step=\"0.01\" value=\"0.00\" required></label>\n",
    );
    if form.gated {
        out.push_str("<label>Admin password <input type=\"password\" name=\"password\" required></label>\n");
    }
    out.push_str("<button type=\"submit\">Submit Sale</button>\n</form>\n</details>\n");
    out
}

/// Safe for both element text and double-quoted attribute values.
pub fn escape_html(s: &str) -> Cow<'_, str> {
    html_escape::encode_double_quoted_attribute(s)
}

/// `$1,234.50` style, half-cents rounded away from zero.
pub fn format_money(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    let digits = format!("{:.2}", rounded.abs());
    let (whole, cents) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("{sign}${grouped}.{cents}")
}
