mod tui_app;

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use tui_app::{format_money, truncate, AppState, ConnectionStatus};

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> io::Result<()> {
    let base_url = std::env::var("API_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .map_err(io::Error::other)?;

    let mut app = AppState::new(base_url);

    // Initial fetch before rendering
    app.refresh(&client).await;

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut player_table_state = TableState::default();
    player_table_state.select(None);

    let result = run_loop(&mut terminal, &mut app, &client, &mut player_table_state).await;

    // Restore terminal regardless of result
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

// ---------------------------------------------------------------------------
// Main event loop
// ---------------------------------------------------------------------------

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState,
    client: &reqwest::Client,
    player_state: &mut TableState,
) -> io::Result<()> {
    let refresh_interval = Duration::from_secs(5);
    let mut last_tick = std::time::Instant::now();

    loop {
        terminal.draw(|f| render(f, app, player_state))?;

        let timeout = refresh_interval
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') | KeyCode::Char('Q') => return Ok(()),
                        KeyCode::Char('r') | KeyCode::Char('R') => {
                            app.refresh(client).await;
                            last_tick = std::time::Instant::now();
                        }
                        KeyCode::Down | KeyCode::Char('j') => {
                            let max = app.board.players.len().saturating_sub(1);
                            let next = player_state.selected().map_or(0, |i| (i + 1).min(max));
                            player_state.select(Some(next));
                        }
                        KeyCode::Up | KeyCode::Char('k') => {
                            let prev = player_state
                                .selected()
                                .map_or(0, |i| i.saturating_sub(1));
                            player_state.select(Some(prev));
                        }
                        _ => {}
                    }
                }
            }
        }

        if last_tick.elapsed() >= refresh_interval {
            app.refresh(client).await;
            last_tick = std::time::Instant::now();
        }
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn render(f: &mut Frame, app: &AppState, player_state: &mut TableState) {
    let area = f.area();

    // Outer vertical split: header | head-to-head | body | footer
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // header
            Constraint::Length(3), // head-to-head
            Constraint::Min(0),    // body
            Constraint::Length(1), // footer
        ])
        .split(area);

    render_header(f, app, chunks[0]);
    render_head_to_head(f, app, chunks[1]);
    render_body(f, app, player_state, chunks[2]);
    render_footer(f, app, chunks[3]);
}

fn render_header(f: &mut Frame, app: &AppState, area: Rect) {
    let (status_text, status_color) = match &app.status {
        ConnectionStatus::Connected => ("● connected".to_string(), Color::Green),
        ConnectionStatus::Connecting => ("◌ connecting".to_string(), Color::Yellow),
        ConnectionStatus::Error(e) => (format!("✗ {}", truncate(e, 40)), Color::Red),
    };

    let title = if app.board.league.is_empty() {
        " League Scoreboard  ".to_string()
    } else {
        format!(" {}  ", app.board.league)
    };

    let title_spans = vec![
        Span::styled(
            title,
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(status_text, Style::default().fg(status_color)),
        Span::raw("  │  "),
        Span::styled(
            format!("{} runs", app.board.totals.total_runs),
            Style::default().fg(Color::White),
        ),
        Span::raw("  │  "),
        Span::styled(
            format!("{} sales", format_money(app.board.totals.total_sales)),
            Style::default().fg(Color::White),
        ),
        Span::raw("  │  "),
        Span::styled(
            app.board.dates.clone(),
            Style::default().fg(Color::DarkGray),
        ),
    ];

    let header_line = Line::from(title_spans);
    let paragraph = Paragraph::new(header_line)
        .block(Block::default().borders(Borders::ALL).border_style(
            Style::default().fg(Color::DarkGray),
        ));

    f.render_widget(paragraph, area);
}

fn render_head_to_head(f: &mut Frame, app: &AppState, area: Rect) {
    let mut spans = Vec::new();
    for (i, team) in app.board.head_to_head.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled("   vs   ", Style::default().fg(Color::DarkGray)));
        }
        spans.push(Span::styled(
            format!("{} 🏏 {}", team.name, team.runs),
            Style::default()
                .fg(team_color(&team.color))
                .add_modifier(Modifier::BOLD),
        ));
    }
    if let Some(notice) = &app.board.notice {
        spans.push(Span::raw("   "));
        spans.push(Span::styled(notice.clone(), Style::default().fg(Color::Red)));
    }

    let paragraph = Paragraph::new(Line::from(spans)).centered().block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    f.render_widget(paragraph, area);
}

fn render_body(f: &mut Frame, app: &AppState, player_state: &mut TableState, area: Rect) {
    // Horizontal split: players (60%) | teams (40%)
    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    render_players_table(f, app, player_state, halves[0]);
    render_teams_table(f, app, halves[1]);
}

fn render_players_table(f: &mut Frame, app: &AppState, state: &mut TableState, area: Rect) {
    let block = titled_block(" 🥇 TOP SCORERS ");

    if app.board.players.is_empty() {
        let empty = Paragraph::new("No sales recorded yet.")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        f.render_widget(empty, area);
        return;
    }

    let header_cells = ["#", "Name", "Team", "Runs", "Sales"]
        .iter()
        .map(|h| Cell::from(*h).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)));
    let header = Row::new(header_cells).height(1);

    let rows: Vec<Row> = app
        .board
        .players
        .iter()
        .map(|p| {
            let color = team_color(&p.color);
            Row::new(vec![
                Cell::from(p.rank.to_string()).style(Style::default().fg(Color::DarkGray)),
                Cell::from(truncate(&p.name, 20)).style(Style::default().fg(color)),
                Cell::from(truncate(p.team.as_deref().unwrap_or("—"), 18))
                    .style(Style::default().fg(Color::DarkGray)),
                Cell::from(p.runs.to_string()).style(Style::default().fg(Color::Cyan)),
                Cell::from(format_money(p.sales)),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(18),
            Constraint::Length(6),
            Constraint::Length(14),
        ],
    )
    .header(header)
    .block(block)
    .row_highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    );

    f.render_stateful_widget(table, area, state);
}

fn render_teams_table(f: &mut Frame, app: &AppState, area: Rect) {
    let header_cells = ["#", "Team", "Runs", "Sales"]
        .iter()
        .map(|h| Cell::from(*h).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)));
    let header = Row::new(header_cells).height(1);

    let rows: Vec<Row> = app
        .board
        .teams
        .iter()
        .map(|t| {
            Row::new(vec![
                Cell::from(t.rank.to_string()).style(Style::default().fg(Color::DarkGray)),
                Cell::from(truncate(&t.name, 20)).style(Style::default().fg(team_color(&t.color))),
                Cell::from(t.runs.to_string()).style(Style::default().fg(Color::Cyan)),
                Cell::from(format_money(t.sales)),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(6),
            Constraint::Length(14),
        ],
    )
    .header(header)
    .block(titled_block(" 🏆 TEAM STANDINGS "));

    f.render_widget(table, area);
}

fn render_footer(f: &mut Frame, app: &AppState, area: Rect) {
    let legend = app
        .board
        .run_legend
        .iter()
        .map(|e| format!("{}={}", e.category, e.runs))
        .collect::<Vec<_>>()
        .join(" ");
    let backend = app.health.backend.as_deref().unwrap_or("?");

    let line = Line::from(vec![
        Span::styled(" [q] ", Style::default().fg(Color::Yellow)),
        Span::raw("quit  "),
        Span::styled("[r] ", Style::default().fg(Color::Yellow)),
        Span::raw("refresh  "),
        Span::styled("[↑↓ / j k] ", Style::default().fg(Color::Yellow)),
        Span::raw("scroll players  "),
        Span::styled(format!("runs: {legend}  "), Style::default().fg(Color::DarkGray)),
        Span::styled(format!("backend: {backend}  "), Style::default().fg(Color::DarkGray)),
        Span::styled("auto-refresh: 5s", Style::default().fg(Color::DarkGray)),
    ]);
    let paragraph = Paragraph::new(line).style(Style::default().fg(Color::White));
    f.render_widget(paragraph, area);
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn titled_block(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            title,
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ))
}

/// Team colors are CSS names; anything the terminal palette lacks renders white.
fn team_color(css: &str) -> Color {
    match css.to_ascii_lowercase().as_str() {
        "black" => Color::White,
        "darkorange" | "orange" => Color::LightRed,
        "purple" => Color::Magenta,
        "teal" => Color::Cyan,
        "crimson" => Color::Red,
        other => other.parse::<Color>().unwrap_or(Color::White),
    }
}
