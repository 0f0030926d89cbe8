use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap},
    Frame,
};

use super::format::{format_age, format_change, format_odds, format_price, format_usd, truncate};
use super::theme::Theme;
use crate::app::{App, Mode, Page};
use crate::stats::{top_by_engagement, top_by_momentum};
use crate::types::Market;

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Entries in each leaderboard on the stats page.
const LEADERBOARD_LEN: usize = 5;

// ---------------------------------------------------------------------------
// Frame
// ---------------------------------------------------------------------------

/// Draws one frame. Reads the app state only.
pub fn render(f: &mut Frame, app: &App, theme: &Theme) {
    let area = f.area();

    // header | controls | body | footer
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    render_header(f, app, theme, chunks[0]);
    render_controls(f, app, theme, chunks[1]);

    match app.mode {
        Mode::Loading => render_loading(f, app, theme, chunks[2]),
        Mode::Error => render_error(f, app, theme, chunks[2]),
        Mode::List | Mode::Detail => match app.page {
            Page::Markets if app.mode == Mode::Detail => render_detail(f, app, theme, chunks[2]),
            Page::Markets => render_markets_table(f, app, theme, chunks[2]),
            Page::Stats => render_stats(f, app, theme, chunks[2]),
            Page::About => render_about(f, theme, chunks[2]),
        },
    }

    render_footer(f, app, theme, chunks[3]);
}

fn spinner(app: &App) -> &'static str {
    SPINNER[app.spinner_frame % SPINNER.len()]
}

fn render_header(f: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let mut spans = vec![Span::styled(" Polyterm  ", theme.title)];

    for page in Page::ALL {
        let style = if page == app.page { theme.active_tab } else { theme.muted };
        spans.push(Span::styled(format!(" {} {} ", page.index() + 1, page.title()), style));
        spans.push(Span::raw(" "));
    }

    spans.push(Span::raw(" │  "));
    if app.loading {
        spans.push(Span::styled(format!("{} fetching", spinner(app)), theme.loading));
    } else if app.error.is_some() {
        spans.push(Span::styled("✗ fetch failed", theme.error));
    } else {
        spans.push(Span::styled("● live", theme.positive));
    }

    spans.push(Span::raw("  │  "));
    spans.push(Span::styled(
        format!("{} markets", app.markets.len()),
        theme.text,
    ));

    spans.push(Span::raw("  │  "));
    let auto = if app.auto_refresh { "auto-refresh: on" } else { "auto-refresh: off" };
    spans.push(Span::styled(auto, theme.muted));

    if let Some(at) = app.last_update {
        spans.push(Span::raw("  │  "));
        spans.push(Span::styled(format!("updated {}", format_age(at.elapsed())), theme.muted));
    }

    let paragraph = Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::ALL).border_style(theme.border));
    f.render_widget(paragraph, area);
}

fn render_controls(f: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let view = &app.view;
    let mut spans = vec![
        Span::styled(" Filter: ", theme.muted),
        Span::styled(view.filter.label(), theme.accent),
        Span::styled("  Sort: ", theme.muted),
        Span::styled(view.sort.label(), theme.accent),
        Span::styled("  Search: ", theme.muted),
    ];

    if view.search_mode {
        spans.push(Span::styled(format!("/{}▏", view.query), theme.key));
    } else if view.query.is_empty() {
        spans.push(Span::styled("—", theme.muted));
    } else {
        spans.push(Span::styled(view.query.clone(), theme.text));
    }

    spans.push(Span::styled(
        format!("  ({} shown)", view.visible().len()),
        theme.muted,
    ));

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

// ---------------------------------------------------------------------------
// Loading / error
// ---------------------------------------------------------------------------

fn render_loading(f: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let lines = vec![
        Line::raw(""),
        Line::from(Span::styled(
            format!("{} Fetching markets from Polymarket…", spinner(app)),
            theme.loading,
        )),
    ];
    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(bordered(theme, " LOADING "));
    f.render_widget(paragraph, area);
}

fn render_error(f: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let mut lines = vec![Line::raw("")];
    match &app.error {
        Some(failure) => {
            lines.push(Line::from(Span::styled(format!("Error ({})", failure.kind), theme.error)));
            lines.push(Line::raw(""));
            lines.push(Line::from(Span::styled(failure.message.clone(), theme.text)));
        }
        None => lines.push(Line::from(Span::styled("Error", theme.error))),
    }
    lines.push(Line::raw(""));
    lines.push(Line::from(Span::styled(
        "Press r to retry, esc to dismiss, q to quit",
        theme.muted,
    )));

    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(bordered(theme, " ERROR "));
    f.render_widget(paragraph, area);
}

// ---------------------------------------------------------------------------
// Markets page
// ---------------------------------------------------------------------------

fn render_markets_table(f: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let view = &app.view;

    if view.visible().is_empty() {
        let mut lines = vec![Line::raw(""), Line::from(Span::styled("No markets match", theme.text))];
        if view.has_filters() {
            lines.push(Line::from(Span::styled("press c to clear filters", theme.muted)));
        }
        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(bordered(theme, " MARKETS "));
        f.render_widget(paragraph, area);
        return;
    }

    let header_cells = ["#", "Market", "YES", "Volume", "24h Vol", "Liquidity", "24h Δ"]
        .iter()
        .map(|h| Cell::from(*h).style(theme.header));
    let header = Row::new(header_cells).height(1);

    // Leave room for the fixed columns and borders.
    let question_width = usize::from(area.width.saturating_sub(56)).max(10);

    let rows: Vec<Row> = view
        .window()
        .iter()
        .enumerate()
        .map(|(i, m)| {
            let (yes, _) = m.odds();
            let change = m.one_day_price_change;
            Row::new(vec![
                Cell::from(format!("{}", view.scroll + i + 1)).style(theme.muted),
                Cell::from(truncate(&m.question, question_width)),
                Cell::from(format_odds(yes)).style(theme.accent),
                Cell::from(format_usd(m.effective_volume())),
                Cell::from(format_usd(m.volume_24hr)),
                Cell::from(format_usd(m.effective_liquidity())),
                Cell::from(format_change(change)).style(theme.change(change)),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(4),
            Constraint::Min(10),
            Constraint::Length(7),
            Constraint::Length(9),
            Constraint::Length(9),
            Constraint::Length(9),
            Constraint::Length(8),
        ],
    )
    .header(header)
    .block(bordered(
        theme,
        &format!(" MARKETS  {}/{} ", view.cursor + 1, view.visible().len()),
    ))
    .row_highlight_style(theme.highlight);

    let mut state = TableState::default().with_selected(view.cursor_in_window());
    f.render_stateful_widget(table, area, &mut state);
}

fn render_detail(f: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let Some(m) = app.detail_market() else {
        render_markets_table(f, app, theme, area);
        return;
    };

    let (yes, no) = m.odds();
    let mut lines = vec![
        Line::from(Span::styled(m.question.clone(), theme.title)),
        Line::from(Span::styled(
            format!(
                "{} · {} · ends {}",
                or_dash(&m.category),
                or_dash(m.display_slug()),
                or_dash(&m.end_date)
            ),
            theme.muted,
        )),
        Line::raw(""),
        Line::from(vec![
            Span::styled("YES ", theme.muted),
            Span::styled(format_odds(yes), theme.positive),
            Span::styled("   NO ", theme.muted),
            Span::styled(format_odds(no), theme.negative),
        ]),
    ];

    let outcomes = m.outcomes();
    let prices = m.outcome_prices();
    if !outcomes.is_empty() {
        let pairs: Vec<String> = outcomes
            .iter()
            .enumerate()
            .map(|(i, o)| match prices.get(i) {
                Some(p) => format!("{o} @ {p}"),
                None => o.clone(),
            })
            .collect();
        lines.push(field_line(theme, "Outcomes", pairs.join("  ")));
    }

    lines.push(Line::raw(""));
    lines.push(field_line(theme, "Volume", format_usd(m.effective_volume())));
    lines.push(field_line(theme, "24h volume", format_usd(m.volume_24hr)));
    lines.push(field_line(theme, "1w volume", format_usd(m.volume_1wk)));
    lines.push(field_line(theme, "1m volume", format_usd(m.volume_1mo)));
    lines.push(field_line(theme, "Liquidity", format_usd(m.effective_liquidity())));
    lines.push(field_line(theme, "Open interest", format_usd(m.open_interest)));
    lines.push(field_line(
        theme,
        "Bid / Ask",
        format!("{} / {}", format_price(m.best_bid), format_price(m.best_ask)),
    ));
    lines.push(field_line(theme, "Spread", format_price(m.effective_spread())));
    lines.push(field_line(theme, "Last trade", format_price(m.last_trade_price)));
    lines.push(field_line(theme, "Comments", m.comment_count.to_string()));

    lines.push(Line::raw(""));
    lines.push(change_line(theme, m));
    lines.push(field_line(
        theme,
        "Momentum",
        format!("{:.3}   Engagement {:.1}", m.momentum_score(), m.engagement_score()),
    ));

    if !m.description.is_empty() {
        lines.push(Line::raw(""));
        lines.push(Line::from(Span::styled(m.description.clone(), theme.text)));
    }

    let title = format!(
        " MARKET DETAIL  {}/{} ",
        app.detail.map_or(0, |i| i + 1),
        app.view.visible().len()
    );
    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(bordered(theme, &title));
    f.render_widget(paragraph, area);
}

fn change_line<'a>(theme: &Theme, m: &Market) -> Line<'a> {
    let mut spans = vec![Span::styled(format!("{:<14}", "Price change"), theme.muted)];
    for (label, v) in [
        ("1h", m.one_hour_price_change),
        ("1d", m.one_day_price_change),
        ("1w", m.one_week_price_change),
        ("1m", m.one_month_price_change),
    ] {
        spans.push(Span::styled(format!("{label} "), theme.muted));
        spans.push(Span::styled(format!("{:<9}", format_change(v)), theme.change(v)));
    }
    Line::from(spans)
}

// ---------------------------------------------------------------------------
// Stats page
// ---------------------------------------------------------------------------

fn render_stats(f: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let stats = &app.stats;
    let mut lines = vec![
        field_line(theme, "Total markets", stats.total_markets.to_string()),
        field_line(theme, "Active markets", stats.active_markets.to_string()),
        field_line(theme, "Total volume", format_usd(stats.total_volume)),
        field_line(theme, "24h volume", format_usd(stats.volume_24h)),
        field_line(theme, "Avg liquidity", format_usd(stats.avg_liquidity)),
        Line::raw(""),
    ];

    let label_width = usize::from(halves[0].width.saturating_sub(6)).max(10);
    match &stats.top_gainer {
        Some(m) => {
            lines.push(Line::from(vec![
                Span::styled("Top gainer  ", theme.muted),
                Span::styled(
                    format_change(stats.top_gainer_change),
                    theme.change(stats.top_gainer_change),
                ),
            ]));
            lines.push(Line::from(Span::styled(truncate(&m.question, label_width), theme.text)));
        }
        None => lines.push(field_line(theme, "Top gainer", "—".to_string())),
    }
    lines.push(Line::raw(""));
    match &stats.top_volume {
        Some(m) => {
            lines.push(field_line(theme, "Top 24h volume", format_usd(m.volume_24hr)));
            lines.push(Line::from(Span::styled(truncate(&m.question, label_width), theme.text)));
        }
        None => lines.push(field_line(theme, "Top 24h volume", "—".to_string())),
    }

    f.render_widget(
        Paragraph::new(lines).block(bordered(theme, " OVERVIEW ")),
        halves[0],
    );

    let boards = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(halves[1]);

    let momentum: Vec<(&Market, String)> = top_by_momentum(&app.markets, LEADERBOARD_LEN)
        .into_iter()
        .map(|m| (m, format!("{:.3}", m.momentum_score())))
        .collect();
    render_leaderboard(f, theme, " MOMENTUM ", &momentum, boards[0]);

    let engagement: Vec<(&Market, String)> = top_by_engagement(&app.markets, LEADERBOARD_LEN)
        .into_iter()
        .map(|m| (m, format!("{:.1}", m.engagement_score())))
        .collect();
    render_leaderboard(f, theme, " ENGAGEMENT ", &engagement, boards[1]);
}

fn render_leaderboard(f: &mut Frame, theme: &Theme, title: &str, entries: &[(&Market, String)], area: Rect) {
    let rows: Vec<Row> = entries
        .iter()
        .enumerate()
        .map(|(i, (m, score))| {
            Row::new(vec![
                Cell::from(format!("{}", i + 1)).style(theme.muted),
                Cell::from(truncate(&m.question, usize::from(area.width.saturating_sub(16)).max(10))),
                Cell::from(score.clone()).style(theme.accent),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [Constraint::Length(3), Constraint::Min(10), Constraint::Length(8)],
    )
    .block(bordered(theme, title));
    f.render_widget(table, area);
}

// ---------------------------------------------------------------------------
// About page
// ---------------------------------------------------------------------------

fn render_about(f: &mut Frame, theme: &Theme, area: Rect) {
    let bindings: [(&str, &str); 13] = [
        ("q / ctrl-c", "quit"),
        ("r", "refresh now"),
        ("a", "toggle auto-refresh"),
        ("tab / 1-3", "switch page"),
        ("j k / ↑ ↓", "move"),
        ("g G / home end", "first / last"),
        ("pgup pgdn", "page"),
        ("enter", "open market"),
        ("esc", "back"),
        ("/", "search"),
        ("f", "cycle category filter"),
        ("s", "cycle sort"),
        ("c", "clear filters"),
    ];

    let mut lines = vec![
        Line::from(Span::styled(
            format!("polyterm {}", env!("CARGO_PKG_VERSION")),
            theme.title,
        )),
        Line::from(Span::styled(
            "Read-only Polymarket dashboard over the Gamma API.",
            theme.text,
        )),
        Line::raw(""),
    ];
    for (keys, action) in bindings {
        lines.push(Line::from(vec![
            Span::styled(format!("{keys:<16}"), theme.key),
            Span::styled(action, theme.text),
        ]));
    }

    f.render_widget(Paragraph::new(lines).block(bordered(theme, " ABOUT ")), area);
}

// ---------------------------------------------------------------------------
// Footer
// ---------------------------------------------------------------------------

fn render_footer(f: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let hints: &[(&str, &str)] = if app.view.search_mode && app.mode == Mode::List {
        &[("[enter] ", "keep  "), ("[esc] ", "cancel  "), ("[⌫] ", "delete")]
    } else {
        match (app.mode, app.page) {
            (Mode::Loading, _) => &[("[q] ", "quit  "), ("[esc] ", "quit")],
            (Mode::Error, _) => &[("[r] ", "retry  "), ("[esc] ", "dismiss  "), ("[q] ", "quit")],
            (Mode::Detail, Page::Markets) => &[
                ("[esc] ", "back  "),
                ("[j k] ", "prev/next  "),
                ("[r] ", "refresh  "),
                ("[q] ", "quit"),
            ],
            (Mode::List, Page::Markets) => &[
                ("[q] ", "quit  "),
                ("[r] ", "refresh  "),
                ("[↑↓ / j k] ", "move  "),
                ("[enter] ", "open  "),
                ("[/] ", "search  "),
                ("[f] ", "filter  "),
                ("[s] ", "sort  "),
                ("[c] ", "clear  "),
                ("[tab] ", "page"),
            ],
            _ => &[
                ("[q] ", "quit  "),
                ("[r] ", "refresh  "),
                ("[esc] ", "markets  "),
                ("[tab] ", "page"),
            ],
        }
    };

    let mut spans = vec![Span::raw(" ")];
    for (key, label) in hints {
        spans.push(Span::styled(*key, theme.key));
        spans.push(Span::raw(*label));
    }
    f.render_widget(Paragraph::new(Line::from(spans)).style(theme.text), area);
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn bordered<'a>(theme: &Theme, title: &str) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border)
        .title(Span::styled(title.to_string(), theme.title))
}

fn field_line<'a>(theme: &Theme, label: &str, value: String) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("{label:<14}"), theme.muted),
        Span::styled(value, theme.text),
    ])
}

fn or_dash(s: &str) -> &str {
    if s.is_empty() {
        "—"
    } else {
        s
    }
}
