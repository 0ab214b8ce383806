/// cachesim live visualizer — attach to any running simulation at any time.
///
/// Run in a separate terminal:
///   cargo run --bin viz
///
/// Polls /tmp/cachesim_live.json every 200ms and renders a live TUI
/// dashboard:
///
///   ┌ header: trace / geometry / status ─────────────────────────┐
///   │ set heatmap (one cell per set) │ Stats: hit rate, progress │
///   │ q/esc: quit  …footer…                                      │
///
/// Press q or Esc to quit. The simulation keeps running unaffected.
use cachesim::metrics::{read_metrics, LiveMetrics};
use crossterm::{
    event::{self, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame, Terminal,
};
use std::{io, time::Duration};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        let metrics = read_metrics();
        terminal.draw(|f| render(f, metrics.as_ref()))?;

        // Non-blocking: poll for 200ms, then redraw regardless
        if event::poll(Duration::from_millis(200))? {
            if let Event::Key(key) = event::read()? {
                if matches!(key.code, KeyCode::Char('q') | KeyCode::Esc) {
                    break;
                }
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Top-level layout
// ---------------------------------------------------------------------------

fn render(f: &mut Frame, metrics: Option<&LiveMetrics>) {
    let area = f.area();

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // header
            Constraint::Min(0),    // heatmap + stats
            Constraint::Length(1), // footer
        ])
        .split(area);

    render_header(f, rows[0], metrics);

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
        .split(rows[1]);

    render_heatmap(f, cols[0], metrics);
    render_stats(f, cols[1], metrics);
    render_footer(f, rows[2]);
}

// ---------------------------------------------------------------------------
// Header
// ---------------------------------------------------------------------------

fn render_header(f: &mut Frame, area: Rect, metrics: Option<&LiveMetrics>) {
    let block = Block::default()
        .title(Span::styled(
            " ⚡ cachesim live monitor ",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let (trace, geometry, status) = metrics
        .map(|m| {
            (
                m.trace_name.clone(),
                format!(
                    "{}B / {}B blocks / {}-way / {} sets",
                    m.capacity, m.block_size, m.associativity, m.num_sets
                ),
                m.status.clone(),
            )
        })
        .unwrap_or(("—".to_string(), "—".to_string(), "idle".to_string()));

    let status_color = match status.as_str() {
        "running" => Color::Green,
        "complete" => Color::Cyan,
        _ => Color::DarkGray,
    };

    let spans = vec![
        Span::styled("  trace: ", Style::default().fg(Color::DarkGray)),
        Span::styled(trace, Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
        Span::styled("   cache: ", Style::default().fg(Color::DarkGray)),
        Span::styled(geometry, Style::default().fg(Color::Cyan)),
        Span::styled("   status: ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            status.to_uppercase(),
            Style::default().fg(status_color).add_modifier(Modifier::BOLD),
        ),
    ];

    f.render_widget(Paragraph::new(Line::from(spans)), inner);
}

// ---------------------------------------------------------------------------
// Set heatmap
// ---------------------------------------------------------------------------

fn render_heatmap(f: &mut Frame, area: Rect, metrics: Option<&LiveMetrics>) {
    let block = Block::default().title(" Set Occupancy ").borders(Borders::ALL);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let (occupancy, ways) = metrics
        .map(|m| (m.set_occupancy.clone(), m.associativity.max(1) as u32))
        .unwrap_or_else(|| (vec![0u32; 16], 1));

    // Fit as many sets per row as the panel width allows (each set = 2 chars + 1 space)
    let sets_per_row = ((inner.width as usize).saturating_sub(1) / 3).max(1);

    // Legend line at top
    let legend = Line::from(vec![
        Span::styled("██", Style::default().fg(Color::Green)),
        Span::raw(" full   "),
        Span::styled("▓▓", Style::default().fg(Color::Yellow)),
        Span::raw(" partial   "),
        Span::styled("░░", Style::default().fg(Color::DarkGray)),
        Span::raw(" empty"),
    ]);

    let mut lines: Vec<Line> = vec![legend, Line::raw("")];

    for row in occupancy.chunks(sets_per_row) {
        let spans: Vec<Span> = row
            .iter()
            .flat_map(|&filled| {
                let (symbol, color) = if filled >= ways {
                    ("██", Color::Green)
                } else if filled > 0 {
                    ("▓▓", Color::Yellow)
                } else {
                    ("░░", Color::DarkGray)
                };
                vec![Span::styled(symbol, Style::default().fg(color)), Span::raw(" ")]
            })
            .collect();
        lines.push(Line::from(spans));
    }

    // Show valid-block summary below the grid
    let filled_blocks: u32 = occupancy.iter().sum();
    let total_blocks = occupancy.len() as u32 * ways;
    lines.push(Line::raw(""));
    lines.push(Line::from(vec![Span::styled(
        format!("  {}/{} blocks valid", filled_blocks, total_blocks),
        Style::default().fg(Color::DarkGray),
    )]));

    f.render_widget(Paragraph::new(lines), inner);
}

// ---------------------------------------------------------------------------
// Stats panel
// ---------------------------------------------------------------------------

fn render_stats(f: &mut Frame, area: Rect, metrics: Option<&LiveMetrics>) {
    let block = Block::default().title(" Stats ").borders(Borders::ALL);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // hit rate gauge
            Constraint::Length(1), // spacer
            Constraint::Length(2), // trace progress gauge
            Constraint::Length(1), // spacer
            Constraint::Min(0),    // text stats
        ])
        .split(inner);

    match metrics {
        None => {
            let msg = Paragraph::new(vec![
                Line::raw(""),
                Line::from(Span::styled(
                    "  No simulation running.",
                    Style::default().fg(Color::DarkGray),
                )),
                Line::from(Span::styled(
                    "  Start cachesim --live to see data.",
                    Style::default().fg(Color::DarkGray),
                )),
            ]);
            f.render_widget(msg, inner);
        }
        Some(m) => {
            // Hit rate gauge
            let rate = m.hit_rate.unwrap_or(0.0);
            let rate_pct = (rate * 100.0).clamp(0.0, 100.0) as u16;
            let rate_color = match rate_pct {
                0..=33 => Color::Red,
                34..=66 => Color::Yellow,
                _ => Color::Green,
            };
            let rate_label = match m.hit_rate {
                Some(r) => format!("{:.1}%", r * 100.0),
                None => "—".to_string(),
            };
            let rate_gauge = Gauge::default()
                .block(Block::default().title("Hit rate"))
                .gauge_style(Style::default().fg(rate_color))
                .percent(rate_pct)
                .label(rate_label);
            f.render_widget(rate_gauge, rows[0]);

            // Trace progress gauge
            let progress_pct = if m.addresses_total > 0 {
                ((m.accesses as f64 / m.addresses_total as f64) * 100.0) as u16
            } else {
                0
            };
            let progress_gauge = Gauge::default()
                .block(Block::default().title("Trace"))
                .gauge_style(Style::default().fg(Color::Blue))
                .percent(progress_pct.min(100))
                .label(format!("{} / {}", m.accesses, m.addresses_total));
            f.render_widget(progress_gauge, rows[2]);

            // Text stats
            let outcome_color = match m.last_outcome.as_str() {
                "hit" => Color::Green,
                "miss" => Color::Red,
                _ => Color::DarkGray,
            };
            let text = vec![
                Line::from(vec![
                    Span::styled("Accesses: ", Style::default().fg(Color::DarkGray)),
                    Span::raw(m.accesses.to_string()),
                ]),
                Line::from(vec![
                    Span::styled("Hits:     ", Style::default().fg(Color::DarkGray)),
                    Span::raw(m.hits.to_string()),
                ]),
                Line::from(vec![
                    Span::styled("Misses:   ", Style::default().fg(Color::DarkGray)),
                    Span::raw(m.misses.to_string()),
                ]),
                Line::raw(""),
                Line::from(vec![
                    Span::styled("Last:     ", Style::default().fg(Color::DarkGray)),
                    Span::raw(format!("{:#x} ", m.last_address)),
                    Span::styled(
                        m.last_outcome.to_uppercase(),
                        Style::default().fg(outcome_color).add_modifier(Modifier::BOLD),
                    ),
                ]),
            ];
            f.render_widget(Paragraph::new(text), rows[4]);
        }
    }
}

// ---------------------------------------------------------------------------
// Footer
// ---------------------------------------------------------------------------

fn render_footer(f: &mut Frame, area: Rect) {
    let text = Paragraph::new(Span::styled(
        "  q / esc: quit    auto-refreshes every 200ms    reads /tmp/cachesim_live.json",
        Style::default().fg(Color::DarkGray),
    ));
    f.render_widget(text, area);
}
