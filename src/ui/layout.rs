use {
    super::renderer::{format_address, format_hash, format_value, kind_color},
    crate::{
        pipeline::{pacing::PacingState, types::TxRecord},
        state::DashboardState,
    },
    chrono::{DateTime, Local, Utc},
    ratatui::{
        layout::{Constraint, Direction, Layout as RatLayout, Rect},
        style::{Color, Modifier, Style},
        text::{Line, Span},
        widgets::{Block, Borders, Paragraph, Row, Table},
        Frame,
    },
};

/// Rows rendered in the transactions table
const TABLE_ROWS: usize = 50;

/// Everything one frame needs, captured before drawing
pub struct DashboardView<'a> {
    pub records: &'a [TxRecord],
    pub pacing: PacingState,
    pub state: &'a DashboardState,
}

/// Render the main UI layout
pub fn render_layout(f: &mut Frame, area: Rect, view: &DashboardView<'_>) {
    let chunks = RatLayout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Header / metrics
            Constraint::Min(0),    // Body
            Constraint::Length(3), // Footer / pacing
        ])
        .split(area);

    let body = RatLayout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(60), Constraint::Length(34)])
        .split(chunks[1]);

    render_header(f, chunks[0], view.state);
    render_transactions_table(f, body[0], view.records);
    render_blocks(f, body[1], view.state);
    render_footer(f, chunks[2], view);
}

fn render_header(f: &mut Frame, area: Rect, state: &DashboardState) {
    let metrics = state.metrics();
    let activity = metrics.activity_label();
    let activity_color = match activity.as_str() {
        "High" => Color::Green,
        "Medium" => Color::Yellow,
        _ => Color::Gray,
    };

    let updated = state
        .last_updated()
        .map(format_time)
        .unwrap_or_else(|| "never".to_string());

    let text = vec![
        Line::from(vec![
            Span::styled("TPS ", Style::default().fg(Color::Cyan)),
            Span::styled(
                format!("{:.2}", metrics.tps),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!(
                " (10s {:.2} | 30s {:.2} | 60s {:.2}) ",
                metrics.tps_10s, metrics.tps_30s, metrics.tps_60s
            )),
            Span::styled(format!("{} Activity", activity), Style::default().fg(activity_color)),
        ]),
        Line::from(vec![
            Span::styled("Height ", Style::default().fg(Color::Cyan)),
            Span::raw(metrics.block_height.to_string()),
            Span::raw(format!(
                " | Block time {:.2}s | {:.1} blocks/min | Validators {}",
                metrics.avg_block_time, metrics.blocks_per_minute, metrics.validators
            )),
            Span::raw(format!(" | Updated {}", updated)),
        ]),
    ];

    let header = Block::default()
        .borders(Borders::ALL)
        .title("txflow - Live Transaction Playback (q/Esc to quit)");
    f.render_widget(Paragraph::new(text).block(header), area);
}

fn render_transactions_table(f: &mut Frame, area: Rect, records: &[TxRecord]) {
    let header = Row::new(vec!["Hash", "From", "To", "Value", "Block", "Gas", "Type"])
        .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = records
        .iter()
        .take(TABLE_ROWS)
        .enumerate()
        .map(|(idx, tx)| {
            let kind = tx.kind();
            let mut style = Style::default().fg(kind_color(kind));
            if idx == 0 {
                style = style.add_modifier(Modifier::BOLD);
            }

            Row::new(vec![
                format_hash(&tx.hash),
                format_address(Some(&tx.from)),
                format_address(tx.to.as_deref()),
                format_value(&tx.value),
                tx.block_number.to_string(),
                tx.gas_used.map(|g| g.to_string()).unwrap_or_else(|| "N/A".to_string()),
                kind.label().to_string(),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(14), // Hash
        Constraint::Length(14), // From
        Constraint::Length(14), // To
        Constraint::Length(20), // Value
        Constraint::Length(10), // Block
        Constraint::Length(8),  // Gas
        Constraint::Length(9),  // Type
    ];

    let title = format!("Recent Transactions ({} shown)", records.len());
    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(title));

    f.render_widget(table, area);
}

fn render_blocks(f: &mut Frame, area: Rect, state: &DashboardState) {
    let lines: Vec<Line> = state
        .recent_blocks()
        .iter()
        .flat_map(|block| {
            [
                Line::from(Span::styled(
                    format!("#{}", block.number),
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                )),
                Line::from(format!(
                    "  {} txs | gas {:.1}% | {:.1}KB",
                    block.transaction_count,
                    block.gas_utilization,
                    block.size as f64 / 1024.0
                )),
            ]
        })
        .collect();

    let blocks = Block::default().borders(Borders::ALL).title("Recent Blocks");
    f.render_widget(Paragraph::new(lines).block(blocks), area);
}

fn render_footer(f: &mut Frame, area: Rect, view: &DashboardView<'_>) {
    let pacing = view.pacing;
    let (status, status_color) = match view.state.last_error() {
        Some(_) => ("Stale", Color::Red),
        None if pacing.is_processing => ("Playing", Color::Green),
        None => ("Idle", Color::Gray),
    };

    let mut spans = vec![
        Span::styled("Status: ", Style::default().fg(status_color)),
        Span::raw(status),
        Span::raw(" | "),
        Span::styled("Queue: ", Style::default().fg(Color::Cyan)),
        Span::raw(pacing.queue_length.to_string()),
        Span::raw(" | "),
        Span::styled("Delay: ", Style::default().fg(Color::Cyan)),
        Span::raw(format!("{}ms", pacing.last_delay_ms)),
        Span::raw(" | "),
        Span::styled("Rate: ", Style::default().fg(Color::Cyan)),
        Span::raw(format!("{:.1}/s", pacing.items_per_sec())),
        Span::raw(" | "),
        Span::styled("Latency: ", Style::default().fg(Color::Cyan)),
        Span::raw(format!("{:.0}ms", view.state.latency_ms())),
    ];

    if let Some(error) = view.state.last_error() {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(
            format!("Error: {}", error),
            Style::default().fg(Color::Red),
        ));
    }

    let footer = Block::default().borders(Borders::ALL).title("Playback");
    f.render_widget(Paragraph::new(Line::from(spans)).block(footer), area);
}

fn format_time(timestamp: DateTime<Utc>) -> String {
    timestamp.with_timezone(&Local).format("%H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::types::make_record;
    use ratatui::{backend::TestBackend, Terminal};

    #[test]
    fn test_layout_renders_records_and_pacing() {
        let backend = TestBackend::new(140, 30);
        let mut terminal = Terminal::new(backend).unwrap();

        let records = vec![make_record("0xabcdef0123456789", 77)];
        let mut state = DashboardState::new();
        state.record_error("timeout".to_string());
        let view = DashboardView {
            records: &records,
            pacing: PacingState {
                queue_length: 4,
                last_delay_ms: 180,
                is_processing: true,
            },
            state: &state,
        };

        terminal
            .draw(|f| {
                let area = f.area();
                render_layout(f, area, &view);
            })
            .unwrap();

        let buffer = terminal.backend().buffer();
        let text: String = buffer.content().iter().map(|cell| cell.symbol()).collect();
        assert!(text.contains("0xabcd...6789"));
        assert!(text.contains("Queue: 4"));
        assert!(text.contains("180ms"));
        assert!(text.contains("Error: timeout"));
    }
}
