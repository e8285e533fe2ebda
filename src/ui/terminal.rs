use std::io;
use std::sync::Arc;
use std::time::Duration;

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, List, ListItem, Paragraph, Wrap},
    Terminal,
};
use tokio::task::JoinHandle;

use crate::{
    core::{
        engine::{Engine, RunOutcome},
        error::OsintError,
        identifier::NormalizedIdentifier,
        state::OrchestrationState,
        types::{AnalysisReport, RiskLevel, Severity},
    },
    pipeline::reporter::write_export,
    ui::app::{App, Mode},
};

pub async fn run_console(engine: Arc<Engine>, mut app: App) -> Result<(), OsintError> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut run_task: Option<JoinHandle<RunOutcome>> = None;

    loop {
        let state = engine.snapshot();
        let recent = engine.recent();
        let logs = engine.log_lines();
        terminal.draw(|f| draw_ui(f, &app, &state, &recent, &logs))?;

        if event::poll(Duration::from_millis(200))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
                let alt = key.modifiers.contains(KeyModifiers::ALT);
                match key.code {
                    KeyCode::Char('c') if ctrl => break,
                    KeyCode::Char('w') if ctrl => {
                        if let Err(err) = engine.clear_recent() {
                            app.set_status(err.user_message());
                        }
                    }
                    KeyCode::Tab => app.toggle_mode(),
                    KeyCode::Enter if app.mode == Mode::Batch => app.newline(),
                    KeyCode::Enter | KeyCode::F(5) => {
                        if run_task.is_some() {
                            app.set_status("run already in flight");
                        } else {
                            let engine = engine.clone();
                            let input = app.input.clone();
                            let mode = app.mode;
                            run_task = Some(tokio::spawn(async move {
                                match mode {
                                    Mode::Single => engine.run_single(&input).await,
                                    Mode::Batch => engine.run_batch(&input).await,
                                }
                            }));
                        }
                    }
                    KeyCode::F(4) => {
                        if run_task.is_none() {
                            if let Some(id) = recent.get(app.selected_recent) {
                                app.input = id.to_string();
                                let engine = engine.clone();
                                let index = app.selected_recent;
                                run_task = Some(tokio::spawn(async move {
                                    engine.select_recent(index).await
                                }));
                            }
                        }
                    }
                    KeyCode::Esc => {
                        if engine.reset() {
                            app.clear_input();
                        }
                    }
                    KeyCode::F(2) => export(&engine, &mut app, ExportKind::Json),
                    KeyCode::F(3) => export(&engine, &mut app, ExportKind::Csv),
                    KeyCode::Up => app.select_prev_recent(recent.len()),
                    KeyCode::Down => app.select_next_recent(recent.len()),
                    KeyCode::PageDown => engine.next_page(),
                    KeyCode::PageUp => engine.prev_page(),
                    KeyCode::Backspace => app.backspace(),
                    KeyCode::Char(c @ '1'..='5') if alt => {
                        let row = c as usize - '1' as usize;
                        let focused = state
                            .page_row_index(row)
                            .is_some_and(|index| engine.focus_result(index));
                        if !focused {
                            app.set_status(format!("no batch row {c} on this page"));
                        }
                    }
                    KeyCode::Char(c) => app.push_char(c),
                    _ => {}
                }
            }
        }

        if let Some(handle) = run_task.take() {
            if handle.is_finished() {
                match handle.await {
                    Ok(RunOutcome::Busy) => app.set_status("run already in flight"),
                    Ok(_) => app.status = None,
                    Err(join_err) => app.set_status(format!("run aborted: {join_err}")),
                }
            } else {
                run_task = Some(handle);
            }
        }
    }

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}

enum ExportKind {
    Json,
    Csv,
}

fn export(engine: &Engine, app: &mut App, kind: ExportKind) {
    let file = match kind {
        ExportKind::Json => match engine.export_structured() {
            Ok(file) => file,
            Err(err) => {
                app.set_status(format!("export failed: {err}"));
                return;
            }
        },
        ExportKind::Csv => engine.export_tabular(),
    };
    let Some(file) = file else {
        app.set_status("nothing to export");
        return;
    };
    match write_export(&file, &app.export_dir) {
        Ok(path) => app.set_status(format!("saved {}", path.display())),
        Err(err) => app.set_status(format!("export failed: {err}")),
    }
}

fn draw_ui(
    f: &mut ratatui::Frame,
    app: &App,
    state: &OrchestrationState,
    recent: &[NormalizedIdentifier],
    logs: &[String],
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(10), Constraint::Length(1)].as_ref())
        .split(f.size());

    let accent = match app.mode {
        Mode::Single => Color::LightRed,
        Mode::Batch => Color::Cyan,
    };

    let title = Paragraph::new(Line::from(vec![
        Span::styled(
            " BHARAT-OSINT ",
            Style::default().fg(accent).add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("v{} ", env!("CARGO_PKG_VERSION")), Style::default().fg(Color::Yellow)),
        Span::raw("| "),
        Span::styled(app.mode.to_string(), Style::default().fg(accent)),
        Span::raw(" | "),
        Span::styled(
            app.trigger_label(state.in_flight()),
            Style::default().fg(Color::White),
        ),
    ]))
    .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(accent)));
    f.render_widget(title, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)].as_ref())
        .split(chunks[1]);

    draw_command_column(f, body[0], app, state, recent, accent);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(6), Constraint::Length(12)].as_ref())
        .split(body[1]);
    draw_results(f, right[0], state);

    let log_items: Vec<ListItem> = logs
        .iter()
        .map(|line| {
            ListItem::new(Line::from(vec![
                Span::styled("●", Style::default().fg(Color::Green)),
                Span::raw(" "),
                Span::raw(line.as_str()),
            ]))
        })
        .collect();
    let log_list = List::new(log_items)
        .block(Block::default().title(" SYSTEM LOG ").borders(Borders::ALL));
    f.render_widget(log_list, right[1]);

    let help = Paragraph::new(
        "TAB mode | ENTER/F5 run | ESC reset | ↑↓ F4 recall | F2 json F3 csv | PgUp/PgDn page | Alt+1-5 open row | ^W wipe | ^C quit",
    )
    .style(Style::default().fg(Color::DarkGray));
    f.render_widget(help, chunks[2]);
}

fn draw_command_column(
    f: &mut ratatui::Frame,
    area: Rect,
    app: &App,
    state: &OrchestrationState,
    recent: &[NormalizedIdentifier],
    accent: Color,
) {
    let input_height = match app.mode {
        Mode::Single => 3,
        Mode::Batch => 8,
    };
    let column = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(input_height),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(4),
            ]
            .as_ref(),
        )
        .split(area);

    let input = Paragraph::new(app.input.as_str())
        .style(Style::default().fg(accent))
        .wrap(Wrap { trim: false })
        .block(Block::default().title(app.input_title()).borders(Borders::ALL));
    f.render_widget(input, column[0]);

    let (notice, color) = match (state.error(), app.status.as_deref()) {
        (Some(err), _) => (format!("> CRITICAL_ERROR: {err}"), Color::Red),
        (None, Some(status)) => (status.to_string(), Color::Yellow),
        (None, None) => ("awaiting target".to_string(), Color::DarkGray),
    };
    let notice = Paragraph::new(notice)
        .style(Style::default().fg(color))
        .wrap(Wrap { trim: true })
        .block(Block::default().title(" STATUS ").borders(Borders::ALL));
    f.render_widget(notice, column[1]);

    let gauge = Gauge::default()
        .block(Block::default().title(" BATCH PROGRESS ").borders(Borders::ALL))
        .gauge_style(Style::default().fg(Color::Cyan))
        .percent(u16::from(state.progress()));
    f.render_widget(gauge, column[2]);

    let recent_items: Vec<ListItem> = recent
        .iter()
        .enumerate()
        .map(|(i, id)| {
            let style = if i == app.selected_recent {
                Style::default().fg(Color::Black).bg(accent)
            } else {
                Style::default().fg(Color::Gray)
            };
            ListItem::new(Line::from(Span::styled(id.to_string(), style)))
        })
        .collect();
    let recent_list = List::new(recent_items)
        .block(Block::default().title(" CACHED_SIGNALS ").borders(Borders::ALL));
    f.render_widget(recent_list, column[3]);
}

fn draw_results(f: &mut ratatui::Frame, area: Rect, state: &OrchestrationState) {
    let mut lines: Vec<Line> = Vec::new();
    let title = if let Some(batch) = state.batch() {
        if batch.is_empty() {
            lines.push(Line::from(Span::styled(
                "No reports: every candidate was invalid or unreachable.",
                Style::default().fg(Color::DarkGray),
            )));
        }
        for (row, report) in state.current_page().iter().enumerate() {
            lines.push(Line::from(vec![
                Span::styled(format!("{}) ", row + 1), Style::default().fg(Color::DarkGray)),
                Span::styled(
                    format!("{:<16}", report.identifier),
                    Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
                ),
                Span::raw(format!(" {} / {} ", report.operator, report.circle)),
                risk_span(report.risk_level),
                Span::styled(
                    format!(" {}%", report.confidence_score),
                    Style::default().fg(Color::Cyan),
                ),
            ]));
        }
        format!(
            " BATCH RESULTS ({}) PAGE {}/{} ",
            batch.len(),
            state.page() + 1,
            state.page_count().max(1)
        )
    } else if let Some(report) = state.report() {
        report_lines(report, &mut lines);
        " INTEL REPORT ".to_string()
    } else {
        lines.push(Line::from(Span::styled(
            if state.in_flight() {
                "Scan in progress..."
            } else {
                "No data. Enter a number and run a probe."
            },
            Style::default().fg(Color::DarkGray),
        )));
        " INTEL REPORT ".to_string()
    };

    let results = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().title(title).borders(Borders::ALL));
    f.render_widget(results, area);
}

fn report_lines(report: &AnalysisReport, lines: &mut Vec<Line<'static>>) {
    let field = |label: &str, value: String| {
        Line::from(vec![
            Span::styled(format!("{label:<12}"), Style::default().fg(Color::Gray)),
            Span::styled(value, Style::default().fg(Color::White)),
        ])
    };
    lines.push(field("Target", report.identifier.clone()));
    lines.push(field("Country", report.country.clone()));
    lines.push(field("Operator", report.operator.clone()));
    lines.push(field("Circle", report.circle.clone()));
    lines.push(Line::from(vec![
        Span::styled(format!("{:<12}", "Risk"), Style::default().fg(Color::Gray)),
        risk_span(report.risk_level),
        Span::styled(
            format!("  confidence {}%", report.confidence_score),
            Style::default().fg(Color::Cyan),
        ),
    ]));
    lines.push(field("Connection", report.metadata.connection_type.clone()));
    lines.push(field("DND", if report.metadata.is_dnd { "blocked" } else { "open" }.to_string()));
    lines.push(field("Owner", report.metadata.potential_owner_type.clone()));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!("FINDINGS ({})", report.findings.len()),
        Style::default().add_modifier(Modifier::BOLD),
    )));
    for finding in &report.findings {
        let color = match finding.severity {
            Severity::Info => Color::Gray,
            Severity::Warning => Color::Yellow,
            Severity::Alert => Color::Red,
        };
        lines.push(Line::from(vec![
            Span::styled(format!("[{}] ", finding.severity), Style::default().fg(color)),
            Span::styled(finding.source.clone(), Style::default().fg(Color::Cyan)),
            Span::raw(format!(" {} ", finding.timestamp)),
            Span::raw(finding.summary.clone()),
        ]));
    }
}

fn risk_span(level: RiskLevel) -> Span<'static> {
    let color = match level {
        RiskLevel::Low => Color::Green,
        RiskLevel::Medium => Color::Yellow,
        RiskLevel::High => Color::LightRed,
        RiskLevel::Critical => Color::Red,
    };
    Span::styled(
        level.as_str(),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )
}
