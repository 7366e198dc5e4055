use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use super::list::{Candidate, FilterList, Match};
use super::state::{PickerState, Step};
use crate::core::project_name;
use crate::utils::path::shorten_path_for_display;
use crate::utils::tui_writer::LogLevel;

const TITLE: &str = "muxpick";
const HELP: &str = "↑/↓ move • type to filter • ctrl+u clear • enter select • esc quit";

/// Draw the current state. Reads nothing but `state`.
pub fn draw(f: &mut Frame, state: &PickerState) {
    if state.is_quitting() {
        return;
    }

    let area = f.area();
    if let Some(error) = state.error() {
        draw_error(f, area, error);
        return;
    }

    match state.step() {
        Step::LoadingProjects => draw_loading(f, area, state, "Searching for projects..."),
        Step::LoadingLayouts => draw_loading(f, area, state, "Loading layouts..."),
        Step::SelectProject => {
            draw_picker(f, area, state, &state.projects, &["Select a project".to_string()])
        }
        Step::SelectLayout => {
            let project = state
                .selected_project()
                .map(|p| {
                    format!(
                        "Project: {} ({})",
                        project_name(&p.to_string_lossy()),
                        shorten_path_for_display(p)
                    )
                })
                .unwrap_or_default();
            draw_picker(
                f,
                area,
                state,
                &state.layouts,
                &[project, "Select a layout".to_string()],
            )
        }
        Step::Done => {}
    }
}

fn title() -> Line<'static> {
    Line::from(Span::styled(
        TITLE,
        Style::default()
            .fg(Color::Magenta)
            .add_modifier(Modifier::BOLD),
    ))
}

fn draw_loading(f: &mut Frame, area: Rect, state: &PickerState, label: &str) {
    let lines = vec![
        title(),
        Line::from(""),
        Line::from(vec![
            Span::styled(state.spinner(), Style::default().fg(Color::Magenta)),
            Span::raw(" "),
            Span::raw(label.to_string()),
        ]),
    ];
    f.render_widget(Paragraph::new(lines), area);
}

fn draw_error(f: &mut Frame, area: Rect, error: &str) {
    let lines = vec![
        title(),
        Line::from(""),
        Line::from(Span::styled(
            format!("Error: {}", error),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
    ];
    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), area);
}

fn draw_picker<T: Candidate>(
    f: &mut Frame,
    area: Rect,
    state: &PickerState,
    list: &FilterList<T>,
    subtitles: &[String],
) {
    let header_height = subtitles.len() as u16 + 2;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(header_height), // Title + subtitles
            Constraint::Length(1),             // Filter input
            Constraint::Min(1),                // Candidates
            Constraint::Length(1),             // Count
            Constraint::Length(1),             // Notice
            Constraint::Length(1),             // Help
        ])
        .split(area);

    let mut header = vec![title(), Line::from("")];
    header.extend(subtitles.iter().map(|s| {
        Line::from(Span::styled(s.clone(), Style::default().fg(Color::Gray)))
    }));
    f.render_widget(Paragraph::new(header), chunks[0]);

    let filter = Line::from(vec![
        Span::styled("> ", Style::default().fg(Color::Magenta)),
        Span::raw(list.filter().to_string()),
        Span::styled("▏", Style::default().fg(Color::DarkGray)),
    ]);
    f.render_widget(Paragraph::new(filter), chunks[1]);

    let items: Vec<ListItem> = list
        .visible()
        .map(|(item, m)| ListItem::new(highlight(item.label(), m)))
        .collect();
    let candidates = List::new(items)
        .highlight_style(
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▶ ");
    let mut list_state = ListState::default();
    if list.visible_len() > 0 {
        list_state.select(Some(list.cursor()));
    }
    f.render_stateful_widget(candidates, chunks[2], &mut list_state);

    let count = if list.visible_len() == 0 && !list.items().is_empty() {
        "no matches".to_string()
    } else if list.items().is_empty() {
        "nothing found".to_string()
    } else {
        format!("{}/{}", list.visible_len(), list.items().len())
    };
    f.render_widget(
        Paragraph::new(Span::styled(count, Style::default().fg(Color::DarkGray))),
        chunks[3],
    );

    if let Some(notice) = state.notices().last() {
        let color = match notice.level {
            LogLevel::Error => Color::Red,
            _ => Color::Yellow,
        };
        f.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled(
                    format!("[{}] ", notice.timestamp.format("%H:%M:%S")),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(notice.message.clone(), Style::default().fg(color)),
            ])),
            chunks[4],
        );
    }

    f.render_widget(
        Paragraph::new(Span::styled(HELP, Style::default().fg(Color::DarkGray))),
        chunks[5],
    );
}

/// Label with fuzzy-matched characters emphasised
fn highlight(label: &str, m: &Match) -> Line<'static> {
    if m.indices.is_empty() {
        return Line::from(label.to_string());
    }

    let matched = Style::default()
        .fg(Color::Magenta)
        .add_modifier(Modifier::BOLD);
    let spans: Vec<Span<'static>> = label
        .chars()
        .enumerate()
        .map(|(i, c)| {
            if m.indices.contains(&i) {
                Span::styled(c.to_string(), matched)
            } else {
                Span::raw(c.to_string())
            }
        })
        .collect();
    Line::from(spans)
}
