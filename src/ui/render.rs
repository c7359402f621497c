use super::navigation::{Button, Focus, PromptPurpose, Zone, ALL_BUTTONS};
use super::session::{Session, Status};
use crate::rows::{self, Row};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, Padding, Paragraph};
use ratatui::Frame;

pub const MIN_WIDTH: u16 = 60;
pub const MIN_HEIGHT: u16 = 18;

const TITLE_HEIGHT: u16 = 4;
const BUTTONS_HEIGHT: u16 = 3;
const FOOTER_HEIGHT: u16 = 4;

/// Rows of the list panel that fit in a terminal of `terminal_height` lines.
pub fn list_viewport_height(terminal_height: u16) -> usize {
    terminal_height
        .saturating_sub(TITLE_HEIGHT + BUTTONS_HEIGHT + FOOTER_HEIGHT + 2)
        .max(1) as usize
}

pub fn fits_terminal(width: u16, height: u16) -> bool {
    width >= MIN_WIDTH && height >= MIN_HEIGHT
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Header,
    Normal,
    Checked,
    Cursor,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowLine {
    pub text: String,
    pub tone: Tone,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptView {
    pub title: &'static str,
    pub label: &'static str,
    pub buffer: String,
    pub input: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenView {
    pub title: String,
    pub policy_line: String,
    pub list_title: String,
    pub lines: Vec<RowLine>,
    pub buttons: Vec<(&'static str, bool)>,
    pub hint: &'static str,
    pub status: Option<Status>,
    pub prompt: Option<PromptView>,
}

fn row_text(session: &Session<'_>, row: &Row) -> String {
    match row {
        Row::Header { name } => format!("  {name}"),
        Row::Feature { feature, checked } => {
            let mark = if *checked { "x" } else { " " };
            let name = session
                .catalog()
                .feature(*feature)
                .map(|feature| feature.display_name)
                .unwrap_or("?");
            format!("    [{mark}] {name}")
        }
        Row::DnsMode { mode } => format!("    DNS over HTTPS:  < {mode} >"),
        Row::DnsTemplate { template_url, .. } => {
            if template_url.is_empty() {
                "    Template URL:    (not set, Enter to edit)".to_string()
            } else {
                format!("    Template URL:    {template_url}")
            }
        }
    }
}

pub fn project_view(session: &Session<'_>) -> ScreenView {
    let nav = session.nav();
    let all_rows = session.rows();
    let visible = rows::visible_len(all_rows);
    let start = nav.scroll_offset.min(visible);
    let end = (start + nav.viewport_height).min(visible);
    let list_focused = matches!(nav.focus, Focus::Listing);

    let lines = all_rows[start..end]
        .iter()
        .enumerate()
        .map(|(offset, row)| {
            let idx = start + offset;
            let tone = if list_focused && idx == nav.cursor_row {
                Tone::Cursor
            } else {
                match row {
                    Row::Header { .. } => Tone::Header,
                    Row::Feature { checked: true, .. } => Tone::Checked,
                    Row::Feature { .. } | Row::DnsMode { .. } | Row::DnsTemplate { .. } => {
                        Tone::Normal
                    }
                }
            };
            RowLine {
                text: row_text(session, row),
                tone,
            }
        })
        .collect();

    let more_above = if start > 0 { " ^^^" } else { "" };
    let more_below = if end < visible { " vvv" } else { "" };
    let list_title = format!(
        " Policies {}/{} enabled{more_above}{more_below} ",
        rows::checked_count(all_rows),
        session.catalog().feature_count()
    );

    let title = if session.install_method().is_empty() {
        " SlimBrave - Brave Browser Debloater ".to_string()
    } else {
        format!(
            " SlimBrave - Brave Browser Debloater [{}] ",
            session.install_method()
        )
    };

    let buttons_focused = nav.zone() == Zone::ButtonBar && nav.prompt().is_none();
    let buttons = ALL_BUTTONS
        .iter()
        .map(|button: &Button| (button.label(), buttons_focused && *button == nav.button))
        .collect();

    let prompt = nav.prompt().map(|prompt| PromptView {
        title: prompt.purpose.title(),
        label: prompt.purpose.label(),
        buffer: prompt.buffer.clone(),
        input: prompt.purpose.takes_input(),
    });

    ScreenView {
        title,
        policy_line: format!("Policy file: {}", session.policy_path().display()),
        list_title,
        lines,
        buttons,
        hint: nav.hint_text(),
        status: session.status().cloned(),
        prompt,
    }
}

fn tone_style(tone: Tone) -> Style {
    match tone {
        Tone::Header => Style::default()
            .fg(Color::LightRed)
            .add_modifier(Modifier::BOLD),
        Tone::Normal => Style::default().fg(Color::White),
        Tone::Checked => Style::default().fg(Color::Green),
        Tone::Cursor => Style::default()
            .fg(Color::Black)
            .bg(Color::White)
            .add_modifier(Modifier::BOLD),
    }
}

pub fn draw(frame: &mut Frame<'_>, view: &ScreenView) {
    let area = frame.area();
    if !fits_terminal(area.width, area.height) {
        frame.render_widget(
            Paragraph::new(format!(
                "Terminal too small: need at least {MIN_WIDTH}x{MIN_HEIGHT}."
            )),
            area,
        );
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(TITLE_HEIGHT),
            Constraint::Min(3),
            Constraint::Length(BUTTONS_HEIGHT),
            Constraint::Length(FOOTER_HEIGHT),
        ])
        .split(area);

    let header = Paragraph::new(vec![
        Line::from(Span::styled(
            view.title.clone(),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(view.policy_line.clone()),
    ])
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(header, chunks[0]);

    let items = view
        .lines
        .iter()
        .map(|line| ListItem::new(Line::from(line.text.clone())).style(tone_style(line.tone)))
        .collect::<Vec<_>>();
    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(view.list_title.clone()),
    );
    frame.render_widget(list, chunks[1]);

    let mut spans = Vec::with_capacity(view.buttons.len() * 2);
    for (label, active) in &view.buttons {
        let style = if *active {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        spans.push(Span::styled(format!(" {label} "), style));
        spans.push(Span::raw("   "));
    }
    frame.render_widget(
        Paragraph::new(Line::from(spans))
            .block(Block::default().borders(Borders::ALL).padding(Padding::horizontal(1))),
        chunks[2],
    );

    let status_line = match &view.status {
        Some(status) => Line::from(Span::styled(
            format!("Status: {}", status.message),
            Style::default().fg(if status.ok { Color::Green } else { Color::Red }),
        )),
        None => Line::from("Status: ready"),
    };
    let footer = Paragraph::new(vec![Line::from(view.hint), status_line])
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(footer, chunks[3]);

    if let Some(prompt) = &view.prompt {
        draw_prompt(frame, prompt);
    }
}

fn draw_prompt(frame: &mut Frame<'_>, prompt: &PromptView) {
    let area = centered_rect(70, 30, frame.area());
    frame.render_widget(Clear, area);
    let block = Block::default()
        .borders(Borders::ALL)
        .padding(Padding::new(2, 2, 1, 1));
    frame.render_widget(block.clone(), area);
    let inner = block.inner(area);
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(inner);
    let max_input_width = rows[2].width.saturating_sub(2) as usize;
    let display_value = tail_for_display(&prompt.buffer, max_input_width);

    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            prompt.title,
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ))),
        rows[0],
    );
    frame.render_widget(Paragraph::new(prompt.label), rows[1]);
    if !prompt.input {
        frame.render_widget(Paragraph::new("Enter confirm, other key cancel"), rows[3]);
        return;
    }
    frame.render_widget(
        Paragraph::new(Line::from(format!("> {display_value}"))),
        rows[2],
    );
    frame.render_widget(Paragraph::new("Enter confirm, Esc cancel"), rows[3]);
    frame.set_cursor_position((
        rows[2].x + 2 + display_value.chars().count() as u16,
        rows[2].y,
    ));
}

fn tail_for_display(value: &str, max_chars: usize) -> String {
    if max_chars == 0 {
        return String::new();
    }
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= max_chars {
        return value.to_string();
    }
    chars[chars.len() - max_chars..].iter().collect()
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
