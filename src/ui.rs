use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, Paragraph, Wrap},
};

use crate::app::{App, Focus, InputMode, TextField};
use crate::result::ScoreResult;
use crate::view::{score_cards, ScoreCard, NO_SKILLS_PLACEHOLDER};

const SCORE_CARD_HEIGHT: u16 = 5;

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(frame, header_area);

    let error_height = app
        .upload
        .error_message
        .as_deref()
        .map(|msg| error_box_height(msg, body_area.width))
        .unwrap_or(0);

    let [file_area, role_area, button_area, error_area, results_area] = Layout::vertical([
        Constraint::Length(4),
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Length(error_height),
        Constraint::Min(0),
    ])
    .areas(body_area);

    render_file_field(app, frame, file_area);
    render_role_field(app, frame, role_area);
    render_analyze_button(app, frame, button_area);

    if let Some(message) = &app.upload.error_message {
        render_error(message, frame, error_area);
    }

    app.results_area = None;
    if let Some(result) = &app.upload.result {
        let max_scroll = render_results(result, app.show_debug, app.results_scroll, frame, results_area);
        app.results_max_scroll = max_scroll;
        app.results_scroll = app.results_scroll.min(max_scroll);
        app.results_area = Some(results_area);
    }

    render_footer(app, frame, footer_area);

    if app.show_picker {
        render_picker(app, frame, area);
    }
}

fn render_header(frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(" Resume Scorer ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(
            "ATS score, role match & skills ",
            Style::default().fg(Color::Gray),
        ),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::Black));
    frame.render_widget(header, area);
}

fn field_border(app: &App, focus: Focus) -> Style {
    if app.focus != focus {
        Style::default().fg(Color::DarkGray)
    } else if app.input_mode == InputMode::Editing {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::Cyan)
    }
}

fn render_file_field(app: &App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(field_border(app, Focus::File))
        .title(" Resume PDF (Enter to type a path, o to browse) ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [input_area, selected_area] =
        Layout::vertical([Constraint::Length(1), Constraint::Length(1)]).areas(inner);
    render_text_input(app, frame, &app.path_input, Focus::File, input_area);

    let selected = match &app.upload.selected_file {
        Some(file) => Line::from(vec![
            Span::styled("Selected: ", Style::default().fg(Color::DarkGray)),
            Span::raw(file.file_name.clone()),
        ]),
        None => Line::from(Span::styled(
            "No file selected",
            Style::default().fg(Color::DarkGray),
        )),
    };
    frame.render_widget(Paragraph::new(selected), selected_area);
}

fn render_role_field(app: &App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(field_border(app, Focus::Role))
        .title(" Target Role ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    render_text_input(app, frame, &app.role_input, Focus::Role, inner);
}

/// One-line input with horizontal scrolling that keeps the cursor visible.
fn render_text_input(app: &App, frame: &mut Frame, field: &TextField, focus: Focus, area: Rect) {
    let inner_width = area.width as usize;
    let cursor_pos = field.cursor;

    let scroll_offset = if inner_width == 0 || cursor_pos < inner_width {
        0
    } else {
        cursor_pos - inner_width + 1
    };

    let visible_text: String = field
        .value
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let input = Paragraph::new(visible_text).style(Style::default().fg(Color::Cyan));
    frame.render_widget(input, area);

    if app.input_mode == InputMode::Editing && app.focus == focus {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((area.x + cursor_x, area.y));
    }
}

fn render_analyze_button(app: &App, frame: &mut Frame, area: Rect) {
    let [button_area, _] =
        Layout::horizontal([Constraint::Length(30), Constraint::Min(0)]).areas(area);

    let focused = app.focus == Focus::Analyze;
    let (label, style) = if app.upload.is_loading {
        let dots = ".".repeat((app.animation_frame as usize) + 1);
        (
            format!("Analyzing{:<3}", dots),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )
    } else if focused {
        (
            "Analyze Resume".to_string(),
            Style::default()
                .bg(Color::Cyan)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        (
            "Analyze Resume".to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        )
    };

    let border_color = if focused { Color::Cyan } else { Color::DarkGray };
    let button = Paragraph::new(label)
        .alignment(Alignment::Center)
        .style(style)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border_color)),
        );
    frame.render_widget(button, button_area);
}

fn error_box_height(message: &str, width: u16) -> u16 {
    let inner_width = width.saturating_sub(2).max(1) as usize;
    let text_len = "Error: ".len() + message.chars().count();
    let lines = text_len.div_ceil(inner_width).max(1) as u16;
    lines.min(4) + 2
}

fn render_error(message: &str, frame: &mut Frame, area: Rect) {
    let text = Line::from(vec![
        Span::styled("Error: ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(message.to_string()),
    ]);

    let error = Paragraph::new(text)
        .style(Style::default().fg(Color::LightRed))
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        );
    frame.render_widget(error, area);
}

/// Returns how far the details panel can scroll before it runs out of text.
fn render_results(result: &ScoreResult, show_debug: bool, scroll: u16, frame: &mut Frame, area: Rect) -> u16 {
    let [cards_area, details_area] =
        Layout::vertical([Constraint::Length(SCORE_CARD_HEIGHT), Constraint::Min(0)]).areas(area);

    let card_areas: [Rect; 2] =
        Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(cards_area);
    for (card, card_area) in score_cards(result).iter().zip(card_areas) {
        render_score_card(card, frame, card_area);
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Detected Skills ");
    let inner = block.inner(details_area);
    frame.render_widget(block, details_area);

    let details = Paragraph::new(details_text(result, show_debug)).wrap(Wrap { trim: false });
    let content_height = u16::try_from(details.line_count(inner.width)).unwrap_or(u16::MAX);
    let max_scroll = content_height.saturating_sub(inner.height);

    frame.render_widget(details.scroll((scroll.min(max_scroll), 0)), inner);
    max_scroll
}

fn render_score_card(card: &ScoreCard, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(format!(" {} ", card.title));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [label_area, _, bar_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(inner);

    let label = Paragraph::new(card.label()).style(Style::default().add_modifier(Modifier::BOLD));
    frame.render_widget(label, label_area);

    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(Color::Green).bg(Color::Black))
        .percent(card.percent());
    frame.render_widget(gauge, bar_area);
}

/// Skills, optional insights and the debug JSON section, as one scrollable text.
fn details_text(result: &ScoreResult, show_debug: bool) -> Text<'static> {
    let heading = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let muted = Style::default().fg(Color::DarkGray);
    let mut lines: Vec<Line<'static>> = Vec::new();

    if result.detected_skills.is_empty() {
        lines.push(Line::from(Span::styled(NO_SKILLS_PLACEHOLDER, muted)));
    } else {
        let chip = Style::default().bg(Color::DarkGray).fg(Color::White);
        let mut spans = Vec::new();
        for skill in &result.detected_skills {
            spans.push(Span::styled(format!(" {} ", skill), chip));
            spans.push(Span::raw(" "));
        }
        lines.push(Line::from(spans));
    }

    if result.has_insights() {
        lines.push(Line::default());
        if let Some(verdict) = &result.final_verdict {
            lines.push(Line::from(vec![
                Span::styled("Verdict: ", heading),
                Span::raw(verdict.clone()),
            ]));
        }
        push_bullets(&mut lines, "Strengths", &result.strengths, heading);
        push_bullets(&mut lines, "Missing Skills", &result.missing_skills, heading);
        push_bullets(&mut lines, "Critical Improvements", &result.critical_improvements, heading);

        if !result.section_feedback.is_empty() {
            lines.push(Line::from(Span::styled("Section Feedback", heading)));
            for feedback in &result.section_feedback {
                let score = feedback
                    .score
                    .as_ref()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "--".to_string());
                lines.push(Line::from(vec![
                    Span::raw(format!("  {} ", feedback.section)),
                    Span::styled(format!("({})", score), muted),
                ]));
                for comment in &feedback.comments {
                    lines.push(Line::from(format!("    - {}", comment)));
                }
            }
        }
    }

    lines.push(Line::default());
    if show_debug {
        lines.push(Line::from(Span::styled("▾ Debug JSON (d to collapse)", muted)));
        for json_line in result.to_pretty_json().lines() {
            lines.push(Line::from(Span::styled(
                json_line.to_string(),
                Style::default().fg(Color::Gray),
            )));
        }
    } else {
        lines.push(Line::from(Span::styled("▸ Debug JSON (d to expand)", muted)));
    }

    Text::from(lines)
}

fn push_bullets(lines: &mut Vec<Line<'static>>, title: &str, items: &[String], heading: Style) {
    if items.is_empty() {
        return;
    }
    lines.push(Line::from(Span::styled(title.to_string(), heading)));
    for item in items {
        lines.push(Line::from(format!("  - {}", item)));
    }
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };
    let mode_text = match app.input_mode {
        InputMode::Normal => " NORMAL ",
        InputMode::Editing => " EDIT ",
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let hints: &[(&str, &str)] = match (app.show_picker, app.input_mode) {
        (true, _) => &[(" j/k ", " nav "), (" Enter ", " select "), (" Esc ", " close ")],
        (false, InputMode::Editing) => &[(" Enter ", " done "), (" Tab ", " next "), (" Esc ", " cancel ")],
        (false, InputMode::Normal) => &[
            (" Tab ", " focus "),
            (" Enter ", " edit "),
            (" o ", " browse "),
            (" a ", " analyze "),
            (" d ", " debug "),
            (" q ", " quit "),
        ],
    };

    let mut spans = vec![Span::styled(mode_text, mode_style), Span::raw(" ")];
    for (key, label) in hints {
        spans.push(Span::styled(*key, key_style));
        spans.push(Span::styled(*label, label_style));
    }
    spans.push(Span::styled(
        format!("  API used: {}", app.api_base_url()),
        Style::default().fg(Color::DarkGray),
    ));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_picker(app: &mut App, frame: &mut Frame, area: Rect) {
    // Calculate popup size and position (centered)
    let popup_width = 60.min(area.width.saturating_sub(4));
    let rows = app.picker_entries.len().max(1) as u16;
    let popup_height = (rows + 2).min(area.height.saturating_sub(4));

    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;

    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

    // Clear the area behind the popup
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(format!(" PDFs in {} ", app.picker_dir.display()));

    if app.picker_entries.is_empty() {
        let empty = Paragraph::new("No PDF files found")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, popup_area);
        return;
    }

    let selected_name = app.upload.selected_file.as_ref().map(|f| f.file_name.as_str());
    let items: Vec<ListItem> = app
        .picker_entries
        .iter()
        .map(|path| {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let style = if Some(name.as_str()) == selected_name {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(format!(" {} ", name)).style(style)
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, popup_area, &mut app.picker_state);
}
