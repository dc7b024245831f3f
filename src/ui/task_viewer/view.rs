use chrono::{DateTime, Local, Utc};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::model::{Category, Task, TaskStatus};

use super::app::{AppState, DeleteConfirmState, StatusKind};
use super::picker::{ProjectPicker, SearchPrompt};

const HELP_KEY_WIDTH: usize = 14;
const COLOR_TEXT: Color = Color::Rgb(234, 236, 239);
const COLOR_MUTED: Color = Color::Rgb(160, 165, 172);
const COLOR_MUTED_DARK: Color = Color::Rgb(118, 124, 130);
const COLOR_INFO: Color = Color::Rgb(116, 198, 219);
const COLOR_WARNING: Color = Color::Rgb(244, 200, 98);
const COLOR_ERROR: Color = Color::Rgb(255, 107, 107);
const COLOR_SUCCESS: Color = Color::Rgb(126, 210, 146);
const COLOR_ACCENT: Color = Color::Rgb(122, 170, 255);
const COLOR_BORDER_LIST: Color = Color::Rgb(92, 126, 166);
const COLOR_BORDER_DETAIL: Color = Color::Rgb(180, 156, 92);

pub fn render(frame: &mut Frame, app: &AppState) {
    let area = frame.size();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(area);
    let header = chunks[0];
    let main = chunks[1];
    let footer = chunks[2];

    render_header(frame, app, header);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)].as_ref())
        .split(main);
    render_list(frame, app, columns[0]);
    render_detail(frame, app, columns[1]);

    render_footer(frame, app, footer);

    if let Some(picker) = app.project_picker.as_ref() {
        render_project_modal(frame, area, picker);
    }
    if let Some(prompt) = app.search_prompt.as_ref() {
        render_search_modal(frame, area, prompt);
    }
    if let Some(state) = app.delete_confirm.as_ref() {
        render_delete_confirm_modal(frame, area, state);
    }
}

fn render_header(frame: &mut Frame, app: &AppState, area: Rect) {
    let mut spans = vec![
        Span::styled(
            "lina",
            Style::default()
                .fg(COLOR_ACCENT)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled("  filter: ", Style::default().fg(COLOR_MUTED_DARK)),
        Span::styled(app.filter.describe(), Style::default().fg(COLOR_INFO)),
    ];
    if let Some(project) = app.current_project.as_ref() {
        spans.push(Span::styled("  repo: ", Style::default().fg(COLOR_MUTED_DARK)));
        spans.push(Span::styled(project.clone(), Style::default().fg(COLOR_SUCCESS)));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_list(frame: &mut Frame, app: &AppState, area: Rect) {
    let mut lines = Vec::new();
    let content_width = area.width.saturating_sub(2) as usize;
    let help_lines = if app.show_help {
        build_help_lines(content_width)
    } else {
        Vec::new()
    };
    let help_reserved = if help_lines.is_empty() {
        0
    } else {
        help_lines.len() + 1
    };

    if app.filtered.is_empty() {
        if app.tasks.is_empty() {
            lines.push(Line::from("No tasks"));
        } else {
            lines.push(Line::from("No matches"));
        }
    } else {
        let list_height = area
            .height
            .saturating_sub(2)
            .saturating_sub(help_reserved as u16) as usize;
        let selected_pos = app
            .selected
            .and_then(|idx| app.filtered.iter().position(|candidate| *candidate == idx));
        let (start, end) = list_window(app.filtered.len(), selected_pos, list_height);
        for idx in &app.filtered[start..end] {
            if let Some(task) = app.tasks.get(*idx) {
                lines.push(render_list_row(task, app.selected == Some(*idx), content_width));
            }
        }
    }

    if !help_lines.is_empty() {
        lines.push(Line::from(""));
        lines.extend(help_lines);
    }

    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Tasks")
            .border_style(Style::default().fg(COLOR_BORDER_LIST)),
    );
    frame.render_widget(widget, area);
}

fn render_detail(frame: &mut Frame, app: &AppState, area: Rect) {
    let content = match app.selected_task() {
        Some(task) => build_detail_lines(task),
        None => vec![Line::from(Span::styled(
            "No task selected",
            Style::default().fg(COLOR_MUTED_DARK),
        ))],
    };
    let widget = Paragraph::new(content)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Details")
                .border_style(Style::default().fg(COLOR_BORDER_DETAIL)),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(widget, area);
}

fn render_footer(frame: &mut Frame, app: &AppState, area: Rect) {
    let hint = app.footer_hint();
    let hint_span = Span::styled(hint, Style::default().fg(COLOR_INFO));
    let line = if let Some((status, kind)) = app.status_line() {
        let status_style = match kind {
            StatusKind::Error => Style::default()
                .fg(COLOR_ERROR)
                .add_modifier(Modifier::BOLD),
            StatusKind::Info => Style::default().fg(COLOR_WARNING),
        };
        Line::from(vec![
            hint_span,
            Span::raw("  |  "),
            Span::styled(status, status_style),
        ])
    } else {
        Line::from(hint_span)
    };
    let counts_line = Line::from(Span::styled(
        app.task_count_summary(),
        Style::default().fg(COLOR_ACCENT),
    ));
    let widget = Paragraph::new(vec![line, counts_line])
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::TOP)
                .border_style(Style::default().fg(COLOR_BORDER_LIST)),
        );
    frame.render_widget(widget, area);
}

fn render_project_modal(frame: &mut Frame, area: Rect, picker: &ProjectPicker) {
    let content_width = area.width.saturating_sub(6).min(48);
    let max_height = (picker.options().len() as u16 + 4).min(area.height.saturating_sub(4));
    let list_height = max_height.saturating_sub(4) as usize;
    let modal = centered_rect(content_width, max_height, area);
    frame.render_widget(Clear, modal);

    let title_width = (content_width as usize).saturating_sub(4);
    let mut lines: Vec<Line<'static>> = Vec::new();
    let selected = Some(picker.selected_index());
    let (start, end) = list_window(picker.options().len(), selected, list_height.max(1));
    for (pos, project) in picker.options().iter().enumerate().take(end).skip(start) {
        let mut span = Span::styled(
            truncate_text(project, title_width),
            Style::default().fg(COLOR_TEXT),
        );
        if selected == Some(pos) {
            span.style = span.style.add_modifier(Modifier::REVERSED);
        }
        lines.push(Line::from(span));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "enter apply  esc cancel",
        Style::default().fg(COLOR_MUTED_DARK),
    )));

    let widget = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Project"))
        .wrap(Wrap { trim: true });
    frame.render_widget(widget, modal);
}

fn render_search_modal(frame: &mut Frame, area: Rect, prompt: &SearchPrompt) {
    let content_width = area.width.saturating_sub(8).min(56);
    let modal = centered_rect(content_width, 5, area);
    frame.render_widget(Clear, modal);

    let lines = vec![
        Line::from(vec![
            Span::styled("search: ", Style::default().fg(COLOR_MUTED_DARK)),
            Span::styled(format!("{}_", prompt.value()), Style::default().fg(COLOR_INFO)),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "enter apply  esc cancel",
            Style::default().fg(COLOR_MUTED_DARK),
        )),
    ];
    let widget = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Search"));
    frame.render_widget(widget, modal);
}

fn render_delete_confirm_modal(frame: &mut Frame, area: Rect, state: &DeleteConfirmState) {
    let content_width = area.width.saturating_sub(8).min(64);
    let height = 8u16.min(area.height.saturating_sub(4).max(6));
    let modal = centered_rect(content_width, height, area);
    frame.render_widget(Clear, modal);

    let title_width = (content_width as usize).saturating_sub(10);
    let lines = vec![
        Line::from(Span::styled(
            "Delete task?",
            Style::default()
                .fg(COLOR_ERROR)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("Title: ", Style::default().fg(COLOR_MUTED_DARK)),
            Span::styled(
                truncate_text(&state.title, title_width),
                Style::default().fg(COLOR_TEXT),
            ),
        ]),
        Line::from(vec![
            Span::styled("ID: ", Style::default().fg(COLOR_MUTED_DARK)),
            Span::styled(state.task_id.clone(), Style::default().fg(COLOR_MUTED)),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "y/enter confirm  esc/n cancel",
            Style::default().fg(COLOR_MUTED_DARK),
        )),
    ];

    let widget = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Delete Task"))
        .wrap(Wrap { trim: true });
    frame.render_widget(widget, modal);
}

fn build_help_lines(width: usize) -> Vec<Line<'static>> {
    vec![
        help_header("Keys"),
        help_line("j/k or up/down", "move selection", width),
        help_line("home/G", "first or last task", width),
        help_line("c", "complete task", width),
        help_line("u", "mark task pending", width),
        help_line("d", "delete task", width),
        help_line("a", "show all tasks", width),
        help_line("p", "pending tasks only", width),
        help_line("g", "general tasks", width),
        help_line("o", "office tasks", width),
        help_line("r", "current repository project", width),
        help_line("s", "pick a project", width),
        help_line("/", "search titles", width),
        help_line("q/ctrl+c", "quit", width),
        help_line("?", "hide help", width),
    ]
}

fn help_header(title: &str) -> Line<'static> {
    Line::from(Span::styled(
        title.to_string(),
        Style::default().fg(COLOR_INFO).add_modifier(Modifier::BOLD),
    ))
}

fn help_line(keys: &str, desc: &str, width: usize) -> Line<'static> {
    let key_text = pad_text(keys, HELP_KEY_WIDTH.min(width));
    let desc_width = width.saturating_sub(HELP_KEY_WIDTH + 1);
    let desc_text = truncate_text(desc, desc_width);
    Line::from(vec![
        Span::styled(
            key_text,
            Style::default()
                .fg(COLOR_ACCENT)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(desc_text, Style::default().fg(COLOR_MUTED)),
    ])
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width.saturating_sub(2));
    let height = height.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

fn render_list_row(task: &Task, selected: bool, width: usize) -> Line<'static> {
    let scope = scope_label(&task.category);
    let title_width = width.saturating_sub(scope.chars().count() + 4);
    let title = truncate_text(&task.title, title_width);

    let mut spans = vec![
        Span::raw(" "),
        Span::styled(
            task.status.marker(),
            status_style(task.status).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(title, title_style(task.status)),
        Span::raw(" "),
        Span::styled(scope, scope_style(&task.category)),
    ];

    if selected {
        for span in &mut spans {
            span.style = span.style.add_modifier(Modifier::REVERSED);
        }
    }

    Line::from(spans)
}

fn build_detail_lines(task: &Task) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(Span::styled(
            task.title.clone(),
            Style::default()
                .fg(COLOR_TEXT)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(vec![
            label_span("Status: "),
            Span::styled(task.status.to_string(), status_style(task.status)),
        ]),
        Line::from(vec![
            label_span("Category: "),
            Span::styled(task.category.kind().to_string(), scope_style(&task.category)),
        ]),
    ];
    if let Some(project) = task.project() {
        lines.push(Line::from(vec![
            label_span("Project: "),
            Span::styled(project.to_string(), Style::default().fg(COLOR_SUCCESS)),
        ]));
    }
    lines.push(Line::from(vec![
        label_span("Created: "),
        Span::raw(format_timestamp(task.created_at)),
    ]));
    if let Some(completed_at) = task.completed_at {
        lines.push(Line::from(vec![
            label_span("Completed: "),
            Span::raw(format_timestamp(completed_at)),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        label_span("ID: "),
        Span::styled(task.id.clone(), Style::default().fg(COLOR_MUTED)),
    ]));
    lines
}

fn list_window(total: usize, selected: Option<usize>, height: usize) -> (usize, usize) {
    if total == 0 || height == 0 {
        return (0, 0);
    }
    if total <= height {
        return (0, total);
    }
    let selected = selected.unwrap_or(0);
    let mut start = selected.saturating_sub(height / 2);
    if start + height > total {
        start = total - height;
    }
    (start, start + height)
}

fn scope_label(category: &Category) -> String {
    match category.project_name() {
        Some(name) => format!("[{name}]"),
        None => format!("({})", category.kind()),
    }
}

fn scope_style(category: &Category) -> Style {
    match category {
        Category::Project(_) => Style::default().fg(COLOR_SUCCESS),
        Category::General => Style::default().fg(COLOR_ACCENT),
        Category::Office => Style::default().fg(COLOR_WARNING),
    }
}

fn status_style(status: TaskStatus) -> Style {
    match status {
        TaskStatus::Pending => Style::default().fg(COLOR_INFO),
        TaskStatus::Completed => Style::default().fg(COLOR_SUCCESS),
    }
}

fn title_style(status: TaskStatus) -> Style {
    match status {
        TaskStatus::Pending => Style::default().fg(COLOR_TEXT),
        TaskStatus::Completed => Style::default()
            .fg(COLOR_MUTED_DARK)
            .add_modifier(Modifier::CROSSED_OUT),
    }
}

fn pad_text(value: &str, width: usize) -> String {
    let text = truncate_text(value, width);
    format!("{text:width$}")
}

fn truncate_text(value: &str, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= max {
        return value.to_string();
    }
    if max <= 3 {
        return chars[..max].iter().collect();
    }
    let mut out: String = chars[..(max - 3)].iter().collect();
    out.push_str("...");
    out
}

fn format_timestamp(value: DateTime<Utc>) -> String {
    value.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

fn label_span(label: &str) -> Span<'static> {
    Span::styled(label.to_string(), Style::default().fg(COLOR_MUTED_DARK))
}
