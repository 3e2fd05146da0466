use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Padding, Paragraph},
};

use crate::app::App;

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::vertical([
        Constraint::Length(4),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .margin(1)
    .split(area);

    render_title(frame, chunks[0], app);
    render_sections(frame, chunks[1], app);
    super::render_controls(frame, chunks[2], "j/k navigate  ·  enter open  ·  q quit");
}

fn render_title(frame: &mut Frame, area: Rect, app: &App) {
    let nugget = app.nugget();
    let title = if nugget.title.is_empty() {
        "UNTITLED NUGGET".to_string()
    } else {
        nugget.title.to_uppercase()
    };

    let content = vec![
        Line::from(Span::styled(title, Style::default().fg(Color::Cyan).bold())),
        Line::from(Span::styled(
            format!(
                "{} sections · {} questions",
                nugget.sections.len(),
                nugget.quiz_count()
            ),
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let widget = Paragraph::new(content).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Color::DarkGray),
    );
    frame.render_widget(widget, area);
}

fn render_sections(frame: &mut Frame, area: Rect, app: &App) {
    let lines: Vec<Line> = app
        .nugget()
        .sections
        .iter()
        .enumerate()
        .map(|(index, section)| {
            let is_selected = index == app.outline_cursor();
            let style = if is_selected {
                Style::default().fg(Color::Cyan).bold()
            } else {
                Style::default().fg(Color::Gray)
            };
            let marker = if is_selected { ">" } else { " " };
            let indent = "  ".repeat(usize::from(section.level.saturating_sub(1)));

            let quiz_count = section.quizzes().len();
            let answered = app
                .progress()
                .section(index)
                .map_or(0, |progress| progress.answered_count());
            let summary = if quiz_count > 0 {
                format!("  {}/{} answered", answered, quiz_count)
            } else {
                String::new()
            };

            Line::from(vec![
                Span::styled(format!(" {} ", marker), style),
                Span::styled(format!("{}{}", indent, section.title), style),
                Span::styled(summary, Style::default().fg(Color::DarkGray)),
            ])
        })
        .collect();

    let visible_rows = usize::from(area.height.saturating_sub(1)).max(1);
    let offset = app.outline_cursor().saturating_sub(visible_rows - 1);

    let widget = Paragraph::new(lines)
        .block(Block::default().padding(Padding::horizontal(1)))
        .scroll((offset as u16, 0));
    frame.render_widget(widget, area);
}
