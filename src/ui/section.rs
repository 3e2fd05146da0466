use ratatui::{
    prelude::*,
    widgets::{self, Borders, Padding, Paragraph, Wrap},
};

use crate::app::App;
use crate::interpreter::SectionProgress;
use crate::models::{Block, QuizBlock, Section};

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let (Some(section), Some(progress)) = (app.current_section(), app.section_progress()) else {
        return;
    };

    let chunks = Layout::vertical([
        Constraint::Length(2),
        Constraint::Fill(1),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .margin(1)
    .split(area);

    render_header(frame, chunks[0], app, section, progress);

    let mut lines = Vec::new();
    let mut ordinal = 0;
    push_blocks(&mut lines, &section.blocks, app, progress, &mut ordinal);
    let widget = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(widgets::Block::default().padding(Padding::horizontal(1)))
        .scroll((app.scroll(), 0));
    frame.render_widget(widget, chunks[1]);

    render_status(frame, chunks[2], app);
    super::render_controls(
        frame,
        chunks[3],
        "space reveal  ·  tab next question  ·  j/k choose  ·  enter answer  ·  n/p section  ·  esc outline",
    );
}

fn render_header(frame: &mut Frame, area: Rect, app: &App, section: &Section, progress: &SectionProgress) {
    let columns = Layout::horizontal([Constraint::Fill(1), Constraint::Length(16)]).split(area);

    let title = Paragraph::new(section.title.as_str())
        .fg(Color::White)
        .bold()
        .block(
            widgets::Block::default()
                .borders(Borders::BOTTOM)
                .border_style(Color::DarkGray),
        );
    frame.render_widget(title, columns[0]);

    let position = format!(
        "{}/{}  {}/{}",
        app.current_section_index() + 1,
        app.nugget().sections.len(),
        progress.fragment(),
        progress.fragment_max()
    );
    let widget = Paragraph::new(position)
        .alignment(Alignment::Right)
        .fg(Color::DarkGray)
        .block(
            widgets::Block::default()
                .borders(Borders::BOTTOM)
                .border_style(Color::DarkGray),
        );
    frame.render_widget(widget, columns[1]);
}

fn push_blocks(
    lines: &mut Vec<Line<'static>>,
    blocks: &[Block],
    app: &App,
    progress: &SectionProgress,
    ordinal: &mut usize,
) {
    for block in blocks {
        match block {
            Block::Text { text } => {
                for line in text.lines() {
                    lines.push(Line::from(Span::styled(
                        line.to_string(),
                        Style::default().fg(Color::White),
                    )));
                }
                lines.push(Line::from(""));
            }
            Block::Code { code, .. } => {
                for line in code.lines() {
                    lines.push(Line::from(vec![
                        Span::styled(" │ ", Style::default().fg(Color::DarkGray)),
                        Span::styled(line.to_string(), Style::default().fg(Color::Yellow)),
                    ]));
                }
                lines.push(Line::from(""));
            }
            Block::Fragment(fragment) => {
                if fragment.is_visible(progress.fragment()) {
                    push_blocks(lines, &fragment.blocks, app, progress, ordinal);
                } else {
                    *ordinal += count_quizzes(&fragment.blocks);
                }
            }
            Block::Quiz(quiz) => {
                push_quiz(lines, quiz, app, progress, *ordinal);
                *ordinal += 1;
            }
        }
    }
}

fn count_quizzes(blocks: &[Block]) -> usize {
    blocks
        .iter()
        .map(|block| match block {
            Block::Quiz(_) => 1,
            Block::Fragment(fragment) => count_quizzes(&fragment.blocks),
            Block::Text { .. } | Block::Code { .. } => 0,
        })
        .sum()
}

fn option_label(index: usize) -> char {
    char::from(b'A' + (index % 26) as u8)
}

fn push_quiz(
    lines: &mut Vec<Line<'static>>,
    quiz: &QuizBlock,
    app: &App,
    progress: &SectionProgress,
    ordinal: usize,
) {
    let is_focused = app.focused_quiz() == Some(ordinal);
    let session = progress.block(ordinal);
    let result = session.and_then(|s| s.result());
    let answered = session.and_then(|s| s.selected()).filter(|_| result.is_some());

    for line in quiz.prompt.lines() {
        lines.push(Line::from(Span::styled(
            line.to_string(),
            Style::default().fg(Color::White).bold(),
        )));
    }

    for (index, option) in quiz.options.iter().enumerate() {
        let is_selected = is_focused && index == app.selected_option();
        let style = match (answered, result) {
            (Some(chosen), Some(result)) if chosen == index => {
                let color = if result.is_correct { Color::Green } else { Color::Red };
                Style::default().fg(color).bold()
            }
            _ if is_selected => Style::default().fg(Color::Cyan).bold(),
            _ => Style::default().fg(Color::Gray),
        };
        let marker = if is_selected { ">" } else { " " };

        lines.push(Line::from(vec![
            Span::styled(format!(" {} ", marker), style),
            Span::styled(format!("{}. ", option_label(index)), style),
            Span::styled(option.clone(), style),
        ]));
    }

    if let Some(result) = result {
        let (verdict, color) = if result.is_correct {
            ("Correct.", Color::Green)
        } else {
            ("Not quite.", Color::Red)
        };
        lines.push(Line::from(Span::styled(verdict, Style::default().fg(color).bold())));
        for line in result.message.lines() {
            lines.push(Line::from(Span::styled(
                line.to_string(),
                Style::default().fg(color).italic(),
            )));
        }
    }

    lines.push(Line::from(""));
}

fn render_status(frame: &mut Frame, area: Rect, app: &App) {
    if let Some(status) = app.status() {
        let widget = Paragraph::new(status.to_string())
            .alignment(Alignment::Center)
            .fg(Color::Yellow);
        frame.render_widget(widget, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Fragment;

    #[test]
    fn test_count_quizzes_descends_into_fragments() {
        let quiz = QuizBlock {
            prompt: String::new(),
            options: vec!["a".to_string(), "b".to_string()],
            correct_index: 0,
            explanation: None,
            handler: None,
        };
        let blocks = vec![
            Block::Quiz(quiz.clone()),
            Block::Fragment(Fragment {
                index: 1,
                blocks: vec![Block::Quiz(quiz.clone()), Block::Quiz(quiz)],
            }),
        ];
        assert_eq!(count_quizzes(&blocks), 3);
    }

    #[test]
    fn test_option_labels() {
        assert_eq!(option_label(0), 'A');
        assert_eq!(option_label(3), 'D');
    }
}
