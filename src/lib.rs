//! # nugget-quiz
//!
//! Parser, validator and interpreter for interactive learning nuggets
//! written in LiaScript-flavoured Markdown: `{{N}}` fragment reveals,
//! `[( )]`/`[(X)]` single-choice quizzes, `[[?]]` explanations and
//! `<script>` response handlers dispatching through `send.lia(...)`.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use nugget_quiz::{evaluate_answer, load_nugget};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let nugget = load_nugget("nuggets/normality-check.md")?;
//!
//!     if let Some(quiz) = nugget.quiz(1, 0) {
//!         let feedback = evaluate_answer(quiz, 0)?;
//!         println!("{} {}", feedback.is_correct, feedback.message);
//!     }
//!
//!     Ok(())
//! }
//! ```

mod app;
pub mod config;
mod data;
pub mod error;
pub mod interpreter;
pub mod models;
pub mod protocol;
pub mod server;
pub mod terminal;
mod ui;
pub mod validate;

use std::path::Path;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};

pub use app::App;
pub use config::Config;
pub use data::{load_nugget, load_nugget_dir, nugget_paths, parse_nugget, parse_quiz_block};
pub use error::{MalformedBlock, NuggetError, ParseError};
pub use interpreter::{
    BlockSession, BlockState, FeedbackResult, InvalidSelection, NuggetProgress, RetryPolicy,
    SectionProgress, SubmitError, advance_fragment, evaluate_answer,
};
pub use models::{AppState, Block, Feedback, Fragment, FragmentGroup, Nugget, QuizBlock, Section};
pub use validate::{ValidationWarning, validate_nugget};

/// A nugget that can be played in the terminal.
pub struct Player {
    app: App,
}

impl Player {
    pub fn new(nugget: Nugget, retry: RetryPolicy) -> Self {
        Self {
            app: App::new(nugget, retry),
        }
    }

    /// Load a nugget from a markup or JSON file.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use nugget_quiz::{Player, RetryPolicy};
    ///
    /// let player = Player::from_path("nuggets/anova.md", RetryPolicy::Lock).expect("Failed to load nugget");
    /// ```
    pub fn from_path<P: AsRef<Path>>(path: P, retry: RetryPolicy) -> Result<Self, NuggetError> {
        let nugget = load_nugget(path)?;
        Ok(Self::new(nugget, retry))
    }

    /// Run the player in the terminal.
    ///
    /// This will take over the terminal, display the nugget, and return
    /// when the learner quits.
    pub fn run(mut self) -> Result<(), NuggetError> {
        let mut term = terminal::TerminalGuard::enter()?;
        run_event_loop(&mut term, &mut self.app)
    }

    /// Get a reference to the underlying app for custom handling.
    pub fn app(&self) -> &App {
        &self.app
    }

    /// Get a mutable reference to the underlying app for custom handling.
    pub fn app_mut(&mut self) -> &mut App {
        &mut self.app
    }
}

fn run_event_loop(terminal: &mut terminal::AppTerminal, app: &mut App) -> Result<(), NuggetError> {
    loop {
        terminal.draw(|frame| ui::render(frame, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }

            if handle_input(app, key.code) {
                break;
            }
        }
    }

    Ok(())
}

/// Returns true if the app should exit.
fn handle_input(app: &mut App, key: KeyCode) -> bool {
    match app.state {
        AppState::Outline => handle_outline_input(app, key),
        AppState::Reading => handle_reading_input(app, key),
    }
}

fn handle_outline_input(app: &mut App, key: KeyCode) -> bool {
    match key {
        KeyCode::Up | KeyCode::Char('k') => {
            app.select_previous_section();
            false
        }
        KeyCode::Down | KeyCode::Char('j') => {
            app.select_next_section();
            false
        }
        KeyCode::Enter => {
            app.open_section();
            false
        }
        KeyCode::Char('q') | KeyCode::Char('Q') => true,
        _ => false,
    }
}

fn handle_reading_input(app: &mut App, key: KeyCode) -> bool {
    match key {
        KeyCode::Char(' ') | KeyCode::Char('l') | KeyCode::Right => app.advance_fragment(),
        KeyCode::Tab => app.focus_next_quiz(),
        KeyCode::Up | KeyCode::Char('k') => app.select_previous_option(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next_option(),
        KeyCode::Enter => app.submit_answer(),
        KeyCode::PageDown | KeyCode::Char('J') => app.scroll_down(),
        KeyCode::PageUp | KeyCode::Char('K') => app.scroll_up(),
        KeyCode::Char('n') => app.next_section(),
        KeyCode::Char('p') => app.previous_section(),
        KeyCode::Esc | KeyCode::Backspace => app.back_to_outline(),
        KeyCode::Char('q') | KeyCode::Char('Q') => return true,
        _ => {}
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> App {
        let nugget = parse_nugget("# T-Test\n\nSame mean?\n\n[( )] no\n[(X)] yes\n[[?]] p > 0.05\n").unwrap();
        App::new(nugget, RetryPolicy::Lock)
    }

    #[test]
    fn test_keys_drive_the_player() {
        let mut app = app();
        assert!(!handle_input(&mut app, KeyCode::Enter));
        assert_eq!(app.state, AppState::Reading);

        handle_input(&mut app, KeyCode::Char('j'));
        handle_input(&mut app, KeyCode::Enter);
        let result = app.section_progress().unwrap().block(0).unwrap().result().unwrap();
        assert!(result.is_correct);

        handle_input(&mut app, KeyCode::Esc);
        assert_eq!(app.state, AppState::Outline);
        assert!(handle_input(&mut app, KeyCode::Char('q')));
    }
}
