use crate::interpreter::{NuggetProgress, RetryPolicy, SectionProgress, SubmitError};
use crate::models::{AppState, Nugget, Section};

pub struct App {
    pub state: AppState,
    nugget: Nugget,
    progress: NuggetProgress,
    retry: RetryPolicy,
    outline_cursor: usize,
    current_section: usize,
    focused_quiz: Option<usize>,
    selected_option: usize,
    scroll: u16,
    status: Option<String>,
}

impl App {
    pub fn new(nugget: Nugget, retry: RetryPolicy) -> Self {
        let progress = NuggetProgress::for_nugget(&nugget);

        Self {
            state: AppState::Outline,
            nugget,
            progress,
            retry,
            outline_cursor: 0,
            current_section: 0,
            focused_quiz: None,
            selected_option: 0,
            scroll: 0,
            status: None,
        }
    }

    pub fn nugget(&self) -> &Nugget {
        &self.nugget
    }

    pub fn progress(&self) -> &NuggetProgress {
        &self.progress
    }

    pub fn outline_cursor(&self) -> usize {
        self.outline_cursor
    }

    pub fn current_section_index(&self) -> usize {
        self.current_section
    }

    pub fn current_section(&self) -> Option<&Section> {
        self.nugget.sections.get(self.current_section)
    }

    pub fn section_progress(&self) -> Option<&SectionProgress> {
        self.progress.section(self.current_section)
    }

    pub fn focused_quiz(&self) -> Option<usize> {
        self.focused_quiz
    }

    pub fn selected_option(&self) -> usize {
        self.selected_option
    }

    pub fn scroll(&self) -> u16 {
        self.scroll
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn select_next_section(&mut self) {
        let count = self.nugget.sections.len();
        if count > 0 {
            self.outline_cursor = (self.outline_cursor + 1) % count;
        }
    }

    pub fn select_previous_section(&mut self) {
        let count = self.nugget.sections.len();
        if count > 0 {
            self.outline_cursor = (self.outline_cursor + count - 1) % count;
        }
    }

    pub fn open_section(&mut self) {
        if self.outline_cursor < self.nugget.sections.len() {
            self.enter_section(self.outline_cursor);
        }
    }

    pub fn back_to_outline(&mut self) {
        self.outline_cursor = self.current_section;
        self.state = AppState::Outline;
        self.status = None;
    }

    pub fn next_section(&mut self) {
        if self.current_section + 1 < self.nugget.sections.len() {
            self.enter_section(self.current_section + 1);
        }
    }

    pub fn previous_section(&mut self) {
        if self.current_section > 0 {
            self.enter_section(self.current_section - 1);
        }
    }

    fn enter_section(&mut self, index: usize) {
        self.state = AppState::Reading;
        self.current_section = index;
        self.scroll = 0;
        self.status = None;
        self.focused_quiz = self.visible_quizzes().first().copied();
        self.selected_option = 0;
    }

    fn visible_quizzes(&self) -> Vec<usize> {
        match (self.current_section(), self.section_progress()) {
            (Some(section), Some(progress)) => section.visible_quizzes(progress.fragment()),
            _ => Vec::new(),
        }
    }

    fn focused_option_count(&self) -> usize {
        self.focused_quiz
            .and_then(|ordinal| self.current_section()?.quiz(ordinal))
            .map_or(0, |quiz| quiz.options.len())
    }

    /// Reveal the next fragment of the current section.
    pub fn advance_fragment(&mut self) {
        if let Some(progress) = self.progress.section_mut(self.current_section) {
            progress.advance();
        }
        if self.focused_quiz.is_none() {
            self.focused_quiz = self.visible_quizzes().first().copied();
            self.selected_option = 0;
        }
    }

    /// Move focus to the next revealed quiz block, wrapping around.
    pub fn focus_next_quiz(&mut self) {
        let visible = self.visible_quizzes();
        if visible.is_empty() {
            return;
        }

        let position = self
            .focused_quiz
            .and_then(|focused| visible.iter().position(|&ordinal| ordinal == focused));
        let next = match position {
            Some(position) => visible[(position + 1) % visible.len()],
            None => visible[0],
        };

        self.focused_quiz = Some(next);
        self.selected_option = 0;
        self.status = None;
    }

    pub fn select_next_option(&mut self) {
        let count = self.focused_option_count();
        if count > 0 {
            self.selected_option = (self.selected_option + 1) % count;
        }
    }

    pub fn select_previous_option(&mut self) {
        let count = self.focused_option_count();
        if count > 0 {
            self.selected_option = (self.selected_option + count - 1) % count;
        }
    }

    pub fn submit_answer(&mut self) {
        let Some(ordinal) = self.focused_quiz else {
            return;
        };
        let Some(quiz) = self
            .nugget
            .sections
            .get(self.current_section)
            .and_then(|section| section.quiz(ordinal))
        else {
            return;
        };
        let Some(session) = self
            .progress
            .section_mut(self.current_section)
            .and_then(|progress| progress.block_mut(ordinal))
        else {
            return;
        };

        self.status = match session.submit(quiz, self.selected_option, self.retry) {
            Ok(_) => None,
            Err(SubmitError::AlreadyAnswered) => Some("Already answered".to_string()),
            Err(e) => Some(e.to_string()),
        };
    }

    pub fn scroll_down(&mut self) {
        self.scroll = self.scroll.saturating_add(1);
    }

    pub fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::parse_nugget;

    const NUGGET: &str = "# Correlation\n\nIntro.\n\n\
        ## Pearson\n\n\
        Which coefficient measures linear association?\n\n\
        [(X)] Pearson\n\
        [( )] Spearman\n\
        [( )] Kendall\n\
        [[?]] Pearson's r measures linear association.\n\n\
        {{1}}\n\
        *****\n\
        Is r = 0.9 strong?\n\n\
        [( )] No\n\
        [(X)] Yes\n\
        *****\n";

    fn app(retry: RetryPolicy) -> App {
        App::new(parse_nugget(NUGGET).unwrap(), retry)
    }

    #[test]
    fn test_outline_navigation_wraps() {
        let mut app = app(RetryPolicy::Lock);
        assert_eq!(app.state, AppState::Outline);
        app.select_previous_section();
        assert_eq!(app.outline_cursor(), 1);
        app.select_next_section();
        assert_eq!(app.outline_cursor(), 0);
    }

    #[test]
    fn test_open_section_focuses_first_visible_quiz() {
        let mut app = app(RetryPolicy::Lock);
        app.select_next_section();
        app.open_section();
        assert_eq!(app.state, AppState::Reading);
        assert_eq!(app.current_section_index(), 1);
        assert_eq!(app.focused_quiz(), Some(0));

        // second quiz is hidden until the fragment is revealed
        app.focus_next_quiz();
        assert_eq!(app.focused_quiz(), Some(0));
        app.advance_fragment();
        app.focus_next_quiz();
        assert_eq!(app.focused_quiz(), Some(1));
    }

    #[test]
    fn test_option_selection_wraps_per_block() {
        let mut app = app(RetryPolicy::Lock);
        app.select_next_section();
        app.open_section();
        app.select_previous_option();
        assert_eq!(app.selected_option(), 2);
        app.select_next_option();
        assert_eq!(app.selected_option(), 0);
    }

    #[test]
    fn test_submit_records_feedback_and_locks() {
        let mut app = app(RetryPolicy::Lock);
        app.select_next_section();
        app.open_section();
        app.select_next_option();
        app.submit_answer();

        let session = app.section_progress().unwrap().block(0).unwrap();
        let result = session.result().unwrap();
        assert!(!result.is_correct);
        assert_eq!(result.message, "Pearson's r measures linear association.");
        assert_eq!(app.status(), None);

        app.submit_answer();
        assert_eq!(app.status(), Some("Already answered"));
    }

    #[test]
    fn test_unlimited_retry() {
        let mut app = app(RetryPolicy::Unlimited);
        app.select_next_section();
        app.open_section();
        app.select_next_option();
        app.submit_answer();
        app.select_previous_option();
        app.submit_answer();

        let session = app.section_progress().unwrap().block(0).unwrap();
        assert!(session.result().unwrap().is_correct);
        assert_eq!(app.status(), None);
    }

    #[test]
    fn test_section_without_quizzes() {
        let mut app = app(RetryPolicy::Lock);
        app.open_section();
        assert_eq!(app.focused_quiz(), None);
        app.submit_answer();
        app.select_next_option();
        assert_eq!(app.selected_option(), 0);

        app.next_section();
        assert_eq!(app.current_section_index(), 1);
        app.next_section();
        assert_eq!(app.current_section_index(), 1);
        app.back_to_outline();
        assert_eq!(app.state, AppState::Outline);
        assert_eq!(app.outline_cursor(), 1);
    }
}
