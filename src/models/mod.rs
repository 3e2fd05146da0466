mod document;
mod fragment;
mod quiz_block;

pub use document::{Block, Nugget, QuizEntry, Section};
pub use fragment::{Fragment, FragmentGroup};
pub use quiz_block::{Feedback, QuizBlock, ResponseHandler};

/// Which screen the player is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    /// Section list.
    Outline,
    /// Reading one section.
    Reading,
}
