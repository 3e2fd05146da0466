//! Answer evaluation and fragment navigation.
//!
//! [`evaluate_answer`] and [`advance_fragment`] are pure. Learner state is
//! never global: callers own a [`NuggetProgress`] (or a single
//! [`BlockSession`]) and pass it in explicitly.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Feedback, FragmentGroup, Nugget, QuizBlock, Section};

/// Outcome of one submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackResult {
    pub is_correct: bool,
    /// Branch message, shared explanation, or empty for silent blocks.
    pub message: String,
}

/// The selected option does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("option {selected} is out of range for a block with {option_count} options")]
pub struct InvalidSelection {
    pub selected: usize,
    pub option_count: usize,
}

/// Evaluate a learner's choice against a quiz block.
pub fn evaluate_answer(block: &QuizBlock, selected_index: usize) -> Result<FeedbackResult, InvalidSelection> {
    if selected_index >= block.options.len() {
        return Err(InvalidSelection {
            selected: selected_index,
            option_count: block.options.len(),
        });
    }

    let is_correct = selected_index == block.correct_index;
    let message = match block.feedback() {
        Feedback::Branching { correct, incorrect } => {
            if is_correct {
                correct
            } else {
                incorrect
            }
        }
        Feedback::Explanation(text) => text,
        Feedback::Silent => "",
    };

    Ok(FeedbackResult {
        is_correct,
        message: message.to_string(),
    })
}

/// Reveal the next fragment. Never moves backwards and stops at the
/// group's highest marker.
pub fn advance_fragment(group: &FragmentGroup, current_index: u32) -> u32 {
    current_index.max(current_index.saturating_add(1).min(group.max()))
}

/// Whether a block may be answered again.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetryPolicy {
    /// The first answer is final.
    #[default]
    Lock,
    /// Every submission replaces the previous result.
    Unlimited,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum BlockState {
    #[default]
    Unanswered,
    Answered(FeedbackResult),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error(transparent)]
    InvalidSelection(#[from] InvalidSelection),

    #[error("this question has already been answered")]
    AlreadyAnswered,
}

/// Per-learner state of one quiz block.
#[derive(Debug, Clone, Default)]
pub struct BlockSession {
    state: BlockState,
    selected: Option<usize>,
}

impl BlockSession {
    pub fn state(&self) -> &BlockState {
        &self.state
    }

    /// The option submitted last, if any.
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn result(&self) -> Option<&FeedbackResult> {
        match &self.state {
            BlockState::Answered(result) => Some(result),
            BlockState::Unanswered => None,
        }
    }

    pub fn is_answered(&self) -> bool {
        matches!(self.state, BlockState::Answered(_))
    }

    /// Evaluate and record a submission. Invalid selections leave the
    /// session untouched.
    pub fn submit(
        &mut self,
        block: &QuizBlock,
        selected: usize,
        policy: RetryPolicy,
    ) -> Result<FeedbackResult, SubmitError> {
        if self.is_answered() && policy == RetryPolicy::Lock {
            return Err(SubmitError::AlreadyAnswered);
        }

        let result = evaluate_answer(block, selected)?;
        self.selected = Some(selected);
        self.state = BlockState::Answered(result.clone());
        Ok(result)
    }
}

/// Per-learner state of one section.
#[derive(Debug, Clone)]
pub struct SectionProgress {
    group: FragmentGroup,
    fragment: u32,
    blocks: Vec<BlockSession>,
}

impl SectionProgress {
    pub fn for_section(section: &Section) -> Self {
        Self {
            group: section.fragment_group(),
            fragment: 0,
            blocks: vec![BlockSession::default(); section.quizzes().len()],
        }
    }

    /// Index of the last revealed fragment.
    pub fn fragment(&self) -> u32 {
        self.fragment
    }

    pub fn fragment_max(&self) -> u32 {
        self.group.max()
    }

    pub fn advance(&mut self) -> u32 {
        self.fragment = advance_fragment(&self.group, self.fragment);
        self.fragment
    }

    /// Start a new visit: hide the fragments again, keep quiz answers.
    pub fn rewind(&mut self) {
        self.fragment = 0;
    }

    pub fn block(&self, ordinal: usize) -> Option<&BlockSession> {
        self.blocks.get(ordinal)
    }

    pub fn block_mut(&mut self, ordinal: usize) -> Option<&mut BlockSession> {
        self.blocks.get_mut(ordinal)
    }

    pub fn answered_count(&self) -> usize {
        self.blocks.iter().filter(|b| b.is_answered()).count()
    }
}

/// Per-learner state of a whole nugget.
#[derive(Debug, Clone)]
pub struct NuggetProgress {
    sections: Vec<SectionProgress>,
}

impl NuggetProgress {
    pub fn for_nugget(nugget: &Nugget) -> Self {
        Self {
            sections: nugget.sections.iter().map(SectionProgress::for_section).collect(),
        }
    }

    pub fn section(&self, index: usize) -> Option<&SectionProgress> {
        self.sections.get(index)
    }

    pub fn section_mut(&mut self, index: usize) -> Option<&mut SectionProgress> {
        self.sections.get_mut(index)
    }
}
