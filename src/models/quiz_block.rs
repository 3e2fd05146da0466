use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::MalformedBlock;

/// A single-select multiple choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizBlock {
    /// Text shown above the options. May be empty.
    pub prompt: String,
    /// Option texts in display order.
    pub options: Vec<String>,
    /// Zero-based index of the `[(X)]` option.
    pub correct_index: usize,
    /// `[[?]]` lines, joined with newlines.
    #[serde(default)]
    pub explanation: Option<String>,
    /// Embedded `<script>` response handler.
    #[serde(default)]
    pub handler: Option<ResponseHandler>,
}

/// Script attached to a quiz block that picks the message to dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseHandler {
    /// Script body between the tags, verbatim.
    pub script: String,
    /// Option index the learner input is compared against.
    pub expected: Option<usize>,
    /// Message dispatched when the comparison holds. Empty when the script
    /// only dispatches computed values.
    pub on_match: String,
    /// Message dispatched otherwise.
    pub on_mismatch: String,
}

/// How a block answers a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feedback<'a> {
    /// Separate messages for correct and incorrect answers.
    Branching { correct: &'a str, incorrect: &'a str },
    /// One explanation shown regardless of the selection.
    Explanation(&'a str),
    /// No feedback text at all.
    Silent,
}

impl QuizBlock {
    /// Classify the block by the feedback it carries. A handler wins over
    /// `[[?]]` lines.
    pub fn feedback(&self) -> Feedback<'_> {
        match (&self.handler, &self.explanation) {
            (Some(handler), _) if handler.has_messages() => Feedback::Branching {
                correct: &handler.on_match,
                incorrect: &handler.on_mismatch,
            },
            (_, Some(text)) => Feedback::Explanation(text),
            _ => Feedback::Silent,
        }
    }

    pub fn correct_option(&self) -> Option<&str> {
        self.options.get(self.correct_index).map(String::as_str)
    }

    /// Check the single-correct-option invariant on a block that did not
    /// come through the markup parser.
    pub fn check(&self) -> Result<(), MalformedBlock> {
        if self.options.is_empty() {
            return Err(MalformedBlock::NoOptions);
        }
        if self.correct_index >= self.options.len() {
            return Err(MalformedBlock::MissingCorrectOption);
        }
        Ok(())
    }
}

impl ResponseHandler {
    /// Whether any `send.lia(...)` call passes a literal message.
    pub fn has_messages(&self) -> bool {
        !self.on_match.is_empty() || !self.on_mismatch.is_empty()
    }
}

impl fmt::Display for QuizBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.prompt.is_empty() {
            writeln!(f, "{}", self.prompt)?;
            writeln!(f)?;
        }

        for (index, option) in self.options.iter().enumerate() {
            let marker = if index == self.correct_index { 'X' } else { ' ' };
            writeln!(f, "[({})] {}", marker, option)?;
        }

        if let Some(explanation) = &self.explanation {
            for line in explanation.split('\n') {
                writeln!(f, "[[?]] {}", line)?;
            }
        }

        if let Some(handler) = &self.handler {
            writeln!(f, "<script>{}</script>", handler.script)?;
        }

        Ok(())
    }
}
