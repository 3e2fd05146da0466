//! Protocol messages between a rendering host and the feedback host.
//!
//! All messages are serialized as JSON over WebSocket.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::Nugget;

/// Messages sent from a renderer to the feedback host.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Ask for the section outline again.
    Outline,

    /// The learner picked an option of a quiz block.
    Evaluate {
        section: usize,
        block: usize,
        selected: usize,
    },

    /// The learner navigated forward in a section.
    Advance { section: usize },

    /// The learner re-entered a section; hide its fragments again.
    Reset { section: usize },
}

/// Messages sent from the feedback host to a renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// Connection accepted with a fresh learner session.
    ConnectionAck {
        session_id: Uuid,
        title: String,
        sections: Vec<SectionOutline>,
    },

    Outline { sections: Vec<SectionOutline> },

    /// Result of an `Evaluate` request.
    Feedback {
        section: usize,
        block: usize,
        is_correct: bool,
        message: String,
    },

    /// Fragments up to `index` are now visible.
    FragmentRevealed { section: usize, index: u32 },

    /// The request could not be served.
    Rejected { reason: String },
}

/// Summary of one section for renderers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionOutline {
    pub title: String,
    pub level: u8,
    pub quiz_count: usize,
    pub fragment_max: u32,
}

pub fn outline(nugget: &Nugget) -> Vec<SectionOutline> {
    nugget
        .sections
        .iter()
        .map(|section| SectionOutline {
            title: section.title.clone(),
            level: section.level,
            quiz_count: section.quizzes().len(),
            fragment_max: section.fragment_group().max(),
        })
        .collect()
}
