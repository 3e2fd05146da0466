use serde::{Deserialize, Serialize};

use super::{Fragment, FragmentGroup, QuizBlock};

/// One element of a section body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Block {
    Text { text: String },
    Code { info: String, code: String },
    Fragment(Fragment),
    Quiz(QuizBlock),
}

/// A heading and everything up to the next heading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    /// Heading level, 0 for the preamble before the first heading.
    pub level: u8,
    pub blocks: Vec<Block>,
}

/// A quiz block together with the fragment index that reveals it.
#[derive(Debug, Clone, Copy)]
pub struct QuizEntry<'a> {
    pub block: &'a QuizBlock,
    /// Highest enclosing fragment marker, `None` when always visible.
    pub revealed_at: Option<u32>,
}

impl QuizEntry<'_> {
    pub fn is_visible(&self, current: u32) -> bool {
        self.revealed_at.is_none_or(|index| index <= current)
    }
}

impl Section {
    /// Quiz blocks in document order. A block's position here is its ordinal.
    pub fn quizzes(&self) -> Vec<&QuizBlock> {
        self.quiz_entries().into_iter().map(|entry| entry.block).collect()
    }

    pub fn quiz_entries(&self) -> Vec<QuizEntry<'_>> {
        let mut entries = Vec::new();
        collect_quizzes(&self.blocks, None, &mut entries);
        entries
    }

    pub fn quiz(&self, ordinal: usize) -> Option<&QuizBlock> {
        self.quizzes().get(ordinal).copied()
    }

    /// Ordinals of the quizzes not hidden behind an unrevealed fragment.
    pub fn visible_quizzes(&self, current: u32) -> Vec<usize> {
        self.quiz_entries()
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.is_visible(current))
            .map(|(ordinal, _)| ordinal)
            .collect()
    }

    pub fn fragment_group(&self) -> FragmentGroup {
        let mut markers = Vec::new();
        collect_markers(&self.blocks, &mut markers);
        FragmentGroup::from_markers(markers)
    }
}

fn collect_quizzes<'a>(blocks: &'a [Block], revealed_at: Option<u32>, out: &mut Vec<QuizEntry<'a>>) {
    for block in blocks {
        match block {
            Block::Quiz(quiz) => out.push(QuizEntry {
                block: quiz,
                revealed_at,
            }),
            Block::Fragment(fragment) => {
                let nested = revealed_at.map_or(fragment.index, |outer| outer.max(fragment.index));
                collect_quizzes(&fragment.blocks, Some(nested), out);
            }
            Block::Text { .. } | Block::Code { .. } => {}
        }
    }
}

fn collect_markers(blocks: &[Block], out: &mut Vec<u32>) {
    for block in blocks {
        if let Block::Fragment(fragment) = block {
            out.push(fragment.index);
            collect_markers(&fragment.blocks, out);
        }
    }
}

/// A complete lesson document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nugget {
    /// First level-1 heading, empty if there is none.
    pub title: String,
    pub sections: Vec<Section>,
}

impl Nugget {
    pub fn quiz(&self, section: usize, ordinal: usize) -> Option<&QuizBlock> {
        self.sections.get(section)?.quiz(ordinal)
    }

    pub fn quiz_count(&self) -> usize {
        self.sections.iter().map(|s| s.quizzes().len()).sum()
    }
}
