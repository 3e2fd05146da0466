use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use super::Block;

/// A chunk of content revealed once the section reaches `index`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fragment {
    pub index: u32,
    pub blocks: Vec<Block>,
}

impl Fragment {
    pub fn is_visible(&self, current: u32) -> bool {
        self.index <= current
    }
}

/// The reveal markers of one section, ascending and de-duplicated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FragmentGroup {
    markers: Vec<u32>,
}

impl FragmentGroup {
    pub fn from_markers<I: IntoIterator<Item = u32>>(markers: I) -> Self {
        let mut markers: Vec<u32> = markers.into_iter().collect();
        markers.sort_unstable();
        markers.dedup();
        Self { markers }
    }

    pub fn markers(&self) -> &[u32] {
        &self.markers
    }

    /// Highest marker index, 0 for a group without markers.
    pub fn max(&self) -> u32 {
        self.markers.last().copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Runs of markers missing between 1 and `max()`, one range per hole.
    pub fn gaps(&self) -> Vec<RangeInclusive<u32>> {
        let mut gaps = Vec::new();
        let mut previous = 0;
        for &marker in &self.markers {
            if marker > previous + 1 {
                gaps.push(previous + 1..=marker - 1);
            }
            previous = marker;
        }
        gaps
    }
}
