//! Per-folder content counts

use crate::classifier::{classify, Category};
use serde::{Deserialize, Serialize};

/// Count of distinct items per content category within one folder
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentSummary {
    pub pdf: u32,
    pub video: u32,
    pub audio: u32,
    pub image: u32,
    pub doc: u32,
    pub other: u32,
}

impl ContentSummary {
    /// All-zero summary
    pub fn new() -> Self {
        Self::default()
    }

    /// Count every name, `Other` included
    pub fn from_names<'a, I>(names: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut summary = Self::new();
        for name in names {
            summary.increment(classify(name));
        }
        summary
    }

    pub fn increment(&mut self, category: Category) {
        let slot = match category {
            Category::Pdf => &mut self.pdf,
            Category::Video => &mut self.video,
            Category::Audio => &mut self.audio,
            Category::Image => &mut self.image,
            Category::Doc => &mut self.doc,
            Category::Other => &mut self.other,
        };
        *slot = slot.saturating_add(1);
    }

    pub fn get(&self, category: Category) -> u32 {
        match category {
            Category::Pdf => self.pdf,
            Category::Video => self.video,
            Category::Audio => self.audio,
            Category::Image => self.image,
            Category::Doc => self.doc,
            Category::Other => self.other,
        }
    }

    pub fn total(&self) -> u32 {
        Category::ALL.iter().map(|c| self.get(*c)).sum()
    }

    /// True when every counter is zero
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}
