//! Listing page parser
//!
//! Turns the raw text of a folder listing page into a [`ContentSummary`].
//! The page is scraped, not parsed: input is untrusted and often partial, so
//! parsing never fails. Extraction strategies are tried in order and the
//! first one that matches at least one file wins:
//!
//! 1. [`ExtractionStrategy::TooltipNames`] reads `data-tooltip="..."` item names
//! 2. [`ExtractionStrategy::ExtensionScan`] pattern-matches file names anywhere
//!    in the text (pdf/video/audio/image only)

use crate::classifier::{classify, Category};
use crate::summary::ContentSummary;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::debug;

static TOOLTIP_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"data-tooltip="([^"]+)""#).unwrap()
});
static FOLDER_WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)klasör|folder").unwrap()
});
static EXTENSION_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\.[0-9A-Za-z_]{2,4}$").unwrap()
});

// The trailing class stands in for a lookahead; group 1 is the file name.
static FALLBACK_PATTERNS: LazyLock<Vec<(Category, Regex)>> = LazyLock::new(|| {
    [
        (Category::Pdf, "pdf"),
        (Category::Video, "mp4|mkv|avi|mov|webm"),
        (Category::Audio, "mp3|wav|ogg|m4a|aac|flac"),
        (Category::Image, "jpg|jpeg|png|gif|webp"),
    ]
    .into_iter()
    .map(|(category, exts)| {
        let pattern = format!(r#"(?i)([^"/\\]+\.(?:{exts}))["'\s\],<>]"#);
        (category, Regex::new(&pattern).unwrap())
    })
    .collect()
});

/// One way of pulling file names out of a listing page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionStrategy {
    /// Structured per-item name attributes
    TooltipNames,
    /// Bare extension matching over the whole text
    ExtensionScan,
}

/// Strategies in the order [`parse`] tries them
pub const DEFAULT_STRATEGIES: [ExtractionStrategy; 2] = [
    ExtractionStrategy::TooltipNames,
    ExtractionStrategy::ExtensionScan,
];

/// Result of running a single strategy
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    pub summary: ContentSummary,
    /// Distinct names that were counted
    pub matched: usize,
}

impl ExtractionStrategy {
    pub fn extract(&self, page: &str) -> Extraction {
        match self {
            ExtractionStrategy::TooltipNames => extract_tooltip_names(page),
            ExtractionStrategy::ExtensionScan => extract_by_extension(page),
        }
    }
}

/// True for names that reference a folder rather than a file:
/// a folder word and no extension-like suffix.
pub fn is_folder_reference(name: &str) -> bool {
    FOLDER_WORD.is_match(name) && !EXTENSION_SUFFIX.is_match(name)
}

/// Parse a raw listing page with the default strategies
pub fn parse(page: &str) -> ContentSummary {
    parse_with(page, &DEFAULT_STRATEGIES)
}

/// Parse with an explicit strategy order; all-zero if none matches
pub fn parse_with(page: &str, strategies: &[ExtractionStrategy]) -> ContentSummary {
    for strategy in strategies {
        let extraction = strategy.extract(page);
        if extraction.matched > 0 {
            debug!(?strategy, matched = extraction.matched, "Listing parsed");
            return extraction.summary;
        }
    }
    ContentSummary::new()
}

fn extract_tooltip_names(page: &str) -> Extraction {
    let mut extraction = Extraction::default();
    let mut seen: HashSet<&str> = HashSet::new();

    for caps in TOOLTIP_NAME.captures_iter(page) {
        let Some(name) = caps.get(1).map(|m| m.as_str()) else {
            continue;
        };
        if seen.contains(name) || is_folder_reference(name) {
            continue;
        }

        let category = classify(name);
        if category != Category::Other {
            seen.insert(name);
            extraction.summary.increment(category);
        }
    }

    extraction.matched = seen.len();
    extraction
}

fn extract_by_extension(page: &str) -> Extraction {
    let mut extraction = Extraction::default();

    for (category, pattern) in FALLBACK_PATTERNS.iter() {
        let names: HashSet<&str> = pattern
            .captures_iter(page)
            .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
            .collect();

        for _ in &names {
            extraction.summary.increment(*category);
        }
        extraction.matched += names.len();
    }

    extraction
}
