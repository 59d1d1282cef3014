//! Summary rendering as chip markup and plain text

use crate::classifier::Category;
use crate::summary::ContentSummary;

fn glyph(category: Category) -> &'static str {
    match category {
        Category::Pdf => "📄",
        Category::Video => "🎬",
        Category::Audio => "🎵",
        Category::Image => "🖼️",
        Category::Doc => "📝",
        Category::Other => "📁",
    }
}

/// Shown while a folder is being scanned
pub const LOADING_CHIP: &str = r#"<span class="dh_chip dh_loading">⏳</span>"#;

/// Shown when a folder's scan failed
pub const ERROR_CHIP: &str = r#"<span class="dh_chip dh_err">❌</span>"#;

/// Shown for an empty summary
pub const EMPTY_CHIP: &str = r#"<span class="dh_chip dh_empty">empty</span>"#;

/// One chip per non-zero category, or [`EMPTY_CHIP`]
pub fn chips_html(summary: &ContentSummary) -> String {
    if summary.is_empty() {
        return EMPTY_CHIP.to_string();
    }

    Category::ALL
        .iter()
        .filter(|c| summary.get(**c) > 0)
        .map(|c| {
            format!(
                r#"<span class="dh_chip dh_{}">{}{}</span>"#,
                c,
                glyph(*c),
                summary.get(*c)
            )
        })
        .collect()
}

/// Terminal variant of [`chips_html`]
pub fn chips_text(summary: &ContentSummary) -> String {
    if summary.is_empty() {
        return "empty".to_string();
    }

    Category::ALL
        .iter()
        .filter(|c| summary.get(**c) > 0)
        .map(|c| format!("{}{}", glyph(*c), summary.get(*c)))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_summary_renders_empty_chip() {
        assert_eq!(chips_html(&ContentSummary::new()), EMPTY_CHIP);
        assert_eq!(chips_text(&ContentSummary::new()), "empty");
    }

    #[test]
    fn test_only_non_zero_chips() {
        let summary = ContentSummary { pdf: 2, image: 1, ..Default::default() };

        assert_eq!(
            chips_html(&summary),
            concat!(
                r#"<span class="dh_chip dh_pdf">📄2</span>"#,
                r#"<span class="dh_chip dh_image">🖼️1</span>"#
            )
        );
        assert_eq!(chips_text(&summary), "📄2 🖼️1");
    }
}
