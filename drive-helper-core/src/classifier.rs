//! File type classification by extension suffix

use serde::{Deserialize, Serialize};
use std::fmt;

/// Content category of a listed file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Pdf,
    Video,
    Audio,
    Image,
    Doc,
    Other,
}

impl Category {
    /// All categories in display order
    pub const ALL: [Category; 6] = [
        Category::Pdf,
        Category::Video,
        Category::Audio,
        Category::Image,
        Category::Doc,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Pdf => "pdf",
            Category::Video => "video",
            Category::Audio => "audio",
            Category::Image => "image",
            Category::Doc => "doc",
            Category::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const PDF_EXTENSIONS: &[&str] = &["pdf"];

pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mkv", "avi", "mov", "webm", "flv", "wmv", "m4v"];

pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "ogg", "m4a", "aac", "flac", "wma"];

pub const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "webp", "bmp", "svg", "ico", "heic",
];

pub const DOC_EXTENSIONS: &[&str] = &[
    "doc", "docx", "xls", "xlsx", "ppt", "pptx", "txt", "rtf", "odt", "ods", "odp",
];

/// Classify a file name by its extension (case-insensitive).
///
/// Total: names without a recognised extension, including the empty
/// string, are `Other`.
pub fn classify(name: &str) -> Category {
    let ext = match name.trim_end().rsplit_once('.') {
        Some((_, ext)) => ext.to_lowercase(),
        None => return Category::Other,
    };
    let ext = ext.as_str();

    if PDF_EXTENSIONS.contains(&ext) {
        Category::Pdf
    } else if VIDEO_EXTENSIONS.contains(&ext) {
        Category::Video
    } else if AUDIO_EXTENSIONS.contains(&ext) {
        Category::Audio
    } else if IMAGE_EXTENSIONS.contains(&ext) {
        Category::Image
    } else if DOC_EXTENSIONS.contains(&ext) {
        Category::Doc
    } else {
        Category::Other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_each_group() {
        assert_eq!(classify("report.pdf"), Category::Pdf);
        assert_eq!(classify("movie.mkv"), Category::Video);
        assert_eq!(classify("song.flac"), Category::Audio);
        assert_eq!(classify("photo.webp"), Category::Image);
        assert_eq!(classify("notes.docx"), Category::Doc);
        assert_eq!(classify("bundle.zip"), Category::Other);
    }

    #[test]
    fn test_classify_case_insensitive() {
        assert_eq!(classify("REPORT.PDF"), Category::Pdf);
        assert_eq!(classify("Clip.Mp4"), Category::Video);
        assert_eq!(classify("IMG_0001.HEIC"), Category::Image);
    }

    #[test]
    fn test_classify_without_extension() {
        assert_eq!(classify(""), Category::Other);
        assert_eq!(classify("README"), Category::Other);
        assert_eq!(classify("trailing."), Category::Other);
    }

    #[test]
    fn test_classify_uses_last_suffix() {
        assert_eq!(classify("slides.pdf.zip"), Category::Other);
        assert_eq!(classify("archive.tar.mp3"), Category::Audio);
    }

    #[test]
    fn test_category_display() {
        let names: Vec<String> = Category::ALL.iter().map(|c| c.to_string()).collect();
        assert_eq!(names, vec!["pdf", "video", "audio", "image", "doc", "other"]);
    }
}
