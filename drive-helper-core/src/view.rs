//! Folder view notifications
//!
//! The page collaborator reports what is on screen as a [`ViewSnapshot`]
//! whenever the listing changes. [`ViewTracker`] notices when the folder
//! being viewed gains or loses files and recounts it from the visible rows,
//! which is cheaper and fresher than refetching the listing.

use crate::summary::ContentSummary;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;

/// One listed row as seen by the page collaborator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowDescriptor {
    pub item_id: String,
    /// Display name
    pub name: String,
    pub is_folder: bool,
}

impl RowDescriptor {
    pub fn file(item_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            item_id: item_id.into(),
            name: name.into(),
            is_folder: false,
        }
    }

    pub fn folder(item_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            item_id: item_id.into(),
            name: name.into(),
            is_folder: true,
        }
    }
}

/// What the listing currently shows
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewSnapshot {
    /// Folder being viewed, if the page is a folder listing
    pub current_folder: Option<String>,
    pub rows: Vec<RowDescriptor>,
}

impl ViewSnapshot {
    fn file_rows(&self) -> impl Iterator<Item = &RowDescriptor> {
        self.rows.iter().filter(|row| !row.is_folder)
    }
}

/// Detects file-count changes in the folder being viewed
#[derive(Debug, Default)]
pub struct ViewTracker {
    current_folder: Option<String>,
    last_file_count: usize,
}

impl ViewTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the next view. Returns the folder and its recount when the same
    /// folder is still shown and its (previously non-zero) file count moved.
    pub fn observe(&mut self, view: &ViewSnapshot) -> Option<(String, ContentSummary)> {
        let folder = view.current_folder.as_ref()?;
        let file_count = view.file_rows().count();

        let changed = self.current_folder.as_ref() == Some(folder)
            && self.last_file_count > 0
            && file_count != self.last_file_count;

        self.current_folder = Some(folder.clone());
        self.last_file_count = file_count;

        if !changed {
            return None;
        }

        let summary = ContentSummary::from_names(view.file_rows().map(|row| row.name.as_str()));
        Some((folder.clone(), summary))
    }
}

/// Deliver the latest view snapshot `debounce` after the first one of a burst.
///
/// The window opens on the first snapshot and is not extended by later ones,
/// so a steady stream is still delivered once per window. Returns when every
/// sender is dropped, after flushing any pending snapshot.
pub async fn debounce_views<F>(mut rx: mpsc::Receiver<ViewSnapshot>, debounce: Duration, mut on_view: F)
where
    F: FnMut(ViewSnapshot),
{
    while let Some(mut latest) = rx.recv().await {
        let deadline = Instant::now() + debounce;
        loop {
            match tokio::time::timeout_at(deadline, rx.recv()).await {
                Ok(Some(next)) => latest = next,
                Ok(None) => {
                    on_view(latest);
                    return;
                }
                Err(_) => break,
            }
        }
        on_view(latest);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(folder: &str, files: &[&str]) -> ViewSnapshot {
        let mut rows = vec![RowDescriptor::folder("sub", "Subfolder")];
        rows.extend(
            files
                .iter()
                .enumerate()
                .map(|(i, name)| RowDescriptor::file(format!("file-{i}"), *name)),
        );
        ViewSnapshot {
            current_folder: Some(folder.to_string()),
            rows,
        }
    }

    #[test]
    fn test_first_view_is_baseline() {
        let mut tracker = ViewTracker::new();
        assert_eq!(tracker.observe(&view("root", &["a.pdf"])), None);
    }

    #[test]
    fn test_file_count_change_recounts() {
        let mut tracker = ViewTracker::new();
        tracker.observe(&view("root", &["a.pdf"]));

        let (folder, summary) = tracker
            .observe(&view("root", &["a.pdf", "b.zip", "c.mp3"]))
            .unwrap();

        assert_eq!(folder, "root");
        assert_eq!(summary.pdf, 1);
        assert_eq!(summary.audio, 1);
        assert_eq!(summary.other, 1);
    }

    #[test]
    fn test_navigation_is_not_a_change() {
        let mut tracker = ViewTracker::new();
        tracker.observe(&view("root", &["a.pdf"]));

        assert_eq!(tracker.observe(&view("other", &["a.pdf", "b.pdf"])), None);
    }

    #[test]
    fn test_previously_empty_folder_is_not_recounted() {
        let mut tracker = ViewTracker::new();
        tracker.observe(&view("root", &[]));

        assert_eq!(tracker.observe(&view("root", &["a.pdf"])), None);
    }

    #[test]
    fn test_views_without_folder_ignored() {
        let mut tracker = ViewTracker::new();
        tracker.observe(&view("root", &["a.pdf"]));
        assert_eq!(tracker.observe(&ViewSnapshot::default()), None);

        assert!(tracker.observe(&view("root", &["a.pdf", "b.pdf"])).is_some());
    }

    #[tokio::test]
    async fn test_debounce_collapses_burst() {
        let (tx, rx) = mpsc::channel(8);
        for n in 1..=3 {
            tx.send(view("root", &vec!["a.pdf"; n])).await.unwrap();
        }
        drop(tx);

        let mut seen = Vec::new();
        debounce_views(rx, Duration::from_millis(20), |v| seen.push(v.rows.len())).await;

        assert_eq!(seen, vec![4]);
    }

    #[tokio::test]
    async fn test_debounce_separates_quiet_periods() {
        let (tx, rx) = mpsc::channel(8);
        let sender = tokio::spawn(async move {
            tx.send(view("root", &["a.pdf"])).await.unwrap();
            tokio::time::sleep(Duration::from_millis(80)).await;
            tx.send(view("root", &["a.pdf", "b.pdf"])).await.unwrap();
        });

        let mut seen = Vec::new();
        debounce_views(rx, Duration::from_millis(20), |v| seen.push(v.rows.len())).await;
        sender.await.unwrap();

        assert_eq!(seen, vec![2, 3]);
    }

    #[tokio::test]
    async fn test_debounce_delivers_during_steady_stream() {
        let (tx, rx) = mpsc::channel(8);
        let sender = async move {
            for n in 1..=30 {
                tx.send(view("root", &vec!["a.pdf"; n])).await.unwrap();
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        };

        let mut seen = Vec::new();
        tokio::join!(
            sender,
            debounce_views(rx, Duration::from_millis(50), |v| seen.push(v.rows.len())),
        );

        // One delivery per window, not one after the stream ends
        assert!(seen.len() >= 3, "deliveries: {seen:?}");
        assert_eq!(seen.last(), Some(&31));
        assert!(seen.windows(2).all(|w| w[0] < w[1]));
    }
}
