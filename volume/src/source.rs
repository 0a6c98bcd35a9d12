//! The paginated search API feeding a session.

use std::future::Future;

use serde::Deserialize;

use crate::classifier::RawEvent;
pub use crate::error::{RequestType, SourceError};

/// One page of activity plus the cursor to resume live updates from.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Batch {
    #[serde(default)]
    pub entries: Vec<RawEvent>,
    #[serde(default)]
    pub next_since: Option<String>,
}

pub trait EventSource {
    /// One-shot historical fetch.
    fn fetch_initial(&self, query: &str) -> impl Future<Output = Result<Batch, SourceError>> + Send;

    /// Entries published after `since`. Failures here are steady-state failures.
    fn poll_updates(
        &self,
        query: &str,
        since: Option<&str>,
    ) -> impl Future<Output = Result<Batch, SourceError>> + Send;
}

/// Newest-first cache of raw entries, capped at twice the page size so a
/// refresh has enough history to avoid gaps.
#[derive(Debug, Clone, Default)]
pub struct RetainedEntries {
    entries: Vec<RawEvent>,
    cap: usize,
}

impl RetainedEntries {
    pub fn new(page_size: usize) -> Self {
        RetainedEntries {
            entries: Vec::new(),
            cap: page_size.saturating_mul(2),
        }
    }

    /// Prepends `newer` and truncates to the cap.
    pub fn prepend(&mut self, newer: &[RawEvent]) {
        let mut merged = Vec::with_capacity((newer.len() + self.entries.len()).min(self.cap));
        merged.extend(newer.iter().chain(self.entries.iter()).take(self.cap).cloned());
        self.entries = merged;
    }

    pub fn entries(&self) -> &[RawEvent] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_parses_cursor() {
        let batch: Batch = serde_json::from_str(
            r#"{"entries": [{"verbs": [], "object": {}}], "nextSince": "1709564400123"}"#,
        )
        .unwrap();
        assert_eq!(batch.entries.len(), 1);
        assert_eq!(batch.next_since.as_deref(), Some("1709564400123"));
    }

    #[test]
    fn retained_entries_keep_newest_first_up_to_cap() {
        let mut retained = RetainedEntries::new(2);
        let old: Vec<RawEvent> = (0..3)
            .map(|i| RawEvent::post(format!("2024-03-04T1{i}:00:00Z")))
            .collect();
        retained.prepend(&old);
        assert_eq!(retained.len(), 3);

        let new = vec![
            RawEvent::post("2024-03-05T00:00:00Z"),
            RawEvent::post("2024-03-05T01:00:00Z"),
        ];
        retained.prepend(&new);
        assert_eq!(retained.len(), 4);
        assert_eq!(retained.entries()[0], new[0]);
        assert_eq!(retained.entries()[2], old[0]);
    }
}
