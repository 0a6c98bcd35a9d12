//! Normalises raw activity events into countable entries.

use chrono::DateTime;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Activity verb marking an original post; every other verb is ignored.
pub const POST_VERB: &str = "http://activitystrea.ms/schema/1.0/post";

/// An activity as delivered by the search API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawEvent {
    #[serde(default)]
    pub verbs: Vec<String>,
    #[serde(default)]
    pub object: RawObject,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawObject {
    /// W3CDTF publish time, e.g. `2024-03-04T15:07:42Z`.
    pub published: Option<String>,
}

impl RawEvent {
    pub fn post(published: impl Into<String>) -> Self {
        RawEvent {
            verbs: vec![POST_VERB.to_owned()],
            object: RawObject {
                published: Some(published.into()),
            },
        }
    }

    pub fn is_post(&self) -> bool {
        self.verbs.first().is_some_and(|verb| verb == POST_VERB)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifiedEntry {
    /// Publish time, epoch seconds.
    pub timestamp: i64,
}

/// Keeps posts only and converts their publish time to epoch seconds.
///
/// Relative order is preserved. Posts with a missing or unparseable publish
/// time are dropped individually.
pub fn classify(events: &[RawEvent]) -> Vec<ClassifiedEntry> {
    events
        .iter()
        .filter(|event| event.is_post())
        .filter_map(|event| {
            let published = event.object.published.as_deref()?;
            match DateTime::parse_from_rfc3339(published) {
                Ok(dt) => Some(ClassifiedEntry {
                    timestamp: dt.timestamp(),
                }),
                Err(e) => {
                    debug!("Dropping post with bad publish time {published:?}: {e}");
                    None
                }
            }
        })
        .collect()
}
