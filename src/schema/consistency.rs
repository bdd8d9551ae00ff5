//! Advisory cross-reference checks.
//!
//! The export does not guarantee referential integrity, so nothing here
//! makes a document invalid. Callers opt in and get a list of findings.

use std::collections::HashSet;
use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::schema::types::Document;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConsistencyIssue {
    DuplicateMoodId { id: i64 },
    DuplicateTagId { id: i64 },
    UnknownMood { entry_id: i64, mood: i64 },
    UnknownTag { entry_id: i64, tag: i64 },
}

impl fmt::Display for ConsistencyIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsistencyIssue::DuplicateMoodId { id } => write!(f, "custom mood id {id} is used more than once"),
            ConsistencyIssue::DuplicateTagId { id } => write!(f, "tag id {id} is used more than once"),
            ConsistencyIssue::UnknownMood { entry_id, mood } => {
                write!(f, "day entry {entry_id} references unknown mood {mood}")
            }
            ConsistencyIssue::UnknownTag { entry_id, tag } => {
                write!(f, "day entry {entry_id} references unknown tag {tag}")
            }
        }
    }
}

/// Ids seen more than once, each reported once, in first-repeat order.
fn duplicates(ids: impl Iterator<Item = i64>) -> (HashSet<i64>, Vec<i64>) {
    let mut seen = HashSet::new();
    let mut repeated = Vec::new();
    for id in ids {
        if !seen.insert(id) && !repeated.contains(&id) {
            repeated.push(id);
        }
    }
    (seen, repeated)
}

pub fn check_references(document: &Document) -> Vec<ConsistencyIssue> {
    let (mood_ids, duplicate_moods) = duplicates(document.custom_moods.iter().map(|m| m.id));
    let (tag_ids, duplicate_tags) = duplicates(document.tags.iter().map(|t| t.id));

    let mut issues: Vec<ConsistencyIssue> = duplicate_moods
        .into_iter()
        .map(|id| ConsistencyIssue::DuplicateMoodId { id })
        .chain(
            duplicate_tags
                .into_iter()
                .map(|id| ConsistencyIssue::DuplicateTagId { id }),
        )
        .collect();

    for entry in &document.day_entries {
        if !mood_ids.contains(&entry.mood) {
            issues.push(ConsistencyIssue::UnknownMood {
                entry_id: entry.id,
                mood: entry.mood,
            });
        }
        for tag in &entry.tags {
            if !tag_ids.contains(tag) {
                issues.push(ConsistencyIssue::UnknownTag {
                    entry_id: entry.id,
                    tag: *tag,
                });
            }
        }
    }

    issues
}
