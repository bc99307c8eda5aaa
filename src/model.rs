use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const SCHEMA_VERSION: u32 = 1;

/// Length of the abbreviated commit ids shown in every view.
pub const SHORT_ID_LEN: usize = 7;

/// Abbreviate a full hex id, returning it unchanged when it is already shorter.
pub fn short_id(id: &str) -> String {
    id.get(..SHORT_ID_LEN).unwrap_or(id).to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    pub name: String,
    pub email: String,
    pub when: DateTime<FixedOffset>,
}

/// A commit as handed out by a repository reader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    pub id: String,
    pub message: String,
    pub author: Signature,
    pub parent_ids: Vec<String>,
    pub tree_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitSummary {
    pub id: String,
    pub message: String,
    pub author: String,
    pub email: String,
    pub timestamp: DateTime<FixedOffset>,
    pub parents: Vec<String>,
    pub changes: usize,
    pub files: Vec<String>,
    pub is_merge: bool,
}

/// Per-commit result of diffing against the first parent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeCount {
    pub changes: usize,
    pub files: Vec<String>,
    pub additions: usize,
    pub deletions: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineStats {
    pub additions: usize,
    pub deletions: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateStats {
    pub total_files_changed: usize,
    pub total_additions: usize,
    pub total_deletions: usize,
}

impl AggregateStats {
    pub fn add(&mut self, count: &ChangeCount) {
        self.total_files_changed += count.changes;
        self.total_additions += count.additions;
        self.total_deletions += count.deletions;
    }
}

/// Commit counts keyed by author email.
pub type AuthorTally = HashMap<String, usize>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorCount {
    pub email: String,
    pub count: usize,
}

/// Reference short names keyed by the short id of the commit they point at.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BranchIndex {
    entries: HashMap<String, Vec<String>>,
}

impl BranchIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, short_id: String, name: String) {
        self.entries.entry(short_id).or_default().push(name);
    }

    /// Names pointing at `short_id`, in the order the reference store listed them.
    pub fn names(&self, short_id: &str) -> &[String] {
        self.entries.get(short_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, short_id: &str) -> bool {
        self.entries.contains_key(short_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyBucket {
    pub week: String,
    pub commit_count: usize,
}
