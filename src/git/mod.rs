//! Access to repository history.
//!
//! Everything above this module talks to a [`RepositoryReader`], so the
//! aggregation logic runs the same against an on-disk repository and the
//! in-memory one used by the unit tests.

pub mod repo;

#[cfg(test)]
pub(crate) mod memory;

pub use repo::GixRepository;

use crate::error::Result;
use crate::model::{CommitRecord, LineStats};

/// Order in which [`RepositoryReader::log`] yields commits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogOrder {
    /// Newest committer time first.
    #[default]
    CommitterTime,
    /// Breadth-first along the commit graph.
    Graph,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogOptions {
    /// Full id of the commit the walk starts at.
    pub from: String,
    /// Also start from every reference that points at a commit.
    pub all_refs: bool,
    pub order: LogOrder,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryFile {
    pub path: String,
    pub id: String,
}

/// One changed file between two trees. `from` is absent for additions, `to` for deletions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryChange {
    pub from: Option<EntryFile>,
    pub to: Option<EntryFile>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    Direct,
    Symbolic,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceRecord {
    /// Short name, e.g. `main`, `origin/main` or `v1.0`.
    pub name: String,
    /// Full target id for direct references, the referent's name for symbolic ones.
    pub target: String,
    pub kind: ReferenceKind,
}

pub type CommitIter<'a> = Box<dyn Iterator<Item = Result<CommitRecord>> + 'a>;

pub trait RepositoryReader {
    /// Full id of the commit `HEAD` resolves to.
    fn head(&self) -> Result<String>;

    /// Every commit reachable from the configured starting points, each exactly once.
    fn log(&self, options: &LogOptions) -> Result<CommitIter<'_>>;

    fn find_commit(&self, id: &str) -> Result<CommitRecord>;

    /// File-level changes turning `old_tree` into `new_tree`.
    fn diff_trees(&self, old_tree: &str, new_tree: &str) -> Result<Vec<EntryChange>>;

    /// Line statistics for a single change. Failures here are [`crate::error::VizError::Patch`].
    fn patch_stats(&self, change: &EntryChange) -> Result<LineStats>;

    fn references(&self) -> Result<Vec<ReferenceRecord>>;
}
