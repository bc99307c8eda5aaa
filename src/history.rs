use crate::counter::count_changes;
use crate::error::Result;
use crate::git::{LogOptions, LogOrder, ReferenceKind, RepositoryReader};
use crate::model::{
    short_id, AggregateStats, AuthorTally, BranchIndex, ChangeCount, CommitRecord, CommitSummary,
};
use indicatif::ProgressBar;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Everything gathered in one pass over the commit log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct History {
    pub commits: Vec<CommitSummary>,
    pub authors: AuthorTally,
    pub stats: AggregateStats,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one visited commit and its change count into the history.
    pub fn record(mut self, commit: &CommitRecord, count: ChangeCount) -> Self {
        self.stats.add(&count);
        *self.authors.entry(commit.author.email.clone()).or_insert(0) += 1;
        self.commits.push(summarize(commit, count));
        self
    }

    /// Look a commit up by its short id.
    pub fn find(&self, short_id: &str) -> Option<&CommitSummary> {
        self.commits.iter().find(|c| c.id == short_id)
    }

    pub fn len(&self) -> usize {
        self.commits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }
}

fn summarize(commit: &CommitRecord, count: ChangeCount) -> CommitSummary {
    let parents: Vec<String> = commit.parent_ids.iter().map(|p| short_id(p)).collect();
    CommitSummary {
        id: short_id(&commit.id),
        message: commit.message.lines().next().unwrap_or("").to_string(),
        author: commit.author.name.clone(),
        email: commit.author.email.clone(),
        timestamp: commit.author.when,
        is_merge: parents.len() > 1,
        parents,
        changes: count.changes,
        files: count.files,
    }
}

pub fn load_commits<R: RepositoryReader + ?Sized>(
    reader: &R,
    limit: i64,
    order: LogOrder,
) -> Result<History> {
    load_commits_with_progress(reader, limit, order, &ProgressBar::hidden())
}

/// Walk the history reachable from `HEAD` and every reference, newest first.
///
/// A `limit` of zero or less visits everything.
pub fn load_commits_with_progress<R: RepositoryReader + ?Sized>(
    reader: &R,
    limit: i64,
    order: LogOrder,
    pb: &ProgressBar,
) -> Result<History> {
    let head = reader.head()?;
    info!(event = "history.load.started", head = %short_id(&head), limit);

    let log = reader.log(&LogOptions {
        from: head,
        all_refs: true,
        order,
    })?;
    let max = usize::try_from(limit)
        .ok()
        .filter(|&n| n > 0)
        .unwrap_or(usize::MAX);

    pb.set_message("Loading commits...");
    let history = log.take(max).try_fold(History::new(), |history, commit| {
        let commit = commit?;
        let count = count_changes(reader, &commit)?;
        pb.inc(1);
        Ok::<_, crate::error::VizError>(history.record(&commit, count))
    })?;
    pb.finish_and_clear();

    info!(
        event = "history.load.completed",
        commits = history.len(),
        authors = history.authors.len(),
        files_changed = history.stats.total_files_changed
    );
    Ok(history)
}

/// Index direct references by the short id of the commit they target.
pub fn load_branches<R: RepositoryReader + ?Sized>(reader: &R) -> Result<BranchIndex> {
    let mut index = BranchIndex::new();
    for reference in reader.references()? {
        if reference.kind != ReferenceKind::Direct {
            continue;
        }
        index.insert(short_id(&reference.target), reference.name);
    }
    info!(event = "history.branches.loaded", targets = index.len());
    Ok(index)
}
