use crate::error::Result;
use crate::git::RepositoryReader;
use crate::model::{ChangeCount, CommitRecord};
use tracing::debug;

/// Count what `commit` changed relative to its first parent.
///
/// Root commits report nothing rather than being diffed against the empty tree,
/// and merges are only compared with their first parent. Entries whose patch
/// cannot be produced are left out entirely; any other failure aborts.
pub fn count_changes<R: RepositoryReader + ?Sized>(
    reader: &R,
    commit: &CommitRecord,
) -> Result<ChangeCount> {
    let Some(parent_id) = commit.parent_ids.first() else {
        return Ok(ChangeCount::default());
    };

    let parent = reader.find_commit(parent_id)?;
    let entries = reader.diff_trees(&parent.tree_id, &commit.tree_id)?;

    let mut count = ChangeCount::default();
    for entry in entries {
        let stats = match reader.patch_stats(&entry) {
            Ok(stats) => stats,
            Err(e) if e.is_recoverable() => {
                debug!(
                    event = "counter.patch.skipped",
                    commit = %commit.id,
                    error = %e
                );
                continue;
            }
            Err(e) => return Err(e),
        };

        count.additions += stats.additions;
        count.deletions += stats.deletions;

        if let Some(to) = entry.to {
            count.changes += 1;
            count.files.push(to.path);
        }
    }

    Ok(count)
}
