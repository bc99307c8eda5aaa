use super::{
    CommitIter, EntryChange, EntryFile, LogOptions, LogOrder, ReferenceKind, ReferenceRecord,
    RepositoryReader,
};
use crate::error::{Result, VizError};
use crate::model::{CommitRecord, LineStats, Signature};
use chrono::{DateTime, FixedOffset};
use gix::object::tree::diff::ChangeDetached;
use gix::revision::walk::Sorting;
use gix::traverse::commit::simple::CommitTimeOrder;
use gix::{ObjectId, Repository};
use similar::{ChangeTag, TextDiff};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Blobs with a NUL byte in this many leading bytes are treated as binary.
const BINARY_PROBE_LEN: usize = 8192;

pub struct GixRepository {
    repo: Repository,
    path: PathBuf,
}

impl GixRepository {
    /// Open the repository at exactly `path`; parent directories are not searched.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo_path = path.as_ref().to_path_buf();
        let repo = gix::open(&repo_path).map_err(|e| {
            VizError::RepositoryOpen(format!("{}: {e}", repo_path.display()))
        })?;
        let path = repo.workdir().unwrap_or_else(|| repo.path()).to_path_buf();
        debug!(event = "git.repository.opened", path = %path.display());

        Ok(Self { repo, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Commit ids of every direct reference that peels to a commit.
    fn reference_tips(&self) -> Result<Vec<ObjectId>> {
        let platform = self
            .repo
            .references()
            .map_err(|e| VizError::LogTraversal(e.to_string()))?;
        let iter = platform
            .all()
            .map_err(|e| VizError::LogTraversal(e.to_string()))?;

        let mut tips = Vec::new();
        for reference in iter {
            let mut reference = reference.map_err(|e| VizError::LogTraversal(e.to_string()))?;
            if reference.try_id().is_none() {
                continue;
            }
            match reference.peel_to_commit() {
                Ok(commit) => tips.push(commit.id),
                Err(e) => debug!(
                    event = "git.log.tip_skipped",
                    reference = %reference.name().as_bstr(),
                    error = %e
                ),
            }
        }
        Ok(tips)
    }

    fn blob_text(&self, file: Option<&EntryFile>) -> Result<Option<String>> {
        let Some(file) = file else {
            return Ok(Some(String::new()));
        };
        let id = parse_id(&file.id).map_err(VizError::Patch)?;
        let object = self
            .repo
            .find_object(id)
            .map_err(|e| VizError::Patch(format!("{}: {e}", file.path)))?;
        if is_binary(&object.data) {
            return Ok(None);
        }
        Ok(Some(String::from_utf8_lossy(&object.data).into_owned()))
    }
}

impl RepositoryReader for GixRepository {
    fn head(&self) -> Result<String> {
        let id = self
            .repo
            .head_id()
            .map_err(|e| VizError::HeadResolution(e.to_string()))?;
        Ok(id.to_string())
    }

    fn log(&self, options: &LogOptions) -> Result<CommitIter<'_>> {
        let mut tips = vec![parse_id(&options.from).map_err(VizError::LogTraversal)?];
        if options.all_refs {
            tips.extend(self.reference_tips()?);
        }

        let sorting = match options.order {
            LogOrder::CommitterTime => Sorting::ByCommitTime(CommitTimeOrder::NewestFirst),
            LogOrder::Graph => Sorting::BreadthFirst,
        };

        let walk = self
            .repo
            .rev_walk(tips)
            .sorting(sorting)
            .all()
            .map_err(|e| VizError::LogTraversal(e.to_string()))?;

        Ok(Box::new(walk.map(|info| {
            let info = info.map_err(|e| VizError::LogTraversal(e.to_string()))?;
            let commit = info
                .object()
                .map_err(|e| VizError::LogTraversal(e.to_string()))?;
            commit_record(&commit).map_err(VizError::LogTraversal)
        })))
    }

    fn find_commit(&self, id: &str) -> Result<CommitRecord> {
        let oid = parse_id(id).map_err(VizError::ChangeComputation)?;
        let commit = self
            .repo
            .find_commit(oid)
            .map_err(|e| VizError::ChangeComputation(e.to_string()))?;
        commit_record(&commit).map_err(VizError::ChangeComputation)
    }

    fn diff_trees(&self, old_tree: &str, new_tree: &str) -> Result<Vec<EntryChange>> {
        let load = |id: &str| {
            let oid = parse_id(id).map_err(VizError::ChangeComputation)?;
            self.repo
                .find_tree(oid)
                .map_err(|e| VizError::ChangeComputation(e.to_string()))
        };
        let old_tree = load(old_tree)?;
        let new_tree = load(new_tree)?;

        // A rename is a deletion plus an addition, never a single rewrite.
        let options = gix::diff::Options::default().with_rewrites(None);
        let changes: Vec<ChangeDetached> = self
            .repo
            .diff_tree_to_tree(Some(&old_tree), Some(&new_tree), options)
            .map_err(|e| VizError::ChangeComputation(e.to_string()))?;

        Ok(changes.into_iter().filter_map(entry_change).collect())
    }

    fn patch_stats(&self, change: &EntryChange) -> Result<LineStats> {
        let old = self.blob_text(change.from.as_ref())?;
        let new = self.blob_text(change.to.as_ref())?;

        match (old, new) {
            (Some(old), Some(new)) => Ok(line_stats(&old, &new)),
            _ => Ok(LineStats::default()),
        }
    }

    fn references(&self) -> Result<Vec<ReferenceRecord>> {
        let platform = self
            .repo
            .references()
            .map_err(|e| VizError::ReferenceEnumeration(e.to_string()))?;
        let iter = platform
            .all()
            .map_err(|e| VizError::ReferenceEnumeration(e.to_string()))?;

        let mut records = Vec::new();
        for reference in iter {
            let reference =
                reference.map_err(|e| VizError::ReferenceEnumeration(e.to_string()))?;
            let name = reference.name().shorten().to_string();
            let record = match reference.try_id() {
                Some(id) => ReferenceRecord {
                    name,
                    target: id.to_string(),
                    kind: ReferenceKind::Direct,
                },
                None => ReferenceRecord {
                    name,
                    target: reference
                        .target()
                        .try_name()
                        .map(|n| n.as_bstr().to_string())
                        .unwrap_or_default(),
                    kind: ReferenceKind::Symbolic,
                },
            };
            records.push(record);
        }
        Ok(records)
    }
}

fn parse_id(id: &str) -> std::result::Result<ObjectId, String> {
    ObjectId::from_hex(id.as_bytes()).map_err(|e| format!("Invalid object id '{id}': {e}"))
}

fn commit_record(commit: &gix::Commit<'_>) -> std::result::Result<CommitRecord, String> {
    let id = commit.id().to_string();
    let author = commit.author().map_err(|e| format!("{id}: {e}"))?.trim();
    let time = author.time().map_err(|e| format!("{id}: {e}"))?;
    let tree_id = commit.tree_id().map_err(|e| format!("{id}: {e}"))?;

    Ok(CommitRecord {
        message: commit.message_raw_sloppy().to_string(),
        author: Signature {
            name: author.name.to_string(),
            email: author.email.to_string(),
            when: to_datetime(time.seconds, time.offset)
                .ok_or_else(|| format!("{id}: invalid timestamp {}", time.seconds))?,
        },
        parent_ids: commit.parent_ids().map(|p| p.to_string()).collect(),
        tree_id: tree_id.to_string(),
        id,
    })
}

fn to_datetime(seconds: i64, offset: i32) -> Option<DateTime<FixedOffset>> {
    let offset = FixedOffset::east_opt(offset)?;
    DateTime::from_timestamp(seconds, 0).map(|utc| utc.with_timezone(&offset))
}

/// Convert a tree-diff record, dropping entries for directories.
fn entry_change(change: ChangeDetached) -> Option<EntryChange> {
    let file = |location: gix::bstr::BString, id: ObjectId| EntryFile {
        path: location.to_string(),
        id: id.to_string(),
    };

    match change {
        ChangeDetached::Addition {
            location,
            entry_mode,
            id,
            ..
        } => (!entry_mode.is_tree()).then(|| EntryChange {
            from: None,
            to: Some(file(location, id)),
        }),
        ChangeDetached::Deletion {
            location,
            entry_mode,
            id,
            ..
        } => (!entry_mode.is_tree()).then(|| EntryChange {
            from: Some(file(location, id)),
            to: None,
        }),
        ChangeDetached::Modification {
            location,
            previous_id,
            entry_mode,
            id,
            ..
        } => (!entry_mode.is_tree()).then(|| EntryChange {
            from: Some(file(location.clone(), previous_id)),
            to: Some(file(location, id)),
        }),
        ChangeDetached::Rewrite {
            source_location,
            source_id,
            entry_mode,
            id,
            location,
            ..
        } => (!entry_mode.is_tree()).then(|| EntryChange {
            from: Some(file(source_location, source_id)),
            to: Some(file(location, id)),
        }),
    }
}

fn is_binary(data: &[u8]) -> bool {
    data.iter().take(BINARY_PROBE_LEN).any(|&b| b == 0)
}

fn line_stats(old: &str, new: &str) -> LineStats {
    let diff = TextDiff::from_lines(old, new);
    let mut stats = LineStats::default();
    for change in diff.iter_all_changes() {
        match change.tag() {
            ChangeTag::Insert => stats.additions += 1,
            ChangeTag::Delete => stats.deletions += 1,
            ChangeTag::Equal => {}
        }
    }
    stats
}
