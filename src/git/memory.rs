use super::{
    CommitIter, EntryChange, EntryFile, LogOptions, LogOrder, ReferenceKind, ReferenceRecord,
    RepositoryReader,
};
use crate::error::{Result, VizError};
use crate::model::{CommitRecord, LineStats, Signature};
use chrono::{DateTime, FixedOffset};
use similar::{ChangeTag, TextDiff};
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

/// Forty-character id made of a single repeated character.
pub(crate) fn oid(c: char) -> String {
    c.to_string().repeat(40)
}

pub(crate) fn at(seconds: i64) -> DateTime<FixedOffset> {
    DateTime::from_timestamp(seconds, 0)
        .expect("valid timestamp")
        .with_timezone(&FixedOffset::east_opt(0).expect("utc offset"))
}

/// Reader over a hand-built history.
#[derive(Default)]
pub(crate) struct MemoryRepo {
    head: Option<String>,
    commits: HashMap<String, CommitRecord>,
    trees: HashMap<String, BTreeMap<String, String>>,
    blobs: HashMap<String, String>,
    references: Vec<ReferenceRecord>,
    broken_patches: HashSet<String>,
    broken_trees: HashSet<String>,
    broken_refs: bool,
}

impl MemoryRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a commit whose tree holds exactly `files`. The newest commit added becomes `HEAD`.
    pub fn commit(
        &mut self,
        id: &str,
        message: &str,
        email: &str,
        when: DateTime<FixedOffset>,
        parents: &[&str],
        files: &[(&str, &str)],
    ) -> String {
        let tree_id = format!("tree-{id}");
        let mut tree = BTreeMap::new();
        for (path, content) in files {
            let blob_id = format!("{tree_id}:{path}");
            self.blobs.insert(blob_id.clone(), content.to_string());
            tree.insert(path.to_string(), blob_id);
        }
        self.trees.insert(tree_id.clone(), tree);

        let name = email.split('@').next().unwrap_or(email).to_string();
        self.commits.insert(
            id.to_string(),
            CommitRecord {
                id: id.to_string(),
                message: message.to_string(),
                author: Signature {
                    name,
                    email: email.to_string(),
                    when,
                },
                parent_ids: parents.iter().map(|p| p.to_string()).collect(),
                tree_id,
            },
        );
        self.head = Some(id.to_string());
        id.to_string()
    }

    pub fn set_head(&mut self, id: &str) {
        self.head = Some(id.to_string());
    }

    pub fn clear_head(&mut self) {
        self.head = None;
    }

    pub fn reference(&mut self, name: &str, target: &str) {
        self.references.push(ReferenceRecord {
            name: name.to_string(),
            target: target.to_string(),
            kind: ReferenceKind::Direct,
        });
    }

    pub fn symbolic_reference(&mut self, name: &str, referent: &str) {
        self.references.push(ReferenceRecord {
            name: name.to_string(),
            target: referent.to_string(),
            kind: ReferenceKind::Symbolic,
        });
    }

    pub fn break_patch(&mut self, path: &str) {
        self.broken_patches.insert(path.to_string());
    }

    pub fn break_tree_of(&mut self, commit_id: &str) {
        self.broken_trees.insert(format!("tree-{commit_id}"));
    }

    pub fn break_references(&mut self) {
        self.broken_refs = true;
    }

    fn blob(&self, file: Option<&EntryFile>) -> Result<String> {
        match file {
            None => Ok(String::new()),
            Some(file) => self
                .blobs
                .get(&file.id)
                .cloned()
                .ok_or_else(|| VizError::Patch(format!("missing blob {}", file.id))),
        }
    }
}

impl RepositoryReader for MemoryRepo {
    fn head(&self) -> Result<String> {
        self.head
            .clone()
            .ok_or_else(|| VizError::HeadResolution("reference HEAD is unborn".to_string()))
    }

    fn log(&self, options: &LogOptions) -> Result<CommitIter<'_>> {
        if !self.commits.contains_key(&options.from) {
            return Err(VizError::LogTraversal(format!(
                "object {} not found",
                options.from
            )));
        }

        let mut queue = VecDeque::from([options.from.clone()]);
        if options.all_refs {
            queue.extend(
                self.references
                    .iter()
                    .filter(|r| r.kind == ReferenceKind::Direct)
                    .map(|r| r.target.clone()),
            );
        }

        let mut seen = HashSet::new();
        let mut visited = Vec::new();
        while let Some(id) = queue.pop_front() {
            if !seen.insert(id.clone()) {
                continue;
            }
            let commit = self
                .commits
                .get(&id)
                .ok_or_else(|| VizError::LogTraversal(format!("object {id} not found")))?;
            queue.extend(commit.parent_ids.iter().cloned());
            visited.push(commit.clone());
        }

        if options.order == LogOrder::CommitterTime {
            visited.sort_by(|a, b| b.author.when.cmp(&a.author.when));
        }
        Ok(Box::new(visited.into_iter().map(Ok)))
    }

    fn find_commit(&self, id: &str) -> Result<CommitRecord> {
        self.commits
            .get(id)
            .cloned()
            .ok_or_else(|| VizError::ChangeComputation(format!("object {id} not found")))
    }

    fn diff_trees(&self, old_tree: &str, new_tree: &str) -> Result<Vec<EntryChange>> {
        let load = |id: &str| {
            if self.broken_trees.contains(id) {
                return Err(VizError::ChangeComputation(format!("tree {id} is corrupt")));
            }
            self.trees
                .get(id)
                .ok_or_else(|| VizError::ChangeComputation(format!("tree {id} not found")))
        };
        let old = load(old_tree)?;
        let new = load(new_tree)?;
        let file = |path: &str, id: &str| EntryFile {
            path: path.to_string(),
            id: id.to_string(),
        };

        let mut changes = Vec::new();
        for (path, old_id) in old {
            match new.get(path) {
                None => changes.push(EntryChange {
                    from: Some(file(path, old_id)),
                    to: None,
                }),
                Some(new_id) if self.blobs.get(old_id) != self.blobs.get(new_id) => {
                    changes.push(EntryChange {
                        from: Some(file(path, old_id)),
                        to: Some(file(path, new_id)),
                    })
                }
                Some(_) => {}
            }
        }
        for (path, new_id) in new {
            if !old.contains_key(path) {
                changes.push(EntryChange {
                    from: None,
                    to: Some(file(path, new_id)),
                });
            }
        }
        Ok(changes)
    }

    fn patch_stats(&self, change: &EntryChange) -> Result<LineStats> {
        let path = change
            .to
            .as_ref()
            .or(change.from.as_ref())
            .map(|f| f.path.as_str())
            .unwrap_or_default();
        if self.broken_patches.contains(path) {
            return Err(VizError::Patch(format!("cannot generate patch for {path}")));
        }

        let old = self.blob(change.from.as_ref())?;
        let new = self.blob(change.to.as_ref())?;
        let mut stats = LineStats::default();
        for line in TextDiff::from_lines(old.as_str(), new.as_str()).iter_all_changes() {
            match line.tag() {
                ChangeTag::Insert => stats.additions += 1,
                ChangeTag::Delete => stats.deletions += 1,
                ChangeTag::Equal => {}
            }
        }
        Ok(stats)
    }

    fn references(&self) -> Result<Vec<ReferenceRecord>> {
        if self.broken_refs {
            return Err(VizError::ReferenceEnumeration(
                "packed-refs is unreadable".to_string(),
            ));
        }
        Ok(self.references.clone())
    }
}
