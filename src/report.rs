use crate::error::Result;
use crate::history::History;
use crate::model::{
    AuthorCount, AuthorTally, BranchIndex, CommitSummary, WeeklyBucket, SCHEMA_VERSION,
};
use chrono::{DateTime, Datelike, TimeZone};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Number of authors listed in the statistics panel.
pub const TOP_AUTHORS: usize = 5;

/// The complete model handed to the renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub version: u32,
    pub repository_path: String,
    pub history: History,
    pub branches: BranchIndex,
    pub top_authors: Vec<AuthorCount>,
    pub weeks: Vec<WeeklyBucket>,
}

impl Report {
    pub fn new(repository_path: String, history: History, branches: BranchIndex) -> Self {
        let top_authors = top_authors(&history.authors, TOP_AUTHORS);
        let weeks = weekly_buckets(&history.commits);
        Self {
            version: SCHEMA_VERSION,
            repository_path,
            history,
            branches,
            top_authors,
            weeks,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Authors by descending commit count; equal counts are ordered by email.
pub fn top_authors(tally: &AuthorTally, n: usize) -> Vec<AuthorCount> {
    let mut authors: Vec<AuthorCount> = tally
        .iter()
        .map(|(email, &count)| AuthorCount {
            email: email.clone(),
            count,
        })
        .collect();
    authors.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.email.cmp(&b.email)));
    authors.truncate(n);
    authors
}

/// ISO-8601 week key such as `2024-W01`.
///
/// Both parts are zero-padded so that keys sort chronologically as strings.
pub fn week_key<Tz: TimeZone>(timestamp: &DateTime<Tz>) -> String {
    let week = timestamp.iso_week();
    format!("{:04}-W{:02}", week.year(), week.week())
}

pub fn weekly_buckets(commits: &[CommitSummary]) -> Vec<WeeklyBucket> {
    let mut week_map: HashMap<String, usize> = HashMap::new();
    for commit in commits {
        *week_map.entry(week_key(&commit.timestamp)).or_insert(0) += 1;
    }

    let mut buckets: Vec<_> = week_map
        .into_iter()
        .map(|(week, commit_count)| WeeklyBucket { week, commit_count })
        .collect();
    buckets.sort_by(|a, b| a.week.cmp(&b.week));
    buckets
}
