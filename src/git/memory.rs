//! git::memory
//!
//! In-memory repository for deterministic testing.
//!
//! # Design
//!
//! `MemoryRepository` implements [`RepositoryQuery`] over a
//! [`CommitGraph`] arena. Commits get synthetic, well-spread OIDs unless
//! the caller supplies one, so abbreviated ids stay distinct. The working
//! tree status is a plain [`WorktreeStatus`] set by the test.
//!
//! # Example
//!
//! ```
//! use gitmeta::git::{MemoryRepository, RepositoryQuery};
//!
//! let mut repo = MemoryRepository::linear(3);
//! let oids = repo.linear_oids_newest_first();
//! repo.add_tag("v1.0", &oids[2]);
//!
//! assert_eq!(repo.head().unwrap().oid, oids[0]);
//! assert_eq!(repo.list_tags().unwrap().len(), 1);
//! ```

use chrono::{DateTime, TimeZone, Utc};

use super::query::{RepositoryQuery, DEFAULT_ABBREV_LEN};
use super::status::WorktreeStatus;
use super::GitError;
use crate::core::graph::{Commit, CommitGraph};
use crate::core::tags::Tag;
use crate::core::types::{BranchName, Oid, TagName};

/// Base timestamp for [`MemoryRepository::linear`] histories.
const LINEAR_EPOCH: i64 = 1_700_000_000;

/// In-memory repository.
#[derive(Debug, Clone)]
pub struct MemoryRepository {
    graph: CommitGraph,
    head: Option<Oid>,
    branch: Option<BranchName>,
    tags: Vec<Tag>,
    status: WorktreeStatus,
    abbrev_len: usize,
    next_id: u64,
    /// OIDs created by `linear`, oldest first.
    linear: Vec<Oid>,
    /// Error returned by `list_tags`, if set.
    tag_failure: Option<String>,
}

impl Default for MemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn time(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0)
        .single()
        .unwrap_or(DateTime::UNIX_EPOCH)
}

impl MemoryRepository {
    /// Create an empty repository on branch `main` with an unborn HEAD.
    pub fn new() -> Self {
        Self {
            graph: CommitGraph::new(),
            head: None,
            branch: BranchName::new("main").ok(),
            tags: Vec::new(),
            status: WorktreeStatus::default(),
            abbrev_len: DEFAULT_ABBREV_LEN,
            next_id: 0,
            linear: Vec::new(),
            tag_failure: None,
        }
    }

    /// Create a linear history of `len` commits, one minute apart, with
    /// HEAD on the newest.
    pub fn linear(len: usize) -> Self {
        let mut repo = Self::new();
        let mut parent: Option<Oid> = None;
        for i in 0..len {
            let parents: Vec<&Oid> = parent.iter().collect();
            let oid = repo.add_commit(&parents, LINEAR_EPOCH + 60 * i as i64);
            repo.linear.push(oid.clone());
            parent = Some(oid);
        }
        if let Some(tip) = parent {
            repo.set_head(&tip);
        }
        repo
    }

    /// OIDs created by [`linear`](Self::linear), HEAD first.
    pub fn linear_oids_newest_first(&self) -> Vec<Oid> {
        self.linear.iter().rev().cloned().collect()
    }

    /// Use `len`-character abbreviations.
    pub fn with_abbrev_len(mut self, len: usize) -> Self {
        self.abbrev_len = len;
        self
    }

    fn next_oid(&mut self) -> Oid {
        self.next_id += 1;
        let n = self.next_id;
        let hex = format!(
            "{:016x}{:016x}{:08x}",
            n.wrapping_mul(0x9e37_79b9_7f4a_7c15),
            n.wrapping_mul(0xc2b2_ae3d_27d4_eb4f),
            n
        );
        Oid::new(hex).unwrap_or_else(|_| unreachable!("40 hex digits"))
    }

    /// Add a commit with a generated OID and return it.
    pub fn add_commit(&mut self, parents: &[&Oid], commit_secs: i64) -> Oid {
        let oid = self.next_oid();
        self.add_commit_with_oid(oid, parents, commit_secs)
    }

    /// Add a commit with a caller-chosen OID and return it.
    pub fn add_commit_with_oid(&mut self, oid: Oid, parents: &[&Oid], commit_secs: i64) -> Oid {
        let when = time(commit_secs);
        self.graph.insert(Commit {
            oid: oid.clone(),
            parents: parents.iter().map(|p| (*p).clone()).collect(),
            author_name: "Test User".to_string(),
            author_email: "test@example.com".to_string(),
            author_time: when,
            commit_time: when,
            message: format!("commit {}\n", oid.short(7)),
        });
        oid
    }

    /// Remove a commit from the arena, simulating a corrupt object store.
    pub fn forget_commit(&mut self, oid: &Oid) {
        self.graph.remove(oid);
    }

    /// Point HEAD at `oid`.
    pub fn set_head(&mut self, oid: &Oid) {
        self.head = Some(oid.clone());
    }

    /// Set the checked-out branch; `None` detaches HEAD.
    pub fn set_branch(&mut self, branch: Option<BranchName>) {
        self.branch = branch;
    }

    /// Set the working tree status.
    pub fn set_status(&mut self, status: WorktreeStatus) {
        self.status = status;
    }

    /// Add a lightweight tag.
    ///
    /// # Panics
    ///
    /// Panics if `name` is not a valid tag name.
    pub fn add_tag(&mut self, name: &str, target: &Oid) {
        self.tags.push(Tag::lightweight(Self::tag_name(name), target.clone()));
    }

    /// Add an annotated tag created at `created_secs`.
    ///
    /// # Panics
    ///
    /// Panics if `name` is not a valid tag name.
    pub fn add_annotated_tag(&mut self, name: &str, target: &Oid, created_secs: i64, message: &str) {
        self.tags.push(Tag::annotated(
            Self::tag_name(name),
            target.clone(),
            time(created_secs),
            message,
        ));
    }

    fn tag_name(name: &str) -> TagName {
        match TagName::new(name) {
            Ok(tag) => tag,
            Err(e) => panic!("fixture tag name: {e}"),
        }
    }

    /// Make `list_tags` fail with `message`.
    pub fn fail_tag_listing(&mut self, message: &str) {
        self.tag_failure = Some(message.to_string());
    }
}

impl RepositoryQuery for MemoryRepository {
    fn head(&self) -> Result<Commit, GitError> {
        let oid = self.head.as_ref().ok_or_else(|| GitError::RefNotFound {
            refname: "HEAD".to_string(),
        })?;
        self.commit(oid)
    }

    fn branch(&self) -> Result<Option<BranchName>, GitError> {
        Ok(self.branch.clone())
    }

    fn list_tags(&self) -> Result<Vec<Tag>, GitError> {
        match &self.tag_failure {
            Some(message) => Err(GitError::Internal {
                message: message.clone(),
            }),
            None => Ok(self.tags.clone()),
        }
    }

    fn commit(&self, oid: &Oid) -> Result<Commit, GitError> {
        self.graph
            .get(oid)
            .cloned()
            .ok_or_else(|| GitError::ObjectNotFound {
                oid: oid.to_string(),
            })
    }

    fn abbreviate(&self, oid: &Oid) -> Result<String, GitError> {
        Ok(oid.short(self.abbrev_len).to_string())
    }

    fn is_dirty(&self, ignore_untracked: bool) -> Result<bool, GitError> {
        Ok(self.status.is_dirty(ignore_untracked))
    }
}
