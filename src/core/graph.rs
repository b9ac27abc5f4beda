//! core::graph
//!
//! Read-only view of a repository's commit DAG.
//!
//! # Architecture
//!
//! - [`Commit`] records are immutable once read.
//! - [`CommitGraph`] is an arena of commits addressed by [`Oid`]. It backs
//!   the in-memory repository and any caller that wants to hold a subgraph.
//! - [`AncestorWalk`] is the traversal every describe call uses: a lazy,
//!   single-use iterator over HEAD and its ancestors.
//!
//! # Walk order
//!
//! The frontier is a max-heap keyed by committer timestamp, so the newest
//! pending commit is always yielded next. Commits with equal timestamps are
//! yielded in discovery order. All parents are followed, and each commit is
//! yielded at most once, which keeps merge fan-in from double counting.
//! The walk uses an explicit worklist; history depth never touches the
//! call stack. A commit's parents are read only when the caller asks for
//! the next commit, so stopping early reads nothing past the stop.

use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashMap, HashSet};

use chrono::{DateTime, Utc};

use super::types::Oid;
use crate::git::{GitError, RepositoryQuery};

/// A single commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    /// The commit OID
    pub oid: Oid,
    /// Parent OIDs: empty for root commits, several for merges
    pub parents: Vec<Oid>,
    /// Author name
    pub author_name: String,
    /// Author email
    pub author_email: String,
    /// Author timestamp
    pub author_time: DateTime<Utc>,
    /// Committer timestamp; orders the ancestor walk
    pub commit_time: DateTime<Utc>,
    /// Full commit message
    pub message: String,
}

impl Commit {
    /// First line of the commit message.
    pub fn summary(&self) -> &str {
        self.message.lines().next().unwrap_or("")
    }

    /// Whether this commit has no parents.
    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    /// Whether this commit has more than one parent.
    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }
}

/// Arena of commits addressed by OID.
#[derive(Debug, Default, Clone)]
pub struct CommitGraph {
    commits: HashMap<Oid, Commit>,
}

impl CommitGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a commit, replacing any previous record with the same OID.
    pub fn insert(&mut self, commit: Commit) {
        self.commits.insert(commit.oid.clone(), commit);
    }

    /// Remove a commit, returning it if it was present.
    pub fn remove(&mut self, oid: &Oid) -> Option<Commit> {
        self.commits.remove(oid)
    }

    /// Look up a commit.
    pub fn get(&self, oid: &Oid) -> Option<&Commit> {
        self.commits.get(oid)
    }

    /// Check whether a commit is present.
    pub fn contains(&self, oid: &Oid) -> bool {
        self.commits.contains_key(oid)
    }

    /// Number of commits in the arena.
    pub fn len(&self) -> usize {
        self.commits.len()
    }

    /// Whether the arena is empty.
    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }

    /// Iterate over all commits in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = &Commit> {
        self.commits.values()
    }
}

/// A commit waiting in the walk frontier.
struct Pending {
    commit: Commit,
    /// Discovery sequence; lower means discovered earlier.
    seq: u64,
}

impl Pending {
    fn key(&self) -> (DateTime<Utc>, Reverse<u64>) {
        (self.commit.commit_time, Reverse(self.seq))
    }
}

impl PartialEq for Pending {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Pending {}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pending {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

/// Lazy walk over a commit and its ancestors, newest first.
///
/// Yields `Err` at most once: a failed parent lookup ends the walk.
///
/// # Example
///
/// ```
/// use gitmeta::git::{MemoryRepository, RepositoryQuery};
///
/// let repo = MemoryRepository::linear(3);
/// let head = repo.head().unwrap();
/// let visited: Vec<_> = repo
///     .walk_ancestors(&head)
///     .map(|c| c.unwrap().oid)
///     .collect();
/// assert_eq!(visited.len(), 3);
/// assert_eq!(visited[0], head.oid);
/// ```
pub struct AncestorWalk<'a, R: ?Sized> {
    repo: &'a R,
    frontier: BinaryHeap<Pending>,
    seen: HashSet<Oid>,
    next_seq: u64,
    /// Last yielded commit; its parents are loaded on the next call.
    unexpanded: Option<Commit>,
    failed: bool,
}

impl<'a, R: RepositoryQuery + ?Sized> AncestorWalk<'a, R> {
    /// Start a walk at `start`.
    pub fn new(repo: &'a R, start: Commit) -> Self {
        let mut walk = Self {
            repo,
            frontier: BinaryHeap::new(),
            seen: HashSet::new(),
            next_seq: 0,
            unexpanded: None,
            failed: false,
        };
        walk.seen.insert(start.oid.clone());
        walk.push(start);
        walk
    }

    fn push(&mut self, commit: Commit) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.frontier.push(Pending { commit, seq });
    }

    /// Number of commits discovered but not yet yielded.
    pub fn pending(&self) -> usize {
        self.frontier.len()
    }
}

impl<R: RepositoryQuery + ?Sized> Iterator for AncestorWalk<'_, R> {
    type Item = Result<Commit, GitError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        if let Some(previous) = self.unexpanded.take() {
            for parent in &previous.parents {
                if !self.seen.insert(parent.clone()) {
                    continue;
                }
                match self.repo.commit(parent) {
                    Ok(parent_commit) => self.push(parent_commit),
                    Err(e) => {
                        self.failed = true;
                        return Some(Err(e));
                    }
                }
            }
        }

        let Pending { commit, .. } = self.frontier.pop()?;
        self.unexpanded = Some(commit.clone());
        Some(Ok(commit))
    }
}

impl<R: ?Sized> std::fmt::Debug for AncestorWalk<'_, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AncestorWalk")
            .field("pending", &self.frontier.len())
            .field("seen", &self.seen.len())
            .field("failed", &self.failed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::MemoryRepository;

    fn oids(repo: &MemoryRepository, head: &Commit) -> Vec<Oid> {
        repo.walk_ancestors(head).map(|c| c.unwrap().oid).collect()
    }

    mod commit {
        use super::*;

        #[test]
        fn summary_is_first_line() {
            let repo = MemoryRepository::linear(1);
            let mut head = repo.head().unwrap();
            head.message = "Fix parser\n\nLonger body".to_string();
            assert_eq!(head.summary(), "Fix parser");
        }

        #[test]
        fn root_and_merge_flags() {
            let mut repo = MemoryRepository::new();
            let a = repo.add_commit(&[], 100);
            let b = repo.add_commit(&[], 101);
            let m = repo.add_commit(&[&a, &b], 102);
            assert!(repo.commit(&a).unwrap().is_root());
            assert!(repo.commit(&m).unwrap().is_merge());
        }
    }

    mod commit_graph {
        use super::*;

        #[test]
        fn insert_and_lookup() {
            let repo = MemoryRepository::linear(2);
            let mut graph = CommitGraph::new();
            assert!(graph.is_empty());

            let head = repo.head().unwrap();
            graph.insert(head.clone());
            assert_eq!(graph.len(), 1);
            assert!(graph.contains(&head.oid));
            assert_eq!(graph.get(&head.oid), Some(&head));
        }
    }

    mod walk {
        use super::*;

        #[test]
        fn linear_history_newest_first() {
            let repo = MemoryRepository::linear(5);
            let head = repo.head().unwrap();
            let visited = oids(&repo, &head);

            assert_eq!(visited.len(), 5);
            assert_eq!(visited, repo.linear_oids_newest_first());
        }

        #[test]
        fn root_only() {
            let repo = MemoryRepository::linear(1);
            let head = repo.head().unwrap();
            assert_eq!(oids(&repo, &head), vec![head.oid.clone()]);
        }

        #[test]
        fn merge_visits_each_commit_once() {
            // a - b - d
            //  \     /
            //   - c -
            let mut repo = MemoryRepository::new();
            let a = repo.add_commit(&[], 100);
            let b = repo.add_commit(&[&a], 110);
            let c = repo.add_commit(&[&a], 120);
            let d = repo.add_commit(&[&b, &c], 130);
            repo.set_head(&d);

            let head = repo.head().unwrap();
            let visited = oids(&repo, &head);
            assert_eq!(visited, vec![d, c, b, a]);
        }

        #[test]
        fn equal_timestamps_follow_discovery_order() {
            let mut repo = MemoryRepository::new();
            let a = repo.add_commit(&[], 100);
            let b = repo.add_commit(&[&a], 100);
            let c = repo.add_commit(&[&a], 100);
            let m = repo.add_commit(&[&b, &c], 100);
            repo.set_head(&m);

            let head = repo.head().unwrap();
            assert_eq!(oids(&repo, &head), vec![m, b, c, a]);
        }

        #[test]
        fn missing_parent_ends_walk_with_error() {
            let mut repo = MemoryRepository::new();
            let a = repo.add_commit(&[], 100);
            let b = repo.add_commit(&[&a], 110);
            repo.set_head(&b);
            repo.forget_commit(&a);

            let head = repo.head().unwrap();
            let mut walk = repo.walk_ancestors(&head);
            assert_eq!(walk.next().unwrap().unwrap().oid, b);
            assert!(matches!(walk.next(), Some(Err(GitError::ObjectNotFound { .. }))));
            assert!(walk.next().is_none());
        }
    }
}
