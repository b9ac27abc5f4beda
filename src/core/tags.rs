//! core::tags
//!
//! Tag index: which tags point at which commit.
//!
//! # Overview
//!
//! The index is built once per repository snapshot from
//! [`RepositoryQuery::list_tags`]. Tags arrive already dereferenced to a
//! commit; the index groups them by that commit. Per-commit lists are
//! sorted by name so that the index is deterministic for a fixed
//! repository state. Choosing among several tags on one commit is a
//! separate, explicit policy ([`TagPreference`]) applied at query time.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::types::{Oid, TagName};
use crate::git::{GitError, RepositoryQuery};

/// A tag resolved to the commit it names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    /// Tag name without the `refs/tags/` prefix
    pub name: TagName,
    /// The commit the tag ultimately points at
    pub target: Oid,
    /// Whether the ref points at a tag object (vs. a lightweight ref)
    pub annotated: bool,
    /// Annotation message (annotated tags only)
    pub message: Option<String>,
    /// Tagger timestamp (annotated tags only)
    pub created: Option<DateTime<Utc>>,
}

impl Tag {
    /// A lightweight tag: a plain ref to a commit.
    pub fn lightweight(name: TagName, target: Oid) -> Self {
        Self {
            name,
            target,
            annotated: false,
            message: None,
            created: None,
        }
    }

    /// An annotated tag with its tagger time and message.
    pub fn annotated(
        name: TagName,
        target: Oid,
        created: DateTime<Utc>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name,
            target,
            annotated: true,
            message: Some(message.into()),
            created: Some(created),
        }
    }
}

/// Which tags take part in describe.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TagFilter {
    /// Lightweight and annotated tags.
    #[default]
    All,
    /// Annotated tags only (plain `git describe` behaviour).
    Annotated,
}

impl TagFilter {
    fn accepts(self, tag: &Tag) -> bool {
        match self {
            TagFilter::All => true,
            TagFilter::Annotated => tag.annotated,
        }
    }
}

impl FromStr for TagFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(TagFilter::All),
            "annotated" => Ok(TagFilter::Annotated),
            other => Err(format!(
                "unknown tag filter '{other}', must be one of: all, annotated"
            )),
        }
    }
}

/// Policy for picking one tag when several point at the same commit.
///
/// # Example
///
/// ```
/// use gitmeta::core::tags::TagPreference;
///
/// assert_eq!("most-recent".parse(), Ok(TagPreference::MostRecent));
/// assert_eq!("name".parse(), Ok(TagPreference::NameOrder));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TagPreference {
    /// Latest tagger time wins. Tags without a tagger time (lightweight
    /// tags) rank below those with one; remaining ties go to the
    /// lexicographically last name.
    #[default]
    #[serde(rename = "most-recent")]
    MostRecent,
    /// Lexicographically last name wins.
    #[serde(rename = "name")]
    NameOrder,
}

impl TagPreference {
    /// Pick the preferred tag from a candidate list.
    pub fn pick<'t>(self, candidates: impl IntoIterator<Item = &'t Tag>) -> Option<&'t Tag> {
        match self {
            TagPreference::MostRecent => candidates
                .into_iter()
                .max_by(|a, b| a.created.cmp(&b.created).then_with(|| a.name.cmp(&b.name))),
            TagPreference::NameOrder => candidates.into_iter().max_by(|a, b| a.name.cmp(&b.name)),
        }
    }
}

impl FromStr for TagPreference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "most-recent" => Ok(TagPreference::MostRecent),
            "name" => Ok(TagPreference::NameOrder),
            other => Err(format!(
                "unknown tag preference '{other}', must be one of: most-recent, name"
            )),
        }
    }
}

impl fmt::Display for TagPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagPreference::MostRecent => f.write_str("most-recent"),
            TagPreference::NameOrder => f.write_str("name"),
        }
    }
}

/// Mapping from commit to the tags that point at it.
#[derive(Debug, Default, Clone)]
pub struct TagIndex {
    by_commit: HashMap<Oid, Vec<Tag>>,
    len: usize,
}

impl TagIndex {
    /// Build an index over every tag in the repository.
    ///
    /// # Errors
    ///
    /// Returns the repository's [`GitError`] if tag refs cannot be resolved.
    pub fn build<R: RepositoryQuery>(repo: &R) -> Result<Self, GitError> {
        Self::build_filtered(repo, TagFilter::All)
    }

    /// Build an index over the tags accepted by `filter`.
    pub fn build_filtered<R: RepositoryQuery>(
        repo: &R,
        filter: TagFilter,
    ) -> Result<Self, GitError> {
        let tags = repo.list_tags()?;
        let total = tags.len();
        let index = Self::from_tags(tags.into_iter().filter(|t| filter.accepts(t)));

        tracing::debug!(
            total,
            indexed = index.len(),
            commits = index.by_commit.len(),
            ?filter,
            "built tag index"
        );
        Ok(index)
    }

    /// Build an index from already-resolved tags.
    pub fn from_tags(tags: impl IntoIterator<Item = Tag>) -> Self {
        let mut by_commit: HashMap<Oid, Vec<Tag>> = HashMap::new();
        let mut len = 0;
        for tag in tags {
            by_commit.entry(tag.target.clone()).or_default().push(tag);
            len += 1;
        }
        for list in by_commit.values_mut() {
            list.sort_by(|a, b| a.name.cmp(&b.name));
        }
        Self { by_commit, len }
    }

    /// Tags pointing at `oid`, sorted by name. Empty if none.
    pub fn tags_for(&self, oid: &Oid) -> &[Tag] {
        self.by_commit.get(oid).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether `oid` carries at least one tag.
    pub fn is_tagged(&self, oid: &Oid) -> bool {
        self.by_commit.contains_key(oid)
    }

    /// The preferred tag on `oid`, if any.
    pub fn best_for(&self, oid: &Oid, preference: TagPreference) -> Option<&Tag> {
        preference.pick(self.tags_for(oid))
    }

    /// Total number of indexed tags.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether no tags were indexed.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::MemoryRepository;
    use chrono::TimeZone;

    fn tag_name(name: &str) -> TagName {
        TagName::new(name).unwrap()
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn oid() -> Oid {
        Oid::new("deadbeefdeadbeefdeadbeefdeadbeefdeadbeef").unwrap()
    }

    mod index {
        use super::*;

        #[test]
        fn groups_tags_by_commit() {
            let mut repo = MemoryRepository::linear(3);
            let oids = repo.linear_oids_newest_first();
            repo.add_tag("v1.0", &oids[2]);
            repo.add_tag("v1.1", &oids[0]);
            repo.add_tag("latest", &oids[0]);

            let index = TagIndex::build(&repo).unwrap();
            assert_eq!(index.len(), 3);
            assert!(index.is_tagged(&oids[0]));
            assert!(!index.is_tagged(&oids[1]));

            let names: Vec<_> = index.tags_for(&oids[0]).iter().map(|t| t.name.as_str()).collect();
            assert_eq!(names, vec!["latest", "v1.1"]);
        }

        #[test]
        fn empty_repository_has_empty_index() {
            let repo = MemoryRepository::linear(2);
            let index = TagIndex::build(&repo).unwrap();
            assert!(index.is_empty());
            assert!(index.tags_for(&repo.head().unwrap().oid).is_empty());
        }

        #[test]
        fn annotated_filter_drops_lightweight() {
            let mut repo = MemoryRepository::linear(2);
            let oids = repo.linear_oids_newest_first();
            repo.add_tag("light", &oids[0]);
            repo.add_annotated_tag("v1.0", &oids[1], 500, "release 1.0");

            let index = TagIndex::build_filtered(&repo, TagFilter::Annotated).unwrap();
            assert_eq!(index.len(), 1);
            assert!(!index.is_tagged(&oids[0]));
            assert!(index.is_tagged(&oids[1]));
        }

        #[test]
        fn list_failure_propagates() {
            let mut repo = MemoryRepository::linear(1);
            repo.fail_tag_listing("packed-refs is corrupt");
            assert!(matches!(
                TagIndex::build(&repo),
                Err(GitError::Internal { .. })
            ));
        }
    }

    mod preference {
        use super::*;

        #[test]
        fn most_recent_prefers_newer_annotation() {
            let tags = vec![
                Tag::annotated(tag_name("z-old"), oid(), at(100), "old"),
                Tag::annotated(tag_name("a-new"), oid(), at(200), "new"),
            ];
            let index = TagIndex::from_tags(tags);
            let best = index.best_for(&oid(), TagPreference::MostRecent).unwrap();
            assert_eq!(best.name.as_str(), "a-new");
        }

        #[test]
        fn most_recent_ranks_lightweight_below_annotated() {
            let tags = vec![
                Tag::lightweight(tag_name("zzz"), oid()),
                Tag::annotated(tag_name("v1.0"), oid(), at(100), "release"),
            ];
            let index = TagIndex::from_tags(tags);
            let best = index.best_for(&oid(), TagPreference::MostRecent).unwrap();
            assert_eq!(best.name.as_str(), "v1.0");
        }

        #[test]
        fn most_recent_falls_back_to_name() {
            let tags = vec![
                Tag::lightweight(tag_name("v1.0"), oid()),
                Tag::lightweight(tag_name("v1.1"), oid()),
            ];
            let index = TagIndex::from_tags(tags);
            let best = index.best_for(&oid(), TagPreference::MostRecent).unwrap();
            assert_eq!(best.name.as_str(), "v1.1");
        }

        #[test]
        fn name_order_ignores_dates() {
            let tags = vec![
                Tag::annotated(tag_name("z-old"), oid(), at(100), "old"),
                Tag::annotated(tag_name("a-new"), oid(), at(200), "new"),
            ];
            let index = TagIndex::from_tags(tags);
            let best = index.best_for(&oid(), TagPreference::NameOrder).unwrap();
            assert_eq!(best.name.as_str(), "z-old");
        }

        #[test]
        fn parse_and_display() {
            for pref in [TagPreference::MostRecent, TagPreference::NameOrder] {
                assert_eq!(pref.to_string().parse::<TagPreference>(), Ok(pref));
            }
            assert!("newest".parse::<TagPreference>().is_err());
            assert_eq!("annotated".parse::<TagFilter>(), Ok(TagFilter::Annotated));
        }
    }
}
