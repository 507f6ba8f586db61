use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

/// Normalized set of free-text capability labels.
///
/// Tags are compared case- and order-insensitively: every tag is trimmed and
/// ASCII-lowercased on the way in, and the backing [`BTreeSet`] makes the
/// collection order-independent. `["Docker", "linux "]` and
/// `["linux", "docker"]` are the same `TagSet`.
#[derive(Default, Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "BTreeSet<String>")]
pub struct TagSet(BTreeSet<String>);

impl TryFrom<BTreeSet<String>> for TagSet {
    type Error = ModelError;

    fn try_from(labels: BTreeSet<String>) -> ModelResult<Self> {
        Self::try_from_iter(labels)
    }
}

impl TagSet {
    /// Create an empty tag set.
    pub fn new() -> Self {
        Self(BTreeSet::new())
    }

    /// Build a tag set from raw labels, normalizing each one.
    ///
    /// A label that is empty after trimming is rejected with
    /// [`ModelError::InvalidArgument`]: blank input must not silently turn a
    /// tagged profile into an untagged one.
    pub fn try_from_iter<I, S>(labels: I) -> ModelResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = BTreeSet::new();
        for label in labels {
            let normalized = label.as_ref().trim().to_ascii_lowercase();
            if normalized.is_empty() {
                return Err(ModelError::InvalidArgument(
                    "tag must not be empty or whitespace-only".to_string(),
                ));
            }
            set.insert(normalized);
        }
        Ok(Self(set))
    }

    /// Returns `true` if no tags are present.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of distinct tags.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the given label is present (after normalization).
    pub fn contains(&self, label: &str) -> bool {
        self.0.contains(&label.trim().to_ascii_lowercase())
    }

    /// Returns `true` if every tag in `self` is present in `other`.
    pub fn is_subset_of(&self, other: &TagSet) -> bool {
        self.0.is_subset(&other.0)
    }

    /// Iterate through all tags in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|s| s.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::TagSet;
    use crate::error::ModelError;

    #[test]
    fn normalizes_case_and_whitespace() {
        let tags = TagSet::try_from_iter(["Docker", "  LINUX "]).unwrap();

        assert!(tags.contains("docker"));
        assert!(tags.contains("Linux"));
        assert_eq!(tags.iter().collect::<Vec<_>>(), vec!["docker", "linux"]);
    }

    #[test]
    fn order_and_case_insensitive_equality() {
        let a = TagSet::try_from_iter(["docker", "linux"]).unwrap();
        let b = TagSet::try_from_iter(["LINUX", "Docker"]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn duplicates_collapse() {
        let tags = TagSet::try_from_iter(["docker", "DOCKER", " docker "]).unwrap();
        assert_eq!(tags.len(), 1);
    }

    #[test]
    fn rejects_blank_tags() {
        let err = TagSet::try_from_iter(["docker", "   "]).unwrap_err();
        assert!(matches!(err, ModelError::InvalidArgument(_)));
    }

    #[test]
    fn subset_queries() {
        let required = TagSet::try_from_iter(["docker"]).unwrap();
        let offered = TagSet::try_from_iter(["docker", "linux"]).unwrap();

        assert!(required.is_subset_of(&offered));
        assert!(!offered.is_subset_of(&required));
        assert!(TagSet::new().is_subset_of(&required));
    }

    #[test]
    fn serde_roundtrip() {
        let tags = TagSet::try_from_iter(["linux", "docker"]).unwrap();
        let json = serde_json::to_string(&tags).unwrap();

        assert_eq!(json, r#"["docker","linux"]"#);
        let back: TagSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tags);
    }

    #[test]
    fn deserialization_normalizes_raw_labels() {
        let tags: TagSet = serde_json::from_str(r#"["Docker", " LINUX "]"#).unwrap();
        assert_eq!(tags, TagSet::try_from_iter(["docker", "linux"]).unwrap());
    }
}
