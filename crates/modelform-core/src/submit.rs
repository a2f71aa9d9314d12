// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Posted form data and parse results.
//!
//! A [`Submission`] is the transport-independent view of a posted form:
//! field name → string values plus uploaded files. Parsing it against a
//! form yields [`Parsed`], the working copy and the relation updates to run
//! once the entity is saved.

use indexmap::IndexMap;

use crate::{entity::EntityType, gateway::Record};

/// Uploaded file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadedFile {
    /// Client-side file name.
    pub filename: String,

    /// Declared MIME type.
    pub content_type: Option<String>,

    /// Content.
    pub data: Vec<u8>
}

impl UploadedFile {
    /// File without a content type.
    pub fn new(filename: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            filename:     filename.into(),
            content_type: None,
            data:         data.into()
        }
    }

    /// Check if the browser posted an empty file input.
    pub fn is_empty(&self) -> bool {
        self.filename.is_empty() && self.data.is_empty()
    }
}

/// Posted data of one field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionValue {
    /// Field name, prefix stripped.
    pub name: String,

    /// Posted strings in order.
    pub values: Vec<String>,

    /// Uploaded files in order.
    pub files: Vec<UploadedFile>
}

impl SubmissionValue {
    /// First posted string.
    pub fn first(&self) -> Option<&str> {
        self.values.first().map(String::as_str)
    }

    /// Check if anything non-blank was posted.
    pub fn has_content(&self) -> bool {
        self.values.iter().any(|value| !value.trim().is_empty())
            || self.files.iter().any(|file| !file.is_empty())
    }
}

/// Posted form data keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Submission {
    entries: IndexMap<String, SubmissionValue>
}

impl Submission {
    /// Empty submission.
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect `(key, value)` pairs, keeping keys that start with `prefix`
    /// and stripping it. Repeated keys accumulate values.
    ///
    /// # Example
    ///
    /// ```rust
    /// use modelform_core::Submission;
    ///
    /// let submission = Submission::from_pairs(
    ///     "Res.",
    ///     [("Res.name", "Alice"), ("Res.roles", "1"), ("Res.roles", "2"), ("csrf", "x")]
    /// );
    /// assert_eq!(submission.get("name").and_then(|v| v.first()), Some("Alice"));
    /// assert_eq!(submission.get("roles").map(|v| v.values.len()), Some(2));
    /// assert!(!submission.contains("csrf"));
    /// ```
    pub fn from_pairs<I, K, V>(prefix: &str, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>
    {
        let mut submission = Self::new();
        for (key, value) in pairs {
            match key.as_ref().strip_prefix(prefix) {
                Some(name) if !name.is_empty() => submission.push(name, value),
                _ => {}
            }
        }
        submission
    }

    fn entry(&mut self, name: &str) -> &mut SubmissionValue {
        self.entries
            .entry(name.to_string())
            .or_insert_with(|| SubmissionValue {
                name: name.to_string(),
                ..SubmissionValue::default()
            })
    }

    /// Append a value.
    pub fn push(&mut self, name: &str, value: impl Into<String>) {
        self.entry(name).values.push(value.into());
    }

    /// Append a file.
    pub fn attach(&mut self, name: &str, file: UploadedFile) {
        self.entry(name).files.push(file);
    }

    /// Builder form of [`push`](Self::push).
    #[must_use]
    pub fn with(mut self, name: &str, value: impl Into<String>) -> Self {
        self.push(name, value);
        self
    }

    /// Builder form of [`attach`](Self::attach).
    #[must_use]
    pub fn with_file(mut self, name: &str, file: UploadedFile) -> Self {
        self.attach(name, file);
        self
    }

    /// Posted data of a field.
    pub fn get(&self, name: &str) -> Option<&SubmissionValue> {
        self.entries.get(name)
    }

    /// Check if a field key was posted.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Number of posted fields.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing was posted.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Posted fields in arrival order.
    pub fn iter(&self) -> impl Iterator<Item = &SubmissionValue> {
        self.entries.values()
    }
}

/// Relation update staged during parsing, run after the owner is saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssociationOp {
    /// Remove every association.
    Clear {
        /// Relation field.
        field:  &'static str,
        /// Related entity type.
        target: EntityType
    },

    /// Replace the associations.
    Replace {
        /// Relation field.
        field:   &'static str,
        /// Related entity type.
        target:  EntityType,
        /// New related entities.
        records: Vec<Record>
    }
}

impl AssociationOp {
    /// Relation field.
    pub const fn field(&self) -> &'static str {
        match self {
            Self::Clear { field, .. } | Self::Replace { field, .. } => *field
        }
    }

    /// Related entity type.
    pub const fn target(&self) -> EntityType {
        match self {
            Self::Clear { target, .. } | Self::Replace { target, .. } => *target
        }
    }
}

/// Successfully parsed submission.
#[derive(Debug, Clone)]
pub struct Parsed<T> {
    pub(crate) entity:     T,
    pub(crate) processed:  Vec<&'static str>,
    pub(crate) operations: Vec<AssociationOp>
}

impl<T> Parsed<T> {
    /// Working copy with the submitted values.
    pub const fn entity(&self) -> &T {
        &self.entity
    }

    /// Fields written during parsing, in form order.
    pub fn processed(&self) -> &[&'static str] {
        &self.processed
    }

    /// Staged relation updates.
    pub fn operations(&self) -> &[AssociationOp] {
        &self.operations
    }

    /// Take the working copy.
    pub fn into_entity(self) -> T {
        self.entity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_is_stripped() {
        let submission = Submission::from_pairs(
            "QorResource.",
            [
                ("QorResource.Name", "x"),
                ("QorResource.", "dropped"),
                ("Other.Name", "y")
            ]
        );
        assert_eq!(submission.len(), 1);
        assert_eq!(submission.get("Name").unwrap().name, "Name");
    }

    #[test]
    fn empty_prefix_keeps_everything() {
        let submission = Submission::from_pairs("", [("a", "1"), ("b", "2")]);
        let names: Vec<_> = submission.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, ["a", "b"]);
    }

    #[test]
    fn repeated_keys_accumulate() {
        let submission = Submission::new()
            .with("tags", "a")
            .with("tags", "b")
            .with_file("avatar", UploadedFile::new("a.png", b"x".to_vec()));
        assert_eq!(submission.get("tags").unwrap().values, ["a", "b"]);
        assert_eq!(submission.get("avatar").unwrap().files.len(), 1);
        assert!(submission.get("avatar").unwrap().first().is_none());
    }

    #[test]
    fn content_detection() {
        let blank = SubmissionValue {
            name:   "x".into(),
            values: vec!["  ".into()],
            files:  vec![UploadedFile::default()]
        };
        assert!(!blank.has_content());
        let filled = SubmissionValue {
            values: vec!["v".into()],
            ..blank
        };
        assert!(filled.has_content());
    }
}
