//! Store key paths
//!
//! Every user's data lives under `users/{uid}/{kind}`; entities are immediate
//! children keyed by id, e.g. `users/{uid}/notes/{noteId}/items/{itemId}`.

use std::fmt;

use crate::domain::{DomainError, DomainResult, Principal};

const FORBIDDEN: [char; 6] = ['.', '$', '#', '[', ']', '/'];

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct StorePath {
    segments: Vec<String>,
}

impl StorePath {
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a `/`-separated path; empty segments are skipped
    pub fn parse(path: &str) -> DomainResult<Self> {
        let mut out = Self::root();
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            out = out.child(segment)?;
        }
        Ok(out)
    }

    /// `users/{uid}/{kind}`
    pub fn user_collection(principal: &Principal, kind: &str) -> DomainResult<Self> {
        Self::root().child("users")?.child(&principal.uid)?.child(kind)
    }

    /// `users/{uid}/{kind}/{id}`
    pub fn user_entity(principal: &Principal, kind: &str, id: &str) -> DomainResult<Self> {
        Self::user_collection(principal, kind)?.child(id)
    }

    pub fn child(&self, segment: &str) -> DomainResult<Self> {
        validate_segment(segment)?;
        let mut segments = self.segments.clone();
        segments.push(segment.to_string());
        Ok(Self { segments })
    }

    /// Append a relative `a/b/c` path
    pub fn join(&self, relative: &str) -> DomainResult<Self> {
        let mut out = self.clone();
        for segment in relative.split('/').filter(|s| !s.is_empty()) {
            out = out.child(segment)?;
        }
        Ok(out)
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn starts_with(&self, prefix: &StorePath) -> bool {
        self.segments.starts_with(&prefix.segments)
    }

    /// True when a write at one path can change the value at the other
    pub fn overlaps(&self, other: &StorePath) -> bool {
        self.starts_with(other) || other.starts_with(self)
    }
}

impl fmt::Display for StorePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("/"))
    }
}

fn validate_segment(segment: &str) -> DomainResult<()> {
    if segment.is_empty() {
        return Err(DomainError::InvalidInput("empty path segment".to_string()));
    }
    if segment.contains(&FORBIDDEN[..]) || segment.chars().any(char::is_control) {
        return Err(DomainError::InvalidInput(format!(
            "invalid path segment: {:?}",
            segment
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_paths() {
        let user = Principal::new("uid-1");
        let notes = StorePath::user_collection(&user, "notes").unwrap();
        assert_eq!(notes.to_string(), "users/uid-1/notes");

        let item = StorePath::user_entity(&user, "notes", "-N1")
            .unwrap()
            .join("items/-N2/checked")
            .unwrap();
        assert_eq!(item.to_string(), "users/uid-1/notes/-N1/items/-N2/checked");
        assert!(item.starts_with(&notes));
        assert!(notes.overlaps(&item));
        assert!(item.overlaps(&notes));
    }

    #[test]
    fn test_rejects_bad_segments() {
        let root = StorePath::root();
        assert!(root.child("a.b").is_err());
        assert!(root.child("").is_err());
        assert!(root.child("x/y").is_err());
        assert!(StorePath::user_collection(&Principal::new("bad#uid"), "notes").is_err());
    }

    #[test]
    fn test_disjoint_paths_do_not_overlap() {
        let a = StorePath::parse("users/u/notes").unwrap();
        let b = StorePath::parse("users/u/questions/q1").unwrap();
        assert!(!a.overlaps(&b));
        assert!(StorePath::root().overlaps(&b));
    }
}
