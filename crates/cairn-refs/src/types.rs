//! Core reference types.
//!
//! A reference is a name bound either directly to an object id or to the
//! name of another reference. Classification by namespace is purely
//! syntactic and never fails.

use std::ops::{BitOr, BitOrAssign};

use cairn_types::ObjectId;
use serde::{Deserialize, Serialize};

use crate::names::{is_valid_name, HEADS_DIR, NOTES_DIR, REFS_DIR, REMOTES_DIR, TAGS_DIR};

/// What a reference points at.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RefTarget {
    /// An object id.
    Direct(ObjectId),
    /// The full name of another reference.
    Symbolic(String),
}

/// A named reference.
///
/// The derived ordering compares the name first and the target second, so two
/// refs compare `Equal` exactly when both name and target match.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Ref {
    /// Full reference name (e.g. "refs/heads/main", "HEAD").
    pub name: String,
    /// Direct id or symbolic target name.
    pub target: RefTarget,
}

impl Ref {
    /// Create a direct reference.
    pub fn new_direct(name: impl Into<String>, id: ObjectId) -> Self {
        Self {
            name: name.into(),
            target: RefTarget::Direct(id),
        }
    }

    /// Create a symbolic reference pointing at `target`.
    pub fn new_symbolic(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: RefTarget::Symbolic(target.into()),
        }
    }

    /// Classify this reference.
    ///
    /// A ref whose name fails the name grammar is [`ReferenceType::Invalid`].
    pub fn ref_type(&self) -> ReferenceType {
        if !is_valid_name(&self.name) {
            return ReferenceType::Invalid;
        }
        match self.target {
            RefTarget::Direct(_) => ReferenceType::Direct,
            RefTarget::Symbolic(_) => ReferenceType::Symbolic,
        }
    }

    /// The object id, for direct refs.
    pub fn target_id(&self) -> Option<ObjectId> {
        match &self.target {
            RefTarget::Direct(id) => Some(*id),
            RefTarget::Symbolic(_) => None,
        }
    }

    /// The target name, for symbolic refs.
    pub fn symbolic_target(&self) -> Option<&str> {
        match &self.target {
            RefTarget::Direct(_) => None,
            RefTarget::Symbolic(name) => Some(name),
        }
    }

    /// Returns `true` if this is a branch ref.
    pub fn is_branch(&self) -> bool {
        self.name.starts_with(HEADS_DIR)
    }

    /// Returns `true` if this is a tag ref.
    pub fn is_tag(&self) -> bool {
        self.name.starts_with(TAGS_DIR)
    }

    /// Returns `true` if this is a remote tracking ref.
    pub fn is_remote(&self) -> bool {
        self.name.starts_with(REMOTES_DIR)
    }

    /// Returns `true` if this is a notes ref.
    pub fn is_note(&self) -> bool {
        self.name.starts_with(NOTES_DIR)
    }

    /// Human-readable form of the name.
    pub fn shorthand(&self) -> &str {
        shorthand(&self.name)
    }
}

/// Strip the well-known namespace prefix from a ref name.
///
/// `refs/heads/`, `refs/tags/` and `refs/remotes/` are removed entirely;
/// any other `refs/` name loses just `refs/`. Names outside `refs/` come
/// back unchanged.
pub fn shorthand(name: &str) -> &str {
    [HEADS_DIR, TAGS_DIR, REMOTES_DIR, REFS_DIR]
        .iter()
        .find_map(|prefix| name.strip_prefix(prefix))
        .filter(|short| !short.is_empty())
        .unwrap_or(name)
}

/// Closed classification of a reference handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReferenceType {
    /// Malformed or unusable handle.
    Invalid,
    /// Points at an object id.
    Direct,
    /// Points at another reference.
    Symbolic,
}

/// Set of reference types, used to filter listings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ReferenceFilter(u8);

impl ReferenceFilter {
    /// Matches nothing.
    pub const NONE: Self = Self(0);
    /// Matches direct references.
    pub const DIRECT: Self = Self(1);
    /// Matches symbolic references.
    pub const SYMBOLIC: Self = Self(1 << 1);
    /// Matches every valid reference.
    pub const ALL: Self = Self(Self::DIRECT.0 | Self::SYMBOLIC.0);

    /// Returns `true` if every type in `other` is in `self`.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns `true` if refs of `ty` pass this filter.
    pub fn matches(self, ty: ReferenceType) -> bool {
        match ty {
            ReferenceType::Invalid => false,
            ReferenceType::Direct => self.contains(Self::DIRECT),
            ReferenceType::Symbolic => self.contains(Self::SYMBOLIC),
        }
    }
}

impl Default for ReferenceFilter {
    fn default() -> Self {
        Self::ALL
    }
}

impl BitOr for ReferenceFilter {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for ReferenceFilter {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl From<ReferenceType> for ReferenceFilter {
    fn from(ty: ReferenceType) -> Self {
        match ty {
            ReferenceType::Invalid => Self::NONE,
            ReferenceType::Direct => Self::DIRECT,
            ReferenceType::Symbolic => Self::SYMBOLIC,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oid(n: u8) -> ObjectId {
        ObjectId::from_hash([n; 32])
    }

    #[test]
    fn classification_by_namespace() {
        let branch = Ref::new_direct("refs/heads/main", oid(1));
        let tag = Ref::new_direct("refs/tags/v1.0.0", oid(1));
        let remote = Ref::new_direct("refs/remotes/origin/main", oid(1));
        let note = Ref::new_direct("refs/notes/commits", oid(1));
        let head = Ref::new_symbolic("HEAD", "refs/heads/main");

        assert!(branch.is_branch() && !branch.is_tag() && !branch.is_remote() && !branch.is_note());
        assert!(tag.is_tag() && !tag.is_branch());
        assert!(remote.is_remote() && !remote.is_branch());
        assert!(note.is_note() && !note.is_tag());
        assert!(!head.is_branch() && !head.is_tag() && !head.is_remote() && !head.is_note());
    }

    #[test]
    fn shorthand_names() {
        assert_eq!(shorthand("refs/heads/feature/auth"), "feature/auth");
        assert_eq!(shorthand("refs/tags/v1.0.0"), "v1.0.0");
        assert_eq!(shorthand("refs/remotes/origin/main"), "origin/main");
        assert_eq!(shorthand("refs/notes/commits"), "notes/commits");
        assert_eq!(shorthand("HEAD"), "HEAD");
        assert_eq!(shorthand("refs/heads/"), "refs/heads/");
        assert_eq!(shorthand(""), "");
    }

    #[test]
    fn ref_type_classification() {
        assert_eq!(Ref::new_direct("refs/heads/main", oid(1)).ref_type(), ReferenceType::Direct);
        assert_eq!(Ref::new_symbolic("HEAD", "refs/heads/main").ref_type(), ReferenceType::Symbolic);
        assert_eq!(Ref::new_direct("not a ref", oid(1)).ref_type(), ReferenceType::Invalid);
    }

    #[test]
    fn target_accessors() {
        let direct = Ref::new_direct("refs/heads/main", oid(7));
        assert_eq!(direct.target_id(), Some(oid(7)));
        assert_eq!(direct.symbolic_target(), None);

        let symbolic = Ref::new_symbolic("HEAD", "refs/heads/main");
        assert_eq!(symbolic.target_id(), None);
        assert_eq!(symbolic.symbolic_target(), Some("refs/heads/main"));
    }

    #[test]
    fn ordering_is_equal_only_for_same_name_and_target() {
        use std::cmp::Ordering;
        let a = Ref::new_direct("refs/heads/main", oid(1));
        assert_eq!(a.cmp(&a.clone()), Ordering::Equal);
        assert_ne!(a.cmp(&Ref::new_direct("refs/heads/main", oid(2))), Ordering::Equal);
        assert_ne!(a.cmp(&Ref::new_direct("refs/heads/dev", oid(1))), Ordering::Equal);
        assert_ne!(
            a.cmp(&Ref::new_symbolic("refs/heads/main", "refs/heads/dev")),
            Ordering::Equal
        );
    }

    #[test]
    fn filter_flags() {
        assert_eq!(ReferenceFilter::DIRECT | ReferenceFilter::SYMBOLIC, ReferenceFilter::ALL);
        assert!(ReferenceFilter::ALL.contains(ReferenceFilter::DIRECT));
        assert!(!ReferenceFilter::DIRECT.contains(ReferenceFilter::SYMBOLIC));
        assert!(ReferenceFilter::ALL.matches(ReferenceType::Symbolic));
        assert!(!ReferenceFilter::ALL.matches(ReferenceType::Invalid));
        assert!(!ReferenceFilter::NONE.matches(ReferenceType::Direct));

        let mut filter = ReferenceFilter::from(ReferenceType::Direct);
        filter |= ReferenceFilter::SYMBOLIC;
        assert_eq!(filter, ReferenceFilter::default());
    }
}
