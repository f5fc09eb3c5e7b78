//! Shared types for supplydemand
//!
//! This crate provides the identity and path types that describe where a
//! resolution step sits inside a demand chain. They carry no behavior of
//! their own and are shared by the engine and the host CLI.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Key given to the scope of the root supplier
pub const ROOT_KEY: &str = "root";

/// Capability name reserved for the root supplier
pub const ROOT_CAPABILITY: &str = "$$root";

/// One resolution step taken from the root
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PathSegment {
    /// Identity label of the demand
    pub key: String,

    /// Capability name that was demanded
    #[serde(rename = "type")]
    pub capability: String,
}

impl PathSegment {
    pub fn new(key: impl Into<String>, capability: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            capability: capability.into(),
        }
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.key, self.capability)
    }
}

struct PathNode {
    segment: PathSegment,
    parent: Option<Arc<PathNode>>,
}

/// Append-only chain of demands that led to a scope
///
/// Extending a path never touches the original: `child` links a new node
/// onto the shared tail, so sibling demands issued from the same scope
/// each see their own sequence.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<PathSegment>", into = "Vec<PathSegment>")]
pub struct DemandPath {
    last: Option<Arc<PathNode>>,
    len: usize,
}

impl DemandPath {
    /// The empty path seen by the root scope
    pub fn root() -> Self {
        Self::default()
    }

    /// Number of nested demands between the root and this point
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// A new path with one more segment; `self` is left as it was
    pub fn child(&self, segment: PathSegment) -> Self {
        DemandPath {
            last: Some(Arc::new(PathNode {
                segment,
                parent: self.last.clone(),
            })),
            len: self.len + 1,
        }
    }

    /// The most recent segment, if any
    pub fn last(&self) -> Option<&PathSegment> {
        self.last.as_deref().map(|node| &node.segment)
    }

    /// Segments in root-first order
    pub fn segments(&self) -> Vec<PathSegment> {
        let mut segments = Vec::with_capacity(self.len);
        let mut cursor = self.last.as_deref();
        while let Some(node) = cursor {
            segments.push(node.segment.clone());
            cursor = node.parent.as_deref();
        }
        segments.reverse();
        segments
    }

    /// Whether both paths share the same most recent node
    pub fn ptr_eq(&self, other: &DemandPath) -> bool {
        match (&self.last, &other.last) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl PartialEq for DemandPath {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && (self.ptr_eq(other) || self.segments() == other.segments())
    }
}

impl Eq for DemandPath {}

impl From<Vec<PathSegment>> for DemandPath {
    fn from(segments: Vec<PathSegment>) -> Self {
        segments
            .into_iter()
            .fold(DemandPath::root(), |path, segment| path.child(segment))
    }
}

impl From<DemandPath> for Vec<PathSegment> {
    fn from(path: DemandPath) -> Self {
        path.segments()
    }
}

impl FromIterator<PathSegment> for DemandPath {
    fn from_iter<I: IntoIterator<Item = PathSegment>>(iter: I) -> Self {
        iter.into_iter()
            .fold(DemandPath::root(), |path, segment| path.child(segment))
    }
}

impl fmt::Debug for DemandPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.segments()).finish()
    }
}

impl fmt::Display for DemandPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(ROOT_KEY)?;
        for segment in self.segments() {
            write!(f, "/{}", segment)?;
        }
        Ok(())
    }
}
