//! Classification of a backend's special paths (root-only, unauthenticated).

use crate::RadixTree;

/// Marker that turns a pattern into a prefix pattern.
const WILDCARD: char = '*';

/// A set of path patterns answering "is this path covered?".
///
/// Patterns come from a backend's `Paths` declaration. A pattern is either a
/// literal path, matched exactly, or a literal prefix followed by `*`, which
/// covers every path starting with that prefix. For `policy/*` that means
/// `policy/` and anything below it, but not `policy` itself.
///
/// Queries are evaluated on mount-relative paths.
#[derive(Debug, Clone, Default)]
pub struct SpecialPaths {
    /// Pattern prefix -> whether the entry also covers longer paths.
    tree: RadixTree<bool>,
}

impl SpecialPaths {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tree = RadixTree::new();
        for pattern in patterns {
            let pattern = pattern.as_ref();
            let (key, wildcard) = match pattern.strip_suffix(WILDCARD) {
                Some(prefix) => (prefix, true),
                None => (pattern, false),
            };
            // `foo` and `foo*` share a key; the wildcard wins in either order.
            let covers_subtree = wildcard || tree.get(key).copied().unwrap_or(false);
            tree.insert(key, covers_subtree);
        }
        Self { tree }
    }

    /// Whether `path` is covered by any pattern.
    pub fn matches(&self, path: &str) -> bool {
        match self.tree.longest_prefix(path) {
            Some((matched, covers_subtree)) => matched == path || *covers_subtree,
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }
}
