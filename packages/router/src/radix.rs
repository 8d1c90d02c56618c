//! A compressed prefix tree keyed by strings.
//!
//! `RadixTree<T>` stores values under string keys and answers exact and
//! longest-prefix queries in time proportional to the key length, no matter
//! how many keys are stored. Edges are labelled with whole substrings, so a
//! chain of single-child nodes collapses into one edge.

use std::collections::BTreeMap;

/// A prefix tree over string keys.
///
/// # Example
///
/// ```rust
/// use lockbox_router::RadixTree;
///
/// let mut tree: RadixTree<i32> = RadixTree::new();
/// tree.insert("prod/", 1);
/// tree.insert("prod/aws/", 2);
///
/// assert_eq!(tree.get("prod/"), Some(&1));
///
/// // longest_prefix returns the deepest key that prefixes the query
/// let (prefix, value) = tree.longest_prefix("prod/aws/creds").unwrap();
/// assert_eq!(prefix, "prod/aws/");
/// assert_eq!(*value, 2);
/// ```
#[derive(Debug, Clone)]
pub struct RadixTree<T> {
    root: Node<T>,
    len: usize,
}

#[derive(Debug, Clone)]
struct Node<T> {
    /// Edge label leading into this node. Empty only for the root.
    label: String,
    value: Option<T>,
    /// Children keyed by the first character of their label.
    children: BTreeMap<char, Node<T>>,
}

impl<T> Node<T> {
    fn empty() -> Self {
        Self {
            label: String::new(),
            value: None,
            children: BTreeMap::new(),
        }
    }

    fn leaf(label: &str, value: T) -> Self {
        Self {
            label: label.to_string(),
            value: Some(value),
            children: BTreeMap::new(),
        }
    }

    /// Insert below this node; `key` excludes this node's own label.
    fn insert(&mut self, key: &str, value: T) -> Option<T> {
        let Some(first) = key.chars().next() else {
            return self.value.replace(value);
        };

        let Some(child) = self.children.get_mut(&first) else {
            self.children.insert(first, Node::leaf(key, value));
            return None;
        };

        let common = common_prefix_len(&child.label, key);
        if common < child.label.len() {
            // Split the edge: child keeps the shared part, the rest moves down.
            let tail = child.label.split_off(common);
            let moved = Node {
                label: tail,
                value: child.value.take(),
                children: std::mem::take(&mut child.children),
            };
            if let Some(c) = moved.label.chars().next() {
                child.children.insert(c, moved);
            }
        }
        child.insert(&key[common..], value)
    }

    /// Remove below this node; `key` excludes this node's own label.
    fn remove(&mut self, key: &str) -> Option<T> {
        let Some(first) = key.chars().next() else {
            return self.value.take();
        };

        let child = self.children.get_mut(&first)?;
        let rest = key.strip_prefix(child.label.as_str())?;
        let removed = child.remove(rest)?;

        if child.value.is_none() {
            match child.children.len() {
                0 => {
                    self.children.remove(&first);
                }
                1 => child.absorb_only_child(),
                _ => {}
            }
        }
        Some(removed)
    }

    /// Merge a valueless node with its single child.
    fn absorb_only_child(&mut self) {
        let children = std::mem::take(&mut self.children);
        if let Some(only) = children.into_values().next() {
            self.label.push_str(&only.label);
            self.value = only.value;
            self.children = only.children;
        }
    }
}

/// Byte length of the longest common prefix, on a char boundary.
fn common_prefix_len(a: &str, b: &str) -> usize {
    a.char_indices()
        .zip(b.chars())
        .find(|((_, ca), cb)| ca != cb)
        .map(|((idx, _), _)| idx)
        .unwrap_or_else(|| a.len().min(b.len()))
}

impl<T> Default for RadixTree<T> {
    fn default() -> Self {
        Self {
            root: Node::empty(),
            len: 0,
        }
    }
}

impl<T> RadixTree<T> {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value at key. Returns previous value if any.
    pub fn insert(&mut self, key: &str, value: T) -> Option<T> {
        let previous = self.root.insert(key, value);
        if previous.is_none() {
            self.len += 1;
        }
        previous
    }

    /// Remove and return value at exact key.
    pub fn remove(&mut self, key: &str) -> Option<T> {
        let removed = self.root.remove(key);
        if removed.is_some() {
            self.len -= 1;
        }
        removed
    }

    /// Walk to the node whose accumulated label equals `key` exactly.
    fn node(&self, key: &str) -> Option<&Node<T>> {
        let mut current = &self.root;
        let mut rest = key;
        while let Some(first) = rest.chars().next() {
            let child = current.children.get(&first)?;
            rest = rest.strip_prefix(child.label.as_str())?;
            current = child;
        }
        Some(current)
    }

    fn node_mut(&mut self, key: &str) -> Option<&mut Node<T>> {
        let mut current = &mut self.root;
        let mut rest = key;
        while let Some(first) = rest.chars().next() {
            let child = current.children.get_mut(&first)?;
            rest = rest.strip_prefix(child.label.as_str())?;
            current = child;
        }
        Some(current)
    }

    /// Get reference to value at exact key.
    pub fn get(&self, key: &str) -> Option<&T> {
        self.node(key)?.value.as_ref()
    }

    /// Get mutable reference to value at exact key.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut T> {
        self.node_mut(key)?.value.as_mut()
    }

    /// Length of the longest stored key that is a prefix of `key`.
    fn longest_prefix_len(&self, key: &str) -> Option<usize> {
        let mut current = &self.root;
        let mut consumed = 0;
        let mut best = current.value.as_ref().map(|_| 0);

        loop {
            let rest = &key[consumed..];
            let Some(first) = rest.chars().next() else {
                break;
            };
            let Some(child) = current.children.get(&first) else {
                break;
            };
            if !rest.starts_with(child.label.as_str()) {
                break;
            }
            consumed += child.label.len();
            current = child;
            if current.value.is_some() {
                best = Some(consumed);
            }
        }

        best
    }

    /// Find the longest stored key that is a prefix of `key`.
    ///
    /// Returns the matched prefix (a slice of `key`) and its value.
    pub fn longest_prefix<'k>(&self, key: &'k str) -> Option<(&'k str, &T)> {
        let len = self.longest_prefix_len(key)?;
        let prefix = &key[..len];
        self.get(prefix).map(|value| (prefix, value))
    }

    /// True if any stored key starts with `prefix` (including `prefix` itself).
    pub fn has_key_with_prefix(&self, prefix: &str) -> bool {
        let mut current = &self.root;
        let mut rest = prefix;

        loop {
            let Some(first) = rest.chars().next() else {
                return current.value.is_some() || !current.children.is_empty();
            };
            let Some(child) = current.children.get(&first) else {
                return false;
            };
            // Pruning keeps every non-root node holding a value somewhere below it.
            if child.label.starts_with(rest) {
                return true;
            }
            match rest.strip_prefix(child.label.as_str()) {
                Some(remaining) => {
                    rest = remaining;
                    current = child;
                }
                None => return false,
            }
        }
    }

    /// Count of values in tree (not nodes).
    pub fn len(&self) -> usize {
        self.len
    }

    /// True if no values anywhere in tree.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterate over all (key, value) pairs in lexical key order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            stack: vec![(String::new(), &self.root)],
        }
    }
}

/// Iterator over (key, &T) pairs in a RadixTree.
pub struct Iter<'a, T> {
    stack: Vec<(String, &'a Node<T>)>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (String, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((key, node)) = self.stack.pop() {
            // Reverse so the smallest child is popped first.
            for child in node.children.values().rev() {
                let mut child_key = key.clone();
                child_key.push_str(&child.label);
                self.stack.push((child_key, child));
            }

            if let Some(ref value) = node.value {
                return Some((key, value));
            }
        }
        None
    }
}
