//! The groups and attributes a handler has accumulated.
//!
//! A [`Scope`] is a persistent list: extending it returns a new scope that
//! shares every existing node with the old one, and no node is ever changed
//! after it is created. Handlers derived from a common ancestor can therefore
//! be used side by side without observing each other's attributes.
use crate::value::Attr;
use std::borrow::Cow;
use std::sync::Arc;

/// A single entry in a [`Scope`].
#[derive(Clone, Debug)]
pub enum GroupOrAttrs {
    /// A named group that every following entry is nested in.
    Group(Cow<'static, str>),
    /// Attributes attached at the current level of nesting.
    Attrs(Vec<Attr>),
}

impl GroupOrAttrs {
    fn is_group(&self) -> bool {
        matches!(self, GroupOrAttrs::Group(_))
    }
}

#[derive(Debug)]
struct Node {
    entry: GroupOrAttrs,
    prev: Option<Arc<Node>>,
    len: usize,
}

impl Drop for Node {
    fn drop(&mut self) {
        // Unlink uniquely owned predecessors one at a time, so long chains
        // don't recurse once per node.
        let mut prev = self.prev.take();
        while let Some(node) = prev {
            match Arc::try_unwrap(node) {
                Ok(mut node) => prev = node.prev.take(),
                Err(_) => break,
            }
        }
    }
}

/// An immutable, append-only sequence of [`GroupOrAttrs`].
#[derive(Clone, Debug, Default)]
pub struct Scope {
    last: Option<Arc<Node>>,
}

impl Scope {
    /// Returns an empty scope.
    pub const fn new() -> Self {
        Scope { last: None }
    }

    /// Returns a new scope with `entry` appended.
    ///
    /// `self` is left untouched and shares all of its entries with the
    /// returned scope.
    pub fn extend(&self, entry: GroupOrAttrs) -> Scope {
        let node = Node {
            entry,
            prev: self.last.clone(),
            len: self.len() + 1,
        };

        Scope {
            last: Some(Arc::new(node)),
        }
    }

    /// The number of entries in the scope.
    pub fn len(&self) -> usize {
        self.last.as_ref().map_or(0, |node| node.len)
    }

    pub fn is_empty(&self) -> bool {
        self.last.is_none()
    }

    /// Returns `true` if both scopes are the same list, not just equal ones.
    pub fn ptr_eq(&self, other: &Scope) -> bool {
        match (&self.last, &other.last) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }

    /// Returns the entries from first to last.
    ///
    /// If `prune_trailing_groups` is set, groups at the end of the scope are
    /// left out, since nothing would be rendered beneath them.
    pub fn entries(&self, prune_trailing_groups: bool) -> Vec<&GroupOrAttrs> {
        let mut cursor = self.last.as_deref();

        if prune_trailing_groups {
            while let Some(node) = cursor.filter(|node| node.entry.is_group()) {
                cursor = node.prev.as_deref();
            }
        }

        let mut entries = Vec::with_capacity(cursor.map_or(0, |node| node.len));
        while let Some(node) = cursor {
            entries.push(&node.entry);
            cursor = node.prev.as_deref();
        }
        entries.reverse();
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(name: &'static str) -> GroupOrAttrs {
        GroupOrAttrs::Group(Cow::Borrowed(name))
    }

    fn attrs(key: &'static str) -> GroupOrAttrs {
        GroupOrAttrs::Attrs(vec![Attr::new(key, 1_i64)])
    }

    fn names(entries: Vec<&GroupOrAttrs>) -> Vec<String> {
        entries
            .into_iter()
            .map(|entry| match entry {
                GroupOrAttrs::Group(name) => format!("group:{}", name),
                GroupOrAttrs::Attrs(attrs) => format!("attrs:{}", attrs[0].key),
            })
            .collect()
    }

    #[test]
    fn entries_are_in_insertion_order() {
        let scope = Scope::new().extend(group("g")).extend(attrs("a")).extend(attrs("b"));

        assert_eq!(scope.len(), 3);
        assert_eq!(
            names(scope.entries(false)),
            ["group:g", "attrs:a", "attrs:b"]
        );
    }

    #[test]
    fn extending_leaves_the_original_alone() {
        let base = Scope::new().extend(group("g"));
        let left = base.extend(attrs("left"));
        let right = base.extend(attrs("right"));

        assert_eq!(names(base.entries(false)), ["group:g"]);
        assert_eq!(names(left.entries(false)), ["group:g", "attrs:left"]);
        assert_eq!(names(right.entries(false)), ["group:g", "attrs:right"]);
        assert!(!left.ptr_eq(&right));
    }

    #[test]
    fn pruning_drops_only_trailing_groups() {
        let scope = Scope::new()
            .extend(group("outer"))
            .extend(attrs("a"))
            .extend(group("inner"))
            .extend(group("innermost"));

        assert_eq!(
            names(scope.entries(true)),
            ["group:outer", "attrs:a"]
        );
        assert_eq!(scope.entries(false).len(), 4);
    }

    #[test]
    fn pruning_a_scope_of_groups_leaves_nothing() {
        let scope = Scope::new().extend(group("a")).extend(group("b"));
        assert!(scope.entries(true).is_empty());
        assert!(Scope::new().entries(true).is_empty());
    }

    #[test]
    fn dropping_a_long_chain_does_not_overflow() {
        let mut scope = Scope::new();
        for _ in 0..100_000 {
            scope = scope.extend(attrs("a"));
        }
        assert_eq!(scope.len(), 100_000);
        drop(scope);
    }

    #[test]
    fn dropping_a_branch_keeps_the_shared_prefix() {
        let mut base = Scope::new();
        for _ in 0..1_000 {
            base = base.extend(attrs("a"));
        }

        let mut branch = base.clone();
        for _ in 0..1_000 {
            branch = branch.extend(attrs("b"));
        }
        drop(branch);

        assert_eq!(base.len(), 1_000);
        assert_eq!(base.entries(false).len(), 1_000);
    }

    #[test]
    fn clones_are_the_same_list() {
        let scope = Scope::new().extend(attrs("a"));
        assert!(scope.ptr_eq(&scope.clone()));
        assert!(Scope::new().ptr_eq(&Scope::default()));
    }
}
