use core::borrow::Borrow;

use smallvec::SmallVec;

use super::handle::Handle;

// Nodes briefly hold one key past `max_keys()` between an insert and the split that follows it, so the inline
// capacities cover the default branching factor with room to spare. Larger factors spill to the heap.
const INLINE_KEYS: usize = 8;
const INLINE_CHILDREN: usize = INLINE_KEYS + 1;

pub(crate) type Keys<K> = SmallVec<[K; INLINE_KEYS]>;
pub(crate) type Children = SmallVec<[Handle; INLINE_CHILDREN]>;

/// Occupancy rules derived from the branching factor.
///
/// - every node holds at most `bf - 1` keys;
/// - a non-root leaf holds at least `bf / 2` keys, the size of the left half of a split leaf;
/// - a non-root internal node holds at least `ceil(bf / 2) - 1` keys, i.e. `ceil(bf / 2)` children.
///
/// Both minimums are low enough that a split never produces an underfull half, and high enough that merging an
/// underfull node with a sibling that cannot lend never produces an overfull one.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Bounds {
    branching_factor: usize,
}

impl Bounds {
    pub(crate) const fn new(branching_factor: usize) -> Self {
        debug_assert!(branching_factor >= 3);
        Self { branching_factor }
    }

    pub(crate) const fn branching_factor(self) -> usize {
        self.branching_factor
    }

    pub(crate) const fn max_keys(self) -> usize {
        self.branching_factor - 1
    }

    pub(crate) const fn min_leaf_keys(self) -> usize {
        self.branching_factor / 2
    }

    pub(crate) const fn min_internal_keys(self) -> usize {
        self.branching_factor.div_ceil(2) - 1
    }
}

#[allow(clippy::large_enum_variant)]
pub(crate) enum Node<K> {
    Internal(InternalNode<K>),
    Leaf(LeafNode<K>),
}

// B+Tree: internal nodes store separator keys and child handles.
pub(crate) struct InternalNode<K> {
    // children[i] covers keys in [keys[i - 1], keys[i]).
    keys: Keys<K>,
    children: Children,
}

// B+Tree: leaves store the elements themselves plus non-owning links to their neighbours.
pub(crate) struct LeafNode<K> {
    prev: Option<Handle>,
    next: Option<Handle>,
    keys: Keys<K>,
}

/// Result of searching for a key in a leaf.
pub(crate) enum SearchResult {
    /// Key was found at the given index.
    Found(usize),
    /// Key was not found; index is where it would be inserted.
    NotFound(usize),
}

impl<K> Node<K> {
    #[cfg(test)]
    pub(crate) fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf(_))
    }

    /// Returns the leaf node, panicking if this is not a leaf.
    pub(crate) fn as_leaf(&self) -> &LeafNode<K> {
        match self {
            Node::Leaf(leaf) => leaf,
            Node::Internal(_) => panic!("expected leaf node"),
        }
    }

    /// Returns the leaf node mutably, panicking if this is not a leaf.
    pub(crate) fn as_leaf_mut(&mut self) -> &mut LeafNode<K> {
        match self {
            Node::Leaf(leaf) => leaf,
            Node::Internal(_) => panic!("expected leaf node"),
        }
    }

    /// Returns the internal node, panicking if this is not internal.
    pub(crate) fn as_internal(&self) -> &InternalNode<K> {
        match self {
            Node::Internal(internal) => internal,
            Node::Leaf(_) => panic!("expected internal node"),
        }
    }

    /// Returns the internal node mutably, panicking if this is not internal.
    pub(crate) fn as_internal_mut(&mut self) -> &mut InternalNode<K> {
        match self {
            Node::Internal(internal) => internal,
            Node::Leaf(_) => panic!("expected internal node"),
        }
    }

    /// Elements for a leaf, separators for an internal node.
    pub(crate) fn keys(&self) -> &[K] {
        match self {
            Node::Internal(internal) => internal.keys(),
            Node::Leaf(leaf) => leaf.keys(),
        }
    }

    pub(crate) fn key_count(&self) -> usize {
        self.keys().len()
    }

    pub(crate) fn min_keys(&self, bounds: Bounds) -> usize {
        match self {
            Node::Internal(_) => bounds.min_internal_keys(),
            Node::Leaf(_) => bounds.min_leaf_keys(),
        }
    }

    /// More keys than a node may hold at rest; the node must be split.
    pub(crate) fn is_overfull(&self, bounds: Bounds) -> bool {
        self.key_count() > bounds.max_keys()
    }

    /// Fewer keys than a non-root node may hold; the node must borrow or merge.
    pub(crate) fn is_underfull(&self, bounds: Bounds) -> bool {
        self.key_count() < self.min_keys(bounds)
    }

    /// Whether a sibling may give up one key and stay at or above its minimum.
    pub(crate) fn can_lend(&self, bounds: Bounds) -> bool {
        self.key_count() > self.min_keys(bounds)
    }
}

impl<K> InternalNode<K> {
    /// Creates the node that sits above a split root: one separator, two children.
    pub(crate) fn new_root(left: Handle, separator: K, right: Handle) -> Self {
        let mut node = Self {
            keys: Keys::new(),
            children: Children::new(),
        };
        node.keys.push(separator);
        node.children.push(left);
        node.children.push(right);
        node
    }

    pub(crate) fn from_parts(keys: Keys<K>, children: Children) -> Self {
        debug_assert_eq!(children.len(), keys.len() + 1);
        Self { keys, children }
    }

    pub(crate) fn key_count(&self) -> usize {
        self.keys.len()
    }

    pub(crate) fn child_count(&self) -> usize {
        self.children.len()
    }

    #[cfg(test)]
    pub(crate) fn key(&self, index: usize) -> &K {
        &self.keys[index]
    }

    pub(crate) fn keys(&self) -> &[K] {
        &self.keys
    }

    #[inline]
    pub(crate) fn child(&self, index: usize) -> Handle {
        self.children[index]
    }

    pub(crate) fn children(&self) -> &[Handle] {
        &self.children
    }

    /// Index of the child covering `key`: the first separator strictly greater than `key`.
    ///
    /// A key equal to a separator belongs to the right of it, because leaf splits copy the right leaf's first
    /// key up as the separator.
    #[inline]
    pub(crate) fn search_child<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.keys.partition_point(|k| k.borrow() <= key)
    }

    /// Inserts `key` at `index` with `child` immediately to its right.
    pub(crate) fn insert_child(&mut self, index: usize, key: K, child: Handle) {
        self.keys.insert(index, key);
        self.children.insert(index + 1, child);
    }

    /// Removes the separator at `index` together with the child to its right.
    pub(crate) fn remove_child(&mut self, index: usize) -> (K, Handle) {
        let key = self.keys.remove(index);
        let child = self.children.remove(index + 1);
        (key, child)
    }

    pub(crate) fn set_key(&mut self, index: usize, key: K) -> K {
        core::mem::replace(&mut self.keys[index], key)
    }

    /// Appends a separator and the child that follows it.
    pub(crate) fn push_back(&mut self, key: K, child: Handle) {
        self.keys.push(key);
        self.children.push(child);
    }

    /// Prepends a child and the separator that follows it.
    pub(crate) fn push_front(&mut self, child: Handle, key: K) {
        self.keys.insert(0, key);
        self.children.insert(0, child);
    }

    /// Removes the last separator and the last child.
    pub(crate) fn pop_back(&mut self) -> Option<(K, Handle)> {
        if self.keys.is_empty() {
            return None;
        }
        let key = self.keys.pop()?;
        let child = self.children.pop()?;
        Some((key, child))
    }

    /// Removes the first child and the first separator.
    pub(crate) fn pop_front(&mut self) -> Option<(Handle, K)> {
        if self.keys.is_empty() {
            return None;
        }
        let child = self.children.remove(0);
        let key = self.keys.remove(0);
        Some((child, key))
    }

    /// Splits an overfull node at `len / 2`. The middle key moves up and appears in neither half.
    pub(crate) fn split(&mut self) -> (K, InternalNode<K>) {
        let mid = self.keys.len() / 2;

        let right = InternalNode {
            keys: self.keys.drain(mid + 1..).collect(),
            children: self.children.drain(mid + 1..).collect(),
        };
        let median = self.keys.remove(mid);

        (median, right)
    }

    /// Absorbs the right sibling, pulling the parent's separator down between the two halves.
    pub(crate) fn merge_with_right(&mut self, separator: K, mut right: InternalNode<K>) {
        self.keys.push(separator);
        self.keys.append(&mut right.keys);
        self.children.append(&mut right.children);
    }
}

impl<K> LeafNode<K> {
    pub(crate) fn new() -> Self {
        Self {
            prev: None,
            next: None,
            keys: Keys::new(),
        }
    }

    pub(crate) fn from_keys(keys: Keys<K>) -> Self {
        Self {
            prev: None,
            next: None,
            keys,
        }
    }

    pub(crate) fn key_count(&self) -> usize {
        self.keys.len()
    }

    pub(crate) fn prev(&self) -> Option<Handle> {
        self.prev
    }

    pub(crate) fn set_prev(&mut self, prev: Option<Handle>) {
        self.prev = prev;
    }

    pub(crate) fn next(&self) -> Option<Handle> {
        self.next
    }

    pub(crate) fn set_next(&mut self, next: Option<Handle>) {
        self.next = next;
    }

    #[inline]
    pub(crate) fn key(&self, index: usize) -> &K {
        &self.keys[index]
    }

    pub(crate) fn keys(&self) -> &[K] {
        &self.keys
    }

    pub(crate) fn first_key(&self) -> Option<&K> {
        self.keys.first()
    }

    pub(crate) fn last_key(&self) -> Option<&K> {
        self.keys.last()
    }

    #[inline]
    pub(crate) fn search<Q>(&self, key: &Q) -> SearchResult
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        match self.keys.binary_search_by(|k| k.borrow().cmp(key)) {
            Ok(idx) => SearchResult::Found(idx),
            Err(idx) => SearchResult::NotFound(idx),
        }
    }

    pub(crate) fn insert(&mut self, index: usize, key: K) {
        self.keys.insert(index, key);
    }

    pub(crate) fn remove(&mut self, index: usize) -> K {
        self.keys.remove(index)
    }

    pub(crate) fn push(&mut self, key: K) {
        self.keys.push(key);
    }

    pub(crate) fn push_front(&mut self, key: K) {
        self.keys.insert(0, key);
    }

    pub(crate) fn pop(&mut self) -> Option<K> {
        self.keys.pop()
    }

    pub(crate) fn pop_front(&mut self) -> Option<K> {
        if self.keys.is_empty() { None } else { Some(self.keys.remove(0)) }
    }

    /// Splits an overfull leaf at `len / 2`. Returns (`separator`, `right`).
    ///
    /// Keys `[mid..]` move to the new right leaf and the separator is a copy of its first key, so every element
    /// stays in the leaf level. Sibling links are left for the caller, which knows the new leaf's handle.
    pub(crate) fn split(&mut self) -> (K, LeafNode<K>)
    where
        K: Clone,
    {
        let mid = self.keys.len() / 2;
        let right = LeafNode::from_keys(self.keys.drain(mid..).collect());
        let separator = right.keys[0].clone();
        (separator, right)
    }

    /// Absorbs the right sibling and takes over its forward link.
    pub(crate) fn merge_with_right(&mut self, mut right: LeafNode<K>) {
        self.keys.append(&mut right.keys);
        self.next = right.next;
    }
}
