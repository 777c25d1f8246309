use alloc::vec::Vec;
use core::borrow::Borrow;

use log::trace;
use smallvec::SmallVec;

use super::arena::Arena;
use super::handle::Handle;
use super::node::{Bounds, InternalNode, LeafNode, Node, SearchResult};

/// The core B+Tree implementation backing `BPlusTreeSet`.
pub(crate) struct RawBPlusTree<K> {
    /// Arena storing all tree nodes.
    nodes: Arena<Node<K>>,
    /// Handle to the root node. An empty tree is a single empty leaf.
    root: Handle,
    /// Occupancy rules for the configured branching factor.
    bounds: Bounds,
    /// Total number of keys stored in leaves.
    len: usize,
    /// Handle to the leftmost leaf, where the leaf chain starts.
    first_leaf: Handle,
    /// Handle to the rightmost leaf, where the leaf chain ends.
    last_leaf: Handle,
}

/// Path element for tracking traversal during mutations.
struct PathElement {
    /// Handle to the node at this level.
    node: Handle,
    /// Index of the child we descended into.
    child_index: usize,
}

/// Stack of internal nodes visited on the way down, root first.
type Path = SmallVec<[PathElement; 16]>;

impl<K> RawBPlusTree<K> {
    /// Creates a new tree holding a single empty leaf.
    pub(crate) fn new(bounds: Bounds) -> Self {
        let mut nodes = Arena::new();
        let root = nodes.alloc(Node::Leaf(LeafNode::new()));
        Self {
            nodes,
            root,
            bounds,
            len: 0,
            first_leaf: root,
            last_leaf: root,
        }
    }

    pub(crate) const fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Returns the number of keys in the tree.
    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the root is a leaf with no keys.
    pub(crate) fn is_empty(&self) -> bool {
        match self.nodes.get(self.root) {
            Node::Leaf(leaf) => leaf.key_count() == 0,
            Node::Internal(_) => false,
        }
    }

    /// Discards every node and starts over from a single empty leaf.
    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.root = self.nodes.alloc(Node::Leaf(LeafNode::new()));
        self.first_leaf = self.root;
        self.last_leaf = self.root;
        self.len = 0;
    }

    pub(crate) const fn root(&self) -> Handle {
        self.root
    }

    pub(crate) const fn first_leaf(&self) -> Handle {
        self.first_leaf
    }

    pub(crate) const fn last_leaf(&self) -> Handle {
        self.last_leaf
    }

    pub(crate) fn node(&self, handle: Handle) -> &Node<K> {
        self.nodes.get(handle)
    }

    /// Smallest key in the tree. Non-root leaves are never empty, so the first leaf is enough.
    pub(crate) fn first(&self) -> Option<&K> {
        self.nodes.get(self.first_leaf).as_leaf().first_key()
    }

    /// Largest key in the tree.
    pub(crate) fn last(&self) -> Option<&K> {
        self.nodes.get(self.last_leaf).as_leaf().last_key()
    }

    /// Smallest key stored under `handle`.
    fn leftmost_key(&self, mut handle: Handle) -> &K {
        loop {
            match self.nodes.get(handle) {
                Node::Internal(internal) => handle = internal.child(0),
                Node::Leaf(leaf) => return leaf.key(0),
            }
        }
    }
}

impl<K: Clone + Ord> RawBPlusTree<K> {
    /// Walks from the root to the leaf covering `key`, recording each internal node passed through.
    fn descend<Q>(&self, key: &Q, path: &mut Path) -> Handle
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut current = self.root;
        while let Node::Internal(internal) = self.nodes.get(current) {
            let child_index = internal.search_child(key);
            path.push(PathElement {
                node: current,
                child_index,
            });
            current = internal.child(child_index);
        }
        current
    }

    /// Returns a reference to the stored key equal to `key`, if any.
    pub(crate) fn get<Q>(&self, key: &Q) -> Option<&K>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut current = self.root;
        loop {
            match self.nodes.get(current) {
                Node::Internal(internal) => current = internal.child(internal.search_child(key)),
                Node::Leaf(leaf) => {
                    return match leaf.search(key) {
                        SearchResult::Found(idx) => Some(leaf.key(idx)),
                        SearchResult::NotFound(_) => None,
                    };
                }
            }
        }
    }

    /// Returns true if the tree contains `key`.
    pub(crate) fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.get(key).is_some()
    }

    /// Inserts `key`. Returns false, leaving the tree untouched, if it was already present.
    pub(crate) fn insert(&mut self, key: K) -> bool {
        let mut path = Path::new();
        let leaf_handle = self.descend(&key, &mut path);

        let leaf = self.nodes.get_mut(leaf_handle).as_leaf_mut();
        let SearchResult::NotFound(idx) = leaf.search(&key) else {
            return false;
        };
        leaf.insert(idx, key);
        self.len += 1;

        if self.nodes.get(leaf_handle).is_overfull(self.bounds) {
            self.split_leaf_and_propagate(leaf_handle, &mut path);
        }
        true
    }

    /// Splits an overfull leaf, links the new right half into the leaf chain, and pushes the separator up.
    fn split_leaf_and_propagate(&mut self, leaf_handle: Handle, path: &mut Path) {
        let leaf = self.nodes.get_mut(leaf_handle).as_leaf_mut();
        let (separator, mut right) = leaf.split();
        let old_next = leaf.next();
        right.set_prev(Some(leaf_handle));
        right.set_next(old_next);

        let right_handle = self.nodes.alloc(Node::Leaf(right));
        self.nodes.get_mut(leaf_handle).as_leaf_mut().set_next(Some(right_handle));
        match old_next {
            Some(next) => self.nodes.get_mut(next).as_leaf_mut().set_prev(Some(right_handle)),
            None => self.last_leaf = right_handle,
        }
        trace!("split leaf {leaf_handle:?}, new sibling {right_handle:?}");

        self.propagate_split(path, separator, right_handle);
    }

    /// Inserts `separator`/`new_child` into each parent on the path until one has room.
    /// Grows a new root if the old root splits.
    fn propagate_split(&mut self, path: &mut Path, mut separator: K, mut new_child: Handle) {
        while let Some(PathElement { node, child_index }) = path.pop() {
            let parent = self.nodes.get_mut(node).as_internal_mut();
            parent.insert_child(child_index, separator, new_child);
            if parent.key_count() <= self.bounds.max_keys() {
                return;
            }

            let (median, right) = parent.split();
            new_child = self.nodes.alloc(Node::Internal(right));
            separator = median;
            trace!("split internal {node:?}, new sibling {new_child:?}");
        }

        let old_root = self.root;
        self.root = self.nodes.alloc(Node::Internal(InternalNode::new_root(old_root, separator, new_child)));
        trace!("root {old_root:?} split, tree grew to new root {:?}", self.root);
    }

    /// Removes `key`. Returns false, leaving the tree untouched, if it was not present.
    pub(crate) fn remove<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut path = Path::new();
        let leaf_handle = self.descend(key, &mut path);

        let leaf = self.nodes.get_mut(leaf_handle).as_leaf_mut();
        let SearchResult::Found(idx) = leaf.search(key) else {
            return false;
        };
        leaf.remove(idx);
        self.len -= 1;

        // Repair bottom-up: a merge removes a key from the parent, which may leave the parent underfull in turn.
        let mut child = leaf_handle;
        while let Some(PathElement { node, child_index }) = path.pop() {
            if !self.nodes.get(child).is_underfull(self.bounds) {
                break;
            }
            self.rebalance_child(node, child_index);
            child = node;
        }

        self.shrink_root();
        true
    }

    /// Fixes an underfull child: borrow from the left, else borrow from the right, else merge.
    fn rebalance_child(&mut self, parent: Handle, index: usize) {
        let bounds = self.bounds;
        let node = self.nodes.get(parent).as_internal();
        let child_count = node.child_count();

        if index > 0 && self.nodes.get(node.child(index - 1)).can_lend(bounds) {
            self.borrow_from_left(parent, index);
        } else if index + 1 < child_count && self.nodes.get(node.child(index + 1)).can_lend(bounds) {
            self.borrow_from_right(parent, index);
        } else if index + 1 < child_count {
            self.merge_children(parent, index);
        } else {
            self.merge_children(parent, index - 1);
        }
    }

    /// Rotates right: the left sibling's last key (leaf) or last child (internal) moves into the front of the
    /// child at `index`. The separator between them becomes the child's new smallest key.
    fn borrow_from_left(&mut self, parent: Handle, index: usize) {
        let parent_node = self.nodes.get(parent).as_internal();
        let child = parent_node.child(index);
        let left = parent_node.child(index - 1);

        match self.nodes.get_mut(left) {
            Node::Leaf(left_leaf) => {
                let key = left_leaf.pop().expect("`RawBPlusTree::borrow_from_left()` - sibling cannot lend!");
                self.nodes.get_mut(parent).as_internal_mut().set_key(index - 1, key.clone());
                self.nodes.get_mut(child).as_leaf_mut().push_front(key);
            }
            Node::Internal(left_internal) => {
                let (_, moved) =
                    left_internal.pop_back().expect("`RawBPlusTree::borrow_from_left()` - sibling cannot lend!");
                let separator = self.leftmost_key(moved).clone();
                let old_separator = self.nodes.get_mut(parent).as_internal_mut().set_key(index - 1, separator);
                self.nodes.get_mut(child).as_internal_mut().push_front(moved, old_separator);
            }
        }
        trace!("child {child:?} borrowed from left sibling {left:?}");
    }

    /// Rotates left: the right sibling's first key (leaf) or first child (internal) moves onto the end of the
    /// child at `index`. The separator between them becomes the right sibling's new smallest key.
    fn borrow_from_right(&mut self, parent: Handle, index: usize) {
        let parent_node = self.nodes.get(parent).as_internal();
        let child = parent_node.child(index);
        let right = parent_node.child(index + 1);

        match self.nodes.get_mut(right) {
            Node::Leaf(right_leaf) => {
                let key =
                    right_leaf.pop_front().expect("`RawBPlusTree::borrow_from_right()` - sibling cannot lend!");
                let separator = right_leaf.key(0).clone();
                self.nodes.get_mut(parent).as_internal_mut().set_key(index, separator);
                self.nodes.get_mut(child).as_leaf_mut().push(key);
            }
            Node::Internal(right_internal) => {
                let (moved, _) =
                    right_internal.pop_front().expect("`RawBPlusTree::borrow_from_right()` - sibling cannot lend!");
                let separator = self.leftmost_key(right).clone();
                let old_separator = self.nodes.get_mut(parent).as_internal_mut().set_key(index, separator);
                self.nodes.get_mut(child).as_internal_mut().push_back(old_separator, moved);
            }
        }
        trace!("child {child:?} borrowed from right sibling {right:?}");
    }

    /// Folds the child at `index + 1` into the child at `index`, dropping one separator and one child pointer
    /// from the parent.
    fn merge_children(&mut self, parent: Handle, index: usize) {
        let parent_node = self.nodes.get_mut(parent).as_internal_mut();
        let (separator, right_handle) = parent_node.remove_child(index);
        let left_handle = parent_node.child(index);

        match self.nodes.take(right_handle) {
            Node::Leaf(right) => {
                let left = self.nodes.get_mut(left_handle).as_leaf_mut();
                left.merge_with_right(right);
                match left.next() {
                    Some(next) => self.nodes.get_mut(next).as_leaf_mut().set_prev(Some(left_handle)),
                    None => self.last_leaf = left_handle,
                }
            }
            Node::Internal(right) => {
                self.nodes.get_mut(left_handle).as_internal_mut().merge_with_right(separator, right);
            }
        }
        trace!("merged {right_handle:?} into {left_handle:?} under {parent:?}");
    }

    /// Replaces an internal root that lost its last separator with its only child.
    fn shrink_root(&mut self) {
        let new_root = match self.nodes.get(self.root) {
            Node::Internal(root) if root.key_count() == 0 => root.child(0),
            _ => return,
        };
        let old_root = self.root;
        self.nodes.free(old_root);
        self.root = new_root;
        trace!("root {old_root:?} emptied, tree shrank to root {new_root:?}");
    }
}

impl<K: Clone> Clone for RawBPlusTree<K> {
    fn clone(&self) -> Self {
        fn clone_node<K: Clone>(
            old_nodes: &Arena<Node<K>>,
            new_nodes: &mut Arena<Node<K>>,
            leaves: &mut Vec<Handle>,
            old_handle: Handle,
        ) -> Handle {
            match old_nodes.get(old_handle) {
                Node::Leaf(leaf) => {
                    // prev/next are fixed up once every leaf has a handle.
                    let copy = LeafNode::from_keys(leaf.keys().iter().cloned().collect());
                    let handle = new_nodes.alloc(Node::Leaf(copy));
                    leaves.push(handle);
                    handle
                }
                Node::Internal(internal) => {
                    let children = internal
                        .children()
                        .iter()
                        .map(|&child| clone_node(old_nodes, new_nodes, leaves, child))
                        .collect();
                    let copy = InternalNode::from_parts(internal.keys().iter().cloned().collect(), children);
                    new_nodes.alloc(Node::Internal(copy))
                }
            }
        }

        let mut nodes = Arena::new();
        let mut leaves = Vec::new();
        let root = clone_node(&self.nodes, &mut nodes, &mut leaves, self.root);

        // Depth-first, left-to-right cloning visits leaves in key order.
        for (i, &handle) in leaves.iter().enumerate() {
            let leaf = nodes.get_mut(handle).as_leaf_mut();
            leaf.set_prev(i.checked_sub(1).map(|prev| leaves[prev]));
            leaf.set_next(leaves.get(i + 1).copied());
        }

        Self {
            nodes,
            root,
            bounds: self.bounds,
            len: self.len,
            first_leaf: leaves[0],
            last_leaf: leaves[leaves.len() - 1],
        }
    }
}
