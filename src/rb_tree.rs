use alloc::vec::Vec;
use core::cmp::Ordering;
use log::{debug, trace, warn};

use crate::{
    Key,
    node::{Color, NIL, Node, Side},
};

/// A Red-Black tree of unique integer keys with O(log n) search, insertion and deletion.
///
/// Nodes live in an arena of slots addressed by `usize` handles. Slot 0 holds the
/// sentinel leaf which stands in for every absent child and for the parent of the
/// root; it is always black and never holds a key. Slots vacated by deletion are
/// kept on a free list and reused by later insertions.
///
/// Key features:
/// - Parent links are plain handles used only for upward traversal during repair
/// - Both repair protocols run as loops, never recursion
/// - Debug builds verify every invariant after each mutation
#[derive(Debug, Clone)]
pub struct RbTree<K: Key = i32> {
    /// Node storage, slot [`NIL`] being the sentinel
    pub(crate) nodes: Vec<Node<K>>,

    /// Stack of vacated slots available for reuse
    free_list: Vec<usize>,

    /// Handle of the root node, [`NIL`] when the tree is empty
    pub(crate) root: usize,

    /// Number of keys currently stored
    len: usize,
}

impl<K: Key> Default for RbTree<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Key> RbTree<K> {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty tree with room for `capacity` keys before the arena reallocates.
    pub fn with_capacity(capacity: usize) -> Self {
        let mut nodes = Vec::with_capacity(capacity.saturating_add(1));
        nodes.push(Node::sentinel());

        Self {
            nodes,
            free_list: Vec::new(),
            root: NIL,
            len: 0,
        }
    }

    /// Returns the number of keys in the tree
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the tree holds no keys
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns true if `key` is stored in the tree.
    pub fn search(&self, key: K) -> bool {
        self.find_node(key).is_some()
    }

    /// Inserts `key`, rebalancing as needed.
    ///
    /// # Returns
    ///
    /// * `bool` - `false` if the key was already present, in which case the tree is untouched
    pub fn insert(&mut self, key: K) -> bool {
        let mut parent = NIL;
        let mut side = Side::Left;
        let mut current = self.root;

        while current != NIL {
            side = match key.cmp(&self.node_at(current).key) {
                Ordering::Equal => {
                    debug!("Key {key} already present, insert skipped");
                    return false;
                }
                Ordering::Less => Side::Left,
                Ordering::Greater => Side::Right,
            };
            parent = current;
            current = self.child(current, side);
        }

        let new_idx = self.allocate_node(key, parent);
        if parent == NIL {
            self.root = new_idx;
        } else {
            self.set_child(parent, side, new_idx);
        }
        self.len += 1;

        self.fix_insertion_violations(new_idx);

        // A rotation may have lifted another node above the old root.
        self.root = self.find_root(new_idx);

        #[cfg(debug_assertions)]
        debug_assert!(
            self.check().is_ok(),
            "RB tree invariants violated after insertion"
        );

        true
    }

    /// Removes `key` from the tree, rebalancing as needed.
    ///
    /// Deleting an absent key leaves the tree untouched and logs a warning.
    ///
    /// # Returns
    ///
    /// * `bool` - `true` if a key was removed
    pub fn delete(&mut self, key: K) -> bool {
        let Some(node_idx) = self.find_node(key) else {
            warn!("Node with key {key} not found. Nothing to delete.");
            return false;
        };

        let node = self.node_at(node_idx);
        let target = if node.left != NIL && node.right != NIL {
            // Internal node: move the neighbouring key up and remove its old slot instead.
            match self
                .in_order_predecessor(node_idx)
                .or_else(|| self.in_order_successor(node_idx))
            {
                Some(swap_idx) => {
                    let swap_key = self.node_at(swap_idx).key;
                    self.node_at_mut(node_idx).key = swap_key;
                    swap_idx
                }
                None => node_idx,
            }
        } else {
            node_idx
        };

        self.delete_one_child(target);
        self.len -= 1;

        #[cfg(debug_assertions)]
        debug_assert!(
            self.check().is_ok(),
            "RB tree invariants violated after removal"
        );

        true
    }

    fn allocate_node(&mut self, key: K, parent: usize) -> usize {
        let node = Node::leaf(key, parent);
        match self.free_list.pop() {
            Some(idx) => {
                self.nodes[idx] = node;
                idx
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        }
    }

    #[inline]
    fn deallocate_node(&mut self, idx: usize) {
        debug_assert!(idx != NIL, "cannot free the sentinel slot");
        self.free_list.push(idx);
    }

    #[inline]
    pub(crate) fn node_at(&self, idx: usize) -> &Node<K> {
        &self.nodes[idx]
    }

    #[inline]
    pub(crate) fn node_at_mut(&mut self, idx: usize) -> &mut Node<K> {
        debug_assert!(idx != NIL, "the sentinel is immutable");
        &mut self.nodes[idx]
    }

    pub(crate) fn find_node(&self, key: K) -> Option<usize> {
        let mut current = self.root;

        while current != NIL {
            let node = self.node_at(current);
            match key.cmp(&node.key) {
                Ordering::Equal => return Some(current),
                Ordering::Less => current = node.left,
                Ordering::Greater => current = node.right,
            }
        }
        None
    }

    fn find_root(&self, mut node: usize) -> usize {
        while self.get_parent(node) != NIL {
            node = self.get_parent(node);
        }
        node
    }

    /// Maximum of the left subtree
    fn in_order_predecessor(&self, node: usize) -> Option<usize> {
        let mut current = self.child(node, Side::Left);
        if current == NIL {
            return None;
        }
        while self.child(current, Side::Right) != NIL {
            current = self.child(current, Side::Right);
        }
        Some(current)
    }

    /// Minimum of the right subtree
    fn in_order_successor(&self, node: usize) -> Option<usize> {
        let mut current = self.child(node, Side::Right);
        if current == NIL {
            return None;
        }
        while self.child(current, Side::Left) != NIL {
            current = self.child(current, Side::Left);
        }
        Some(current)
    }

    #[inline]
    pub(crate) fn get_color(&self, idx: usize) -> Color {
        if idx == NIL {
            Color::Black
        } else {
            self.node_at(idx).color
        }
    }

    #[inline]
    fn set_color(&mut self, idx: usize, color: Color) {
        if idx != NIL {
            self.node_at_mut(idx).color = color;
        }
    }

    #[inline]
    fn is_red(&self, idx: usize) -> bool {
        self.get_color(idx) == Color::Red
    }

    #[inline]
    fn is_black(&self, idx: usize) -> bool {
        self.get_color(idx) == Color::Black
    }

    #[inline]
    pub(crate) fn get_parent(&self, idx: usize) -> usize {
        if idx == NIL {
            NIL
        } else {
            self.node_at(idx).parent
        }
    }

    #[inline]
    pub(crate) fn child(&self, idx: usize, side: Side) -> usize {
        if idx == NIL {
            NIL
        } else {
            self.node_at(idx).child(side)
        }
    }

    #[inline]
    fn set_child(&mut self, idx: usize, side: Side, child: usize) {
        *self.node_at_mut(idx).child_mut(side) = child;
    }

    /// Which side of `parent` the non-sentinel `child` hangs from.
    fn side_of(&self, child: usize, parent: usize) -> Side {
        let parent_node = self.node_at(parent);
        debug_assert!(
            child == parent_node.left || child == parent_node.right,
            "{} lists parent {} which links to neither side",
            self.node_at(child),
            parent_node
        );
        if child == parent_node.left {
            Side::Left
        } else {
            Side::Right
        }
    }

    /// Rotates the subtree at `pivot` toward `toward`, promoting the child on the
    /// opposite side into the pivot's place. Colors and keys are untouched.
    ///
    /// # Panics
    ///
    /// If the promoted child is the sentinel.
    pub(crate) fn rotate(&mut self, pivot: usize, toward: Side) {
        assert!(pivot != NIL, "rotate: pivot is the sentinel leaf");
        let far = toward.opposite();
        let centre = self.child(pivot, far);
        assert!(
            centre != NIL,
            "rotate: cannot rotate {} toward {:?}, its {:?} child is a LEAF",
            self.node_at(pivot),
            toward,
            far
        );

        let inner = self.child(centre, toward);
        self.set_child(pivot, far, inner);
        if inner != NIL {
            self.node_at_mut(inner).parent = pivot;
        }

        let parent = self.get_parent(pivot);
        self.node_at_mut(centre).parent = parent;
        if parent == NIL {
            self.root = centre;
        } else {
            let pivot_side = self.side_of(pivot, parent);
            self.set_child(parent, pivot_side, centre);
        }

        self.set_child(centre, toward, pivot);
        self.node_at_mut(pivot).parent = centre;
    }

    fn fix_insertion_violations(&mut self, mut node: usize) {
        loop {
            let parent = self.get_parent(node);
            if parent == NIL {
                trace!("insert repair: {} is the root", self.node_at(node));
                self.set_color(node, Color::Black);
                return;
            }
            if self.is_black(parent) {
                return;
            }

            // A red parent is never the root, so the grandparent exists.
            let grandparent = self.get_parent(parent);
            let parent_side = self.side_of(parent, grandparent);
            let uncle = self.child(grandparent, parent_side.opposite());

            if self.is_red(uncle) {
                trace!("insert repair: red uncle, recolor at {}", self.node_at(grandparent));
                self.set_color(parent, Color::Black);
                self.set_color(uncle, Color::Black);
                self.set_color(grandparent, Color::Red);
                node = grandparent;
                continue;
            }

            let mut parent = parent;
            if self.side_of(node, parent) != parent_side {
                trace!("insert repair: {} is an inner grandchild", self.node_at(node));
                self.rotate(parent, parent_side);
                node = parent;
                parent = self.get_parent(node);
            }

            self.rotate(grandparent, self.side_of(node, parent).opposite());
            self.set_color(parent, Color::Black);
            self.set_color(grandparent, Color::Red);
            return;
        }
    }

    /// Splices out `target`, which has at most one non-sentinel child.
    fn delete_one_child(&mut self, target: usize) {
        let node = self.node_at(target);
        debug_assert!(
            node.left == NIL || node.right == NIL,
            "delete_one_child: {} has two non-leaf children",
            node
        );

        let child = if node.right == NIL { node.left } else { node.right };
        let removed_color = node.color;
        let parent = node.parent;

        let side = if parent == NIL {
            self.root = child;
            None
        } else {
            let side = self.side_of(target, parent);
            self.set_child(parent, side, child);
            Some(side)
        };
        if child != NIL {
            self.node_at_mut(child).parent = parent;
        }
        self.deallocate_node(target);

        if removed_color == Color::Red {
            return;
        }
        if self.is_red(child) {
            self.set_color(child, Color::Black);
        } else if let Some(side) = side {
            self.fix_deletion_violations(parent, side);
        }
    }

    /// Restores the black-height of the subtree hanging from `parent` on `side`,
    /// which is one black node short.
    ///
    /// The deficient position is tracked as a parent and side rather than a node,
    /// since it may be the shared sentinel.
    fn fix_deletion_violations(&mut self, mut parent: usize, mut side: Side) {
        loop {
            let far = side.opposite();
            let mut sibling = self.child(parent, far);

            if self.is_red(sibling) {
                trace!("delete repair: red sibling {}", self.node_at(sibling));
                self.set_color(parent, Color::Red);
                self.set_color(sibling, Color::Black);
                self.rotate(parent, side);
                sibling = self.child(parent, far);
            }

            let near_nephew = self.child(sibling, side);
            let far_nephew = self.child(sibling, far);
            let nephews_black = self.is_black(near_nephew) && self.is_black(far_nephew);

            if self.is_black(parent) && self.is_black(sibling) && nephews_black {
                trace!("delete repair: deficit moves up to {}", self.node_at(parent));
                self.set_color(sibling, Color::Red);
                let node = parent;
                parent = self.get_parent(node);
                if parent == NIL {
                    return;
                }
                side = self.side_of(node, parent);
                continue;
            }

            if self.is_red(parent) && self.is_black(sibling) && nephews_black {
                trace!("delete repair: red parent {} absorbs deficit", self.node_at(parent));
                self.set_color(sibling, Color::Red);
                self.set_color(parent, Color::Black);
                return;
            }

            if self.is_black(sibling) && self.is_red(near_nephew) && self.is_black(far_nephew) {
                trace!("delete repair: near nephew {} is red", self.node_at(near_nephew));
                self.set_color(sibling, Color::Red);
                self.set_color(near_nephew, Color::Black);
                self.rotate(sibling, far);
                sibling = self.child(parent, far);
            }

            self.set_color(sibling, self.get_color(parent));
            self.set_color(parent, Color::Black);
            self.set_color(self.child(sibling, far), Color::Black);
            self.rotate(parent, side);
            return;
        }
    }

    /// Keys in ascending order
    #[cfg(test)]
    pub(crate) fn in_order_keys(&self) -> Vec<K> {
        let mut keys = Vec::with_capacity(self.len);
        let mut stack = Vec::new();
        let mut current = self.root;

        while current != NIL || !stack.is_empty() {
            while current != NIL {
                stack.push(current);
                current = self.child(current, Side::Left);
            }
            if let Some(idx) = stack.pop() {
                keys.push(self.node_at(idx).key);
                current = self.child(idx, Side::Right);
            }
        }
        keys
    }
}
