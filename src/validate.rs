use ahash::RandomState;
use core::fmt;
use hashbrown::HashSet;

use crate::{
    Key, RbTree,
    node::{Color, NIL, Side},
};

/// A broken red-black or binary-search-tree invariant found by [`RbTree::check`].
///
/// Any of these means the tree has been corrupted by a bug; none is produced by
/// ordinary insertions and deletions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation<K> {
    /// The sentinel leaf is red or has been linked to real nodes
    CorruptSentinel,
    /// The root lists a parent
    RootHasParent {
        /// Key of the root
        key: K,
    },
    /// The root is red
    RedRoot {
        /// Key of the root
        key: K,
    },
    /// A red node has a red child
    RedChildOfRed {
        /// Key of the red parent
        parent: K,
        /// Key of the red child
        child: K,
    },
    /// Paths through the two children of a node count different numbers of black nodes
    BlackHeightMismatch {
        /// Key of the node whose subtrees disagree
        key: K,
        /// Black nodes on every path down the left subtree
        left: usize,
        /// Black nodes on every path down the right subtree
        right: usize,
    },
    /// A key lies outside the open interval its position in the tree allows
    OutOfOrder {
        /// The misplaced key
        key: K,
        /// Exclusive lower bound, `None` if unbounded
        lower: Option<K>,
        /// Exclusive upper bound, `None` if unbounded
        upper: Option<K>,
    },
    /// A child does not list the node that links to it as its parent
    BrokenParentLink {
        /// Key of the node linking to the child
        parent: K,
        /// Key of the child
        child: K,
    },
    /// A node is linked from more than one place
    SharedNode {
        /// Key of the node reached twice
        key: K,
    },
    /// The number of reachable nodes differs from the recorded length
    LengthMismatch {
        /// The recorded length
        expected: usize,
        /// Nodes reachable from the root
        reachable: usize,
    },
}

impl<K: Key> fmt::Display for Violation<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::CorruptSentinel => f.write_str("sentinel leaf is not a black childless node"),
            Violation::RootHasParent { key } => write!(f, "root {key} has a parent"),
            Violation::RedRoot { key } => write!(f, "root {key} is red"),
            Violation::RedChildOfRed { parent, child } => {
                write!(f, "red node {parent} has red child {child}")
            }
            Violation::BlackHeightMismatch { key, left, right } => write!(
                f,
                "non-matching black-heights below {key}: left {left}, right {right}"
            ),
            Violation::OutOfOrder { key, lower, upper } => {
                write!(f, "key {key} outside bounds (")?;
                match lower {
                    Some(lower) => write!(f, "{lower}")?,
                    None => f.write_str("-inf")?,
                }
                f.write_str(", ")?;
                match upper {
                    Some(upper) => write!(f, "{upper}")?,
                    None => f.write_str("+inf")?,
                }
                f.write_str(")")
            }
            Violation::BrokenParentLink { parent, child } => {
                write!(f, "{parent} links to {child}, which shows a different parent")
            }
            Violation::SharedNode { key } => write!(f, "node {key} is reachable twice"),
            Violation::LengthMismatch {
                expected,
                reachable,
            } => write!(f, "tree records {expected} nodes but {reachable} are reachable"),
        }
    }
}

type Visited = HashSet<usize, RandomState>;

impl<K: Key> RbTree<K> {
    /// Checks every red-black and binary-search-tree invariant over the whole tree.
    ///
    /// O(n). Meant for tests and debugging.
    ///
    /// # Returns
    ///
    /// * `Result<usize, Violation<K>>` - The black-height of the root, or the first
    ///   violation found
    pub fn check(&self) -> Result<usize, Violation<K>> {
        let sentinel = self.node_at(NIL);
        if sentinel.color != Color::Black
            || sentinel.parent != NIL
            || sentinel.left != NIL
            || sentinel.right != NIL
        {
            return Err(Violation::CorruptSentinel);
        }

        if self.root == NIL {
            return if self.is_empty() {
                Ok(0)
            } else {
                Err(Violation::LengthMismatch {
                    expected: self.len(),
                    reachable: 0,
                })
            };
        }

        let root = self.node_at(self.root);
        if root.parent != NIL {
            return Err(Violation::RootHasParent { key: root.key });
        }
        if root.color != Color::Black {
            return Err(Violation::RedRoot { key: root.key });
        }

        let mut visited = Visited::with_capacity_and_hasher(self.len(), RandomState::default());
        let height = self.check_subtree(self.root, None, None, &mut visited)?;

        if visited.len() != self.len() {
            return Err(Violation::LengthMismatch {
                expected: self.len(),
                reachable: visited.len(),
            });
        }

        Ok(height - root.color.weight())
    }

    /// Panics with a description of the offending node if any invariant is broken.
    ///
    /// # Panics
    ///
    /// If [`check`](Self::check) reports a violation.
    pub fn validate(&self) {
        if let Err(violation) = self.check() {
            panic!("red-black tree invariant violated: {violation}");
        }
    }

    /// Returns the number of black nodes on every path from `idx` down to a
    /// sentinel, counting both ends.
    fn check_subtree(
        &self,
        idx: usize,
        lower: Option<K>,
        upper: Option<K>,
        visited: &mut Visited,
    ) -> Result<usize, Violation<K>> {
        if idx == NIL {
            return Ok(Color::Black.weight());
        }

        let node = self.node_at(idx);
        if !visited.insert(idx) {
            return Err(Violation::SharedNode { key: node.key });
        }

        let below_lower = lower.is_some_and(|lower| node.key <= lower);
        let above_upper = upper.is_some_and(|upper| node.key >= upper);
        if below_lower || above_upper {
            return Err(Violation::OutOfOrder {
                key: node.key,
                lower,
                upper,
            });
        }

        let mut heights = [0; 2];
        for (slot, side) in [Side::Left, Side::Right].into_iter().enumerate() {
            let child = node.child(side);
            if child == NIL {
                heights[slot] = self.check_subtree(child, lower, upper, visited)?;
                continue;
            }

            let child_node = self.node_at(child);
            if child_node.parent != idx {
                return Err(Violation::BrokenParentLink {
                    parent: node.key,
                    child: child_node.key,
                });
            }
            if node.color == Color::Red && child_node.color == Color::Red {
                return Err(Violation::RedChildOfRed {
                    parent: node.key,
                    child: child_node.key,
                });
            }

            heights[slot] = match side {
                Side::Left => self.check_subtree(child, lower, Some(node.key), visited)?,
                Side::Right => self.check_subtree(child, Some(node.key), upper, visited)?,
            };
        }

        let [left, right] = heights;
        if left != right {
            return Err(Violation::BlackHeightMismatch {
                key: node.key,
                left,
                right,
            });
        }

        Ok(left + node.color.weight())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    fn triplet() -> RbTree {
        let mut tree = RbTree::new();
        for key in [10, 20, 30] {
            tree.insert(key);
        }
        tree
    }

    fn slot(tree: &RbTree, key: i32) -> usize {
        tree.find_node(key).unwrap()
    }

    #[test]
    fn test_black_height_of_valid_trees() {
        assert_eq!(RbTree::<i32>::new().check(), Ok(0));
        assert_eq!(triplet().check(), Ok(1));

        let mut tree = triplet();
        tree.insert(5);
        assert_eq!(tree.check(), Ok(2));
    }

    #[test]
    fn test_red_root_detected() {
        let mut tree = triplet();
        let root = tree.root;
        tree.nodes[root].color = Color::Red;
        assert_eq!(tree.check(), Err(Violation::RedRoot { key: 20 }));
    }

    #[test]
    fn test_red_child_of_red_detected() {
        let mut tree = triplet();
        tree.insert(5);
        let ten = slot(&tree, 10);
        tree.nodes[ten].color = Color::Red;

        assert_eq!(
            tree.check(),
            Err(Violation::RedChildOfRed {
                parent: 10,
                child: 5
            })
        );
    }

    #[test]
    fn test_black_height_mismatch_detected() {
        let mut tree = triplet();
        let ten = slot(&tree, 10);
        tree.nodes[ten].color = Color::Black;

        assert_eq!(
            tree.check(),
            Err(Violation::BlackHeightMismatch {
                key: 20,
                left: 2,
                right: 1
            })
        );
    }

    #[test]
    fn test_out_of_order_key_detected() {
        let mut tree = triplet();
        let ten = slot(&tree, 10);
        tree.nodes[ten].key = 25;

        assert_eq!(
            tree.check(),
            Err(Violation::OutOfOrder {
                key: 25,
                lower: None,
                upper: Some(20)
            })
        );
    }

    #[test]
    fn test_broken_parent_link_detected() {
        let mut tree = triplet();
        let ten = slot(&tree, 10);
        let thirty = slot(&tree, 30);
        tree.nodes[ten].parent = thirty;

        assert_eq!(
            tree.check(),
            Err(Violation::BrokenParentLink {
                parent: 20,
                child: 10
            })
        );
    }

    #[test]
    fn test_shared_node_detected() {
        let mut tree = triplet();
        let root = tree.root;
        let ten = slot(&tree, 10);
        tree.nodes[root].right = ten;

        assert_eq!(tree.check(), Err(Violation::SharedNode { key: 10 }));
    }

    #[test]
    fn test_detached_node_detected() {
        let mut tree = triplet();
        let root = tree.root;
        tree.nodes[root].left = NIL;

        assert_eq!(
            tree.check(),
            Err(Violation::LengthMismatch {
                expected: 3,
                reachable: 2
            })
        );
    }

    #[test]
    fn test_corrupt_sentinel_detected() {
        let mut tree = triplet();
        tree.nodes[NIL].color = Color::Red;
        assert_eq!(tree.check(), Err(Violation::CorruptSentinel));

        let mut tree = triplet();
        let ten = slot(&tree, 10);
        tree.nodes[NIL].parent = ten;
        assert_eq!(tree.check(), Err(Violation::CorruptSentinel));
    }

    #[test]
    fn test_violation_messages_name_the_node() {
        let violation = Violation::OutOfOrder {
            key: 25,
            lower: None,
            upper: Some(20),
        };
        assert_eq!(violation.to_string(), "key 25 outside bounds (-inf, 20)");

        let violation = Violation::BlackHeightMismatch {
            key: 7,
            left: 3,
            right: 2,
        };
        assert_eq!(
            violation.to_string(),
            "non-matching black-heights below 7: left 3, right 2"
        );
    }

    #[test]
    #[should_panic(expected = "red-black tree invariant violated: root 20 is red")]
    fn test_validate_panics_on_violation() {
        let mut tree = triplet();
        let root = tree.root;
        tree.nodes[root].color = Color::Red;
        tree.validate();
    }
}
