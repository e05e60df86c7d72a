use core::fmt;

use crate::Key;

/// Arena slot reserved for the sentinel leaf.
///
/// Every empty child link and the root's parent link hold this handle.
pub(crate) const NIL: usize = 0;

/// Red-Black tree node colors used to maintain tree balance properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    /// Red node - both children must be black
    Red,
    /// Black node - contributes one to the black-height of every path through it
    Black,
}

impl Color {
    /// Contribution of a node of this color to a black-height count
    #[inline]
    pub(crate) const fn weight(self) -> usize {
        match self {
            Color::Red => 0,
            Color::Black => 1,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Red => f.write_str("RED"),
            Color::Black => f.write_str("BLACK"),
        }
    }
}

/// Child position relative to a parent node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Side {
    Left,
    Right,
}

impl Side {
    #[inline]
    pub(crate) const fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// A node in the arena, holding its key, color and arena handles of its
/// parent and children.
#[derive(Debug, Clone)]
pub(crate) struct Node<K> {
    /// The stored key. Placeholder in the sentinel slot and never read there.
    pub(crate) key: K,

    /// Color of this node used for Red-Black tree balancing
    pub(crate) color: Color,

    /// Handle of the parent node ([`NIL`] for the root)
    pub(crate) parent: usize,

    /// Handle of the left child ([`NIL`] if there is none)
    pub(crate) left: usize,

    /// Handle of the right child ([`NIL`] if there is none)
    pub(crate) right: usize,
}

impl<K: Key> Node<K> {
    /// Builds the shared sentinel leaf: black, keyless and linked only to itself.
    pub(crate) fn sentinel() -> Self {
        Self {
            key: K::zero(),
            color: Color::Black,
            parent: NIL,
            left: NIL,
            right: NIL,
        }
    }

    /// Builds a freshly inserted node: red, with both children on the sentinel.
    pub(crate) const fn leaf(key: K, parent: usize) -> Self {
        Self {
            key,
            color: Color::Red,
            parent,
            left: NIL,
            right: NIL,
        }
    }

    #[inline]
    pub(crate) const fn child(&self, side: Side) -> usize {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    #[inline]
    pub(crate) const fn child_mut(&mut self, side: Side) -> &mut usize {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }
}

impl<K: Key> fmt::Display for Node<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.key, self.color)
    }
}
