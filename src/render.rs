use alloc::{string::String, vec::Vec};
use core::fmt::{self, Write};
use log::{info, warn};

use crate::{
    Key, RbTree,
    node::{NIL, Side},
};

impl<K: Key> RbTree<K> {
    /// Renders the tree breadth-first, one string per level starting at the root.
    ///
    /// Nodes print as `key(COLOR)` and sentinel leaves as `LEAF`, so the last
    /// level is always made of leaves, e.g. `["[20(BLACK)]", "[10(RED), 30(RED)]",
    /// "[LEAF, LEAF, LEAF, LEAF]"]`. An empty tree renders no levels.
    pub fn levels(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if self.root == NIL {
            return lines;
        }

        let mut level = vec![self.root];
        while !level.is_empty() {
            let mut line = String::from("[");
            let mut next = Vec::with_capacity(level.len() * 2);

            for (pos, &idx) in level.iter().enumerate() {
                if pos > 0 {
                    line.push_str(", ");
                }
                if idx == NIL {
                    line.push_str("LEAF");
                    continue;
                }
                // Writing into a String cannot fail.
                let _ = write!(line, "{}", self.node_at(idx));
                next.push(self.child(idx, Side::Left));
                next.push(self.child(idx, Side::Right));
            }

            line.push(']');
            lines.push(line);
            level = next;
        }
        lines
    }

    /// Logs the breadth-first rendering of the tree at info level.
    pub fn print_tree(&self) {
        if self.is_empty() {
            warn!("Tree is empty. Nothing to print.");
            return;
        }

        info!("Printing tree with {} nodes", self.len());
        for line in self.levels() {
            info!("{line}");
        }
    }
}

impl<K: Key> fmt::Display for RbTree<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RbTree with {} nodes", self.len())?;
        for line in self.levels() {
            write!(f, "\n{line}")?;
        }
        Ok(())
    }
}
