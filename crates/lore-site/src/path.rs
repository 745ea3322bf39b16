//! Node collection index and breadcrumb path resolution.

use std::collections::HashMap;

use crate::error::NavigationError;
use crate::model::{Discipline, Node};

/// Flat node collection indexed by id.
///
/// On duplicate ids the first node in collection order wins.
#[derive(Debug, Default)]
pub struct NodeTree {
    nodes: Vec<Node>,
    index: HashMap<String, usize>,
}

impl NodeTree {
    /// Build an index over `nodes`, keeping their order.
    #[must_use]
    pub fn new(nodes: Vec<Node>) -> Self {
        let mut index = HashMap::with_capacity(nodes.len());
        for (i, node) in nodes.iter().enumerate() {
            index.entry(node.id.clone()).or_insert(i);
        }
        Self { nodes, index }
    }

    /// Nodes in collection order.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Look up a node by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Node> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    /// Get the declared root node of a discipline.
    ///
    /// # Errors
    ///
    /// Returns [`NavigationError::RootNotFound`] if the collection has no
    /// node with the discipline's root id.
    pub fn root_for(&self, discipline: &Discipline) -> Result<&Node, NavigationError> {
        self.get(&discipline.root)
            .ok_or_else(|| NavigationError::RootNotFound {
                discipline: discipline.slug.clone(),
                root: discipline.root.clone(),
            })
    }

    /// Resolve the breadcrumb path from `root` down to `target`.
    ///
    /// Returns `[root, ..., target]`, or an empty path when `target` is not
    /// reachable from `root`. Rules, applied at every visited node:
    ///
    /// 1. A leaf yields nothing.
    /// 2. If `target` is a direct child (compared by id), the path ends here.
    /// 3. Otherwise children are searched depth-first in order and the first
    ///    non-empty result wins; later siblings are not explored.
    ///
    /// `root == target` yields an empty path, since the root is never its own
    /// direct child. Child ids missing from the collection behave as leaves.
    /// Cycles are not detected.
    ///
    /// The search uses an explicit stack, so tree depth is bounded by memory
    /// rather than the call stack. Each frame records the length of its
    /// prefix in the shared path.
    #[must_use]
    pub fn resolve_path<'a>(&'a self, root: &'a Node, target: &'a Node) -> Vec<&'a Node> {
        let mut path: Vec<&'a Node> = Vec::new();
        let mut stack: Vec<(&'a Node, usize)> = vec![(root, 0)];

        while let Some((node, prefix_len)) = stack.pop() {
            path.truncate(prefix_len);

            if node.is_leaf() {
                continue;
            }

            if node.children.iter().any(|id| *id == target.id) {
                path.push(node);
                path.push(target);
                return path;
            }

            path.push(node);
            // Reversed so the first child is popped first
            for child in node.children.iter().rev().filter_map(|id| self.get(id)) {
                stack.push((child, prefix_len + 1));
            }
        }

        Vec::new()
    }
}
