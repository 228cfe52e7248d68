use rustc_hash::FxHashMap;
use tracing::debug;

use crate::{BlockTree, Error, NodeId, Result};

#[derive(Clone, Debug, Default)]
struct Entry {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// A [BlockTree] kept entirely in memory.
///
/// Useful for hosts that don't have a tree structure of their own, and for
/// driving the gating layer in tests and simulations. Edits keep the tree
/// consistent: every child has exactly one parent and there are no cycles.
#[derive(Clone, Debug, Default)]
pub struct MemoryTree {
    nodes: FxHashMap<NodeId, Entry>,
}

impl MemoryTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a new block, either top-level or as the last child of
    /// `parent`.
    pub fn insert(&mut self, id: NodeId, parent: Option<NodeId>) -> Result<()> {
        if self.nodes.contains_key(&id) {
            return Err(Error::DuplicateNode(id));
        }

        if let Some(parent) = &parent {
            self.nodes
                .get_mut(parent)
                .ok_or_else(|| Error::UnknownNode(parent.clone()))?
                .children
                .push(id.clone());
        }

        self.nodes.insert(
            id,
            Entry {
                parent,
                children: Vec::new(),
            },
        );
        Ok(())
    }

    /// Moves an existing block (with its subtree) below a new parent, or
    /// makes it top-level if `parent` is `None`.
    pub fn set_parent(&mut self, id: &NodeId, parent: Option<NodeId>) -> Result<()> {
        if !self.nodes.contains_key(id) {
            return Err(Error::UnknownNode(id.clone()));
        }

        if let Some(parent) = &parent {
            if !self.nodes.contains_key(parent) {
                return Err(Error::UnknownNode(parent.clone()));
            }

            // The new parent must not live inside the subtree being moved.
            let mut cursor = Some(parent.clone());
            while let Some(current) = cursor {
                if &current == id {
                    return Err(Error::WouldCycle {
                        node: id.clone(),
                        parent: parent.clone(),
                    });
                }
                cursor = self.parent(&current);
            }
        }

        self.detach(id);

        if let Some(parent) = &parent {
            if let Some(entry) = self.nodes.get_mut(parent) {
                entry.children.push(id.clone());
            }
        }
        if let Some(entry) = self.nodes.get_mut(id) {
            entry.parent = parent;
        }

        Ok(())
    }

    /// Removes a block and its whole subtree, returning the removed ids in
    /// depth-first order. Removing an unknown id removes nothing.
    pub fn remove(&mut self, id: &NodeId) -> Vec<NodeId> {
        if !self.nodes.contains_key(id) {
            return Vec::new();
        }

        self.detach(id);

        let mut removed = Vec::new();
        let mut stack = vec![id.clone()];
        while let Some(current) = stack.pop() {
            if let Some(entry) = self.nodes.remove(&current) {
                stack.extend(entry.children.into_iter().rev());
                removed.push(current);
            }
        }

        debug!(node.id = %id, removed = removed.len(), "removed subtree");
        removed
    }

    /// Top-level blocks, sorted by id.
    pub fn roots(&self) -> Vec<NodeId> {
        let mut roots: Vec<NodeId> = self
            .nodes
            .iter()
            .filter(|(_, entry)| entry.parent.is_none())
            .map(|(id, _)| id.clone())
            .collect();
        roots.sort();
        roots
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // Unlinks `id` from its current parent's child list.
    fn detach(&mut self, id: &NodeId) {
        let Some(parent) = self.nodes.get(id).and_then(|entry| entry.parent.clone()) else {
            return;
        };
        if let Some(entry) = self.nodes.get_mut(&parent) {
            entry.children.retain(|child| child != id);
        }
    }
}

impl BlockTree for MemoryTree {
    fn contains(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    fn parent(&self, id: &NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|entry| entry.parent.clone())
    }

    fn children(&self, id: &NodeId) -> Vec<NodeId> {
        self.nodes
            .get(id)
            .map(|entry| entry.children.clone())
            .unwrap_or_default()
    }
}
