use rustc_hash::FxHashMap;

use crate::{BlockTree, MemoryTree, NodeId};

pub fn id(s: &str) -> NodeId {
    NodeId::from(s)
}

fn build(edges: &[(&str, Option<&str>)]) -> MemoryTree {
    let mut tree = MemoryTree::new();
    for (node, parent) in edges {
        tree.insert(id(node), parent.map(id))
            .expect("fixture edges must be valid");
    }
    tree
}

/// root -> a -> b -> c
pub fn chain() -> MemoryTree {
    build(&[
        ("root", None),
        ("a", Some("root")),
        ("b", Some("a")),
        ("c", Some("b")),
    ])
}

/// One stack and two loose blocks:
///
/// ```text
/// a -> b
///   -> c -> d
/// x
/// y
/// ```
pub fn scripts() -> MemoryTree {
    build(&[
        ("a", None),
        ("b", Some("a")),
        ("c", Some("a")),
        ("d", Some("c")),
        ("x", None),
        ("y", None),
    ])
}

/// A tree view that reports raw parent links without any consistency
/// checks, so tests can hand the gating layer a corrupted tree.
#[derive(Default)]
pub struct RawLinks {
    parents: FxHashMap<NodeId, Option<NodeId>>,
}

impl RawLinks {
    pub fn with(mut self, node: &str, parent: Option<&str>) -> Self {
        self.parents.insert(id(node), parent.map(id));
        self
    }
}

impl BlockTree for RawLinks {
    fn contains(&self, node: &NodeId) -> bool {
        self.parents.contains_key(node)
    }

    fn parent(&self, node: &NodeId) -> Option<NodeId> {
        self.parents.get(node).cloned().flatten()
    }

    fn children(&self, node: &NodeId) -> Vec<NodeId> {
        let mut children: Vec<NodeId> = self
            .parents
            .iter()
            .filter(|(_, parent)| parent.as_ref() == Some(node))
            .map(|(child, _)| child.clone())
            .collect();
        children.sort();
        children
    }
}

/// A parent cycle p -> q -> r -> p next to a sane top-level block.
pub fn cyclic() -> RawLinks {
    RawLinks::default()
        .with("top", None)
        .with("p", Some("r"))
        .with("q", Some("p"))
        .with("r", Some("q"))
}
