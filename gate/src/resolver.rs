use rustc_hash::FxHashSet;

use crate::{BlockTree, Error, GateStore, NodeId, Result};

/// Number of parent hops a walk takes before it starts remembering blocks.
const UNTRACKED_HOPS: usize = 64;

/// Answers whether a block is gated, i.e. disabled itself or sitting below
/// a disabled block.
///
/// A resolver borrows the tree and the gate state for the duration of a
/// batch of queries (usually one frame) and never holds on to either.
pub struct AncestorResolver<'a, T: ?Sized> {
    tree: &'a T,
    gates: &'a GateStore,
}

impl<'a, T: BlockTree + ?Sized> AncestorResolver<'a, T> {
    pub fn new(tree: &'a T, gates: &'a GateStore) -> Self {
        Self { tree, gates }
    }

    /// Whether this exact block is disabled, without looking at ancestors.
    pub fn is_disabled_direct(&self, id: &NodeId) -> bool {
        self.gates.is_disabled(id)
    }

    /// Walks from `id` up to its top-level block and reports whether any
    /// block on the way is disabled.
    ///
    /// Ids the tree doesn't know are not gated. The walk also stops at a
    /// parent link that points outside the live tree, so stale gate entries
    /// of deleted blocks never leak into the result. If the walk comes back
    /// to a block it already visited, the tree is inconsistent and
    /// [Error::MalformedTree] is returned.
    pub fn is_gated(&self, id: &NodeId) -> Result<bool> {
        if !self.tree.contains(id) {
            return Ok(false);
        }

        // Blocks are only remembered past UNTRACKED_HOPS. A cycle still
        // closes within one more lap after that.
        let mut visited: Option<FxHashSet<NodeId>> = None;
        let mut hops = 0;
        let mut current = id.clone();
        loop {
            if self.gates.is_disabled(&current) {
                return Ok(true);
            }

            let parent = match self.tree.parent(&current) {
                Some(parent) if self.tree.contains(&parent) => parent,
                _ => return Ok(false),
            };

            hops += 1;
            if hops > UNTRACKED_HOPS {
                let visited = visited.get_or_insert_with(FxHashSet::default);
                visited.insert(current);
                if visited.contains(&parent) {
                    return Err(Error::MalformedTree {
                        node: id.clone(),
                        revisited: parent,
                    });
                }
            }
            current = parent;
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::AncestorResolver;
    use crate::{
        fixtures::{self, id, RawLinks},
        BlockTree, Error, GateStore, MemoryTree, NodeId,
    };

    #[rstest]
    #[case::disable_a(&["a"], &[("root", false), ("a", true), ("b", true), ("c", true)])]
    #[case::disable_b(&["b"], &[("root", false), ("a", false), ("b", true), ("c", true)])]
    #[case::disable_leaf(&["c"], &[("root", false), ("a", false), ("b", false), ("c", true)])]
    #[case::disable_root(&["root"], &[("root", true), ("a", true), ("b", true), ("c", true)])]
    #[case::nothing(&[], &[("root", false), ("a", false), ("b", false), ("c", false)])]
    fn ancestors_gate_descendants(#[case] disabled: &[&str], #[case] expected: &[(&str, bool)]) {
        let tree = fixtures::chain();
        let gates: GateStore = disabled.iter().copied().map(NodeId::from).collect();
        let resolver = AncestorResolver::new(&tree, &gates);

        for (node, gated) in expected {
            assert_eq!(
                Ok(*gated),
                resolver.is_gated(&id(node)),
                "unexpected gate state for {node}"
            );
        }
    }

    #[test]
    fn unknown_node_is_not_gated() {
        let tree = fixtures::chain();
        let gates: GateStore = ["ghost"].into_iter().map(NodeId::from).collect();
        let resolver = AncestorResolver::new(&tree, &gates);

        assert_eq!(Ok(false), resolver.is_gated(&id("ghost")));
        assert!(resolver.is_disabled_direct(&id("ghost")));
    }

    #[test]
    fn orphaned_entries_are_ignored() {
        let mut tree = fixtures::chain();
        let gates = GateStore::new();
        gates.set_disabled(&id("a"), true);

        // delete the disabled block and re-attach a fresh stack under root.
        tree.remove(&id("a"));
        tree.insert(id("b2"), Some(id("root"))).unwrap();
        tree.insert(id("c2"), Some(id("b2"))).unwrap();

        let resolver = AncestorResolver::new(&tree, &gates);
        assert_eq!(Ok(false), resolver.is_gated(&id("c2")));
        assert_eq!(Ok(false), resolver.is_gated(&id("root")));
        assert_eq!(Ok(false), resolver.is_gated(&id("a")));
    }

    #[test]
    fn deep_chains_resolve() {
        let mut tree = MemoryTree::new();
        tree.insert(id("n0"), None).unwrap();
        for i in 1..10_000 {
            let parent = NodeId::new(format!("n{}", i - 1));
            tree.insert(NodeId::new(format!("n{i}")), Some(parent)).unwrap();
        }

        let gates = GateStore::new();
        let resolver = AncestorResolver::new(&tree, &gates);
        assert_eq!(Ok(false), resolver.is_gated(&id("n9999")));

        gates.set_disabled(&id("n0"), true);
        assert_eq!(Ok(true), resolver.is_gated(&id("n9999")));
    }

    #[test]
    fn parent_cycle_is_reported() {
        let tree = fixtures::cyclic();
        let gates = GateStore::new();
        let resolver = AncestorResolver::new(&tree, &gates);

        assert!(matches!(
            resolver.is_gated(&id("q")),
            Err(Error::MalformedTree { node, .. }) if node == id("q")
        ));
        assert_eq!(Ok(false), resolver.is_gated(&id("top")));
        assert!(tree.contains(&id("p")));
    }

    #[test]
    fn long_parent_cycle_is_reported() {
        let mut tree = RawLinks::default().with("n0", Some("n199"));
        let names: Vec<String> = (0..200).map(|i| format!("n{i}")).collect();
        for pair in names.windows(2) {
            tree = tree.with(&pair[1], Some(pair[0].as_str()));
        }

        let gates = GateStore::new();
        let resolver = AncestorResolver::new(&tree, &gates);

        match resolver.is_gated(&id("n150")) {
            Err(Error::MalformedTree { node, revisited }) => {
                assert_eq!(id("n150"), node);
                assert!(tree.contains(&revisited));
            }
            other => panic!("expected a malformed tree, got {other:?}"),
        }
    }

    #[test]
    fn parent_cycle_with_disabled_member_is_gated() {
        let tree = fixtures::cyclic();
        let gates = GateStore::new();
        gates.set_disabled(&id("p"), true);
        let resolver = AncestorResolver::new(&tree, &gates);

        // the walk hits the disabled block before it closes the loop.
        assert_eq!(Ok(true), resolver.is_gated(&id("r")));
    }
}
