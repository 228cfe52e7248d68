use std::rc::Rc;

use rustc_hash::FxHashSet;
use tracing::{debug, instrument, warn};

use crate::{BlockTree, Error, GateStore, NodeId};

/// Result of a toggle or subtree update.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToggleOutcome {
    /// The block the command was issued for.
    pub node: NodeId,
    /// The state that was applied.
    pub disabled: bool,
    /// Number of blocks (including `node`) the state was applied to.
    pub affected: usize,
    /// Set if the walk below `node` ran into a cycle. The state was still
    /// applied to every block reached.
    pub fault: Option<Error>,
}

/// The commands a UI affordance (e.g. a block's context menu) can issue.
///
/// Toggling a block applies the new state to its whole current subtree, so
/// directly after the command every block in that subtree is explicitly in
/// the same state it is effectively in. Blocks attached below a disabled
/// block later on are not added to the store, they are still gated through
/// their ancestor. Toggling the ancestor off and on again walks the subtree
/// as it is by then, which brings those blocks back in line.
pub struct CommandSurface {
    gates: Rc<GateStore>,
    propagate: bool,
}

impl CommandSurface {
    pub fn new(gates: Rc<GateStore>) -> Self {
        Self {
            gates,
            propagate: true,
        }
    }

    /// Whether commands apply to descendants too (the default), or only to
    /// the block they were issued for.
    pub fn with_propagation(mut self, propagate: bool) -> Self {
        self.propagate = propagate;
        self
    }

    pub fn gates(&self) -> &Rc<GateStore> {
        &self.gates
    }

    /// Direct state of a block, as a renderer would poll it for styling.
    pub fn is_disabled_direct(&self, id: &NodeId) -> bool {
        self.gates.is_disabled(id)
    }

    /// Text for the menu entry offered on this block.
    pub fn menu_label(&self, id: &NodeId) -> &'static str {
        if self.is_disabled_direct(id) {
            "Enable Block"
        } else {
            "Disable Block"
        }
    }

    /// Flips the direct state of a block and applies the new state to all
    /// its descendants.
    ///
    /// Returns `None` without touching anything if the block is not part of
    /// the tree.
    #[instrument(skip_all, fields(node.id = %id))]
    pub fn toggle<T: BlockTree + ?Sized>(&self, tree: &T, id: &NodeId) -> Option<ToggleOutcome> {
        let disabled = !self.gates.is_disabled(id);
        self.set_subtree(tree, id, disabled)
    }

    /// Applies `disabled` to a block and, unless propagation is switched
    /// off, to every block below it.
    ///
    /// Returns `None` without touching anything if the block is not part of
    /// the tree.
    #[instrument(skip_all, fields(node.id = %id, disabled))]
    pub fn set_subtree<T: BlockTree + ?Sized>(
        &self,
        tree: &T,
        id: &NodeId,
        disabled: bool,
    ) -> Option<ToggleOutcome> {
        if !tree.contains(id) {
            debug!("unknown block, ignoring");
            return None;
        }

        if !self.propagate {
            self.gates.set_disabled(id, disabled);
            return Some(ToggleOutcome {
                node: id.clone(),
                disabled,
                affected: 1,
                fault: None,
            });
        }

        // Depth-first over the subtree as it is right now. A block seen
        // twice means the host's tree has a cycle; it is not descended into
        // again.
        let mut visited = FxHashSet::default();
        let mut fault = None;
        let mut stack = vec![id.clone()];
        while let Some(current) = stack.pop() {
            if !visited.insert(current.clone()) {
                warn!(revisited.id = %current, "malformed tree below toggled block");
                fault.get_or_insert_with(|| Error::MalformedTree {
                    node: id.clone(),
                    revisited: current,
                });
                continue;
            }

            self.gates.set_disabled(&current, disabled);
            stack.extend(tree.children(&current).into_iter().rev());
        }

        debug!(disabled, affected = visited.len(), "applied gate state to subtree");
        Some(ToggleOutcome {
            node: id.clone(),
            disabled,
            affected: visited.len(),
            fault,
        })
    }
}
