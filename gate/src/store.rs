use std::cell::RefCell;

use rustc_hash::FxHashSet;
use tracing::{debug, instrument, trace};

use crate::{BlockTree, NodeId};

/// The set of blocks that have been explicitly disabled.
///
/// One instance is created by the host and shared (usually as
/// `Rc<GateStore>`) between the [crate::CommandSurface], which writes to it,
/// and the [crate::GatedStepper], which reads from it once per frame. All
/// access happens on the host's frame loop, so a [RefCell] is enough.
///
/// Ids of blocks that were later deleted from the tree may linger here.
/// They never match a live block and are simply ignored, unless the host
/// decides to [GateStore::prune_orphans].
#[derive(Debug, Default)]
pub struct GateStore {
    disabled: RefCell<FxHashSet<NodeId>>,
}

impl GateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether this exact block has been disabled. Ancestors are not
    /// considered, see [crate::AncestorResolver::is_gated] for that.
    pub fn is_disabled(&self, id: &NodeId) -> bool {
        self.disabled.borrow().contains(id)
    }

    /// Marks a block as disabled or enabled. Setting a state the block is
    /// already in does nothing.
    pub fn set_disabled(&self, id: &NodeId, disabled: bool) {
        let changed = if disabled {
            self.disabled.borrow_mut().insert(id.clone())
        } else {
            self.disabled.borrow_mut().remove(id)
        };

        if changed {
            trace!(node.id = %id, disabled, "gate state changed");
        }
    }

    /// Forgets all disabled blocks, e.g. when the host loads another
    /// project.
    #[instrument(skip_all)]
    pub fn clear_all(&self) {
        let mut disabled = self.disabled.borrow_mut();
        debug!(cleared = disabled.len(), "clearing gate state");
        disabled.clear();
    }

    /// Drops all ids that are no longer part of `tree`, returning how many
    /// were dropped.
    pub fn prune_orphans<T: BlockTree + ?Sized>(&self, tree: &T) -> usize {
        let mut disabled = self.disabled.borrow_mut();
        let before = disabled.len();
        disabled.retain(|id| tree.contains(id));

        let pruned = before - disabled.len();
        debug!(pruned, "pruned orphaned gate state");
        pruned
    }

    pub fn len(&self) -> usize {
        self.disabled.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.disabled.borrow().is_empty()
    }

    /// All disabled ids, sorted. Meant for hosts that save the gate state
    /// along with their project.
    pub fn snapshot(&self) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self.disabled.borrow().iter().cloned().collect();
        ids.sort();
        ids
    }
}

impl FromIterator<NodeId> for GateStore {
    fn from_iter<I: IntoIterator<Item = NodeId>>(iter: I) -> Self {
        Self {
            disabled: RefCell::new(iter.into_iter().collect()),
        }
    }
}
