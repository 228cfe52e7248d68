use std::{cell::RefCell, rc::Rc};

use crate::NodeId;

/// Read-only view onto the host's block tree.
///
/// The gating layer never owns blocks. It asks the host about parent and
/// child relations by id, every time it needs them, so it always sees the
/// tree as it is at the moment of the query.
pub trait BlockTree {
    /// Whether a block with this id is currently part of the tree.
    fn contains(&self, id: &NodeId) -> bool;

    /// Parent of the given block, `None` for top-level blocks and for ids
    /// the tree doesn't know.
    fn parent(&self, id: &NodeId) -> Option<NodeId>;

    /// Direct children of the given block, in order. Empty for leaves and
    /// unknown ids.
    fn children(&self, id: &NodeId) -> Vec<NodeId>;
}

impl<T: BlockTree + ?Sized> BlockTree for &T {
    fn contains(&self, id: &NodeId) -> bool {
        (**self).contains(id)
    }

    fn parent(&self, id: &NodeId) -> Option<NodeId> {
        (**self).parent(id)
    }

    fn children(&self, id: &NodeId) -> Vec<NodeId> {
        (**self).children(id)
    }
}

impl<T: BlockTree + ?Sized> BlockTree for Box<T> {
    fn contains(&self, id: &NodeId) -> bool {
        (**self).contains(id)
    }

    fn parent(&self, id: &NodeId) -> Option<NodeId> {
        (**self).parent(id)
    }

    fn children(&self, id: &NodeId) -> Vec<NodeId> {
        (**self).children(id)
    }
}

impl<T: BlockTree + ?Sized> BlockTree for Rc<T> {
    fn contains(&self, id: &NodeId) -> bool {
        (**self).contains(id)
    }

    fn parent(&self, id: &NodeId) -> Option<NodeId> {
        (**self).parent(id)
    }

    fn children(&self, id: &NodeId) -> Vec<NodeId> {
        (**self).children(id)
    }
}

/// Lets a host share its tree as `Rc<RefCell<_>>` and keep mutating it
/// between frames. Every call takes a short shared borrow, so this panics
/// if the host queries while it holds a mutable borrow of its own.
impl<T: BlockTree + ?Sized> BlockTree for RefCell<T> {
    fn contains(&self, id: &NodeId) -> bool {
        self.borrow().contains(id)
    }

    fn parent(&self, id: &NodeId) -> Option<NodeId> {
        self.borrow().parent(id)
    }

    fn children(&self, id: &NodeId) -> Vec<NodeId> {
        self.borrow().children(id)
    }
}
