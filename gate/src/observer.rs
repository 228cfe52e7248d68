//! Implements a trait for things that wish to observe the decisions of the
//! scheduler interceptor.
//!
//! This can be used by the host to surface tree faults in its own
//! diagnostics, or to trace which runnable units were held back per frame.

use std::io::Write;

use crate::{Error, NodeId};

/// Implemented by types that wish to observe what the
/// [crate::GatedStepper] does.
///
/// All methods are optional, that is, observers can implement only
/// what they are interested in observing.
pub trait GateObserver {
    /// Called when resolving a unit's root block ran into a malformed
    /// tree. The unit is stepped anyway.
    fn observe_malformed_tree(&mut self, _frame: u64, _error: &Error) {}

    /// Called for each unit that was held back because its root block is
    /// gated.
    fn observe_gated(&mut self, _frame: u64, _root: &NodeId) {}

    /// Called once per filtered frame, before the wrapped step runs.
    fn observe_frame(&mut self, _frame: u64, _candidates: usize, _runnable: usize) {}
}

#[derive(Default)]
pub struct NoOpObserver {}

impl GateObserver for NoOpObserver {}

impl<O: GateObserver + ?Sized> GateObserver for &mut O {
    fn observe_malformed_tree(&mut self, frame: u64, error: &Error) {
        (**self).observe_malformed_tree(frame, error)
    }

    fn observe_gated(&mut self, frame: u64, root: &NodeId) {
        (**self).observe_gated(frame, root)
    }

    fn observe_frame(&mut self, frame: u64, candidates: usize, runnable: usize) {
        (**self).observe_frame(frame, candidates, runnable)
    }
}

impl<O: GateObserver + ?Sized> GateObserver for Box<O> {
    fn observe_malformed_tree(&mut self, frame: u64, error: &Error) {
        (**self).observe_malformed_tree(frame, error)
    }

    fn observe_gated(&mut self, frame: u64, root: &NodeId) {
        (**self).observe_gated(frame, root)
    }

    fn observe_frame(&mut self, frame: u64, candidates: usize, runnable: usize) {
        (**self).observe_frame(frame, candidates, runnable)
    }
}

/// An observer that writes one line per interceptor decision to its
/// internal writer.
pub struct TracingObserver<W: Write> {
    writer: W,
}

impl<W: Write> TracingObserver<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> GateObserver for TracingObserver<W> {
    fn observe_malformed_tree(&mut self, frame: u64, error: &Error) {
        let _ = writeln!(&mut self.writer, "=== frame {frame} === fault: {error}");
    }

    fn observe_gated(&mut self, frame: u64, root: &NodeId) {
        let _ = writeln!(&mut self.writer, "=== frame {frame} === gated: {root}");
    }

    fn observe_frame(&mut self, frame: u64, candidates: usize, runnable: usize) {
        let _ = writeln!(
            &mut self.writer,
            "=== frame {frame} === {runnable}/{candidates} runnable"
        );
    }
}
