use std::rc::Rc;

use tracing::{debug, instrument, warn};

use crate::{AncestorResolver, BlockTree, GateObserver, GateStore, NodeId, NoOpObserver};

/// A unit the host scheduler steps each frame.
pub trait Runnable {
    /// The top-most block this unit is currently executing under, if any.
    fn root_node(&self) -> Option<&NodeId>;
}

impl Runnable for NodeId {
    fn root_node(&self) -> Option<&NodeId> {
        Some(self)
    }
}

impl<R: Runnable + ?Sized> Runnable for &R {
    fn root_node(&self) -> Option<&NodeId> {
        (**self).root_node()
    }
}

impl<R: Runnable + ?Sized> Runnable for Rc<R> {
    fn root_node(&self) -> Option<&NodeId> {
        (**self).root_node()
    }
}

/// The host's "step one frame" entry point.
///
/// `units` is `None` when the host has no candidate list for this frame.
/// Plain closures implement this trait, so a host can wrap whatever
/// function it already has.
pub trait StepFrame<U> {
    type Output;

    fn step_frame(&mut self, units: Option<Vec<U>>) -> Self::Output;
}

impl<U, O, F> StepFrame<U> for F
where
    F: FnMut(Option<Vec<U>>) -> O,
{
    type Output = O;

    fn step_frame(&mut self, units: Option<Vec<U>>) -> O {
        self(units)
    }
}

/// Removes every unit whose root block is gated, keeping the relative
/// order of the others.
///
/// Units without a root block always stay. If resolving a root runs into a
/// malformed tree, the unit stays as well and the fault is handed to the
/// observer.
pub fn filter_runnable<U, T, O>(
    resolver: &AncestorResolver<'_, T>,
    units: Vec<U>,
    frame: u64,
    observer: &mut O,
) -> Vec<U>
where
    U: Runnable,
    T: BlockTree + ?Sized,
    O: GateObserver + ?Sized,
{
    units
        .into_iter()
        .filter(|unit| {
            let Some(root) = unit.root_node() else {
                return true;
            };

            match resolver.is_gated(root) {
                Ok(false) => true,
                Ok(true) => {
                    observer.observe_gated(frame, root);
                    false
                }
                Err(err) => {
                    warn!(node.id = %root, %err, "unable to resolve gate state, letting unit run");
                    observer.observe_malformed_tree(frame, &err);
                    true
                }
            }
        })
        .collect()
}

/// Wraps the host's frame step and drops gated units from its candidate
/// list before calling through.
///
/// Apart from the shorter list, the wrapped step sees exactly what it
/// would have seen without the wrapper, and its output is returned as is.
/// Because the gate state is read at the start of each frame, a toggle
/// made between two frames takes effect with the second one.
pub struct GatedStepper<S, T, O = NoOpObserver> {
    inner: S,
    tree: T,
    gates: Rc<GateStore>,
    observer: O,
    frame: u64,
}

impl<S, T> GatedStepper<S, T> {
    pub fn new(inner: S, tree: T, gates: Rc<GateStore>) -> Self {
        Self {
            inner,
            tree,
            gates,
            observer: NoOpObserver::default(),
            frame: 0,
        }
    }
}

impl<S, T, O> GatedStepper<S, T, O> {
    /// Replaces the observer that gets told about filtering decisions.
    pub fn with_observer<O2: GateObserver>(self, observer: O2) -> GatedStepper<S, T, O2> {
        GatedStepper {
            inner: self.inner,
            tree: self.tree,
            gates: self.gates,
            observer,
            frame: self.frame,
        }
    }

    /// Number of frames stepped so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    /// Unwraps the host's frame step, e.g. to read back state it kept.
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<U, S, T, O> StepFrame<U> for GatedStepper<S, T, O>
where
    U: Runnable,
    S: StepFrame<U>,
    T: BlockTree,
    O: GateObserver,
{
    type Output = S::Output;

    #[instrument(level = "trace", skip_all, fields(frame = self.frame + 1))]
    fn step_frame(&mut self, units: Option<Vec<U>>) -> S::Output {
        self.frame += 1;

        let Some(units) = units else {
            debug!("no candidate list, passing frame through");
            return self.inner.step_frame(None);
        };

        let candidates = units.len();
        let resolver = AncestorResolver::new(&self.tree, &*self.gates);
        let runnable = filter_runnable(&resolver, units, self.frame, &mut self.observer);

        self.observer
            .observe_frame(self.frame, candidates, runnable.len());
        if runnable.len() != candidates {
            debug!(candidates, runnable = runnable.len(), "held back gated units");
        }

        self.inner.step_frame(Some(runnable))
    }
}
