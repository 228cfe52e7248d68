use std::{
    cell::{Cell, RefCell},
    fmt::Write,
    fs,
    rc::Rc,
};

use blockgate::{
    observer::TracingObserver, CommandSurface, GateObserver, GateStore, GatedStepper,
    MemoryTree, NoOpObserver, NodeId, Runnable, StepFrame, ToggleOutcome,
};
use blockgate_tracing::TracingBuilder;
use tracing::{debug, instrument};

pub mod args;
mod errors;
pub mod scenario;

pub use args::Args;
pub use errors::Error;
pub use scenario::{Event, Scenario};

/// A thread of the simulated host.
#[derive(Debug)]
struct Thread {
    id: usize,
    root: Option<NodeId>,
    steps: Cell<u32>,
}

impl Thread {
    fn label(&self) -> String {
        match &self.root {
            Some(root) => format!("t{}({})", self.id, root),
            None => format!("t{}(-)", self.id),
        }
    }
}

impl Runnable for Thread {
    fn root_node(&self) -> Option<&NodeId> {
        self.root.as_ref()
    }
}

type Units = Option<Vec<Rc<Thread>>>;

/// The host's own frame step: runs every thread it is handed once.
fn host_step(units: Units) -> Units {
    if let Some(units) = &units {
        for unit in units {
            unit.steps.set(unit.steps.get() + 1);
        }
    }
    units
}

type HostStep = fn(Units) -> Units;

/// Settings for a replay.
#[derive(Clone, Debug)]
pub struct Options {
    pub propagate: bool,
    pub trace_frames: bool,
    pub dump_state: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            propagate: true,
            trace_frames: false,
            dump_state: false,
        }
    }
}

impl From<&Args> for Options {
    fn from(args: &Args) -> Self {
        Self {
            propagate: !args.no_propagate,
            trace_frames: args.trace_frames,
            dump_state: args.dump_state,
        }
    }
}

/// A simulated host with the gating layer installed.
pub struct Simulation {
    tree: Rc<RefCell<MemoryTree>>,
    commands: CommandSurface,
    stepper: GatedStepper<HostStep, Rc<RefCell<MemoryTree>>, Box<dyn GateObserver>>,
    threads: Vec<Rc<Thread>>,
    next_thread: usize,
    transcript: String,
}

impl Simulation {
    pub fn new(options: &Options) -> Self {
        let tree = Rc::new(RefCell::new(MemoryTree::new()));
        let gates = Rc::new(GateStore::new());

        let observer: Box<dyn GateObserver> = if options.trace_frames {
            Box::new(TracingObserver::new(std::io::stderr()))
        } else {
            Box::new(NoOpObserver::default())
        };

        Self {
            commands: CommandSurface::new(gates.clone()).with_propagation(options.propagate),
            stepper: GatedStepper::new(host_step as HostStep, tree.clone(), gates)
                .with_observer(observer),
            tree,
            threads: Vec::new(),
            next_thread: 0,
            transcript: String::new(),
        }
    }

    /// Sets up the scenario's initial tree and threads, then plays its
    /// timeline.
    #[instrument(skip_all, fields(blocks = scenario.blocks.len(), events = scenario.timeline.len()))]
    pub fn replay(&mut self, scenario: Scenario) -> Result<(), Error> {
        {
            let mut tree = self.tree.borrow_mut();
            for block in scenario.blocks {
                tree.insert(block.id, block.parent)?;
            }
        }

        for root in scenario.threads {
            self.spawn(root);
        }

        for event in scenario.timeline {
            self.apply(event)?;
        }
        Ok(())
    }

    pub fn apply(&mut self, event: Event) -> Result<(), Error> {
        debug!(?event, "applying event");
        match event {
            Event::Step(frames) => {
                for _ in 0..frames {
                    self.step(Some(self.threads.clone()));
                }
            }
            Event::StepEmpty => self.step(None),
            Event::Toggle(id) => {
                let label = self.commands.menu_label(&id);
                match self.commands.toggle(&*self.tree, &id) {
                    Some(outcome) => {
                        self.log(format_args!(
                            "toggle {id} ({label}): {}, {} blocks",
                            state(outcome.disabled),
                            outcome.affected
                        ));
                        self.log_fault(&outcome);
                    }
                    None => self.log(format_args!("toggle {id}: unknown block")),
                }
            }
            Event::Set { id, disabled } => {
                match self.commands.set_subtree(&*self.tree, &id, disabled) {
                    Some(outcome) => {
                        self.log(format_args!(
                            "set {id}: {}, {} blocks",
                            state(disabled),
                            outcome.affected
                        ));
                        self.log_fault(&outcome);
                    }
                    None => self.log(format_args!("set {id}: unknown block")),
                }
            }
            Event::Attach { id, parent } => {
                self.tree.borrow_mut().insert(id.clone(), parent.clone())?;
                self.log(format_args!("attach {id} {}", placement(&parent)));
            }
            Event::Move { id, parent } => {
                self.tree.borrow_mut().set_parent(&id, parent.clone())?;
                self.log(format_args!("move {id} {}", placement(&parent)));
            }
            Event::Remove(id) => {
                let removed = self.tree.borrow_mut().remove(&id);
                let before = self.threads.len();
                self.threads.retain(|thread| match &thread.root {
                    Some(root) => !removed.contains(root),
                    None => true,
                });
                self.log(format_args!(
                    "remove {id}: {} blocks, {} threads retired",
                    removed.len(),
                    before - self.threads.len()
                ));
            }
            Event::Spawn(root) => {
                let label = self.spawn(root);
                self.log(format_args!("spawn {label}"));
            }
            Event::ClearAll => {
                let cleared = self.commands.gates().len();
                self.commands.gates().clear_all();
                self.log(format_args!("clear all: {cleared} entries"));
            }
            Event::PruneOrphans => {
                let pruned = self.commands.gates().prune_orphans(&*self.tree);
                self.log(format_args!("prune: {pruned} orphans"));
            }
        }
        Ok(())
    }

    /// Everything that happened so far, followed by a per-thread summary
    /// and, if asked for, the gate state.
    pub fn finish(mut self, options: &Options) -> String {
        let threads = std::mem::take(&mut self.threads);
        for thread in threads {
            let label = thread.label();
            self.log(format_args!("{label}: {} steps", thread.steps.get()));
        }

        if options.dump_state {
            let disabled: Vec<String> = self
                .commands
                .gates()
                .snapshot()
                .into_iter()
                .map(|id| id.to_string())
                .collect();
            self.log(format_args!("disabled: [{}]", disabled.join(", ")));
        }

        self.transcript
    }

    fn step(&mut self, units: Units) {
        let frame = self.stepper.frame() + 1;
        match self.stepper.step_frame(units) {
            Some(ran) => {
                let labels: Vec<String> = ran.iter().map(|thread| thread.label()).collect();
                self.log(format_args!("frame {frame}: ran [{}]", labels.join(", ")));
            }
            None => self.log(format_args!("frame {frame}: no candidates")),
        }
    }

    fn spawn(&mut self, root: Option<NodeId>) -> String {
        let thread = Rc::new(Thread {
            id: self.next_thread,
            root,
            steps: Cell::new(0),
        });
        self.next_thread += 1;

        let label = thread.label();
        self.threads.push(thread);
        label
    }

    fn log_fault(&mut self, outcome: &ToggleOutcome) {
        if let Some(fault) = &outcome.fault {
            self.log(format_args!("  fault: {fault}"));
        }
    }

    fn log(&mut self, line: std::fmt::Arguments<'_>) {
        let _ = writeln!(&mut self.transcript, "{line}");
    }
}

fn state(disabled: bool) -> &'static str {
    if disabled {
        "disabled"
    } else {
        "enabled"
    }
}

fn placement(parent: &Option<NodeId>) -> String {
    match parent {
        Some(parent) => format!("under {parent}"),
        None => "at top level".to_string(),
    }
}

/// Logging setup requested by `args`.
pub fn tracing_builder(args: &Args) -> TracingBuilder {
    let builder = TracingBuilder::default().level(args.log_level);
    if args.no_color {
        builder.disable_ansi()
    } else {
        builder
    }
}

/// Reads and replays the scenario named by `args`, returning the
/// transcript.
pub fn run(args: &Args) -> Result<String, Error> {
    let contents = fs::read_to_string(&args.scenario).map_err(|source| Error::Io {
        path: args.scenario.clone(),
        source,
    })?;
    let scenario: Scenario = serde_json::from_str(&contents)?;

    let options = Options::from(args);
    let mut simulation = Simulation::new(&options);
    simulation.replay(scenario)?;
    Ok(simulation.finish(&options))
}
