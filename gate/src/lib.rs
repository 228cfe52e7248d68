//! Execution gating for block-based programs.
//!
//! A host runtime steps a set of runnable units ("threads") once per frame,
//! each anchored at a node of an externally owned block tree. This crate
//! lets individual blocks be switched off: a disabled block, and everything
//! below it, is left out of every frame until it is switched back on.
//!
//! The pieces are wired together by the host:
//!
//! - a [GateStore] holds the explicitly disabled node ids,
//! - the [AncestorResolver] answers whether a node is gated by itself or one
//!   of its ancestors,
//! - a [GatedStepper] wraps the host's frame step and filters its candidate
//!   list,
//! - the [CommandSurface] is what a UI toggle calls into.
//!
//! The block tree itself stays with the host, behind the [BlockTree] trait.

mod command;
mod errors;
mod interceptor;
mod memory;
mod node;
pub mod observer;
mod resolver;
mod store;
mod tree;

#[cfg(test)]
mod fixtures;

// Public API of the crate.

pub use command::{CommandSurface, ToggleOutcome};
pub use errors::{Error, Result};
pub use interceptor::{filter_runnable, GatedStepper, Runnable, StepFrame};
pub use memory::MemoryTree;
pub use node::NodeId;
pub use observer::{GateObserver, NoOpObserver};
pub use resolver::AncestorResolver;
pub use store::GateStore;
pub use tree::BlockTree;
