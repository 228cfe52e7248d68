use blockgate::NodeId;
use serde::Deserialize;

/// A host session to replay: the initial block tree, the threads running
/// on it and a timeline of things happening between and during frames.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    /// Blocks in insertion order; parents must come before their children.
    #[serde(default)]
    pub blocks: Vec<Block>,

    /// Root block of each initial thread. `null` spawns a thread that is
    /// not anchored at any block.
    #[serde(default)]
    pub threads: Vec<Option<NodeId>>,

    pub timeline: Vec<Event>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Block {
    pub id: NodeId,
    #[serde(default)]
    pub parent: Option<NodeId>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Event {
    /// Step this many frames.
    Step(u32),
    /// Step one frame with the host handing over no candidate list.
    StepEmpty,
    /// Toggle a block from its context menu.
    Toggle(NodeId),
    /// Set a block and its subtree to a given state.
    Set { id: NodeId, disabled: bool },
    /// Add a new block to the tree.
    Attach {
        id: NodeId,
        #[serde(default)]
        parent: Option<NodeId>,
    },
    /// Move a block (and its subtree) somewhere else.
    Move {
        id: NodeId,
        #[serde(default)]
        parent: Option<NodeId>,
    },
    /// Delete a block with its subtree. Threads anchored there are retired.
    Remove(NodeId),
    /// Start another thread.
    Spawn(Option<NodeId>),
    /// Forget all gate state.
    ClearAll,
    /// Drop gate state of blocks that are no longer in the tree.
    PruneOrphans,
}
