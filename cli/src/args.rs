use std::path::PathBuf;

use clap::Parser;
use tracing::Level;

/// Replays a scenario of block edits, toggles and frames against the
/// execution gating layer, printing which threads each frame stepped.
///
/// The binary plays the part of the host: it owns the block tree and the
/// thread list, and its frame step is wrapped by the gating layer exactly
/// like a real runtime's would be.
#[derive(Parser, Clone)]
pub struct Args {
    /// A global log level to use when printing logs.
    /// It's also possible to set `RUST_LOG` according to
    /// `tracing_subscriber::filter::EnvFilter`, which will always have
    /// priority.
    #[arg(long, default_value_t=Level::INFO)]
    pub log_level: Level,

    /// Path to the scenario (JSON) to replay
    pub scenario: PathBuf,

    /// Print every filtering decision of the interceptor to stderr
    #[clap(long, env = "BLOCKGATE_TRACE_FRAMES")]
    pub trace_frames: bool,

    /// Only change the toggled block itself, not its descendants
    #[clap(long, env = "BLOCKGATE_NO_PROPAGATE")]
    pub no_propagate: bool,

    /// Don't color log output
    #[clap(long, env = "NO_COLOR")]
    pub no_color: bool,

    /// Print the explicitly disabled blocks once the scenario is done
    #[clap(long)]
    pub dump_state: bool,
}
