//! Treefold optimizer — tree rewrites for the optimize stage.
//!
//! Passes:
//! 1. Comment stripping (opt-in)
//! 2. Text merge — concatenate adjacent text siblings
//! 3. Pruning — remove empty nodes
//! 4. Whitespace collapse
//! 5. Automaton dedup — minimize the tree's automaton and project it back

pub mod bridge;
pub mod dedup;
pub mod pass_prune;
pub mod pass_text;
pub mod pipeline;

pub use dedup::{AutomatonDedup, DedupOutcome, DedupReport};
pub use pipeline::{OptimizationResult, OptimizerPipeline};
