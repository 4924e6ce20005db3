//! Treefold automaton engine — DFA minimization and tree projection.
//!
//! Pieces:
//! 1. Model — states, symbols, partial transition function
//! 2. Partition — block partitions and one refinement pass
//! 3. Minimize — Moore refinement to the coarsest stable partition
//! 4. Tree — trees whose node ids are automaton states
//! 5. Extract — tree to automaton, so equivalent subtrees become equivalent states
//! 6. Project — rewrite a tree onto a minimized automaton with shared nodes

pub mod error;
pub mod extract;
pub mod minimize;
pub mod model;
pub mod partition;
pub mod project;
pub mod tree;

pub use error::{AutomatonError, Result};
pub use extract::{extract_automaton, LABEL_SINK};
pub use minimize::{minimize, MinimizedAutomaton};
pub use model::{Automaton, Defect, State, Symbol};
pub use partition::Partition;
pub use project::{project_onto_tree, NodeRef, ProjectedNode, ProjectedTree};
pub use tree::TreeNode;
