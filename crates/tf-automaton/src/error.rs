use crate::model::{Defect, State, Symbol};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AutomatonError {
    #[error("Invalid automaton: {}", join_defects(.defects))]
    InvalidAutomaton { defects: Vec<Defect> },
    #[error("Tree node {0} is not a state of the automaton")]
    UnknownTreeState(State),
    #[error("Tree uses reserved state id: {0}")]
    ReservedState(State),
    #[error("Tree node {node} uses reserved label symbol: {symbol}")]
    ReservedSymbol { node: State, symbol: Symbol },
    #[error("Tree node id appears more than once: {0}")]
    DuplicateTreeState(State),
}

fn join_defects(defects: &[Defect]) -> String {
    defects
        .iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T> = std::result::Result<T, AutomatonError>;
