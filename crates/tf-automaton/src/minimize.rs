//! Moore partition refinement.
//!
//! Refinement repeats full passes over every block until a pass splits
//! nothing. No worklist is kept, so the cost is O(passes * states * alphabet);
//! the stable partition is the Myhill–Nerode equivalence of the input.

use crate::error::{AutomatonError, Result};
use crate::model::{Automaton, State, Symbol};
use crate::partition::Partition;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Minimal automaton over block representatives.
///
/// The representative of a block is its lexicographically smallest state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MinimizedAutomaton {
    automaton: Automaton,
    representative_of: BTreeMap<State, State>,
    blocks: Vec<Vec<State>>,
    passes: usize,
}

impl MinimizedAutomaton {
    fn empty() -> Self {
        Self {
            automaton: Automaton::empty(),
            representative_of: BTreeMap::new(),
            blocks: Vec::new(),
            passes: 0,
        }
    }

    pub fn automaton(&self) -> &Automaton {
        &self.automaton
    }

    pub fn into_automaton(self) -> Automaton {
        self.automaton
    }

    /// Representative of a state of the source automaton.
    pub fn representative(&self, state: &State) -> Option<&State> {
        self.representative_of.get(state)
    }

    /// Source state to representative, for every source state.
    pub fn representatives(&self) -> &BTreeMap<State, State> {
        &self.representative_of
    }

    /// Final blocks of source states, each sorted, representative first.
    pub fn blocks(&self) -> &[Vec<State>] {
        &self.blocks
    }

    /// Refinement passes run, including the final pass that changed nothing.
    pub fn passes(&self) -> usize {
        self.passes
    }

    pub fn state_count(&self) -> usize {
        self.automaton.state_count()
    }

    pub fn initial_state(&self) -> Option<&State> {
        self.automaton.initial_state()
    }

    pub fn transition(&self, from: &State, symbol: &Symbol) -> Option<&State> {
        self.automaton.transition(from, symbol)
    }

    /// Whether two source states were merged into the same block.
    pub fn equivalent(&self, a: &State, b: &State) -> bool {
        matches!(
            (self.representative(a), self.representative(b)),
            (Some(x), Some(y)) if x == y
        )
    }
}

/// Compute the minimal automaton equivalent to `automaton`.
///
/// Fails with [`AutomatonError::InvalidAutomaton`] if the input violates its
/// structural invariants; nothing is repaired or inferred.
pub fn minimize(automaton: &Automaton) -> Result<MinimizedAutomaton> {
    let defects = automaton.defects();
    if !defects.is_empty() {
        return Err(AutomatonError::InvalidAutomaton { defects });
    }
    if automaton.is_empty() {
        return Ok(MinimizedAutomaton::empty());
    }

    let alphabet: Vec<&Symbol> = automaton.alphabet().into_iter().collect();
    let mut partition = Partition::initial(automaton);
    let mut passes = 0;
    loop {
        passes += 1;
        match partition.refine(automaton, &alphabet) {
            Some(next) => {
                debug!(pass = passes, blocks = next.len(), "partition refined");
                partition = next;
            }
            None => break,
        }
    }
    debug!(
        states = automaton.state_count(),
        blocks = partition.len(),
        passes,
        "minimization stable"
    );

    Ok(build(automaton, &partition, passes))
}

fn build(source: &Automaton, partition: &Partition, passes: usize) -> MinimizedAutomaton {
    let mut representative_of = BTreeMap::new();
    for block in partition.blocks() {
        if let Some(rep) = block.first() {
            for s in block {
                representative_of.insert(s.clone(), rep.clone());
            }
        }
    }

    let mut automaton = Automaton::empty();
    automaton.states = representative_of.values().cloned().collect();
    automaton.initial_state = source
        .initial_state()
        .and_then(|s| representative_of.get(s))
        .cloned();
    automaton.accepting_states = source
        .accepting_states
        .iter()
        .filter_map(|s| representative_of.get(s))
        .cloned()
        .collect();

    // Equivalent states have transitions into the same blocks, so rows
    // coming from different members of one block agree.
    for (from, row) in &source.transitions {
        let Some(rep_from) = representative_of.get(from) else {
            continue;
        };
        for (symbol, to) in row {
            if let Some(rep_to) = representative_of.get(to) {
                automaton
                    .transitions
                    .entry(rep_from.clone())
                    .or_default()
                    .insert(symbol.clone(), rep_to.clone());
            }
        }
    }

    MinimizedAutomaton {
        automaton,
        representative_of,
        blocks: partition.blocks().to_vec(),
        passes,
    }
}

impl Automaton {
    /// See [`minimize`].
    pub fn minimize(&self) -> Result<MinimizedAutomaton> {
        minimize(self)
    }
}
