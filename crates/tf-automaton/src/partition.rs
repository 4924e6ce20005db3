//! Block partitions of an automaton's states and Moore-style refinement.

use crate::model::{Automaton, State, Symbol};
use std::collections::{BTreeMap, BTreeSet, HashMap};

pub type BlockId = usize;

/// Per-state summary: for each alphabet symbol (in sorted order), the block
/// holding the transition target, or `None` when there is no transition.
pub type Signature = Vec<Option<BlockId>>;

/// Disjoint, non-empty blocks covering every state exactly once.
///
/// Block members are kept sorted, so the first member of a block is its
/// lexicographically smallest state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    blocks: Vec<Vec<State>>,
    block_of: BTreeMap<State, BlockId>,
}

impl Partition {
    /// Accepting states, then the rest. Empty blocks are omitted.
    pub fn initial(automaton: &Automaton) -> Self {
        let (accepting, rejecting): (Vec<State>, Vec<State>) = automaton
            .states
            .iter()
            .cloned()
            .partition(|s| automaton.is_accepting(s));
        Self::from_blocks(
            [accepting, rejecting]
                .into_iter()
                .filter(|b| !b.is_empty())
                .collect(),
        )
    }

    fn from_blocks(mut blocks: Vec<Vec<State>>) -> Self {
        let mut block_of = BTreeMap::new();
        for (id, block) in blocks.iter_mut().enumerate() {
            block.sort();
            for s in block.iter() {
                block_of.insert(s.clone(), id);
            }
        }
        Self { blocks, block_of }
    }

    pub fn blocks(&self) -> &[Vec<State>] {
        &self.blocks
    }

    pub fn block_of(&self, state: &State) -> Option<BlockId> {
        self.block_of.get(state).copied()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Smallest state of a block.
    pub fn representative(&self, block: BlockId) -> Option<&State> {
        self.blocks.get(block).and_then(|b| b.first())
    }

    /// Signature of `state` against this partition.
    pub fn signature(&self, automaton: &Automaton, alphabet: &[&Symbol], state: &State) -> Signature {
        alphabet
            .iter()
            .map(|symbol| {
                automaton
                    .transition(state, symbol)
                    .and_then(|target| self.block_of(target))
            })
            .collect()
    }

    /// One refinement pass. Every signature is computed against `self`, the
    /// partition as it stood at the start of the pass. Returns `None` when no
    /// block splits.
    pub fn refine(&self, automaton: &Automaton, alphabet: &[&Symbol]) -> Option<Partition> {
        let mut next: Vec<Vec<State>> = Vec::with_capacity(self.blocks.len());
        let mut changed = false;

        for block in &self.blocks {
            let mut groups: Vec<Vec<State>> = Vec::new();
            let mut index: HashMap<Signature, usize> = HashMap::new();
            for state in block {
                let sig = self.signature(automaton, alphabet, state);
                match index.get(&sig) {
                    Some(&g) => groups[g].push(state.clone()),
                    None => {
                        index.insert(sig, groups.len());
                        groups.push(vec![state.clone()]);
                    }
                }
            }
            if groups.len() > 1 {
                changed = true;
            }
            next.extend(groups);
        }

        changed.then(|| Self::from_blocks(next))
    }

    /// True iff the blocks cover exactly `states` with no overlap and no
    /// empty block.
    pub fn is_partition_of(&self, states: &BTreeSet<State>) -> bool {
        let mut seen = BTreeSet::new();
        for block in &self.blocks {
            if block.is_empty() {
                return false;
            }
            for s in block {
                if !seen.insert(s) {
                    return false;
                }
            }
        }
        seen.len() == states.len() && seen.into_iter().all(|s| states.contains(s))
    }
}
