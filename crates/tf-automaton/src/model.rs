//! Automaton data model: states, symbols, a partial transition function and
//! accepting states.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Opaque state identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct State(String);

impl State {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for State {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for State {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Input label on a transition.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Symbol {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A single structural invariant violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Defect {
    MissingInitialState,
    UnknownInitialState(State),
    UnknownSource(State),
    UnknownTarget { from: State, symbol: Symbol, to: State },
    UnknownAccepting(State),
}

impl fmt::Display for Defect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingInitialState => write!(f, "no initial state for a non-empty automaton"),
            Self::UnknownInitialState(s) => write!(f, "initial state {s} is not in states"),
            Self::UnknownSource(s) => write!(f, "transition source {s} is not in states"),
            Self::UnknownTarget { from, symbol, to } => {
                write!(f, "transition {from} --{symbol}--> {to} targets an unknown state")
            }
            Self::UnknownAccepting(s) => write!(f, "accepting state {s} is not in states"),
        }
    }
}

/// A deterministic finite automaton with a partial transition function.
///
/// Missing `(state, symbol)` entries mean "no transition" and are valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Automaton {
    pub states: BTreeSet<State>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_state: Option<State>,
    #[serde(default)]
    pub transitions: BTreeMap<State, BTreeMap<Symbol, State>>,
    #[serde(default)]
    pub accepting_states: BTreeSet<State>,
}

impl Automaton {
    /// Create an automaton containing only its initial state.
    pub fn new(initial: impl Into<State>) -> Self {
        let initial = initial.into();
        let mut states = BTreeSet::new();
        states.insert(initial.clone());
        Self {
            states,
            initial_state: Some(initial),
            transitions: BTreeMap::new(),
            accepting_states: BTreeSet::new(),
        }
    }

    /// Create an automaton with no states at all.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn add_state(&mut self, state: impl Into<State>) {
        self.states.insert(state.into());
    }

    pub fn add_accepting(&mut self, state: impl Into<State>) {
        let state = state.into();
        self.states.insert(state.clone());
        self.accepting_states.insert(state);
    }

    /// Add a transition, registering both endpoints as states.
    /// A previous transition on the same `(from, symbol)` pair is replaced.
    pub fn add_transition(
        &mut self,
        from: impl Into<State>,
        symbol: impl Into<Symbol>,
        to: impl Into<State>,
    ) {
        let (from, to) = (from.into(), to.into());
        self.states.insert(from.clone());
        self.states.insert(to.clone());
        self.transitions.entry(from).or_default().insert(symbol.into(), to);
    }

    pub fn with_transition(
        mut self,
        from: impl Into<State>,
        symbol: impl Into<Symbol>,
        to: impl Into<State>,
    ) -> Self {
        self.add_transition(from, symbol, to);
        self
    }

    pub fn with_accepting(mut self, state: impl Into<State>) -> Self {
        self.add_accepting(state);
        self
    }

    pub fn initial_state(&self) -> Option<&State> {
        self.initial_state.as_ref()
    }

    pub fn is_accepting(&self, state: &State) -> bool {
        self.accepting_states.contains(state)
    }

    pub fn transition(&self, from: &State, symbol: &Symbol) -> Option<&State> {
        self.transitions.get(from).and_then(|row| row.get(symbol))
    }

    /// Outgoing transitions of a state, ordered by symbol.
    pub fn transitions_from(&self, from: &State) -> impl Iterator<Item = (&Symbol, &State)> {
        self.transitions.get(from).into_iter().flat_map(|row| row.iter())
    }

    /// Every symbol appearing on any transition, sorted.
    pub fn alphabet(&self) -> BTreeSet<&Symbol> {
        self.transitions.values().flat_map(|row| row.keys()).collect()
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    pub fn transition_count(&self) -> usize {
        self.transitions.values().map(|row| row.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// All structural invariant violations, in a stable order.
    pub fn defects(&self) -> Vec<Defect> {
        let mut defects = Vec::new();
        match &self.initial_state {
            Some(init) if !self.states.contains(init) => {
                defects.push(Defect::UnknownInitialState(init.clone()));
            }
            None if !self.states.is_empty() => defects.push(Defect::MissingInitialState),
            _ => {}
        }
        for (from, row) in &self.transitions {
            if !self.states.contains(from) {
                defects.push(Defect::UnknownSource(from.clone()));
            }
            for (symbol, to) in row {
                if !self.states.contains(to) {
                    defects.push(Defect::UnknownTarget {
                        from: from.clone(),
                        symbol: symbol.clone(),
                        to: to.clone(),
                    });
                }
            }
        }
        for s in &self.accepting_states {
            if !self.states.contains(s) {
                defects.push(Defect::UnknownAccepting(s.clone()));
            }
        }
        defects
    }

    /// Pure structural check; does not look at reachability.
    pub fn validate(&self) -> bool {
        self.defects().is_empty()
    }

    /// Run the automaton on a word. A missing transition rejects.
    pub fn accepts<'a, I>(&self, word: I) -> bool
    where
        I: IntoIterator<Item = &'a Symbol>,
    {
        let Some(mut current) = self.initial_state.as_ref() else {
            return false;
        };
        for symbol in word {
            match self.transition(current, symbol) {
                Some(next) => current = next,
                None => return false,
            }
        }
        self.is_accepting(current)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> Automaton {
        Automaton::new("A")
            .with_transition("A", "x", "B")
            .with_transition("B", "x", "C")
            .with_transition("C", "x", "C")
            .with_accepting("C")
    }

    #[test]
    fn test_alphabet_is_sorted_and_unique() {
        let a = chain().with_transition("A", "a", "A");
        let alphabet: Vec<&str> = a.alphabet().into_iter().map(|s| s.as_str()).collect();
        assert_eq!(alphabet, vec!["a", "x"]);
    }

    #[test]
    fn test_accepts() {
        let a = chain();
        let x = Symbol::from("x");
        assert!(!a.accepts([&x]));
        assert!(a.accepts([&x, &x]));
        assert!(a.accepts([&x, &x, &x, &x]));
        assert!(!a.accepts(&[Symbol::from("y")]));
    }

    #[test]
    fn test_validate_unknown_target() {
        let mut a = Automaton::new("A");
        a.add_state("B");
        a.transitions
            .entry(State::from("A"))
            .or_default()
            .insert(Symbol::from("x"), State::from("Z"));
        assert!(!a.validate());
        assert_eq!(
            a.defects(),
            vec![Defect::UnknownTarget {
                from: State::from("A"),
                symbol: Symbol::from("x"),
                to: State::from("Z"),
            }]
        );
    }

    #[test]
    fn test_validate_unknown_accepting_and_initial() {
        let mut a = Automaton::empty();
        a.states.insert(State::from("A"));
        a.initial_state = Some(State::from("Q"));
        a.accepting_states.insert(State::from("F"));
        let defects = a.defects();
        assert_eq!(defects.len(), 2);
        assert!(defects.contains(&Defect::UnknownInitialState(State::from("Q"))));
        assert!(defects.contains(&Defect::UnknownAccepting(State::from("F"))));
    }

    #[test]
    fn test_validate_missing_initial() {
        let mut a = Automaton::empty();
        a.add_state("A");
        assert_eq!(a.defects(), vec![Defect::MissingInitialState]);
    }

    #[test]
    fn test_empty_is_valid() {
        assert!(Automaton::empty().validate());
        assert!(!Automaton::empty().accepts(std::iter::empty()));
    }

    #[test]
    fn test_json_shape() {
        let json = r#"{
            "states": ["A", "B"],
            "initialState": "A",
            "transitions": {"A": {"x": "B"}},
            "acceptingStates": ["B"]
        }"#;
        let a = Automaton::from_json(json).unwrap();
        assert!(a.validate());
        assert_eq!(a.transition(&"A".into(), &"x".into()), Some(&State::from("B")));
        let back = Automaton::from_json(&a.to_json().unwrap()).unwrap();
        assert_eq!(a, back);
    }
}
