//! Property checks for minimization and projection over seeded random inputs.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeSet;
use tf_automaton::{
    extract_automaton, minimize, project_onto_tree, Automaton, State, Symbol, TreeNode,
};

const ALPHABET: [&str; 3] = ["a", "b", "c"];

fn random_automaton(rng: &mut StdRng, max_states: usize) -> Automaton {
    let n = rng.gen_range(1..=max_states);
    let name = |i: usize| format!("q{i}");
    let mut a = Automaton::new(name(0));
    for i in 0..n {
        a.add_state(name(i));
        if rng.gen_bool(0.4) {
            a.add_accepting(name(i));
        }
        for s in ALPHABET {
            if rng.gen_bool(0.7) {
                a.add_transition(name(i), s, name(rng.gen_range(0..n)));
            }
        }
    }
    a
}

/// Every word over the alphabet of length at most `max_len`.
fn words(max_len: usize) -> Vec<Vec<Symbol>> {
    let mut all = vec![Vec::new()];
    let mut frontier = vec![Vec::new()];
    for _ in 0..max_len {
        let mut next = Vec::new();
        for w in &frontier {
            for s in ALPHABET {
                let mut w2: Vec<Symbol> = w.clone();
                w2.push(Symbol::from(s));
                next.push(w2);
            }
        }
        all.extend(next.iter().cloned());
        frontier = next;
    }
    all
}

fn from_state(a: &Automaton, start: &State) -> Automaton {
    let mut b = a.clone();
    b.initial_state = Some(start.clone());
    b
}

#[test]
fn test_language_equivalence() {
    let mut rng = StdRng::seed_from_u64(7);
    let words = words(5);
    for _ in 0..60 {
        let a = random_automaton(&mut rng, 8);
        let m = minimize(&a).unwrap();
        for w in &words {
            assert_eq!(
                a.accepts(w),
                m.automaton().accepts(w),
                "word {w:?} disagrees on {a:?}"
            );
        }
    }
}

#[test]
fn test_idempotence_and_determinism() {
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..60 {
        let a = random_automaton(&mut rng, 10);
        let m1 = minimize(&a).unwrap();
        let m2 = minimize(&a).unwrap();
        assert_eq!(m1, m2);
        let again = minimize(m1.automaton()).unwrap();
        assert_eq!(again.automaton(), m1.automaton());
        assert_eq!(again.state_count(), m1.state_count());
    }
}

#[test]
fn test_blocks_cover_states_exactly_once() {
    let mut rng = StdRng::seed_from_u64(13);
    for _ in 0..60 {
        let a = random_automaton(&mut rng, 10);
        let m = minimize(&a).unwrap();
        let mut seen = BTreeSet::new();
        for block in m.blocks() {
            assert!(!block.is_empty());
            for s in block {
                assert!(seen.insert(s.clone()), "{s} in two blocks");
            }
        }
        assert_eq!(seen, a.states);
        assert_eq!(m.representatives().len(), a.state_count());
    }
}

#[test]
fn test_merged_states_agree_on_every_word() {
    let mut rng = StdRng::seed_from_u64(17);
    let words = words(4);
    for _ in 0..40 {
        let a = random_automaton(&mut rng, 6);
        let m = minimize(&a).unwrap();
        for block in m.blocks() {
            let rep = from_state(&a, &block[0]);
            for other in &block[1..] {
                let b = from_state(&a, other);
                for w in &words {
                    assert_eq!(rep.accepts(w), b.accepts(w));
                }
            }
        }
    }
}

fn random_tree(rng: &mut StdRng, next_id: &mut usize, depth: usize) -> TreeNode {
    let id = format!("n{next_id}");
    *next_id += 1;
    let kind = ["div", "span"][rng.gen_range(0..2)];
    let mut node = TreeNode::new(id, kind).with_value(["x", "y"][rng.gen_range(0..2)]);
    if depth > 0 {
        for i in 0..rng.gen_range(0..3) {
            let child = random_tree(rng, next_id, depth - 1);
            node = node.with_child_on(format!("#{i}"), child);
        }
    }
    node
}

#[test]
fn test_projection_keeps_reachable_symbols_and_shrinks() {
    let mut rng = StdRng::seed_from_u64(23);
    for _ in 0..40 {
        let mut next_id = 0;
        let tree = random_tree(&mut rng, &mut next_id, 4);
        let m = minimize(&extract_automaton(&tree).unwrap()).unwrap();
        let p = project_onto_tree(&tree, &m).unwrap();
        let expected: BTreeSet<&Symbol> =
            tree.preorder().flat_map(|n| n.transitions.keys()).collect();
        assert_eq!(p.reachable_symbols(), expected);
        assert!(p.len() <= tree.len());
        assert_eq!(p.len() + p.shared(), tree.len());
        for node in tree.preorder() {
            let rep = m.representative(&node.id).unwrap();
            assert!(p.find(rep).is_some());
        }
    }
}
