use std::collections::{BTreeSet, VecDeque};

use bit_set::BitSet;
use itertools::Itertools;
use tracing::debug;

use crate::{
    automaton::{Acceptance, Transitions},
    word::Upw,
    OmegaAutomaton,
};

fn letters(symbols: usize) -> Vec<String> {
    (0..symbols)
        .map(|i| match char::from_u32('a' as u32 + i as u32) {
            Some(c) if i < 26 => c.to_string(),
            _ => format!("l{i}"),
        })
        .collect()
}

/// Uses a sprout-like algorithm to generate a random complete transition table over
/// `symbols` letters, rooted in state 0. The algorithm is as follows:
/// 1. Start with a single state.
/// 2. For each symbol, go through the existing states in order and with probability
///    `probability` add an edge to that state.
/// 3. If no edge to an existing state was added, insert an edge to a new state.
/// 4. Repeat until all states and symbols have been treated.
///
/// Every state of the result is reachable from state 0. The procedure only terminates for
/// a positive `probability`.
pub fn generate_random_table(symbols: usize, probability: f64) -> Vec<Vec<usize>> {
    let mut table: Vec<Vec<usize>> = vec![vec![]];
    let mut current = 0;
    while current < table.len() {
        for _ in 0..symbols {
            let target = (0..=current)
                .find(|_| fastrand::f64() < probability)
                .unwrap_or_else(|| {
                    table.push(vec![]);
                    table.len() - 1
                });
            table[current].push(target);
        }
        current += 1;
    }
    table
}

/// Draws a complete transition table with `size` states by drawing each target uniformly,
/// then removes the states that are unreachable from state 0. The result may therefore be
/// smaller than `size`.
pub fn generate_random_table_sized(symbols: usize, size: usize) -> Vec<Vec<usize>> {
    let table = (0..size.max(1))
        .map(|_| (0..symbols).map(|_| fastrand::usize(..size.max(1))).collect_vec())
        .collect_vec();
    trim(table)
}

/// Restricts the table to the states reachable from 0, renumbering them in order of
/// discovery.
fn trim(table: Vec<Vec<usize>>) -> Vec<Vec<usize>> {
    let mut renumbered = vec![None; table.len()];
    let mut order = vec![0];
    renumbered[0] = Some(0);
    let mut queue = VecDeque::from([0]);
    while let Some(q) = queue.pop_front() {
        for &t in &table[q] {
            if renumbered[t].is_none() {
                renumbered[t] = Some(order.len());
                order.push(t);
                queue.push_back(t);
            }
        }
    }
    if order.len() < table.len() {
        debug!("trimmed {} unreachable states", table.len() - order.len());
    }
    order
        .iter()
        .map(|&q| {
            table[q]
                .iter()
                .map(|&t| renumbered[t].unwrap_or_default())
                .collect()
        })
        .collect()
}

fn assemble(table: Vec<Vec<usize>>, symbols: usize, acceptance: Acceptance) -> OmegaAutomaton {
    let states = (0..table.len()).map(|q| format!("q{q}")).collect();
    OmegaAutomaton::from_parts(
        states,
        letters(symbols),
        0,
        Transitions::Deterministic(table),
        acceptance,
    )
}

fn random_finals(size: usize) -> BitSet {
    (0..size).filter(|_| fastrand::bool()).collect()
}

/// A random deterministic Büchi automaton with at most `size` states, every state is
/// final with probability one half.
pub fn generate_random_dba(symbols: usize, size: usize) -> OmegaAutomaton {
    let table = generate_random_table_sized(symbols, size);
    let finals = random_finals(table.len());
    assemble(table, symbols, Acceptance::Buchi(finals))
}

/// A random deterministic co-Büchi automaton with at most `size` states.
pub fn generate_random_dca(symbols: usize, size: usize) -> OmegaAutomaton {
    let table = generate_random_table_sized(symbols, size);
    let finals = random_finals(table.len());
    assemble(table, symbols, Acceptance::CoBuchi(finals))
}

/// A random deterministic parity automaton with at most `size` states, priorities are drawn
/// uniformly from `0..priorities`.
pub fn generate_random_dpa(symbols: usize, size: usize, priorities: usize) -> OmegaAutomaton {
    let table = generate_random_table_sized(symbols, size);
    let priorities = (0..table.len())
        .map(|_| fastrand::usize(..priorities.max(1)))
        .collect();
    assemble(table, symbols, Acceptance::Parity(priorities))
}

/// A random deterministic Muller automaton with at most `size` states and a table of up to
/// `sets` non-empty accepting sets.
pub fn generate_random_dma(symbols: usize, size: usize, sets: usize) -> OmegaAutomaton {
    let table = generate_random_table_sized(symbols, size);
    let n = table.len();
    let accepting: BTreeSet<BTreeSet<usize>> = (0..sets)
        .map(|_| (0..n).filter(|_| fastrand::bool()).collect::<BTreeSet<_>>())
        .filter(|set| !set.is_empty())
        .collect();
    assemble(table, symbols, Acceptance::Muller(accepting))
}

/// A random nondeterministic Büchi automaton with `size` states in which every transition is
/// present with probability `density`.
pub fn generate_random_nba(symbols: usize, size: usize, density: f64) -> OmegaAutomaton {
    let size = size.max(1);
    let relation = (0..size)
        .map(|_| {
            (0..symbols)
                .map(|_| (0..size).filter(|_| fastrand::f64() < density).collect())
                .collect()
        })
        .collect();
    OmegaAutomaton::from_parts(
        (0..size).map(|q| format!("q{q}")).collect(),
        letters(symbols),
        0,
        Transitions::Nondeterministic(relation),
        Acceptance::Buchi(random_finals(size)),
    )
}

/// A random lasso over `symbols` letters with a spoke of length below `max_spoke` and a
/// non-empty cycle of length at most `max_cycle`.
pub fn generate_random_upw(symbols: usize, max_spoke: usize, max_cycle: usize) -> Upw {
    let draw = |length: usize| -> Vec<usize> {
        (0..length).map(|_| fastrand::usize(..symbols)).collect()
    };
    let spoke = draw(fastrand::usize(..max_spoke.max(1)));
    let cycle = draw(fastrand::usize(1..=max_cycle.max(1)));
    Upw::new(spoke, cycle).expect("cycle has at least one letter")
}
