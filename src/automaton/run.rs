use std::collections::BTreeSet;

use tracing::trace;

use super::{Acceptance, OmegaAutomaton, ProfileVisitor, Transitions};
use crate::{profile::TransitionProfile, word::Upw, Map};

/// Decides acceptance of a lasso through the profiles of its spoke and cycle.
struct LassoAcceptance<'a>(&'a Upw);

impl ProfileVisitor for LassoAcceptance<'_> {
    type Output = bool;

    fn visit<P: TransitionProfile>(
        self,
        epsilon: P,
        letters: Vec<(String, P)>,
        initial: usize,
    ) -> bool {
        let profile_of = |word: &[usize]| {
            word.iter()
                .fold(epsilon.clone(), |acc, &a| acc.concat(&letters[a].1))
        };
        let omega = profile_of(self.0.cycle()).omega_iteration();
        profile_of(self.0.spoke())
            .mixed_product(&omega)
            .accepts_from(initial)
    }
}

impl OmegaAutomaton {
    /// Decides whether the automaton accepts the ultimately periodic word. Deterministic
    /// automata are simulated directly, nondeterministic ones are decided on the transition
    /// profiles of the spoke and the cycle. Panics if the word uses letters outside of the
    /// alphabet.
    pub fn accepts(&self, word: &Upw) -> bool {
        match &self.transitions {
            Transitions::Deterministic(table) => self.accepts_deterministic(table, word),
            Transitions::Nondeterministic(_) => self.with_profiles(LassoAcceptance(word)),
        }
    }

    /// Runs the spoke and then repeats the cycle until a cycle block starts in a state in
    /// which an earlier block started. The states visited from that block on are exactly the
    /// states visited infinitely often.
    fn accepts_deterministic(&self, table: &[Vec<usize>], word: &Upw) -> bool {
        let mut state = word
            .spoke()
            .iter()
            .fold(self.initial, |q, &a| table[q][a]);

        let mut block_of: Map<usize, usize> = Map::default();
        let mut blocks: Vec<Vec<usize>> = Vec::new();
        let first_recurring = loop {
            if let Some(&block) = block_of.get(&state) {
                break block;
            }
            block_of.insert(state, blocks.len());
            let mut visited = Vec::with_capacity(word.cycle().len());
            for &a in word.cycle() {
                state = table[state][a];
                visited.push(state);
            }
            blocks.push(visited);
        };

        let infinitely_often: BTreeSet<usize> =
            blocks[first_recurring..].iter().flatten().copied().collect();
        trace!(
            "states visited infinitely often: {:?}",
            infinitely_often
        );
        accepts_recurring(&self.acceptance, &infinitely_often)
    }
}

fn accepts_recurring(acceptance: &Acceptance, recurring: &BTreeSet<usize>) -> bool {
    match acceptance {
        Acceptance::Buchi(finals) => recurring.iter().any(|&q| finals.contains(q)),
        Acceptance::CoBuchi(finals) => recurring.iter().all(|&q| finals.contains(q)),
        Acceptance::Parity(priorities) => recurring
            .iter()
            .map(|&q| priorities[q])
            .max()
            .is_some_and(|p| p % 2 == 0),
        Acceptance::Muller(table) => table.contains(recurring),
    }
}

#[cfg(test)]
mod tests {
    use crate::automaton::tests;

    #[test]
    fn deterministic_and_profile_based_runs_agree() {
        let dba = tests::infinitely_many_a();
        for w in [
            upw!([0]),
            upw!([1]),
            upw!([0, 1]),
            upw!([0], [1]),
            upw!([1, 1], [1, 0, 0]),
            upw!([0, 0, 1], [1, 1, 1, 0]),
        ] {
            let by_profiles = dba.with_profiles(super::LassoAcceptance(&w));
            assert_eq!(dba.accepts(&w), by_profiles, "{w:?}");
        }
    }

    #[test]
    fn nondeterministic_runs() {
        let nba = tests::finitely_many_b();
        assert!(nba.accepts(&upw!([1, 0, 1], [0])));
        assert!(nba.accepts(&upw!([0])));
        assert!(!nba.accepts(&upw!([1])));
        assert!(!nba.accepts(&upw!([0, 0], [0, 1])));
    }
}
