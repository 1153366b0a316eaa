use std::{collections::BTreeSet, fmt::Debug, hash::Hash, rc::Rc};

use bit_set::BitSet;

mod deterministic;
pub use deterministic::DeterministicProfile;

mod nondeterministic;
pub use nondeterministic::NondeterministicProfile;

mod scc;

mod transform;
pub use transform::transform_to_omega_semigroup;

/// The behaviour of an automaton on a fixed finite word. Profiles of the words `u` and `v`
/// determine the profile of `uv` (through [`TransitionProfile::concat`]) and the behaviour on
/// `u^ω` (through [`TransitionProfile::omega_iteration`]). This makes the profiles of an
/// automaton an omega-semigroup, which is built by [`transform_to_omega_semigroup`].
///
/// Equality and hashing only consider the behaviour, so two words with equal profiles are
/// indistinguishable for the automaton.
pub trait TransitionProfile: Clone + Eq + Hash + Debug {
    /// The profile of `uv`, where `self` is the profile of `u` and `rhs` is that of `v`.
    fn concat(&self, rhs: &Self) -> Self;

    /// Folds a finite prefix into infinite behaviour: if `self` is the profile of `u` and
    /// `omega` describes the infinite word `α`, the result describes `uα`.
    fn mixed_product(&self, omega: &OmegaProfile) -> OmegaProfile;

    /// The behaviour on `u^ω`, where `self` is the profile of `u`.
    fn omega_iteration(&self) -> OmegaProfile;
}

/// Summary of an infinite word: the set of states from which the automaton has an accepting
/// run on the word.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OmegaProfile(BitSet);

impl OmegaProfile {
    /// Creates a profile from the set of states with an accepting run.
    pub fn new(accepting: BitSet) -> Self {
        Self(accepting)
    }

    /// Returns `true` if there is an accepting run starting in `state`.
    pub fn accepts_from(&self, state: usize) -> bool {
        self.0.contains(state)
    }

    /// The underlying set of states.
    pub fn states(&self) -> &BitSet {
        &self.0
    }
}

/// Describes how the acceptance relevant information (the color) of run segments is
/// combined and when a cycle is accepting. Each of the four omega acceptance types has one
/// implementation.
pub trait RunCondition: Clone + Debug {
    /// The information that is tracked along a run segment.
    type Color: Clone + Eq + Ord + Hash + Debug;

    /// Color of the run segment that consists of the `first` segment followed by the
    /// `second` one.
    fn combine(&self, first: &Self::Color, second: &Self::Color) -> Self::Color;

    /// Decides whether repeating a cycle with the given combined color forever is accepting.
    fn is_accepting(&self, cycle: &Self::Color) -> bool;

    /// Computes all states of the graph given by `edges` (as triples of source, color and
    /// target over the states `0..size`) that lie on an accepting cycle.
    fn good_cycle_states(&self, size: usize, edges: &[(usize, Self::Color, usize)]) -> BitSet;
}

/// Büchi acceptance: a run is accepting iff it visits a final state infinitely often. Colors
/// record whether a final state has been seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Buchi;

/// Co-Büchi acceptance: a run is accepting iff it eventually only visits final states.
/// Colors record whether all states seen were final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CoBuchi;

/// Max-even parity acceptance: a run is accepting iff the maximal priority that occurs
/// infinitely often is even. Colors are the maximal priority seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MaxParity;

/// Muller acceptance: a run is accepting iff the set of states it visits infinitely often is
/// contained in the table. Colors are the sets of visited states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Muller(Rc<BTreeSet<BTreeSet<usize>>>);

impl Muller {
    /// Creates the condition for the given table of accepting sets.
    pub fn new(table: BTreeSet<BTreeSet<usize>>) -> Self {
        Self(Rc::new(table))
    }

    /// The table of accepting sets.
    pub fn table(&self) -> &BTreeSet<BTreeSet<usize>> {
        &self.0
    }
}

impl RunCondition for Buchi {
    type Color = bool;

    fn combine(&self, first: &bool, second: &bool) -> bool {
        *first || *second
    }

    fn is_accepting(&self, cycle: &bool) -> bool {
        *cycle
    }

    fn good_cycle_states(&self, size: usize, edges: &[(usize, bool, usize)]) -> BitSet {
        scc::states_on_good_cycles(size, edges, |internal| internal.iter().any(|c| **c))
    }
}

impl RunCondition for CoBuchi {
    type Color = bool;

    fn combine(&self, first: &bool, second: &bool) -> bool {
        *first && *second
    }

    fn is_accepting(&self, cycle: &bool) -> bool {
        *cycle
    }

    fn good_cycle_states(&self, size: usize, edges: &[(usize, bool, usize)]) -> BitSet {
        let final_only = edges
            .iter()
            .filter(|(_, c, _)| *c)
            .cloned()
            .collect::<Vec<_>>();
        scc::states_on_good_cycles(size, &final_only, |_| true)
    }
}

impl RunCondition for MaxParity {
    type Color = usize;

    fn combine(&self, first: &usize, second: &usize) -> usize {
        *first.max(second)
    }

    fn is_accepting(&self, cycle: &usize) -> bool {
        cycle % 2 == 0
    }

    fn good_cycle_states(&self, size: usize, edges: &[(usize, usize, usize)]) -> BitSet {
        let even: BTreeSet<usize> = edges
            .iter()
            .map(|(_, c, _)| *c)
            .filter(|c| c % 2 == 0)
            .collect();
        let mut good = BitSet::with_capacity(size);
        for d in even {
            let bounded = edges
                .iter()
                .filter(|(_, c, _)| *c <= d)
                .cloned()
                .collect::<Vec<_>>();
            good.union_with(&scc::states_on_good_cycles(size, &bounded, |internal| {
                internal.iter().any(|c| **c == d)
            }));
        }
        good
    }
}

impl RunCondition for Muller {
    type Color = BTreeSet<usize>;

    fn combine(&self, first: &BTreeSet<usize>, second: &BTreeSet<usize>) -> BTreeSet<usize> {
        first.union(second).copied().collect()
    }

    fn is_accepting(&self, cycle: &BTreeSet<usize>) -> bool {
        self.0.contains(cycle)
    }

    fn good_cycle_states(&self, size: usize, edges: &[(usize, BTreeSet<usize>, usize)]) -> BitSet {
        let mut good = BitSet::with_capacity(size);
        for accepting in self.0.iter() {
            let inside = edges
                .iter()
                .filter(|(_, c, _)| c.is_subset(accepting))
                .cloned()
                .collect::<Vec<_>>();
            good.union_with(&scc::states_on_good_cycles(size, &inside, |internal| {
                internal
                    .iter()
                    .fold(BTreeSet::new(), |mut acc, c| {
                        acc.extend(c.iter().copied());
                        acc
                    })
                    .eq(accepting)
            }));
        }
        good
    }
}

/// Profile of a deterministic Büchi automaton.
pub type DeterministicBuchiProfile = DeterministicProfile<Buchi>;
/// Profile of a deterministic co-Büchi automaton.
pub type DeterministicCoBuchiProfile = DeterministicProfile<CoBuchi>;
/// Profile of a deterministic parity automaton.
pub type DeterministicParityProfile = DeterministicProfile<MaxParity>;
/// Profile of a deterministic Muller automaton.
pub type DeterministicMullerProfile = DeterministicProfile<Muller>;
/// Profile of a nondeterministic Büchi automaton.
pub type NondeterministicBuchiProfile = NondeterministicProfile<Buchi>;
/// Profile of a nondeterministic co-Büchi automaton.
pub type NondeterministicCoBuchiProfile = NondeterministicProfile<CoBuchi>;
/// Profile of a nondeterministic parity automaton.
pub type NondeterministicParityProfile = NondeterministicProfile<MaxParity>;
/// Profile of a nondeterministic Muller automaton.
pub type NondeterministicMullerProfile = NondeterministicProfile<Muller>;

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::{Buchi, CoBuchi, MaxParity, Muller, RunCondition};

    #[test]
    fn colors_combine() {
        assert!(Buchi.combine(&false, &true));
        assert!(!CoBuchi.combine(&false, &true));
        assert_eq!(MaxParity.combine(&3, &2), 3);
        assert!(MaxParity.is_accepting(&4));
        assert!(!MaxParity.is_accepting(&1));

        let muller = Muller::new(BTreeSet::from([BTreeSet::from([0, 1])]));
        let joined = muller.combine(&BTreeSet::from([0]), &BTreeSet::from([1]));
        assert!(muller.is_accepting(&joined));
        assert!(!muller.is_accepting(&BTreeSet::from([0])));
    }

    #[test]
    fn good_cycles() {
        // 0 -> 1 -> 0 with only the second edge marked, 2 has an unmarked self loop
        let edges = [(0, false, 1), (1, true, 0), (2, false, 2), (2, false, 0)];
        let buchi = Buchi.good_cycle_states(3, &edges);
        assert_eq!(buchi.iter().collect::<Vec<_>>(), vec![0, 1]);
        let co_buchi = CoBuchi.good_cycle_states(3, &edges);
        assert!(co_buchi.is_empty());

        // priority 2 on the loop through 0 and 1, priority 3 on the loop on 2
        let edges = [(0, 1, 1), (1, 2, 0), (2, 3, 2), (2, 0, 0), (0, 3, 0)];
        let parity = MaxParity.good_cycle_states(3, &edges);
        assert_eq!(parity.iter().collect::<Vec<_>>(), vec![0, 1]);

        let muller = Muller::new(BTreeSet::from([BTreeSet::from([0, 1])]));
        let edges = [
            (0, BTreeSet::from([0, 1]), 1),
            (1, BTreeSet::from([1, 0]), 0),
            (1, BTreeSet::from([1, 2]), 2),
            (2, BTreeSet::from([2]), 2),
        ];
        let good = muller.good_cycle_states(3, &edges);
        assert_eq!(good.iter().collect::<Vec<_>>(), vec![0, 1]);
    }
}
