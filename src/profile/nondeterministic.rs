use std::{
    collections::BTreeSet,
    hash::{Hash, Hasher},
};

use bit_set::BitSet;
use itertools::Itertools;

use super::{scc, OmegaProfile, RunCondition, TransitionProfile};
use crate::Show;

/// Profile of a word in a nondeterministic automaton. For every state `q` it stores all pairs
/// of a state reachable from `q` and the color of a run segment leading there.
///
/// The infinite behaviour is decided on the graph that has an edge from `q` to `t` colored
/// `c` for every pair `(t, c)` of `q`: a state has an accepting run on `u^ω` iff it can reach
/// a cycle of this graph that is accepting for the run condition.
#[derive(Debug, Clone)]
pub struct NondeterministicProfile<C: RunCondition> {
    steps: Vec<BTreeSet<(usize, C::Color)>>,
    condition: C,
}

impl<C: RunCondition> PartialEq for NondeterministicProfile<C> {
    fn eq(&self, other: &Self) -> bool {
        self.steps == other.steps
    }
}

impl<C: RunCondition> Eq for NondeterministicProfile<C> {}

impl<C: RunCondition> Hash for NondeterministicProfile<C> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.steps.hash(state)
    }
}

impl<C: RunCondition> NondeterministicProfile<C> {
    /// Creates a profile from the reachable pairs of every state.
    pub fn new(steps: Vec<BTreeSet<(usize, C::Color)>>, condition: C) -> Self {
        Self { steps, condition }
    }

    /// All pairs of reachable state and segment color for `state`.
    pub fn steps_from(&self, state: usize) -> &BTreeSet<(usize, C::Color)> {
        &self.steps[state]
    }

    fn edges(&self) -> Vec<(usize, C::Color, usize)> {
        self.steps
            .iter()
            .enumerate()
            .flat_map(|(q, pairs)| pairs.iter().map(move |(t, c)| (q, c.clone(), *t)))
            .collect()
    }
}

impl<C: RunCondition> TransitionProfile for NondeterministicProfile<C> {
    fn concat(&self, rhs: &Self) -> Self {
        Self {
            steps: self
                .steps
                .iter()
                .map(|pairs| {
                    pairs
                        .iter()
                        .flat_map(|(mid, first)| {
                            rhs.steps[*mid].iter().map(move |(target, second)| {
                                (*target, self.condition.combine(first, second))
                            })
                        })
                        .collect()
                })
                .collect(),
            condition: self.condition.clone(),
        }
    }

    fn mixed_product(&self, omega: &OmegaProfile) -> OmegaProfile {
        let mut accepting = BitSet::with_capacity(self.steps.len());
        for (q, pairs) in self.steps.iter().enumerate() {
            if pairs.iter().any(|(t, _)| omega.accepts_from(*t)) {
                accepting.insert(q);
            }
        }
        OmegaProfile::new(accepting)
    }

    fn omega_iteration(&self) -> OmegaProfile {
        let size = self.steps.len();
        let edges = self.edges();
        let good = self.condition.good_cycle_states(size, &edges);
        OmegaProfile::new(scc::can_reach(size, &edges, &good))
    }
}

impl<C: RunCondition> Show for NondeterministicProfile<C> {
    fn show(&self) -> String {
        self.steps
            .iter()
            .enumerate()
            .map(|(q, pairs)| {
                format!(
                    "{q} -> {{{}}}",
                    pairs.iter().map(|(t, c)| format!("{t}|{c:?}")).join(", ")
                )
            })
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::NondeterministicProfile;
    use crate::profile::{Buchi, CoBuchi, MaxParity, Muller, TransitionProfile};

    fn pairs<C: Ord + Clone>(p: &[(usize, C)]) -> BTreeSet<(usize, C)> {
        p.iter().cloned().collect()
    }

    #[test]
    fn relational_composition() {
        // 0 -> {0, 1}, 1 -> {1} with the edge into the final state 1 marked
        let a = NondeterministicProfile::new(
            vec![pairs(&[(0, false), (1, true)]), pairs(&[(1, true)])],
            Buchi,
        );
        let aa = a.concat(&a);
        assert_eq!(
            aa.steps_from(0),
            &pairs(&[(0, false), (1, true)])
        );
        let omega = a.omega_iteration();
        assert!(omega.accepts_from(0) && omega.accepts_from(1));

        // with co-Büchi acceptance the loop on 1 is final only, so both states accept
        let c = NondeterministicProfile::new(
            vec![pairs(&[(0, false), (1, false)]), pairs(&[(1, true)])],
            CoBuchi,
        );
        let omega = c.omega_iteration();
        assert!(omega.accepts_from(0) && omega.accepts_from(1));
        let dead = NondeterministicProfile::new(vec![pairs(&[(0, false)]), pairs(&[])], CoBuchi);
        assert!(dead.omega_iteration().states().is_empty());
        assert!(dead.mixed_product(&omega).accepts_from(0));
    }

    #[test]
    fn parity_and_muller_cycles() {
        // 0 loops with priority 1 and can move to 1, which loops with priority 2
        let p = NondeterministicProfile::new(
            vec![pairs(&[(0, 1), (1, 1)]), pairs(&[(1, 2)])],
            MaxParity,
        );
        let omega = p.omega_iteration();
        assert!(omega.accepts_from(0) && omega.accepts_from(1));
        let odd = NondeterministicProfile::new(vec![pairs(&[(0, 3)]), pairs(&[(0, 2)])], MaxParity);
        assert!(odd.omega_iteration().states().is_empty());

        let muller = Muller::new(BTreeSet::from([BTreeSet::from([1])]));
        let m = NondeterministicProfile::new(
            vec![
                pairs(&[(0, BTreeSet::from([0])), (1, BTreeSet::from([0, 1]))]),
                pairs(&[(1, BTreeSet::from([1]))]),
            ],
            muller,
        );
        let omega = m.omega_iteration();
        assert!(omega.accepts_from(0) && omega.accepts_from(1));
    }
}
