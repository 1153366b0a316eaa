use std::hash::{Hash, Hasher};

use bit_set::BitSet;
use itertools::Itertools;

use super::{OmegaProfile, RunCondition, TransitionProfile};
use crate::Show;

/// Profile of a word in a deterministic automaton. For every state `q` it stores the state
/// reached from `q` together with the color of the run segment.
///
/// # Examples
/// ```
/// use omalg::profile::{Buchi, DeterministicProfile, TransitionProfile};
///
/// // 0 -a-> 1 -a-> 1 where state 1 is final
/// let a = DeterministicProfile::new(vec![(1, true), (1, true)], Buchi);
/// let aa = a.concat(&a);
/// assert_eq!(aa, a);
/// assert!(a.omega_iteration().accepts_from(0));
/// ```
#[derive(Debug, Clone)]
pub struct DeterministicProfile<C: RunCondition> {
    steps: Vec<(usize, C::Color)>,
    condition: C,
}

impl<C: RunCondition> PartialEq for DeterministicProfile<C> {
    fn eq(&self, other: &Self) -> bool {
        self.steps == other.steps
    }
}

impl<C: RunCondition> Eq for DeterministicProfile<C> {}

impl<C: RunCondition> Hash for DeterministicProfile<C> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.steps.hash(state)
    }
}

impl<C: RunCondition> DeterministicProfile<C> {
    /// Creates a profile where state `q` moves to `steps[q].0` with color `steps[q].1`.
    pub fn new(steps: Vec<(usize, C::Color)>, condition: C) -> Self {
        debug_assert!(steps.iter().all(|(q, _)| *q < steps.len()));
        Self { steps, condition }
    }

    /// The state reached from `state` and the color of the segment.
    pub fn step(&self, state: usize) -> &(usize, C::Color) {
        &self.steps[state]
    }

    fn target(&self, state: usize) -> usize {
        self.steps[state].0
    }

    /// Returns the first state of the cycle that is eventually entered when iterating the
    /// profile from `start`. Uses Floyd's tortoise and hare.
    fn cycle_entry(&self, start: usize) -> usize {
        let mut tortoise = self.target(start);
        let mut hare = self.target(self.target(start));
        while tortoise != hare {
            tortoise = self.target(tortoise);
            hare = self.target(self.target(hare));
        }
        tortoise = start;
        while tortoise != hare {
            tortoise = self.target(tortoise);
            hare = self.target(hare);
        }
        tortoise
    }

    /// Combined color of the cycle through `entry`.
    fn cycle_color(&self, entry: usize) -> C::Color {
        let (mut current, mut color) = self.steps[entry].clone();
        // a self loop needs no further traversal
        while current != entry {
            let (next, c) = &self.steps[current];
            color = self.condition.combine(&color, c);
            current = *next;
        }
        color
    }
}

impl<C: RunCondition> TransitionProfile for DeterministicProfile<C> {
    fn concat(&self, rhs: &Self) -> Self {
        Self {
            steps: self
                .steps
                .iter()
                .map(|(mid, first)| {
                    let (target, second) = &rhs.steps[*mid];
                    (*target, self.condition.combine(first, second))
                })
                .collect(),
            condition: self.condition.clone(),
        }
    }

    fn mixed_product(&self, omega: &OmegaProfile) -> OmegaProfile {
        let mut accepting = BitSet::with_capacity(self.steps.len());
        for (q, (target, _)) in self.steps.iter().enumerate() {
            if omega.accepts_from(*target) {
                accepting.insert(q);
            }
        }
        OmegaProfile::new(accepting)
    }

    fn omega_iteration(&self) -> OmegaProfile {
        let mut accepting = BitSet::with_capacity(self.steps.len());
        for q in 0..self.steps.len() {
            let entry = self.cycle_entry(q);
            if self.condition.is_accepting(&self.cycle_color(entry)) {
                accepting.insert(q);
            }
        }
        OmegaProfile::new(accepting)
    }
}

impl<C: RunCondition> Show for DeterministicProfile<C> {
    fn show(&self) -> String {
        self.steps
            .iter()
            .enumerate()
            .map(|(q, (target, color))| format!("{q} -{color:?}-> {target}"))
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::DeterministicProfile;
    use crate::profile::{Buchi, CoBuchi, MaxParity, Muller, TransitionProfile};

    #[test]
    fn floyd_finds_cycles() {
        // 0 -> 1 -> 2 -> 3 -> 2, only the edge 3 -> 2 is marked
        let p = DeterministicProfile::new(
            vec![(1, false), (2, false), (3, false), (2, true)],
            Buchi,
        );
        assert_eq!(p.cycle_entry(0), 2);
        assert_eq!(p.cycle_entry(3), 3);
        assert!(p.cycle_color(2));
        let omega = p.omega_iteration();
        assert!((0..4).all(|q| omega.accepts_from(q)));

        let co = DeterministicProfile::new(
            vec![(1, true), (2, true), (3, true), (2, false)],
            CoBuchi,
        );
        assert!((0..4).all(|q| !co.omega_iteration().accepts_from(q)));
    }

    #[test]
    fn concat_and_self_loops() {
        // a: 0 -> 1 (priority 1), 1 -> 1 (priority 2)
        let a = DeterministicProfile::new(vec![(1, 1), (1, 2)], MaxParity);
        // b: 0 -> 0 (priority 3), 1 -> 0 (priority 3)
        let b = DeterministicProfile::new(vec![(0, 3), (0, 3)], MaxParity);
        let ab = a.concat(&b);
        assert_eq!(ab, DeterministicProfile::new(vec![(0, 3), (0, 3)], MaxParity));
        let omega_a = a.omega_iteration();
        assert!(omega_a.accepts_from(0) && omega_a.accepts_from(1));
        assert!(!ab.omega_iteration().accepts_from(0));
        let mixed = b.mixed_product(&omega_a);
        assert!(mixed.accepts_from(1));

        let muller = Muller::new(BTreeSet::from([BTreeSet::from([0, 1])]));
        let swap = DeterministicProfile::new(
            vec![(1, BTreeSet::from([0, 1])), (0, BTreeSet::from([0, 1]))],
            muller.clone(),
        );
        assert!(swap.omega_iteration().accepts_from(0));
        let stay = DeterministicProfile::new(
            vec![(0, BTreeSet::from([0])), (1, BTreeSet::from([1]))],
            muller,
        );
        assert!(stay.omega_iteration().states().is_empty());
    }
}
