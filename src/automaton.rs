use std::collections::BTreeSet;

use bit_set::BitSet;
use itertools::Itertools;

use crate::{
    error::OmalgError,
    profile::{
        transform_to_omega_semigroup, Buchi, CoBuchi, DeterministicProfile, MaxParity, Muller,
        NondeterministicProfile, RunCondition, TransitionProfile,
    },
    OmegaSemigroup, Show,
};

mod description;

mod run;

/// The transition structure of an automaton, indexed by state and then by letter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transitions {
    /// A total transition function, `table[q][a]` is the successor of `q` on `a`.
    Deterministic(Vec<Vec<usize>>),
    /// A transition relation, `relation[q][a]` contains all successors of `q` on `a`.
    Nondeterministic(Vec<Vec<BTreeSet<usize>>>),
}

/// The acceptance component of an automaton.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Acceptance {
    /// Runs visiting a final state infinitely often are accepting.
    Buchi(BitSet),
    /// Runs that eventually visit only final states are accepting.
    CoBuchi(BitSet),
    /// One priority per state, a run is accepting iff the maximal priority that occurs
    /// infinitely often is even.
    Parity(Vec<usize>),
    /// A run is accepting iff the set of states it visits infinitely often is in the table.
    Muller(BTreeSet<BTreeSet<usize>>),
}

/// The four kinds of acceptance, without their data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AcceptanceKind {
    /// Büchi acceptance.
    Buchi,
    /// Co-Büchi acceptance.
    CoBuchi,
    /// Max-even parity acceptance.
    Parity,
    /// Muller acceptance.
    Muller,
}

impl AcceptanceKind {
    /// The keyword used in the omalg text format.
    pub fn keyword(&self) -> &'static str {
        match self {
            AcceptanceKind::Buchi => "Buechi",
            AcceptanceKind::CoBuchi => "CoBuechi",
            AcceptanceKind::Parity => "Parity",
            AcceptanceKind::Muller => "Muller",
        }
    }
}

/// One of the eight automaton classes, combining the acceptance kind with determinism.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AutomatonClass {
    /// The kind of acceptance condition.
    pub acceptance: AcceptanceKind,
    /// Whether the transitions form a total function.
    pub deterministic: bool,
}

impl std::fmt::Display for AutomatonClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let determinism = if self.deterministic {
            "deterministic"
        } else {
            "nondeterministic"
        };
        write!(f, "{determinism} {} automaton", self.acceptance.keyword())
    }
}

impl Acceptance {
    /// The kind of the acceptance condition.
    pub fn kind(&self) -> AcceptanceKind {
        match self {
            Acceptance::Buchi(_) => AcceptanceKind::Buchi,
            Acceptance::CoBuchi(_) => AcceptanceKind::CoBuchi,
            Acceptance::Parity(_) => AcceptanceKind::Parity,
            Acceptance::Muller(_) => AcceptanceKind::Muller,
        }
    }

    fn validate(&self, size: usize) -> Result<(), OmalgError> {
        let outside = |q: usize| q >= size;
        let valid = match self {
            Acceptance::Buchi(finals) | Acceptance::CoBuchi(finals) => {
                !finals.iter().any(outside)
            }
            Acceptance::Parity(priorities) => priorities.len() == size,
            Acceptance::Muller(table) => !table.iter().flatten().any(|&q| outside(q)),
        };
        if valid {
            Ok(())
        } else {
            Err(OmalgError::malformed(format!(
                "{} acceptance does not fit {size} states",
                self.kind().keyword()
            )))
        }
    }
}

/// Builds profiles for the letters of an automaton and hands them to a computation that is
/// generic in the profile type.
trait ProfileVisitor {
    type Output;

    fn visit<P: TransitionProfile>(self, epsilon: P, letters: Vec<(String, P)>, initial: usize)
        -> Self::Output;
}

/// An omega-automaton over a finite alphabet with one of the four acceptance conditions,
/// either deterministic or nondeterministic.
///
/// # Examples
/// ```
/// use omalg::prelude::*;
///
/// // infinitely many a
/// let dba = OmegaAutomaton::deterministic_buechi(
///     vec!["q0".into(), "q1".into()],
///     vec!["a".into(), "b".into()],
///     0,
///     vec![vec![1, 0], vec![1, 0]],
///     vec![false, true],
/// )
/// .unwrap();
/// assert!(dba.accepts(&upw!([0, 1])));
/// assert!(!dba.accepts(&upw!([0], [1])));
///
/// let os = dba.to_omega_semigroup();
/// assert_eq!(os.s_plus().size(), 3);
/// assert!(os.is_db_recognizable());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OmegaAutomaton {
    states: Vec<String>,
    alphabet: Vec<String>,
    initial: usize,
    transitions: Transitions,
    acceptance: Acceptance,
}

fn flags(flags: Vec<bool>) -> BitSet {
    flags
        .into_iter()
        .enumerate()
        .filter_map(|(q, f)| f.then_some(q))
        .collect()
}

fn relation(relation: Vec<Vec<Vec<usize>>>) -> Transitions {
    Transitions::Nondeterministic(
        relation
            .into_iter()
            .map(|row| row.into_iter().map(BTreeSet::from_iter).collect())
            .collect(),
    )
}

fn table(table: Vec<Vec<usize>>) -> BTreeSet<BTreeSet<usize>> {
    table.into_iter().map(BTreeSet::from_iter).collect()
}

impl OmegaAutomaton {
    /// Creates an automaton, verifying that the initial state exists, that there is one
    /// transition entry per state and letter pointing to existing states and that the
    /// acceptance component refers to existing states only.
    pub fn new(
        states: Vec<String>,
        alphabet: Vec<String>,
        initial: usize,
        transitions: Transitions,
        acceptance: Acceptance,
    ) -> Result<Self, OmalgError> {
        let (n, k) = (states.len(), alphabet.len());
        OmalgError::check_index("states", initial, n)?;
        let rows_fit = match &transitions {
            Transitions::Deterministic(table) => {
                table.len() == n
                    && table
                        .iter()
                        .all(|row| row.len() == k && row.iter().all(|&t| t < n))
            }
            Transitions::Nondeterministic(relation) => {
                relation.len() == n
                    && relation
                        .iter()
                        .all(|row| row.len() == k && row.iter().flatten().all(|&t| t < n))
            }
        };
        if !rows_fit {
            return Err(OmalgError::malformed(format!(
                "transitions must be given for {n} states and {k} letters"
            )));
        }
        acceptance.validate(n)?;
        Ok(Self {
            states,
            alphabet,
            initial,
            transitions,
            acceptance,
        })
    }

    /// Assembles an automaton from components that are known to fit together.
    pub(crate) fn from_parts(
        states: Vec<String>,
        alphabet: Vec<String>,
        initial: usize,
        transitions: Transitions,
        acceptance: Acceptance,
    ) -> Self {
        debug_assert!(initial < states.len());
        debug_assert!(acceptance.validate(states.len()).is_ok());
        Self {
            states,
            alphabet,
            initial,
            transitions,
            acceptance,
        }
    }

    /// Deterministic Büchi automaton, `finals[q]` marks final states.
    pub fn deterministic_buechi(
        states: Vec<String>,
        alphabet: Vec<String>,
        initial: usize,
        transitions: Vec<Vec<usize>>,
        finals: Vec<bool>,
    ) -> Result<Self, OmalgError> {
        let acceptance = Acceptance::Buchi(flags(finals));
        let transitions = Transitions::Deterministic(transitions);
        Self::new(states, alphabet, initial, transitions, acceptance)
    }

    /// Deterministic co-Büchi automaton, `finals[q]` marks final states.
    pub fn deterministic_co_buechi(
        states: Vec<String>,
        alphabet: Vec<String>,
        initial: usize,
        transitions: Vec<Vec<usize>>,
        finals: Vec<bool>,
    ) -> Result<Self, OmalgError> {
        let acceptance = Acceptance::CoBuchi(flags(finals));
        let transitions = Transitions::Deterministic(transitions);
        Self::new(states, alphabet, initial, transitions, acceptance)
    }

    /// Deterministic parity automaton with one priority per state.
    pub fn deterministic_parity(
        states: Vec<String>,
        alphabet: Vec<String>,
        initial: usize,
        transitions: Vec<Vec<usize>>,
        priorities: Vec<usize>,
    ) -> Result<Self, OmalgError> {
        let acceptance = Acceptance::Parity(priorities);
        let transitions = Transitions::Deterministic(transitions);
        Self::new(states, alphabet, initial, transitions, acceptance)
    }

    /// Deterministic Muller automaton, `table` lists the accepting sets of states.
    pub fn deterministic_muller(
        states: Vec<String>,
        alphabet: Vec<String>,
        initial: usize,
        transitions: Vec<Vec<usize>>,
        accepting_sets: Vec<Vec<usize>>,
    ) -> Result<Self, OmalgError> {
        let acceptance = Acceptance::Muller(table(accepting_sets));
        let transitions = Transitions::Deterministic(transitions);
        Self::new(states, alphabet, initial, transitions, acceptance)
    }

    /// Nondeterministic Büchi automaton, `transitions[q][a]` lists the successors.
    pub fn nondeterministic_buechi(
        states: Vec<String>,
        alphabet: Vec<String>,
        initial: usize,
        transitions: Vec<Vec<Vec<usize>>>,
        finals: Vec<bool>,
    ) -> Result<Self, OmalgError> {
        let acceptance = Acceptance::Buchi(flags(finals));
        Self::new(states, alphabet, initial, relation(transitions), acceptance)
    }

    /// Nondeterministic co-Büchi automaton.
    pub fn nondeterministic_co_buechi(
        states: Vec<String>,
        alphabet: Vec<String>,
        initial: usize,
        transitions: Vec<Vec<Vec<usize>>>,
        finals: Vec<bool>,
    ) -> Result<Self, OmalgError> {
        let acceptance = Acceptance::CoBuchi(flags(finals));
        Self::new(states, alphabet, initial, relation(transitions), acceptance)
    }

    /// Nondeterministic parity automaton.
    pub fn nondeterministic_parity(
        states: Vec<String>,
        alphabet: Vec<String>,
        initial: usize,
        transitions: Vec<Vec<Vec<usize>>>,
        priorities: Vec<usize>,
    ) -> Result<Self, OmalgError> {
        let acceptance = Acceptance::Parity(priorities);
        Self::new(states, alphabet, initial, relation(transitions), acceptance)
    }

    /// Nondeterministic Muller automaton.
    pub fn nondeterministic_muller(
        states: Vec<String>,
        alphabet: Vec<String>,
        initial: usize,
        transitions: Vec<Vec<Vec<usize>>>,
        accepting_sets: Vec<Vec<usize>>,
    ) -> Result<Self, OmalgError> {
        let acceptance = Acceptance::Muller(table(accepting_sets));
        Self::new(states, alphabet, initial, relation(transitions), acceptance)
    }

    /// Number of states.
    pub fn size(&self) -> usize {
        self.states.len()
    }

    /// Names of the states.
    pub fn states(&self) -> &[String] {
        &self.states
    }

    /// Checked access to the name of a state.
    pub fn state_name(&self, state: usize) -> Result<&str, OmalgError> {
        OmalgError::check_index("states", state, self.size()).map(|q| self.states[q].as_str())
    }

    /// The alphabet.
    pub fn alphabet(&self) -> &[String] {
        &self.alphabet
    }

    /// Index of the initial state.
    pub fn initial(&self) -> usize {
        self.initial
    }

    /// The transition structure.
    pub fn transitions(&self) -> &Transitions {
        &self.transitions
    }

    /// The acceptance component.
    pub fn acceptance(&self) -> &Acceptance {
        &self.acceptance
    }

    /// Returns `true` if the transitions form a total function.
    pub fn is_deterministic(&self) -> bool {
        matches!(self.transitions, Transitions::Deterministic(_))
    }

    /// The class of the automaton.
    pub fn class(&self) -> AutomatonClass {
        AutomatonClass {
            acceptance: self.acceptance.kind(),
            deterministic: self.is_deterministic(),
        }
    }

    /// All successors of `state` on `letter`.
    pub fn successors(&self, state: usize, letter: usize) -> Vec<usize> {
        match &self.transitions {
            Transitions::Deterministic(table) => vec![table[state][letter]],
            Transitions::Nondeterministic(relation) => {
                relation[state][letter].iter().copied().collect()
            }
        }
    }

    /// For deterministic Büchi automata the deterministic co-Büchi automaton with the same
    /// transitions and complemented final states, which recognizes the complement language,
    /// and vice versa. Returns `None` for all other classes.
    pub fn dual(&self) -> Option<Self> {
        let Transitions::Deterministic(_) = &self.transitions else {
            return None;
        };
        let complement = |finals: &BitSet| -> BitSet {
            (0..self.size()).filter(|q| !finals.contains(*q)).collect()
        };
        let acceptance = match &self.acceptance {
            Acceptance::Buchi(finals) => Acceptance::CoBuchi(complement(finals)),
            Acceptance::CoBuchi(finals) => Acceptance::Buchi(complement(finals)),
            _ => return None,
        };
        Some(Self {
            acceptance,
            ..self.clone()
        })
    }

    /// Builds an omega-semigroup recognizing the language of the automaton by closing the
    /// transition profiles of the letters under concatenation.
    pub fn to_omega_semigroup(&self) -> OmegaSemigroup {
        struct Transform;
        impl ProfileVisitor for Transform {
            type Output = OmegaSemigroup;

            fn visit<P: TransitionProfile>(
                self,
                epsilon: P,
                letters: Vec<(String, P)>,
                initial: usize,
            ) -> OmegaSemigroup {
                transform_to_omega_semigroup(&epsilon, letters, initial)
            }
        }
        self.with_profiles(Transform)
    }

    fn with_profiles<V: ProfileVisitor>(&self, visitor: V) -> V::Output {
        match &self.acceptance {
            Acceptance::Buchi(finals) => self.build_profiles(Buchi, |q| finals.contains(q), visitor),
            Acceptance::CoBuchi(finals) => {
                self.build_profiles(CoBuchi, |q| finals.contains(q), visitor)
            }
            Acceptance::Parity(priorities) => {
                self.build_profiles(MaxParity, |q| priorities[q], visitor)
            }
            Acceptance::Muller(table) => self.build_profiles(
                Muller::new(table.clone()),
                |q| BTreeSet::from([q]),
                visitor,
            ),
        }
    }

    /// Letter profiles color each transition `q -a-> t` with the combined colors of `q` and
    /// `t`, the empty word colors `q` with its own color.
    fn build_profiles<C, F, V>(&self, condition: C, color: F, visitor: V) -> V::Output
    where
        C: RunCondition,
        F: Fn(usize) -> C::Color,
        V: ProfileVisitor,
    {
        let n = self.size();
        let step = |q: usize, t: usize| (t, condition.combine(&color(q), &color(t)));
        match &self.transitions {
            Transitions::Deterministic(table) => {
                let epsilon = DeterministicProfile::new(
                    (0..n).map(|q| (q, color(q))).collect(),
                    condition.clone(),
                );
                let letters = self
                    .alphabet
                    .iter()
                    .enumerate()
                    .map(|(a, name)| {
                        let steps = (0..n).map(|q| step(q, table[q][a])).collect();
                        (
                            name.clone(),
                            DeterministicProfile::new(steps, condition.clone()),
                        )
                    })
                    .collect();
                visitor.visit(epsilon, letters, self.initial)
            }
            Transitions::Nondeterministic(relation) => {
                let epsilon = NondeterministicProfile::new(
                    (0..n).map(|q| BTreeSet::from([(q, color(q))])).collect(),
                    condition.clone(),
                );
                let letters = self
                    .alphabet
                    .iter()
                    .enumerate()
                    .map(|(a, name)| {
                        let steps = (0..n)
                            .map(|q| relation[q][a].iter().map(|&t| step(q, t)).collect())
                            .collect();
                        (
                            name.clone(),
                            NondeterministicProfile::new(steps, condition.clone()),
                        )
                    })
                    .collect();
                visitor.visit(epsilon, letters, self.initial)
            }
        }
    }
}

impl Show for OmegaAutomaton {
    fn show(&self) -> String {
        use owo_colors::OwoColorize;
        let mut b = tabled::builder::Builder::default();
        b.push_record(
            std::iter::once(self.class().to_string())
                .chain(self.alphabet.iter().map(|a| a.bold().to_string()))
                .chain(std::iter::once(self.acceptance.kind().keyword().to_string())),
        );
        for (q, name) in self.states.iter().enumerate() {
            let mut header = name.bold().to_string();
            if q == self.initial {
                header = format!("→ {header}");
            }
            let color = match &self.acceptance {
                Acceptance::Buchi(finals) | Acceptance::CoBuchi(finals) => {
                    finals.contains(q).show()
                }
                Acceptance::Parity(priorities) => priorities[q].show(),
                Acceptance::Muller(table) => table
                    .iter()
                    .filter(|set| set.contains(&q))
                    .count()
                    .to_string(),
            };
            b.push_record(
                std::iter::once(header)
                    .chain((0..self.alphabet.len()).map(|a| {
                        self.successors(q, a)
                            .into_iter()
                            .map(|t| self.states[t].as_str())
                            .join(", ")
                    }))
                    .chain(std::iter::once(color)),
            );
        }
        b.build().with(tabled::settings::Style::ascii()).to_string()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::{AcceptanceKind, OmegaAutomaton};
    use crate::{OmalgError, Show};

    fn names(n: &[&str]) -> Vec<String> {
        n.iter().map(|s| s.to_string()).collect()
    }

    /// q0 -a-> q1, q0 -b-> q0, q1 -a-> q1, q1 -b-> q0, final q1
    pub fn infinitely_many_a() -> OmegaAutomaton {
        OmegaAutomaton::deterministic_buechi(
            names(&["q0", "q1"]),
            names(&["a", "b"]),
            0,
            vec![vec![1, 0], vec![1, 0]],
            vec![false, true],
        )
        .unwrap()
    }

    /// q0 -a-> q1, q0 -b-> q0, q1 is a final sink
    pub fn contains_an_a() -> OmegaAutomaton {
        OmegaAutomaton::deterministic_buechi(
            names(&["q0", "q1"]),
            names(&["a", "b"]),
            0,
            vec![vec![1, 0], vec![1, 1]],
            vec![false, true],
        )
        .unwrap()
    }

    /// Nondeterministic Büchi automaton for "finitely many b": q0 loops on a and b and may
    /// guess to move to q1 on a, q1 only loops on a.
    pub fn finitely_many_b() -> OmegaAutomaton {
        OmegaAutomaton::nondeterministic_buechi(
            names(&["q0", "q1"]),
            names(&["a", "b"]),
            0,
            vec![vec![vec![0, 1], vec![0]], vec![vec![1], vec![]]],
            vec![false, true],
        )
        .unwrap()
    }

    #[test]
    fn construction_is_validated() {
        assert!(matches!(
            OmegaAutomaton::deterministic_buechi(
                names(&["q0"]),
                names(&["a"]),
                1,
                vec![vec![0]],
                vec![true]
            ),
            Err(OmalgError::OutOfRange { .. })
        ));
        assert!(OmegaAutomaton::deterministic_parity(
            names(&["q0"]),
            names(&["a", "b"]),
            0,
            vec![vec![0]],
            vec![0]
        )
        .is_err());
        assert!(OmegaAutomaton::deterministic_parity(
            names(&["q0"]),
            names(&["a"]),
            0,
            vec![vec![0]],
            vec![0, 1]
        )
        .is_err());
        assert!(OmegaAutomaton::nondeterministic_muller(
            names(&["q0"]),
            names(&["a"]),
            0,
            vec![vec![vec![0]]],
            vec![vec![0, 3]]
        )
        .is_err());
    }

    #[test_log::test]
    fn semigroup_of_deterministic_buechi_automaton() {
        let os = infinitely_many_a().to_omega_semigroup();
        // a, b and ab, the identity is not part of S+
        assert_eq!(os.s_plus().size(), 3);
        assert!(os.s_plus().size() <= 4);
        assert!(os.s_plus().is_associative());
        assert!(os.is_db_recognizable());
        assert!(!os.is_dc_recognizable());
        assert!(!os.is_wb_recognizable());
    }

    #[test_log::test]
    fn semigroup_of_nondeterministic_buechi_automaton() {
        let nba = finitely_many_b();
        let os = nba.to_omega_semigroup();
        assert!(os.s_plus().is_associative());
        assert!(os.accepts(&upw!([1, 1], [0])));
        assert!(!os.accepts(&upw!([0, 1])));
        assert!(!os.is_db_recognizable());
        assert!(os.is_dc_recognizable());
        let dca = os.to_co_buechi().unwrap();
        for w in [upw!([0]), upw!([1]), upw!([0, 1]), upw!([1, 0, 1], [0])] {
            assert_eq!(dca.accepts(&w), nba.accepts(&w), "{w:?}");
        }
    }

    #[test]
    fn all_acceptance_kinds_agree_on_infinitely_many_a() {
        let states = names(&["q0", "q1"]);
        let alphabet = names(&["a", "b"]);
        let table = vec![vec![1, 0], vec![1, 0]];
        let automata = [
            infinitely_many_a(),
            OmegaAutomaton::deterministic_co_buechi(
                states.clone(),
                alphabet.clone(),
                0,
                table.clone(),
                vec![true, false],
            )
            .unwrap()
            .dual()
            .unwrap(),
            OmegaAutomaton::deterministic_parity(
                states.clone(),
                alphabet.clone(),
                0,
                table.clone(),
                vec![1, 2],
            )
            .unwrap(),
            OmegaAutomaton::deterministic_muller(
                states.clone(),
                alphabet.clone(),
                0,
                table.clone(),
                vec![vec![1], vec![0, 1]],
            )
            .unwrap(),
            OmegaAutomaton::nondeterministic_parity(
                states.clone(),
                alphabet.clone(),
                0,
                vec![vec![vec![1], vec![0]], vec![vec![1], vec![0]]],
                vec![1, 2],
            )
            .unwrap(),
            OmegaAutomaton::nondeterministic_muller(
                states,
                alphabet,
                0,
                vec![vec![vec![1], vec![0]], vec![vec![1], vec![0]]],
                vec![vec![1], vec![0, 1]],
            )
            .unwrap(),
        ];
        for aut in &automata {
            let os = aut.to_omega_semigroup();
            for w in [
                upw!([0]),
                upw!([1]),
                upw!([0, 1]),
                upw!([0], [1]),
                upw!([1, 1], [1, 0, 0]),
            ] {
                let expected = w.cycle().contains(&0);
                assert_eq!(aut.accepts(&w), expected, "{} on {w:?}", aut.class());
                assert_eq!(os.accepts(&w), expected, "{} on {w:?}", aut.class());
            }
        }
        assert_eq!(automata[1].acceptance().kind(), AcceptanceKind::Buchi);
    }

    #[test]
    fn dual_complements_the_language() {
        let dba = infinitely_many_a();
        let dca = dba.dual().unwrap();
        assert_eq!(dca.acceptance().kind(), AcceptanceKind::CoBuchi);
        for w in [upw!([0]), upw!([1]), upw!([0], [1])] {
            assert_ne!(dba.accepts(&w), dca.accepts(&w));
        }
        assert_eq!(dca.dual().unwrap(), dba);
        assert!(finitely_many_b().dual().is_none());
        assert!(dba.show().contains("q1"));
    }
}
