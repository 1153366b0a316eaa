use std::collections::VecDeque;

use bit_set::BitSet;
use itertools::Itertools;
use tracing::{debug, trace};

use crate::{
    automaton::{Acceptance, OmegaAutomaton, Transitions},
    Map, OmegaSemigroup,
};

/// Builds canonical deterministic automata from an omega-semigroup.
///
/// The parity and co-Büchi constructions are subset constructions whose states are short
/// lists of elements of `S+`. Reading a letter appends its image to the list, which is then
/// reduced along the J-order, so that only finitely many lists occur. States are named
/// `<s1|s2|...>` after the elements of the list, the initial state is the empty list `<>`.
///
/// The converter does not check whether the language lies in the targeted class, this is
/// done by [`OmegaSemigroup::to_det_buechi`] and friends.
#[derive(Debug, Clone, Copy)]
pub struct AutomatonConverter<'a> {
    semigroup: &'a OmegaSemigroup,
}

/// Result of a subset construction over lists of elements.
struct ListAutomaton<C> {
    names: Vec<String>,
    transitions: Vec<Vec<usize>>,
    colors: Vec<C>,
}

impl<'a> AutomatonConverter<'a> {
    /// Creates a converter for the given omega-semigroup.
    pub fn new(semigroup: &'a OmegaSemigroup) -> Self {
        Self { semigroup }
    }

    /// Explores all lists reachable from the empty list through `successor` in breadth-first
    /// order and assigns `color` to each of them. The empty list gets `initial_color`.
    fn explore<C, S, F>(&self, initial_color: C, successor: S, color: F) -> ListAutomaton<C>
    where
        S: Fn(&[usize], usize) -> Vec<usize>,
        F: Fn(&[usize]) -> C,
    {
        let s_plus = self.semigroup.s_plus();
        let phi = self.semigroup.phi();

        let mut ids: Map<Vec<usize>, usize> = Map::default();
        let mut names = vec!["<>".to_string()];
        let mut colors = vec![initial_color];
        let mut transitions = Vec::new();
        let mut queue = VecDeque::from([vec![]]);
        ids.insert(vec![], 0);

        while let Some(current) = queue.pop_front() {
            let row = (0..phi.len())
                .map(|letter| {
                    let next = successor(&current, phi[letter]);
                    if let Some(&id) = ids.get(&next) {
                        return id;
                    }
                    let id = names.len();
                    trace!("new state {id} for list {next:?}");
                    names.push(format!(
                        "<{}>",
                        next.iter().map(|&s| s_plus.name(s)).join("|")
                    ));
                    colors.push(color(&next));
                    ids.insert(next.clone(), id);
                    queue.push_back(next);
                    id
                })
                .collect_vec();
            transitions.push(row);
        }
        debug!("subset construction produced {} states", names.len());

        ListAutomaton {
            names,
            transitions,
            colors,
        }
    }

    fn finish(
        &self,
        names: Vec<String>,
        transitions: Vec<Vec<usize>>,
        acceptance: Acceptance,
    ) -> OmegaAutomaton {
        OmegaAutomaton::from_parts(
            names,
            self.semigroup.alphabet().to_vec(),
            0,
            Transitions::Deterministic(transitions),
            acceptance,
        )
    }

    /// Builds a deterministic max-even parity automaton for the language.
    pub fn convert_to_parity(&self) -> OmegaAutomaton {
        let s_plus = self.semigroup.s_plus();
        s_plus.calculate_green_relations();
        s_plus.calculate_j_depths();
        let list = self.explore(
            0,
            |state, element| self.successor_state(state, element),
            |state| self.priority(state),
        );
        self.finish(list.names, list.transitions, Acceptance::Parity(list.colors))
    }

    /// Builds a deterministic co-Büchi automaton. The result only recognizes the language if
    /// it is deterministic co-Büchi recognizable.
    pub fn convert_to_co_buechi(&self) -> OmegaAutomaton {
        let list = self.co_buechi_lists();
        self.finish(
            list.names,
            list.transitions,
            Acceptance::CoBuchi(finals(&list.colors)),
        )
    }

    /// Builds a deterministic Büchi automaton by constructing the co-Büchi automaton for the
    /// complement and dualizing it. The result only recognizes the language if it is
    /// deterministic Büchi recognizable.
    pub fn convert_to_det_buechi(&self) -> OmegaAutomaton {
        let complement = self.semigroup.complemented();
        let list = AutomatonConverter::new(&complement).co_buechi_lists();
        let dual = list.colors.iter().map(|f| !f).collect_vec();
        self.finish(list.names, list.transitions, Acceptance::Buchi(finals(&dual)))
    }

    /// Builds a deterministic weak Büchi automaton whose states are the elements of `S+`
    /// and a fresh initial state. An element `s` is final iff `s·e^ω ∈ P` for some linked
    /// pair `(s, e)`. The result only recognizes the language if it is weak Büchi
    /// recognizable.
    pub fn convert_to_weak_buechi(&self) -> OmegaAutomaton {
        let os = self.semigroup;
        let s_plus = os.s_plus();
        let n = s_plus.size();

        let mut initial_name = "q_0".to_string();
        while s_plus.index_of(&initial_name).is_some() {
            initial_name.push('0');
        }
        let mut names = s_plus.names().to_vec();
        names.push(initial_name);

        let mut transitions = (0..n)
            .map(|q| {
                os.phi()
                    .images()
                    .iter()
                    .map(|&image| s_plus.product(q, image))
                    .collect_vec()
            })
            .collect_vec();
        transitions.push(os.phi().images().to_vec());

        let mut finals = BitSet::with_capacity(n + 1);
        for &(s, e) in s_plus.linked_pairs() {
            if os.is_accepting(os.mixed_product(s, os.omega_iteration(e))) {
                finals.insert(s);
            }
        }
        debug!("weak Büchi automaton has {} states", n + 1);

        OmegaAutomaton::from_parts(
            names,
            os.alphabet().to_vec(),
            n,
            Transitions::Deterministic(transitions),
            Acceptance::Buchi(finals),
        )
    }

    fn co_buechi_lists(&self) -> ListAutomaton<bool> {
        self.semigroup.s_plus().calculate_green_relations();
        self.explore(
            false,
            |state, element| self.co_buechi_successor(state, element),
            |state| self.decide_finality(state),
        )
    }

    /// Appends `element` to the reduced list `state`. The last entry is merged with the new
    /// element as long as the element does not lie strictly J-above it or the product falls
    /// out of the R-class of the last entry.
    fn successor_state(&self, state: &[usize], element: usize) -> Vec<usize> {
        let s = self.semigroup.s_plus();
        let mut list = state.to_vec();
        let mut element = element;
        while let Some(&last) = list.last() {
            let product = s.product(last, element);
            if !s.j_strict(last, element) || !s.r(last, product) {
                list.pop();
                element = product;
            } else {
                break;
            }
        }
        list.push(element);
        list
    }

    /// Priority `2·depth(last)`, plus one if the loop closed by the R-class of the last
    /// entry is rejecting: either there is no idempotent `e` R-equivalent to `last`, or
    /// `s·e^ω ∉ P` where `s` is the product of all other entries.
    fn priority(&self, state: &[usize]) -> usize {
        let os = self.semigroup;
        let s_plus = os.s_plus();
        let Some((&last, front)) = state.split_last() else {
            return 0;
        };
        let base = 2 * s_plus.j_depth(last);
        let Some(e) = s_plus.r_equivalent_idempotent(last) else {
            return base + 1;
        };
        let loop_element = os.omega_iteration(e);
        let infinite = match s_plus.product_of(front.iter().copied()) {
            Some(prefix) => os.mixed_product(prefix, loop_element),
            None => loop_element,
        };
        if os.is_accepting(infinite) {
            base
        } else {
            base + 1
        }
    }

    fn co_buechi_successor(&self, state: &[usize], element: usize) -> Vec<usize> {
        let s_plus = self.semigroup.s_plus();
        match *state {
            [] => vec![element],
            [s] => {
                let se = s_plus.product(s, element);
                if s_plus.j_strict(s, element)
                    && s_plus.r(s, se)
                    && !self.sub_loop_accepting(None, s)
                    && self.sub_loop_accepting(Some(s), element)
                {
                    vec![s, element]
                } else {
                    vec![se]
                }
            }
            [s, t, ..] => {
                let te = s_plus.product(t, element);
                let ste = s_plus.product(s, te);
                if s_plus.j_strict(s, te)
                    && s_plus.r(s, ste)
                    && self.sub_loop_accepting(Some(s), te)
                {
                    vec![s, te]
                } else {
                    vec![ste]
                }
            }
        }
    }

    /// Lists of length two are always final, singletons iff their loop is accepting.
    fn decide_finality(&self, state: &[usize]) -> bool {
        match *state {
            [t] => self.sub_loop_accepting(None, t),
            [] => false,
            _ => true,
        }
    }

    /// Decides whether looping in the R-class of `t` after the optional prefix `s` is
    /// accepting. For a regular R-class this is `s·e^ω ∈ P` for the first idempotent `e` in
    /// it. Otherwise every linked pair `(r, e)` with `t <_J r` and `t·r R t` must satisfy
    /// `s·t·r·e^ω ∈ P`.
    fn sub_loop_accepting(&self, s: Option<usize>, t: usize) -> bool {
        let os = self.semigroup;
        let s_plus = os.s_plus();
        let prefixed = |x: usize| s.map_or(x, |s| s_plus.product(s, x));
        let accepted = |prefix: Option<usize>, e: usize| {
            let loop_element = os.omega_iteration(e);
            os.is_accepting(prefix.map_or(loop_element, |p| os.mixed_product(p, loop_element)))
        };

        if let Some(e) = s_plus.r_equivalent_idempotent(t) {
            return accepted(s, e);
        }
        s_plus.linked_pairs().iter().all(|&(r, e)| {
            let tr = s_plus.product(t, r);
            !(s_plus.j_strict(t, r) && s_plus.r(t, tr)) || accepted(Some(prefixed(tr)), e)
        })
    }
}

fn finals(flags: &[bool]) -> BitSet {
    flags
        .iter()
        .enumerate()
        .filter_map(|(q, &f)| f.then_some(q))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::AutomatonConverter;
    use crate::{
        automaton::Acceptance,
        omega_semigroup::tests::{infinitely_many_a, single_idempotent},
        Show,
    };

    fn lassos() -> Vec<crate::word::Upw> {
        vec![
            upw!([0]),
            upw!([1]),
            upw!([0, 1]),
            upw!([0], [1]),
            upw!([1], [0]),
            upw!([1, 0, 1], [1, 1, 0]),
            upw!([0, 0, 1], [1]),
        ]
    }

    #[test_log::test]
    fn parity_automaton_for_infinitely_many_a() {
        let os = infinitely_many_a();
        let dpa = AutomatonConverter::new(&os).convert_to_parity();
        assert_eq!(dpa.states(), &["<>", "<a>", "<b>", "<a|b>"]);
        assert_eq!(dpa.acceptance(), &Acceptance::Parity(vec![0, 4, 3, 3]));
        for w in lassos() {
            assert_eq!(dpa.accepts(&w), os.accepts(&w), "{w:?}");
        }
        println!("{}", dpa.show());
    }

    #[test]
    fn det_buechi_via_complement() {
        let os = infinitely_many_a();
        let dba = AutomatonConverter::new(&os).convert_to_det_buechi();
        assert_eq!(dba.size(), 4);
        for w in lassos() {
            assert_eq!(dba.accepts(&w), os.accepts(&w), "{w:?}");
        }

        let complement = os.complemented();
        let dca = AutomatonConverter::new(&complement).convert_to_co_buechi();
        for w in lassos() {
            assert_eq!(dca.accepts(&w), complement.accepts(&w), "{w:?}");
        }
        assert_eq!(dca.dual().unwrap(), dba);
    }

    #[test]
    fn single_idempotent_accepting_everything() {
        let os = single_idempotent();
        let dba = os.to_det_buechi().unwrap();
        assert!(dba.accepts(&upw!([0])));
        assert!(dba.accepts(&upw!([0, 0], [0])));
        assert_eq!(dba.states(), &["<>", "<a>"]);
        let Acceptance::Buchi(finals) = dba.acceptance() else {
            panic!("expected Büchi acceptance");
        };
        assert_eq!(finals.len(), 2);
    }

    #[test]
    fn weak_buechi_states_are_elements() {
        let os = single_idempotent();
        let weak = AutomatonConverter::new(&os).convert_to_weak_buechi();
        assert_eq!(weak.states(), &["a", "q_0"]);
        assert_eq!(weak.initial(), 1);
        assert!(weak.accepts(&upw!([0])));

        let colliding = crate::OmegaSemigroup::new(
            crate::Semigroup::new(vec!["q_0".into()], vec![vec![0]]).unwrap(),
            vec!["w".into()],
            vec![vec![0]],
            vec![0],
            vec![false],
            crate::morphism::Morphism::new(vec![0], vec!["x".into()]).unwrap(),
        )
        .unwrap();
        let weak = colliding.to_weak_buechi().unwrap();
        assert_eq!(weak.states(), &["q_0", "q_00"]);
        assert!(!weak.accepts(&upw!([0])));
    }

    #[test]
    fn conversions_check_recognizability() {
        let os = infinitely_many_a();
        assert!(os.to_det_buechi().is_ok());
        assert_eq!(
            os.to_co_buechi(),
            Err(crate::OmalgError::NotApplicable(
                crate::omega_semigroup::Recognizability::DetCoBuechi
            ))
        );
        assert!(os.to_weak_buechi().is_err());
        assert!(os.complemented().to_co_buechi().is_ok());
    }
}
