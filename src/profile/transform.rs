use std::hash::Hash;

use bit_set::BitSet;
use itertools::Itertools;
use tracing::{debug, trace};

use super::{OmegaProfile, TransitionProfile};
use crate::{morphism::Morphism, semigroup::Semigroup, Map, OmegaSemigroup};

/// Assigns consecutive ids to values in the order in which they are first seen.
struct Interner<T> {
    values: Vec<T>,
    ids: Map<T, usize>,
}

impl<T: Hash + Eq + Clone> Interner<T> {
    fn new() -> Self {
        Self {
            values: Vec::new(),
            ids: Map::default(),
        }
    }

    /// Returns the id of `value` and whether it was seen for the first time.
    fn intern(&mut self, value: T) -> (usize, bool) {
        if let Some(&id) = self.ids.get(&value) {
            return (id, false);
        }
        let id = self.values.len();
        self.ids.insert(value.clone(), id);
        self.values.push(value);
        (id, true)
    }

    fn len(&self) -> usize {
        self.values.len()
    }
}

/// Builds the omega-semigroup of transition profiles generated by the given letter profiles.
///
/// Starting from the profile of the empty word, profiles are extended letter by letter in
/// breadth-first order until no new profile appears. Every finite element is named after the
/// shortest word (first in length-lexicographic order) that produces it, letter names are
/// separated by `.` if one of them is longer than a single character. The infinite elements
/// are the omega iterations of all finite elements, closed under the mixed product. An
/// element `s·t^ω` is named `s(t)^w` after the first pair that produces it. An infinite
/// element is accepting iff the automaton has an accepting run from `initial`.
///
/// # Examples
/// ```
/// use omalg::profile::{transform_to_omega_semigroup, Buchi, DeterministicProfile};
///
/// // single state automaton over {a} whose only state is final
/// let epsilon = DeterministicProfile::new(vec![(0, true)], Buchi);
/// let a = DeterministicProfile::new(vec![(0, true)], Buchi);
/// let os = transform_to_omega_semigroup(&epsilon, vec![("a".to_string(), a)], 0);
/// assert_eq!(os.s_plus().size(), 1);
/// assert_eq!(os.omega_names(), &["(a)^w".to_string()]);
/// assert!(os.is_accepting(0));
/// ```
pub fn transform_to_omega_semigroup<P: TransitionProfile>(
    epsilon: &P,
    letters: Vec<(String, P)>,
    initial: usize,
) -> OmegaSemigroup {
    let (alphabet, letters): (Vec<String>, Vec<P>) = letters.into_iter().unzip();

    let mut profiles = Interner::new();
    let mut words: Vec<Vec<usize>> = Vec::new();
    let images = letters
        .iter()
        .enumerate()
        .map(|(a, letter)| {
            let (id, new) = profiles.intern(epsilon.concat(letter));
            if new {
                words.push(vec![a]);
            }
            id
        })
        .collect_vec();

    let mut right_multiplication: Vec<Vec<usize>> = Vec::new();
    let mut next = 0;
    while next < profiles.len() {
        let row = letters
            .iter()
            .enumerate()
            .map(|(a, letter)| {
                let extension = profiles.values[next].concat(letter);
                let (id, new) = profiles.intern(extension);
                if new {
                    let mut word = words[next].clone();
                    word.push(a);
                    trace!("found new profile for word of length {}", word.len());
                    words.push(word);
                }
                id
            })
            .collect_vec();
        right_multiplication.push(row);
        next += 1;
    }
    let size = profiles.len();

    let table = (0..size)
        .map(|lhs| {
            (0..size)
                .map(|rhs| {
                    words[rhs]
                        .iter()
                        .fold(lhs, |acc, &a| right_multiplication[acc][a])
                })
                .collect_vec()
        })
        .collect_vec();

    let separator = if alphabet.iter().any(|a| a.chars().count() > 1) {
        "."
    } else {
        ""
    };
    let names = words
        .iter()
        .map(|word| word.iter().map(|&a| alphabet[a].as_str()).join(separator))
        .collect_vec();

    let mut omegas: Interner<OmegaProfile> = Interner::new();
    // every infinite element is s·t^ω for the recorded (s, t), s may be absent
    let mut representatives: Vec<(Option<usize>, usize)> = Vec::new();
    let omega_iterations = (0..size)
        .map(|t| {
            let (id, new) = omegas.intern(profiles.values[t].omega_iteration());
            if new {
                representatives.push((None, t));
            }
            id
        })
        .collect_vec();

    let mut columns: Vec<Vec<usize>> = Vec::new();
    let mut next = 0;
    while next < omegas.len() {
        let column = (0..size)
            .map(|s| {
                let product = profiles.values[s].mixed_product(&omegas.values[next]);
                let (id, new) = omegas.intern(product);
                if new {
                    let (prefix, t) = representatives[next];
                    let prefix = prefix.map_or(s, |x| table[s][x]);
                    representatives.push((Some(prefix), t));
                }
                id
            })
            .collect_vec();
        columns.push(column);
        next += 1;
    }
    let mixed_products = (0..size)
        .map(|s| columns.iter().map(|column| column[s]).collect_vec())
        .collect_vec();

    let omega_names = representatives
        .iter()
        .map(|(prefix, t)| match prefix {
            None => format!("({})^w", names[*t]),
            Some(s) => format!("{}({})^w", names[*s], names[*t]),
        })
        .collect_vec();

    let mut accepting = BitSet::with_capacity(omegas.len());
    for (w, omega) in omegas.values.iter().enumerate() {
        if omega.accepts_from(initial) {
            accepting.insert(w);
        }
    }

    debug!(
        "built omega-semigroup with {size} finite and {} infinite elements, {} accepting",
        omegas.len(),
        accepting.len()
    );

    OmegaSemigroup::from_parts(
        Semigroup::from_parts(names, table),
        omega_names,
        mixed_products,
        omega_iterations,
        accepting,
        Morphism::from_parts(images, alphabet),
    )
}

#[cfg(test)]
mod tests {
    use super::transform_to_omega_semigroup;
    use crate::profile::{Buchi, DeterministicProfile};

    #[test_log::test]
    fn closure_of_infinitely_many_a() {
        // q0 -a-> q1, q0 -b-> q0, q1 -a-> q1, q1 -b-> q0, q1 final
        let epsilon = DeterministicProfile::new(vec![(0, false), (1, true)], Buchi);
        let a = DeterministicProfile::new(vec![(1, true), (1, true)], Buchi);
        let b = DeterministicProfile::new(vec![(0, false), (0, true)], Buchi);
        let os = transform_to_omega_semigroup(
            &epsilon,
            vec![("a".to_string(), a), ("b".to_string(), b)],
            0,
        );
        let s = os.s_plus();
        assert_eq!(s.names(), &["a", "b", "ab"]);
        assert_eq!(s.table(), &[vec![0, 2, 2], vec![0, 1, 2], vec![0, 2, 2]]);
        assert!(s.is_associative());
        assert_eq!(os.omega_names(), &["(a)^w", "(b)^w"]);
        assert_eq!(os.omega_iteration(2), 0);
        assert!(os.is_accepting(0) && !os.is_accepting(1));
        assert!((0..3).all(|s| os.mixed_product(s, 1) == 1 && os.mixed_product(s, 0) == 0));
        assert_eq!(os.phi().images(), &[0, 1]);
    }
}
