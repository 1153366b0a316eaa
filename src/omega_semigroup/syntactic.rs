use bit_set::BitSet;
use itertools::Itertools;
use tracing::{debug, info};

use super::OmegaSemigroup;
use crate::{math::UnionFind, semigroup::Semigroup};

impl OmegaSemigroup {
    /// Quotients the omega-semigroup by its syntactic congruence, which yields the smallest
    /// omega-semigroup recognizing the same language. Every class becomes a new element that
    /// is named `[rep]` after its first member. All tables are computed before anything is
    /// replaced and repeated calls have no effect.
    pub fn reduce_to_syntactic(&mut self) {
        if self.reduced {
            debug!("omega-semigroup is already syntactic");
            return;
        }
        *self = self.syntactic();
    }

    /// Returns the syntactic omega-semigroup, leaving `self` untouched.
    pub fn syntactic(&self) -> Self {
        if self.reduced {
            return self.clone();
        }
        let (n, m) = (self.s_plus.size(), self.omega_size());

        let mut finite = UnionFind::new(n);
        for (s, t) in (0..n).tuple_combinations() {
            if finite.find(s) != finite.find(t) && self.plus_equivalent(s, t) {
                finite.unite(s, t);
            }
        }
        let mut infinite = UnionFind::new(m);
        for (v, w) in (0..m).tuple_combinations() {
            if infinite.find(v) != infinite.find(w) && self.omega_equivalent(v, w) {
                infinite.unite(v, w);
            }
        }
        let (plus_class, plus_reps) = finite.classes();
        let (omega_class, omega_reps) = infinite.classes();

        let names = plus_reps
            .iter()
            .map(|&s| format!("[{}]", self.s_plus.name(s)))
            .collect_vec();
        let table = plus_reps
            .iter()
            .map(|&s| {
                plus_reps
                    .iter()
                    .map(|&t| plus_class[self.product(s, t)])
                    .collect_vec()
            })
            .collect_vec();
        let omega_names = omega_reps
            .iter()
            .map(|&w| format!("[{}]", self.omega_names[w]))
            .collect_vec();
        let mixed_products = plus_reps
            .iter()
            .map(|&s| {
                omega_reps
                    .iter()
                    .map(|&w| omega_class[self.mixed_product(s, w)])
                    .collect_vec()
            })
            .collect_vec();
        let omega_iterations = plus_reps
            .iter()
            .map(|&s| omega_class[self.omega_iteration(s)])
            .collect_vec();
        let accepting: BitSet = omega_reps
            .iter()
            .enumerate()
            .filter(|&(_, &w)| self.is_accepting(w))
            .map(|(class, _)| class)
            .collect();
        let phi = self.phi.map_images(|s| plus_class[s]);

        info!(
            "syntactic reduction: {n} -> {} finite, {m} -> {} infinite elements",
            plus_reps.len(),
            omega_reps.len()
        );

        Self {
            s_plus: Semigroup::from_parts(names, table),
            omega_names,
            mixed_products,
            omega_iterations,
            accepting,
            phi,
            reduced: true,
        }
    }

    /// Two finite elements are equivalent iff no context distinguishes them, that is for
    /// all `x, y ∈ S+¹` and `z ∈ S+` the elements `x s y·z^ω` and `x t y·z^ω` as well as
    /// `x·(s y)^ω` and `x·(t y)^ω` agree on membership in `P`.
    fn plus_equivalent(&self, s: usize, t: usize) -> bool {
        let n = self.s_plus.size();
        let left = |x: Option<usize>, u: usize| x.map_or(u, |x| self.product(x, u));
        let right = |u: usize, y: Option<usize>| y.map_or(u, |y| self.product(u, y));
        let optional = || std::iter::once(None).chain((0..n).map(Some));

        optional().cartesian_product(optional()).all(|(x, y)| {
            let (sy, ty) = (right(s, y), right(t, y));
            let (xsy, xty) = (left(x, sy), left(x, ty));
            let loops_agree = {
                let (ls, lt) = (self.omega_iteration(sy), self.omega_iteration(ty));
                let (ls, lt) = match x {
                    Some(x) => (self.mixed_product(x, ls), self.mixed_product(x, lt)),
                    None => (ls, lt),
                };
                self.is_accepting(ls) == self.is_accepting(lt)
            };
            loops_agree
                && (0..n).all(|z| {
                    let zw = self.omega_iteration(z);
                    self.is_accepting(self.mixed_product(xsy, zw))
                        == self.is_accepting(self.mixed_product(xty, zw))
                })
        })
    }

    /// Two infinite elements are equivalent iff every left context `x ∈ S+¹` agrees on
    /// membership in `P`.
    fn omega_equivalent(&self, v: usize, w: usize) -> bool {
        self.is_accepting(v) == self.is_accepting(w)
            && (0..self.s_plus.size()).all(|x| {
                self.is_accepting(self.mixed_product(x, v))
                    == self.is_accepting(self.mixed_product(x, w))
            })
    }
}

#[cfg(test)]
mod tests {
    use crate::{automaton::tests::infinitely_many_a, omega_semigroup::tests};

    #[test_log::test]
    fn reduction_merges_r_equivalent_transition_profiles() {
        let mut os = tests::infinitely_many_a();
        os.reduce_to_syntactic();
        assert!(os.is_reduced());
        assert_eq!(os.s_plus().names(), &["[a]", "[b]"]);
        assert_eq!(os.s_plus().table(), &[vec![0, 0], vec![0, 1]]);
        assert_eq!(os.omega_names(), &["[X]", "[Y]"]);
        assert_eq!(os.omega_iterations(), &[0, 1]);
        assert_eq!(os.phi().images(), &[0, 1]);
        assert!(os.is_accepting(0) && !os.is_accepting(1));

        let again = os.clone();
        os.reduce_to_syntactic();
        assert_eq!(os, again);
    }

    #[test]
    fn reduced_flag_is_ignored_by_equality() {
        let syntactic = tests::infinitely_many_a().syntactic();
        let parsed = crate::io::parse_omega_semigroup(&syntactic.description()).unwrap();
        assert!(syntactic.is_reduced() && !parsed.is_reduced());
        assert_eq!(parsed, syntactic);
    }

    #[test]
    fn reduction_preserves_the_language() {
        let dba = infinitely_many_a();
        let os = dba.to_omega_semigroup();
        let syntactic = os.syntactic();
        assert!(!os.is_reduced());
        assert!(syntactic.s_plus().size() <= os.s_plus().size());
        for w in [
            upw!([0]),
            upw!([1]),
            upw!([1], [0, 1, 1]),
            upw!([0, 0], [1]),
        ] {
            assert_eq!(os.accepts(&w), syntactic.accepts(&w));
        }
        assert!(syntactic.s_plus().is_associative());
        assert_eq!(syntactic.is_db_recognizable(), os.is_db_recognizable());
    }
}
