use std::cell::OnceCell;

use itertools::Itertools;
use tracing::trace;

use crate::{error::OmalgError, Show};

mod green;
pub use green::GreenRelations;

/// A finite semigroup given by its elements `0..n` (each carrying a name) and a
/// multiplication table. Associativity of the table is a precondition, it is not checked
/// on construction (see [`Semigroup::is_associative`]).
///
/// Derived structure (Green's relations, J-depths, idempotents and linked pairs) is computed
/// lazily on first use and cached. The caches are owned by the value: cloning a semigroup
/// clones the caches as well and the table can not be mutated once it is constructed.
///
/// # Examples
/// ```
/// use omalg::semigroup::Semigroup;
///
/// // the semigroup {e, a, 0} with a·a = 0 and 0 absorbing
/// let s = Semigroup::new(
///     vec!["e".into(), "a".into(), "0".into()],
///     vec![vec![0, 1, 2], vec![1, 2, 2], vec![2, 2, 2]],
/// )
/// .unwrap();
/// assert_eq!(s.product(1, 1), 2);
/// assert_eq!(s.idempotents(), &[0, 2]);
/// assert!(s.j(2, 1) && !s.j(1, 2));
/// assert_eq!(s.j_depth(0), 1);
/// assert_eq!(s.j_depth(2), 3);
/// ```
#[derive(Debug, Clone)]
pub struct Semigroup {
    names: Vec<String>,
    table: Vec<Vec<usize>>,
    green: OnceCell<GreenRelations>,
    j_depths: OnceCell<Vec<usize>>,
    idempotents: OnceCell<Vec<usize>>,
    linked_pairs: OnceCell<Vec<(usize, usize)>>,
}

impl PartialEq for Semigroup {
    fn eq(&self, other: &Self) -> bool {
        self.names == other.names && self.table == other.table
    }
}
impl Eq for Semigroup {}

impl Semigroup {
    /// Creates a new semigroup, verifying that the table is square, matches the number of
    /// names and only contains valid element indices.
    pub fn new(names: Vec<String>, table: Vec<Vec<usize>>) -> Result<Self, OmalgError> {
        let n = names.len();
        if table.len() != n {
            return Err(OmalgError::malformed(format!(
                "product table has {} rows but there are {n} elements",
                table.len()
            )));
        }
        if let Some((i, row)) = table.iter().enumerate().find(|(_, row)| row.len() != n) {
            return Err(OmalgError::malformed(format!(
                "row {i} of the product table has {} entries, expected {n}",
                row.len()
            )));
        }
        if let Some(&entry) = table.iter().flatten().find(|&&entry| entry >= n) {
            return Err(OmalgError::malformed(format!(
                "product table refers to element {entry}, but there are only {n} elements"
            )));
        }
        Ok(Self::from_parts(names, table))
    }

    pub(crate) fn from_parts(names: Vec<String>, table: Vec<Vec<usize>>) -> Self {
        Self {
            names,
            table,
            green: OnceCell::new(),
            j_depths: OnceCell::new(),
            idempotents: OnceCell::new(),
            linked_pairs: OnceCell::new(),
        }
    }

    /// Number of elements.
    pub fn size(&self) -> usize {
        self.names.len()
    }

    /// Returns `true` if the carrier is empty.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Names of all elements, in index order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Checked access to the name of an element.
    pub fn element_name(&self, element: usize) -> Result<&str, OmalgError> {
        OmalgError::check_index("semigroup elements", element, self.size())
            .map(|element| self.names[element].as_str())
    }

    /// Unchecked access to the name of an element, panics if out of range.
    pub fn name(&self, element: usize) -> &str {
        &self.names[element]
    }

    /// Looks up the element with the given name.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// The multiplication table, row `i` column `j` holds `i·j`.
    pub fn table(&self) -> &[Vec<usize>] {
        &self.table
    }

    /// Computes `lhs·rhs`. Indices are not checked.
    #[inline]
    pub fn product(&self, lhs: usize, rhs: usize) -> usize {
        self.table[lhs][rhs]
    }

    /// Multiplies a non-empty sequence of elements from left to right. Returns `None` for
    /// an empty sequence, as semigroups need not have a neutral element.
    pub fn product_of<I: IntoIterator<Item = usize>>(&self, elements: I) -> Option<usize> {
        elements
            .into_iter()
            .reduce(|acc, element| self.product(acc, element))
    }

    /// Brute force verification of associativity, cubic in the number of elements.
    pub fn is_associative(&self) -> bool {
        let n = self.size();
        (0..n).cartesian_product(0..n).all(|(a, b)| {
            (0..n).all(|c| {
                self.product(self.product(a, b), c) == self.product(a, self.product(b, c))
            })
        })
    }

    /// Computes and caches Green's relations, returns the cached value on repeated calls.
    pub fn calculate_green_relations(&self) -> &GreenRelations {
        self.green
            .get_or_init(|| GreenRelations::compute(&self.table))
    }

    /// Computes and caches the J-depth of every element.
    pub fn calculate_j_depths(&self) -> &[usize] {
        self.j_depths.get_or_init(|| {
            let depths = self.calculate_green_relations().j_depths();
            trace!(
                "semigroup has J-depth {}",
                depths.iter().max().copied().unwrap_or_default()
            );
            depths
        })
    }

    /// `a ≤_R b`, i.e. `a ∈ bS¹`.
    pub fn r(&self, a: usize, b: usize) -> bool {
        self.calculate_green_relations().r(a, b)
    }

    /// `a ≤_L b`, i.e. `a ∈ S¹b`.
    pub fn l(&self, a: usize, b: usize) -> bool {
        self.calculate_green_relations().l(a, b)
    }

    /// `a ≤_J b`, i.e. `a ∈ S¹bS¹`.
    pub fn j(&self, a: usize, b: usize) -> bool {
        self.calculate_green_relations().j(a, b)
    }

    /// `a <_J b`.
    pub fn j_strict(&self, a: usize, b: usize) -> bool {
        self.calculate_green_relations().j_strict(a, b)
    }

    /// `a R b`.
    pub fn r_equivalent(&self, a: usize, b: usize) -> bool {
        self.r(a, b) && self.r(b, a)
    }

    /// `a L b`.
    pub fn l_equivalent(&self, a: usize, b: usize) -> bool {
        self.l(a, b) && self.l(b, a)
    }

    /// `a J b`.
    pub fn j_equivalent(&self, a: usize, b: usize) -> bool {
        self.j(a, b) && self.j(b, a)
    }

    /// `a H b`, which is the intersection of R and L.
    pub fn h_equivalent(&self, a: usize, b: usize) -> bool {
        self.r_equivalent(a, b) && self.l_equivalent(a, b)
    }

    /// The J-depth of `element`, J-maximal elements have depth 1.
    pub fn j_depth(&self, element: usize) -> usize {
        self.calculate_j_depths()[element]
    }

    /// Returns `true` iff `e·e = e`.
    pub fn is_idempotent(&self, element: usize) -> bool {
        self.product(element, element) == element
    }

    /// All idempotents in ascending order.
    pub fn idempotents(&self) -> &[usize] {
        self.idempotents
            .get_or_init(|| (0..self.size()).filter(|&e| self.is_idempotent(e)).collect())
    }

    /// All linked pairs `(s, e)`, meaning `e` is idempotent and `s·e = s`, sorted
    /// ascending by `s` and then by `e`.
    pub fn linked_pairs(&self) -> &[(usize, usize)] {
        self.linked_pairs.get_or_init(|| {
            let idempotents = self.idempotents();
            (0..self.size())
                .flat_map(|s| {
                    idempotents
                        .iter()
                        .filter(move |&&e| self.product(s, e) == s)
                        .map(move |&e| (s, e))
                })
                .collect()
        })
    }

    /// Returns the first idempotent (in index order) that is R-equivalent to `element`, if
    /// the R-class of `element` is regular.
    pub fn r_equivalent_idempotent(&self, element: usize) -> Option<usize> {
        self.idempotents()
            .iter()
            .copied()
            .find(|&e| self.r_equivalent(element, e))
    }

    /// Renders the semigroup in the omalg text format: the element names followed by the
    /// rows of the multiplication table.
    pub fn description(&self) -> String {
        let elements = format!("{};", self.names.iter().join(","));
        let table = self
            .table
            .iter()
            .map(|row| row.iter().map(|&x| self.name(x)).join(","))
            .join("\n");
        format!("{elements}\n{table};")
    }
}

impl Show for Semigroup {
    fn show(&self) -> String {
        use owo_colors::OwoColorize;
        let mut b = tabled::builder::Builder::default();
        b.push_record(
            std::iter::once("·".to_string()).chain(self.names.iter().map(|n| n.bold().to_string())),
        );
        for (i, row) in self.table.iter().enumerate() {
            b.push_record(
                std::iter::once(self.name(i).bold().to_string())
                    .chain(row.iter().map(|&x| self.name(x).to_string())),
            );
        }
        b.build().with(tabled::settings::Style::ascii()).to_string()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::Semigroup;
    use crate::Show;

    /// The semigroup {e, a, 0} where e is an identity, a·a = 0 and 0 is absorbing.
    pub fn nilpotent() -> Semigroup {
        Semigroup::new(
            vec!["e".into(), "a".into(), "0".into()],
            vec![vec![0, 1, 2], vec![1, 2, 2], vec![2, 2, 2]],
        )
        .unwrap()
    }

    /// Transition semigroup of "infinitely many a" over {a, b}: elements a, b, ab.
    pub fn infinitely_many_a() -> Semigroup {
        Semigroup::new(
            vec!["a".into(), "b".into(), "ab".into()],
            vec![vec![0, 2, 2], vec![0, 1, 2], vec![0, 2, 2]],
        )
        .unwrap()
    }

    #[test]
    fn construction_is_validated() {
        assert!(Semigroup::new(vec!["x".into()], vec![vec![1]]).is_err());
        assert!(Semigroup::new(vec!["x".into()], vec![vec![0, 0]]).is_err());
        assert!(Semigroup::new(vec!["x".into(), "y".into()], vec![vec![0, 0]]).is_err());
        assert!(nilpotent().element_name(3).is_err());
        assert_eq!(nilpotent().element_name(1), Ok("a"));
    }

    #[test]
    fn fixtures_are_associative() {
        let s = nilpotent();
        assert!(s.is_associative());
        for a in 0..3 {
            for b in 0..3 {
                for c in 0..3 {
                    assert_eq!(
                        s.product(s.product(a, b), c),
                        s.product(a, s.product(b, c))
                    );
                }
            }
        }
        assert!(infinitely_many_a().is_associative());
        let broken = Semigroup::new(
            vec!["x".into(), "y".into()],
            vec![vec![1, 0], vec![0, 0]],
        )
        .unwrap();
        assert!(!broken.is_associative());
    }

    #[test]
    fn green_equivalences_are_symmetric_closures() {
        for s in [nilpotent(), infinitely_many_a()] {
            let n = s.size();
            for a in 0..n {
                for b in 0..n {
                    assert_eq!(s.j_equivalent(a, b), s.j(a, b) && s.j(b, a));
                    assert_eq!(s.r_equivalent(a, b), s.r(a, b) && s.r(b, a));
                    assert_eq!(s.l_equivalent(a, b), s.l(a, b) && s.l(b, a));
                    assert_eq!(
                        s.h_equivalent(a, b),
                        s.r_equivalent(a, b) && s.l_equivalent(a, b)
                    );
                    // R and L are contained in J
                    assert!(!s.r(a, b) || s.j(a, b));
                    assert!(!s.l(a, b) || s.j(a, b));
                }
            }
        }
    }

    #[test]
    fn green_orders_of_nilpotent_semigroup() {
        let s = nilpotent();
        // everything lies below the identity
        assert!((0..3).all(|x| s.r(x, 0) && s.l(x, 0) && s.j(x, 0)));
        assert!(s.j_strict(1, 0));
        assert!(s.j_strict(2, 1));
        assert!(!s.j(0, 1));
        assert!((0..3).all(|x| s.j_equivalent(x, x)));
        assert!(!s.r_equivalent(1, 2));
    }

    #[test]
    fn green_orders_of_transition_semigroup() {
        let s = infinitely_many_a();
        assert!(s.r_equivalent(0, 2));
        assert!(!s.l_equivalent(0, 2));
        assert!(s.j_equivalent(0, 2));
        assert!(s.j_strict(0, 1));
        assert!(s.j_strict(2, 1));
        assert_eq!(s.calculate_j_depths(), &[2, 1, 2]);
    }

    #[test]
    fn j_depth_is_one_more_than_deepest_strictly_higher_element() {
        for s in [nilpotent(), infinitely_many_a()] {
            let n = s.size();
            for a in 0..n {
                let above = (0..n).filter(|&b| s.j_strict(a, b)).map(|b| s.j_depth(b)).max();
                match above {
                    None => assert_eq!(s.j_depth(a), 1),
                    Some(d) => assert_eq!(s.j_depth(a), d + 1),
                }
            }
        }
        assert_eq!(nilpotent().calculate_j_depths(), &[1, 2, 3]);
    }

    #[test]
    fn idempotents_and_linked_pairs() {
        let s = nilpotent();
        assert_eq!(s.idempotents(), &[0, 2]);
        assert_eq!(s.linked_pairs(), &[(0, 0), (1, 0), (2, 0), (2, 2)]);

        let t = infinitely_many_a();
        assert!(!t.idempotents().is_empty());
        assert_eq!(t.idempotents(), &[0, 1, 2]);
        assert_eq!(t.linked_pairs(), &[(0, 0), (1, 1), (2, 1), (2, 2)]);
        assert!(t.linked_pairs().windows(2).all(|w| w[0] < w[1]));
        assert_eq!(t.r_equivalent_idempotent(2), Some(0));
    }

    #[test]
    fn clones_do_not_share_caches() {
        let s = infinitely_many_a();
        s.calculate_j_depths();
        let t = s.clone();
        assert_eq!(s, t);
        assert_eq!(t.calculate_j_depths(), &[2, 1, 2]);
        assert!(!std::ptr::eq(
            s.calculate_j_depths().as_ptr(),
            t.calculate_j_depths().as_ptr()
        ));
    }

    #[test]
    fn description_and_table() {
        let s = nilpotent();
        assert_eq!(s.description(), "e,a,0;\ne,a,0\na,0,0\n0,0,0;");
        let shown = s.show();
        assert!(shown.contains('·'));
        assert_eq!(s.product_of([1, 1, 0]), Some(2));
        assert_eq!(s.product_of([]), None);
    }
}
