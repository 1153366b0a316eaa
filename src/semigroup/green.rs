use bit_set::BitSet;
use tracing::trace;

/// Green's preorders of a finite semigroup, stored as principal ideals. For every element
/// `x` we keep the set of elements that lie below `x` in the respective preorder, so
/// `a ≤_R b` holds iff `a` is contained in `r_below[b]`.
///
/// * `a ≤_R b` iff `a ∈ bS¹`, i.e. `a` occurs in row `b` of the product table or `a == b`
/// * `a ≤_L b` iff `a ∈ S¹b`, i.e. `a` occurs in column `b` of the product table or `a == b`
/// * `a ≤_J b` iff `a ≤_R k` for some `k ≤_L b`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GreenRelations {
    r_below: Vec<BitSet>,
    l_below: Vec<BitSet>,
    j_below: Vec<BitSet>,
}

impl GreenRelations {
    /// Computes all three preorders from a product table in cubic time.
    pub fn compute(table: &[Vec<usize>]) -> Self {
        let n = table.len();
        let mut r_below = vec![BitSet::with_capacity(n); n];
        let mut l_below = vec![BitSet::with_capacity(n); n];

        for x in 0..n {
            r_below[x].insert(x);
            l_below[x].insert(x);
        }
        for (lhs, row) in table.iter().enumerate() {
            for (rhs, &product) in row.iter().enumerate() {
                r_below[lhs].insert(product);
                l_below[rhs].insert(product);
            }
        }

        let j_below = l_below
            .iter()
            .map(|left_ideal| {
                let mut ideal = BitSet::with_capacity(n);
                for k in left_ideal.iter() {
                    ideal.union_with(&r_below[k]);
                }
                ideal
            })
            .collect();

        trace!("computed Green's relations for semigroup with {n} elements");
        Self {
            r_below,
            l_below,
            j_below,
        }
    }

    /// Returns `true` iff `a ≤_R b`.
    pub fn r(&self, a: usize, b: usize) -> bool {
        self.r_below[b].contains(a)
    }

    /// Returns `true` iff `a ≤_L b`.
    pub fn l(&self, a: usize, b: usize) -> bool {
        self.l_below[b].contains(a)
    }

    /// Returns `true` iff `a ≤_J b`.
    pub fn j(&self, a: usize, b: usize) -> bool {
        self.j_below[b].contains(a)
    }

    /// Returns `true` iff `a <_J b`, that is `a ≤_J b` but not `b ≤_J a`.
    pub fn j_strict(&self, a: usize, b: usize) -> bool {
        self.j(a, b) && !self.j(b, a)
    }

    /// Stratifies the elements along the strict J-order. J-maximal elements have depth 1,
    /// every other element lies one level below the deepest element strictly J-above it.
    pub fn j_depths(&self) -> Vec<usize> {
        let n = self.j_below.len();
        // number of elements strictly above every element
        let mut pending: Vec<usize> = (0..n)
            .map(|a| (0..n).filter(|&b| self.j_strict(a, b)).count())
            .collect();
        let mut depths = vec![1; n];
        let mut queue: std::collections::VecDeque<usize> =
            (0..n).filter(|&a| pending[a] == 0).collect();

        while let Some(b) = queue.pop_front() {
            for a in self.j_below[b].iter() {
                if !self.j_strict(a, b) {
                    continue;
                }
                depths[a] = depths[a].max(depths[b] + 1);
                pending[a] -= 1;
                if pending[a] == 0 {
                    queue.push_back(a);
                }
            }
        }
        debug_assert!(pending.iter().all(|&p| p == 0));
        depths
    }
}
