/// Type alias for maps, we use this to hide which type of `HashMap` we are actually using.
pub type Map<K, V> = fxhash::FxHashMap<K, V>;

/// Represents a bijective mapping between `L` and `R`, that is a mapping which associates
/// each `L` with precisely one `R` and vice versa. We use it for name <-> index lookups.
pub type Bijection<L, R> = bimap::BiBTreeMap<L, R>;

/// Disjoint-set forest over the indices `0..size` with path compression and union by rank.
///
/// # Examples
/// ```
/// use omalg::math::UnionFind;
///
/// let mut uf = UnionFind::new(4);
/// uf.unite(0, 2);
/// uf.unite(2, 3);
/// assert_eq!(uf.find(0), uf.find(3));
/// assert_ne!(uf.find(1), uf.find(3));
/// ```
#[derive(Debug, Clone)]
pub struct UnionFind {
    parents: Vec<usize>,
    ranks: Vec<usize>,
}

impl UnionFind {
    /// Creates `size` singleton classes.
    pub fn new(size: usize) -> Self {
        Self {
            parents: (0..size).collect(),
            ranks: vec![0; size],
        }
    }

    /// Returns the number of members.
    pub fn len(&self) -> usize {
        self.parents.len()
    }

    /// Returns `true` if there are no members at all.
    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    /// Returns the representative of the class containing `member`, compressing the path
    /// on the way.
    pub fn find(&mut self, member: usize) -> usize {
        let mut root = member;
        while self.parents[root] != root {
            root = self.parents[root];
        }
        let mut current = member;
        while self.parents[current] != root {
            let next = self.parents[current];
            self.parents[current] = root;
            current = next;
        }
        root
    }

    /// Merges the classes of `lhs` and `rhs`.
    pub fn unite(&mut self, lhs: usize, rhs: usize) {
        let (left, right) = (self.find(lhs), self.find(rhs));
        if left == right {
            return;
        }
        match self.ranks[left].cmp(&self.ranks[right]) {
            std::cmp::Ordering::Greater => self.parents[right] = left,
            std::cmp::Ordering::Less => self.parents[left] = right,
            std::cmp::Ordering::Equal => {
                self.parents[left] = right;
                self.ranks[right] += 1;
            }
        }
    }

    /// Assigns consecutive class ids to the classes, ordered by their smallest member.
    /// Returns the id of every member together with the smallest member of every class.
    pub fn classes(&mut self) -> (Vec<usize>, Vec<usize>) {
        let mut root_to_class = crate::Map::default();
        let mut class_of = Vec::with_capacity(self.len());
        let mut representatives = Vec::new();
        for member in 0..self.len() {
            let root = self.find(member);
            let class = *root_to_class.entry(root).or_insert_with(|| {
                representatives.push(member);
                representatives.len() - 1
            });
            class_of.push(class);
        }
        (class_of, representatives)
    }
}

#[cfg(test)]
mod tests {
    use super::UnionFind;

    #[test]
    fn union_find_classes() {
        let mut uf = UnionFind::new(6);
        uf.unite(4, 1);
        uf.unite(5, 3);
        uf.unite(3, 1);
        let (class_of, reps) = uf.classes();
        assert_eq!(class_of, vec![0, 1, 2, 1, 1, 1]);
        assert_eq!(reps, vec![0, 1, 2]);
    }

    #[test]
    fn union_by_rank_keeps_roots_shallow() {
        let mut uf = UnionFind::new(8);
        for i in 1..8 {
            uf.unite(0, i);
        }
        let root = uf.find(7);
        assert!((0..8).all(|i| uf.find(i) == root));
        assert!(uf.ranks.iter().all(|&r| r <= 1));
    }
}
