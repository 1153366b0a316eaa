use bit_set::BitSet;

/// Tarjan's algorithm in the variant of Pearce, which only needs one index per node. Runs on
/// a graph given by adjacency lists and reports every strongly connected component exactly
/// once, in reverse topological order.
struct Tarjan<'a> {
    successors: &'a [Vec<usize>],
    index: usize,
    component_count: usize,
    stack: Vec<usize>,
    rootindex: Vec<Option<usize>>,
}

impl<'a> Tarjan<'a> {
    fn new(successors: &'a [Vec<usize>]) -> Self {
        Self {
            successors,
            index: 0,
            component_count: usize::MAX,
            stack: Vec::new(),
            rootindex: vec![None; successors.len()],
        }
    }

    fn visit<F: FnMut(&[usize])>(&mut self, v: usize, f: &mut F) {
        let mut node_v_is_root = true;
        self.rootindex[v] = Some(self.index);
        self.index += 1;

        let successors = self.successors;
        for &w in &successors[v] {
            if self.rootindex[w].is_none() {
                self.visit(w, f);
            }
            if self.rootindex[w] < self.rootindex[v] {
                self.rootindex[v] = self.rootindex[w];
                node_v_is_root = false;
            }
        }

        if node_v_is_root {
            let mut adjust = 1;
            let c = self.component_count;
            let rootindex = &mut self.rootindex;

            let start = self
                .stack
                .iter()
                .rposition(|&w| {
                    if rootindex[v] > rootindex[w] {
                        true
                    } else {
                        rootindex[w] = Some(c);
                        adjust += 1;
                        false
                    }
                })
                .map(|x| x + 1)
                .unwrap_or_default();

            rootindex[v] = Some(c);
            self.stack.push(v);
            f(&self.stack[start..]);
            self.stack.truncate(start);
            self.index -= adjust;
            self.component_count -= 1;
        } else {
            self.stack.push(v);
        }
    }

    fn execute<F: FnMut(&[usize])>(&mut self, mut f: F) {
        for q in 0..self.successors.len() {
            if self.rootindex[q].is_none() {
                self.visit(q, &mut f);
            }
        }
        debug_assert!(self.stack.is_empty())
    }
}

/// Computes the strongly connected components of the graph with nodes `0..successors.len()`.
/// Returns the component id of every node.
pub(crate) fn components(successors: &[Vec<usize>]) -> Vec<usize> {
    let mut component_of = vec![0; successors.len()];
    let mut count = 0;
    Tarjan::new(successors).execute(|scc| {
        for &q in scc {
            component_of[q] = count;
        }
        count += 1;
    });
    component_of
}

/// Decomposes the graph given by `edges` into strongly connected components and returns all
/// states in components that have at least one internal edge and for which `is_good` holds
/// on the colors of the internal edges. Isolated states with a self loop form a component
/// with one internal edge.
pub(crate) fn states_on_good_cycles<C, F>(
    size: usize,
    edges: &[(usize, C, usize)],
    is_good: F,
) -> BitSet
where
    F: Fn(&[&C]) -> bool,
{
    let mut successors = vec![vec![]; size];
    for (source, _, target) in edges {
        successors[*source].push(*target);
    }
    let component_of = components(&successors);

    let count = component_of.iter().max().map(|m| m + 1).unwrap_or_default();
    let mut internal: Vec<Vec<&C>> = vec![vec![]; count];
    for (source, color, target) in edges {
        if component_of[*source] == component_of[*target] {
            internal[component_of[*source]].push(color);
        }
    }

    let mut good = BitSet::with_capacity(size);
    for q in 0..size {
        let colors = &internal[component_of[q]];
        if !colors.is_empty() && is_good(colors) {
            good.insert(q);
        }
    }
    good
}

/// All states from which one of the `targets` is reachable along `edges`, including the
/// targets themselves.
pub(crate) fn can_reach<C>(size: usize, edges: &[(usize, C, usize)], targets: &BitSet) -> BitSet {
    let mut predecessors = vec![vec![]; size];
    for (source, _, target) in edges {
        predecessors[*target].push(*source);
    }
    let mut reached = targets.clone();
    let mut stack: Vec<usize> = targets.iter().collect();
    while let Some(q) = stack.pop() {
        for &p in &predecessors[q] {
            if reached.insert(p) {
                stack.push(p);
            }
        }
    }
    reached
}

#[cfg(test)]
mod tests {
    use bit_set::BitSet;

    use super::{can_reach, components, states_on_good_cycles};

    #[test]
    fn tarjan_components() {
        // 0 <-> 1 -> 2 -> 3 -> 2, 4 isolated
        let successors = vec![vec![1], vec![0, 2], vec![3], vec![2], vec![]];
        let c = components(&successors);
        assert_eq!(c[0], c[1]);
        assert_eq!(c[2], c[3]);
        assert_ne!(c[0], c[2]);
        assert_ne!(c[4], c[0]);
        assert_ne!(c[4], c[2]);
    }

    #[test]
    fn self_loops_are_cycles() {
        let edges = [(0, (), 0), (1, (), 0)];
        let good = states_on_good_cycles(2, &edges, |_| true);
        assert!(good.contains(0));
        assert!(!good.contains(1));
        let mut targets = BitSet::new();
        targets.insert(0);
        let reach = can_reach(3, &edges, &targets);
        assert!(reach.contains(1) && reach.contains(0) && !reach.contains(2));
    }
}
