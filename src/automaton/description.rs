use itertools::Itertools;

use super::{Acceptance, OmegaAutomaton, Transitions};

impl OmegaAutomaton {
    /// Renders the automaton in the omalg text format: acceptance kind, determinism, states,
    /// initial state, alphabet, transitions and the acceptance component, each section
    /// terminated by `;`. Transitions are grouped by origin state, one line per state.
    pub fn description(&self) -> String {
        let determinism = if self.is_deterministic() {
            "Deterministic"
        } else {
            "Nondeterministic"
        };
        [
            format!("{};", self.acceptance.kind().keyword()),
            format!("{determinism};"),
            format!("{};", self.states.join(",")),
            format!("{};", self.states[self.initial]),
            format!("{};", self.alphabet.join(",")),
            format!("{};", self.transition_list()),
            format!("{};", self.acceptance_list()),
        ]
        .join("\n")
    }

    fn transition_list(&self) -> String {
        let triple = |q: usize, a: usize, t: usize| {
            format!("({},{},{})", self.states[q], self.alphabet[a], self.states[t])
        };
        match &self.transitions {
            Transitions::Deterministic(table) => table
                .iter()
                .enumerate()
                .map(|(q, row)| {
                    row.iter()
                        .enumerate()
                        .map(|(a, &t)| triple(q, a, t))
                        .join(",")
                })
                .join(",\n"),
            Transitions::Nondeterministic(relation) => relation
                .iter()
                .enumerate()
                .map(|(q, row)| {
                    row.iter()
                        .enumerate()
                        .flat_map(|(a, targets)| targets.iter().map(move |&t| (a, t)))
                        .map(|(a, t)| triple(q, a, t))
                        .join(",")
                })
                .filter(|line| !line.is_empty())
                .join(",\n"),
        }
    }

    fn acceptance_list(&self) -> String {
        match &self.acceptance {
            Acceptance::Buchi(finals) | Acceptance::CoBuchi(finals) => finals
                .iter()
                .map(|q| self.states[q].as_str())
                .join(","),
            Acceptance::Parity(priorities) => priorities.iter().join(","),
            Acceptance::Muller(table) => table
                .iter()
                .map(|set| format!("{{{}}}", set.iter().map(|&q| self.states[q].as_str()).join(",")))
                .join(",\n"),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::automaton::{tests, OmegaAutomaton};

    #[test]
    fn descriptions() {
        assert_eq!(
            tests::infinitely_many_a().description(),
            "Buechi;\nDeterministic;\nq0,q1;\nq0;\na,b;\n(q0,a,q1),(q0,b,q0),\n(q1,a,q1),(q1,b,q0);\nq1;"
        );
        assert_eq!(
            tests::finitely_many_b().description(),
            "Buechi;\nNondeterministic;\nq0,q1;\nq0;\na,b;\n(q0,a,q0),(q0,a,q1),(q0,b,q0),\n(q1,a,q1);\nq1;"
        );
        let dma = OmegaAutomaton::deterministic_muller(
            vec!["p".into(), "q".into()],
            vec!["x".into()],
            1,
            vec![vec![1], vec![0]],
            vec![vec![0, 1], vec![1]],
        )
        .unwrap();
        assert_eq!(
            dma.description(),
            "Muller;\nDeterministic;\np,q;\nq;\nx;\n(p,x,q),\n(q,x,p);\n{p,q},\n{q};"
        );
    }
}
