use bit_set::BitSet;
use tracing::debug;

use super::OmegaSemigroup;

/// Classes of the lower levels of the Landweber hierarchy that can be decided on an
/// omega-semigroup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Recognizability {
    /// Languages of deterministic Büchi automata.
    DetBuechi,
    /// Languages of deterministic co-Büchi automata.
    DetCoBuechi,
    /// Languages that are both deterministic Büchi and deterministic co-Büchi recognizable.
    WeakBuechi,
    /// Languages of E-automata, i.e. open sets `UΣ^ω`.
    E,
    /// Languages of A-automata, the complements of E-languages.
    A,
}

impl Recognizability {
    /// All classes in the order in which they are reported.
    pub const ALL: [Recognizability; 5] = [
        Recognizability::DetBuechi,
        Recognizability::DetCoBuechi,
        Recognizability::WeakBuechi,
        Recognizability::E,
        Recognizability::A,
    ];
}

impl std::fmt::Display for Recognizability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Recognizability::DetBuechi => "deterministic Büchi",
            Recognizability::DetCoBuechi => "deterministic co-Büchi",
            Recognizability::WeakBuechi => "weak Büchi",
            Recognizability::E => "E",
            Recognizability::A => "A",
        };
        write!(f, "{name}")
    }
}

impl OmegaSemigroup {
    /// Decides membership of the recognized language in the given class.
    pub fn is_recognizable(&self, class: Recognizability) -> bool {
        let result = match class {
            Recognizability::DetBuechi => self.is_db_recognizable(),
            Recognizability::DetCoBuechi => self.is_dc_recognizable(),
            Recognizability::WeakBuechi => self.is_wb_recognizable(),
            Recognizability::E => self.is_e_recognizable(),
            Recognizability::A => self.is_a_recognizable(),
        };
        debug!("language is {}{class} recognizable", if result { "" } else { "not " });
        result
    }

    /// Reports every class of [`Recognizability::ALL`] together with the decision.
    pub fn classify(&self) -> Vec<(Recognizability, bool)> {
        Recognizability::ALL
            .into_iter()
            .map(|class| (class, self.is_recognizable(class)))
            .collect()
    }

    /// Deterministic Büchi recognizability: for all linked pairs `(s, e)` and `(s, f)` with
    /// `e ≤_R f`, if `s·f^ω ∈ P` then `s·e^ω ∈ P`.
    pub fn is_db_recognizable(&self) -> bool {
        self.db_condition(&self.accepting)
    }

    /// Deterministic co-Büchi recognizability, which is deterministic Büchi recognizability
    /// of the complement.
    pub fn is_dc_recognizable(&self) -> bool {
        self.db_condition(&self.complement_of_p())
    }

    /// Weak Büchi recognizability, i.e. both deterministic Büchi and co-Büchi recognizable.
    pub fn is_wb_recognizable(&self) -> bool {
        self.is_db_recognizable() && self.is_dc_recognizable()
    }

    /// E-recognizability: for all linked pairs `(s, e)` and `(t, f)` with `s ≤_R t`, if
    /// `t·f^ω ∈ P` then `s·e^ω ∈ P`.
    pub fn is_e_recognizable(&self) -> bool {
        self.e_condition(&self.accepting)
    }

    /// A-recognizability, which is E-recognizability of the complement.
    pub fn is_a_recognizable(&self) -> bool {
        self.e_condition(&self.complement_of_p())
    }

    fn linked_pair_accepted(&self, accepting: &BitSet, (s, e): (usize, usize)) -> bool {
        accepting.contains(self.mixed_product(s, self.omega_iteration(e)))
    }

    fn db_condition(&self, accepting: &BitSet) -> bool {
        let s_plus = &self.s_plus;
        let pairs = s_plus.linked_pairs();
        pairs.iter().all(|&(s, e)| {
            pairs
                .iter()
                .filter(|&&(t, f)| t == s && s_plus.r(e, f))
                .all(|&(_, f)| {
                    !self.linked_pair_accepted(accepting, (s, f))
                        || self.linked_pair_accepted(accepting, (s, e))
                })
        })
    }

    fn e_condition(&self, accepting: &BitSet) -> bool {
        let s_plus = &self.s_plus;
        let pairs = s_plus.linked_pairs();
        pairs.iter().all(|&(s, e)| {
            pairs
                .iter()
                .filter(|&&(t, _)| s_plus.r(s, t))
                .all(|&pair| {
                    !self.linked_pair_accepted(accepting, pair)
                        || self.linked_pair_accepted(accepting, (s, e))
                })
        })
    }
}
