use bit_set::BitSet;
use itertools::Itertools;

use crate::{
    automaton::OmegaAutomaton, converter::AutomatonConverter, error::OmalgError,
    morphism::Morphism, semigroup::Semigroup, word::Upw, Show,
};

mod recognizability;
pub use recognizability::Recognizability;

mod syntactic;

/// A finite omega-semigroup `(S+, S_ω)` together with a morphism `phi` from an alphabet into
/// `S+` and a set `P ⊆ S_ω` of accepting elements.
///
/// `S+` is a [`Semigroup`], the infinite elements are identified by their index in
/// `0..omega_size()`. The mixed product `s·w` and the omega iteration `s^ω` are stored as
/// tables. The language recognized consists of all omega-words `u·v^ω` for which
/// `phi(u)·phi(v)^ω` lies in `P`.
///
/// # Examples
/// ```
/// use omalg::prelude::*;
///
/// // one letter x mapped to the idempotent a, the only infinite element a^ω is accepting
/// let s = Semigroup::new(vec!["a".into()], vec![vec![0]]).unwrap();
/// let phi = Morphism::new(vec![0], vec!["x".into()]).unwrap();
/// let os = OmegaSemigroup::new(s, vec!["a^w".into()], vec![vec![0]], vec![0], vec![true], phi)
///     .unwrap();
/// assert!(os.is_db_recognizable());
/// assert!(os.accepts(&upw!([0])));
/// let dba = os.to_det_buechi().unwrap();
/// assert!(dba.accepts(&upw!([0])));
/// ```
#[derive(Debug, Clone)]
pub struct OmegaSemigroup {
    s_plus: Semigroup,
    omega_names: Vec<String>,
    mixed_products: Vec<Vec<usize>>,
    omega_iterations: Vec<usize>,
    accepting: BitSet,
    phi: Morphism,
    reduced: bool,
}

/// Equality of the tables, names and accepting set. Whether the semigroup was obtained by
/// syntactic reduction does not matter.
impl PartialEq for OmegaSemigroup {
    fn eq(&self, other: &Self) -> bool {
        self.s_plus == other.s_plus
            && self.omega_names == other.omega_names
            && self.mixed_products == other.mixed_products
            && self.omega_iterations == other.omega_iterations
            && self.accepting == other.accepting
            && self.phi == other.phi
    }
}

impl Eq for OmegaSemigroup {}

impl OmegaSemigroup {
    /// Creates a new omega-semigroup. The mixed product table needs one row per element of
    /// `S+` and one column per infinite element, the omega iteration table one entry per
    /// element of `S+` and `accepting` one flag per infinite element. The images of `phi` must
    /// lie in `S+`.
    pub fn new(
        s_plus: Semigroup,
        omega_names: Vec<String>,
        mixed_products: Vec<Vec<usize>>,
        omega_iterations: Vec<usize>,
        accepting: Vec<bool>,
        phi: Morphism,
    ) -> Result<Self, OmalgError> {
        let (n, m) = (s_plus.size(), omega_names.len());
        if mixed_products.len() != n || mixed_products.iter().any(|row| row.len() != m) {
            return Err(OmalgError::malformed(format!(
                "mixed product table must have dimension {n}x{m}"
            )));
        }
        if mixed_products.iter().flatten().any(|&w| w >= m) {
            return Err(OmalgError::malformed(
                "mixed product table refers to an unknown infinite element",
            ));
        }
        if omega_iterations.len() != n || omega_iterations.iter().any(|&w| w >= m) {
            return Err(OmalgError::malformed(format!(
                "omega iteration table must map each of the {n} finite elements to one of {m} infinite elements"
            )));
        }
        if accepting.len() != m {
            return Err(OmalgError::malformed(format!(
                "accepting set has {} entries, expected {m}",
                accepting.len()
            )));
        }
        if phi.images().iter().any(|&s| s >= n) {
            return Err(OmalgError::malformed(
                "morphism maps a letter outside of the semigroup",
            ));
        }
        let accepting = accepting
            .into_iter()
            .enumerate()
            .filter_map(|(w, b)| b.then_some(w))
            .collect();
        Ok(Self::from_parts(
            s_plus,
            omega_names,
            mixed_products,
            omega_iterations,
            accepting,
            phi,
        ))
    }

    pub(crate) fn from_parts(
        s_plus: Semigroup,
        omega_names: Vec<String>,
        mixed_products: Vec<Vec<usize>>,
        omega_iterations: Vec<usize>,
        accepting: BitSet,
        phi: Morphism,
    ) -> Self {
        Self {
            s_plus,
            omega_names,
            mixed_products,
            omega_iterations,
            accepting,
            phi,
            reduced: false,
        }
    }

    /// The finite part `S+`.
    pub fn s_plus(&self) -> &Semigroup {
        &self.s_plus
    }

    /// The generating morphism.
    pub fn phi(&self) -> &Morphism {
        &self.phi
    }

    /// The alphabet, i.e. the domain of the morphism.
    pub fn alphabet(&self) -> &[String] {
        self.phi.alphabet()
    }

    /// Names of the infinite elements.
    pub fn omega_names(&self) -> &[String] {
        &self.omega_names
    }

    /// Number of infinite elements.
    pub fn omega_size(&self) -> usize {
        self.omega_names.len()
    }

    /// Checked access to the name of an infinite element.
    pub fn omega_element_name(&self, element: usize) -> Result<&str, OmalgError> {
        OmalgError::check_index("infinite elements", element, self.omega_size())
            .map(|element| self.omega_names[element].as_str())
    }

    /// Looks up the infinite element with the given name.
    pub fn omega_index_of(&self, name: &str) -> Option<usize> {
        self.omega_names.iter().position(|n| n == name)
    }

    /// The mixed product table.
    pub fn mixed_products(&self) -> &[Vec<usize>] {
        &self.mixed_products
    }

    /// The omega iteration table.
    pub fn omega_iterations(&self) -> &[usize] {
        &self.omega_iterations
    }

    /// The accepting set `P`.
    pub fn accepting(&self) -> &BitSet {
        &self.accepting
    }

    /// Product in `S+`.
    #[inline]
    pub fn product(&self, lhs: usize, rhs: usize) -> usize {
        self.s_plus.product(lhs, rhs)
    }

    /// The mixed product `s·w`.
    #[inline]
    pub fn mixed_product(&self, plus: usize, omega: usize) -> usize {
        self.mixed_products[plus][omega]
    }

    /// The omega iteration `s^ω`.
    #[inline]
    pub fn omega_iteration(&self, element: usize) -> usize {
        self.omega_iterations[element]
    }

    /// Returns `true` if the infinite element lies in `P`.
    pub fn is_accepting(&self, omega: usize) -> bool {
        self.accepting.contains(omega)
    }

    /// Returns `true` once [`OmegaSemigroup::reduce_to_syntactic`] has been applied.
    pub fn is_reduced(&self) -> bool {
        self.reduced
    }

    /// Replaces `P` by its complement, so that the complement language is recognized.
    pub fn invert_p(&mut self) {
        self.accepting = self.complement_of_p();
    }

    /// A copy recognizing the complement language.
    pub fn complemented(&self) -> Self {
        let mut complement = self.clone();
        complement.invert_p();
        complement
    }

    pub(crate) fn complement_of_p(&self) -> BitSet {
        (0..self.omega_size())
            .filter(|&w| !self.accepting.contains(w))
            .collect()
    }

    /// The infinite element `phi(u)·phi(v)^ω` for the word `u·v^ω`. Panics if the word uses
    /// letters outside of the alphabet.
    pub fn evaluate(&self, word: &Upw) -> usize {
        let images = |letters: &[usize]| {
            self.s_plus
                .product_of(letters.iter().map(|&a| self.phi[a]))
        };
        let loop_element = images(word.cycle()).expect("cycle of an omega-word is never empty");
        let omega = self.omega_iteration(loop_element);
        match images(word.spoke()) {
            Some(prefix) => self.mixed_product(prefix, omega),
            None => omega,
        }
    }

    /// Decides whether the word lies in the recognized language.
    pub fn accepts(&self, word: &Upw) -> bool {
        self.is_accepting(self.evaluate(word))
    }

    /// Builds a deterministic max-even parity automaton, which is always possible.
    pub fn to_parity(&self) -> OmegaAutomaton {
        AutomatonConverter::new(self).convert_to_parity()
    }

    /// Builds a deterministic Büchi automaton, fails if the language is not deterministic
    /// Büchi recognizable.
    pub fn to_det_buechi(&self) -> Result<OmegaAutomaton, OmalgError> {
        self.require(Recognizability::DetBuechi)?;
        Ok(AutomatonConverter::new(self).convert_to_det_buechi())
    }

    /// Builds a deterministic co-Büchi automaton, fails if the language is not deterministic
    /// co-Büchi recognizable.
    pub fn to_co_buechi(&self) -> Result<OmegaAutomaton, OmalgError> {
        self.require(Recognizability::DetCoBuechi)?;
        Ok(AutomatonConverter::new(self).convert_to_co_buechi())
    }

    /// Builds a deterministic weak Büchi automaton, fails if the language is not weak Büchi
    /// recognizable.
    pub fn to_weak_buechi(&self) -> Result<OmegaAutomaton, OmalgError> {
        self.require(Recognizability::WeakBuechi)?;
        Ok(AutomatonConverter::new(self).convert_to_weak_buechi())
    }

    fn require(&self, class: Recognizability) -> Result<(), OmalgError> {
        if self.is_recognizable(class) {
            Ok(())
        } else {
            Err(OmalgError::NotApplicable(class))
        }
    }

    /// Renders the omega-semigroup in the omalg text format.
    pub fn description(&self) -> String {
        let omega = |w: &usize| self.omega_names[*w].as_str();
        let mixed = self
            .mixed_products
            .iter()
            .map(|row| row.iter().map(omega).join(","))
            .join("\n");
        let images = self
            .phi
            .images()
            .iter()
            .map(|&s| self.s_plus.name(s))
            .join(",");
        [
            self.s_plus.description(),
            format!("{};", self.omega_names.join(",")),
            format!("{mixed};"),
            format!("{};", self.omega_iterations.iter().map(omega).join(",")),
            format!("{};", self.alphabet().join(",")),
            format!("{images};"),
            format!("{};", self.accepting.iter().map(|w| omega(&w)).join(",")),
        ]
        .join("\n")
    }
}

impl Show for OmegaSemigroup {
    fn show(&self) -> String {
        use owo_colors::OwoColorize;
        let omega = |w: usize| {
            if self.is_accepting(w) {
                self.omega_names[w].green().to_string()
            } else {
                self.omega_names[w].clone()
            }
        };
        let mut b = tabled::builder::Builder::default();
        b.push_record(
            std::iter::once("·".to_string())
                .chain((0..self.omega_size()).map(|w| omega(w).bold().to_string()))
                .chain(std::iter::once("ω".bold().to_string())),
        );
        for (s, row) in self.mixed_products.iter().enumerate() {
            b.push_record(
                std::iter::once(self.s_plus.name(s).bold().to_string())
                    .chain(row.iter().map(|&w| omega(w)))
                    .chain(std::iter::once(omega(self.omega_iteration(s)))),
            );
        }
        let images = self
            .alphabet()
            .iter()
            .zip(self.phi.images())
            .map(|(a, &s)| format!("{a} ↦ {}", self.s_plus.name(s)))
            .join(", ");
        format!(
            "{}\n{}\n{images}",
            self.s_plus.show(),
            b.build().with(tabled::settings::Style::ascii())
        )
    }
}
