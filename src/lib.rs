//! Algebraic theory of omega-regular languages.
//!
//! The crate connects omega-automata with finite omega-semigroups in both directions. An
//! [`OmegaSemigroup`] consists of a finite semigroup $S_+$ (see [`Semigroup`]), a finite set
//! $S_\omega$ of infinite elements, a mixed product $S_+ \times S_\omega \to S_\omega$ and an
//! omega iteration $S_+ \to S_\omega$. Together with a morphism from the alphabet into $S_+$
//! and an accepting set $P \subseteq S_\omega$ it recognizes the language of all words whose
//! Ramsey factorization evaluates to an element of $P$.
//!
//! Automata of all eight classes (Büchi, co-Büchi, parity and Muller acceptance, each
//! deterministic or nondeterministic) are represented by the single value type
//! [`OmegaAutomaton`]. Calling [`OmegaAutomaton::to_omega_semigroup`] folds the behaviour of the
//! automaton on every finite word into a [`profile::TransitionProfile`] and closes the letter
//! profiles under concatenation, which yields an omega-semigroup recognizing the same language.
//!
//! In the other direction, [`OmegaSemigroup`] decides whether the language it recognizes lies in
//! one of the lower classes of the Landweber hierarchy and the [`AutomatonConverter`] builds
//! canonical deterministic parity, co-Büchi, Büchi and weak Büchi automata from it.
//!
//! The [`io`] module reads and writes the omalg text format for both kinds of objects.
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

/// The prelude is supposed to make using this package easier. Including everything, i.e.
/// `use omalg::prelude::*;` should be enough to use the package.
pub mod prelude {
    pub use super::{
        automaton::{Acceptance, AutomatonClass, OmegaAutomaton, Transitions},
        converter::AutomatonConverter,
        error::OmalgError,
        math,
        morphism::Morphism,
        omega_semigroup::{OmegaSemigroup, Recognizability},
        profile::{OmegaProfile, TransitionProfile},
        semigroup::Semigroup,
        upw,
        word::Upw,
        Show,
    };
}

/// This module contains some definitions of mathematical objects which are used throughout the crate and
/// do not really fit to the top level.
pub mod math;
pub use math::Map;

/// Errors of the algebraic core.
pub mod error;
pub use error::OmalgError;

/// Finite semigroups together with Green's relations.
pub mod semigroup;
pub use semigroup::Semigroup;

/// Maps from letters to semigroup elements.
pub mod morphism;

/// Ultimately periodic words.
#[macro_use]
pub mod word;

/// Omega-semigroups, recognizability checks and syntactic reduction.
pub mod omega_semigroup;
pub use omega_semigroup::OmegaSemigroup;

/// Transition profiles, the algebraic summary of the behaviour of an automaton on a finite word.
pub mod profile;

/// Omega-automata of all acceptance types.
pub mod automaton;
pub use automaton::OmegaAutomaton;

/// Constructions of canonical deterministic automata from omega-semigroups.
pub mod converter;
pub use converter::AutomatonConverter;

/// Reading and writing the omalg text format.
pub mod io;

/// Generation of random automata and words.
#[cfg(feature = "random")]
pub mod random;

/// Helper trait which can be used to display semigroups, automata and such in a human readable
/// way. This is mainly used for debugging purposes and by the command line tool, the
/// machine readable representation is produced by the `description` methods.
pub trait Show {
    /// Returns a human readable representation of `self`.
    fn show(&self) -> String;
}

impl Show for usize {
    fn show(&self) -> String {
        self.to_string()
    }
}

impl Show for String {
    fn show(&self) -> String {
        self.clone()
    }
}

impl Show for bool {
    fn show(&self) -> String {
        match self {
            true => "+",
            false => "-",
        }
        .to_string()
    }
}

impl<S: Show> Show for &S {
    fn show(&self) -> String {
        S::show(*self)
    }
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    #[test_log::test]
    fn round_trip_through_both_directions() {
        let dba = crate::automaton::tests::infinitely_many_a();
        let os = dba.to_omega_semigroup();
        let back = os.to_det_buechi().unwrap();
        for w in [
            upw!([0]),
            upw!([1]),
            upw!([0, 1]),
            upw!([0], [1]),
            upw!([1, 1, 0], [1, 1]),
        ] {
            assert_eq!(dba.accepts(&w), back.accepts(&w), "{w:?}");
            assert_eq!(dba.accepts(&w), os.accepts(&w), "{w:?}");
        }
        assert_eq!(true.show(), "+");
    }
}
