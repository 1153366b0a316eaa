use thiserror::Error;

use crate::omega_semigroup::Recognizability;

/// Errors that can be raised by the algebraic core.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OmalgError {
    /// A conversion was requested for a language that lies outside of the targeted class,
    /// for example a deterministic Büchi automaton for a language that is not deterministic
    /// Büchi recognizable.
    #[error("operation not applicable: the language is not {0} recognizable")]
    NotApplicable(Recognizability),
    /// A checked accessor received an index that lies outside of its domain.
    #[error("index {index} out of range for {what} (size {size})")]
    OutOfRange {
        /// Names the indexed collection.
        what: &'static str,
        /// The offending index.
        index: usize,
        /// Size of the collection.
        size: usize,
    },
    /// A constructor received tables that do not fit together.
    #[error("malformed input: {0}")]
    Malformed(String),
}

impl OmalgError {
    pub(crate) fn malformed<S: Into<String>>(reason: S) -> Self {
        Self::Malformed(reason.into())
    }

    /// Returns `Ok(index)` if `index < size` and an [`OmalgError::OutOfRange`] otherwise.
    pub(crate) fn check_index(what: &'static str, index: usize, size: usize) -> Result<usize, Self> {
        if index < size {
            Ok(index)
        } else {
            Err(Self::OutOfRange { what, index, size })
        }
    }
}
