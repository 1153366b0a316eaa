use crate::error::OmalgError;

/// A map from the letters of an alphabet to the elements of a semigroup. Letters are
/// referred to by their position in the alphabet.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Morphism {
    images: Vec<usize>,
    alphabet: Vec<String>,
}

impl Morphism {
    /// Creates a morphism, `images[a]` is the image of the `a`-th letter of `alphabet`.
    pub fn new(images: Vec<usize>, alphabet: Vec<String>) -> Result<Self, OmalgError> {
        if images.len() != alphabet.len() {
            return Err(OmalgError::malformed(format!(
                "morphism defines {} images for an alphabet of size {}",
                images.len(),
                alphabet.len()
            )));
        }
        Ok(Self::from_parts(images, alphabet))
    }

    pub(crate) fn from_parts(images: Vec<usize>, alphabet: Vec<String>) -> Self {
        debug_assert_eq!(images.len(), alphabet.len());
        Self { images, alphabet }
    }

    /// The alphabet, i.e. the domain.
    pub fn alphabet(&self) -> &[String] {
        &self.alphabet
    }

    /// Size of the alphabet.
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Returns `true` if the alphabet is empty.
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Images of all letters, in alphabet order.
    pub fn images(&self) -> &[usize] {
        &self.images
    }

    /// Checked application to a letter.
    pub fn apply(&self, letter: usize) -> Result<usize, OmalgError> {
        OmalgError::check_index("alphabet", letter, self.len()).map(|letter| self.images[letter])
    }

    /// Checked access to the name of a letter.
    pub fn letter_name(&self, letter: usize) -> Result<&str, OmalgError> {
        OmalgError::check_index("alphabet", letter, self.len())
            .map(|letter| self.alphabet[letter].as_str())
    }

    /// Position of the letter with the given name.
    pub fn letter_index(&self, name: &str) -> Option<usize> {
        self.alphabet.iter().position(|l| l == name)
    }

    /// Replaces every image through `f`, used when the codomain gets quotiented.
    pub(crate) fn map_images<F: Fn(usize) -> usize>(&self, f: F) -> Self {
        Self {
            images: self.images.iter().map(|&x| f(x)).collect(),
            alphabet: self.alphabet.clone(),
        }
    }
}

/// Unchecked application to a letter.
impl std::ops::Index<usize> for Morphism {
    type Output = usize;

    fn index(&self, letter: usize) -> &Self::Output {
        &self.images[letter]
    }
}

#[cfg(test)]
mod tests {
    use super::Morphism;
    use crate::error::OmalgError;

    #[test]
    fn checked_and_unchecked_application() {
        let phi = Morphism::new(vec![2, 0], vec!["a".into(), "b".into()]).unwrap();
        assert_eq!(phi.apply(0), Ok(2));
        assert_eq!(phi[1], 0);
        assert_eq!(
            phi.apply(2),
            Err(OmalgError::OutOfRange {
                what: "alphabet",
                index: 2,
                size: 2
            })
        );
        assert_eq!(phi.letter_name(1), Ok("b"));
        assert!(phi.letter_name(5).is_err());
        assert_eq!(phi.letter_index("b"), Some(1));
        assert!(Morphism::new(vec![0], vec![]).is_err());
    }
}
