/// An ultimately periodic omega-word `u·v^ω` over letter indices, where `u` is called the
/// spoke and the non-empty `v` the cycle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Upw {
    spoke: Vec<usize>,
    cycle: Vec<usize>,
}

impl Upw {
    /// Builds `spoke·cycle^ω`, returns `None` if the cycle is empty.
    pub fn new(spoke: Vec<usize>, cycle: Vec<usize>) -> Option<Self> {
        if cycle.is_empty() {
            None
        } else {
            Some(Self { spoke, cycle })
        }
    }

    /// Builds `cycle^ω`.
    pub fn periodic(cycle: Vec<usize>) -> Option<Self> {
        Self::new(vec![], cycle)
    }

    /// Builds a word from letter names, looking each of them up in `alphabet`. Returns
    /// `None` if a letter is unknown or the cycle is empty.
    pub fn from_names<S: AsRef<str>>(alphabet: &[String], spoke: &[S], cycle: &[S]) -> Option<Self> {
        let lookup = |letters: &[S]| -> Option<Vec<usize>> {
            letters
                .iter()
                .map(|l| alphabet.iter().position(|a| a == l.as_ref()))
                .collect()
        };
        Self::new(lookup(spoke)?, lookup(cycle)?)
    }

    /// Builds a word from two strings in which every `char` is a letter name.
    pub fn from_chars(alphabet: &[String], spoke: &str, cycle: &str) -> Option<Self> {
        let split = |s: &str| s.chars().map(String::from).collect::<Vec<_>>();
        Self::from_names(alphabet, &split(spoke), &split(cycle))
    }

    /// The finite prefix `u`.
    pub fn spoke(&self) -> &[usize] {
        &self.spoke
    }

    /// The repeated part `v`.
    pub fn cycle(&self) -> &[usize] {
        &self.cycle
    }

    /// The first `length` letters of the word.
    pub fn prefix(&self, length: usize) -> Vec<usize> {
        self.spoke
            .iter()
            .chain(self.cycle.iter().cycle())
            .take(length)
            .copied()
            .collect()
    }

    /// The word `u·v^k·v^ω`, which denotes the same omega-word.
    pub fn unroll(&self, k: usize) -> Self {
        let mut spoke = self.spoke.clone();
        for _ in 0..k {
            spoke.extend_from_slice(&self.cycle);
        }
        Self {
            spoke,
            cycle: self.cycle.clone(),
        }
    }
}

/// Builds an [`Upw`] from a cycle, or a spoke and a cycle, given as anything that can be
/// turned into a slice of letter indices. Panics if the cycle is empty.
///
/// ```
/// use omalg::upw;
/// let w = upw!([0, 1], [1]);
/// assert_eq!(w.prefix(4), vec![0, 1, 1, 1]);
/// assert_eq!(upw!([2]).spoke(), &[] as &[usize]);
/// ```
#[macro_export]
macro_rules! upw {
    ($cycle:expr) => {
        $crate::word::Upw::periodic($cycle.to_vec())
            .expect("cycle of an omega-word must not be empty")
    };
    ($spoke:expr, $cycle:expr) => {
        $crate::word::Upw::new($spoke.to_vec(), $cycle.to_vec())
            .expect("cycle of an omega-word must not be empty")
    };
}
