use crate::consts::{ALPHABET_5X5, ALPHABET_6X6, MAX_DIM, MIN_DIM};
use crate::error::{PfError, PfResult};

/// Marker for characters that have no index in the alphabet.
const NOT_IN_ALPHABET: u8 = u8::MAX;

/// Maps alphabet characters to dense indices `0..N` and back, where `N = dim * dim`.
#[derive(Debug, Clone)]
pub struct Alphabet {
    dim: usize,
    symbols: Vec<char>,
    lookup: [u8; 128],
    fold_j: bool,
}

impl Alphabet {
    /// Builds the default alphabet for a grid dimension (5 or 6).
    pub fn standard(dim: usize) -> PfResult<Self> {
        match dim {
            5 => Self::custom(dim, ALPHABET_5X5),
            6 => Self::custom(dim, ALPHABET_6X6),
            _ => Err(PfError::Config(format!(
                "No built-in alphabet for a {}x{} grid; supply one explicitly",
                dim, dim
            ))),
        }
    }

    pub fn custom(dim: usize, symbols: &str) -> PfResult<Self> {
        if !(MIN_DIM..=MAX_DIM).contains(&dim) {
            return Err(PfError::Config(format!(
                "Grid dimension {} is outside {}..={}",
                dim, MIN_DIM, MAX_DIM
            )));
        }

        let symbols: Vec<char> = symbols.chars().map(|c| c.to_ascii_uppercase()).collect();
        if symbols.len() != dim * dim {
            return Err(PfError::Config(format!(
                "Alphabet has {} symbols but a {}x{} grid needs {}",
                symbols.len(),
                dim,
                dim,
                dim * dim
            )));
        }

        let mut lookup = [NOT_IN_ALPHABET; 128];
        for (i, &c) in symbols.iter().enumerate() {
            if !c.is_ascii() || c.is_ascii_control() {
                return Err(PfError::Config(format!(
                    "Alphabet symbol '{}' is not printable ASCII",
                    c
                )));
            }
            if lookup[c as usize] != NOT_IN_ALPHABET {
                return Err(PfError::Config(format!(
                    "Alphabet symbol '{}' appears more than once",
                    c
                )));
            }
            lookup[c as usize] = i as u8;
        }

        // Classic squares drop J and write it as I.
        let fold_j = lookup[b'J' as usize] == NOT_IN_ALPHABET && lookup[b'I' as usize] != NOT_IN_ALPHABET;

        Ok(Self {
            dim,
            symbols,
            lookup,
            fold_j,
        })
    }

    #[inline(always)]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of symbols, `dim * dim`.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn symbols(&self) -> &[char] {
        &self.symbols
    }

    /// Index of a character, after uppercasing and J folding.
    pub fn index_of(&self, c: char) -> Option<u8> {
        let mut c = c.to_ascii_uppercase();
        if self.fold_j && c == 'J' {
            c = 'I';
        }
        if !c.is_ascii() {
            return None;
        }
        match self.lookup[c as usize] {
            NOT_IN_ALPHABET => None,
            idx => Some(idx),
        }
    }

    /// Symbol for an index. Panics if `idx >= len()`.
    #[inline(always)]
    pub fn symbol(&self, idx: u8) -> char {
        self.symbols[idx as usize]
    }

    /// Converts text to indices, silently dropping characters outside the alphabet.
    pub fn sanitize(&self, text: &str) -> Vec<u8> {
        text.chars().filter_map(|c| self.index_of(c)).collect()
    }

    /// Converts text to indices, failing on the first character outside the alphabet.
    /// Whitespace is ignored.
    pub fn strict(&self, text: &str) -> PfResult<Vec<u8>> {
        text.chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| {
                self.index_of(c).ok_or_else(|| {
                    PfError::Validation(format!("Character '{}' is not in the alphabet", c))
                })
            })
            .collect()
    }

    pub fn render(&self, indices: &[u8]) -> String {
        indices.iter().map(|&i| self.symbol(i)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_5x5_folds_j() {
        let a = Alphabet::standard(5).unwrap();
        assert_eq!(a.len(), 25);
        assert_eq!(a.index_of('J'), a.index_of('I'));
        assert_eq!(a.index_of('a'), Some(0));
        assert_eq!(a.index_of('Z'), Some(24));
        assert_eq!(a.index_of('?'), None);
    }

    #[test]
    fn test_standard_6x6_keeps_j() {
        let a = Alphabet::standard(6).unwrap();
        assert_eq!(a.len(), 36);
        assert_ne!(a.index_of('J'), a.index_of('I'));
        assert_eq!(a.index_of('9'), Some(35));
    }

    #[test]
    fn test_sanitize_and_render() {
        let a = Alphabet::standard(5).unwrap();
        let idx = a.sanitize("Jolly good, 42!");
        assert_eq!(a.render(&idx), "IOLLYGOOD");
    }

    #[test]
    fn test_strict_rejects_foreign_symbols() {
        let a = Alphabet::standard(5).unwrap();
        assert!(a.strict("ATTACK AT DAWN").is_ok());
        assert!(matches!(a.strict("ATTACK1"), Err(PfError::Validation(_))));
    }

    #[test]
    fn test_dimension_mismatch() {
        assert!(matches!(
            Alphabet::custom(5, "ABCDEF"),
            Err(PfError::Config(_))
        ));
        assert!(matches!(
            Alphabet::custom(2, "AABC"),
            Err(PfError::Config(_))
        ));
        assert!(Alphabet::custom(2, "ABCD").is_ok());
    }
}
