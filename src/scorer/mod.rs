pub mod crib;
pub mod engine;
pub mod loader;

pub use self::crib::CribScorer;
pub use self::loader::{load_ngrams, load_ngrams_from_reader, NgramTable};

/// Integer fitness; higher is better.
pub type Score = i64;

/// Fitness function used by the search. A crib, when given, takes precedence over
/// language statistics.
#[derive(Debug, Clone)]
pub enum Scorer {
    Crib(CribScorer),
    Ngrams(NgramTable),
}

impl Scorer {
    #[inline(always)]
    pub fn score(&self, plaintext: &[u8]) -> Score {
        match self {
            Self::Crib(crib) => crib.score(plaintext),
            Self::Ngrams(table) => engine::score_ngrams(table, plaintext),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Crib(crib) => {
                let (lo, hi) = crib.offsets();
                format!("crib ({} symbols, offsets {}..={})", crib.crib().len(), lo, hi)
            }
            Self::Ngrams(table) => format!("{}-gram statistics", table.order()),
        }
    }
}
