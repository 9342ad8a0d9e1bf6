use crate::consts::CRIB_SCALE;
use crate::error::{PfError, PfResult};
use crate::scorer::Score;

/// Scores candidates by how many symbols match a known plaintext fragment.
///
/// The crib may sit anywhere in `min_offset..=max_offset`; the best placement wins.
/// Symbols missing from a short candidate count as mismatches.
#[derive(Debug, Clone)]
pub struct CribScorer {
    crib: Vec<u8>,
    min_offset: usize,
    max_offset: usize,
}

impl CribScorer {
    pub fn new(crib: Vec<u8>, min_offset: usize, max_offset: usize) -> PfResult<Self> {
        if crib.is_empty() {
            return Err(PfError::Validation("Crib is empty".to_string()));
        }
        if min_offset > max_offset {
            return Err(PfError::Config(format!(
                "Minimum crib offset {} exceeds maximum {}",
                min_offset, max_offset
            )));
        }
        Ok(Self {
            crib,
            min_offset,
            max_offset,
        })
    }

    pub fn crib(&self) -> &[u8] {
        &self.crib
    }

    pub fn offsets(&self) -> (usize, usize) {
        (self.min_offset, self.max_offset)
    }

    #[inline]
    pub fn score(&self, plaintext: &[u8]) -> Score {
        let len = self.crib.len();
        let mut best = 0usize;

        for offset in self.min_offset..=self.max_offset {
            let window = plaintext.get(offset..).unwrap_or(&[]);
            let matches = window
                .iter()
                .zip(&self.crib)
                .filter(|(a, b)| a == b)
                .count();
            best = best.max(matches);
            if best == len {
                break;
            }
        }

        // Integer rounding of CRIB_SCALE * best / len.
        (2 * CRIB_SCALE * best as i64 + len as i64) / (2 * len as i64)
    }
}
