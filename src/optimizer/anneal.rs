use crate::consts::CHURN_DISTRIBUTION;
use crate::scorer::Score;
use fastrand::Rng;

/// Discrete distribution of how far below the current score a move may land and
/// still be accepted, in units of the churn factor.
#[derive(Debug, Clone)]
pub struct ChurnTable {
    values: Vec<u8>,
}

impl Default for ChurnTable {
    fn default() -> Self {
        Self::new(CHURN_DISTRIBUTION)
    }
}

impl ChurnTable {
    /// Expands `(value, weight)` pairs into a flat lookup table.
    pub fn new(distribution: &[(u8, u16)]) -> Self {
        let mut values = Vec::new();
        for &(value, weight) in distribution {
            values.extend(std::iter::repeat(value).take(weight as usize));
        }
        if values.is_empty() {
            values.push(0);
        }
        Self { values }
    }

    #[inline(always)]
    pub fn draw(&self, rng: &mut Rng) -> i64 {
        self.values[rng.usize(0..self.values.len())] as i64
    }

    pub fn max(&self) -> i64 {
        self.values.iter().copied().max().unwrap_or(0) as i64
    }

    /// Exact probability that a move `gap` points below the current score is accepted.
    pub fn acceptance_probability(&self, gap: Score, factor: i64) -> f64 {
        if gap <= 0 {
            return 1.0;
        }
        let accepted = self
            .values
            .iter()
            .filter(|&&c| factor.saturating_mul(c as i64) > gap)
            .count();
        accepted as f64 / self.values.len() as f64
    }
}

/// Threshold acceptance: never worse moves always pass; worse ones pass when they
/// stay within `factor * churn` of the current score.
#[inline(always)]
pub fn accept(
    new_score: Score,
    current_score: Score,
    churn: &ChurnTable,
    factor: i64,
    rng: &mut Rng,
) -> bool {
    new_score >= current_score
        || new_score > current_score.saturating_sub(factor.saturating_mul(churn.draw(rng)))
}
