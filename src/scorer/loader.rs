use crate::alphabet::Alphabet;
use crate::consts::{MAX_NGRAM_TABLE, NGRAM_WEIGHT_SCALE};
use crate::error::{PfError, PfResult};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// Dense log-frequency weights for every n-gram over the alphabet.
///
/// Index of gram `s[0..n]` is `((s[0] * N + s[1]) * N + ...) + s[n-1]`. Unseen grams weigh 0,
/// the most frequent gram weighs `NGRAM_WEIGHT_SCALE`.
#[derive(Debug, Clone)]
pub struct NgramTable {
    order: usize,
    radix: usize,
    weights: Vec<u16>,
}

impl NgramTable {
    /// Builds the table from raw `(gram, count)` pairs already mapped to indices.
    pub fn from_counts(radix: usize, order: usize, counts: &HashMap<Vec<u8>, f64>) -> PfResult<Self> {
        if order == 0 {
            return Err(PfError::Validation("N-gram order must be positive".to_string()));
        }
        let size = radix
            .checked_pow(order as u32)
            .filter(|&s| s <= MAX_NGRAM_TABLE)
            .ok_or_else(|| {
                PfError::Config(format!(
                    "A {}-gram table over {} symbols is too large",
                    order, radix
                ))
            })?;

        let positive = counts.values().copied().filter(|&c| c > 0.0);
        let (min, max) = positive.fold((f64::MAX, 0.0f64), |(lo, hi), c| (lo.min(c), hi.max(c)));
        if max <= 0.0 {
            return Err(PfError::Validation(
                "N-gram table has no usable entries".to_string(),
            ));
        }

        // Floor sits below the rarest observed gram so every seen gram weighs at least 1.
        let floor = (min / 2.0).ln();
        let span = max.ln() - floor;

        let mut weights = vec![0u16; size];
        for (gram, &count) in counts {
            if count <= 0.0 || gram.len() != order {
                continue;
            }
            let idx = gram.iter().fold(0usize, |acc, &s| acc * radix + s as usize);
            let w = (NGRAM_WEIGHT_SCALE * (count.ln() - floor) / span).round();
            weights[idx] = w.clamp(1.0, u16::MAX as f64) as u16;
        }

        Ok(Self {
            order,
            radix,
            weights,
        })
    }

    #[inline(always)]
    pub fn order(&self) -> usize {
        self.order
    }

    #[inline(always)]
    pub fn radix(&self) -> usize {
        self.radix
    }

    #[inline(always)]
    pub fn weight(&self, index: usize) -> u16 {
        self.weights[index]
    }

    pub fn weight_of(&self, gram: &[u8]) -> u16 {
        if gram.len() != self.order {
            return 0;
        }
        let idx = gram
            .iter()
            .fold(0usize, |acc, &s| acc * self.radix + s as usize);
        self.weights[idx]
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

pub fn load_ngrams<P: AsRef<Path>>(path: P, alphabet: &Alphabet) -> PfResult<NgramTable> {
    let path = path.as_ref();
    info!("📚 Loading N-grams from: {}", path.display());
    let file = File::open(path)?;
    load_ngrams_from_reader(file, alphabet)
}

/// Reads `GRAM<TAB>COUNT` lines. The order is taken from the first usable gram;
/// grams of another length or with foreign symbols are skipped.
pub fn load_ngrams_from_reader<R: Read>(reader: R, alphabet: &Alphabet) -> PfResult<NgramTable> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .quoting(false)
        .flexible(true)
        .from_reader(reader);

    let mut counts: HashMap<Vec<u8>, f64> = HashMap::new();
    let mut order = 0;
    let mut lines_read = 0;
    let mut skipped = 0;

    for rec in rdr.records() {
        let rec = rec?;
        lines_read += 1;
        if rec.len() < 2 {
            skipped += 1;
            continue;
        }

        let gram = rec[0].trim();
        let count: f64 = match rec[1].trim().parse() {
            Ok(v) => v,
            Err(_) => {
                skipped += 1;
                continue;
            }
        };

        let indices: Option<Vec<u8>> = gram.chars().map(|c| alphabet.index_of(c)).collect();
        let indices = match indices {
            Some(v) if !v.is_empty() => v,
            _ => {
                skipped += 1;
                continue;
            }
        };

        if order == 0 {
            order = indices.len();
        }
        if indices.len() != order || !count.is_finite() || count <= 0.0 {
            skipped += 1;
            continue;
        }

        *counts.entry(indices).or_default() += count;
    }

    debug!(
        "Scanned {} lines: {} distinct {}-grams, {} skipped",
        lines_read,
        counts.len(),
        order,
        skipped
    );

    if counts.is_empty() {
        return Err(PfError::Validation(
            "N-gram table has no usable entries".to_string(),
        ));
    }

    NgramTable::from_counts(alphabet.len(), order, &counts)
}
