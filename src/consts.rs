/// Classic 5x5 Playfair alphabet. J is folded into I.
pub const ALPHABET_5X5: &str = "ABCDEFGHIKLMNOPQRSTUVWXYZ";

/// Extended 6x6 alphabet (letters and digits).
pub const ALPHABET_6X6: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Smallest and largest supported grid dimension.
pub const MIN_DIM: usize = 2;
pub const MAX_DIM: usize = 8;

/// Crib match rates are scaled to this integer range.
pub const CRIB_SCALE: i64 = 25_000;

/// Highest weight a single n-gram can carry in the statistical scorer.
pub const NGRAM_WEIGHT_SCALE: f64 = 1_000.0;

/// Upper bound on dense n-gram table entries (N^n).
pub const MAX_NGRAM_TABLE: usize = 1 << 28;

/// Ciphertexts shorter than this cannot be attacked meaningfully.
pub const MIN_CIPHERTEXT_LEN: usize = 6;

/// Inner-loop iterations per restart cycle.
pub const DEFAULT_INNER_STEPS: usize = 200_000;

/// Multiplier applied to the churn draw in the acceptance threshold.
pub const DEFAULT_CHURN_FACTOR: i64 = 20;

/// Upper bounds on run settings accepted by validation.
pub const MAX_CHURN_FACTOR: i64 = 1_000_000;
pub const MAX_THREADS: usize = 1_024;
pub const MAX_BEST_LIST_SIZE: usize = 10_000;

/// Default Playfair separator and its replacement for doubled separators.
pub const DEFAULT_SEPARATOR: char = 'X';
pub const DEFAULT_SEPARATOR_REPLACEMENT: char = 'Z';

/// Evaluations accumulated locally before being published to the shared counter.
pub const EVAL_FLUSH_INTERVAL: u64 = 4_096;

/// Churn distribution as (value, weight) pairs. Sharply peaked at 0..=2 with a
/// thin tail reaching 65.
pub const CHURN_DISTRIBUTION: &[(u8, u16)] = &[
    (0, 480),
    (1, 180),
    (2, 100),
    (3, 50),
    (4, 35),
    (5, 25),
    (6, 18),
    (7, 14),
    (8, 11),
    (9, 9),
    (10, 8),
    (11, 7),
    (12, 6),
    (13, 5),
    (14, 5),
    (15, 4),
    (16, 4),
    (18, 3),
    (20, 3),
    (22, 3),
    (24, 2),
    (26, 2),
    (28, 2),
    (30, 2),
    (33, 2),
    (36, 2),
    (40, 2),
    (44, 1),
    (48, 1),
    (52, 1),
    (56, 1),
    (60, 1),
    (65, 1),
];
