use crate::alphabet::Alphabet;
use crate::cipher::{Decryptor, FillerRule};
use crate::config::{CipherParams, Config, SearchParams};
use crate::consts::{MAX_BEST_LIST_SIZE, MAX_CHURN_FACTOR, MAX_THREADS, MIN_CIPHERTEXT_LEN};
use crate::error::{PfError, PfResult};
use crate::key::PermutationTable;
use crate::optimizer::{
    ChurnTable, Optimizer, ProgressCallback, SearchContext, SearchOutcome, StopSignal, Transform,
};
use crate::scorer::{CribScorer, NgramTable, Scorer};
use itertools::Itertools;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Raw inputs of one analysis run, as supplied by the host.
#[derive(Debug, Clone, Default)]
pub struct AnalysisInput {
    pub ciphertext: String,
    pub crib: Option<String>,
    /// Required unless a crib is given.
    pub ngrams: Option<NgramTable>,
}

/// Builds the configured alphabet: the custom one if given, else the built-in one for `dim`.
pub fn build_alphabet(params: &CipherParams) -> PfResult<Alphabet> {
    match &params.alphabet {
        Some(symbols) => Alphabet::custom(params.dim, symbols),
        None => Alphabet::standard(params.dim),
    }
}

/// Validates everything up front and assembles the read-only search context.
/// Nothing is spawned; every configuration problem surfaces here.
pub fn prepare(config: &Config, input: AnalysisInput) -> PfResult<SearchContext> {
    let alphabet = build_alphabet(&config.cipher)?;
    let dim = alphabet.dim();

    let ciphertext = alphabet.sanitize(&input.ciphertext);
    if ciphertext.len() < MIN_CIPHERTEXT_LEN {
        return Err(PfError::Validation(format!(
            "Ciphertext needs at least {} symbols - found {}",
            MIN_CIPHERTEXT_LEN,
            ciphertext.len()
        )));
    }
    if ciphertext.len() % 2 != 0 {
        return Err(PfError::Validation(format!(
            "Ciphertext length must be even - found {} symbols",
            ciphertext.len()
        )));
    }

    let fillers = FillerRule::from_chars(
        &alphabet,
        config.cipher.separator,
        config.cipher.separator_replacement,
    )?;

    let scorer = match input.crib.as_deref().map(str::trim) {
        Some(text) if !text.is_empty() => {
            let crib = alphabet.strict(text)?;
            let (min, max) = (config.crib.min_crib_offset, config.crib.max_crib_offset);
            if max.checked_add(crib.len()).map_or(true, |end| end > ciphertext.len()) {
                return Err(PfError::Validation(format!(
                    "Crib of {} symbols does not fit at offset {} of a {}-symbol ciphertext",
                    crib.len(),
                    max,
                    ciphertext.len()
                )));
            }
            if input.ngrams.is_some() {
                warn!("Both a crib and n-gram statistics were given; scoring with the crib");
            }
            Scorer::Crib(CribScorer::new(crib, min, max)?)
        }
        _ => {
            let table = input.ngrams.ok_or_else(|| {
                PfError::Config("Without a crib an n-gram table is required".to_string())
            })?;
            if table.radix() != alphabet.len() {
                return Err(PfError::Config(format!(
                    "N-gram table is over {} symbols, alphabet has {}",
                    table.radix(),
                    alphabet.len()
                )));
            }
            Scorer::Ngrams(table)
        }
    };

    let search = &config.search;
    if search.inner_steps == 0 {
        return Err(PfError::Config("inner_steps must be positive".to_string()));
    }
    if !(0..=MAX_CHURN_FACTOR).contains(&search.churn_factor) {
        return Err(PfError::Config(format!(
            "churn_factor must be between 0 and {} - found {}",
            MAX_CHURN_FACTOR, search.churn_factor
        )));
    }
    if search.threads > MAX_THREADS {
        return Err(PfError::Config(format!(
            "threads must be at most {} - found {}",
            MAX_THREADS, search.threads
        )));
    }
    if search.best_list_size > MAX_BEST_LIST_SIZE {
        return Err(PfError::Config(format!(
            "best_list_size must be at most {} - found {}",
            MAX_BEST_LIST_SIZE, search.best_list_size
        )));
    }

    let permutations = Arc::new(PermutationTable::new(dim));
    let move_kinds = config.transforms.enabled_kinds();
    // Built once here so a bad category selection fails before any task starts.
    let transform = Transform::new(dim, &move_kinds, permutations.clone())?;

    info!(
        "🔑 {}x{} square, {} ciphertext symbols, scoring by {}",
        dim,
        dim,
        ciphertext.len(),
        scorer.describe()
    );
    info!(
        "🔀 {} mutations per pass, key space {}",
        transform.total(),
        keyspace_size(alphabet.len())
    );
    debug!("Mutation categories: {}", move_kinds.iter().join(", "));

    let decryptor = Decryptor::new(dim, search.strip_fillers.then_some(fillers));

    Ok(SearchContext {
        alphabet,
        ciphertext,
        decryptor,
        scorer,
        permutations,
        move_kinds,
        churn: ChurnTable::default(),
        params: search.clone(),
    })
}

/// Validates, then runs the search to completion or until `stop` is raised.
pub fn analyze<CB: ProgressCallback>(
    config: &Config,
    input: AnalysisInput,
    stop: &StopSignal,
    callback: &CB,
) -> PfResult<SearchOutcome> {
    let ctx = prepare(config, input)?;
    if let Some(total) = max_keys(&ctx.params) {
        info!("📊 Planned evaluations: {}", total);
    }
    Optimizer::new(Arc::new(ctx)).run(stop, callback)
}

/// `n!` in the form `1.55*10^25`.
pub fn keyspace_size(n: usize) -> String {
    scientific((2..=n).map(|k| (k as f64).log10()).sum())
}

/// Formats a positive number given by its base-10 logarithm.
pub fn scientific(log10: f64) -> String {
    let exponent = log10.floor();
    let mantissa = 10f64.powf(log10 - exponent);
    format!("{:.2}*10^{}", mantissa, exponent as u64)
}

/// Evaluations a bounded run performs in total; `None` for unbounded runs and
/// for counts beyond `u64`.
pub fn max_keys(params: &SearchParams) -> Option<u64> {
    if params.cycles == 0 {
        return None;
    }
    let per_cycle = (params.inner_steps as u64).checked_add(1)?;
    (params.cycles as u64)
        .checked_mul(params.resolved_threads() as u64)?
        .checked_mul(per_cycle)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crib_input(ciphertext: &str, crib: &str) -> AnalysisInput {
        AnalysisInput {
            ciphertext: ciphertext.to_string(),
            crib: Some(crib.to_string()),
            ngrams: None,
        }
    }

    #[test]
    fn test_keyspace_size() {
        assert_eq!(keyspace_size(25), "1.55*10^25");
        assert_eq!(keyspace_size(36), "3.72*10^41");
        assert_eq!(keyspace_size(4), "2.40*10^1");
    }

    #[test]
    fn test_max_keys() {
        let mut params = SearchParams {
            cycles: 2,
            threads: 3,
            inner_steps: 9,
            ..Default::default()
        };
        assert_eq!(max_keys(&params), Some(60));
        params.cycles = 0;
        assert_eq!(max_keys(&params), None);

        params.cycles = usize::MAX;
        params.inner_steps = usize::MAX;
        assert_eq!(max_keys(&params), None);
    }

    #[test]
    fn test_prepare_rejects_out_of_range_settings() {
        let mut cfg = Config::default();
        cfg.search.churn_factor = i64::MAX / 10;
        let res = prepare(&cfg, crib_input("BMODZBXDNABE", "HIDE"));
        assert!(matches!(res, Err(PfError::Config(_))));

        let mut cfg = Config::default();
        cfg.search.best_list_size = usize::MAX;
        let res = prepare(&cfg, crib_input("BMODZBXDNABE", "HIDE"));
        assert!(matches!(res, Err(PfError::Config(_))));

        let mut cfg = Config::default();
        cfg.search.threads = usize::MAX;
        let res = prepare(&cfg, crib_input("BMODZBXDNABE", "HIDE"));
        assert!(matches!(res, Err(PfError::Config(_))));
    }

    #[test]
    fn test_largest_settings_run_to_completion() {
        let mut cfg = Config::default();
        cfg.search.churn_factor = MAX_CHURN_FACTOR;
        cfg.search.best_list_size = MAX_BEST_LIST_SIZE;
        cfg.search.cycles = 2;
        cfg.search.threads = 1;
        cfg.search.inner_steps = 500;
        cfg.search.seed = Some(4);

        let outcome = analyze(
            &cfg,
            crib_input("BMODZBXDNABEKUDMUIXMMOUVIF", "HIDETHEGOLD"),
            &StopSignal::new(),
            &(),
        )
        .unwrap();
        assert_eq!(outcome.evaluations, 1_002);
        assert!(outcome.best.is_some());
    }

    #[test]
    fn test_prepare_rejects_bad_ciphertext() {
        let cfg = Config::default();
        let odd = prepare(&cfg, crib_input("ABCDEFG", "AB"));
        assert!(matches!(odd, Err(PfError::Validation(_))));

        let short = prepare(&cfg, crib_input("AB CD", "AB"));
        assert!(matches!(short, Err(PfError::Validation(_))));
    }

    #[test]
    fn test_prepare_rejects_foreign_crib() {
        let cfg = Config::default();
        let res = prepare(&cfg, crib_input("BMODZBXDNABE", "HI5"));
        assert!(matches!(res, Err(PfError::Validation(_))));
    }

    #[test]
    fn test_prepare_rejects_crib_beyond_ciphertext() {
        let mut cfg = Config::default();
        cfg.crib.max_crib_offset = 9;
        let res = prepare(&cfg, crib_input("BMODZBXDNABE", "HIDE"));
        assert!(matches!(res, Err(PfError::Validation(_))));

        cfg.crib.max_crib_offset = 8;
        let ok = prepare(&cfg, crib_input("BMODZBXDNABE", "HIDE"));
        assert!(ok.is_ok());

        cfg.crib.max_crib_offset = usize::MAX;
        let res = prepare(&cfg, crib_input("BMODZBXDNABE", "HIDE"));
        assert!(matches!(res, Err(PfError::Validation(_))));
    }

    #[test]
    fn test_prepare_requires_a_scorer() {
        let cfg = Config::default();
        let res = prepare(
            &cfg,
            AnalysisInput {
                ciphertext: "BMODZBXDNABE".to_string(),
                ..Default::default()
            },
        );
        assert!(matches!(res, Err(PfError::Config(_))));
    }

    #[test]
    fn test_prepare_rejects_empty_transform() {
        let mut cfg = Config::default();
        cfg.transforms.move_swap2 = false;
        cfg.transforms.move_swap_rows = false;
        cfg.transforms.move_swap_cols = false;
        cfg.transforms.move_permute_rows = false;
        cfg.transforms.move_permute_cols = false;
        cfg.transforms.move_permute_col_rows = false;
        cfg.transforms.move_permute_row_cols = false;
        let res = prepare(&cfg, crib_input("BMODZBXDNABE", "HIDE"));
        assert!(matches!(res, Err(PfError::Config(_))));
    }

    #[test]
    fn test_prepare_strips_foreign_characters() {
        let cfg = Config::default();
        let ctx = prepare(&cfg, crib_input("bm od-zb xd!na be", "HIDE")).unwrap();
        assert_eq!(ctx.ciphertext.len(), 12);
        assert!(ctx.decryptor.fillers().is_none());
    }
}
