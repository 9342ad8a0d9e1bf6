use crate::consts::{
    DEFAULT_CHURN_FACTOR, DEFAULT_INNER_STEPS, DEFAULT_SEPARATOR, DEFAULT_SEPARATOR_REPLACEMENT,
};
use crate::error::PfResult;
use crate::optimizer::transform::MoveKind;
use clap::{parser::ValueSource, ArgAction, ArgMatches, Args};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Args, Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    #[command(flatten)]
    pub search: SearchParams,
    #[command(flatten)]
    pub cipher: CipherParams,
    #[command(flatten)]
    pub transforms: TransformParams,
    #[command(flatten)]
    pub crib: CribParams,
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchParams {
    /// Restart cycles per task (0 = run until stopped)
    #[arg(long, default_value_t = 0)]
    pub cycles: usize,
    /// Parallel search tasks (0 = one per CPU)
    #[arg(long, default_value_t = 0)]
    pub threads: usize,
    #[arg(long, default_value_t = DEFAULT_INNER_STEPS)]
    pub inner_steps: usize,
    #[arg(long, default_value_t = DEFAULT_CHURN_FACTOR)]
    pub churn_factor: i64,
    /// Remove separators and padding from decrypted candidates
    #[arg(long, default_value_t = false)]
    pub strip_fillers: bool,
    #[arg(long)]
    pub seed: Option<u64>,
    #[arg(long, default_value_t = 10)]
    pub best_list_size: usize,
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub discard_same_plaintexts: bool,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            cycles: 0,
            threads: 0,
            inner_steps: DEFAULT_INNER_STEPS,
            churn_factor: DEFAULT_CHURN_FACTOR,
            strip_fillers: false,
            seed: None,
            best_list_size: 10,
            discard_same_plaintexts: true,
        }
    }
}

impl SearchParams {
    pub fn resolved_threads(&self) -> usize {
        if self.threads > 0 {
            self.threads
        } else {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
        }
    }
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CipherParams {
    /// Side of the key square (5 or 6 for the built-in alphabets)
    #[arg(long, default_value_t = 5)]
    pub dim: usize,
    /// Custom square alphabet, dim*dim symbols
    #[arg(long)]
    pub alphabet: Option<String>,
    #[arg(long, default_value_t = DEFAULT_SEPARATOR)]
    pub separator: char,
    #[arg(long, default_value_t = DEFAULT_SEPARATOR_REPLACEMENT)]
    pub separator_replacement: char,
}

impl Default for CipherParams {
    fn default() -> Self {
        Self {
            dim: 5,
            alphabet: None,
            separator: DEFAULT_SEPARATOR,
            separator_replacement: DEFAULT_SEPARATOR_REPLACEMENT,
        }
    }
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformParams {
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub move_swap2: bool,
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub move_swap_rows: bool,
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub move_swap_cols: bool,
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub move_permute_rows: bool,
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub move_permute_cols: bool,
    #[arg(long, default_value_t = false, action = ArgAction::Set)]
    pub move_swap3: bool,
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub move_permute_col_rows: bool,
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub move_permute_row_cols: bool,
}

impl Default for TransformParams {
    fn default() -> Self {
        Self {
            move_swap2: true,
            move_swap_rows: true,
            move_swap_cols: true,
            move_permute_rows: true,
            move_permute_cols: true,
            move_swap3: false,
            move_permute_col_rows: true,
            move_permute_row_cols: true,
        }
    }
}

impl TransformParams {
    pub fn enabled_kinds(&self) -> Vec<MoveKind> {
        [
            (self.move_swap2, MoveKind::Swap2),
            (self.move_swap_rows, MoveKind::SwapRows),
            (self.move_swap_cols, MoveKind::SwapCols),
            (self.move_permute_rows, MoveKind::PermuteRows),
            (self.move_permute_cols, MoveKind::PermuteCols),
            (self.move_swap3, MoveKind::Swap3),
            (self.move_permute_col_rows, MoveKind::PermuteColRows),
            (self.move_permute_row_cols, MoveKind::PermuteRowCols),
        ]
        .into_iter()
        .filter_map(|(on, kind)| on.then_some(kind))
        .collect()
    }
}

#[derive(Args, Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CribParams {
    #[arg(long, default_value_t = 0)]
    pub min_crib_offset: usize,
    #[arg(long, default_value_t = 0)]
    pub max_crib_offset: usize,
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> PfResult<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Overwrites fields that were given explicitly on the command line.
    pub fn merge_from_cli(&mut self, cli: &Config, matches: &ArgMatches) {
        macro_rules! update_if_present {
            ($group:ident . $field:ident) => {
                if matches.value_source(stringify!($field)) == Some(ValueSource::CommandLine) {
                    self.$group.$field = cli.$group.$field.clone();
                }
            };
        }

        update_if_present!(search.cycles);
        update_if_present!(search.threads);
        update_if_present!(search.inner_steps);
        update_if_present!(search.churn_factor);
        update_if_present!(search.strip_fillers);
        update_if_present!(search.seed);
        update_if_present!(search.best_list_size);
        update_if_present!(search.discard_same_plaintexts);

        update_if_present!(cipher.dim);
        update_if_present!(cipher.alphabet);
        update_if_present!(cipher.separator);
        update_if_present!(cipher.separator_replacement);

        update_if_present!(transforms.move_swap2);
        update_if_present!(transforms.move_swap_rows);
        update_if_present!(transforms.move_swap_cols);
        update_if_present!(transforms.move_permute_rows);
        update_if_present!(transforms.move_permute_cols);
        update_if_present!(transforms.move_swap3);
        update_if_present!(transforms.move_permute_col_rows);
        update_if_present!(transforms.move_permute_row_cols);

        update_if_present!(crib.min_crib_offset);
        update_if_present!(crib.max_crib_offset);
    }
}
