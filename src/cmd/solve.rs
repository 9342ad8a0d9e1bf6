use crate::reports;
use clap::{ArgMatches, Args};
use playforge::api::{self, AnalysisInput};
use playforge::config::Config;
use playforge::error::{PfError, PfResult};
use playforge::key::Key;
use playforge::optimizer::{SearchEvent, StopSignal};
use playforge::scorer::load_ngrams;
use std::fs;
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Args, Debug, Clone)]
pub struct SolveArgs {
    #[command(flatten)]
    pub config: Config,

    /// Ciphertext to attack
    #[arg(short = 'c', long, conflicts_with = "input")]
    pub ciphertext: Option<String>,

    /// Read the ciphertext from a file
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Known plaintext at the start of the message (or within the crib offset range)
    #[arg(long)]
    pub crib: Option<String>,

    /// Tab-separated n-gram counts
    #[arg(short, long)]
    pub ngrams: Option<PathBuf>,

    /// Stop after this many seconds
    #[arg(short = 'T', long)]
    pub time: Option<u64>,

    /// JSON config file; explicit flags override it
    #[arg(long = "config")]
    pub config_file: Option<PathBuf>,

    /// Print the outcome as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

pub fn run(args: SolveArgs, matches: &ArgMatches) -> PfResult<()> {
    let config = match &args.config_file {
        Some(path) => {
            info!("📂 Loading config: {}", path.display());
            let mut file_config = Config::load_from_file(path)?;
            file_config.merge_from_cli(&args.config, matches);
            file_config
        }
        None => args.config.clone(),
    };

    let ciphertext = match (&args.ciphertext, &args.input) {
        (Some(text), _) => text.clone(),
        (None, Some(path)) => fs::read_to_string(path)?,
        (None, None) => {
            return Err(PfError::Config(
                "Provide the ciphertext with --ciphertext or --input".to_string(),
            ))
        }
    };

    let alphabet = api::build_alphabet(&config.cipher)?;
    let ngrams = match &args.ngrams {
        Some(path) if args.crib.is_none() => Some(load_ngrams(path, &alphabet)?),
        Some(_) => {
            warn!("Ignoring --ngrams: the crib decides the score");
            None
        }
        None => None,
    };

    let stop = StopSignal::new();
    match args.time {
        Some(secs) => stop.stop_after(Duration::from_secs(secs)),
        None if config.search.cycles == 0 => {
            warn!("No --cycles or --time given: searching until interrupted")
        }
        None => {}
    }

    // Reports are handed to a printer thread so the search never waits on the terminal.
    let (tx, rx) = mpsc::channel::<SearchEvent>();
    let grid_alphabet = alphabet.clone();
    let printer = thread::spawn(move || {
        for event in rx {
            match event {
                SearchEvent::Improvement(r) => {
                    info!(
                        "⭐ {} | {:.1?} | {} keys | {}",
                        r.score, r.elapsed, r.evaluations, r.plaintext
                    );
                    match Key::parse(&grid_alphabet, &r.key) {
                        Ok(key) => info!("Key:\n{}", key.render(&grid_alphabet)),
                        Err(e) => warn!("Cannot lay out key {}: {}", r.key, e),
                    }
                }
                SearchEvent::Progress(p) => match p.fraction() {
                    Some(f) => debug!(
                        "⏳ {:.0}% ({:.0} keys/s)",
                        f * 100.0,
                        p.keys_per_second()
                    ),
                    None => debug!(
                        "⏳ {} cycles ({:.0} keys/s)",
                        p.cycles_completed,
                        p.keys_per_second()
                    ),
                },
            }
        }
    });

    let input = AnalysisInput {
        ciphertext,
        crib: args.crib.clone(),
        ngrams,
    };
    let outcome = api::analyze(&config, input, &stop, &tx);
    drop(tx);
    if printer.join().is_err() {
        warn!("Progress printer thread panicked; some reports were not shown");
    }
    let outcome = outcome?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    match &outcome.best {
        Some(best) => {
            reports::print_key_grid(&alphabet, &best.key);
            println!("Score: {}", best.score);
            println!("Plaintext: {}", best.plaintext);
        }
        None => println!("No candidate was evaluated."),
    }
    reports::print_best_list(&outcome.best_list);
    reports::print_summary(&outcome);
    Ok(())
}
