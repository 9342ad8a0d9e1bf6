use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use std::process;

mod cmd;
mod reports;

#[derive(Parser, Debug)]
#[command(author, version, about = "Playfair key search", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Search for the key of a Playfair ciphertext
    Solve(cmd::solve::SolveArgs),
    /// Encrypt text with a known key
    Encrypt(cmd::cipher::CipherArgs),
    /// Decrypt text with a known key
    Decrypt(cmd::cipher::CipherArgs),
}

fn main() {
    // Logs go to stderr; stdout carries results only.
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    // Raw matches tell user input apart from defaults when merging a config file.
    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    let result = match cli.command {
        Commands::Solve(args) => match matches.subcommand_matches("solve") {
            Some(sub) => cmd::solve::run(args, sub),
            None => unreachable!("clap dispatched solve without its matches"),
        },
        Commands::Encrypt(args) => cmd::cipher::run_encrypt(args),
        Commands::Decrypt(args) => cmd::cipher::run_decrypt(args),
    };

    if let Err(e) = result {
        eprintln!("\n❌ {}", e);
        process::exit(1);
    }
}
