use crate::reports;
use clap::Args;
use playforge::alphabet::Alphabet;
use playforge::api;
use playforge::cipher::{prepare_plaintext, Decryptor, FillerRule};
use playforge::config::CipherParams;
use playforge::error::PfResult;
use playforge::key::Key;

#[derive(Args, Debug, Clone)]
pub struct CipherArgs {
    #[command(flatten)]
    pub cipher: CipherParams,

    /// Keyword, or the full square when --grid is set
    #[arg(short, long)]
    pub key: String,

    /// Treat --key as all dim*dim symbols in row-major order
    #[arg(long, default_value_t = false)]
    pub grid: bool,

    /// Remove separators and padding after decrypting
    #[arg(long, default_value_t = false)]
    pub strip_fillers: bool,

    /// Print the key square before the result
    #[arg(long, default_value_t = false)]
    pub show_key: bool,

    pub text: String,
}

fn resolve(args: &CipherArgs) -> PfResult<(Alphabet, Key, FillerRule)> {
    let alphabet = api::build_alphabet(&args.cipher)?;
    let key = if args.grid {
        Key::parse(&alphabet, &args.key)?
    } else {
        Key::from_keyword(&alphabet, &args.key)?
    };
    let fillers = FillerRule::from_chars(
        &alphabet,
        args.cipher.separator,
        args.cipher.separator_replacement,
    )?;
    if args.show_key {
        reports::print_key_grid(&alphabet, &key.to_compact(&alphabet));
    }
    Ok((alphabet, key, fillers))
}

pub fn run_encrypt(args: CipherArgs) -> PfResult<()> {
    let (alphabet, key, fillers) = resolve(&args)?;
    let prepared = prepare_plaintext(&alphabet, &args.text, fillers);
    let ciphertext = Decryptor::new(alphabet.dim(), None).encrypt(&key, &prepared)?;
    println!("{}", alphabet.render(&ciphertext));
    Ok(())
}

pub fn run_decrypt(args: CipherArgs) -> PfResult<()> {
    let (alphabet, key, fillers) = resolve(&args)?;
    let ciphertext = alphabet.sanitize(&args.text);
    let decryptor = Decryptor::new(alphabet.dim(), args.strip_fillers.then_some(fillers));
    let plaintext = decryptor.decrypt_to_vec(&key, &ciphertext);
    println!("{}", alphabet.render(&plaintext));
    Ok(())
}
