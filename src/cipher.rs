use crate::alphabet::Alphabet;
use crate::error::{PfError, PfResult};
use crate::key::Key;

/// Symbols the encryptor inserts between doubled letters and as odd-length padding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillerRule {
    pub separator: u8,
    /// Used instead of `separator` when the doubled letter is the separator itself.
    pub replacement: u8,
}

impl FillerRule {
    pub fn from_chars(alphabet: &Alphabet, separator: char, replacement: char) -> PfResult<Self> {
        let lookup = |c: char| {
            alphabet.index_of(c).ok_or_else(|| {
                PfError::Config(format!("Filler symbol '{}' is not in the alphabet", c))
            })
        };
        let rule = Self {
            separator: lookup(separator)?,
            replacement: lookup(replacement)?,
        };
        if rule.separator == rule.replacement {
            return Err(PfError::Config(
                "Separator and its replacement must differ".to_string(),
            ));
        }
        Ok(rule)
    }
}

/// Playfair digraph substitution over a square of side `dim`.
///
/// Neighbour positions are tabulated once so the per-digraph work is a handful of
/// table reads. Decryption writes into a caller-owned buffer and never allocates.
#[derive(Debug, Clone)]
pub struct Decryptor {
    dim: usize,
    row: Vec<u8>,
    col: Vec<u8>,
    left: Vec<u8>,
    up: Vec<u8>,
    right: Vec<u8>,
    down: Vec<u8>,
    fillers: Option<FillerRule>,
}

impl Decryptor {
    /// `fillers` enables removal of encryption artifacts from decrypted text.
    pub fn new(dim: usize, fillers: Option<FillerRule>) -> Self {
        let n = dim * dim;
        let mut d = Self {
            dim,
            row: Vec::with_capacity(n),
            col: Vec::with_capacity(n),
            left: Vec::with_capacity(n),
            up: Vec::with_capacity(n),
            right: Vec::with_capacity(n),
            down: Vec::with_capacity(n),
            fillers,
        };
        for pos in 0..n {
            let (r, c) = (pos / dim, pos % dim);
            d.row.push(r as u8);
            d.col.push(c as u8);
            d.left.push((r * dim + (c + dim - 1) % dim) as u8);
            d.up.push((((r + dim - 1) % dim) * dim + c) as u8);
            d.right.push((r * dim + (c + 1) % dim) as u8);
            d.down.push((((r + 1) % dim) * dim + c) as u8);
        }
        d
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn fillers(&self) -> Option<FillerRule> {
        self.fillers
    }

    /// Decrypts `ciphertext` (even length) into `out`, returning the number of
    /// plaintext symbols produced. `out` must hold at least `ciphertext.len()` symbols.
    #[inline]
    pub fn decrypt(&self, key: &Key, ciphertext: &[u8], out: &mut [u8]) -> usize {
        let len = ciphertext.len() & !1;
        let dim = self.dim;

        for i in (0..len).step_by(2) {
            let pa = key.position_of(ciphertext[i]);
            let pb = key.position_of(ciphertext[i + 1]);
            let (ra, ca) = (self.row[pa] as usize, self.col[pa] as usize);
            let (rb, cb) = (self.row[pb] as usize, self.col[pb] as usize);

            let (qa, qb) = if ra == rb {
                (self.left[pa] as usize, self.left[pb] as usize)
            } else if ca == cb {
                (self.up[pa] as usize, self.up[pb] as usize)
            } else {
                (ra * dim + cb, rb * dim + ca)
            };

            out[i] = key.symbol_at(qa);
            out[i + 1] = key.symbol_at(qb);
        }

        match self.fillers {
            Some(rule) => strip_fillers(rule, &mut out[..len]),
            None => len,
        }
    }

    pub fn decrypt_to_vec(&self, key: &Key, ciphertext: &[u8]) -> Vec<u8> {
        let mut out = vec![0; ciphertext.len()];
        let len = self.decrypt(key, ciphertext, &mut out);
        out.truncate(len);
        out
    }

    /// Encrypts prepared plaintext (see [`prepare_plaintext`]).
    pub fn encrypt(&self, key: &Key, plaintext: &[u8]) -> PfResult<Vec<u8>> {
        if plaintext.len() % 2 != 0 {
            return Err(PfError::Validation(format!(
                "Plaintext length must be even - found {} symbols",
                plaintext.len()
            )));
        }
        let dim = self.dim;
        let mut out = Vec::with_capacity(plaintext.len());

        for pair in plaintext.chunks_exact(2) {
            if pair[0] == pair[1] {
                return Err(PfError::Validation(
                    "Plaintext contains a doubled digraph; prepare it first".to_string(),
                ));
            }
            let pa = key.position_of(pair[0]);
            let pb = key.position_of(pair[1]);
            let (ra, ca) = (self.row[pa] as usize, self.col[pa] as usize);
            let (rb, cb) = (self.row[pb] as usize, self.col[pb] as usize);

            let (qa, qb) = if ra == rb {
                (self.right[pa] as usize, self.right[pb] as usize)
            } else if ca == cb {
                (self.down[pa] as usize, self.down[pb] as usize)
            } else {
                (ra * dim + cb, rb * dim + ca)
            };
            out.push(key.symbol_at(qa));
            out.push(key.symbol_at(qb));
        }
        Ok(out)
    }
}

/// Compacts `text` in place, dropping separators that sit between a doubled letter
/// and trailing padding. Returns the new length.
#[inline]
fn strip_fillers(rule: FillerRule, text: &mut [u8]) -> usize {
    let len = text.len();
    let mut write = 0;
    let mut prev = u8::MAX;

    for read in 0..len {
        let cur = text[read];
        // Fillers only ever occupy the second slot of a digraph.
        let strip = if read % 2 == 1 {
            if read + 1 < len {
                let next = text[read + 1];
                (cur == rule.separator && prev == next)
                    || (cur == rule.replacement && prev == rule.separator && next == rule.separator)
            } else {
                cur == rule.separator || (cur == rule.replacement && prev == rule.separator)
            }
        } else {
            false
        };
        prev = cur;
        if !strip {
            text[write] = cur;
            write += 1;
        }
    }
    write
}

/// Normalizes free text for encryption: drops foreign characters, splits doubled
/// letters inside a digraph with the separator, and pads to even length.
pub fn prepare_plaintext(alphabet: &Alphabet, text: &str, rule: FillerRule) -> Vec<u8> {
    let mut symbols = alphabet.sanitize(text);

    let mut i = 0;
    while i + 1 < symbols.len() {
        if symbols[i] == symbols[i + 1] {
            let filler = if symbols[i] == rule.separator {
                rule.replacement
            } else {
                rule.separator
            };
            symbols.insert(i + 1, filler);
        }
        i += 2;
    }

    if symbols.len() % 2 != 0 {
        let last = symbols[symbols.len() - 1];
        symbols.push(if last == rule.separator {
            rule.replacement
        } else {
            rule.separator
        });
    }
    symbols
}
