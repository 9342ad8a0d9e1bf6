use crate::alphabet::Alphabet;
use crate::error::{PfError, PfResult};
use fastrand::Rng;
use itertools::Itertools;

/// Every permutation of `0..dim`, in lexicographic order (index 0 is the identity).
/// Built once per run and shared read-only by all tasks.
#[derive(Debug, Clone)]
pub struct PermutationTable {
    dim: usize,
    flat: Vec<u8>,
}

impl PermutationTable {
    pub fn new(dim: usize) -> Self {
        let mut flat = Vec::new();
        for perm in (0..dim as u8).permutations(dim) {
            flat.extend_from_slice(&perm);
        }
        Self { dim, flat }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of permutations, `dim!`.
    pub fn len(&self) -> usize {
        self.flat.len() / self.dim.max(1)
    }

    pub fn is_empty(&self) -> bool {
        self.flat.is_empty()
    }

    #[inline(always)]
    pub fn get(&self, index: usize) -> &[u8] {
        &self.flat[index * self.dim..(index + 1) * self.dim]
    }
}

/// A Playfair key square: `cells[pos]` is the symbol at grid position `pos` (row-major),
/// `positions[symbol]` is its inverse.
///
/// Every operation is a rearrangement of an existing bijection, so a key built through
/// this API can never hold a duplicate or miss a symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key {
    dim: usize,
    cells: Vec<u8>,
    positions: Vec<u8>,
}

impl Key {
    /// Creates a key holding the canonical arrangement.
    pub fn new(dim: usize) -> Self {
        let n = dim * dim;
        let mut key = Self {
            dim,
            cells: vec![0; n],
            positions: vec![0; n],
        };
        key.simple();
        key
    }

    /// Builds the keyword square: keyword symbols in order of first appearance,
    /// followed by the remaining alphabet.
    pub fn from_keyword(alphabet: &Alphabet, keyword: &str) -> PfResult<Self> {
        let n = alphabet.len();
        let mut seen = vec![false; n];
        let mut cells = Vec::with_capacity(n);

        for c in keyword.chars().filter(|c| !c.is_whitespace()) {
            let idx = alphabet.index_of(c).ok_or_else(|| {
                PfError::Validation(format!("Keyword character '{}' is not in the alphabet", c))
            })?;
            if !seen[idx as usize] {
                seen[idx as usize] = true;
                cells.push(idx);
            }
        }
        for idx in 0..n as u8 {
            if !seen[idx as usize] {
                cells.push(idx);
            }
        }
        Self::from_cells(alphabet.dim(), cells)
    }

    /// Builds a key from an explicit grid, validating the bijection.
    pub fn from_cells(dim: usize, cells: Vec<u8>) -> PfResult<Self> {
        let n = dim * dim;
        if cells.len() != n {
            return Err(PfError::Validation(format!(
                "Key has {} cells, expected {}",
                cells.len(),
                n
            )));
        }
        let mut positions = vec![u8::MAX; n];
        for (pos, &sym) in cells.iter().enumerate() {
            if sym as usize >= n || positions[sym as usize] != u8::MAX {
                return Err(PfError::Validation(format!(
                    "Key is not a permutation (symbol {} at position {})",
                    sym, pos
                )));
            }
            positions[sym as usize] = pos as u8;
        }
        Ok(Self {
            dim,
            cells,
            positions,
        })
    }

    /// Parses a key written as symbols in row-major order (whitespace ignored).
    pub fn parse(alphabet: &Alphabet, text: &str) -> PfResult<Self> {
        let cells = alphabet.strict(text)?;
        Self::from_cells(alphabet.dim(), cells)
    }

    /// Symbols in natural order.
    pub fn simple(&mut self) {
        for (i, c) in self.cells.iter_mut().enumerate() {
            *c = i as u8;
        }
        self.rebuild_positions();
    }

    /// Uniformly random permutation.
    pub fn random(&mut self, rng: &mut Rng) {
        self.simple();
        rng.shuffle(&mut self.cells);
        self.rebuild_positions();
    }

    #[inline(always)]
    pub fn copy_into(&self, dst: &mut Key) {
        debug_assert_eq!(self.dim, dst.dim);
        dst.cells.copy_from_slice(&self.cells);
        dst.positions.copy_from_slice(&self.positions);
    }

    #[inline(always)]
    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    #[inline(always)]
    pub fn symbol_at(&self, pos: usize) -> u8 {
        self.cells[pos]
    }

    #[inline(always)]
    pub fn position_of(&self, symbol: u8) -> usize {
        self.positions[symbol as usize] as usize
    }

    #[inline(always)]
    pub fn row_of(&self, pos: usize) -> usize {
        pos / self.dim
    }

    #[inline(always)]
    pub fn col_of(&self, pos: usize) -> usize {
        pos % self.dim
    }

    pub fn is_valid(&self) -> bool {
        let n = self.dim * self.dim;
        let mut seen = vec![false; n];
        for (pos, &sym) in self.cells.iter().enumerate() {
            if sym as usize >= n || seen[sym as usize] || self.positions[sym as usize] as usize != pos
            {
                return false;
            }
            seen[sym as usize] = true;
        }
        self.cells.len() == n
    }

    #[inline(always)]
    pub fn swap(&mut self, p1: usize, p2: usize) {
        self.cells.swap(p1, p2);
        self.positions[self.cells[p1] as usize] = p1 as u8;
        self.positions[self.cells[p2] as usize] = p2 as u8;
    }

    /// Cyclic exchange: the symbol at `p1` moves to `p2`, `p2` to `p3`, `p3` to `p1`.
    #[inline(always)]
    pub fn swap3(&mut self, p1: usize, p2: usize, p3: usize) {
        let s1 = self.cells[p1];
        self.cells[p1] = self.cells[p3];
        self.cells[p3] = self.cells[p2];
        self.cells[p2] = s1;
        for p in [p1, p2, p3] {
            self.positions[self.cells[p] as usize] = p as u8;
        }
    }

    pub fn swap_rows(&self, dst: &mut Key, r1: usize, r2: usize) {
        self.rearrange(dst, |r, c| {
            let src = if r == r1 {
                r2
            } else if r == r2 {
                r1
            } else {
                r
            };
            (src, c)
        });
    }

    pub fn swap_cols(&self, dst: &mut Key, c1: usize, c2: usize) {
        self.rearrange(dst, |r, c| {
            let src = if c == c1 {
                c2
            } else if c == c2 {
                c1
            } else {
                c
            };
            (r, src)
        });
    }

    /// Row `r` of `dst` is row `perm[r]` of `self`.
    pub fn permute_rows(&self, dst: &mut Key, perm: &[u8]) {
        self.rearrange(dst, |r, c| (perm[r] as usize, c));
    }

    /// Column `c` of `dst` is column `perm[c]` of `self`.
    pub fn permute_cols(&self, dst: &mut Key, perm: &[u8]) {
        self.rearrange(dst, |r, c| (r, perm[c] as usize));
    }

    /// Reorders the symbols within one row.
    pub fn permute_row_cols(&self, dst: &mut Key, row: usize, perm: &[u8]) {
        self.rearrange(dst, |r, c| {
            if r == row {
                (r, perm[c] as usize)
            } else {
                (r, c)
            }
        });
    }

    /// Reorders the symbols within one column.
    pub fn permute_col_rows(&self, dst: &mut Key, col: usize, perm: &[u8]) {
        self.rearrange(dst, |r, c| {
            if c == col {
                (perm[r] as usize, c)
            } else {
                (r, c)
            }
        });
    }

    /// Human-readable grid dump, one row per line.
    pub fn render(&self, alphabet: &Alphabet) -> String {
        let mut out = String::with_capacity(self.cells.len() * 2 + self.dim);
        for (r, row) in self.cells.chunks(self.dim).enumerate() {
            if r > 0 {
                out.push('\n');
            }
            for (c, &sym) in row.iter().enumerate() {
                if c > 0 {
                    out.push(' ');
                }
                out.push(alphabet.symbol(sym));
            }
        }
        out
    }

    /// Row-major symbols without separators.
    pub fn to_compact(&self, alphabet: &Alphabet) -> String {
        self.cells.iter().map(|&sym| alphabet.symbol(sym)).collect()
    }

    /// `map(r, c)` gives the source cell for destination `(r, c)`; it must be a bijection.
    #[inline(always)]
    fn rearrange<F: Fn(usize, usize) -> (usize, usize)>(&self, dst: &mut Key, map: F) {
        let dim = self.dim;
        for r in 0..dim {
            for c in 0..dim {
                let (sr, sc) = map(r, c);
                dst.cells[r * dim + c] = self.cells[sr * dim + sc];
            }
        }
        dst.rebuild_positions();
    }

    #[inline(always)]
    fn rebuild_positions(&mut self) {
        for (pos, &sym) in self.cells.iter().enumerate() {
            self.positions[sym as usize] = pos as u8;
        }
    }
}
