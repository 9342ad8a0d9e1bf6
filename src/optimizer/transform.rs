use crate::error::{PfError, PfResult};
use crate::key::{Key, PermutationTable};
use fastrand::Rng;
use std::ops::Range;
use std::sync::Arc;
use strum::EnumCount;
use strum_macros::{Display, EnumIter, EnumString};

/// Mutation categories, in serial order.
#[derive(
    Debug,
    Clone,
    Copy,
    EnumIter,
    EnumString,
    strum_macros::EnumCount,
    Display,
    PartialEq,
    Eq,
    Hash,
)]
#[strum(serialize_all = "snake_case")]
pub enum MoveKind {
    Swap2,
    SwapRows,
    SwapCols,
    PermuteRows,
    PermuteCols,
    Swap3,
    PermuteColRows,
    PermuteRowCols,
}

const SERIAL_ORDER: [MoveKind; MoveKind::COUNT] = [
    MoveKind::Swap2,
    MoveKind::SwapRows,
    MoveKind::SwapCols,
    MoveKind::PermuteRows,
    MoveKind::PermuteCols,
    MoveKind::Swap3,
    MoveKind::PermuteColRows,
    MoveKind::PermuteRowCols,
];

impl MoveKind {
    /// Number of serials the category occupies for a `dim` square.
    pub fn width(self, dim: usize, perm_count: usize) -> usize {
        let n = dim * dim;
        match self {
            Self::Swap2 => n * n,
            Self::SwapRows | Self::SwapCols => dim * dim,
            Self::PermuteRows | Self::PermuteCols => perm_count,
            Self::Swap3 => n * n * n,
            Self::PermuteColRows | Self::PermuteRowCols => perm_count * dim,
        }
    }
}

/// A decoded serial: which mutation, with its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    Identity,
    Swap2 { p1: usize, p2: usize },
    SwapRows { r1: usize, r2: usize },
    SwapCols { c1: usize, c2: usize },
    PermuteRows { perm: usize },
    PermuteCols { perm: usize },
    Swap3 { p1: usize, p2: usize, p3: usize },
    PermuteColRows { col: usize, perm: usize },
    PermuteRowCols { row: usize, perm: usize },
}

/// Addressable space of elementary key mutations.
///
/// Each enabled [`MoveKind`] owns a contiguous slice of `[0, total)`. A shuffled
/// remapping table sits between the caller's counter and the serial, so an
/// incrementing counter walks every mutation once per pass in random order.
#[derive(Debug, Clone)]
pub struct Transform {
    dim: usize,
    n: usize,
    starts: [usize; MoveKind::COUNT + 1],
    remap: Vec<u32>,
    perms: Arc<PermutationTable>,
}

impl Transform {
    pub fn new(dim: usize, enabled: &[MoveKind], perms: Arc<PermutationTable>) -> PfResult<Self> {
        if perms.dim() != dim {
            return Err(PfError::Config(format!(
                "Permutation table is for dimension {}, grid is {}",
                perms.dim(),
                dim
            )));
        }

        let mut starts = [0usize; MoveKind::COUNT + 1];
        for (i, kind) in SERIAL_ORDER.iter().copied().enumerate() {
            let width = if enabled.contains(&kind) {
                kind.width(dim, perms.len())
            } else {
                0
            };
            starts[i + 1] = starts[i] + width;
        }

        let total = starts[MoveKind::COUNT];
        if total == 0 {
            return Err(PfError::Config(
                "At least one mutation category must be enabled".to_string(),
            ));
        }
        if total > u32::MAX as usize {
            return Err(PfError::Config(format!(
                "Mutation space of {} serials is too large",
                total
            )));
        }

        Ok(Self {
            dim,
            n: dim * dim,
            starts,
            remap: (0..total as u32).collect(),
            perms,
        })
    }

    #[inline(always)]
    pub fn total(&self) -> usize {
        self.starts[MoveKind::COUNT]
    }

    pub fn range(&self, kind: MoveKind) -> Range<usize> {
        let i = kind as usize;
        self.starts[i]..self.starts[i + 1]
    }

    pub fn remap_table(&self) -> &[u32] {
        &self.remap
    }

    pub fn permutations(&self) -> &PermutationTable {
        &self.perms
    }

    /// Fisher-Yates shuffle of the remapping table.
    pub fn randomize(&mut self, rng: &mut Rng) {
        rng.shuffle(&mut self.remap);
    }

    /// Decodes a raw serial in `[0, total)`.
    pub fn decode(&self, serial: usize) -> Move {
        let kind_idx = match self.starts[1..].iter().position(|&end| serial < end) {
            Some(i) => i,
            None => return Move::Identity,
        };
        let local = serial - self.starts[kind_idx];
        let (dim, n) = (self.dim, self.n);
        let perm_count = self.perms.len();

        match SERIAL_ORDER[kind_idx] {
            MoveKind::Swap2 => {
                let (p1, p2) = (local / n, local % n);
                if p1 == p2 {
                    Move::Identity
                } else {
                    Move::Swap2 { p1, p2 }
                }
            }
            MoveKind::SwapRows => {
                let (r1, r2) = (local / dim, local % dim);
                if r1 == r2 {
                    Move::Identity
                } else {
                    Move::SwapRows { r1, r2 }
                }
            }
            MoveKind::SwapCols => {
                let (c1, c2) = (local / dim, local % dim);
                if c1 == c2 {
                    Move::Identity
                } else {
                    Move::SwapCols { c1, c2 }
                }
            }
            MoveKind::PermuteRows => Move::PermuteRows { perm: local },
            MoveKind::PermuteCols => Move::PermuteCols { perm: local },
            MoveKind::Swap3 => {
                let p1 = local / (n * n);
                let p2 = (local / n) % n;
                if p1 == p2 {
                    return Move::Identity;
                }
                let p3 = local % n;
                if p3 == p1 || p3 == p2 {
                    return Move::Identity;
                }
                Move::Swap3 { p1, p2, p3 }
            }
            MoveKind::PermuteColRows => Move::PermuteColRows {
                col: local / perm_count,
                perm: local % perm_count,
            },
            MoveKind::PermuteRowCols => Move::PermuteRowCols {
                row: local / perm_count,
                perm: local % perm_count,
            },
        }
    }

    /// Derives `child` from `parent` using the mutation addressed by `counter`.
    #[inline]
    pub fn apply(&self, parent: &Key, child: &mut Key, counter: u64) -> Move {
        let slot = (counter % self.total() as u64) as usize;
        let mv = self.decode(self.remap[slot] as usize);
        self.apply_move(parent, child, mv);
        mv
    }

    pub fn apply_move(&self, parent: &Key, child: &mut Key, mv: Move) {
        match mv {
            Move::Identity => parent.copy_into(child),
            Move::Swap2 { p1, p2 } => {
                parent.copy_into(child);
                child.swap(p1, p2);
            }
            Move::Swap3 { p1, p2, p3 } => {
                parent.copy_into(child);
                child.swap3(p1, p2, p3);
            }
            Move::SwapRows { r1, r2 } => parent.swap_rows(child, r1, r2),
            Move::SwapCols { c1, c2 } => parent.swap_cols(child, c1, c2),
            Move::PermuteRows { perm } => parent.permute_rows(child, self.perms.get(perm)),
            Move::PermuteCols { perm } => parent.permute_cols(child, self.perms.get(perm)),
            Move::PermuteColRows { col, perm } => {
                parent.permute_col_rows(child, col, self.perms.get(perm))
            }
            Move::PermuteRowCols { row, perm } => {
                parent.permute_row_cols(child, row, self.perms.get(perm))
            }
        }
    }
}
