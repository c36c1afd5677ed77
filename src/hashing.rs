//! Canonical hash keys for transposition tables.
//!
//! A position is encoded as a base-3 number, one digit per cell in
//! column-major order (column 0 first, each column bottom to top), with
//! `Empty = 0`, `Player1 = 1`, `Player2 = 2`. The same encoding is computed for
//! the left-right mirror of the grid and the smaller of the two is the key, so
//! a position and its mirror image share one key.
//!
//! Only the left-right reflection is used: gravity breaks every other
//! symmetry of the grid.
//!
//! Keys are unbounded integers: an 8x7 grid already needs 3^56.

use num_bigint::BigUint;

use crate::board::{Board, Cell, Position};

/// Canonical identity of a position.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct HashKey {
    /// Smaller of the direct and mirrored encodings.
    pub key: BigUint,
    /// True if `key` is the encoding of the mirrored grid.
    pub mirrored: bool,
}

impl HashKey {
    /// Translate a column between the caller's orientation and the canonical
    /// one. The mapping is its own inverse.
    pub fn unflip_column(&self, col: usize, cols: usize) -> usize {
        if self.mirrored { cols - 1 - col } else { col }
    }
}

#[inline]
fn digit(cell: Cell) -> u32 {
    match cell {
        Cell::Empty => 0,
        Cell::Player1 => 1,
        Cell::Player2 => 2,
    }
}

fn encode<'a>(columns: impl Iterator<Item = &'a [Cell]>) -> BigUint {
    columns
        .flatten()
        .fold(BigUint::ZERO, |key, &cell| key * 3u32 + digit(cell))
}

impl Position {
    /// Base-3 key of the position and of its mirror, whichever is smaller.
    /// Ties (symmetric positions) report `mirrored = false`.
    pub fn hashkey(&self) -> HashKey {
        let direct = encode((0..self.cols()).map(|c| self.column(c)));
        let mirror = encode((0..self.cols()).rev().map(|c| self.column(c)));
        if mirror < direct {
            HashKey {
                key: mirror,
                mirrored: true,
            }
        } else {
            HashKey {
                key: direct,
                mirrored: false,
            }
        }
    }

    /// The left-right reflection of this grid.
    pub fn mirrored(&self) -> Position {
        let mut out = self.clone();
        let cols = self.cols();
        for col in 0..cols {
            for (row, &cell) in self.column(col).iter().enumerate() {
                out.set(cols - 1 - col, row, cell);
            }
        }
        out
    }
}

impl Board {
    /// Canonical key of this board's position.
    pub fn hashkey(&self) -> HashKey {
        self.position().hashkey()
    }

    /// The board reflected left to right. Outcome and side to move carry over
    /// since the set of segments is itself symmetric.
    pub fn mirrored(&self) -> Board {
        self.with_position(self.position().mirrored())
    }
}
