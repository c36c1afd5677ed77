//! Constants for board geometry and engine limits.
//!
//! The grid dimensions are chosen at runtime (see [`crate::board::Board::new`]),
//! these are the defaults used by the CLI and the limits every grid must obey.

// =============================================================================
// Board Geometry
// =============================================================================

/// Default number of columns.
pub const DEFAULT_COLS: usize = 8;

/// Default number of rows.
pub const DEFAULT_ROWS: usize = 7;

/// Number of contiguous markers needed to win.
pub const SEGMENT_LEN: usize = 4;

// =============================================================================
// Playout Parameters
// =============================================================================

/// Default number of games played by `selfplay`.
pub const N_SELFPLAY_GAMES: usize = 1000;

/// Default seed for reproducible self-play runs.
pub const DEFAULT_SEED: u64 = 1;

// =============================================================================
// Marker Characters
// =============================================================================

/// Player1 marker in rendered boards and text positions.
pub const MARK_PLAYER1: char = 'X';

/// Player2 marker in rendered boards and text positions.
pub const MARK_PLAYER2: char = 'O';

/// Empty cell in the compact text form.
pub const MARK_EMPTY: char = '.';
