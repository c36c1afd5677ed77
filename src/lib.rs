//! c4-rust: board state engine for a Connect-Four-style game.
//!
//! Two players take turns dropping markers into the columns of a `cols x rows`
//! grid (8x7 by default). Four of one player's markers in a row, column or
//! diagonal wins.
//!
//! ## Modules
//!
//! - [`constants`] - Default grid size and engine limits
//! - [`segments`] - Precomputed four-in-a-row lines and the per-cell reverse index
//! - [`board`] - Immutable positions, move application and end detection
//! - [`hashing`] - Canonical hash keys folding left-right mirror images
//! - [`playout`] - Random playouts and self-play statistics
//! - [`session`] - Text protocol for driving a game
//!
//! ## Example
//!
//! ```
//! use c4_rust::board::{Board, Outcome, Player};
//!
//! let board = Board::new(8, 7).unwrap();
//! let next = board.play(3).unwrap();
//! assert_eq!(next.side_to_move(), Player::Player2);
//! assert_eq!(next.outcome(), Outcome::InProgress);
//!
//! // Mirror images share a key
//! let mirror = board.play(4).unwrap();
//! assert_eq!(next.hashkey().key, mirror.hashkey().key);
//! ```

pub mod board;
pub mod constants;
pub mod hashing;
pub mod playout;
pub mod segments;
pub mod session;
