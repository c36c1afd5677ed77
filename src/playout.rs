//! Random playouts.
//!
//! A playout plays uniformly random legal moves until the game ends. Used by
//! the session's `genmove`, by the `selfplay` command, and by the property
//! tests to reach many different positions.

use std::fmt;

use fastrand::Rng;
use log::debug;

use crate::board::{Board, MoveError, Outcome, Player};

/// A uniformly random legal column, or `None` if the game is over or every
/// column is full.
pub fn random_move(board: &Board, rng: &mut Rng) -> Option<usize> {
    if board.is_over() {
        return None;
    }
    let moves = board.legal_moves();
    if moves.is_empty() {
        return None;
    }
    Some(moves[rng.usize(..moves.len())])
}

/// Play random moves from `board` until the game ends.
pub fn playout(board: &Board, rng: &mut Rng) -> Result<Board, MoveError> {
    let mut board = board.clone();
    while let Some(col) = random_move(&board, rng) {
        board = board.play(col as isize)?;
    }
    Ok(board)
}

/// Aggregate results of a batch of random games.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelfPlayStats {
    pub games: usize,
    pub player1_wins: usize,
    pub player2_wins: usize,
    pub draws: usize,
    /// Sum of moves played over all games
    pub total_plies: usize,
}

impl SelfPlayStats {
    fn record(&mut self, outcome: Outcome, plies: usize) {
        self.games += 1;
        self.total_plies += plies;
        match outcome {
            Outcome::WonBy(Player::Player1) => self.player1_wins += 1,
            Outcome::WonBy(Player::Player2) => self.player2_wins += 1,
            Outcome::Draw => self.draws += 1,
            Outcome::InProgress => {}
        }
    }

    /// Average game length in moves.
    pub fn mean_length(&self) -> f64 {
        if self.games == 0 {
            return 0.0;
        }
        self.total_plies as f64 / self.games as f64
    }
}

impl fmt::Display for SelfPlayStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "games: {}  X wins: {}  O wins: {}  draws: {}  mean length: {:.1}",
            self.games,
            self.player1_wins,
            self.player2_wins,
            self.draws,
            self.mean_length()
        )
    }
}

/// Play `games` random games from `start` with a seeded generator.
pub fn selfplay(start: &Board, games: usize, seed: u64) -> Result<SelfPlayStats, MoveError> {
    let mut rng = Rng::with_seed(seed);
    let mut stats = SelfPlayStats::default();
    let markers = |b: &Board| b.position().count(Player::Player1) + b.position().count(Player::Player2);
    let start_markers = markers(start);

    for game in 0..games {
        let end = playout(start, &mut rng)?;
        let plies = markers(&end) - start_markers;
        debug!("game {game}: {:?} after {plies} moves", end.outcome());
        stats.record(end.outcome(), plies);
    }
    Ok(stats)
}
