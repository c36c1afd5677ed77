//! Board state and move execution.
//!
//! This module provides the core game logic:
//! - Cell, player and outcome types
//! - An immutable [`Position`] grid stored column-major
//! - [`Board`], a position plus side to move and its derived outcome
//! - Gravity drops with incremental end-of-game detection
//!
//! Boards are values: [`Board::play`] never touches the board it is called on,
//! it returns a fresh one. The segment geometry is shared between all boards
//! of one grid size through an `Arc<SegmentIndex>`.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use log::trace;

use crate::constants::{MARK_EMPTY, MARK_PLAYER1, MARK_PLAYER2};
use crate::segments::{Coord, GeometryError, Segment, SegmentIndex, validate_dimensions};

/// One of the two players. Player1 always moves first.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Player {
    Player1,
    Player2,
}

impl Player {
    /// The opponent.
    #[inline]
    pub const fn other(self) -> Player {
        match self {
            Player::Player1 => Player::Player2,
            Player::Player2 => Player::Player1,
        }
    }

    /// Marker used when rendering this player's stones.
    pub const fn mark(self) -> char {
        match self {
            Player::Player1 => MARK_PLAYER1,
            Player::Player2 => MARK_PLAYER2,
        }
    }
}

/// Content of a single grid cell.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Cell {
    #[default]
    Empty,
    Player1,
    Player2,
}

impl Cell {
    /// The player owning this cell, if any.
    #[inline]
    pub const fn player(self) -> Option<Player> {
        match self {
            Cell::Empty => None,
            Cell::Player1 => Some(Player::Player1),
            Cell::Player2 => Some(Player::Player2),
        }
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        matches!(self, Cell::Empty)
    }
}

impl From<Player> for Cell {
    fn from(player: Player) -> Self {
        match player {
            Player::Player1 => Cell::Player1,
            Player::Player2 => Cell::Player2,
        }
    }
}

/// Status of a position.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
    InProgress,
    Draw,
    WonBy(Player),
}

impl Outcome {
    pub const fn is_over(self) -> bool {
        !matches!(self, Outcome::InProgress)
    }

    pub const fn winner(self) -> Option<Player> {
        match self {
            Outcome::WonBy(p) => Some(p),
            _ => None,
        }
    }
}

/// Result of attempting to play a move.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    /// Column index outside `[0, cols)`
    #[error("column {column} is outside the grid (0..{cols})")]
    InvalidColumn { column: isize, cols: usize },

    /// No empty row left in the column
    #[error("column {column} is full")]
    ColumnFull { column: usize },
}

/// Errors from parsing the compact text form of a position.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParsePositionError {
    #[error("position has no rows")]
    Empty,

    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        found: usize,
        expected: usize,
    },

    #[error("invalid cell character {0:?}")]
    InvalidCell(char),

    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

/// A `cols x rows` grid of cells.
///
/// Storage is column-major (`index = col * rows + row`) with row 0 at the
/// bottom of each column.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Position {
    cols: usize,
    rows: usize,
    cells: Vec<Cell>,
}

impl Position {
    /// An empty grid.
    pub fn empty(cols: usize, rows: usize) -> Result<Self, GeometryError> {
        validate_dimensions(cols, rows)?;
        Ok(Self {
            cols,
            rows,
            cells: vec![Cell::Empty; cols * rows],
        })
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// All cells in column-major order.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// The cell at `(col, row)`, or `None` outside the grid.
    pub fn get(&self, col: usize, row: usize) -> Option<Cell> {
        if col >= self.cols || row >= self.rows {
            return None;
        }
        Some(self.cells[Coord::new(col, row).index(self.rows)])
    }

    /// The cells of one column, bottom first.
    pub fn column(&self, col: usize) -> &[Cell] {
        if col >= self.cols {
            return &[];
        }
        &self.cells[col * self.rows..(col + 1) * self.rows]
    }

    /// Lowest empty row of a column, or `None` if the column is full.
    pub fn freerow(&self, col: usize) -> Option<usize> {
        self.column(col).iter().position(|c| c.is_empty())
    }

    /// Number of markers owned by `player`.
    pub fn count(&self, player: Player) -> usize {
        let cell = Cell::from(player);
        self.cells.iter().filter(|&&c| c == cell).count()
    }

    pub fn has_empty(&self) -> bool {
        self.cells.iter().any(|c| c.is_empty())
    }

    /// The player occupying all four cells of `seg`, if any. Cells of `seg`
    /// outside this grid count as empty.
    pub fn segment_owner(&self, seg: &Segment) -> Option<Player> {
        let first = self.get(seg.cells[0].col, seg.cells[0].row)?.player()?;
        self.is_filled_by(seg, first).then_some(first)
    }

    /// True if every cell of `seg` belongs to `player`. False as soon as one
    /// cell falls outside this grid.
    pub fn is_filled_by(&self, seg: &Segment, player: Player) -> bool {
        let cell = Cell::from(player);
        seg.cells.iter().all(|c| self.get(c.col, c.row) == Some(cell))
    }

    pub(crate) fn set(&mut self, col: usize, row: usize, cell: Cell) {
        let idx = Coord::new(col, row).index(self.rows);
        self.cells[idx] = cell;
    }
}

/// Compact text form: rows from the top, separated by `/`, using `X`, `O`
/// and `.`.
impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in (0..self.rows).rev() {
            for col in 0..self.cols {
                let ch = match self.cells[Coord::new(col, row).index(self.rows)].player() {
                    Some(p) => p.mark(),
                    None => MARK_EMPTY,
                };
                write!(f, "{ch}")?;
            }
            if row > 0 {
                write!(f, "/")?;
            }
        }
        Ok(())
    }
}

/// Parses the compact text form. Rows may be separated by `/` or newlines,
/// the top row comes first.
impl FromStr for Position {
    type Err = ParsePositionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lines: Vec<&str> = s
            .split(['/', '\n'])
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();
        let Some(first) = lines.first() else {
            return Err(ParsePositionError::Empty);
        };

        let cols = first.chars().count();
        let rows = lines.len();
        let mut pos = Position::empty(cols, rows)?;

        for (i, line) in lines.iter().enumerate() {
            let found = line.chars().count();
            if found != cols {
                return Err(ParsePositionError::RaggedRow {
                    row: i,
                    found,
                    expected: cols,
                });
            }
            let row = rows - 1 - i;
            for (col, ch) in line.chars().enumerate() {
                let cell = match ch.to_ascii_uppercase() {
                    MARK_PLAYER1 => Cell::Player1,
                    MARK_PLAYER2 => Cell::Player2,
                    MARK_EMPTY => Cell::Empty,
                    other => return Err(ParsePositionError::InvalidCell(other)),
                };
                pos.set(col, row, cell);
            }
        }
        Ok(pos)
    }
}

/// A game position: grid, side to move and outcome.
///
/// Immutable once built. Two boards compare equal when their grids, sides to
/// move and outcomes match.
#[derive(Clone, Debug)]
pub struct Board {
    position: Position,
    side_to_move: Player,
    outcome: Outcome,
    index: Arc<SegmentIndex>,
}

impl PartialEq for Board {
    fn eq(&self, other: &Self) -> bool {
        self.position == other.position
            && self.side_to_move == other.side_to_move
            && self.outcome == other.outcome
    }
}

impl Eq for Board {}

impl Board {
    /// An empty `cols x rows` board with Player1 to move.
    pub fn new(cols: usize, rows: usize) -> Result<Self, GeometryError> {
        Self::from_position(Position::empty(cols, rows)?, Player::Player1)
    }

    /// Wrap an arbitrary position. Always runs a full scan of every segment
    /// to find the outcome; see [`with_outcome`](Self::with_outcome) to skip
    /// it when the outcome is already known.
    ///
    /// Marker counts are not checked against `side_to_move`.
    pub fn from_position(position: Position, side_to_move: Player) -> Result<Self, GeometryError> {
        Self::with_outcome(position, side_to_move, None)
    }

    /// Wrap a position whose outcome the caller may already know.
    ///
    /// With `Some(outcome)` the value is trusted as given and no segment is
    /// examined; with `None` this is [`from_position`](Self::from_position).
    pub fn with_outcome(
        position: Position,
        side_to_move: Player,
        outcome: Option<Outcome>,
    ) -> Result<Self, GeometryError> {
        let index = SegmentIndex::shared(position.cols, position.rows)?;
        let outcome = match outcome {
            Some(known) => known,
            None => Self::scan_outcome(&position, &index),
        };
        Ok(Self {
            position,
            side_to_move,
            outcome,
            index,
        })
    }

    /// Outcome of `position` from scanning every segment of `index`.
    pub fn scan_outcome(position: &Position, index: &SegmentIndex) -> Outcome {
        if let Some(winner) = index.segments().iter().find_map(|s| position.segment_owner(s)) {
            return Outcome::WonBy(winner);
        }
        if position.has_empty() {
            Outcome::InProgress
        } else {
            Outcome::Draw
        }
    }

    /// Outcome after `mover` filled `at`, looking only at the segments
    /// through that cell. A win takes precedence over a full board.
    fn outcome_around(
        position: &Position,
        index: &SegmentIndex,
        at: Coord,
        mover: Player,
    ) -> Outcome {
        if index
            .segments_through(at.col, at.row)
            .any(|s| position.is_filled_by(s, mover))
        {
            return Outcome::WonBy(mover);
        }
        if position.has_empty() {
            Outcome::InProgress
        } else {
            Outcome::Draw
        }
    }

    /// Drop the side to move's marker into `column`, returning the new board.
    ///
    /// # Errors
    /// - [`MoveError::InvalidColumn`] if `column` is outside the grid
    /// - [`MoveError::ColumnFull`] if the column has no empty row
    pub fn play(&self, column: isize) -> Result<Board, MoveError> {
        let col = self.check_column(column)?;
        let row = self
            .position
            .freerow(col)
            .ok_or(MoveError::ColumnFull { column: col })?;

        let mover = self.side_to_move;
        let mut position = self.position.clone();
        position.set(col, row, Cell::from(mover));

        let outcome = Self::outcome_around(&position, &self.index, Coord::new(col, row), mover);
        trace!("{mover:?} drops into column {col}, row {row}: {outcome:?}");

        Ok(Board {
            position,
            side_to_move: mover.other(),
            outcome,
            index: Arc::clone(&self.index),
        })
    }

    /// Play a sequence of moves, stopping at the first illegal one.
    pub fn play_all<I>(&self, columns: I) -> Result<Board, MoveError>
    where
        I: IntoIterator<Item = isize>,
    {
        let mut board = self.clone();
        for col in columns {
            board = board.play(col)?;
        }
        Ok(board)
    }

    /// Row a marker dropped into `column` would land on, or `None` if the
    /// column is full or outside the grid.
    pub fn freerow(&self, column: isize) -> Option<usize> {
        let col = self.check_column(column).ok()?;
        self.position.freerow(col)
    }

    /// Columns that still have room, ascending.
    ///
    /// This only reflects column fullness: a finished game may still report
    /// moves, callers check [`outcome`](Self::outcome) themselves.
    pub fn legal_moves(&self) -> Vec<usize> {
        let top = self.position.rows - 1;
        (0..self.position.cols)
            .filter(|&col| self.position.get(col, top) == Some(Cell::Empty))
            .collect()
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn side_to_move(&self) -> Player {
        self.side_to_move
    }

    pub fn is_over(&self) -> bool {
        self.outcome.is_over()
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn cols(&self) -> usize {
        self.position.cols
    }

    pub fn rows(&self) -> usize {
        self.position.rows
    }

    /// The cell at `(col, row)`, or `None` outside the grid.
    pub fn cell(&self, col: usize, row: usize) -> Option<Cell> {
        self.position.get(col, row)
    }

    /// Same side to move and outcome, different grid of the same size.
    pub(crate) fn with_position(&self, position: Position) -> Board {
        Board {
            position,
            side_to_move: self.side_to_move,
            outcome: self.outcome,
            index: Arc::clone(&self.index),
        }
    }

    /// The segment geometry shared by all boards of this size.
    pub fn segment_index(&self) -> &SegmentIndex {
        &self.index
    }

    fn check_column(&self, column: isize) -> Result<usize, MoveError> {
        let cols = self.position.cols;
        usize::try_from(column)
            .ok()
            .filter(|&c| c < cols)
            .ok_or(MoveError::InvalidColumn { column, cols })
    }
}

/// Grid with row letters on the left (top row is `A`), 1-based column numbers
/// underneath and a status line.
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cols = self.position.cols;
        for (i, row) in (0..self.position.rows).rev().enumerate() {
            let label = (b'A' + (i % 26) as u8) as char;
            let cells: Vec<String> = (0..cols)
                .map(|col| match self.position.get(col, row).and_then(Cell::player) {
                    Some(p) => p.mark().to_string(),
                    None => " ".to_string(),
                })
                .collect();
            writeln!(f, "{label} | {} |", cells.join(" | "))?;
        }

        let rule = vec!["-"; cols].join(" | ");
        let numbers: Vec<String> = (1..=cols).map(|c| c.to_string()).collect();
        writeln!(f, "  | {rule} |")?;
        writeln!(f, "  | {} |", numbers.join(" | "))?;

        match self.outcome {
            Outcome::Draw => write!(f, "<<< Game over: draw"),
            Outcome::WonBy(p) => write!(f, "<<< Game over: {} win", p.mark()),
            Outcome::InProgress => write!(f, "<<< Move to {}", self.side_to_move.mark()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segments::Direction;

    fn board(moves: &[isize]) -> Board {
        Board::new(8, 7).unwrap().play_all(moves.iter().copied()).unwrap()
    }

    #[test]
    fn test_empty_board() {
        let b = Board::new(8, 7).unwrap();
        assert_eq!(b.outcome(), Outcome::InProgress);
        assert_eq!(b.side_to_move(), Player::Player1);
        assert_eq!(b.legal_moves(), (0..8).collect::<Vec<_>>());
        assert!(b.position().cells().iter().all(|c| c.is_empty()));
        assert_eq!(b.freerow(0), Some(0));
    }

    #[test]
    fn test_play_move_basic() {
        let b = board(&[3]);
        assert_eq!(b.cell(3, 0), Some(Cell::Player1));
        assert_eq!(b.side_to_move(), Player::Player2);
        assert_eq!(b.freerow(3), Some(1));

        let b = b.play(3).unwrap();
        assert_eq!(b.cell(3, 1), Some(Cell::Player2));
        assert_eq!(b.side_to_move(), Player::Player1);
    }

    #[test]
    fn test_invalid_column() {
        let b = Board::new(8, 7).unwrap();
        assert_eq!(
            b.play(8).unwrap_err(),
            MoveError::InvalidColumn { column: 8, cols: 8 }
        );
        assert_eq!(
            b.play(-1).unwrap_err(),
            MoveError::InvalidColumn { column: -1, cols: 8 }
        );
        assert_eq!(b.freerow(8), None);
        assert_eq!(b.freerow(-1), None);
    }

    #[test]
    fn test_column_full() {
        let b = board(&[0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(b.outcome(), Outcome::InProgress);
        assert_eq!(b.freerow(0), None);
        assert_eq!(b.play(0).unwrap_err(), MoveError::ColumnFull { column: 0 });
        assert!(!b.legal_moves().contains(&0));
    }

    #[test]
    fn test_horizontal_win() {
        let b = board(&[0, 0, 1, 1, 2, 2, 3]);
        assert_eq!(b.outcome(), Outcome::WonBy(Player::Player1));
    }

    #[test]
    fn test_diagonal_win() {
        // Player2 builds the up-diagonal (1,0) (2,1) (3,2) (4,3)
        let b = board(&[0, 1, 2, 2, 3, 3, 4, 3, 4, 4, 7, 4]);
        assert_eq!(b.outcome(), Outcome::WonBy(Player::Player2));
    }

    #[test]
    fn test_win_takes_precedence_over_draw() {
        // Player2 fills the last cell and completes column 3
        let pos: Position = "OXX./XOXO/OXXO/XXOO".parse().unwrap();
        let b = Board::from_position(pos, Player::Player2).unwrap();
        assert_eq!(b.outcome(), Outcome::InProgress);

        let b = b.play(3).unwrap();
        assert!(!b.position().has_empty());
        assert_eq!(b.outcome(), Outcome::WonBy(Player::Player2));
    }

    #[test]
    fn test_play_does_not_modify_source() {
        let before = board(&[2, 3, 2]);
        let snapshot = before.clone();
        let after = before.play(2).unwrap();
        assert_eq!(before, snapshot);
        assert_eq!(before.legal_moves(), snapshot.legal_moves());
        assert_ne!(before, after);
    }

    #[test]
    fn test_scan_outcome_detects_existing_win() {
        let pos: Position = "......../......../......../O......./OX....../OX....../OX......"
            .parse()
            .unwrap();
        let b = Board::from_position(pos, Player::Player1).unwrap();
        assert_eq!(b.outcome(), Outcome::WonBy(Player::Player2));
    }

    #[test]
    fn test_position_text_roundtrip() {
        let b = board(&[0, 1, 1]);
        let text = b.position().to_string();
        assert_eq!(text.split('/').count(), 7);
        assert!(text.ends_with("/.X....../XO......"), "got {text}");

        let parsed: Position = text.parse().unwrap();
        assert_eq!(&parsed, b.position());
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("".parse::<Position>().unwrap_err(), ParsePositionError::Empty);
        assert_eq!(
            "XX../X..".parse::<Position>().unwrap_err(),
            ParsePositionError::RaggedRow {
                row: 1,
                found: 3,
                expected: 4
            }
        );
        assert_eq!(
            "XZ../....".parse::<Position>().unwrap_err(),
            ParsePositionError::InvalidCell('Z')
        );
        let large = vec!["........."; 9].join("/").parse::<Position>().unwrap();
        assert_eq!((large.cols(), large.rows()), (9, 9));
    }

    #[test]
    fn test_with_outcome_skips_scan() {
        let text = "......../......../......../O......./OX....../OX....../OX......";
        let pos: Position = text.parse().unwrap();

        let scanned = Board::with_outcome(pos.clone(), Player::Player1, None).unwrap();
        assert_eq!(scanned.outcome(), Outcome::WonBy(Player::Player2));
        assert_eq!(scanned, Board::from_position(pos.clone(), Player::Player1).unwrap());

        // A supplied outcome is taken as is
        let known = Board::with_outcome(pos, Player::Player1, Some(Outcome::InProgress)).unwrap();
        assert_eq!(known.outcome(), Outcome::InProgress);
        assert!(known.play(2).is_ok());
    }

    #[test]
    fn test_segment_from_larger_grid() {
        let pos: Position = "X.../X.../X.../X...".parse().unwrap();
        let large = SegmentIndex::new(8, 7).unwrap();

        // Vertical segment at column 0 rows 3..7 reaches past the 4x4 grid
        let tall = large
            .segments()
            .iter()
            .find(|s| s.direction == Direction::Vertical && s.cells[0] == Coord::new(0, 3))
            .unwrap();
        assert_eq!(pos.segment_owner(tall), None);
        assert!(!pos.is_filled_by(tall, Player::Player1));

        // Horizontal segment starting off the grid
        let wide = large
            .segments()
            .iter()
            .find(|s| s.direction == Direction::Horizontal && s.cells[0] == Coord::new(4, 0))
            .unwrap();
        assert_eq!(pos.segment_owner(wide), None);

        // The column of X on the small grid itself is still seen
        let own = SegmentIndex::new(4, 4).unwrap();
        let column = own.segments_through(0, 0).find(|s| s.direction == Direction::Vertical);
        assert_eq!(column.and_then(|s| pos.segment_owner(s)), Some(Player::Player1));
    }

    #[test]
    fn test_display() {
        let b = board(&[0]);
        let s = b.to_string();
        let lines: Vec<&str> = s.lines().collect();
        assert_eq!(lines.len(), 7 + 3);
        assert_eq!(lines[6], "G | X |   |   |   |   |   |   |   |");
        assert_eq!(lines[7], "  | - | - | - | - | - | - | - | - |");
        assert_eq!(lines[8], "  | 1 | 2 | 3 | 4 | 5 | 6 | 7 | 8 |");
        assert_eq!(lines[9], "<<< Move to O");
    }
}
