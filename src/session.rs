//! Line-oriented text protocol for driving a game.
//!
//! Modelled on GTP: one command per line, an optional numeric id in front,
//! responses of the form `=id message` on success and `?id message` on
//! failure, each followed by a blank line. Columns are 1-based on the wire.
//!
//! ## Supported Commands
//!
//! - `name`, `version`, `list_commands`, `known_command <cmd>`, `quit`
//! - `new [cols rows]` - Start a new game, optionally with another grid size
//! - `play <col>` - Drop the side to move's marker into a column
//! - `genmove` - Play a random legal move and report its column
//! - `moves` - List the columns that still have room
//! - `freerow <col>` - Row a drop into the column would land on
//! - `hashkey` - Canonical key and mirror flag of the position
//! - `status` - `in_progress`, `draw`, or the winner
//! - `showboard` - Render the grid
//! - `setpos <rows> [x|o]` - Load a position in compact text form
//!
//! ## Example
//!
//! ```ignore
//! use c4_rust::session::Session;
//! let mut session = Session::new(8, 7, 1).unwrap();
//! session.run(std::io::stdin().lock(), std::io::stdout()).unwrap();
//! ```

use std::io::{self, BufRead, Write};

use fastrand::Rng;
use log::debug;

use crate::board::{Board, Outcome, Player, Position};
use crate::playout::random_move;
use crate::segments::GeometryError;

/// The list of known commands.
const KNOWN_COMMANDS: &[&str] = &[
    "freerow",
    "genmove",
    "hashkey",
    "known_command",
    "list_commands",
    "moves",
    "name",
    "new",
    "play",
    "quit",
    "setpos",
    "showboard",
    "status",
    "version",
];

/// Session state.
pub struct Session {
    /// Current game position
    board: Board,
    /// Source of randomness for `genmove`
    rng: Rng,
}

impl Session {
    /// Start a session on an empty `cols x rows` grid.
    pub fn new(cols: usize, rows: usize, seed: u64) -> Result<Self, GeometryError> {
        Ok(Self {
            board: Board::new(cols, rows)?,
            rng: Rng::with_seed(seed),
        })
    }

    /// The current board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Run the command loop until `quit` or end of input.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> io::Result<()> {
        for line in input.lines() {
            let line = line?;

            // Skip empty lines and comments
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (id, command_line) = Self::parse_id(line);
            let parts: Vec<&str> = command_line.split_whitespace().collect();
            let Some((command, args)) = parts.split_first() else {
                continue;
            };
            let command = command.to_lowercase();

            let (success, message) = self.execute(&command, args);
            let prefix = if success { '=' } else { '?' };
            let id_str = id.map(|i| i.to_string()).unwrap_or_default();

            writeln!(output, "{prefix}{id_str} {message}\n")?;
            output.flush()?;

            if command == "quit" {
                break;
            }
        }
        Ok(())
    }

    /// Split an optional numeric command id from the start of the line.
    fn parse_id(line: &str) -> (Option<u32>, &str) {
        let trimmed = line.trim();
        let end = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        match trimmed[..end].parse::<u32>() {
            Ok(id) => (Some(id), trimmed[end..].trim()),
            Err(_) => (None, trimmed),
        }
    }

    /// Parse a 1-based column argument into an engine column.
    fn parse_column(arg: Option<&&str>) -> Result<isize, String> {
        let arg = arg.ok_or_else(|| "missing argument".to_string())?;
        arg.parse::<isize>()
            .ok()
            .and_then(|c| c.checked_sub(1))
            .ok_or_else(|| format!("invalid column: {arg}"))
    }

    /// Execute a command and return (success, response).
    fn execute(&mut self, command: &str, args: &[&str]) -> (bool, String) {
        match command {
            "name" => (true, env!("CARGO_PKG_NAME").to_string()),

            "version" => (true, env!("CARGO_PKG_VERSION").to_string()),

            "list_commands" => (true, KNOWN_COMMANDS.join("\n")),

            "known_command" => match args.first() {
                Some(cmd) => {
                    let known = KNOWN_COMMANDS.contains(&cmd.to_lowercase().as_str());
                    (true, known.to_string())
                }
                None => (false, "missing argument".to_string()),
            },

            "quit" => (true, String::new()),

            "new" => {
                let (cols, rows) = match args {
                    [] => (self.board.cols(), self.board.rows()),
                    [c, r] => match (c.parse::<usize>(), r.parse::<usize>()) {
                        (Ok(c), Ok(r)) => (c, r),
                        _ => return (false, "invalid size".to_string()),
                    },
                    _ => return (false, "expected: new [cols rows]".to_string()),
                };
                match Board::new(cols, rows) {
                    Ok(board) => {
                        debug!("new {cols}x{rows} game");
                        self.board = board;
                        (true, String::new())
                    }
                    Err(e) => (false, e.to_string()),
                }
            }

            "play" => {
                if self.board.is_over() {
                    return (false, "game is over".to_string());
                }
                let col = match Self::parse_column(args.first()) {
                    Ok(col) => col,
                    Err(e) => return (false, e),
                };
                match self.board.play(col) {
                    Ok(board) => {
                        self.board = board;
                        (true, String::new())
                    }
                    Err(e) => (false, e.to_string()),
                }
            }

            "genmove" => {
                let Some(col) = random_move(&self.board, &mut self.rng) else {
                    return (false, "no move available".to_string());
                };
                match self.board.play(col as isize) {
                    Ok(board) => {
                        self.board = board;
                        (true, (col + 1).to_string())
                    }
                    Err(e) => (false, e.to_string()),
                }
            }

            "moves" => {
                let moves: Vec<String> = self
                    .board
                    .legal_moves()
                    .iter()
                    .map(|c| (c + 1).to_string())
                    .collect();
                (true, moves.join(" "))
            }

            "freerow" => match Self::parse_column(args.first()) {
                Ok(col) => match self.board.freerow(col) {
                    Some(row) => (true, (row + 1).to_string()),
                    None => (true, "none".to_string()),
                },
                Err(e) => (false, e),
            },

            "hashkey" => {
                let key = self.board.hashkey();
                (true, format!("{} {}", key.key, key.mirrored))
            }

            "status" => {
                let status = match self.board.outcome() {
                    Outcome::InProgress => "in_progress".to_string(),
                    Outcome::Draw => "draw".to_string(),
                    Outcome::WonBy(p) => format!("{} wins", p.mark()),
                };
                (true, status)
            }

            "showboard" => (true, format!("\n{}", self.board)),

            "setpos" => {
                let Some(text) = args.first() else {
                    return (false, "missing argument".to_string());
                };
                let side = match args.get(1).map(|s| s.to_lowercase()) {
                    None => None,
                    Some(s) if s == "x" => Some(Player::Player1),
                    Some(s) if s == "o" => Some(Player::Player2),
                    Some(s) => return (false, format!("invalid side: {s}")),
                };
                let position = match text.parse::<Position>() {
                    Ok(p) => p,
                    Err(e) => return (false, e.to_string()),
                };
                // Without an explicit side, Player1 moves when the counts are level
                let side = side.unwrap_or_else(|| {
                    if position.count(Player::Player1) > position.count(Player::Player2) {
                        Player::Player2
                    } else {
                        Player::Player1
                    }
                });
                match Board::from_position(position, side) {
                    Ok(board) => {
                        self.board = board;
                        (true, String::new())
                    }
                    Err(e) => (false, e.to_string()),
                }
            }

            _ => (false, format!("unknown command: {command}")),
        }
    }
}
