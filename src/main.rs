//! c4-rust: Connect-Four board engine.
//!
//! ## Usage
//!
//! - `c4-rust` - Show a demo
//! - `c4-rust session` - Read commands from stdin (see the `session` module)
//! - `c4-rust selfplay --games 1000` - Random games and outcome statistics

use anyhow::{Context, Result, ensure};
use clap::{Parser, Subcommand};
use log::{LevelFilter, info};
use simple_logger::SimpleLogger;

use c4_rust::board::Board;
use c4_rust::constants::{DEFAULT_COLS, DEFAULT_ROWS, DEFAULT_SEED, N_SELFPLAY_GAMES};
use c4_rust::playout::selfplay;
use c4_rust::session::Session;

/// c4-rust: Connect-Four board engine
#[derive(Parser)]
#[command(name = "c4-rust")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Number of columns
    #[arg(long, global = true, default_value_t = DEFAULT_COLS)]
    cols: usize,

    /// Number of rows
    #[arg(long, global = true, default_value_t = DEFAULT_ROWS)]
    rows: usize,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Play through the line protocol on stdin/stdout
    Session {
        /// Seed for `genmove`
        #[arg(long, default_value_t = DEFAULT_SEED)]
        seed: u64,
    },
    /// Play random games and report outcome statistics
    Selfplay {
        #[arg(long, default_value_t = N_SELFPLAY_GAMES)]
        games: usize,

        #[arg(long, default_value_t = DEFAULT_SEED)]
        seed: u64,
    },
    /// Run a short demo of the engine
    Demo,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    SimpleLogger::new()
        .with_level(level)
        .env()
        .init()
        .context("failed to initialise logging")?;

    let board = Board::new(cli.cols, cli.rows)
        .with_context(|| format!("invalid grid {}x{}", cli.cols, cli.rows))?;
    ensure!(
        !board.segment_index().is_empty(),
        "no line of four fits on a {}x{} grid",
        cli.cols,
        cli.rows
    );

    match cli.command {
        Some(Commands::Session { seed }) => {
            let mut session = Session::new(cli.cols, cli.rows, seed)?;
            session
                .run(std::io::stdin().lock(), std::io::stdout())
                .context("session I/O failed")?;
        }
        Some(Commands::Selfplay { games, seed }) => {
            info!("playing {games} random games on a {}x{} grid", cli.cols, cli.rows);
            let stats = selfplay(&board, games, seed)?;
            println!("{stats}");
        }
        Some(Commands::Demo) | None => run_demo(&board)?,
    }
    Ok(())
}

fn run_demo(board: &Board) -> Result<()> {
    println!("c4-rust: Connect-Four board engine\n");

    let cols = board.cols() as isize;
    let centre = cols / 2;
    let game = board.play_all([centre, centre - 1, centre, centre - 1, centre])?;
    println!("{game}\n");

    let key = game.hashkey();
    println!("hashkey: {} (mirrored: {})", key.key, key.mirrored);
    let mirror_key = game.mirrored().hashkey();
    println!("mirror hashkey: {} (mirrored: {})", mirror_key.key, mirror_key.mirrored);
    println!("legal moves: {:?}", game.legal_moves());

    let won = game.play(centre - 1)?.play(centre)?;
    println!("\n{won}");
    Ok(())
}
