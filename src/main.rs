//! Match-3 autoplay runner (default binary).
//!
//! Builds a board from `MATCH3_*` environment variables, drives it through
//! the timed engine and keeps playing the first legal swap until the game is
//! over or the move cap is reached. The board is printed after every move.
//! Set `MATCH3_SWITCH_MS=0` (and friends) for a headless run; `RUST_LOG`
//! controls the log output.

use std::io;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use match3::core::{Board, BoardConfig, SwapOutcome};
use match3::engine::{self, Timings};
use match3::render::write_board;
use match3::types::BoardState;

const DEFAULT_MAX_MOVES: usize = 50;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let runtime = tokio::runtime::Runtime::new().context("failed to create tokio runtime")?;
    runtime.block_on(run())
}

async fn run() -> Result<()> {
    let config = BoardConfig::from_env();
    let timings = Timings::from_env();
    let max_moves = std::env::var("MATCH3_MAX_MOVES")
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(DEFAULT_MAX_MOVES);

    info!(
        columns = config.columns,
        rows = config.rows,
        kinds = config.tile_types.len(),
        seed = config.seed,
        "starting board"
    );
    let mut board = Board::new(config).context("invalid board configuration")?;
    if let Some(report) = board.resolve_pending() {
        info!(tiles = report.tiles_cleared, "resolved initial matches");
    }

    let (handle, task) = engine::spawn(board, timings);
    let mut stdout = io::stdout();
    write_board(&mut stdout, &handle.snapshot().await?)?;

    let mut moves = 0;
    let mut cleared = 0;
    while moves < max_moves {
        if handle.state().await? != BoardState::Playing {
            break;
        }
        let Some((a, b)) = handle.hint().await? else {
            break;
        };

        moves += 1;
        match handle.swap(a, b).await? {
            SwapOutcome::Resolved(report) => {
                cleared += report.tiles_cleared;
                println!(
                    "\r\nmove {}: {} <-> {}, {} wave(s), {} tile(s) cleared",
                    moves, a, b, report.waves, report.tiles_cleared
                );
            }
            other => println!("\r\nmove {}: {} <-> {}: {:?}", moves, a, b, other),
        }
        write_board(&mut stdout, &handle.snapshot().await?)?;
    }

    let game_over = handle.snapshot().await?.game_over;
    println!(
        "\r\n{} move(s), {} tile(s) cleared, {}",
        moves,
        cleared,
        if game_over { "game over" } else { "moves left" }
    );

    handle.shutdown().await;
    task.await.context("engine task failed")?;
    Ok(())
}
