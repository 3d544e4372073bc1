//! Timed driver for the match-3 board
//!
//! The core crate resolves a turn synchronously. This crate runs a [`Board`]
//! inside a tokio task and puts the presentation delays between the turn
//! phases: the swap animation, the matched-tile animation of every group in
//! a wave, and the pause before the board is rescanned.
//!
//! Hosts talk to the task through a cloneable [`EngineHandle`]. While a turn
//! is in flight, swaps and selections are answered with `Busy` and queries
//! see the board as it currently stands. A restart abandons the turn.
//!
//! ```no_run
//! use match3_core::{Board, BoardConfig};
//! use match3_engine::{spawn, Timings};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let board = Board::new(BoardConfig::default())?;
//! let (engine, task) = spawn(board, Timings::default());
//! if let Some((a, b)) = engine.hint().await? {
//!     println!("{:?}", engine.swap(a, b).await?);
//! }
//! engine.shutdown().await;
//! task.await?;
//! # Ok(())
//! # }
//! ```

pub mod runtime;
pub mod timings;

use thiserror::Error;
use tokio::sync::mpsc;

use match3_core::{ConfigError, EventSink, MoveError};
use match3_types::BoardEvent;

pub use match3_core::Board;
pub use runtime::{spawn, EngineHandle, COMMAND_CAPACITY};
pub use timings::Timings;

/// Engine request failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The engine task has stopped
    #[error("engine is not running")]
    Closed,

    /// A restart or shutdown abandoned the request
    #[error("request cancelled by restart")]
    Cancelled,

    #[error(transparent)]
    Move(#[from] MoveError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Event sink feeding an async receiver
#[derive(Debug, Clone)]
pub struct TokioSink(pub mpsc::UnboundedSender<BoardEvent>);

impl EventSink for TokioSink {
    fn emit(&mut self, event: BoardEvent) {
        let _ = self.0.send(event);
    }
}

/// Sink plus the receiver a presentation task reads from
pub fn event_channel() -> (TokioSink, mpsc::UnboundedReceiver<BoardEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (TokioSink(tx), rx)
}
