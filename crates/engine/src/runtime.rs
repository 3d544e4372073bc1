//! Engine actor
//!
//! One task owns the board. Commands arrive on a bounded channel and carry a
//! oneshot for the reply. A turn in flight is kept as a [`Pending`] step with
//! the timers gating it; the actor selects between the next command and the
//! timers finishing, so it keeps answering while a turn waits.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::{JoinHandle, JoinSet};
use tracing::debug;

use match3_core::{
    Board, BoardSnapshot, ConfigError, MoveError, Selection, SwapOutcome, SwapStart, Wave,
};
use match3_types::{BoardState, Position};

use crate::timings::Timings;
use crate::EngineError;

/// Commands buffered before senders wait
pub const COMMAND_CAPACITY: usize = 32;

type Reply<T> = oneshot::Sender<T>;

enum Command {
    Select {
        pos: Position,
        reply: Reply<Result<Selection, MoveError>>,
    },
    Swap {
        a: Position,
        b: Position,
        reply: Reply<Result<SwapOutcome, EngineError>>,
    },
    Restart {
        reply: Reply<Result<(), ConfigError>>,
    },
    State {
        reply: Reply<BoardState>,
    },
    RemainingMoves {
        reply: Reply<usize>,
    },
    Hint {
        reply: Reply<Option<(Position, Position)>>,
    },
    Snapshot {
        reply: Reply<BoardSnapshot>,
    },
    Shutdown,
}

/// Cloneable handle to a running engine
#[derive(Debug, Clone)]
pub struct EngineHandle {
    tx: mpsc::Sender<Command>,
}

impl EngineHandle {
    async fn request<T>(
        &self,
        make: impl FnOnce(Reply<T>) -> Command,
    ) -> Result<T, EngineError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(make(reply))
            .await
            .map_err(|_| EngineError::Closed)?;
        rx.await.map_err(|_| EngineError::Closed)
    }

    /// Pick a tile; see [`Board::select_tile`]
    pub async fn select(&self, pos: Position) -> Result<Selection, EngineError> {
        Ok(self.request(|reply| Command::Select { pos, reply }).await??)
    }

    /// Swap two tiles and wait until the turn has played out
    ///
    /// Resolves after the revert delay for an illegal move, or after the
    /// last wave of the cascade. Returns `Busy` at once if a turn is already
    /// in flight.
    pub async fn swap(&self, a: Position, b: Position) -> Result<SwapOutcome, EngineError> {
        self.request(|reply| Command::Swap { a, b, reply }).await?
    }

    pub async fn restart(&self) -> Result<(), EngineError> {
        Ok(self.request(|reply| Command::Restart { reply }).await??)
    }

    pub async fn state(&self) -> Result<BoardState, EngineError> {
        self.request(|reply| Command::State { reply }).await
    }

    pub async fn remaining_moves(&self) -> Result<usize, EngineError> {
        self.request(|reply| Command::RemainingMoves { reply }).await
    }

    pub async fn hint(&self) -> Result<Option<(Position, Position)>, EngineError> {
        self.request(|reply| Command::Hint { reply }).await
    }

    pub async fn snapshot(&self) -> Result<BoardSnapshot, EngineError> {
        self.request(|reply| Command::Snapshot { reply }).await
    }

    /// Ask the engine to stop; a turn in flight is cancelled
    pub async fn shutdown(&self) {
        let _ = self.tx.send(Command::Shutdown).await;
    }
}

/// Start an engine task that owns `board`
///
/// Must be called from within a tokio runtime. The task ends on
/// [`EngineHandle::shutdown`] or when every handle is dropped.
pub fn spawn(board: Board, timings: Timings) -> (EngineHandle, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(COMMAND_CAPACITY);
    let actor = Actor {
        board,
        timings,
        pending: None,
    };
    let task = tokio::spawn(actor.run(rx));
    (EngineHandle { tx }, task)
}

/// Next thing the turn in flight does once its timers finish
enum Step {
    /// Illegal swap half way; put the tiles back
    Revert { a: Position, b: Position },
    /// Tiles travelling back; end the turn
    Reverted,
    /// Legal swap on display; announce the first wave
    Swapped(Wave),
    /// Wave announced; clear it
    Commit(Wave),
    /// Wave cleared; scan for the next one
    Rescan,
}

struct Pending {
    step: Step,
    /// Dropping the set aborts the timers
    timers: JoinSet<()>,
    reply: Reply<Result<SwapOutcome, EngineError>>,
}

enum Wake {
    Command(Option<Command>),
    Timers,
}

struct Actor {
    board: Board,
    timings: Timings,
    pending: Option<Pending>,
}

impl Actor {
    async fn run(mut self, mut rx: mpsc::Receiver<Command>) {
        loop {
            let wake = match self.pending.as_mut() {
                Some(pending) => tokio::select! {
                    cmd = rx.recv() => Wake::Command(cmd),
                    _ = join_all(&mut pending.timers) => Wake::Timers,
                },
                None => Wake::Command(rx.recv().await),
            };

            match wake {
                Wake::Timers => self.advance(),
                Wake::Command(Some(Command::Shutdown)) | Wake::Command(None) => break,
                Wake::Command(Some(cmd)) => self.handle(cmd),
            }
        }
        self.cancel_pending();
        debug!("engine stopped");
    }

    fn handle(&mut self, cmd: Command) {
        match cmd {
            Command::Select { pos, reply } => {
                let _ = reply.send(self.board.select_tile(pos));
            }
            Command::Swap { a, b, reply } => self.start_swap(a, b, reply),
            Command::Restart { reply } => {
                self.cancel_pending();
                let _ = reply.send(self.board.restart());
            }
            Command::State { reply } => {
                let _ = reply.send(self.board.state());
            }
            Command::RemainingMoves { reply } => {
                let _ = reply.send(self.board.remaining_moves());
            }
            Command::Hint { reply } => {
                let _ = reply.send(self.board.hint());
            }
            Command::Snapshot { reply } => {
                let _ = reply.send(self.board.snapshot());
            }
            Command::Shutdown => {}
        }
    }

    fn start_swap(
        &mut self,
        a: Position,
        b: Position,
        reply: Reply<Result<SwapOutcome, EngineError>>,
    ) {
        if self.pending.is_some() {
            let _ = reply.send(Ok(SwapOutcome::Busy));
            return;
        }
        let switch = self.timings.switch;
        let (step, delay) = match self.board.begin_swap(a, b) {
            Err(err) => {
                let _ = reply.send(Err(err.into()));
                return;
            }
            Ok(SwapStart::Busy) => {
                let _ = reply.send(Ok(SwapOutcome::Busy));
                return;
            }
            // Tiles swap out and back within one switch time
            Ok(SwapStart::Illegal) => (Step::Revert { a, b }, switch / 2),
            Ok(SwapStart::Legal(wave)) => (Step::Swapped(wave), switch),
        };
        self.wait(step, 1, delay, reply);
    }

    fn advance(&mut self) {
        let Some(Pending { step, reply, .. }) = self.pending.take() else {
            return;
        };
        match step {
            Step::Revert { a, b } => match self.board.revert_swap(a, b) {
                Ok(()) => {
                    let rest = self.timings.switch - self.timings.switch / 2;
                    self.wait(Step::Reverted, 1, rest, reply);
                }
                Err(err) => {
                    let _ = reply.send(Err(err.into()));
                }
            },
            Step::Reverted => {
                let result = self
                    .board
                    .settle()
                    .map(|_| SwapOutcome::IllegalMove)
                    .map_err(EngineError::from);
                let _ = reply.send(result);
            }
            Step::Swapped(wave) => self.announce(wave, reply),
            Step::Commit(wave) => match self.board.commit_wave(wave) {
                Ok(()) => self.wait(Step::Rescan, 1, self.timings.delay_after_match, reply),
                Err(err) => {
                    let _ = reply.send(Err(err.into()));
                }
            },
            Step::Rescan => match self.board.next_wave() {
                Some(wave) => self.announce(wave, reply),
                None => {
                    let result = self
                        .board
                        .settle()
                        .map(SwapOutcome::Resolved)
                        .map_err(EngineError::from);
                    let _ = reply.send(result);
                }
            },
        }
    }

    /// Mark the wave and give every group its own animation timer
    fn announce(&mut self, wave: Wave, reply: Reply<Result<SwapOutcome, EngineError>>) {
        if let Err(err) = self.board.announce_wave(&wave) {
            let _ = reply.send(Err(err.into()));
            return;
        }
        let groups = wave.groups().len();
        self.wait(Step::Commit(wave), groups, self.timings.match_anim, reply);
    }

    fn wait(
        &mut self,
        step: Step,
        timers: usize,
        delay: Duration,
        reply: Reply<Result<SwapOutcome, EngineError>>,
    ) {
        let mut set = JoinSet::new();
        for _ in 0..timers.max(1) {
            set.spawn(tokio::time::sleep(delay));
        }
        self.pending = Some(Pending {
            step,
            timers: set,
            reply,
        });
    }

    fn cancel_pending(&mut self) {
        if let Some(pending) = self.pending.take() {
            debug!("cancelling turn in flight");
            let _ = pending.reply.send(Err(EngineError::Cancelled));
        }
    }
}

/// Wait for every timer; cancel safe, finished timers leave the set
async fn join_all(timers: &mut JoinSet<()>) {
    while timers.join_next().await.is_some() {}
}
