//! Event sinks
//!
//! The board owns all tile state and pushes [`BoardEvent`]s out through a
//! sink handed to it at construction. A presentation layer keeps its own
//! lookup from [`crate::types::TileId`] to whatever it draws.

use std::sync::mpsc;

use crate::types::BoardEvent;

/// Receiver of board notifications
pub trait EventSink {
    fn emit(&mut self, event: BoardEvent);
}

/// Discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: BoardEvent) {}
}

/// Forwards into a channel; a dropped receiver is ignored
impl EventSink for mpsc::Sender<BoardEvent> {
    fn emit(&mut self, event: BoardEvent) {
        let _ = self.send(event);
    }
}

impl EventSink for Vec<BoardEvent> {
    fn emit(&mut self, event: BoardEvent) {
        self.push(event);
    }
}
