//! Match-3 rule engine (workspace facade crate).
//!
//! The implementation lives in dedicated crates under `crates/`; this package
//! re-exports them as `match3::{core, engine, types}` and carries the
//! terminal printer used by the `match3` binary.

pub mod render;

pub use match3_core as core;
pub use match3_engine as engine;
pub use match3_types as types;
