//! `stage` — cooperative pipeline-stage runtime.
//!
//! A pipeline is a chain of stages, one OS thread each, connected by
//! single-slot mailboxes. This crate provides the pieces every stage shares:
//!
//! # Module layout
//! - [`state`]   — the lifecycle state machine
//! - [`handler`] — the four-callback capability trait a stage implements
//! - [`driver`]  — generic worker-thread driver (`start` / `run` / `pause` / `stop`)
//! - [`inbox`]   — latest-wins message handoff between adjacent stages
//! - [`error`]   — stage runtime errors

pub mod driver;
pub mod error;
pub mod handler;
pub mod inbox;
pub mod state;

pub use driver::Stage;
pub use error::StageError;
pub use handler::StageHandler;
pub use inbox::{Inbox, Listener, DEFAULT_TIMEOUT_US};
pub use state::StageState;
