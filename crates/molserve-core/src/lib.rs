//! # molserve
//!
//! Serves molecular structures to interactive viewers. Structure paths arrive
//! on a TCP socket and an interactive console; a session controller loads the
//! referenced file, publishes it as frames and, in simulation mode, starts a
//! runner that streams the system to viewers.
//!
//! ## Layout
//!
//! - **[`core`]** - structure models and readers, frames, rendering style,
//!   simulation parameters and the error journal.
//! - **[`session`]** - the single-session state machine in its visualization
//!   and simulation variants, and the collaborator interfaces it drives.
//! - **[`control`]** - the socket and console producers, the shutdown flag and
//!   the coordinator that stops everything once the flag is set.

pub mod control;
pub mod core;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;
