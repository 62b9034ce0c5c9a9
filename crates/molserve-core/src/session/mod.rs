//! # Session Control
//!
//! A session binds one structure to the external rendering and simulation
//! services. The [`controller::SessionController`] trait enforces that at
//! most one session is active and serializes every state transition behind
//! a mutex, so producers on different threads may submit concurrently.
//!
//! Two variants exist:
//!
//! - [`visual::VisualizationController`] republishes on every submit.
//! - [`simulation::SimulationController`] starts a simulation runner and
//!   ignores submits while one is active or when the path repeats.
//!
//! Collaborators are reached only through the traits in [`collab`];
//! [`local`] provides in-process implementations.

pub mod collab;
pub mod controller;
pub mod error;
pub mod local;
pub mod notice;
pub mod simulation;
pub mod visual;

pub use controller::{IgnoreReason, SessionContext, SessionController, SessionSnapshot, SubmitOutcome};
pub use error::CollaboratorError;
pub use notice::{Notice, NoticeCallback, NoticeReporter};
