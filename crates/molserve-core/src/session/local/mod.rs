//! In-process implementations of the session collaborators.
//!
//! Frames are kept in memory and fanned out over a watch channel; the
//! simulation runner replays the starting coordinates at a fixed cadence.

pub mod frame_server;
pub mod runner;
pub mod viewer;

pub use frame_server::{LocalFrameServer, PublishedFrame};
pub use runner::{LocalRunner, LocalSimulationBackend};
pub use viewer::{LocalViewerConnector, LocalViewerSession};
