use crate::core::forcefield::system::SystemBuildError;
use crate::core::io::StructureError;
use thiserror::Error;

/// A failure inside one of the services a session controller delegates to.
///
/// These never escape `submit`: the controller journals them and reports a
/// notice instead.
#[derive(Debug, Error)]
pub enum CollaboratorError {
    #[error("Failed to parse structure '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: StructureError,
    },

    #[error("Failed to build simulation system: {0}")]
    SystemBuild(#[from] SystemBuildError),

    #[error("Failed to start simulation runner: {0}")]
    RunnerStart(String),

    #[error("Failed to publish frame: {0}")]
    Publish(String),

    #[error("Viewer session error: {0}")]
    Viewer(String),

    #[error("Frame server is closed")]
    ServerClosed,
}
