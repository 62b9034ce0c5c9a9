//! Interfaces of the external services a session is built from.
//!
//! The controllers only ever talk to these traits. In-process implementations
//! live in [`super::local`]; tests substitute counting doubles.

use super::error::CollaboratorError;
use crate::core::forcefield::params::{ForceFieldSpec, SystemOptions};
use crate::core::forcefield::system::{Simulation, SimulationSystem};
use crate::core::frame::FrameData;
use crate::core::io::read_structure;
use crate::core::models::system::MolecularSystem;
use crate::core::rendering::RootSelection;
use std::path::Path;
use std::sync::Arc;

/// Parses the structure a command names.
pub trait StructureLoader: Send + Sync {
    fn load(&self, path: &str) -> Result<MolecularSystem, CollaboratorError>;
}

/// Loads structures from the filesystem, choosing the reader by extension.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileStructureLoader;

impl StructureLoader for FileStructureLoader {
    fn load(&self, path: &str) -> Result<MolecularSystem, CollaboratorError> {
        read_structure(Path::new(path)).map_err(|source| CollaboratorError::Parse {
            path: path.to_string(),
            source,
        })
    }
}

/// Publishes frames to viewers and holds the shared root selection.
pub trait FrameServer: Send + Sync {
    fn publish_frame(&self, index: u64, frame: FrameData) -> Result<(), CollaboratorError>;

    fn root_selection(&self) -> RootSelection;

    fn update_root_selection(&self, selection: RootSelection) -> Result<(), CollaboratorError>;

    /// Stops serving. Calling it again has no effect.
    fn close(&self);

    fn is_closed(&self) -> bool;
}

/// A client connection to a frame server.
pub trait ViewerSession: Send {
    fn subscribe_multiplayer(&mut self) -> Result<(), CollaboratorError>;

    fn root_selection(&self) -> RootSelection;

    fn commit_root_selection(&mut self, selection: RootSelection) -> Result<(), CollaboratorError>;
}

pub trait ViewerConnector: Send + Sync {
    fn connect(
        &self,
        server: Arc<dyn FrameServer>,
    ) -> Result<Box<dyn ViewerSession>, CollaboratorError>;
}

/// Builds and runs physics-backed sessions.
pub trait SimulationBackend: Send + Sync {
    fn build_system(
        &self,
        topology: &MolecularSystem,
        forcefield: &ForceFieldSpec,
        options: &SystemOptions,
    ) -> Result<SimulationSystem, CollaboratorError>;

    fn inject_interactive_force(
        &self,
        system: &mut SimulationSystem,
    ) -> Result<(), CollaboratorError>;

    /// Starts streaming the simulation. Returns once its frame server is up.
    fn start_runner(&self, simulation: Simulation) -> Result<Box<dyn Runner>, CollaboratorError>;
}

/// Handle to a running simulation.
pub trait Runner: Send {
    fn server(&self) -> Arc<dyn FrameServer>;

    /// Stops the simulation and its frame server. Idempotent.
    fn close(&mut self);
}

/// Reads the current root selection, lets `edit` change it and commits the
/// result in one step. Nothing is committed if the session fails first.
pub fn modify_root_selection(
    session: &mut dyn ViewerSession,
    edit: impl FnOnce(&mut RootSelection),
) -> Result<(), CollaboratorError> {
    let mut selection = session.root_selection();
    edit(&mut selection);
    session.commit_root_selection(selection)
}
