use super::frame_server::LocalFrameServer;
use crate::core::forcefield::params::{ForceFieldSpec, SystemOptions};
use crate::core::forcefield::system::{Simulation, SimulationSystem};
use crate::core::models::system::MolecularSystem;
use crate::session::collab::{FrameServer, Runner, SimulationBackend};
use crate::session::error::CollaboratorError;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Builds parameterized systems in process and runs them on a worker thread.
///
/// The runner performs no integration: it republishes the starting
/// coordinates every `frame_interval` so that viewers stay live.
#[derive(Debug, Clone)]
pub struct LocalSimulationBackend {
    frame_interval: Duration,
}

impl LocalSimulationBackend {
    pub fn new(frame_interval: Duration) -> Self {
        Self { frame_interval }
    }
}

impl SimulationBackend for LocalSimulationBackend {
    fn build_system(
        &self,
        topology: &MolecularSystem,
        forcefield: &ForceFieldSpec,
        options: &SystemOptions,
    ) -> Result<SimulationSystem, CollaboratorError> {
        Ok(SimulationSystem::from_topology(topology, forcefield, options)?)
    }

    fn inject_interactive_force(
        &self,
        system: &mut SimulationSystem,
    ) -> Result<(), CollaboratorError> {
        let index = system.add_interactive_force();
        debug!(index = index, "Interactive force attached");
        Ok(())
    }

    fn start_runner(&self, simulation: Simulation) -> Result<Box<dyn Runner>, CollaboratorError> {
        Ok(Box::new(LocalRunner::start(simulation, self.frame_interval)?))
    }
}

pub struct LocalRunner {
    server: Arc<LocalFrameServer>,
    stop: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl LocalRunner {
    /// Publishes the initial frame, then hands streaming over to a worker thread.
    pub fn start(simulation: Simulation, frame_interval: Duration) -> Result<Self, CollaboratorError> {
        let server = Arc::new(LocalFrameServer::new());
        let frame = simulation.initial_frame;
        server.publish_frame(0, frame.clone())?;

        let stop = Arc::new(AtomicBool::new(false));
        let worker = {
            let server = Arc::clone(&server);
            let stop = Arc::clone(&stop);
            thread::Builder::new()
                .name("simulation-runner".to_string())
                .spawn(move || {
                    let mut index = 0u64;
                    loop {
                        thread::park_timeout(frame_interval);
                        if stop.load(Ordering::Acquire) {
                            break;
                        }
                        index += 1;
                        if let Err(e) = server.publish_frame(index, frame.clone()) {
                            warn!("Simulation runner stopped publishing: {}", e);
                            break;
                        }
                    }
                })
                .map_err(|e| CollaboratorError::RunnerStart(e.to_string()))?
        };

        info!(
            particles = simulation.system.particle_count(),
            "Simulation runner started"
        );
        Ok(Self {
            server,
            stop,
            worker: Some(worker),
        })
    }

    pub fn frame_server(&self) -> &Arc<LocalFrameServer> {
        &self.server
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }
}

impl Runner for LocalRunner {
    fn server(&self) -> Arc<dyn FrameServer> {
        self.server.clone()
    }

    fn close(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };
        self.stop.store(true, Ordering::Release);
        worker.thread().unpark();
        if worker.join().is_err() {
            warn!("Simulation runner thread panicked");
        }
        self.server.close();
        info!("Simulation runner closed");
    }
}

impl Drop for LocalRunner {
    fn drop(&mut self) {
        self.close();
    }
}
