use super::collab::{Runner, SimulationBackend, StructureLoader};
use super::controller::{
    IgnoreReason, SessionContext, SessionController, SessionSnapshot, SubmitOutcome,
};
use super::error::CollaboratorError;
use super::notice::Notice;
use crate::core::forcefield::params::SimulationParams;
use crate::core::forcefield::system::Simulation;
use crate::core::frame::FrameData;
use crate::core::rendering::RenderStyle;
use std::mem;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};

#[derive(Default)]
enum Phase {
    #[default]
    Idle,
    /// A submit is building the session outside the lock.
    Starting { cancelled: bool },
    Running(Box<dyn Runner>),
}

#[derive(Default)]
struct SimulationState {
    active_path: Option<String>,
    phase: Phase,
}

/// Physics-backed session.
///
/// Accepts a path only while no session is running or starting, and only if
/// it differs from the last successfully bound path. The bound path is
/// recorded only once the runner has started and the style has been applied,
/// so a failed attempt can be retried with the same path.
///
/// The state lock is held only across transitions. A runner that comes up
/// after `terminate` was called during its start is closed immediately.
pub struct SimulationController {
    loader: Arc<dyn StructureLoader>,
    backend: Arc<dyn SimulationBackend>,
    params: SimulationParams,
    context: SessionContext,
    style: RenderStyle,
    state: Mutex<SimulationState>,
}

impl SimulationController {
    pub fn new(
        loader: Arc<dyn StructureLoader>,
        backend: Arc<dyn SimulationBackend>,
        params: SimulationParams,
        context: SessionContext,
    ) -> Self {
        Self {
            loader,
            backend,
            params,
            context,
            style: RenderStyle::group(),
            state: Mutex::new(SimulationState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SimulationState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn start(&self, path: &str) -> Result<Box<dyn Runner>, CollaboratorError> {
        let topology = self.loader.load(path)?;
        let mut system =
            self.backend
                .build_system(&topology, &self.params.forcefield, &self.params.system)?;
        self.backend.inject_interactive_force(&mut system)?;
        let simulation = Simulation::new(
            system,
            self.params.integrator,
            FrameData::from_system(&topology),
        )?;

        let mut runner = self.backend.start_runner(simulation)?;
        if let Err(e) = self.context.apply_render_style(runner.server(), &self.style) {
            runner.close();
            return Err(e);
        }
        Ok(runner)
    }
}

impl SessionController for SimulationController {
    fn submit(&self, path: &str) -> SubmitOutcome {
        {
            let mut state = self.lock();
            if !matches!(state.phase, Phase::Idle) {
                drop(state);
                return self.context.report_ignored(path, IgnoreReason::SessionBusy);
            }
            if state.active_path.as_deref() == Some(path) {
                drop(state);
                return self.context.report_ignored(path, IgnoreReason::SamePath);
            }
            state.phase = Phase::Starting { cancelled: false };
        }

        self.context.reporter.report(Notice::Starting {
            path: path.to_string(),
        });
        let result = self.start(path);

        let mut state = self.lock();
        let cancelled = matches!(state.phase, Phase::Starting { cancelled: true });
        match result {
            Ok(mut runner) if cancelled => {
                state.phase = Phase::Idle;
                drop(state);
                runner.close();
                info!(%path, "Simulation closed, terminate was requested during start");
                self.context.report_ignored(path, IgnoreReason::Cancelled)
            }
            Ok(runner) => {
                state.phase = Phase::Running(runner);
                state.active_path = Some(path.to_string());
                drop(state);
                info!(%path, "Simulation session started");
                self.context.reporter.report(Notice::Accepted {
                    path: path.to_string(),
                });
                SubmitOutcome::Accepted
            }
            Err(e) => {
                state.phase = Phase::Idle;
                drop(state);
                self.context.record_failure(path, &e)
            }
        }
    }

    fn terminate(&self) {
        let runner = {
            let mut state = self.lock();
            match mem::take(&mut state.phase) {
                Phase::Running(runner) => Some(runner),
                Phase::Starting { .. } => {
                    state.phase = Phase::Starting { cancelled: true };
                    debug!("Terminate requested while a simulation is starting");
                    None
                }
                Phase::Idle => None,
            }
        };

        match runner {
            Some(mut runner) => {
                runner.close();
                info!("Simulation session terminated");
                self.context.reporter.report(Notice::Terminated);
            }
            None => debug!("Terminate called without a running simulation"),
        }
    }

    fn snapshot(&self) -> SessionSnapshot {
        let state = self.lock();
        SessionSnapshot {
            is_active: matches!(state.phase, Phase::Running(_)),
            active_path: state.active_path.clone(),
        }
    }
}
