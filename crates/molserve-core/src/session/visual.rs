use super::collab::{FrameServer, StructureLoader};
use super::controller::{
    IgnoreReason, SessionContext, SessionController, SessionSnapshot, SubmitOutcome,
};
use super::error::CollaboratorError;
use super::notice::Notice;
use crate::core::frame::FrameData;
use crate::core::rendering::RenderStyle;
use std::mem;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};

#[derive(Default)]
struct VisualState {
    session: SessionSnapshot,
    publishing: bool,
    cancelled: bool,
}

/// Visualization-only session.
///
/// Every submit reloads the structure, reapplies the rendering style and
/// republishes it as frame 0; there is no guard against resubmitting the
/// same path. The style is applied before the frame is published, so a
/// failed submit never leaves a new frame behind. If publishing fails after
/// styling, the selection keeps the fixed style it already had.
///
/// A submit arriving while another one is still publishing is ignored as
/// busy; the state lock is never held across collaborator calls.
pub struct VisualizationController {
    loader: Arc<dyn StructureLoader>,
    server: Arc<dyn FrameServer>,
    context: SessionContext,
    style: RenderStyle,
    state: Mutex<VisualState>,
}

impl VisualizationController {
    pub fn new(
        loader: Arc<dyn StructureLoader>,
        server: Arc<dyn FrameServer>,
        context: SessionContext,
    ) -> Self {
        Self {
            loader,
            server,
            context,
            style: RenderStyle::single(),
            state: Mutex::new(VisualState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, VisualState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn show(&self, path: &str) -> Result<(), CollaboratorError> {
        let structure = self.loader.load(path)?;
        let frame = FrameData::from_system(&structure);
        self.context
            .apply_render_style(Arc::clone(&self.server), &self.style)?;
        self.server.publish_frame(0, frame)
    }
}

impl SessionController for VisualizationController {
    fn submit(&self, path: &str) -> SubmitOutcome {
        {
            let mut state = self.lock();
            if state.publishing {
                drop(state);
                return self.context.report_ignored(path, IgnoreReason::SessionBusy);
            }
            state.publishing = true;
            state.cancelled = false;
        }

        let result = self.show(path);

        let mut state = self.lock();
        state.publishing = false;
        let cancelled = mem::take(&mut state.cancelled);
        match result {
            Err(e) => {
                drop(state);
                self.context.record_failure(path, &e)
            }
            Ok(()) if cancelled => {
                drop(state);
                self.context.report_ignored(path, IgnoreReason::Cancelled)
            }
            Ok(()) => {
                state.session.is_active = true;
                state.session.active_path = Some(path.to_string());
                drop(state);
                info!(%path, "Structure published");
                self.context.reporter.report(Notice::Accepted {
                    path: path.to_string(),
                });
                SubmitOutcome::Accepted
            }
        }
    }

    fn terminate(&self) {
        self.server.close();
        let was_active = {
            let mut state = self.lock();
            if state.publishing {
                state.cancelled = true;
            }
            mem::replace(&mut state.session.is_active, false)
        };

        if was_active {
            info!("Visualization session terminated");
            self.context.reporter.report(Notice::Terminated);
        } else {
            debug!("Terminate called on an inactive visualization session");
        }
    }

    fn snapshot(&self) -> SessionSnapshot {
        self.lock().session.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rendering::InteractionMethod;
    use crate::session::local::LocalFrameServer;
    use crate::testing::{FakeConnector, FakeLoader, MemorySink, collecting_reporter};
    use std::sync::atomic::Ordering;
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    struct Harness {
        controller: Arc<VisualizationController>,
        loader: Arc<FakeLoader>,
        server: Arc<LocalFrameServer>,
        connector: Arc<FakeConnector>,
        sink: MemorySink,
        notices: Arc<Mutex<Vec<Notice>>>,
    }

    fn harness(loader: FakeLoader) -> Harness {
        let loader = Arc::new(loader);
        let server = Arc::new(LocalFrameServer::new());
        let connector = Arc::new(FakeConnector::default());
        let sink = MemorySink::default();
        let (reporter, notices) = collecting_reporter();
        let context = SessionContext::new(connector.clone(), sink.journal()).with_reporter(reporter);
        let controller = Arc::new(VisualizationController::new(
            loader.clone(),
            server.clone(),
            context,
        ));
        Harness {
            controller,
            loader,
            server,
            connector,
            sink,
            notices,
        }
    }

    #[test]
    fn submit_activates_and_publishes_one_frame() {
        let h = harness(FakeLoader::new());
        let outcome = h.controller.submit("mol.pdb");

        assert_eq!(outcome, SubmitOutcome::Accepted);
        assert_eq!(
            h.controller.snapshot(),
            SessionSnapshot {
                is_active: true,
                active_path: Some("mol.pdb".to_string())
            }
        );
        assert_eq!(h.server.frames_published(), 1);
        assert_eq!(h.server.latest_frame().unwrap().index, 0);
        assert_eq!(
            h.server.root_selection().interaction_method,
            Some(InteractionMethod::Single)
        );
        assert_eq!(
            *h.notices.lock().unwrap(),
            vec![Notice::Accepted {
                path: "mol.pdb".to_string()
            }]
        );
    }

    #[test]
    fn every_submit_republishes_and_restyles() {
        let h = harness(FakeLoader::new());
        for _ in 0..3 {
            assert!(h.controller.submit("mol.pdb").is_accepted());
        }
        assert!(h.controller.submit("other.pdb").is_accepted());

        assert_eq!(h.loader.calls(), 4);
        assert_eq!(h.server.frames_published(), 4);
        assert_eq!(h.connector.connects(), 4);
        assert_eq!(
            h.controller.snapshot().active_path.as_deref(),
            Some("other.pdb")
        );
    }

    #[test]
    fn parse_failure_leaves_state_unchanged_and_journals_once() {
        let h = harness(FakeLoader::new().failing_on("bad.pdb"));
        h.controller.submit("good.pdb");
        let before = h.controller.snapshot();

        let outcome = h.controller.submit("bad.pdb");

        assert!(matches!(outcome, SubmitOutcome::Failed(_)));
        assert_eq!(h.controller.snapshot(), before);
        assert_eq!(h.server.frames_published(), 1);
        assert_eq!(h.sink.entries().len(), 1);
        assert!(h.sink.entries()[0].contains("Failed to parse structure 'bad.pdb'"));
    }

    #[test]
    fn viewer_failure_publishes_nothing_and_is_journaled() {
        let h = harness(FakeLoader::new());
        h.connector.fail.store(true, Ordering::SeqCst);

        let outcome = h.controller.submit("mol.pdb");

        assert!(matches!(outcome, SubmitOutcome::Failed(_)));
        assert_eq!(h.controller.snapshot(), SessionSnapshot::default());
        assert_eq!(h.server.frames_published(), 0);
        assert_eq!(h.sink.entries().len(), 1);
        assert!(matches!(
            h.notices.lock().unwrap().last(),
            Some(Notice::Failed { .. })
        ));
    }

    #[test]
    fn terminate_is_idempotent_and_closes_server() {
        let h = harness(FakeLoader::new());
        h.controller.submit("mol.pdb");
        h.controller.terminate();
        h.controller.terminate();

        assert!(h.server.is_closed());
        let snapshot = h.controller.snapshot();
        assert!(!snapshot.is_active);
        assert_eq!(snapshot.active_path.as_deref(), Some("mol.pdb"));
        let terminated = h
            .notices
            .lock()
            .unwrap()
            .iter()
            .filter(|n| **n == Notice::Terminated)
            .count();
        assert_eq!(terminated, 1);
    }

    #[test]
    fn submit_after_terminate_fails_with_closed_server() {
        let h = harness(FakeLoader::new());
        h.controller.terminate();

        let outcome = h.controller.submit("mol.pdb");
        assert_eq!(outcome, SubmitOutcome::Failed("Frame server is closed".to_string()));
        assert_eq!(h.sink.entries().len(), 1);
    }

    #[test]
    fn terminate_and_second_submit_return_while_a_load_hangs() {
        let (loader, entered, release) = FakeLoader::new().gated();
        let h = harness(loader);

        let first = {
            let controller = Arc::clone(&h.controller);
            thread::spawn(move || controller.submit("a.pdb"))
        };
        entered.recv().unwrap();

        let (submitted_tx, submitted_rx) = mpsc::channel();
        {
            let controller = Arc::clone(&h.controller);
            thread::spawn(move || submitted_tx.send(controller.submit("b.pdb")).unwrap());
        }
        assert_eq!(
            submitted_rx.recv_timeout(Duration::from_millis(500)),
            Ok(SubmitOutcome::Ignored(IgnoreReason::SessionBusy))
        );

        let (terminated_tx, terminated_rx) = mpsc::channel();
        {
            let controller = Arc::clone(&h.controller);
            thread::spawn(move || {
                controller.terminate();
                terminated_tx.send(()).unwrap();
            });
        }
        assert_eq!(terminated_rx.recv_timeout(Duration::from_millis(500)), Ok(()));

        release.send(()).unwrap();

        assert!(!first.join().unwrap().is_accepted());
        assert_eq!(h.controller.snapshot(), SessionSnapshot::default());
        assert_eq!(h.server.frames_published(), 0);
        assert_eq!(h.loader.calls(), 1);
    }
}
