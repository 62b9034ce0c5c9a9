//! Test doubles for the session collaborators.

use crate::core::forcefield::params::{ForceFieldSpec, SystemOptions};
use crate::core::forcefield::system::{Simulation, SimulationSystem};
use crate::core::io::StructureError;
use crate::core::io::pdb::PdbError;
use crate::core::journal::ErrorJournal;
use crate::core::models::atom::Atom;
use crate::core::models::chain::ChainType;
use crate::core::models::system::MolecularSystem;
use crate::session::collab::{
    FrameServer, Runner, SimulationBackend, StructureLoader, ViewerConnector, ViewerSession,
};
use crate::session::error::CollaboratorError;
use crate::session::{SessionController, SessionSnapshot, SubmitOutcome};
use crate::session::local::{LocalFrameServer, LocalViewerConnector};
use crate::session::notice::{Notice, NoticeReporter};
use nalgebra::Point3;
use std::collections::HashSet;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, mpsc};
use std::thread;
use std::time::{Duration, Instant};

pub fn water_system() -> MolecularSystem {
    let mut system = MolecularSystem::new();
    let chain = system.add_chain('W', ChainType::Water);
    let residue = system.add_residue(chain, 1, "HOH").unwrap();
    system.add_atom(Atom::new(1, "O", residue, Point3::origin()));
    system.add_atom(Atom::new(2, "H1", residue, Point3::new(0.96, 0.0, 0.0)));
    system
}

/// In-memory journal sink that can be inspected after the fact.
#[derive(Clone, Default)]
pub struct MemorySink(Arc<Mutex<Vec<u8>>>);

impl Write for MemorySink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl MemorySink {
    pub fn journal(&self) -> Arc<ErrorJournal> {
        Arc::new(ErrorJournal::from_writer(self.clone()))
    }

    pub fn entries(&self) -> Vec<String> {
        String::from_utf8(self.0.lock().unwrap().clone())
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }
}

/// Collects every notice a controller reports.
pub fn collecting_reporter() -> (NoticeReporter, Arc<Mutex<Vec<Notice>>>) {
    let notices = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&notices);
    let reporter = NoticeReporter::with_callback(Box::new(move |n| sink.lock().unwrap().push(n)));
    (reporter, notices)
}

/// Returns a small water system for any path except those marked failing.
/// Optionally holds its first call until released.
#[derive(Default)]
pub struct FakeLoader {
    pub calls: AtomicUsize,
    failing: Mutex<HashSet<String>>,
    entered: Mutex<Option<mpsc::Sender<()>>>,
    release: Mutex<Option<mpsc::Receiver<()>>>,
}

impl FakeLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(self, path: &str) -> Self {
        self.failing.lock().unwrap().insert(path.to_string());
        self
    }

    /// Makes the first `load` block. The first returned receiver fires when
    /// that call has started; sending on the returned sender lets it finish.
    pub fn gated(self) -> (Self, mpsc::Receiver<()>, mpsc::Sender<()>) {
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        *self.entered.lock().unwrap() = Some(entered_tx);
        *self.release.lock().unwrap() = Some(release_rx);
        (self, entered_rx, release_tx)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl StructureLoader for FakeLoader {
    fn load(&self, path: &str) -> Result<MolecularSystem, CollaboratorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let entered = self.entered.lock().unwrap().take();
        if let Some(entered) = entered {
            entered.send(()).unwrap();
            let release = self.release.lock().unwrap().take();
            if let Some(release) = release {
                release.recv().unwrap();
            }
        }
        if self.failing.lock().unwrap().contains(path) {
            return Err(CollaboratorError::Parse {
                path: path.to_string(),
                source: StructureError::Pdb(PdbError::MissingRecord("ATOM/HETATM".to_string())),
            });
        }
        Ok(water_system())
    }
}

/// Wraps [`LocalViewerConnector`], counting connections and optionally failing.
#[derive(Default)]
pub struct FakeConnector {
    pub connects: AtomicUsize,
    pub fail: AtomicBool,
}

impl FakeConnector {
    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

impl ViewerConnector for FakeConnector {
    fn connect(
        &self,
        server: Arc<dyn FrameServer>,
    ) -> Result<Box<dyn ViewerSession>, CollaboratorError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(CollaboratorError::Viewer("viewer unreachable".to_string()));
        }
        LocalViewerConnector.connect(server)
    }
}

#[derive(Default)]
pub struct FakeBackend {
    pub builds: AtomicUsize,
    pub injections: AtomicUsize,
    pub starts: AtomicUsize,
    pub closes: Arc<AtomicUsize>,
    pub fail_start: AtomicBool,
    pub last_server: Mutex<Option<Arc<LocalFrameServer>>>,
}

impl FakeBackend {
    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

impl SimulationBackend for FakeBackend {
    fn build_system(
        &self,
        topology: &MolecularSystem,
        forcefield: &ForceFieldSpec,
        options: &SystemOptions,
    ) -> Result<SimulationSystem, CollaboratorError> {
        self.builds.fetch_add(1, Ordering::SeqCst);
        Ok(SimulationSystem::from_topology(topology, forcefield, options)?)
    }

    fn inject_interactive_force(
        &self,
        system: &mut SimulationSystem,
    ) -> Result<(), CollaboratorError> {
        self.injections.fetch_add(1, Ordering::SeqCst);
        system.add_interactive_force();
        Ok(())
    }

    fn start_runner(&self, _simulation: Simulation) -> Result<Box<dyn Runner>, CollaboratorError> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        if self.fail_start.load(Ordering::SeqCst) {
            return Err(CollaboratorError::RunnerStart("port in use".to_string()));
        }
        let server = Arc::new(LocalFrameServer::new());
        *self.last_server.lock().unwrap() = Some(Arc::clone(&server));
        Ok(Box::new(FakeRunner {
            server,
            closes: Arc::clone(&self.closes),
            closed: false,
        }))
    }
}

pub struct FakeRunner {
    server: Arc<LocalFrameServer>,
    closes: Arc<AtomicUsize>,
    closed: bool,
}

impl Runner for FakeRunner {
    fn server(&self) -> Arc<dyn FrameServer> {
        self.server.clone()
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.closes.fetch_add(1, Ordering::SeqCst);
            self.server.close();
        }
    }
}

/// Records calls without touching any collaborator.
#[derive(Default)]
pub struct RecordingController {
    submits: Mutex<Vec<String>>,
    pub terminates: AtomicUsize,
}

impl RecordingController {
    pub fn submitted(&self) -> Vec<String> {
        self.submits.lock().unwrap().clone()
    }

    pub fn terminated(&self) -> usize {
        self.terminates.load(Ordering::SeqCst)
    }
}

impl SessionController for RecordingController {
    fn submit(&self, path: &str) -> SubmitOutcome {
        self.submits.lock().unwrap().push(path.to_string());
        SubmitOutcome::Accepted
    }

    fn terminate(&self) {
        self.terminates.fetch_add(1, Ordering::SeqCst);
    }

    fn snapshot(&self) -> SessionSnapshot {
        let submits = self.submits.lock().unwrap();
        SessionSnapshot {
            is_active: !submits.is_empty() && self.terminated() == 0,
            active_path: submits.last().cloned(),
        }
    }
}

/// Polls `condition` for up to two seconds.
pub fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    condition()
}
