use super::collab::{FrameServer, ViewerConnector, modify_root_selection};
use super::error::CollaboratorError;
use super::notice::{Notice, NoticeReporter};
use crate::core::journal::ErrorJournal;
use crate::core::rendering::RenderStyle;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error};

/// Why a submitted path was not acted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// A session is already running.
    SessionBusy,
    /// The path is the one most recently bound.
    SamePath,
    /// `terminate` ran while this submit was still starting the session.
    Cancelled,
}

impl fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IgnoreReason::SessionBusy => f.write_str("a session is already active"),
            IgnoreReason::SamePath => f.write_str("the same structure was already loaded"),
            IgnoreReason::Cancelled => f.write_str("the session was terminated while starting"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Accepted,
    Ignored(IgnoreReason),
    /// A collaborator failed; the message is the journaled error text.
    Failed(String),
}

impl SubmitOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, SubmitOutcome::Accepted)
    }
}

/// Observable controller state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub is_active: bool,
    /// The last successfully bound path. Survives `terminate`.
    pub active_path: Option<String>,
}

/// Owner of the single session resource.
///
/// Implementations guard their state transitions internally, so a controller
/// can be shared between the socket and console producers. Collaborator calls
/// run outside that guard: while one submit is in flight, a second submit is
/// ignored as busy and `terminate` returns at once, cancelling the attempt.
pub trait SessionController: Send + Sync {
    /// Acts on a structure path. Never panics or propagates collaborator
    /// errors; failures are journaled and reported as [`Notice::Failed`].
    fn submit(&self, path: &str) -> SubmitOutcome;

    /// Releases the session resource and forces the inactive state.
    /// Safe to call any number of times.
    fn terminate(&self);

    fn snapshot(&self) -> SessionSnapshot;
}

/// Services shared by both controller variants.
pub struct SessionContext {
    pub connector: Arc<dyn ViewerConnector>,
    pub journal: Arc<ErrorJournal>,
    pub reporter: NoticeReporter,
}

impl SessionContext {
    pub fn new(connector: Arc<dyn ViewerConnector>, journal: Arc<ErrorJournal>) -> Self {
        Self {
            connector,
            journal,
            reporter: NoticeReporter::new(),
        }
    }

    pub fn with_reporter(mut self, reporter: NoticeReporter) -> Self {
        self.reporter = reporter;
        self
    }

    /// Connects a viewer to `server` and writes `style` into the root selection.
    pub(crate) fn apply_render_style(
        &self,
        server: Arc<dyn FrameServer>,
        style: &RenderStyle,
    ) -> Result<(), CollaboratorError> {
        let mut session = self.connector.connect(server)?;
        session.subscribe_multiplayer()?;
        modify_root_selection(session.as_mut(), |selection| style.apply_to(selection))
    }

    pub(crate) fn report_ignored(&self, path: &str, reason: IgnoreReason) -> SubmitOutcome {
        debug!(%path, %reason, "Submit ignored");
        self.reporter.report(Notice::Ignored {
            path: path.to_string(),
            reason,
        });
        SubmitOutcome::Ignored(reason)
    }

    /// Journals a failed submit exactly once and tells the user about it.
    pub(crate) fn record_failure(&self, path: &str, err: &CollaboratorError) -> SubmitOutcome {
        error!(path = %path, "Submit failed: {}", err);
        self.journal.record(err);
        let message = err.to_string();
        self.reporter.report(Notice::Failed {
            path: path.to_string(),
            message: message.clone(),
        });
        SubmitOutcome::Failed(message)
    }
}

impl fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionContext")
            .field("journal", &self.journal)
            .field("reporter", &self.reporter)
            .finish_non_exhaustive()
    }
}
