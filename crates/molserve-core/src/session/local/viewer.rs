use crate::core::rendering::RootSelection;
use crate::session::collab::{FrameServer, ViewerConnector, ViewerSession};
use crate::session::error::CollaboratorError;
use std::sync::Arc;

/// Connects viewer sessions directly to an in-process frame server.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalViewerConnector;

impl ViewerConnector for LocalViewerConnector {
    fn connect(
        &self,
        server: Arc<dyn FrameServer>,
    ) -> Result<Box<dyn ViewerSession>, CollaboratorError> {
        if server.is_closed() {
            return Err(CollaboratorError::ServerClosed);
        }
        Ok(Box::new(LocalViewerSession::new(server)))
    }
}

pub struct LocalViewerSession {
    server: Arc<dyn FrameServer>,
    subscribed: bool,
}

impl LocalViewerSession {
    pub fn new(server: Arc<dyn FrameServer>) -> Self {
        Self {
            server,
            subscribed: false,
        }
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscribed
    }
}

impl ViewerSession for LocalViewerSession {
    fn subscribe_multiplayer(&mut self) -> Result<(), CollaboratorError> {
        if self.server.is_closed() {
            return Err(CollaboratorError::ServerClosed);
        }
        self.subscribed = true;
        Ok(())
    }

    fn root_selection(&self) -> RootSelection {
        self.server.root_selection()
    }

    // Shared state is only writable once subscribed to multiplayer.
    fn commit_root_selection(&mut self, selection: RootSelection) -> Result<(), CollaboratorError> {
        if !self.subscribed {
            return Err(CollaboratorError::Viewer(
                "not subscribed to multiplayer updates".to_string(),
            ));
        }
        self.server.update_root_selection(selection)
    }
}
