use crate::core::frame::FrameData;
use crate::core::rendering::RootSelection;
use crate::session::collab::FrameServer;
use crate::session::error::CollaboratorError;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::watch;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct PublishedFrame {
    pub index: u64,
    pub frame: Arc<FrameData>,
}

/// Keeps the latest frame and the shared root selection in memory.
#[derive(Debug)]
pub struct LocalFrameServer {
    frames: watch::Sender<Option<PublishedFrame>>,
    selection: Mutex<RootSelection>,
    closed: AtomicBool,
    published: AtomicU64,
}

impl Default for LocalFrameServer {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalFrameServer {
    pub fn new() -> Self {
        let (frames, _) = watch::channel(None);
        Self {
            frames,
            selection: Mutex::new(RootSelection::default()),
            closed: AtomicBool::new(false),
            published: AtomicU64::new(0),
        }
    }

    /// A receiver that sees every subsequently published frame (or at least
    /// the latest one, for slow subscribers).
    pub fn subscribe(&self) -> watch::Receiver<Option<PublishedFrame>> {
        self.frames.subscribe()
    }

    pub fn latest_frame(&self) -> Option<PublishedFrame> {
        self.frames.borrow().clone()
    }

    pub fn frames_published(&self) -> u64 {
        self.published.load(Ordering::Acquire)
    }

    fn ensure_open(&self) -> Result<(), CollaboratorError> {
        if self.is_closed() {
            return Err(CollaboratorError::ServerClosed);
        }
        Ok(())
    }
}

impl FrameServer for LocalFrameServer {
    fn publish_frame(&self, index: u64, frame: FrameData) -> Result<(), CollaboratorError> {
        self.ensure_open()?;
        debug!(index = index, particles = frame.particle_count, "Publishing frame");
        self.frames.send_replace(Some(PublishedFrame {
            index,
            frame: Arc::new(frame),
        }));
        self.published.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }

    fn root_selection(&self) -> RootSelection {
        self.selection
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn update_root_selection(&self, selection: RootSelection) -> Result<(), CollaboratorError> {
        self.ensure_open()?;
        *self.selection.lock().unwrap_or_else(PoisonError::into_inner) = selection;
        Ok(())
    }

    fn close(&self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            debug!("Frame server closed");
        }
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rendering::RenderStyle;

    fn frame(particles: usize) -> FrameData {
        FrameData {
            particle_count: particles,
            ..Default::default()
        }
    }

    #[test]
    fn publish_replaces_latest_frame() {
        let server = LocalFrameServer::new();
        assert!(server.latest_frame().is_none());

        server.publish_frame(0, frame(3)).unwrap();
        server.publish_frame(1, frame(5)).unwrap();

        let latest = server.latest_frame().unwrap();
        assert_eq!(latest.index, 1);
        assert_eq!(latest.frame.particle_count, 5);
        assert_eq!(server.frames_published(), 2);
    }

    #[tokio::test]
    async fn subscribers_observe_new_frames() {
        let server = LocalFrameServer::new();
        let mut rx = server.subscribe();

        server.publish_frame(7, frame(1)).unwrap();
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().as_ref().map(|f| f.index), Some(7));
    }

    #[test]
    fn closed_server_rejects_publishing_and_selection_updates() {
        let server = LocalFrameServer::new();
        server.close();
        server.close();

        assert!(server.is_closed());
        assert!(matches!(
            server.publish_frame(0, frame(1)),
            Err(CollaboratorError::ServerClosed)
        ));
        assert!(matches!(
            server.update_root_selection(RootSelection::default()),
            Err(CollaboratorError::ServerClosed)
        ));
        assert_eq!(server.frames_published(), 0);
    }

    #[test]
    fn root_selection_round_trips() {
        let server = LocalFrameServer::new();
        let mut selection = RootSelection::default();
        RenderStyle::single().apply_to(&mut selection);
        server.update_root_selection(selection.clone()).unwrap();
        assert_eq!(server.root_selection(), selection);
    }
}
