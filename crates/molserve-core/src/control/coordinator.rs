use super::shutdown::ShutdownFlag;
use super::socket::SocketHandle;
use crate::session::SessionController;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::info;

/// Waits for the shutdown flag, then stops the socket producer and
/// terminates the session. Runs once per process.
pub struct ShutdownCoordinator {
    flag: ShutdownFlag,
    poll_interval: Duration,
    socket: Option<SocketHandle>,
    controller: Arc<dyn SessionController>,
}

impl ShutdownCoordinator {
    pub fn new(
        flag: ShutdownFlag,
        poll_interval: Duration,
        controller: Arc<dyn SessionController>,
    ) -> Self {
        Self {
            flag,
            poll_interval,
            socket: None,
            controller,
        }
    }

    pub fn with_socket(mut self, socket: SocketHandle) -> Self {
        self.socket = Some(socket);
        self
    }

    /// Blocks the calling thread until shutdown has been carried out.
    pub fn run(self) {
        while !self.flag.is_set() {
            thread::sleep(self.poll_interval);
        }
        info!("Shutdown flag observed, stopping");
        if let Some(socket) = &self.socket {
            socket.shutdown();
        }
        self.controller.terminate();
        info!("Shutdown complete");
    }
}
