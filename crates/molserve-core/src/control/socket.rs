use super::command::{Command, DEFAULT_QUIT_TOKEN, strip_line_terminator};
use super::error::GatewayError;
use super::shutdown::ShutdownFlag;
use crate::core::journal::ErrorJournal;
use crate::session::SessionController;
use std::io::{self, BufRead, BufReader};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocketConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound on waiting for a client's line. `None` waits forever.
    pub read_timeout: Option<Duration>,
    /// Sleep between accept attempts while no client is waiting.
    pub accept_poll: Duration,
    pub quit_token: String,
}

impl Default for SocketConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 7777,
            read_timeout: Some(Duration::from_secs(10)),
            accept_poll: Duration::from_millis(50),
            quit_token: DEFAULT_QUIT_TOKEN.to_string(),
        }
    }
}

/// Stops a running [`SocketProducer`] from another thread.
#[derive(Debug, Clone)]
pub struct SocketHandle {
    stop: Arc<AtomicBool>,
}

impl SocketHandle {
    /// Makes the accept loop exit at its next poll. Idempotent.
    pub fn shutdown(&self) {
        self.stop.store(true, Ordering::Release);
    }

    pub fn is_shutdown(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }
}

/// Accepts one connection at a time and reads one command line from each.
pub struct SocketProducer {
    listener: TcpListener,
    config: SocketConfig,
    flag: ShutdownFlag,
    controller: Arc<dyn SessionController>,
    journal: Arc<ErrorJournal>,
    stop: Arc<AtomicBool>,
}

impl SocketProducer {
    pub fn bind(
        config: SocketConfig,
        flag: ShutdownFlag,
        controller: Arc<dyn SessionController>,
        journal: Arc<ErrorJournal>,
    ) -> Result<Self, GatewayError> {
        let addr = format!("{}:{}", config.host, config.port);
        let bind_err = |source| GatewayError::Bind {
            addr: addr.clone(),
            source,
        };
        let listener = TcpListener::bind((config.host.as_str(), config.port)).map_err(bind_err)?;
        // Accept must not block, or the stop flag is never observed while idle.
        listener.set_nonblocking(true).map_err(bind_err)?;

        Ok(Self {
            listener,
            config,
            flag,
            controller,
            journal,
            stop: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn handle(&self) -> SocketHandle {
        SocketHandle {
            stop: Arc::clone(&self.stop),
        }
    }

    /// Runs the accept loop on the calling thread until [`SocketHandle::shutdown`].
    ///
    /// A failing connection is journaled and dropped; the loop keeps accepting.
    pub fn serve(self) {
        if let Ok(addr) = self.local_addr() {
            info!(%addr, "Listening for commands");
        }
        while !self.stop.load(Ordering::Acquire) {
            match self.listener.accept() {
                Ok((stream, peer)) => {
                    debug!(%peer, "Command client connected");
                    if let Err(e) = self.handle_connection(stream) {
                        warn!(%peer, "Command connection failed: {}", e);
                        self.journal.record(&e);
                    }
                }
                Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => {
                    thread::sleep(self.config.accept_poll);
                }
                Err(e) => {
                    warn!("Error accepting command client: {}", e);
                    thread::sleep(self.config.accept_poll);
                }
            }
        }
        info!("Command listener stopped");
    }

    fn handle_connection(&self, stream: TcpStream) -> Result<(), GatewayError> {
        stream.set_nonblocking(false)?;
        stream.set_read_timeout(self.config.read_timeout)?;

        let mut raw = Vec::new();
        BufReader::new(stream).read_until(b'\n', &mut raw)?;
        let line = String::from_utf8(raw)?;

        match Command::parse(strip_line_terminator(&line), &self.config.quit_token) {
            Command::Quit => {
                if self.flag.set() {
                    info!("Shutdown requested over socket");
                }
            }
            Command::Empty => {}
            Command::Load(path) => {
                self.controller.submit(&path);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionContext;
    use crate::session::collab::FileStructureLoader;
    use crate::session::local::{LocalFrameServer, LocalViewerConnector};
    use crate::session::visual::VisualizationController;
    use crate::testing::{MemorySink, RecordingController, wait_until};
    use std::fs;
    use std::io::Write;
    use std::net::Shutdown;
    use std::thread::JoinHandle;

    struct Running {
        addr: SocketAddr,
        handle: SocketHandle,
        worker: JoinHandle<()>,
        flag: ShutdownFlag,
        controller: Arc<RecordingController>,
        sink: MemorySink,
    }

    fn loopback_config() -> SocketConfig {
        SocketConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            read_timeout: Some(Duration::from_secs(2)),
            accept_poll: Duration::from_millis(5),
            ..Default::default()
        }
    }

    fn start() -> Running {
        let config = loopback_config();
        let flag = ShutdownFlag::new();
        let controller = Arc::new(RecordingController::default());
        let sink = MemorySink::default();
        let producer =
            SocketProducer::bind(config, flag.clone(), controller.clone(), sink.journal()).unwrap();
        let addr = producer.local_addr().unwrap();
        let handle = producer.handle();
        let worker = thread::spawn(move || producer.serve());
        Running {
            addr,
            handle,
            worker,
            flag,
            controller,
            sink,
        }
    }

    fn send(addr: SocketAddr, bytes: &[u8]) {
        let mut stream = TcpStream::connect(addr).unwrap();
        stream.write_all(bytes).unwrap();
        stream.shutdown(Shutdown::Write).unwrap();
    }

    fn stop(running: Running) {
        running.handle.shutdown();
        running.worker.join().unwrap();
    }

    #[test]
    fn line_is_submitted_without_terminator() {
        let running = start();
        send(running.addr, b"mol.pdb\n");

        assert!(wait_until(|| running.controller.submitted().len() == 1));
        assert_eq!(running.controller.submitted(), vec!["mol.pdb"]);
        assert!(running.sink.entries().is_empty());
        stop(running);
    }

    #[test]
    fn only_the_first_line_of_a_connection_is_read() {
        let running = start();
        send(running.addr, b"a.pdb\r\nb.pdb\n");
        send(running.addr, b"c.pdb");

        assert!(wait_until(|| running.controller.submitted().len() == 2));
        assert_eq!(running.controller.submitted(), vec!["a.pdb", "c.pdb"]);
        stop(running);
    }

    #[test]
    fn quit_token_sets_flag_without_submitting() {
        let running = start();
        send(running.addr, b"q\n");
        send(running.addr, b"q\n");

        assert!(wait_until(|| running.flag.is_set()));
        assert!(running.controller.submitted().is_empty());
        stop(running);
    }

    #[test]
    fn empty_line_and_silent_client_are_no_ops() {
        let running = start();
        send(running.addr, b"\n");
        send(running.addr, b"");
        send(running.addr, b"after.pdb\n");

        assert!(wait_until(|| running.controller.submitted().len() == 1));
        assert_eq!(running.controller.submitted(), vec!["after.pdb"]);
        assert!(running.sink.entries().is_empty());
        assert!(!running.flag.is_set());
        stop(running);
    }

    #[test]
    fn bad_connection_is_journaled_and_listener_survives() {
        let running = start();
        send(running.addr, &[0xff, 0xfe, b'\n']);
        send(running.addr, b"next.pdb\n");

        assert!(wait_until(|| running.controller.submitted().len() == 1));
        let entries = running.sink.entries();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].contains("not valid UTF-8"));
        stop(running);
    }

    #[test]
    fn shutdown_stops_accept_loop() {
        let running = start();
        running.handle.shutdown();
        assert!(running.handle.is_shutdown());
        running.worker.join().unwrap();
    }

    #[test]
    fn bind_failure_names_the_address() {
        let taken = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = taken.local_addr().unwrap().port();
        let config = SocketConfig {
            host: "127.0.0.1".to_string(),
            port,
            ..Default::default()
        };
        let result = SocketProducer::bind(
            config,
            ShutdownFlag::new(),
            Arc::new(RecordingController::default()),
            Arc::new(ErrorJournal::disabled()),
        );
        match result {
            Err(GatewayError::Bind { addr, .. }) => assert_eq!(addr, format!("127.0.0.1:{port}")),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("second bind on the same port succeeded"),
        }
    }

    #[test]
    fn socket_line_publishes_structure_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mol.pdb");
        fs::write(
            &path,
            "HETATM    1  O   HOH A   1       0.000   0.000   0.000  1.00  0.00           O\nEND\n",
        )
        .unwrap();
        let path = path.to_string_lossy().into_owned();

        let server = Arc::new(LocalFrameServer::new());
        let sink = MemorySink::default();
        let context = SessionContext::new(Arc::new(LocalViewerConnector), sink.journal());
        let controller = Arc::new(VisualizationController::new(
            Arc::new(FileStructureLoader),
            server.clone(),
            context,
        ));
        let producer = SocketProducer::bind(
            loopback_config(),
            ShutdownFlag::new(),
            controller.clone(),
            sink.journal(),
        )
        .unwrap();
        let addr = producer.local_addr().unwrap();
        let handle = producer.handle();
        let worker = thread::spawn(move || producer.serve());

        send(addr, format!("{path}\n").as_bytes());

        assert!(wait_until(|| controller.snapshot().is_active));
        assert_eq!(controller.snapshot().active_path.as_deref(), Some(path.as_str()));
        assert_eq!(server.frames_published(), 1);
        assert!(sink.entries().is_empty());

        handle.shutdown();
        worker.join().unwrap();
    }
}
