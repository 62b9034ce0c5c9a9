use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use molserve::session::{IgnoreReason, Notice, NoticeCallback};
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::warn;

pub const SHUTDOWN_NOTICE: &str = "Server shut down, press Enter to continue";

#[derive(Debug)]
pub enum UiEvent {
    Notice(Notice),
    SetPrompt(String),
    ShutdownComplete,
    Log(String),
}

/// Renders notices from every producer onto the console.
///
/// Messages start with `\r` so they overwrite a pending prompt, and are
/// followed by the prompt again since the user may be mid-way through typing.
pub struct UiManager {
    mp: Arc<MultiProgress>,
    out: Box<dyn Write + Send>,
    prompt: String,
    spinner: Option<ProgressBar>,
    event_receiver: mpsc::Receiver<UiEvent>,
    shutdown_receiver: watch::Receiver<bool>,
}

impl UiManager {
    pub fn new(prompt: &str) -> (Self, mpsc::Sender<UiEvent>, watch::Sender<bool>) {
        let (event_sender, event_receiver) = mpsc::channel(1024);
        let (shutdown_sender, shutdown_receiver) = watch::channel(false);
        let mp = Arc::new(MultiProgress::new());
        mp.set_draw_target(ProgressDrawTarget::stderr_with_hz(12));
        let manager = Self {
            mp,
            out: Box::new(io::stdout()),
            prompt: prompt.to_string(),
            spinner: None,
            event_receiver,
            shutdown_receiver,
        };

        (manager, event_sender, shutdown_sender)
    }

    pub async fn run(mut self) {
        loop {
            tokio::select! {
                Some(event) = self.event_receiver.recv() => {
                    self.handle_event(event);
                }
                result = self.shutdown_receiver.changed() => {
                    if result.is_err() || *self.shutdown_receiver.borrow() {
                        break;
                    }
                }
            }
        }
        while let Ok(event) = self.event_receiver.try_recv() {
            self.handle_event(event);
        }
        self.clear_spinner();
    }

    fn handle_event(&mut self, event: UiEvent) {
        match event {
            UiEvent::Notice(notice) => self.handle_notice(notice),
            UiEvent::SetPrompt(prompt) => self.prompt = prompt,
            UiEvent::ShutdownComplete => {
                self.clear_spinner();
                self.write(&format!("\r{}", SHUTDOWN_NOTICE));
            }
            UiEvent::Log(msg) => {
                self.mp.println(msg).ok();
            }
        }
    }

    fn handle_notice(&mut self, notice: Notice) {
        match notice {
            Notice::Starting { path } => {
                self.clear_spinner();
                let pb = self.mp.add(ProgressBar::new_spinner());
                pb.enable_steady_tick(Duration::from_millis(80));
                pb.set_style(Self::spinner_style());
                pb.set_message(format!("Starting session for {}", path));
                self.spinner = Some(pb);
            }
            Notice::Accepted { path } => {
                self.clear_spinner();
                self.announce(&format!("Accepted {}", path));
            }
            Notice::Ignored { path, reason } => {
                if reason == IgnoreReason::Cancelled {
                    self.clear_spinner();
                }
                self.announce(&format!("Ignored {}: {}", path, reason));
            }
            Notice::Failed { message, .. } => {
                self.clear_spinner();
                self.announce(&message);
            }
            Notice::Terminated => self.clear_spinner(),
        }
    }

    fn announce(&mut self, message: &str) {
        let line = format!("\r{}\n{}", message, self.prompt);
        self.write(&line);
    }

    fn write(&mut self, text: &str) {
        if let Err(e) = self
            .out
            .write_all(text.as_bytes())
            .and_then(|_| self.out.flush())
        {
            warn!("Failed to write to console: {}", e);
        }
    }

    fn clear_spinner(&mut self) {
        if let Some(bar) = self.spinner.take() {
            bar.finish_and_clear();
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
    }
}

/// Bridges controller notices into the UI channel.
#[derive(Clone)]
pub struct CliNoticeHandler {
    sender: mpsc::Sender<UiEvent>,
}

impl CliNoticeHandler {
    pub fn new(sender: mpsc::Sender<UiEvent>) -> Self {
        Self { sender }
    }

    pub fn get_callback(&self) -> NoticeCallback {
        let sender = self.sender.clone();
        Box::new(move |notice: Notice| {
            if let Err(e) = sender.try_send(UiEvent::Notice(notice)) {
                warn!("Failed to send notice to UI channel: {}", e);
            }
        })
    }
}
