use super::command::{Command, DEFAULT_QUIT_TOKEN, strip_line_terminator};
use super::error::GatewayError;
use super::shutdown::ShutdownFlag;
use crate::session::SessionController;
use std::io;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleConfig {
    pub prompt: String,
    pub quit_token: String,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            prompt: ">>> ".to_string(),
            quit_token: DEFAULT_QUIT_TOKEN.to_string(),
        }
    }
}

/// How the console loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleExit {
    /// The quit token was entered here.
    Quit,
    /// Another producer requested shutdown.
    Shutdown,
    /// Input was closed.
    EndOfInput,
}

/// Interactive command loop.
///
/// The loop suspends only while awaiting a line. The shutdown flag is
/// checked before every read, so a shutdown requested elsewhere is observed
/// after the next line arrives; a pending read is never interrupted.
///
/// After a command is dispatched the prompt is not reprinted here: the
/// notice produced by the controller is expected to re-issue it.
pub struct ConsoleProducer<R, W> {
    input: R,
    output: W,
    config: ConsoleConfig,
    flag: ShutdownFlag,
    controller: Arc<dyn SessionController>,
}

impl<R, W> ConsoleProducer<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(
        input: R,
        output: W,
        config: ConsoleConfig,
        flag: ShutdownFlag,
        controller: Arc<dyn SessionController>,
    ) -> Self {
        Self {
            input,
            output,
            config,
            flag,
            controller,
        }
    }

    pub async fn run(mut self) -> Result<ConsoleExit, GatewayError> {
        self.prompt().await?;
        let mut line = String::new();

        while !self.flag.is_set() {
            line.clear();
            let read = match self.input.read_line(&mut line).await {
                Ok(read) => read,
                Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                    self.write_line("input is not valid UTF-8").await?;
                    self.prompt().await?;
                    continue;
                }
                Err(e) => return Err(GatewayError::Console(e)),
            };
            if read == 0 {
                debug!("Console input closed");
                return Ok(ConsoleExit::EndOfInput);
            }

            match Command::parse(strip_line_terminator(&line), &self.config.quit_token) {
                Command::Quit => {
                    if self.flag.set() {
                        info!("Shutdown requested from console");
                    }
                    return Ok(ConsoleExit::Quit);
                }
                Command::Empty => self.prompt().await?,
                Command::Load(path) => {
                    if !is_file(&path).await {
                        self.write_line(&format!("{path} is not a file")).await?;
                        self.prompt().await?;
                        continue;
                    }
                    let controller = Arc::clone(&self.controller);
                    tokio::task::spawn_blocking(move || controller.submit(&path))
                        .await
                        .map_err(|e| GatewayError::Dispatch(e.to_string()))?;
                }
            }
        }

        Ok(ConsoleExit::Shutdown)
    }

    async fn prompt(&mut self) -> Result<(), GatewayError> {
        self.output
            .write_all(self.config.prompt.as_bytes())
            .await
            .map_err(GatewayError::Console)?;
        self.output.flush().await.map_err(GatewayError::Console)
    }

    async fn write_line(&mut self, text: &str) -> Result<(), GatewayError> {
        let line = format!("{text}\n");
        self.output
            .write_all(line.as_bytes())
            .await
            .map_err(GatewayError::Console)?;
        self.output.flush().await.map_err(GatewayError::Console)
    }
}

async fn is_file(path: &str) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|meta| meta.is_file())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingController;
    use std::fs;
    use tempfile::{TempDir, tempdir};
    use tokio::io::BufReader;

    fn structure_file(dir: &TempDir, name: &str) -> String {
        let path = dir.path().join(name);
        fs::write(&path, "END\n").unwrap();
        path.to_str().unwrap().to_string()
    }

    async fn run_console(
        input: &str,
        flag: ShutdownFlag,
        controller: Arc<RecordingController>,
    ) -> (ConsoleExit, String) {
        let mut output = Vec::new();
        let producer = ConsoleProducer::new(
            BufReader::new(input.as_bytes()),
            &mut output,
            ConsoleConfig::default(),
            flag,
            controller,
        );
        let exit = producer.run().await.unwrap();
        (exit, String::from_utf8(output).unwrap())
    }

    #[tokio::test]
    async fn existing_file_is_submitted() {
        let dir = tempdir().unwrap();
        let path = structure_file(&dir, "mol.pdb");
        let controller = Arc::new(RecordingController::default());

        let (exit, output) =
            run_console(&format!("{path}\n"), ShutdownFlag::new(), controller.clone()).await;

        assert_eq!(exit, ConsoleExit::EndOfInput);
        assert_eq!(controller.submitted(), vec![path]);
        assert_eq!(output, ">>> ");
    }

    #[tokio::test]
    async fn missing_file_prints_diagnostic_and_reprompts() {
        let controller = Arc::new(RecordingController::default());

        let (exit, output) =
            run_console("missing.pdb\n", ShutdownFlag::new(), controller.clone()).await;

        assert_eq!(exit, ConsoleExit::EndOfInput);
        assert!(controller.submitted().is_empty());
        assert_eq!(output, ">>> missing.pdb is not a file\n>>> ");
    }

    #[tokio::test]
    async fn directory_is_not_a_file() {
        let dir = tempdir().unwrap();
        let controller = Arc::new(RecordingController::default());
        let input = format!("{}\n", dir.path().display());

        run_console(&input, ShutdownFlag::new(), controller.clone()).await;

        assert!(controller.submitted().is_empty());
    }

    #[tokio::test]
    async fn empty_lines_only_reprompt() {
        let controller = Arc::new(RecordingController::default());

        let (_, output) = run_console("\n\r\n", ShutdownFlag::new(), controller.clone()).await;

        assert!(controller.submitted().is_empty());
        assert_eq!(output, ">>> >>> >>> ");
    }

    #[tokio::test]
    async fn quit_token_sets_flag_and_stops_reading() {
        let dir = tempdir().unwrap();
        let path = structure_file(&dir, "mol.pdb");
        let flag = ShutdownFlag::new();
        let controller = Arc::new(RecordingController::default());

        let (exit, _) = run_console(&format!("q\n{path}\n"), flag.clone(), controller.clone()).await;

        assert_eq!(exit, ConsoleExit::Quit);
        assert!(flag.is_set());
        assert!(controller.submitted().is_empty());
    }

    #[tokio::test]
    async fn preset_flag_ends_loop_before_reading() {
        let dir = tempdir().unwrap();
        let path = structure_file(&dir, "mol.pdb");
        let flag = ShutdownFlag::new();
        flag.set();
        let controller = Arc::new(RecordingController::default());

        let (exit, _) = run_console(&format!("{path}\n"), flag, controller.clone()).await;

        assert_eq!(exit, ConsoleExit::Shutdown);
        assert!(controller.submitted().is_empty());
    }

    #[tokio::test]
    async fn invalid_utf8_is_reported_and_loop_continues() {
        let controller = Arc::new(RecordingController::default());
        let mut output = Vec::new();
        let input: &[u8] = b"\xff\xfe\nmissing.pdb\n";
        let producer = ConsoleProducer::new(
            BufReader::new(input),
            &mut output,
            ConsoleConfig::default(),
            ShutdownFlag::new(),
            controller.clone(),
        );

        let exit = producer.run().await.unwrap();

        assert_eq!(exit, ConsoleExit::EndOfInput);
        let output = String::from_utf8(output).unwrap();
        assert!(output.contains("input is not valid UTF-8"));
        assert!(output.contains("missing.pdb is not a file"));
    }
}
