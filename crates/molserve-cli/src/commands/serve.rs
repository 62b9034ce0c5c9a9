use crate::cli::ServeArgs;
use crate::config::{AppConfig, SessionMode, build_config};
use crate::error::{CliError, Result};
use crate::ui::{CliNoticeHandler, UiEvent};
use molserve::control::{
    ConsoleExit, ConsoleProducer, ShutdownCoordinator, ShutdownFlag, SocketProducer,
};
use molserve::core::journal::ErrorJournal;
use molserve::session::collab::{FileStructureLoader, StructureLoader};
use molserve::session::local::{LocalFrameServer, LocalSimulationBackend, LocalViewerConnector};
use molserve::session::simulation::SimulationController;
use molserve::session::visual::VisualizationController;
use molserve::session::{NoticeReporter, SessionContext, SessionController};
use std::sync::Arc;
use tokio::io::BufReader;
use tokio::sync::mpsc;
use tokio::task::{self, JoinError};
use tracing::{debug, info, warn};

pub async fn run(args: ServeArgs, ui_sender: mpsc::Sender<UiEvent>) -> Result<()> {
    info!("Building configuration for 'serve'.");
    let config = build_config(&args)?;
    debug!("Resolved configuration: {:?}", config);

    ui_sender
        .send(UiEvent::SetPrompt(config.console.prompt.clone()))
        .await
        .ok();

    let journal = Arc::new(ErrorJournal::create_in(&config.journal_dir)?);
    if let Some(path) = journal.path() {
        info!("Error journal: {}", path.display());
    }

    let reporter =
        NoticeReporter::with_callback(CliNoticeHandler::new(ui_sender.clone()).get_callback());
    let context = SessionContext::new(Arc::new(LocalViewerConnector), Arc::clone(&journal))
        .with_reporter(reporter);
    let controller = build_controller(&config, context);

    let flag = ShutdownFlag::new();
    let socket = SocketProducer::bind(
        config.socket.clone(),
        flag.clone(),
        Arc::clone(&controller),
        Arc::clone(&journal),
    )?;
    let coordinator =
        ShutdownCoordinator::new(flag.clone(), config.shutdown_poll, Arc::clone(&controller))
            .with_socket(socket.handle());

    let socket_task = task::spawn_blocking(move || socket.serve());
    let coordinator_task = task::spawn_blocking(move || coordinator.run());
    let signal_task = task::spawn(watch_interrupt(flag.clone()));

    let console_task = config.console_enabled.then(|| {
        let console = ConsoleProducer::new(
            BufReader::new(tokio::io::stdin()),
            tokio::io::stdout(),
            config.console.clone(),
            flag.clone(),
            Arc::clone(&controller),
        );
        task::spawn(console.run())
    });

    coordinator_task.await.map_err(join_error("shutdown coordinator"))?;

    match console_task {
        Some(console_task) => {
            ui_sender.send(UiEvent::ShutdownComplete).await.ok();
            match console_task.await.map_err(join_error("console"))? {
                Ok(ConsoleExit::EndOfInput) => debug!("Console input closed before shutdown."),
                Ok(exit) => debug!("Console exited: {:?}", exit),
                Err(e) => warn!("Console stopped with an error: {}", e),
            }
        }
        None => {
            ui_sender
                .send(UiEvent::Log("Server shut down.".to_string()))
                .await
                .ok();
        }
    }

    socket_task.await.map_err(join_error("socket listener"))?;
    signal_task.abort();

    Ok(())
}

fn build_controller(config: &AppConfig, context: SessionContext) -> Arc<dyn SessionController> {
    let loader: Arc<dyn StructureLoader> = Arc::new(FileStructureLoader);
    match config.mode {
        SessionMode::Visual => {
            info!("Starting in visualization mode.");
            Arc::new(VisualizationController::new(
                loader,
                Arc::new(LocalFrameServer::new()),
                context,
            ))
        }
        SessionMode::Simulation => {
            info!("Starting in simulation mode.");
            let backend = LocalSimulationBackend::new(config.simulation.frame_interval);
            Arc::new(SimulationController::new(
                loader,
                Arc::new(backend),
                config.simulation.clone(),
                context,
            ))
        }
    }
}

async fn watch_interrupt(flag: ShutdownFlag) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            info!("Interrupt received, shutting down.");
            flag.set();
        }
        Err(e) => warn!("Unable to listen for interrupt signal: {}", e),
    }
}

fn join_error(task: &'static str) -> impl Fn(JoinError) -> CliError {
    move |e| CliError::Other(anyhow::anyhow!("{} task failed: {}", task, e))
}
