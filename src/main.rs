//! Pomodoro Daemon - A state-managed Pomodoro timer
//!
//! This is the main entry point: `serve` runs the state controller, every
//! other subcommand acts as the popup against a running daemon.

use std::{pin::pin, sync::Arc};
use futures::StreamExt;
use tokio::net::TcpListener;
use tracing::info;

use pomodoro_daemon::{
    api::create_router,
    client::HttpTransport,
    config::{Command, Config},
    services::{DesktopIndicator, Indicator, JsonFileStore, LogIndicator},
    state::AppState,
    tasks::{completion_alarm_task, ticker_task},
    ui::{PopupController, UserAction},
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "pomodoro_daemon={},pomodoro={},tower_http=info",
            config.log_level(),
            config.log_level()
        ))
        .init();

    match config.command.clone() {
        None | Some(Command::Serve) => serve(&config).await,
        Some(command) => run_popup(&config, command).await,
    }
}

async fn serve(config: &Config) -> anyhow::Result<()> {
    info!("Starting pomodoro daemon v{}", env!("CARGO_PKG_VERSION"));

    let store = Arc::new(JsonFileStore::new(config.state_file()));
    info!("Configuration: host={}, port={}, state={}",
          config.host, config.port, store.path().display());

    let indicator: Arc<dyn Indicator> = if config.desktop_notifications {
        if DesktopIndicator::is_available() {
            Arc::new(DesktopIndicator::new())
        } else {
            tracing::warn!("notify-send is not available, notifications go to the log");
            Arc::new(LogIndicator::new())
        }
    } else {
        Arc::new(LogIndicator::new())
    };

    // Restore (or reset) the timer before anything can message it
    let state = Arc::new(AppState::restore(store, indicator));

    tokio::spawn(ticker_task(Arc::clone(&state)));
    tokio::spawn(completion_alarm_task(Arc::clone(&state)));

    let app = create_router(Arc::clone(&state));

    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /message - Send a timer message (startTimer, pauseTimer, ...)");
    info!("  GET  /state   - Current timer state");
    info!("  GET  /events  - Stream of timerUpdated broadcasts");
    info!("  GET  /health  - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    info!("Server shutdown complete");
    Ok(())
}

async fn run_popup(config: &Config, command: Command) -> anyhow::Result<()> {
    let transport = HttpTransport::new(config.base_url());
    let mut popup = PopupController::new(transport.clone());

    let action = match command {
        Command::Serve | Command::Status => None,
        Command::Start { task } => {
            // Like the popup's start button: send whatever the task field shows.
            let task_input = match task {
                Some(task) => task,
                None => popup.load().await?.task_input.clone(),
            };
            Some(UserAction::Start { task_input })
        }
        Command::Pause => Some(UserAction::Pause),
        Command::Reset => Some(UserAction::Reset),
        Command::Task { name } => Some(UserAction::EditTask(name)),
        Command::Mode { mode } => Some(UserAction::SetMode(mode)),
        Command::Sound { enabled } => Some(UserAction::SetSound(enabled)),
        Command::Watch => {
            println!("{}", popup.load().await?);
            let mut updates = pin!(transport.subscribe().await?);
            while let Some(update) = updates.next().await {
                println!("{}", popup.apply(&update));
            }
            info!("Daemon closed the event stream");
            return Ok(());
        }
    };

    let view = match action {
        Some(action) => popup.dispatch(action).await?,
        None => popup.load().await?,
    };
    println!("{}", view);
    Ok(())
}
