use std::fs::OpenOptions;
use std::io;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow, bail};
use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use dockhand::app::{App, Command, DaemonStatus};
use dockhand::config::{self, Config};
use dockhand::docker::{ContainerRuntime, DockerCli};
use dockhand::services::NotificationLevel;
use dockhand::ui;

type Term = Terminal<CrosstermBackend<io::Stdout>>;

const POLL_TIMEOUT: Duration = Duration::from_millis(200);
const SPINNER_INTERVAL: Duration = Duration::from_millis(80);

#[tokio::main]
async fn main() -> Result<()> {
    let cwd = std::env::current_dir().context("cannot determine the current directory")?;
    let config = config::load(&cwd).context("failed to load configuration")?;
    init_tracing(&config)?;
    info!(version = env!("CARGO_PKG_VERSION"), "starting dockhand");

    let cli = DockerCli::from_config(&config);
    let daemon = match cli.check_daemon().await {
        Ok(version) => DaemonStatus::Available(version),
        Err(e) => {
            if e.is_unavailable() && !cli.is_installed().await {
                bail!("`{}` is not installed or not on PATH", cli.binary());
            }
            warn!(error = %e, "container runtime unavailable at startup");
            DaemonStatus::Unavailable(e.to_string())
        }
    };

    let mut app = App::new(Arc::new(cli), config);
    if let DaemonStatus::Unavailable(reason) = &daemon {
        app.notify(
            NotificationLevel::Error,
            format!("{reason}. Press R to retry."),
        );
    }
    app.daemon = daemon;

    // Ensure terminal is restored on panic.
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = restore_terminal();
        original_hook(info);
    }));

    let mut terminal = setup_terminal()?;
    let result = run(&mut terminal, &mut app).await;
    restore_terminal()?;
    info!("exiting");
    result
}

/// Stdout belongs to the UI, so events go to the configured file or nowhere.
fn init_tracing(config: &Config) -> Result<()> {
    let filter = EnvFilter::try_from_env("DOCKHAND_LOG")
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .or_else(|_| EnvFilter::try_new("info"))
        .context("failed to initialize tracing filter")?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false);

    let installed = match &config.log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("cannot open log file {}", path.display()))?;
            builder.with_writer(Mutex::new(file)).try_init()
        }
        None => builder.with_writer(io::sink).try_init(),
    };
    installed
        .map_err(|e| anyhow!(e))
        .context("failed to install tracing subscriber")
}

fn setup_terminal() -> Result<Term> {
    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn restore_terminal() -> Result<()> {
    terminal::disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen)?;
    Ok(())
}

async fn run(terminal: &mut Term, app: &mut App) -> Result<()> {
    let mut tick: u64 = 0;
    let mut pending: Option<Command> = None;

    while app.running {
        terminal.draw(|frame| ui::draw(frame, app, tick))?;

        let cmd = match pending.take() {
            Some(cmd) => Some(cmd),
            None => {
                if event::poll(POLL_TIMEOUT)?
                    && let Event::Key(key) = event::read()?
                {
                    app.handle_key(key)
                } else {
                    None
                }
            }
        };

        if let Some(cmd) = cmd {
            pending = execute_with_redraw(terminal, app, cmd, &mut tick).await?;
        }
        if pending.is_none() {
            pending = app.tick(Instant::now());
        }
        tick = tick.wrapping_add(1);
    }

    Ok(())
}

/// Await `cmd`, redrawing the spinner from a shared borrow until the
/// outcome is in, then apply it.
async fn execute_with_redraw(
    terminal: &mut Term,
    app: &mut App,
    cmd: Command,
    tick: &mut u64,
) -> Result<Option<Command>> {
    let outcome = {
        let view: &App = app;
        let work = view.execute(cmd);
        tokio::pin!(work);
        let mut spinner = tokio::time::interval(SPINNER_INTERVAL);

        loop {
            tokio::select! {
                outcome = &mut work => break outcome,
                _ = spinner.tick() => {
                    *tick = tick.wrapping_add(1);
                    terminal.draw(|frame| ui::draw(frame, view, *tick))?;
                }
            }
        }
    };
    Ok(app.apply(outcome))
}
