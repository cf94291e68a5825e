use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, EventStream},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{io, time::Duration};
use tokio::sync::mpsc;

use soundgrid::app::cli::Args;
use soundgrid::app::config::{AppConfig, Settings};
use soundgrid::app::events::AppEvent;
use soundgrid::app::{input_handler, App};
use soundgrid::library::SoundLibrary;
use soundgrid::player::{self, PlaybackDispatcher};
use soundgrid::watcher::{WatchSignal, WatcherService};
use soundgrid::{logging, ui, wav};

type Tui = Terminal<CrosstermBackend<io::Stdout>>;

#[tokio::main]
async fn main() -> Result<()> {
    human_panic::setup_panic!();
    // Leave raw mode before any panic report hits the screen
    let report = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = restore_terminal();
        report(info);
    }));

    let args = Args::parse();

    if args.generate_config {
        print!("{}", AppConfig::default_toml()?);
        return Ok(());
    }

    let _log_guard = match logging::init(&AppConfig::get_log_dir()) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Logging disabled: {:#}", e);
            None
        }
    };

    let user_config = match &args.config {
        Some(path) => AppConfig::load_from(path, false),
        None => AppConfig::load(),
    };
    let settings = Settings::merge(&args, user_config);
    tracing::info!(root = %settings.root.display(), watcher = ?settings.watcher, backend = ?settings.backend, "starting");

    if args.list {
        for entry in SoundLibrary::scan(&settings.root).entries() {
            println!("{}\t{}", entry.display_name, wav::duration_ms(&entry.path));
        }
        return Ok(());
    }

    // 1. Initial State
    let signal = WatchSignal::new();
    let backend = player::get_backend(settings.backend, &settings.players);
    let dispatcher = PlaybackDispatcher::with_backend(backend);
    let mut app = App::new(settings.root.clone(), dispatcher, signal.clone(), settings.theme.clone());

    // 2. Watcher thread 👀
    let mut watcher = match WatcherService::start(
        settings.watcher,
        &settings.root,
        settings.poll_interval,
        signal,
    ) {
        Ok(service) => Some(service),
        Err(e) => {
            tracing::error!(error = %e, "could not start watcher");
            app.show_toast("⚠ Auto-refresh unavailable");
            None
        }
    };
    app.watcher_state = watcher.as_ref().map(|w| w.state());

    // 3. Terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let outcome = run(&mut terminal, &mut app, watcher.as_ref()).await;

    // Shutdown: join the watcher, silence the player, give the terminal back
    if let Some(service) = watcher.as_mut() {
        service.stop();
    }
    app.stop_playback();
    restore_terminal()?;
    terminal.show_cursor()?;

    tracing::info!("bye");
    outcome
}

async fn run(terminal: &mut Tui, app: &mut App, watcher: Option<&WatcherService>) -> Result<()> {
    let (tx, mut rx) = mpsc::channel(100);

    // Input Event Task
    let tx_input = tx.clone();
    tokio::spawn(async move {
        let mut reader = EventStream::new();
        while let Some(Ok(event)) = reader.next().await {
            if tx_input.send(AppEvent::Input(event)).await.is_err() {
                break;
            }
        }
    });

    // Frame Tick Task ⚡ (approx 60 FPS)
    let tx_tick = tx;
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_millis(16));
        loop {
            interval.tick().await;
            if tx_tick.send(AppEvent::Tick).await.is_err() {
                break;
            }
        }
    });

    loop {
        terminal.draw(|f| ui::ui(f, app))?;

        match rx.recv().await {
            Some(AppEvent::Input(event)) => input_handler::handle_event(event, app),
            Some(AppEvent::Tick) => {
                app.tick();
                app.watcher_state = watcher.map(|w| w.state());
            }
            None => break,
        }

        if !app.is_running {
            break;
        }
    }

    Ok(())
}

fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture)
}
