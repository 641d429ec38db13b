use clap::Parser;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use materiality::{
    App, AppConfig, AppEvent, Args, CacheManager, ChartFormat, ConfigManager, Session,
    SessionSettings, Theme, APP_NAME,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use ratatui::DefaultTerminal;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::time::Duration;

fn render(terminal: &mut DefaultTerminal, app: &mut App) -> Result<()> {
    terminal.draw(|frame| frame.render_widget(app, frame.area()))?;
    Ok(())
}

fn run(
    mut terminal: DefaultTerminal,
    app: &mut App,
    tx: Sender<AppEvent>,
    rx: Receiver<AppEvent>,
    poll_interval: Duration,
) -> Result<()> {
    render(&mut terminal, app)?;

    loop {
        if crossterm::event::poll(poll_interval)? {
            match crossterm::event::read()? {
                crossterm::event::Event::Key(key) => tx.send(AppEvent::Key(key))?,
                crossterm::event::Event::Resize(cols, rows) => {
                    tx.send(AppEvent::Resize(cols, rows))?
                }
                _ => {}
            }
        }

        let updated = match rx.recv_timeout(Duration::from_millis(0)) {
            Ok(event) => {
                match event {
                    AppEvent::Exit => break,
                    event => {
                        if let Some(event) = app.event(&event) {
                            tx.send(event)?;
                        }
                    }
                }
                true
            }
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) => false,
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => break,
        };

        if updated {
            render(&mut terminal, app)?;
        }
    }
    Ok(())
}

/// Send log output to the cache log file; the terminal belongs to the UI.
fn init_logging(args: &Args) {
    let default_filter = if args.debug { "debug" } else { "info" };
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter));
    match CacheManager::new(APP_NAME).and_then(|cache| cache.open_log()) {
        Ok(log_file) => {
            builder
                .format_timestamp_millis()
                .target(env_logger::Target::Pipe(Box::new(log_file)));
        }
        Err(e) => {
            eprintln!("Warning: logging disabled: {}", e);
            builder.filter_level(log::LevelFilter::Off);
        }
    }
    // Ignore a second init
    let _ = builder.try_init();
}

fn handle_early_exit_flags(args: &Args) -> Result<Option<()>> {
    if args.clear_cache {
        match CacheManager::new(APP_NAME) {
            Ok(cache) => {
                if let Err(e) = cache.clear_all() {
                    eprintln!("Error clearing cache: {}", e);
                    std::process::exit(1);
                }
                println!("Cache cleared successfully");
                return Ok(Some(()));
            }
            Err(_e) => {
                println!("No cache to clear");
                return Ok(Some(()));
            }
        }
    }

    if args.generate_config {
        let config_manager = ConfigManager::new(APP_NAME)?;
        match config_manager.write_default_config(args.force) {
            Ok(path) => {
                println!("Configuration written to {}", path.display());
                return Ok(Some(()));
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    }

    Ok(None)
}

fn build_session(config: &AppConfig, args: &Args) -> Result<Session> {
    let settings = SessionSettings::from_config(config, args)?;
    let session = match args.seed {
        Some(seed) => Session::seeded(&mut StdRng::seed_from_u64(seed), settings),
        None => Session::seeded(&mut rand::thread_rng(), settings),
    };
    log::info!(
        "session started: {} topics, palette '{}', background '{}'",
        session.topics().len(),
        session.palette().name,
        session.background().name
    );
    Ok(session)
}

/// Export flags: write the requested outputs without starting the UI.
fn run_headless(session: &Session, args: &Args) -> Result<()> {
    if let Some(path) = &args.export_csv {
        session.write_csv(path)?;
        eprintln!("Wrote {}", path.display());
    }

    if let Some(path) = &args.export_chart {
        let format = args
            .chart_format
            .or_else(|| ChartFormat::from_path(path))
            .ok_or_else(|| {
                eyre!(
                    "Cannot tell the image format of {}. Use a .png or .eps extension or --chart-format.",
                    path.display()
                )
            })?;
        session.write_chart(path, format)?;
        eprintln!("Wrote {}", path.display());
    }

    if args.dump_chart {
        println!("{}", session.chart_json()?);
    }

    Ok(())
}

fn export_dir(config: &AppConfig, args: &Args) -> PathBuf {
    args.output_dir
        .clone()
        .or_else(|| config.export.directory.clone())
        .unwrap_or_else(|| PathBuf::from("."))
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(()) = handle_early_exit_flags(&args)? {
        return Ok(());
    }

    color_eyre::install()?;
    init_logging(&args);

    let config = AppConfig::load(APP_NAME)?;
    let session = build_session(&config, &args)?;

    if args.is_headless() {
        return run_headless(&session, &args);
    }

    let theme = Theme::from_config(&config.theme)?;
    let (tx, rx) = channel::<AppEvent>();
    let mut app = App::new_with_session(theme, session)
        .with_export_dir(export_dir(&config, &args));
    if args.debug || config.debug.enabled {
        app.enable_debug();
    }

    let poll_interval = Duration::from_millis(config.performance.event_poll_interval_ms);
    let terminal = ratatui::init();
    let result = run(terminal, &mut app, tx, rx, poll_interval);
    ratatui::restore();
    if let Err(e) = result {
        log::error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    log::info!("exit");
    Ok(())
}
