//! Fluxview - a terminal viewer for live magnetic-field telemetry.

use anyhow::{bail, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use fluxview::app::App;
use fluxview::config::{Calibration, ChartConfig, Config, RpmConfig};
use fluxview::feed::{Connector, FeedTarget};
use fluxview::session::{ConnectionStatus, Outcome, Session};
use fluxview::ui::{self, formatters::format_whole};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "fluxview")]
#[command(about = "A terminal viewer for live magnetic-field telemetry", long_about = None)]
struct Args {
    /// WebSocket URL of the telemetry relay
    #[arg(long, default_value = "ws://localhost:8081", conflicts_with = "replay")]
    url: String,

    /// Replay payloads from a file, one per line ("-" for stdin)
    #[arg(long)]
    replay: Option<PathBuf>,

    /// Delay between replayed payloads in milliseconds
    #[arg(long, default_value_t = 100)]
    interval_ms: u64,

    /// Number of samples visible on the chart
    #[arg(long, default_value_t = fluxview::config::DEFAULT_WINDOW)]
    window: usize,

    /// Lower bound of the chart in mT
    #[arg(long, default_value_t = -50.0, allow_negative_numbers = true)]
    y_min: f64,

    /// Upper bound of the chart in mT
    #[arg(long, default_value_t = 100.0, allow_negative_numbers = true)]
    y_max: f64,

    /// Fit the chart to the visible samples instead of the fixed bounds
    #[arg(long)]
    autoscale: bool,

    /// Field strength in mT that counts as a magnet pass
    #[arg(long, default_value_t = 50.0)]
    peak_threshold: f64,

    /// Number of revolutions averaged into the RPM readout
    #[arg(long, default_value_t = 5)]
    rpm_history: usize,

    /// Milliseconds without a magnet pass before RPM drops to zero
    #[arg(long, default_value_t = 2000)]
    rpm_timeout_ms: u64,

    /// Hall sensor sensitivity in volts per gauss
    #[arg(long, default_value_t = 0.0025)]
    sensitivity: f64,

    /// Print samples to stdout instead of opening the terminal UI
    #[arg(long)]
    headless: bool,

    /// Enable logging to specified file
    #[arg(long)]
    log: Option<PathBuf>,
}

impl Args {
    fn config(&self) -> Config {
        Config {
            chart: ChartConfig {
                window: self.window,
                y_min: self.y_min,
                y_max: self.y_max,
                autoscale: self.autoscale,
                ..ChartConfig::default()
            },
            rpm: RpmConfig {
                peak_threshold: self.peak_threshold,
                history: self.rpm_history,
                timeout: Duration::from_millis(self.rpm_timeout_ms),
            },
            calibration: Calibration {
                sensitivity: self.sensitivity,
                ..Calibration::default()
            },
        }
    }

    fn target(&self) -> FeedTarget {
        match &self.replay {
            Some(path) => FeedTarget::Replay {
                path: path.clone(),
                interval: Duration::from_millis(self.interval_ms),
            },
            None => FeedTarget::WebSocket(self.url.clone()),
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Set up logging if --log option is provided
    if let Some(log_path) = &args.log {
        let log_path = log_path.clone();
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || {
                std::fs::OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&log_path)
                    .expect("Failed to open log file")
            })
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
        tracing::info!("Starting Fluxview");
    } else if args.headless {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    }

    let config = args.config();
    if let Err(e) = config.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(2);
    }

    if args.headless {
        return run_headless(config, args.target());
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run app
    let app = App::new(config, Box::new(args.target()));
    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {}", err);
    }

    if args.log.is_some() {
        tracing::info!("Fluxview exited");
    }

    Ok(())
}

/// Consume the feed until it ends, printing one line per sample.
fn run_headless(config: Config, mut target: FeedTarget) -> Result<()> {
    let mut session = Session::new(&config);
    session.toggle_run(&mut target)?;

    while session.is_live() {
        let now = Instant::now();
        if let Outcome::Appended(_) = session.pump(Duration::from_millis(100), now) {
            let readouts = session.readouts();
            println!(
                "Mag: {:.2} mT, RPM: {}, Peak RPM: {}",
                readouts.magnetic_field.unwrap_or_default(),
                format_whole(readouts.rpm.or(Some(0.0))),
                format_whole(readouts.peak_rpm.or(Some(0.0))),
            );
        }
        session.tick(now);
    }

    println!("{} samples from {}", session.store().len(), target.describe());
    if let ConnectionStatus::Error(msg) = session.connection() {
        bail!("feed failed: {}", msg);
    }
    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, mut app: App) -> Result<()> {
    loop {
        app.on_tick(Instant::now());
        terminal.draw(|f| ui::draw(f, &app))?;

        if !event::poll(Duration::from_millis(50))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        // Offset prompt - handle separately
        if app.offset_prompt.is_active() {
            match key.code {
                KeyCode::Enter => app.submit_offset(),
                KeyCode::Esc => app.offset_prompt.cancel(),
                KeyCode::Backspace => app.offset_prompt.backspace(),
                KeyCode::Char(c) => app.offset_prompt.input(c),
                _ => {},
            }
            continue;
        }

        match (key.modifiers, key.code) {
            // Quit
            (KeyModifiers::NONE, KeyCode::Char('q'))
            | (KeyModifiers::CONTROL, KeyCode::Char('c')) => return Ok(()),

            // Session
            (KeyModifiers::NONE, KeyCode::Char('s'))
            | (KeyModifiers::NONE, KeyCode::Char(' ')) => app.toggle_run(),
            (KeyModifiers::NONE, KeyCode::Char('c')) => app.clear(),

            // History
            (KeyModifiers::NONE, KeyCode::Left)
            | (KeyModifiers::NONE, KeyCode::Char('h')) => app.scroll_by(-1),
            (KeyModifiers::NONE, KeyCode::Right)
            | (KeyModifiers::NONE, KeyCode::Char('l')) => app.scroll_by(1),
            (KeyModifiers::NONE, KeyCode::PageUp) => app.page(-1),
            (KeyModifiers::NONE, KeyCode::PageDown) => app.page(1),
            (KeyModifiers::NONE, KeyCode::Home) => {
                app.session.scroll_to(0);
                app.status = "Start of history".to_string();
            },
            (KeyModifiers::NONE, KeyCode::End) | (KeyModifiers::SHIFT, KeyCode::Char('G')) => {
                app.scroll_to_end();
            },
            (KeyModifiers::NONE, KeyCode::Char('o')) => app.offset_prompt.start(),

            // Features
            (KeyModifiers::NONE, KeyCode::Char('y')) => app.copy_window(),
            (KeyModifiers::SHIFT, KeyCode::Char('T')) => app.cycle_theme(),
            (KeyModifiers::SHIFT, KeyCode::Char('?')) => {
                app.status = "Help: s=start/pause, c=clear, h/l=scroll, o=go to sample, G=live, y=copy, q=quit".to_string();
            },

            _ => {},
        }
    }
}
