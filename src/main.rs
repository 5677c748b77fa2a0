//! Theremin — play a sine tone with two hands, a mouse, or an OSC gesture tracker.
//!
//! Runs the terminal UI by default. `--headless` skips the UI and plays
//! straight away, taking all control from OSC until Ctrl-C.

use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;

use theremin::audio::CpalSink;
use theremin::config::ThereminConfig;
use theremin::control::{control_channel, Handedness};
use theremin::instrument::{Key, RangeSpan};
use theremin::osc::OscListener;
use theremin::tui::{App, SharedLog, TuiLogger};
use theremin::Theremin;

#[derive(Debug, Parser)]
#[command(name = "theremin", version, about = "A gesture-controlled sine theremin")]
struct Cli {
    /// Key of the playable range (C, C#, Db, ... B)
    #[arg(short, long)]
    key: Option<Key>,

    /// Range span in octaves
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=2))]
    range: Option<u8>,

    /// Snap pitch to 12 steps across the range
    #[arg(short, long)]
    quantize: bool,

    /// Pitch with the left hand, volume with the right
    #[arg(long)]
    left_handed: bool,

    /// UDP port for the OSC listener
    #[arg(long)]
    osc_port: Option<u16>,

    /// Don't start the OSC listener
    #[arg(long)]
    no_osc: bool,

    /// Play without the terminal UI
    #[arg(long)]
    headless: bool,

    /// Config file (default: ~/.theremin/config.yaml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn log_level(&self) -> log::Level {
        match self.verbose {
            0 => log::Level::Info,
            1 => log::Level::Debug,
            _ => log::Level::Trace,
        }
    }

    /// Command-line flags win over the config file.
    fn apply_overrides(&self, config: &mut ThereminConfig) {
        if let Some(key) = self.key {
            config.key = key;
        }
        if let Some(span) = self.range.and_then(RangeSpan::from_octaves) {
            config.range = span;
        }
        if self.quantize {
            config.quantize = true;
        }
        if self.left_handed {
            config.handedness = Handedness::Left;
        }
        if let Some(port) = self.osc_port {
            config.osc.listen_port = port;
        }
        if self.no_osc {
            config.osc.enabled = false;
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let tui_log = if cli.headless {
        if let Err(e) = simple_logger::init_with_level(cli.log_level()) {
            eprintln!("failed to install logger: {e}");
        }
        None
    } else {
        match TuiLogger::install(cli.log_level().to_level_filter()) {
            Ok(ring) => Some(ring),
            Err(e) => {
                eprintln!("failed to install logger: {e}");
                std::process::exit(1);
            }
        }
    };

    let mut config = match &cli.config {
        Some(path) => match ThereminConfig::load_from(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("{e}");
                std::process::exit(1);
            }
        },
        None => ThereminConfig::load().unwrap_or_default(),
    };
    cli.apply_overrides(&mut config);

    let sink = match CpalSink::with_settings(config.output_settings()) {
        Ok(sink) => sink,
        Err(e) => {
            eprintln!("failed to open audio output: {e}");
            std::process::exit(1);
        }
    };
    let theremin = Theremin::new(sink, &config.session_settings());

    let result = match tui_log {
        Some(log) => run_tui(theremin, log, &config),
        None => run_headless(theremin, &config),
    };
    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run_tui(
    theremin: Theremin<CpalSink>,
    log: SharedLog,
    config: &ThereminConfig,
) -> io::Result<()> {
    let mut app = App::new(theremin, log);
    if config.osc.enabled {
        app.attach_osc(&config.osc);
    }

    let mut terminal = ratatui::init();
    let result = execute!(io::stdout(), EnableMouseCapture).and_then(|()| app.run(&mut terminal));
    let _ = execute!(io::stdout(), DisableMouseCapture);
    ratatui::restore();
    result
}

fn run_headless(mut theremin: Theremin<CpalSink>, config: &ThereminConfig) -> io::Result<()> {
    let running = Arc::new(AtomicBool::new(true));
    let flag = running.clone();
    ctrlc::set_handler(move || flag.store(false, Ordering::SeqCst))
        .map_err(|e| io::Error::other(e.to_string()))?;

    let (tx, rx) = control_channel();
    let _listener = if config.osc.enabled {
        Some(OscListener::start(&config.osc, tx.clone())?)
    } else {
        log::warn!("OSC disabled; nothing can change the tone");
        None
    };

    theremin
        .controller_mut()
        .start()
        .map_err(|e| io::Error::other(e.to_string()))?;

    while running.load(Ordering::SeqCst) {
        if let Some(event) = rx.poll_timeout(Duration::from_millis(50)) {
            if let Err(e) = theremin.apply(event) {
                log::warn!("{e}");
            }
        }
    }

    theremin.controller_mut().stop();
    log::info!("bye");
    Ok(())
}
