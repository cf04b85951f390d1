// SPDX-License-Identifier: MIT
//
// corde — a small terminal text editor.
//
// This binary wires the two crates together:
//
//   corde-term   → raw mode, stdin polling, key parsing, frame output
//   corde-editor → document, cursor, camera, frame compositor
//
// One thread, one loop. Each frame:
//
//   size → editor.resize → compose → terminal.draw
//   poll stdin (≤ one frame) → parser → editor.feed → editor.update
//
// The loop ends on Escape or when stdin closes.

use std::env;
use std::fs::File;
use std::path::PathBuf;
use std::process;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use corde_editor::editor::Editor;
use corde_editor::settings::EditorSettings;
use corde_term::input::Parser;
use corde_term::poll::{READ_BUF_SIZE, Readiness, poll_stdin};
use corde_term::terminal::{self, Terminal};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Longest a frame waits for input.
const FRAME: Duration = Duration::from_millis(16);

const USAGE: &str = "\
usage: corde [--set key=value]... <path>

Options:
  --set key=value   override a setting (repeatable)
  -h, --help        show this help

Environment:
  CORDE_OPTS        settings applied before --set, space separated
  CORDE_LOG         tracing filter, e.g. debug; logging is off when unset
  CORDE_LOG_FILE    log destination (default corde.log)

Keys: arrows, Home, End move; Enter, Backspace, Delete edit; Escape quits.";

// ─── Arguments ──────────────────────────────────────────────────────────────

#[derive(Debug, PartialEq, Eq)]
struct Args {
    path: PathBuf,
    sets: Vec<String>,
}

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Run(Args),
    Help,
}

/// Parse everything after the program name.
fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Command, String> {
    let mut args = args.into_iter();
    let mut sets = Vec::new();
    let mut path = None;

    while let Some(arg) = args.next() {
        if let Some(value) = arg.strip_prefix("--set=") {
            sets.push(value.to_string());
            continue;
        }
        match arg.as_str() {
            "-h" | "--help" => return Ok(Command::Help),
            "--set" => {
                let value = args.next().ok_or("--set needs a key=value argument")?;
                sets.push(value);
            }
            s if s.starts_with('-') && s.len() > 1 => return Err(format!("unknown option: {s}")),
            _ if path.is_some() => return Err("only one file can be opened".to_string()),
            _ => path = Some(PathBuf::from(&arg)),
        }
    }

    let path = path.ok_or("missing file argument")?;
    Ok(Command::Run(Args { path, sets }))
}

fn load_settings(opts: Option<&str>, sets: &[String]) -> Result<EditorSettings> {
    let mut settings = EditorSettings::default();
    if let Some(opts) = opts {
        settings
            .apply_all(opts)
            .map_err(|e| anyhow!(e))
            .context("invalid CORDE_OPTS")?;
    }
    for set in sets {
        settings
            .apply_all(set)
            .map_err(|e| anyhow!(e))
            .with_context(|| format!("invalid --set {set}"))?;
    }
    Ok(settings)
}

// ─── Logging ────────────────────────────────────────────────────────────────

/// Log to a file when `CORDE_LOG` is set. The terminal belongs to the
/// editor, so nothing is ever logged to stdout or stderr.
fn init_logging() -> Result<()> {
    let Ok(filter) = env::var("CORDE_LOG") else {
        return Ok(());
    };
    let path = env::var("CORDE_LOG_FILE").unwrap_or_else(|_| "corde.log".to_string());
    let file = File::create(&path).with_context(|| format!("cannot create log file {path}"))?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow!(e))
        .context("cannot install log subscriber")
}

// ─── Main loop ──────────────────────────────────────────────────────────────

fn run(args: Args) -> Result<()> {
    init_logging()?;
    let settings = load_settings(env::var("CORDE_OPTS").ok().as_deref(), &args.sets)?;

    if !terminal::is_tty() {
        bail!("stdin is not a terminal");
    }

    let mut term = Terminal::new();
    let size = term.refresh_size();
    let mut editor = Editor::open(&args.path, settings, size.cols, size.rows)
        .with_context(|| format!("cannot open {}", args.path.display()))?;
    info!(path = %args.path.display(), "corde starting");

    term.enter().context("cannot switch the terminal to raw mode")?;
    let result = event_loop(&mut term, &mut editor);
    term.leave().context("cannot restore the terminal")?;
    debug!(modified = editor.document().is_modified(), "corde exiting");
    result
}

fn event_loop(term: &mut Terminal, editor: &mut Editor) -> Result<()> {
    let mut parser = Parser::new();
    let mut buf = [0u8; READ_BUF_SIZE];

    while !editor.should_quit() {
        let size = term.refresh_size();
        editor.resize(size.cols, size.rows);
        term.draw(editor.compose()).context("cannot draw frame")?;

        // Queued keys are consumed one per frame; don't sleep on top of that.
        let timeout = if editor.input().pending() > 0 {
            Duration::ZERO
        } else {
            FRAME
        };
        let events = match poll_stdin(&mut buf, timeout).context("cannot read stdin")? {
            Readiness::Data(n) => parser.advance(&buf[..n]),
            // A lone ESC only becomes a key once nothing follows it.
            Readiness::Timeout if parser.has_pending() => parser.flush(),
            Readiness::Timeout => Vec::new(),
            Readiness::Eof => {
                debug!("stdin closed");
                break;
            }
        };

        editor.feed(events);
        editor.update();
    }
    Ok(())
}

// ─── Entry point ────────────────────────────────────────────────────────────

fn main() {
    let command = match parse_args(env::args().skip(1)) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("corde: {e}\n{USAGE}");
            process::exit(2);
        }
    };

    match command {
        Command::Help => println!("{USAGE}"),
        Command::Run(args) => {
            if let Err(e) = run(args) {
                eprintln!("corde: {e:#}");
                process::exit(1);
            }
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
