//! muxterm replay tool
//!
//! Plays a captured VT byte stream through the terminal engine and paints
//! the result. On a live terminal the playback runs frame by frame inside
//! the alternate screen; with redirected output it emits one final frame of
//! plain ANSI, which makes captures easy to diff in scripts and tests.
//!
//! ```text
//! muxterm capture.vt             # replay a recording
//! cat capture.vt | muxterm -     # same, from stdin
//! muxterm --cols 132 capture.vt  # override the viewport
//! ```

use std::env;
use std::fs::File;
use std::io::{self, Read, Write};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use tracing::{debug, info};
use tracing_subscriber::{fmt, EnvFilter};

use muxterm::render::{ColorMode, DiffRenderer, RenderPump};
use muxterm::{Config, Terminal};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const CHUNK: usize = 4096;

struct Args {
    input: Option<String>,
    cols: Option<u16>,
    rows: Option<u16>,
    color_mode: Option<ColorMode>,
    /// Delay between chunks during live playback.
    cadence: Duration,
}

fn print_help() {
    eprintln!("muxterm {} - VT stream replay", VERSION);
    eprintln!();
    eprintln!("Usage: muxterm [OPTIONS] <FILE | ->");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --cols <N>            Viewport width (default from config)");
    eprintln!("  --rows <N>            Viewport height (default from config)");
    eprintln!("  --color <MODE>        truecolor, palette256, or vga16");
    eprintln!("  --cadence <MS>        Delay between chunks in live playback");
    eprintln!("  -v, --version         Show version");
    eprintln!("  -h, --help            Show this help");
    eprintln!();
    eprintln!("Configuration: ~/.muxterm/config.toml");
}

fn parse_args() -> Result<Args> {
    let args: Vec<String> = env::args().collect();
    let mut parsed = Args {
        input: None,
        cols: None,
        rows: None,
        color_mode: None,
        cadence: Duration::from_millis(8),
    };
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-v" | "--version" => {
                eprintln!("muxterm {}", VERSION);
                std::process::exit(0);
            }
            "--cols" => {
                i += 1;
                let v = args.get(i).context("--cols needs a value")?;
                parsed.cols = Some(v.parse().context("--cols must be a number")?);
            }
            "--rows" => {
                i += 1;
                let v = args.get(i).context("--rows needs a value")?;
                parsed.rows = Some(v.parse().context("--rows must be a number")?);
            }
            "--color" => {
                i += 1;
                let v = args.get(i).context("--color needs a value")?;
                parsed.color_mode = Some(match v.as_str() {
                    "truecolor" => ColorMode::TrueColor,
                    "palette256" => ColorMode::Palette256,
                    "vga16" => ColorMode::Vga16,
                    other => bail!("unknown color mode: {other}"),
                });
            }
            "--cadence" => {
                i += 1;
                let v = args.get(i).context("--cadence needs a value")?;
                let ms: u64 = v.parse().context("--cadence must be milliseconds")?;
                parsed.cadence = Duration::from_millis(ms);
            }
            arg if parsed.input.is_none() => {
                parsed.input = Some(arg.to_string());
            }
            arg => bail!("unexpected argument: {arg}"),
        }
        i += 1;
    }
    Ok(parsed)
}

/// Raw-mode and alternate-screen lifetime; restores the host terminal on
/// drop even when playback errors out.
struct ScreenGuard;

impl ScreenGuard {
    fn enter() -> Result<Self> {
        terminal::enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen, Hide)?;
        Ok(Self)
    }
}

impl Drop for ScreenGuard {
    fn drop(&mut self) {
        let _ = execute!(io::stdout(), Show, LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

fn open_input(arg: Option<&str>) -> Result<Box<dyn Read>> {
    match arg {
        None | Some("-") => Ok(Box::new(io::stdin())),
        Some(path) => {
            let file = File::open(path).with_context(|| format!("cannot open {path}"))?;
            Ok(Box::new(file))
        }
    }
}

/// Live playback: frames go through the render pump to the real terminal.
fn replay_live(term: &mut Terminal, mut input: Box<dyn Read>, args: &Args, mode: ColorMode) -> Result<()> {
    let _guard = ScreenGuard::enter()?;
    let pump = RenderPump::spawn(mode, io::stdout());
    let mut buf = [0u8; CHUNK];
    loop {
        let n = input.read(&mut buf)?;
        if n == 0 {
            break;
        }
        term.feed(&buf[..n]);
        let replies = term.take_reply_bytes();
        if !replies.is_empty() {
            debug!(bytes = replies.len(), "dropping replies in replay mode");
        }
        pump.submit(term.grid().clone());
        if !args.cadence.is_zero() {
            std::thread::sleep(args.cadence);
        }
    }
    // Leave the final frame on screen briefly before the guard restores.
    drop(pump);
    let (x, y) = term.caret();
    execute!(io::stdout(), MoveTo(x, y), Show)?;
    std::thread::sleep(Duration::from_secs(1));
    Ok(())
}

/// Redirected output: feed everything, emit one full frame.
fn replay_batch(term: &mut Terminal, mut input: Box<dyn Read>, mode: ColorMode) -> Result<()> {
    let mut bytes = Vec::new();
    input.read_to_end(&mut bytes)?;
    term.feed(&bytes);
    let mut renderer = DiffRenderer::new(mode);
    let mut stdout = io::stdout().lock();
    let stats = renderer.render(term.grid(), &mut stdout)?;
    writeln!(stdout)?;
    stdout.flush()?;
    info!(
        bytes_in = bytes.len(),
        bytes_out = stats.bytes,
        "replay complete"
    );
    Ok(())
}

fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = parse_args()?;
    let config = Config::load();
    let cols = args.cols.unwrap_or(config.cols);
    let rows = args.rows.unwrap_or(config.rows);
    let mode = args.color_mode.unwrap_or(config.color_mode);

    let input = open_input(args.input.as_deref())?;
    let mut term = Terminal::with_tab_width(cols, rows, config.scrollback, config.tab_width);

    let live = args.input.is_some()
        && crossterm::tty::IsTty::is_tty(&io::stdout());
    if live {
        replay_live(&mut term, input, &args, mode)?;
    } else {
        replay_batch(&mut term, input, mode)?;
    }

    if !term.title().is_empty() {
        info!(title = term.title(), "stream set a window title");
    }
    Ok(())
}
