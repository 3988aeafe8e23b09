mod loader;
mod terminal;

use std::fs::File;
use std::io::{self, Write};
use std::panic;
use std::path::PathBuf;
use std::sync::Mutex;

use crossterm::{
    cursor::MoveToColumn,
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{error, info};
use tracing_subscriber::fmt::writer::MakeWriter;

use gridcore::{DataGrid, GridData, GridError, GridOptions, Theme};
use terminal::Host;

/// Rows x columns generated when no file is given
const DEFAULT_SIZE: (usize, usize) = (1000, 12);

struct Args {
    file_path: Option<PathBuf>,
    generate: Option<(usize, usize)>,
    config: Option<PathBuf>,
    theme: Option<String>,
    seed: Option<u64>,
}

/// Parse command line arguments
fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    let mut parsed = Args {
        file_path: None,
        generate: None,
        config: None,
        theme: None,
        seed: None,
    };

    let value = |i: usize, flag: &str| -> String {
        match args.get(i + 1) {
            Some(v) => v.clone(),
            None => {
                eprintln!("Error: {} requires an argument", flag);
                std::process::exit(1);
            }
        }
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-g" | "--generate" => {
                let size = value(i, "--generate");
                parsed.generate = Some(loader::parse_size(&size).unwrap_or_else(|| {
                    eprintln!("Invalid size: '{}'. Use ROWSxCOLS, e.g. 10000x8.", size);
                    std::process::exit(1);
                }));
                i += 2;
            }
            "-c" | "--config" => {
                parsed.config = Some(PathBuf::from(value(i, "--config")));
                i += 2;
            }
            "-t" | "--theme" => {
                parsed.theme = Some(value(i, "--theme"));
                i += 2;
            }
            "--seed" => {
                let seed = value(i, "--seed");
                parsed.seed = Some(seed.parse().unwrap_or_else(|_| {
                    eprintln!("Invalid seed: '{}'", seed);
                    std::process::exit(1);
                }));
                i += 2;
            }
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            arg if arg.starts_with('-') => {
                eprintln!("Unknown option: {}", arg);
                std::process::exit(1);
            }
            _ => {
                parsed.file_path = Some(PathBuf::from(&args[i]));
                i += 1;
            }
        }
    }

    parsed
}

fn restore_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), DisableMouseCapture, LeaveAlternateScreen);
}

/// Handle panics gracefully
fn install_panic_hook() {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        restore_terminal();

        if let Some(location) = info.location() {
            error!(file = location.file(), line = location.line(), "panic occurred");
        } else {
            error!("panic occurred");
        }

        if let Some(s) = info.payload().downcast_ref::<&str>() {
            error!(message = %s);
        } else if let Some(s) = info.payload().downcast_ref::<String>() {
            error!(message = %s);
        }

        default_hook(info);
    }));
}

/// A `MakeWriter` for `tracing` that logs to the **main screen** by leaving the alternate screen temporarily.
pub struct MainScreenWriter;

impl<'a> MakeWriter<'a> for MainScreenWriter {
    type Writer = MainScreenWriterHandle;

    fn make_writer(&'a self) -> Self::Writer {
        MainScreenWriterHandle
    }
}

/// A handle that writes to stdout outside the alternate screen
pub struct MainScreenWriterHandle;

impl Write for MainScreenWriterHandle {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        execute!(io::stdout(), LeaveAlternateScreen)?;
        execute!(io::stdout(), MoveToColumn(0))?;
        let result = io::stdout().write(buf);
        io::stdout().flush()?;
        execute!(io::stdout(), EnterAlternateScreen)?;
        result
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stdout().flush()
    }
}

/// Log to the file named by `GRIDCORE_LOG`, else to the main screen.
fn init_logging() {
    let log_file = std::env::var_os("GRIDCORE_LOG").and_then(|path| File::create(path).ok());
    match log_file {
        Some(file) => tracing_subscriber::fmt().with_ansi(false).with_writer(Mutex::new(file)).init(),
        None => tracing_subscriber::fmt().with_writer(MainScreenWriter).init(),
    }
}

fn print_help() {
    eprintln!("gridcore - An interactive data grid in the terminal");
    eprintln!();
    eprintln!("USAGE:");
    eprintln!("    gridcore [OPTIONS] [FILE]");
    eprintln!();
    eprintln!("OPTIONS:");
    eprintln!("    -g, --generate <ROWSxCOLS>  Generate random data instead of loading a file");
    eprintln!("    -c, --config <FILE>         Grid options (TOML); defaults to ./gridcore.toml if present");
    eprintln!("    -t, --theme <NAME|FILE>     Built-in theme ({}) or a theme TOML file", Theme::builtin_names().join(", "));
    eprintln!("        --seed <N>              Seed for --generate");
    eprintln!("    -h, --help                  Print this help message");
    eprintln!();
    eprintln!("KEYS:");
    eprintln!("    arrows/Tab/PageUp/PageDown move, Shift extends, Enter/F2 edits, Ctrl+C/X/V clipboard,");
    eprintln!("    Ctrl+Z/Y undo/redo, Ctrl+D/R fill, Ctrl+F search (F3 next), Ctrl+Q quits");
}

/// Options, theme and data for the session
fn setup(args: &Args) -> Result<(GridOptions, Theme, GridData, Vec<String>), GridError> {
    let mut options = match loader::config_path(args.config.clone()) {
        Some(path) => GridOptions::from_file(&path)?,
        None => GridOptions::default(),
    };

    let mut theme = match args.theme.as_deref() {
        Some(name) if name.ends_with(".toml") => Theme::from_file(&PathBuf::from(name))?,
        Some(name) => {
            options.theme = name.to_string();
            options.resolve_theme()
        }
        None => options.resolve_theme(),
    };
    terminal::terminal_metrics(&mut options, &mut theme);

    let (data, warnings) = match (&args.file_path, args.generate) {
        (Some(path), _) => {
            let result = loader::load_file(path)?;
            (result.data, result.warnings)
        }
        (None, size) => {
            let (rows, cols) = size.unwrap_or(DEFAULT_SIZE);
            (loader::generate(rows, cols, args.seed)?, Vec::new())
        }
    };
    Ok((options, theme, data, warnings))
}

fn main() -> io::Result<()> {
    init_logging();
    info!("gridcore started");

    install_panic_hook();

    let args = parse_args();
    let (grid, warnings) = match setup(&args).and_then(|(options, theme, data, warnings)| {
        let (mut grid, _handle) = DataGrid::new(options, data)?;
        grid.set_theme(theme);
        Ok((grid, warnings))
    }) {
        Ok(ready) => ready,
        Err(e) => {
            error!(error = %e, "failed to start");
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut host = Host::new(grid, warnings.join("; "));
    let result = host.run(&mut terminal);

    restore_terminal();
    terminal.show_cursor()?;

    result
}
