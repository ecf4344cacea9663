// textcalc: line-by-line text calculator

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing_subscriber::EnvFilter;

use textcalc::sheet::Sheet;
use textcalc::ui::{app::DEFAULT_DELAY_MS, App};

/// A line-by-line text calculator with live results
#[derive(Parser, Debug)]
#[command(name = "textcalc", version)]
#[command(about = "Evaluate every line of a text document as you type", long_about = None)]
struct Args {
    /// Document to open (created on first save if it does not exist)
    file: Option<PathBuf>,

    /// Evaluate the document once, print the results and exit
    #[arg(long)]
    print: bool,

    /// Milliseconds to wait after the last keystroke before re-evaluating
    #[arg(long, default_value_t = DEFAULT_DELAY_MS)]
    delay_ms: u64,

    /// Write tracing output to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
}

/// Install a subscriber when logging is requested. Terminal mode never logs
/// to stderr, which would corrupt the screen.
fn init_tracing(log_file: Option<&Path>, print: bool) -> io::Result<()> {
    use tracing_subscriber::fmt;

    let filter = || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    if let Some(path) = log_file {
        let file = File::create(path)?;
        fmt()
            .with_env_filter(filter())
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .init();
    } else if print && std::env::var("RUST_LOG").is_ok() {
        fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(io::stderr)
            .with_target(false)
            .init();
    }
    Ok(())
}

fn read_document(path: Option<&Path>, from_stdin: bool) -> io::Result<String> {
    match path {
        Some(path) if path.exists() => fs::read_to_string(path),
        Some(_) => Ok(String::new()),
        None if from_stdin => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
        None => Ok(String::new()),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_tracing(args.log_file.as_deref(), args.print)?;

    let text = match read_document(args.file.as_deref(), args.print) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Error: cannot read document: {}", e);
            std::process::exit(1);
        }
    };

    if args.print {
        let lines: Vec<&str> = text.lines().collect();
        let mut sheet = Sheet::new();
        sheet.evaluate(&lines);
        print!("{}", sheet.report());
        return Ok(());
    }

    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create and run app
    let mut app = App::new(&text, args.file, Duration::from_millis(args.delay_ms));
    let res = app.run(&mut terminal);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}
