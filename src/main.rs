use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use scrape_tree::{ProgramFile, Registry, Scraper, SnapshotDriver, Driver};
use tracing::{error, Level};

/// Build extraction trees from program files and run them against saved pages.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a program file and build its node tree without running it.
    Check {
        program: PathBuf,
    },
    /// Run a program against HTML snapshots.
    Run {
        program: PathBuf,
        /// URL to load before evaluation starts
        #[arg(long)]
        start: Option<String>,
        /// Snapshot for a URL, as URL=FILE (repeatable)
        #[arg(long = "page", value_parser = parse_page)]
        pages: Vec<(String, PathBuf)>,
        /// Write the result here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn parse_page(s: &str) -> Result<(String, PathBuf), String> {
    s.rsplit_once('=')
        .map(|(url, file)| (url.to_string(), PathBuf::from(file)))
        .ok_or_else(|| format!("expected URL=FILE, got {s:?}"))
}

fn main() {
    // Parse CLI arguments.
    let args = Args::parse();

    let level = match args.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = execute(args.command) {
        error!("{e}");
        std::process::exit(1);
    }
}

fn execute(command: Command) -> scrape_tree::errors::Result<()> {
    let registry = Registry::with_builtins();
    match command {
        Command::Check { program } => {
            ProgramFile::load(&program)?.build(&registry)?;
            println!("{}: ok", program.display());
        }
        Command::Run { program, start, pages, output } => {
            let scraper = Scraper::from_program(&ProgramFile::load(&program)?, &registry)?;

            let mut driver = SnapshotDriver::new();
            for (url, file) in pages {
                driver = driver.load_page(url, file)?;
            }
            if let Some(url) = start {
                driver.navigate(&url)?;
            }

            let value = scraper.run(&mut driver)?;
            let json = serde_json::to_string_pretty(&value)?;
            match output {
                Some(path) => std::fs::write(path, json)?,
                None => println!("{json}"),
            }
        }
    }
    Ok(())
}
