mod cli;
mod config;
mod editor;
mod report;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use edir_core::prelude::*;
use editor::ExternalEditor;
use log::{debug, warn};
use report::Reporter;
use simplelog::{ColorChoice, ConfigBuilder, LevelFilter, TermLogger, TerminalMode};
use std::env;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Exit code for errors that stop the run before anything is applied.
const FATAL: u8 = 2;

fn init_logging(verbose: u8, color: bool) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let config = ConfigBuilder::new()
        .set_time_level(LevelFilter::Off)
        .set_target_level(LevelFilter::Off)
        .build();
    let colors = if color { ColorChoice::Auto } else { ColorChoice::Never };
    if let Err(err) = TermLogger::init(level, config, TerminalMode::Stderr, colors) {
        eprintln!("edir: cannot initialise logging: {err}");
    }
}

/// Turns the resolved arguments into catalog sources; `-` reads stdin.
fn sources(args: &[String]) -> Result<Vec<Source>> {
    let mut sources = Vec::with_capacity(args.len());
    for arg in args {
        if arg == "-" {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("reading paths from stdin")?;
            sources.push(Source::Listing(text));
        } else {
            sources.push(Source::Path(arg.clone()));
        }
    }
    Ok(sources)
}

/// What a run will apply: either an edited listing or a replayed actions file.
struct Work {
    catalog: Catalog,
    lines: Vec<EditedLine>,
    /// Actions file lines that could not be understood.
    invalid: usize,
}

fn edited_work(fs: &RealFileSystem, config: &RunConfig) -> Result<Option<Work>> {
    let catalog = match Catalog::build(fs, config, &sources(&config.args)?) {
        Ok(catalog) => catalog,
        Err(CoreError::EmptyCatalog { what }) => {
            println!("No {what}.");
            return Ok(None);
        }
        Err(err) => return Err(err.into()),
    };
    let editor = ExternalEditor::from_env()?;
    let lines = edit_listing(&catalog, &config.suffix, &editor)?;
    Ok(Some(Work {
        catalog,
        lines,
        invalid: 0,
    }))
}

fn replayed_work(
    fs: &RealFileSystem,
    config: &RunConfig,
    path: &Path,
    reporter: &Reporter,
) -> Result<Option<Work>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading actions file {}", path.display()))?;
    let parsed = ActionsFile::parse(&text)?;

    if let Some(workdir) = &parsed.workdir {
        let cwd = env::current_dir().context("resolving the current directory")?;
        if workdir != &cwd {
            warn!(
                "actions file was written in {}, replaying in {}",
                workdir.display(),
                cwd.display()
            );
        }
    }
    for (number, line) in &parsed.invalid {
        eprintln!("{}", reporter.error_text(&format!("unsupported action on line {number}: {line}")));
    }
    if parsed.actions.is_empty() {
        return Ok(Some(Work {
            catalog: Catalog::default(),
            lines: Vec::new(),
            invalid: parsed.invalid.len(),
        }));
    }

    let (catalog, lines) = parsed.replay(fs, config)?;
    Ok(Some(Work {
        catalog,
        lines,
        invalid: parsed.invalid.len(),
    }))
}

fn save_failures(report: &Report, reporter: &Reporter) -> Result<()> {
    let actions = actions::failed_actions(report);
    if actions.is_empty() {
        return Ok(());
    }
    let workdir = env::current_dir().context("resolving the current directory")?;
    match actions::write_actions_file(Path::new("."), &workdir, &actions) {
        Ok(path) => {
            let path: PathBuf = if path.is_absolute() { path } else { workdir.join(path) };
            eprintln!("{}", reporter.actions_file_notice(&path));
        }
        Err(err) => eprintln!(
            "{}",
            reporter.error_text(&format!("cannot write actions file, failed actions are lost: {err}"))
        ),
    }
    Ok(())
}

fn run() -> Result<u8> {
    let cli = Cli::parse_from(config::command_line(env::args_os())?);
    let color = !cli.no_color;
    init_logging(cli.verbose, color);

    let input_from = cli.input_from.clone();
    let config = cli.into_config(io::stdin().is_terminal());
    debug!("{config:?}");
    let reporter = Reporter::new(color, config.quiet);

    let fs = RealFileSystem;
    let backends = Backends::discover(&fs, &config)?;

    let work = match &input_from {
        Some(path) => replayed_work(&fs, &config, path, &reporter)?,
        None => edited_work(&fs, &config)?,
    };
    let Some(work) = work else {
        return Ok(0);
    };

    let report = if work.lines.is_empty() {
        Report::default()
    } else {
        apply(&fs, &backends, work.catalog, &work.lines, config.recurse)
    };

    for line in reporter.applied_lines(&report) {
        println!("{line}");
    }
    for line in reporter.failure_lines(&report) {
        eprintln!("{line}");
    }
    save_failures(&report, &reporter)?;

    let failed = report.failed().count() + work.invalid;
    Ok(ExitStatusLike::from_counts(report.applied().count(), failed).as_code())
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            eprintln!("edir: {err:#}");
            ExitCode::from(FATAL)
        }
    }
}
