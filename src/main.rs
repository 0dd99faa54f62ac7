use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};

use daynight::app::{App, AppOptions, RunOptions};
use daynight::controller::{Status, TickOutcome};

/// Switch the desktop theme and color scheme between day and night.
#[derive(Debug, Parser)]
#[command(name = "daynight", version, about)]
struct Cli {
    /// Directory holding settings.json and config.json
    #[arg(long, global = true, value_name = "DIR")]
    config_dir: Option<PathBuf>,

    /// Use an in-memory host; nothing on the desktop or on disk changes
    #[arg(long, global = true)]
    dry_run: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Keep the appearance in sync with the schedule (default)
    Run {
        /// Seconds between evaluations, overriding config.json
        #[arg(long, value_name = "SECS")]
        interval: Option<u64>,

        /// Read `toggle`, `tick` and `quit` commands from stdin
        #[arg(long)]
        interactive: bool,
    },
    /// Evaluate the schedule once
    Tick,
    /// Flip to the opposite appearance and pause the schedule
    Toggle,
    /// Show the schedule and the current appearance
    Status,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let options = AppOptions {
        config_dir: cli.config_dir,
        dry_run: cli.dry_run,
    };

    match cli.command.unwrap_or(Command::Run {
        interval: None,
        interactive: false,
    }) {
        Command::Run {
            interval,
            interactive,
        } => {
            let run = RunOptions {
                interval: interval.map(Duration::from_secs),
                interactive,
            };
            daynight::run(options, run).context("scheduler failed")?;
        }
        Command::Tick => {
            daynight::logging::init();
            let outcome = App::new(options)?.tick().context("tick failed")?;
            println!("{}", describe_outcome(&outcome));
        }
        Command::Toggle => {
            daynight::logging::init();
            let (window, pair) = App::new(options)?.toggle().context("toggle failed")?;
            println!("toggled to {window}: {pair} (schedule paused)");
        }
        Command::Status => {
            daynight::logging::init_with_default("warn");
            let status = App::new(options)?.status().context("status failed")?;
            print_status(&status);
        }
    }
    Ok(())
}

fn describe_outcome(outcome: &TickOutcome) -> String {
    match outcome {
        TickOutcome::Disabled => "disabled; nothing to do".to_string(),
        TickOutcome::Applied { window, pair } => format!("applied {window}: {pair}"),
        TickOutcome::Unchanged { window } => format!("{window} appearance already active"),
        TickOutcome::Resumed { window } => {
            format!("manual appearance confirmed; schedule resumes ({window})")
        }
        TickOutcome::StillPaused { window } => format!("paused; schedule says {window}"),
    }
}

fn print_status(status: &Status) {
    println!("enabled:  {}", status.enabled);
    println!("state:    {}", status.state);
    println!("window:   {}", status.window);
    println!("day:      {}", status.day);
    println!("night:    {}", status.night);
    println!("target:   {}", status.target);
    println!("observed: {}", status.observed);
}
