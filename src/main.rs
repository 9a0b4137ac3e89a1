//! Command-line front end for a planning's periods.
//!
//! ```bash
//! # list the periods of a planning (remembered for later calls)
//! period-planner --planning 64f0c2 --weeks 12 list
//!
//! # pick week 2 then week 5 to create a period
//! period-planner --schedule plan.json create 2 5
//!
//! # inspect upper-body work inside the first period
//! period-planner --schedule plan.json exercises 0 --upper
//! ```

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use log::{info, warn};
use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use period_planner::export::{save_assignments_csv, save_periods_csv, save_periods_json};
use period_planner::{
    CategoryFlags, HttpGateway, PeriodEditor, PeriodStore, ScheduledExercise, Selection, Settings,
    Timeline, filter_exercises,
};

type Result<T> = std::result::Result<T, Box<dyn Error>>;

#[derive(Parser)]
#[command(
    name = "period-planner",
    about = "Manage the training periods of a planning",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Planning identifier (defaults to the last one used)
    #[arg(long, global = true)]
    planning: Option<String>,

    /// Number of weeks in the plan
    #[arg(long, global = true)]
    weeks: Option<u32>,

    /// Calendar date of the first day of week 1 (YYYY-MM-DD)
    #[arg(long, global = true)]
    starts_on: Option<NaiveDate>,

    /// JSON file with the plan's scheduled exercises
    #[arg(long, global = true)]
    schedule: Option<PathBuf>,

    /// Backend base URL override
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Show every period of the planning
    List,

    /// Create a period by picking its two boundary weeks
    Create { first: u32, second: u32 },

    /// Delete the period at a position
    Delete { index: usize },

    /// Show the exercises of a period, optionally filtered
    Exercises {
        index: usize,

        /// Case-insensitive text matched against names and muscle groups
        #[arg(long, default_value = "")]
        search: String,

        #[arg(long)]
        upper: bool,

        #[arg(long)]
        lower: bool,

        #[arg(long)]
        core: bool,

        #[arg(long)]
        cardio: bool,
    },

    /// Write the periods to disk
    Export {
        /// Period summary as CSV
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Full periods as JSON
        #[arg(long)]
        json: Option<PathBuf>,

        /// One CSV row per exercise of every period
        #[arg(long)]
        assignments: Option<PathBuf>,
    },
}

fn load_schedule(path: Option<&Path>) -> Result<Vec<ScheduledExercise>> {
    match path {
        Some(p) => {
            let data = std::fs::read_to_string(p)?;
            let schedule: Vec<ScheduledExercise> = serde_json::from_str(&data)?;
            info!("Loaded {} scheduled exercises from {}", schedule.len(), p.display());
            Ok(schedule)
        }
        None => Ok(Vec::new()),
    }
}

fn print_periods(store: &PeriodStore<HttpGateway>) {
    if store.is_empty() {
        println!("No periods yet.");
        return;
    }
    let timeline = store.timeline();
    for (i, p) in store.periods().iter().enumerate() {
        let dates = timeline
            .range_span(p.range())
            .map(|(s, e)| format!("  {s} to {e}"))
            .unwrap_or_default();
        let unsaved = if p.is_persisted() { "" } else { "  [unsaved]" };
        println!(
            "{i:>3}  {:<24} {:<12}{dates}  {} exercises{unsaved}",
            p.name,
            p.range().to_string(),
            p.exercises.len()
        );
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut settings = Settings::load();
    let planning = cli
        .planning
        .clone()
        .or_else(|| settings.last_planning_id.clone())
        .ok_or("no planning selected; pass --planning")?;

    let mut timeline = Timeline::new(cli.weeks.unwrap_or(settings.default_total_weeks));
    if let Some(date) = cli.starts_on {
        timeline = timeline.starting_on(date);
    }
    let base_url = cli.base_url.as_deref().unwrap_or(&settings.api_base_url);
    let gateway = HttpGateway::new(base_url, settings.auth_context());
    let schedule = load_schedule(cli.schedule.as_deref())?;

    let mut store = PeriodStore::new(planning.as_str(), timeline, schedule, gateway);
    store.load_periods()?;

    if settings.last_planning_id.as_deref() != Some(planning.as_str()) {
        settings.last_planning_id = Some(planning);
        if let Err(e) = settings.save() {
            warn!("Could not save settings: {e}");
        }
    }

    match cli.command {
        Command::List => print_periods(&store),
        Command::Create { first, second } => {
            let mut editor = PeriodEditor::new(store);
            editor.select(first)?;
            match editor.select(second)? {
                Selection::Created(p) => println!("Created {} ({})", p.name, p.range()),
                Selection::Discarded(e) => println!("Nothing created: {e}"),
                Selection::Pending(w) => println!("Waiting for a second week after {w}"),
            }
        }
        Command::Delete { index } => {
            let outcome = store.delete_period(index)?;
            println!("Deleted {}", outcome.removed.name);
            if let Err(e) = outcome.remote {
                eprintln!("Warning: the backend did not confirm the delete: {e}");
            }
        }
        Command::Exercises {
            index,
            search,
            upper,
            lower,
            core,
            cardio,
        } => {
            let period = store
                .get(index)
                .ok_or_else(|| format!("no period at position {index}"))?;
            let flags = CategoryFlags {
                upper_body: upper,
                lower_body: lower,
                core,
                cardio,
            };
            let shown = filter_exercises(&period.exercises, &search, &flags);
            println!(
                "{} ({}): {} of {} exercises",
                period.name,
                period.range(),
                shown.len(),
                period.exercises.len()
            );
            for a in shown {
                println!(
                    "  {:<28} {:>5.1}%  {}",
                    a.exercise.name,
                    a.variant.percentage,
                    a.exercise.muscle_groups.join(", ")
                );
            }
        }
        Command::Export {
            csv,
            json,
            assignments,
        } => {
            if csv.is_none() && json.is_none() && assignments.is_none() {
                return Err("nothing to export; pass --csv, --json or --assignments".into());
            }
            if let Some(path) = csv {
                save_periods_csv(&path, store.periods(), &store.timeline())?;
                info!("Wrote {}", path.display());
            }
            if let Some(path) = json {
                save_periods_json(&path, store.periods())?;
                info!("Wrote {}", path.display());
            }
            if let Some(path) = assignments {
                save_assignments_csv(&path, store.periods())?;
                info!("Wrote {}", path.display());
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
