use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use realign_core::{
    AnchorPoint, ComputeOptions, ComputedView, CorePlan, DisplayZone, EventItem, EventTiming,
    LocalStamp, PlanParams, compute_plan_with,
};
use std::path::{Path, PathBuf};
use tracing::info;

mod calendar;
mod config;
mod logging;
mod render;
mod state;

#[derive(Parser, Debug)]
#[command(
    name = "realign",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("REALIGN_BUILD_SHA"), ")"),
    about = "Plan a day-by-day shift of your sleep onto a new time zone"
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute the schedule for a plan file and print it
    Compute {
        /// Plan JSON file
        #[arg(long)]
        plan: PathBuf,

        /// Zone to display times in: home or target (default from config)
        #[arg(long)]
        display: Option<DisplayZone>,

        /// Print the full computed view as JSON
        #[arg(long)]
        json: bool,
    },

    /// Export sleep and bright-light blocks as an ICS calendar
    ExportIcs {
        /// Plan JSON file
        #[arg(long)]
        plan: PathBuf,

        /// Write to a file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Print a sample plan to start from
    Sample,

    /// Manage ~/.realign/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write the default config if none exists
    Init,

    /// Print the effective config
    Show,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli.command {
        Command::Compute {
            plan,
            display,
            json,
        } => {
            let cfg = config::load_config()?;
            let view = compute_from_file(&plan, &cfg.compute_options(display))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else {
                print!("{}", render::format_table(&view));
            }
        }

        Command::ExportIcs { plan, out } => {
            let cfg = config::load_config()?;
            let view = compute_from_file(&plan, &cfg.compute_options(None))?;
            let ics = calendar::events_to_ics(&calendar::view_to_events(&view));
            match out {
                Some(path) => {
                    std::fs::write(&path, ics)
                        .with_context(|| format!("write {}", path.display()))?;
                    println!("Wrote {}", path.display());
                }
                None => print!("{ics}"),
            }
        }

        Command::Sample => {
            println!("{}", serde_json::to_string_pretty(&sample_plan())?);
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => {
                let cfg = config::load_config()?;
                println!("# {}", config::config_path()?.display());
                print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
            }
        },
    }

    Ok(())
}

fn compute_from_file(path: &Path, options: &ComputeOptions) -> Result<ComputedView> {
    if !path.exists() {
        bail!(
            "Plan not found: {} (start from `realign sample > plan.json`)",
            path.display()
        );
    }
    let plan = state::read_plan(path)?;
    info!(
        plan = %path.display(),
        anchors = plan.anchors.len(),
        events = plan.events.len(),
        "computing plan"
    );
    compute_plan_with(&plan, options).with_context(|| format!("computing {}", path.display()))
}

fn sample_plan() -> CorePlan {
    CorePlan {
        params: PlanParams {
            home_zone: "America/New_York".into(),
            target_zone: "Europe/Paris".into(),
            start_sleep: LocalStamp::new("2026-06-01", "23:00", "America/New_York"),
            sleep_hours: 8.0,
            max_later_per_day: 1.5,
            max_earlier_per_day: 1.0,
        },
        anchors: vec![
            AnchorPoint::sleep(
                "overnight-flight",
                LocalStamp::new("2026-06-03", "20:00", "America/New_York"),
            )
            .with_note("sleep on the plane"),
        ],
        events: vec![EventItem {
            id: "flight".into(),
            title: "JFK -> CDG".into(),
            timing: EventTiming::Span {
                start: LocalStamp::new("2026-06-03", "18:30", "America/New_York"),
                end: LocalStamp::new("2026-06-04", "08:00", "Europe/Paris"),
            },
        }],
    }
}
