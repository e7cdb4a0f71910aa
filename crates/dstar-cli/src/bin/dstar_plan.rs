//! Runs a planning scenario and prints each planning call.
//!
//! Usage:
//!   cargo run -p dstar-cli --bin dstar_plan -- --scenario detour --render
//!   cargo run -p dstar-cli --bin dstar_plan -- --scenario my_map.json --json

use anyhow::{Context, Result};
use clap::Parser;
use dstar_cli::{render_ascii, Scenario, ScenarioRunner, StepReport};
use dstar_core::{GridGeometry, PlanOutcome};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about = "Incremental D* planning over a scenario")]
struct Args {
    /// Built-in scenario (open, detour, wall, random) or a scenario JSON file.
    /// Planner settings come from DSTAR_LETHAL_COST, DSTAR_FACTOR and
    /// DSTAR_SIM_DISTANCE unless the file has its own `config` block.
    #[arg(long, default_value = "detour")]
    scenario: String,

    /// Grid width for built-in scenarios
    #[arg(long, default_value_t = 10)]
    width: usize,

    /// Grid height for built-in scenarios
    #[arg(long, default_value_t = 10)]
    height: usize,

    /// Obstacle count for the random scenario
    #[arg(long, default_value_t = 20)]
    obstacles: usize,

    /// Seed for the random scenario
    #[arg(long, default_value_t = 7)]
    seed: u64,

    /// Draw the grid after every step
    #[arg(long)]
    render: bool,

    /// Print step reports as JSON lines
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("dstar_plan=info".parse()?)
                .add_directive("dstar_cli=info".parse()?)
                .add_directive("dstar_core=info".parse()?),
        )
        .init();

    let args = Args::parse();
    let scenario = match Scenario::builtin(
        &args.scenario,
        args.width,
        args.height,
        args.obstacles,
        args.seed,
    ) {
        Some(scenario) => scenario,
        None => Scenario::load(&args.scenario)
            .with_context(|| format!("unknown scenario {}", args.scenario))?,
    };

    tracing::info!(
        "Running scenario {} on a {}x{} grid",
        scenario.name,
        scenario.width,
        scenario.height
    );

    let threshold = scenario.config.lethal_threshold();
    let geometry = scenario.geometry();
    let mut runner = ScenarioRunner::new(&scenario)?;
    let mut found = 0;
    let mut steps = 0;

    while let Some(report) = runner.step()? {
        steps += 1;
        if report.outcome.is_found() {
            found += 1;
        }

        if args.json {
            println!("{}", serde_json::to_string(&report)?);
        } else {
            print_report(&geometry, &report);
        }
        if args.render {
            let text = render_ascii(
                &geometry,
                runner.costs(),
                threshold,
                report.outcome.path(),
                report.robot,
                scenario.goal,
            );
            println!("{text}");
        }
    }

    if !args.json {
        println!("\n{found}/{steps} planning calls found a path");
    }
    Ok(())
}

fn print_report(geometry: &GridGeometry, report: &StepReport) {
    let stats = report.outcome.stats();
    let (wx, wy) = geometry.grid_to_world(report.robot);
    println!(
        "\n=== step {} from ({}, {}) at ({:.2}, {:.2}) m [{:?}] ===",
        report.step, report.robot.x, report.robot.y, wx, wy, stats.mode
    );
    match &report.outcome {
        PlanOutcome::Found { path, expanded, .. } => {
            println!(
                "Result: OK | points={} expanded={} processed={} repairs={} length={:.3} m",
                path.len(),
                expanded.len(),
                stats.states_processed,
                stats.repairs,
                stats.path_cost.unwrap_or_default() * geometry.resolution
            );
        }
        PlanOutcome::NotFound { expanded, .. } => {
            println!(
                "Result: NO PATH | expanded={} processed={}",
                expanded.len(),
                stats.states_processed
            );
        }
    }
}
