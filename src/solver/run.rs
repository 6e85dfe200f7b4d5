use std::error::Error;

use tracing::{info, span, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::{constant, Settings};
use crate::evaluation::audit;
use crate::fixtures::data_generator::generate_scenario;
use crate::report::{print_report, print_status, save_to_csv};
use crate::setup::init::{build_fleet, load_scenario};
use crate::setup::init_types::Scenario;
use crate::solver::simulation::{simulate, SimOptions};

/// Initialize tracing; `RUST_LOG` picks the level.
fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer().with_target(false))
        .try_init();
}

/// Loads the configured CSV files, or a seeded fixture day if they cannot be read.
fn load_or_generate(settings: &Settings) -> Result<Scenario, Box<dyn Error>> {
    match load_scenario(settings) {
        Ok(scenario) => Ok(scenario),
        Err(err) => {
            warn!(
                "Failed to load input files ({}). Falling back to generated scenario.",
                err
            );
            Ok(generate_scenario(
                constant::SEED,
                constant::FIXTURE_PACKAGES,
                constant::FIXTURE_LOCATIONS,
            )?)
        }
    }
}

pub fn run() -> Result<(), Box<dyn Error>> {
    init_tracing();
    let settings = Settings::from_env()?;

    let Scenario {
        mut store,
        distances,
        warnings: load_warnings,
    } = {
        let span = span!(Level::INFO, "setup");
        let _guard = span.enter();
        load_or_generate(&settings)?
    };

    info!(
        "Starting delivery simulation with {} packages and {} vehicles",
        store.len(),
        settings.fleet_size
    );

    let fleet = build_fleet(&settings);
    let options = SimOptions::from_settings(&settings);
    let mut report = simulate(&mut store, &distances, fleet, &options)?;

    let mut warnings = load_warnings;
    warnings.append(&mut report.warnings);
    report.warnings = warnings;
    if !report.warnings.is_empty() {
        warn!("{} warnings during the run", report.warnings.len());
    }

    let violations = audit(&report, &distances);

    print_report(&report);
    if let Some(at) = settings.status_at {
        print_status(&report, &store, at);
    }
    save_to_csv(&report, &store, &settings.report_csv)?;

    if !violations.is_empty() {
        return Err(format!("{} audit violations", violations.len()).into());
    }
    Ok(())
}
