//! `boltgen`: build bolt and nut solids from command-line parameters and
//! write them as BREP, STEP or STL.
//!
//! Environment:
//!
//! - `BOLTGEN_OUT_DIR` output directory (default `./out`)
//! - `BOLTGEN_UNIT` working unit, `mm` or `m`
//! - `BOLTGEN_HELIX_SEGMENTS`, `BOLTGEN_BOOLEAN_TOLERANCE`,
//!   `BOLTGEN_MEASURE_TOLERANCE` truck kernel tuning
//! - `BOLTGEN_LOG_FORMAT` `pretty` or `json`
//! - `RUST_LOG` log filter (default `info`)

use anyhow::{bail, Result};
use clap::Parser;
use fastener_engine::{run_batch, BuildOptions};
use fastener_export::ExportSettings;
use geom_kernel::TruckKernel;
use shape_ops::HexConstruction;

mod cli;
mod config;
mod run;

use cli::Cli;
use config::{Config, LogFormat};

fn init_logging(format: LogFormat) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Pretty => builder.pretty().init(),
        LogFormat::Json => builder.json().init(),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::from_env();
    if let Some(dir) = &cli.out_dir {
        config.out_dir = dir.clone();
    }
    if let Some(unit) = cli.unit {
        config.unit = unit;
    }
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }
    init_logging(config.log_format);

    tracing::info!(
        out_dir = %config.out_dir.display(),
        unit = ?config.unit,
        helix_segments = config.truck.helix_segments_per_turn,
        boolean_tolerance = config.truck.boolean_tolerance,
        "Starting boltgen"
    );

    let jobs = cli.parameter_sets(config.unit)?;
    let options = BuildOptions {
        hex_construction: if cli.petals {
            HexConstruction::Petals
        } else {
            HexConstruction::Polygon
        },
    };
    let settings = ExportSettings {
        unit: config.unit,
        ..ExportSettings::default()
    };

    let truck = config.truck;
    let items = run_batch(
        &jobs,
        &options,
        || TruckKernel::with_config(truck),
        |index, kernel, assembly| {
            run::export_assembly(
                kernel,
                index,
                &jobs[index],
                assembly,
                &config.out_dir,
                &cli.formats,
                &settings,
            )
        },
    );

    let mut failed = 0;
    for item in items {
        match item.result {
            Ok(Ok(manifest)) => {
                for warning in &manifest.warnings {
                    tracing::warn!(index = item.index, "{}", warning);
                }
            }
            Ok(Err(e)) => {
                failed += 1;
                let message = format!("{:#}", e);
                tracing::error!(index = item.index, error = %message, "export failed");
            }
            Err(e) => {
                failed += 1;
                tracing::error!(index = item.index, error = %e, "build failed");
            }
        }
    }

    if failed > 0 {
        bail!("{} of {} parameter sets failed", failed, jobs.len());
    }
    Ok(())
}
