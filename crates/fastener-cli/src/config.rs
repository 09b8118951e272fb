//! Run configuration loaded from environment variables.

use std::path::PathBuf;
use std::str::FromStr;

use clap::ValueEnum;
use fastener_types::LengthUnit;
use geom_kernel::TruckConfig;

/// Log output style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Settings that can come from the environment. Command-line flags override
/// them in `main`.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Directory receiving exported files.
    pub out_dir: PathBuf,
    /// Working length unit of every parameter set.
    pub unit: LengthUnit,
    pub log_format: LogFormat,
    /// Truck backend tuning.
    pub truck: TruckConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup. Unset or unparsable
    /// values fall back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = TruckConfig::default();
        Self {
            out_dir: lookup("BOLTGEN_OUT_DIR")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./out")),
            unit: parse_var(&lookup, "BOLTGEN_UNIT").unwrap_or_default(),
            log_format: lookup("BOLTGEN_LOG_FORMAT")
                .and_then(|v| LogFormat::from_str(v.trim(), true).ok())
                .unwrap_or_default(),
            truck: TruckConfig {
                helix_segments_per_turn: parse_var(&lookup, "BOLTGEN_HELIX_SEGMENTS")
                    .filter(|n: &usize| *n >= 4)
                    .unwrap_or(defaults.helix_segments_per_turn),
                boolean_tolerance: parse_var(&lookup, "BOLTGEN_BOOLEAN_TOLERANCE")
                    .filter(|t: &f64| *t > 0.0)
                    .unwrap_or(defaults.boolean_tolerance),
                measure_tolerance: parse_var(&lookup, "BOLTGEN_MEASURE_TOLERANCE")
                    .filter(|t: &f64| *t > 0.0)
                    .unwrap_or(defaults.measure_tolerance),
            },
        }
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key).and_then(|v| v.trim().parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
