//! Command-line arguments and their translation into parameter sets.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use fastener_export::ExportFormat;
use fastener_types::{
    BoltParameters, HeadSpec, HeadType, LengthUnit, NutSpec, ShankSpec, ThreadSpec,
};

use crate::config::LogFormat;

/// Generate bolt and nut solids.
///
/// A parameter set comes from exactly one of `--designation`, `--params`,
/// `--batch`, or explicit dimension flags. Dimension flags given alongside a
/// designation or parameter file override the values it provides.
#[derive(Parser, Debug)]
#[command(name = "boltgen", version)]
pub struct Cli {
    /// Standard size such as `M8` or `1/4"-20 UNC`.
    #[arg(long, short = 'd', conflicts_with_all = ["params", "batch"])]
    pub designation: Option<String>,

    /// JSON file holding one parameter set.
    #[arg(long, conflicts_with = "batch")]
    pub params: Option<PathBuf>,

    /// JSON file holding an array of parameter sets, built in parallel.
    #[arg(long)]
    pub batch: Option<PathBuf>,

    /// Shank length from the underside of the head to the tip.
    #[arg(long, short = 'l')]
    pub length: Option<f64>,

    #[arg(long, conflicts_with = "head_code")]
    pub head: Option<HeadType>,

    /// Numeric head type: 0 hex, 1 socket cap, 2 flat, 3 countersunk.
    #[arg(long)]
    pub head_code: Option<i64>,

    #[arg(long)]
    pub diameter: Option<f64>,
    #[arg(long)]
    pub pitch: Option<f64>,
    #[arg(long)]
    pub minor_diameter: Option<f64>,
    #[arg(long)]
    pub grip: Option<f64>,
    #[arg(long)]
    pub body_tolerance: Option<f64>,
    /// Edge fillet radius for the bolt; clamped to a tenth of the diameter.
    #[arg(long)]
    pub fillet: Option<f64>,

    #[arg(long)]
    pub head_width: Option<f64>,
    #[arg(long)]
    pub head_height: Option<f64>,
    #[arg(long)]
    pub washer_diameter: Option<f64>,
    #[arg(long)]
    pub washer_thickness: Option<f64>,
    #[arg(long)]
    pub underhead_fillet: Option<f64>,
    #[arg(long)]
    pub socket_size: Option<f64>,
    #[arg(long)]
    pub socket_depth: Option<f64>,

    /// Also generate the mating nut.
    #[arg(long)]
    pub nut: bool,
    #[arg(long)]
    pub nut_width: Option<f64>,
    #[arg(long)]
    pub nut_height: Option<f64>,
    #[arg(long)]
    pub nut_washer: Option<f64>,
    #[arg(long)]
    pub nut_tolerance: Option<f64>,
    #[arg(long)]
    pub nut_fillet: Option<f64>,

    /// Build hex prisms by trimming a cylinder instead of extruding a hexagon.
    #[arg(long)]
    pub petals: bool,

    /// Output format; repeat for several.
    #[arg(long = "format", short = 'f', default_values_t = vec![ExportFormat::Step, ExportFormat::Stl])]
    pub formats: Vec<ExportFormat>,

    /// Overrides BOLTGEN_OUT_DIR.
    #[arg(long, short = 'o')]
    pub out_dir: Option<PathBuf>,

    /// Working length unit (`mm` or `m`). Overrides BOLTGEN_UNIT.
    #[arg(long)]
    pub unit: Option<LengthUnit>,

    /// Overrides BOLTGEN_LOG_FORMAT.
    #[arg(long, value_enum)]
    pub log_format: Option<LogFormat>,
}

impl Cli {
    fn head_type(&self) -> HeadType {
        match (self.head, self.head_code) {
            (Some(head), _) => head,
            (None, Some(code)) => HeadType::from_code(code),
            (None, None) => HeadType::Hex,
        }
    }

    /// Every parameter set this invocation asks for, in build order.
    pub fn parameter_sets(&self, unit: LengthUnit) -> Result<Vec<BoltParameters>> {
        if let Some(path) = &self.batch {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading batch file {}", path.display()))?;
            let mut sets: Vec<BoltParameters> = serde_json::from_str(&text)
                .with_context(|| format!("parsing batch file {}", path.display()))?;
            if sets.is_empty() {
                bail!("batch file {} holds no parameter sets", path.display());
            }
            for params in &mut sets {
                self.apply_overrides(params);
            }
            return Ok(sets);
        }

        let mut params = if let Some(path) = &self.params {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading parameter file {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("parsing parameter file {}", path.display()))?
        } else if let Some(designation) = &self.designation {
            let length = self
                .length
                .context("--length is required with --designation")?;
            BoltParameters::from_designation(designation, length, self.head_type(), unit)?
        } else {
            self.explicit_parameters()?
        };
        self.apply_overrides(&mut params);
        Ok(vec![params])
    }

    fn explicit_parameters(&self) -> Result<BoltParameters> {
        let required = |value: Option<f64>, flag: &str| {
            value.with_context(|| {
                format!("{} is required without --designation, --params or --batch", flag)
            })
        };
        let diameter = required(self.diameter, "--diameter")?;
        let pitch = required(self.pitch, "--pitch")?;
        let length = required(self.length, "--length")?;
        let head_width = required(self.head_width, "--head-width")?;
        let head_height = required(self.head_height, "--head-height")?;

        Ok(BoltParameters {
            thread: ThreadSpec::new(diameter, pitch),
            shank: ShankSpec::new(diameter, length),
            head: HeadSpec {
                head_type: self.head_type(),
                ..HeadSpec::hex(head_width, head_height)
            },
            // Zero nut dimensions are caught by nut validation if --nut is set.
            nut: NutSpec {
                generate: false,
                ..NutSpec::new(0.0, 0.0)
            },
        })
    }

    fn apply_overrides(&self, params: &mut BoltParameters) {
        fn set(target: &mut f64, value: Option<f64>) {
            if let Some(v) = value {
                *target = v;
            }
        }

        if let Some(d) = self.diameter {
            params.thread.major_diameter = d;
            params.shank.nominal_diameter = d;
        }
        set(&mut params.thread.pitch, self.pitch);
        if let Some(minor) = self.minor_diameter {
            params.thread.minor_diameter = Some(minor);
        }
        set(&mut params.shank.total_length, self.length);
        set(&mut params.shank.grip_length, self.grip);
        set(&mut params.shank.body_tolerance, self.body_tolerance);
        set(&mut params.shank.edge_fillet_radius, self.fillet);

        if self.head.is_some() || self.head_code.is_some() {
            params.head.head_type = self.head_type();
        }
        set(&mut params.head.width_across_flats, self.head_width);
        set(&mut params.head.height, self.head_height);
        set(&mut params.head.washer_face_diameter, self.washer_diameter);
        set(&mut params.head.washer_face_thickness, self.washer_thickness);
        set(&mut params.head.underhead_fillet_radius, self.underhead_fillet);
        set(&mut params.head.socket_size, self.socket_size);
        set(&mut params.head.socket_depth, self.socket_depth);

        if self.nut {
            params.nut.generate = true;
        }
        set(&mut params.nut.width_across_flats, self.nut_width);
        set(&mut params.nut.height, self.nut_height);
        set(&mut params.nut.washer_face_diameter, self.nut_washer);
        set(&mut params.nut.tolerance, self.nut_tolerance);
        set(&mut params.nut.edge_fillet_radius, self.nut_fillet);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("boltgen").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_designation_with_overrides() {
        let cli = parse(&["-d", "M8", "-l", "40", "--grip", "12", "--nut"]);
        let sets = cli.parameter_sets(LengthUnit::Millimeter).unwrap();
        assert_eq!(sets.len(), 1);
        let p = &sets[0];
        assert_relative_eq!(p.thread.major_diameter, 8.0);
        assert_relative_eq!(p.thread.pitch, 1.25);
        assert_relative_eq!(p.shank.total_length, 40.0);
        assert_relative_eq!(p.shank.grip_length, 12.0);
        assert!(p.nut.generate);
        assert_eq!(p.head.head_type, HeadType::Hex);
    }

    #[test]
    fn test_designation_requires_length() {
        let cli = parse(&["--designation", "M8"]);
        let err = cli.parameter_sets(LengthUnit::Millimeter).unwrap_err();
        assert!(err.to_string().contains("--length"), "{err}");
    }

    #[test]
    fn test_head_code_falls_back_to_hex() {
        let cli = parse(&["-d", "M6", "-l", "20", "--head-code", "1"]);
        let p = cli.parameter_sets(LengthUnit::Millimeter).unwrap()[0];
        assert_eq!(p.head.head_type, HeadType::SocketCap);

        let cli = parse(&["-d", "M6", "-l", "20", "--head-code", "9"]);
        let p = cli.parameter_sets(LengthUnit::Millimeter).unwrap()[0];
        assert_eq!(p.head.head_type, HeadType::Hex);
    }

    #[test]
    fn test_explicit_dimensions() {
        let cli = parse(&[
            "--diameter", "10", "--pitch", "1.5", "--length", "50",
            "--head-width", "16", "--head-height", "6.4", "--head", "flat",
        ]);
        let p = cli.parameter_sets(LengthUnit::Millimeter).unwrap()[0];
        assert_relative_eq!(p.shank.nominal_diameter, 10.0);
        assert_eq!(p.head.head_type, HeadType::Flat);
        assert!(!p.nut.generate);

        let missing = parse(&["--diameter", "10", "--pitch", "1.5"]);
        let err = missing.parameter_sets(LengthUnit::Millimeter).unwrap_err();
        assert!(err.to_string().contains("--length"), "{err}");
    }

    #[test]
    fn test_conflicting_sources_rejected() {
        assert!(Cli::try_parse_from(["boltgen", "-d", "M8", "--params", "p.json"]).is_err());
        assert!(Cli::try_parse_from(["boltgen", "--head", "hex", "--head-code", "1"]).is_err());
    }

    #[test]
    fn test_formats_and_unit() {
        let cli = parse(&["-d", "M8", "-l", "30"]);
        assert_eq!(cli.formats, vec![ExportFormat::Step, ExportFormat::Stl]);
        assert_eq!(cli.unit, None);

        let cli = parse(&["-d", "M8", "-l", "30", "-f", "brep", "-f", "stp", "--unit", "m"]);
        assert_eq!(cli.formats, vec![ExportFormat::Brep, ExportFormat::Step]);
        assert_eq!(cli.unit, Some(LengthUnit::Meter));
    }

    #[test]
    fn test_batch_file() {
        let path = std::env::temp_dir().join(format!("boltgen-batch-{}.json", std::process::id()));
        let sets: Vec<BoltParameters> = ["M6", "M10"]
            .iter()
            .map(|d| {
                BoltParameters::from_designation(d, 25.0, HeadType::Hex, LengthUnit::Millimeter)
                    .unwrap()
            })
            .collect();
        std::fs::write(&path, serde_json::to_string(&sets).unwrap()).unwrap();

        let cli = parse(&["--batch", path.to_str().unwrap(), "--nut"]);
        let loaded = cli.parameter_sets(LengthUnit::Millimeter).unwrap();
        assert_eq!(loaded.len(), 2);
        assert!(loaded.iter().all(|p| p.nut.generate));
        assert_relative_eq!(loaded[1].thread.major_diameter, 10.0);

        let _ = std::fs::remove_file(&path);
    }
}
