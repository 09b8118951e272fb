//! Build and export driver.

use std::path::Path;

use anyhow::{Context, Result};
use fastener_engine::Assembly;
use fastener_export::{write_part, ExportFormat, ExportManifest, ExportSettings};
use fastener_types::BoltParameters;
use shape_ops::KernelBundle;
use tracing::info;

/// File stem for one part of one job, e.g. `000_bolt_d8_l30`.
pub fn part_stem(index: usize, part: &str, params: &BoltParameters) -> String {
    format!(
        "{:03}_{}_d{}_l{}",
        index,
        part,
        dimension_label(params.thread.major_diameter),
        dimension_label(params.shank.total_length)
    )
}

/// `8.0` → `8`, `6.35` → `6p35`.
fn dimension_label(value: f64) -> String {
    let text = format!("{:.3}", value);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    text.replace('.', "p").replace('-', "m")
}

/// Write every part of a built assembly plus its manifest, then release the
/// solids.
pub fn export_assembly(
    kb: &mut dyn KernelBundle,
    index: usize,
    params: &BoltParameters,
    assembly: Assembly,
    out_dir: &Path,
    formats: &[ExportFormat],
    settings: &ExportSettings,
) -> Result<ExportManifest> {
    let mut manifest = ExportManifest::new(*params, settings.unit);
    let Assembly { bolt, nut } = assembly;

    let mut parts = vec![("bolt", bolt)];
    parts.extend(nut.map(|nut| ("nut", nut)));

    let mut outcome = Ok(());
    for (part, output) in &parts {
        manifest.record_diagnostics(part, &output.diagnostics);
        if outcome.is_ok() {
            let stem = part_stem(index, part, params);
            outcome = write_part(kb, &output.solid, out_dir, &stem, part, formats, settings)
                .map(|files| manifest.files.extend(files));
        }
    }
    for (_, output) in parts {
        kb.release(output.solid);
    }
    outcome.with_context(|| format!("exporting job {}", index))?;

    let manifest_path = out_dir.join(format!("{:03}_manifest.json", index));
    manifest
        .write(&manifest_path)
        .with_context(|| format!("writing {}", manifest_path.display()))?;
    info!(
        index,
        files = manifest.files.len(),
        warnings = manifest.warnings.len(),
        "exported assembly"
    );
    Ok(manifest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fastener_engine::{build_assembly, BuildOptions};
    use fastener_types::{HeadType, LengthUnit};
    use geom_kernel::MockKernel;

    #[test]
    fn test_part_stem() {
        let params =
            BoltParameters::from_designation("1/4\"-20 UNC", 25.4, HeadType::Hex, LengthUnit::Millimeter)
                .unwrap();
        assert_eq!(part_stem(3, "bolt", &params), "003_bolt_d6p35_l25p4");
        assert_eq!(dimension_label(30.0), "30");
    }

    #[test]
    fn test_export_assembly_writes_and_releases() {
        let dir = std::env::temp_dir().join(format!("boltgen-run-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);

        let mut params =
            BoltParameters::from_designation("M8", 30.0, HeadType::Hex, LengthUnit::Millimeter)
                .unwrap();
        params.nut.generate = true;
        let mut kernel = MockKernel::new();
        let assembly = build_assembly(&mut kernel, &params, &BuildOptions::default()).unwrap();

        let manifest = export_assembly(
            &mut kernel,
            0,
            &params,
            assembly,
            &dir,
            &[ExportFormat::Stl],
            &ExportSettings::default(),
        )
        .unwrap();

        assert_eq!(manifest.files.len(), 2);
        assert!(dir.join("000_bolt_d8_l30.stl").exists());
        assert!(dir.join("000_nut_d8_l30.stl").exists());
        assert!(dir.join("000_manifest.json").exists());
        assert_eq!(kernel.live_solids(), 0);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
