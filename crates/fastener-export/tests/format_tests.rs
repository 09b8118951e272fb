use std::path::PathBuf;

use fastener_engine::{build_assembly, BuildOptions};
use fastener_export::{
    write_part, write_solid, ExportError, ExportFormat, ExportManifest, ExportSettings,
};
use fastener_types::{BoltParameters, HeadType, LengthUnit};
use geom_kernel::{Kernel, MockKernel};

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "fastener-export-{}-{}",
        name,
        std::process::id()
    ));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

fn m8_params() -> BoltParameters {
    let mut params =
        BoltParameters::from_designation("M8", 30.0, HeadType::Hex, LengthUnit::Millimeter)
            .unwrap();
    params.nut.generate = true;
    params
}

#[test]
fn writes_every_format_for_bolt_and_nut() {
    let dir = scratch_dir("all-formats");
    let params = m8_params();
    let mut kernel = MockKernel::new();
    let assembly = build_assembly(&mut kernel, &params, &BuildOptions::default()).unwrap();
    let settings = ExportSettings::default();

    let mut manifest = ExportManifest::new(params, settings.unit);
    let files = write_part(
        &mut kernel,
        &assembly.bolt.solid,
        &dir,
        "m8x30_bolt",
        "bolt",
        &ExportFormat::ALL,
        &settings,
    )
    .unwrap();
    manifest.files.extend(files);
    manifest.record_diagnostics("bolt", &assembly.bolt.diagnostics);

    let nut = assembly.nut.as_ref().unwrap();
    let files = write_part(
        &mut kernel,
        &nut.solid,
        &dir,
        "m8_nut",
        "nut",
        &[ExportFormat::Stl],
        &settings,
    )
    .unwrap();
    manifest.files.extend(files);
    manifest.write(&dir.join("manifest.json")).unwrap();

    assert_eq!(manifest.files.len(), 4);
    for file in &manifest.files {
        let len = std::fs::metadata(&file.path).unwrap().len();
        assert!(len > 0, "{} is empty", file.path.display());
    }
    let stl = std::fs::read(dir.join("m8_nut.stl")).unwrap();
    assert_eq!(&stl[..15], b"binary STL: m8_");

    let manifest_json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(dir.join("manifest.json")).unwrap())
            .unwrap();
    assert_eq!(manifest_json["files"].as_array().unwrap().len(), 4);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn unknown_extension_is_rejected_before_writing() {
    let dir = scratch_dir("unknown");
    let mut kernel = MockKernel::new();
    let rod = kernel.make_cylinder(4.0, 30.0).unwrap();
    let path = dir.join("rod.obj");
    let err = write_solid(&mut kernel, &rod, &path, &ExportSettings::default()).unwrap_err();
    assert!(matches!(err, ExportError::UnknownFormat(_)));
    assert!(!path.exists());
}

#[test]
fn step_extension_alias() {
    let dir = scratch_dir("stp");
    let mut kernel = MockKernel::new();
    let rod = kernel.make_cylinder(0.004, 0.03).unwrap();
    let settings = ExportSettings {
        unit: LengthUnit::Meter,
        ..ExportSettings::default()
    };
    let path = dir.join("nested").join("rod.stp");
    let format = write_solid(&mut kernel, &rod, &path, &settings).unwrap();
    assert_eq!(format, ExportFormat::Step);

    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let top = written["bbox"]["max"][2].as_f64().unwrap();
    assert!((top - 30.0).abs() < 1e-9, "STEP top at {}", top);

    let _ = std::fs::remove_dir_all(&dir);
}
