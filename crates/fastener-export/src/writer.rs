use std::path::{Path, PathBuf};

use fastener_types::LengthUnit;
use geom_kernel::KernelSolidHandle;
use serde::{Deserialize, Serialize};
use shape_ops::KernelBundle;
use tracing::info;

use crate::brep::export_brep;
use crate::errors::ExportError;
use crate::format::ExportFormat;
use crate::manifest::ExportedFile;
use crate::step_export::export_step;
use crate::stl::{export_stl, StlOptions};

/// Settings shared by every writer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportSettings {
    /// Working unit of the solids being written.
    pub unit: LengthUnit,
    pub stl: StlOptions,
}

/// Encode a solid in the given format.
pub fn encode_solid(
    kb: &mut dyn KernelBundle,
    solid: &KernelSolidHandle,
    format: ExportFormat,
    name: &str,
    settings: &ExportSettings,
) -> Result<Vec<u8>, ExportError> {
    match format {
        ExportFormat::Brep => Ok(export_brep(kb, solid)?.into_bytes()),
        ExportFormat::Step => Ok(export_step(kb, solid, settings.unit)?.into_bytes()),
        ExportFormat::Stl => export_stl(kb, solid, name, &settings.stl),
    }
}

/// Write a solid to `path`, picking the format from the extension.
pub fn write_solid(
    kb: &mut dyn KernelBundle,
    solid: &KernelSolidHandle,
    path: &Path,
    settings: &ExportSettings,
) -> Result<ExportFormat, ExportError> {
    let format = ExportFormat::from_path(path)?;
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("solid");
    let bytes = encode_solid(kb, solid, format, name, settings)?;
    write_bytes(path, &bytes)?;
    info!(path = %path.display(), %format, bytes = bytes.len(), "wrote solid");
    Ok(format)
}

/// Write one part in several formats as `<dir>/<stem>.<ext>`.
pub fn write_part(
    kb: &mut dyn KernelBundle,
    solid: &KernelSolidHandle,
    dir: &Path,
    stem: &str,
    part: &str,
    formats: &[ExportFormat],
    settings: &ExportSettings,
) -> Result<Vec<ExportedFile>, ExportError> {
    formats
        .iter()
        .map(|&format| {
            let path: PathBuf = dir.join(format!("{}.{}", stem, format.extension()));
            write_solid(kb, solid, &path, settings)?;
            Ok(ExportedFile {
                part: part.to_string(),
                format,
                path,
            })
        })
        .collect()
}

pub(crate) fn write_bytes(path: &Path, bytes: &[u8]) -> Result<(), ExportError> {
    let io_err = |source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    std::fs::write(path, bytes).map_err(io_err)
}
