use geom_kernel::{KernelSolidHandle, ShapeFormat};
use shape_ops::KernelBundle;

use crate::errors::ExportError;

/// Serialize a solid in the kernel's native boundary representation.
///
/// Native files are written in the working unit, unscaled.
pub fn export_brep(kb: &dyn KernelBundle, solid: &KernelSolidHandle) -> Result<String, ExportError> {
    Ok(kb.write_shape(solid, ShapeFormat::Brep)?)
}
