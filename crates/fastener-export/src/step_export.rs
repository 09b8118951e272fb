use fastener_types::LengthUnit;
use geom_kernel::{KernelSolidHandle, ShapeFormat, Transform};
use shape_ops::KernelBundle;
use tracing::debug;

use crate::errors::ExportError;

/// Export a solid to STEP AP203.
///
/// STEP files are always written in millimetres. When the working unit is
/// not millimetres a scaled copy is written and released afterwards; the
/// input solid is never modified.
pub fn export_step(
    kb: &mut dyn KernelBundle,
    solid: &KernelSolidHandle,
    unit: LengthUnit,
) -> Result<String, ExportError> {
    let factor = unit.millimeters_per_unit();
    if (factor - 1.0).abs() < f64::EPSILON {
        return Ok(kb.write_shape(solid, ShapeFormat::Step)?);
    }

    debug!(factor, ?unit, "scaling solid to millimetres for STEP");
    let scaled = kb.transform(solid, &Transform::uniform_scale([0.0; 3], factor))?;
    let written = kb.write_shape(&scaled, ShapeFormat::Step);
    kb.release(scaled);
    Ok(written?)
}
