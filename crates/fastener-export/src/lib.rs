//! Writers for finished solids: native BREP, STEP in millimetres, and
//! binary STL, plus a JSON manifest describing a build.

pub mod brep;
pub mod errors;
pub mod format;
pub mod manifest;
pub mod step_export;
pub mod stl;
pub mod writer;

pub use brep::export_brep;
pub use errors::ExportError;
pub use format::ExportFormat;
pub use manifest::{ExportManifest, ExportedFile, MANIFEST_VERSION};
pub use step_export::export_step;
pub use stl::{encode_binary_stl, export_stl, stl_tolerance, StlOptions};
pub use writer::{encode_solid, write_part, write_solid, ExportSettings};
