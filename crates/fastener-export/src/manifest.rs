use std::path::{Path, PathBuf};

use fastener_types::{BoltParameters, LengthUnit};
use serde::Serialize;
use shape_ops::{Diagnostics, FilletReport};

use crate::errors::ExportError;
use crate::format::ExportFormat;

/// Current manifest layout version.
pub const MANIFEST_VERSION: u32 = 1;

/// One file written for one part.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportedFile {
    pub part: String,
    pub format: ExportFormat,
    pub path: PathBuf,
}

/// Record of a finished build: the inputs, the files written, and the
/// non-fatal diagnostics collected on the way.
#[derive(Debug, Clone, Serialize)]
pub struct ExportManifest {
    pub version: u32,
    pub unit: LengthUnit,
    pub parameters: BoltParameters,
    pub files: Vec<ExportedFile>,
    pub warnings: Vec<String>,
    pub fillets: Vec<FilletReport>,
}

impl ExportManifest {
    pub fn new(parameters: BoltParameters, unit: LengthUnit) -> Self {
        Self {
            version: MANIFEST_VERSION,
            unit,
            parameters,
            files: Vec::new(),
            warnings: Vec::new(),
            fillets: Vec::new(),
        }
    }

    /// Fold a part's diagnostics in, prefixing warnings with the part name.
    pub fn record_diagnostics(&mut self, part: &str, diagnostics: &Diagnostics) {
        self.warnings
            .extend(diagnostics.warnings.iter().map(|w| format!("{}: {}", part, w)));
        self.fillets.extend(diagnostics.fillets.iter().cloned());
    }

    pub fn to_json(&self) -> Result<String, ExportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the manifest as pretty-printed JSON.
    pub fn write(&self, path: &Path) -> Result<(), ExportError> {
        let json = self.to_json()?;
        crate::writer::write_bytes(path, json.as_bytes())
    }
}
