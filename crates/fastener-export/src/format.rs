use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::ExportError;

/// Output file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Native boundary representation.
    Brep,
    /// STEP AP203, always in millimetres.
    Step,
    /// Binary STL.
    Stl,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [ExportFormat::Brep, ExportFormat::Step, ExportFormat::Stl];

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Brep => "brep",
            ExportFormat::Step => "step",
            ExportFormat::Stl => "stl",
        }
    }

    /// Format implied by a file extension, ignoring case.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "brep" => Some(ExportFormat::Brep),
            "step" | "stp" => Some(ExportFormat::Step),
            "stl" => Some(ExportFormat::Stl),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, ExportError> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
            .ok_or_else(|| ExportError::UnknownFormat(path.display().to_string()))
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_extension(s.trim().trim_start_matches('.'))
            .ok_or_else(|| ExportError::UnknownFormat(s.to_string()))
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            ExportFormat::from_path(Path::new("out/m8x30.STP")).unwrap(),
            ExportFormat::Step
        );
        assert_eq!(
            ExportFormat::from_path(Path::new("bolt.brep")).unwrap(),
            ExportFormat::Brep
        );
        assert!(matches!(
            ExportFormat::from_path(Path::new("bolt.obj")),
            Err(ExportError::UnknownFormat(_))
        ));
        assert!(ExportFormat::from_path(Path::new("bolt")).is_err());
    }

    #[test]
    fn test_format_parse_and_display() {
        assert_eq!(".stl".parse::<ExportFormat>().unwrap(), ExportFormat::Stl);
        for format in ExportFormat::ALL {
            assert_eq!(format.to_string().parse::<ExportFormat>().unwrap(), format);
        }
    }
}
