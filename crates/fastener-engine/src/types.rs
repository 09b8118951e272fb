use fastener_types::ValidationError;
use geom_kernel::KernelSolidHandle;
use serde::{Deserialize, Serialize};
use shape_ops::{Diagnostics, HexConstruction, OpError};

/// Build stage, for error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Shank,
    Head,
    Fuse,
    Nut,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Shank => "shank",
            Stage::Head => "head",
            Stage::Fuse => "fuse",
            Stage::Nut => "nut",
        };
        f.write_str(name)
    }
}

/// Errors that abort a build. Fillet problems never end up here; they are
/// reported through [`Diagnostics`].
#[derive(Debug, Clone, thiserror::Error)]
pub enum BuildError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("{stage} stage failed at {operation}: {source}")]
    Construction {
        stage: Stage,
        operation: String,
        #[source]
        source: OpError,
    },
}

impl BuildError {
    pub fn stage(&self) -> Option<Stage> {
        match self {
            BuildError::Validation(_) => None,
            BuildError::Construction { stage, .. } => Some(*stage),
        }
    }
}

/// Attach a stage and operation name to a failed modeling step.
pub(crate) trait StageExt<T> {
    fn at(self, stage: Stage, operation: &str) -> Result<T, BuildError>;
}

impl<T, E: Into<OpError>> StageExt<T> for Result<T, E> {
    fn at(self, stage: Stage, operation: &str) -> Result<T, BuildError> {
        self.map_err(|e| BuildError::Construction {
            stage,
            operation: operation.to_string(),
            source: e.into(),
        })
    }
}

/// Knobs that change how a solid is built but not what it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BuildOptions {
    pub hex_construction: HexConstruction,
}

/// A finished solid together with what went wrong along the way.
#[derive(Debug)]
pub struct BuildOutput {
    pub solid: KernelSolidHandle,
    pub diagnostics: Diagnostics,
}

/// A bolt and, when requested, its mating nut, built in the same kernel.
#[derive(Debug)]
pub struct Assembly {
    pub bolt: BuildOutput,
    pub nut: Option<BuildOutput>,
}
