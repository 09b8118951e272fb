use std::path::PathBuf;

/// Errors while writing solids to disk.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("kernel error during export: {0}")]
    Kernel(#[from] geom_kernel::KernelError),

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unknown export format: {0}")]
    UnknownFormat(String),

    #[error("tessellation produced no triangles")]
    EmptyMesh,

    #[error("failed to serialize manifest: {0}")]
    Manifest(#[from] serde_json::Error),
}
