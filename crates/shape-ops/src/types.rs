use serde::Serialize;

/// Non-fatal diagnostics collected while building a solid.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Diagnostics {
    /// Warning messages.
    pub warnings: Vec<String>,
    /// One report per attempted fillet stage.
    pub fillets: Vec<FilletReport>,
}

impl Diagnostics {
    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    pub fn merge(&mut self, other: Diagnostics) {
        self.warnings.extend(other.warnings);
        self.fillets.extend(other.fillets);
    }
}

/// What happened to a best-effort fillet.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FilletOutcome {
    Applied,
    /// Not attempted: nothing qualified or the radius was too small.
    Skipped { reason: String },
    /// Attempted and rejected by the kernel; the unfilleted solid was kept.
    Failed { reason: String },
}

/// Requested versus applied radius and the outcome of one fillet stage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilletReport {
    pub stage: &'static str,
    pub requested_radius: f64,
    pub applied_radius: f64,
    pub candidate_edges: usize,
    pub qualifying_edges: usize,
    pub outcome: FilletOutcome,
}

impl FilletReport {
    pub fn applied(&self) -> bool {
        self.outcome == FilletOutcome::Applied
    }
}

/// Errors from modeling operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum OpError {
    #[error("kernel error: {0}")]
    Kernel(#[from] geom_kernel::KernelError),

    #[error("invalid parameter: {reason}")]
    InvalidParameter { reason: String },

    #[error("{operation} produced no solids")]
    NoSolids { operation: String },
}
