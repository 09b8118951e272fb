//! Bolt and nut builders on top of the shape operations.
//!
//! Builders validate their parameters before touching the kernel, treat
//! failed mandatory booleans as fatal [`BuildError`]s, and record anything
//! cosmetic that went wrong (fillets, clamps, fallbacks) in the output's
//! diagnostics instead.

pub mod batch;
pub mod bolt;
pub mod head;
pub mod nut;
pub mod shank;
pub mod types;

pub use batch::{build_assembly, run_batch, BatchItem};
pub use bolt::build_bolt;
pub use head::build_head;
pub use nut::build_nut;
pub use shank::build_shank;
pub use types::*;
