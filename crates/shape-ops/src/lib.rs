pub mod boolean;
pub mod chamfer;
pub mod fillet;
pub mod helix;
pub mod hex_prism;
pub mod kernel_ext;
pub mod thread;
pub mod types;

pub use boolean::{boolean_keep_largest, execute_boolean, select_largest, BooleanKind};
pub use chamfer::chamfer_profile;
pub use fillet::{clamped_edge_fillet, fillet_best_effort, junction_fillet};
pub use helix::helical_sweep;
pub use hex_prism::{hex_prism, hexagon_points, HexConstruction};
pub use kernel_ext::KernelBundle;
pub use thread::{thread_profile_points, thread_tool};
pub use types::*;
