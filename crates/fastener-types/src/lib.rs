pub mod params;
pub mod standards;
pub mod units;
pub mod validate;

pub use params::*;
pub use standards::{lookup, StandardSize};
pub use units::*;
pub use validate::ValidationError;
