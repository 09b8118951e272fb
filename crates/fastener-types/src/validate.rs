//! Parameter validation. Runs before any kernel geometry is constructed.

use crate::params::*;

/// Largest socket relative to the head diameter.
pub const MAX_SOCKET_RATIO: f64 = 0.9;

/// A caller-correctable parameter problem, naming the field and the violated constraint.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid {field}: {constraint}")]
pub struct ValidationError {
    pub field: &'static str,
    pub constraint: String,
}

impl ValidationError {
    pub fn new(field: &'static str, constraint: impl Into<String>) -> Self {
        Self {
            field,
            constraint: constraint.into(),
        }
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ValidationError::new(
            field,
            format!("must be > 0, got {}", value),
        ))
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ValidationError::new(
            field,
            format!("must be >= 0, got {}", value),
        ))
    }
}

impl ThreadSpec {
    pub fn validate(&self) -> Result<(), ValidationError> {
        positive("thread.major_diameter", self.major_diameter)?;
        positive("thread.pitch", self.pitch)?;
        let minor = self.minor_diameter();
        if !(minor > 0.0) {
            return Err(ValidationError::new(
                "thread.minor_diameter",
                format!(
                    "must be > 0, got {} (major {} with pitch {})",
                    minor, self.major_diameter, self.pitch
                ),
            ));
        }
        if minor >= self.major_diameter {
            return Err(ValidationError::new(
                "thread.minor_diameter",
                format!(
                    "must be < major diameter {}, got {}",
                    self.major_diameter, minor
                ),
            ));
        }
        Ok(())
    }
}

impl ShankSpec {
    pub fn validate(&self) -> Result<(), ValidationError> {
        positive("shank.nominal_diameter", self.nominal_diameter)?;
        positive("shank.total_length", self.total_length)?;
        non_negative("shank.grip_length", self.grip_length)?;
        non_negative("shank.body_tolerance", self.body_tolerance)?;
        non_negative("shank.edge_fillet_radius", self.edge_fillet_radius)?;
        if self.body_tolerance >= self.nominal_diameter {
            return Err(ValidationError::new(
                "shank.body_tolerance",
                format!(
                    "must be < nominal diameter {}, got {}",
                    self.nominal_diameter, self.body_tolerance
                ),
            ));
        }
        Ok(())
    }
}

impl HeadSpec {
    pub fn validate(&self) -> Result<(), ValidationError> {
        positive("head.width_across_flats", self.width_across_flats)?;
        positive("head.height", self.height)?;
        non_negative("head.washer_face_diameter", self.washer_face_diameter)?;
        non_negative("head.washer_face_thickness", self.washer_face_thickness)?;
        non_negative("head.underhead_fillet_radius", self.underhead_fillet_radius)?;

        if self.has_washer_face() && self.washer_face_thickness > self.height {
            return Err(ValidationError::new(
                "head.washer_face_thickness",
                format!(
                    "must not exceed head height {}, got {}",
                    self.height, self.washer_face_thickness
                ),
            ));
        }

        if self.head_type == HeadType::SocketCap {
            positive("head.socket_size", self.socket_size)?;
            positive("head.socket_depth", self.socket_depth)?;
            let limit = MAX_SOCKET_RATIO * self.width_across_flats;
            if self.socket_size >= limit {
                return Err(ValidationError::new(
                    "head.socket_size",
                    format!(
                        "must be < {} x head diameter ({}), got {}",
                        MAX_SOCKET_RATIO, limit, self.socket_size
                    ),
                ));
            }
            if self.socket_depth > self.height {
                return Err(ValidationError::new(
                    "head.socket_depth",
                    format!(
                        "must not exceed head height {}, got {}",
                        self.height, self.socket_depth
                    ),
                ));
            }
        }
        Ok(())
    }
}

impl NutSpec {
    pub fn validate(&self, thread: &ThreadSpec) -> Result<(), ValidationError> {
        positive("nut.width_across_flats", self.width_across_flats)?;
        positive("nut.height", self.height)?;
        non_negative("nut.washer_face_diameter", self.washer_face_diameter)?;
        non_negative("nut.tolerance", self.tolerance)?;
        non_negative("nut.edge_fillet_radius", self.edge_fillet_radius)?;
        if self.width_across_flats <= thread.major_diameter {
            return Err(ValidationError::new(
                "nut.width_across_flats",
                format!(
                    "must exceed thread major diameter {}, got {}",
                    thread.major_diameter, self.width_across_flats
                ),
            ));
        }
        Ok(())
    }
}

impl BoltParameters {
    /// Validate everything the bolt needs. The nut is only checked when it will be generated.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.thread.validate()?;
        self.shank.validate()?;
        self.head.validate()?;
        if self.nut.generate {
            self.nut.validate(&self.thread)?;
        }
        Ok(())
    }
}
