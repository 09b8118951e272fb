use serde::{Deserialize, Serialize};

pub const MM_PER_INCH: f64 = 25.4;

pub fn inch_to_mm(inch: f64) -> f64 {
    inch * MM_PER_INCH
}

/// Working length unit of a build. Geometry is unit-agnostic; the unit only
/// matters when converting table values and when writing STEP, which expects
/// millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthUnit {
    #[default]
    Millimeter,
    Meter,
}

impl LengthUnit {
    pub fn millimeters_per_unit(self) -> f64 {
        match self {
            LengthUnit::Millimeter => 1.0,
            LengthUnit::Meter => 1.0e3,
        }
    }

    /// Convert a millimetre value into this unit.
    pub fn from_millimeters(self, mm: f64) -> f64 {
        mm / self.millimeters_per_unit()
    }
}

impl std::str::FromStr for LengthUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mm" | "millimeter" | "millimetre" => Ok(LengthUnit::Millimeter),
            "m" | "meter" | "metre" => Ok(LengthUnit::Meter),
            other => Err(format!("unknown length unit '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_unit_scales() {
        assert_relative_eq!(LengthUnit::Meter.millimeters_per_unit(), 1000.0);
        assert_relative_eq!(LengthUnit::Meter.from_millimeters(6.0), 0.006);
        assert_relative_eq!(LengthUnit::Millimeter.from_millimeters(6.0), 6.0);
        assert_relative_eq!(inch_to_mm(0.25), 6.35, epsilon = 1e-12);
        assert_eq!("m".parse::<LengthUnit>(), Ok(LengthUnit::Meter));
        assert!("furlong".parse::<LengthUnit>().is_err());
    }
}
