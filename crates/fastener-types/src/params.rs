use serde::{Deserialize, Serialize};

/// Included flank angle of the ISO / UTS thread form, in degrees.
pub const THREAD_ANGLE_DEG: f64 = 60.0;

/// Minor diameter falls back to `major - MINOR_DIAMETER_FACTOR * pitch`.
pub const MINOR_DIAMETER_FACTOR: f64 = 1.0825;

/// Radial clearance used for nuts when none is given.
pub const DEFAULT_NUT_TOLERANCE: f64 = 0.1;

/// Screw thread definition shared by the bolt shank and the mating nut.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThreadSpec {
    /// Nominal outer thread diameter (d).
    pub major_diameter: f64,
    /// Axial distance between adjacent crests (P).
    pub pitch: f64,
    /// Root diameter (d3). Derived from major diameter and pitch when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minor_diameter: Option<f64>,
}

impl ThreadSpec {
    pub fn new(major_diameter: f64, pitch: f64) -> Self {
        Self {
            major_diameter,
            pitch,
            minor_diameter: None,
        }
    }

    pub fn with_minor_diameter(mut self, minor_diameter: f64) -> Self {
        self.minor_diameter = Some(minor_diameter);
        self
    }

    /// Effective minor diameter. Non-positive explicit values count as absent.
    pub fn minor_diameter(&self) -> f64 {
        self.minor_diameter
            .filter(|d| *d > 0.0)
            .unwrap_or(self.major_diameter - MINOR_DIAMETER_FACTOR * self.pitch)
    }

    pub fn angle_deg(&self) -> f64 {
        THREAD_ANGLE_DEG
    }
}

/// Bolt shank dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShankSpec {
    /// Nominal body diameter (d).
    pub nominal_diameter: f64,
    /// Shank length from the underside of the head to the tip (L).
    pub total_length: f64,
    /// Unthreaded length nearest the head (ls).
    #[serde(default)]
    pub grip_length: f64,
    /// Diametral undercut applied to the body for fit.
    #[serde(default)]
    pub body_tolerance: f64,
    /// Radius for rounding every sufficiently long edge. Zero disables.
    #[serde(default)]
    pub edge_fillet_radius: f64,
}

impl ShankSpec {
    pub fn new(nominal_diameter: f64, total_length: f64) -> Self {
        Self {
            nominal_diameter,
            total_length,
            grip_length: 0.0,
            body_tolerance: 0.0,
            edge_fillet_radius: 0.0,
        }
    }

    /// Body diameter after the fit undercut.
    pub fn body_diameter(&self) -> f64 {
        self.nominal_diameter - self.body_tolerance
    }
}

/// Head style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeadType {
    #[default]
    Hex,
    SocketCap,
    Flat,
    Countersunk,
}

impl HeadType {
    /// Map the numeric head codes used by form and command-line front ends.
    /// Unknown codes fall back to a hex head.
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => HeadType::Hex,
            1 => HeadType::SocketCap,
            2 => HeadType::Flat,
            3 => HeadType::Countersunk,
            other => {
                tracing::warn!(code = other, "unknown head type code, using hex head");
                HeadType::Hex
            }
        }
    }

    pub fn code(self) -> i64 {
        match self {
            HeadType::Hex => 0,
            HeadType::SocketCap => 1,
            HeadType::Flat => 2,
            HeadType::Countersunk => 3,
        }
    }
}

impl std::str::FromStr for HeadType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "hex" => Ok(HeadType::Hex),
            "socket_cap" | "socket" | "shcs" => Ok(HeadType::SocketCap),
            "flat" => Ok(HeadType::Flat),
            "countersunk" | "csk" => Ok(HeadType::Countersunk),
            other => Err(format!("unknown head type '{}'", other)),
        }
    }
}

/// Head dimensions. Optional features are disabled by zero values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeadSpec {
    #[serde(rename = "type", default)]
    pub head_type: HeadType,
    /// Width across flats (s); outer diameter for round heads.
    pub width_across_flats: f64,
    /// Head height (k).
    pub height: f64,
    #[serde(default)]
    pub washer_face_diameter: f64,
    #[serde(default)]
    pub washer_face_thickness: f64,
    #[serde(default)]
    pub underhead_fillet_radius: f64,
    /// Socket width across flats. Socket cap heads only.
    #[serde(default)]
    pub socket_size: f64,
    #[serde(default)]
    pub socket_depth: f64,
}

impl HeadSpec {
    pub fn hex(width_across_flats: f64, height: f64) -> Self {
        Self {
            head_type: HeadType::Hex,
            width_across_flats,
            height,
            washer_face_diameter: 0.0,
            washer_face_thickness: 0.0,
            underhead_fillet_radius: 0.0,
            socket_size: 0.0,
            socket_depth: 0.0,
        }
    }

    pub fn socket_cap(diameter: f64, height: f64, socket_size: f64, socket_depth: f64) -> Self {
        Self {
            head_type: HeadType::SocketCap,
            socket_size,
            socket_depth,
            ..Self::hex(diameter, height)
        }
    }

    pub fn round(head_type: HeadType, diameter: f64, height: f64) -> Self {
        Self {
            head_type,
            ..Self::hex(diameter, height)
        }
    }

    pub fn has_washer_face(&self) -> bool {
        self.washer_face_diameter > 0.0 && self.washer_face_thickness > 0.0
    }

    /// Height of the finished head including the washer face.
    pub fn overall_height(&self) -> f64 {
        if self.has_washer_face() {
            self.height + self.washer_face_thickness
        } else {
            self.height
        }
    }
}

/// Hex nut dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NutSpec {
    #[serde(default)]
    pub generate: bool,
    pub width_across_flats: f64,
    pub height: f64,
    #[serde(default)]
    pub washer_face_diameter: f64,
    /// Radial clearance added to the thread cutter.
    #[serde(default = "default_nut_tolerance")]
    pub tolerance: f64,
    #[serde(default)]
    pub edge_fillet_radius: f64,
}

fn default_nut_tolerance() -> f64 {
    DEFAULT_NUT_TOLERANCE
}

impl NutSpec {
    pub fn new(width_across_flats: f64, height: f64) -> Self {
        Self {
            generate: true,
            width_across_flats,
            height,
            washer_face_diameter: 0.0,
            tolerance: DEFAULT_NUT_TOLERANCE,
            edge_fillet_radius: 0.0,
        }
    }
}

/// Complete parameter set for one bolt and its optional nut.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoltParameters {
    pub thread: ThreadSpec,
    pub shank: ShankSpec,
    pub head: HeadSpec,
    pub nut: NutSpec,
}
