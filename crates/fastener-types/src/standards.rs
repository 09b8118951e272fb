//! Standard thread and head sizes (ISO 261 / 4017 / 4032 / 4762, ASME B1.1 / B18.2).
//!
//! The table is a process-wide immutable static. All values are millimetres;
//! [`BoltParameters::from_designation`] converts them into the requested unit.

use crate::params::*;
use crate::units::{LengthUnit, MM_PER_INCH};
use crate::validate::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HexHeadDims {
    pub width_across_flats: f64,
    pub height: f64,
    /// Zero where the standard defines no washer face.
    pub washer_face_diameter: f64,
    pub washer_face_thickness: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SocketHeadDims {
    pub head_diameter: f64,
    pub head_height: f64,
    pub socket_size: f64,
    pub socket_depth: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NutDims {
    pub width_across_flats: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StandardSize {
    pub designation: &'static str,
    pub major_diameter: f64,
    pub pitch: f64,
    pub hex_head: HexHeadDims,
    pub socket_head: SocketHeadDims,
    pub nut: NutDims,
}

const fn metric(
    designation: &'static str,
    major_diameter: f64,
    pitch: f64,
    hex: [f64; 4],
    socket: [f64; 4],
    nut: [f64; 2],
) -> StandardSize {
    StandardSize {
        designation,
        major_diameter,
        pitch,
        hex_head: HexHeadDims {
            width_across_flats: hex[0],
            height: hex[1],
            washer_face_diameter: hex[2],
            washer_face_thickness: hex[3],
        },
        socket_head: SocketHeadDims {
            head_diameter: socket[0],
            head_height: socket[1],
            socket_size: socket[2],
            socket_depth: socket[3],
        },
        nut: NutDims {
            width_across_flats: nut[0],
            height: nut[1],
        },
    }
}

const IN: f64 = MM_PER_INCH;

static STANDARD_SIZES: &[StandardSize] = &[
    //                 d     P     hex [s, k, dw, c]             socket [dk, k, s, t]      nut [s, m]
    metric("M3", 3.0, 0.5, [5.5, 2.0, 4.57, 0.4], [5.5, 3.0, 2.5, 1.3], [5.5, 2.4]),
    metric("M4", 4.0, 0.7, [7.0, 2.8, 5.88, 0.4], [7.0, 4.0, 3.0, 2.0], [7.0, 3.2]),
    metric("M5", 5.0, 0.8, [8.0, 3.5, 6.88, 0.5], [8.5, 5.0, 4.0, 2.5], [8.0, 4.7]),
    metric("M6", 6.0, 1.0, [10.0, 4.0, 8.88, 0.5], [10.0, 6.0, 5.0, 3.0], [10.0, 5.2]),
    metric("M8", 8.0, 1.25, [13.0, 5.3, 11.63, 0.6], [13.0, 8.0, 6.0, 4.0], [13.0, 6.8]),
    metric("M10", 10.0, 1.5, [16.0, 6.4, 14.63, 0.6], [16.0, 10.0, 8.0, 5.0], [16.0, 8.4]),
    metric("M12", 12.0, 1.75, [18.0, 7.5, 16.63, 0.6], [18.0, 12.0, 10.0, 6.0], [18.0, 10.8]),
    metric("M16", 16.0, 2.0, [24.0, 10.0, 22.49, 0.8], [24.0, 16.0, 14.0, 8.0], [24.0, 14.8]),
    metric("M20", 20.0, 2.5, [30.0, 12.5, 28.19, 0.8], [30.0, 20.0, 17.0, 10.0], [30.0, 18.0]),
    metric("M24", 24.0, 3.0, [36.0, 15.0, 33.61, 0.8], [36.0, 24.0, 19.0, 12.0], [36.0, 21.5]),
    metric(
        "1/4\"-20 UNC",
        0.25 * IN,
        IN / 20.0,
        [7.0 / 16.0 * IN, 11.0 / 64.0 * IN, 0.0, 0.0],
        [0.375 * IN, 0.25 * IN, 3.0 / 16.0 * IN, 0.12 * IN],
        [7.0 / 16.0 * IN, 7.0 / 32.0 * IN],
    ),
    metric(
        "1/4\"-28 UNF",
        0.25 * IN,
        IN / 28.0,
        [7.0 / 16.0 * IN, 11.0 / 64.0 * IN, 0.0, 0.0],
        [0.375 * IN, 0.25 * IN, 3.0 / 16.0 * IN, 0.12 * IN],
        [7.0 / 16.0 * IN, 7.0 / 32.0 * IN],
    ),
    metric(
        "1/4\"-32 UNEF",
        0.25 * IN,
        IN / 32.0,
        [7.0 / 16.0 * IN, 11.0 / 64.0 * IN, 0.0, 0.0],
        [0.375 * IN, 0.25 * IN, 3.0 / 16.0 * IN, 0.12 * IN],
        [7.0 / 16.0 * IN, 7.0 / 32.0 * IN],
    ),
    metric(
        "5/16\"-18 UNC",
        0.3125 * IN,
        IN / 18.0,
        [0.5 * IN, 7.0 / 32.0 * IN, 0.0, 0.0],
        [0.469 * IN, 0.3125 * IN, 0.25 * IN, 0.156 * IN],
        [0.5 * IN, 17.0 / 64.0 * IN],
    ),
    metric(
        "5/16\"-24 UNF",
        0.3125 * IN,
        IN / 24.0,
        [0.5 * IN, 7.0 / 32.0 * IN, 0.0, 0.0],
        [0.469 * IN, 0.3125 * IN, 0.25 * IN, 0.156 * IN],
        [0.5 * IN, 17.0 / 64.0 * IN],
    ),
    metric(
        "5/16\"-32 UNEF",
        0.3125 * IN,
        IN / 32.0,
        [0.5 * IN, 7.0 / 32.0 * IN, 0.0, 0.0],
        [0.469 * IN, 0.3125 * IN, 0.25 * IN, 0.156 * IN],
        [0.5 * IN, 17.0 / 64.0 * IN],
    ),
];

fn normalize(designation: &str) -> String {
    designation
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_uppercase()
}

/// Find a standard size by designation. Case and whitespace are ignored,
/// and metric sizes also match with their coarse pitch spelled out ("M6x1").
pub fn lookup(designation: &str) -> Option<&'static StandardSize> {
    let wanted = normalize(designation);
    STANDARD_SIZES.iter().find(|size| {
        let name = normalize(size.designation);
        name == wanted || (name.starts_with('M') && wanted == format!("{}X{}", name, size.pitch))
    })
}

/// All known designations, in table order.
pub fn designations() -> impl Iterator<Item = &'static str> {
    STANDARD_SIZES.iter().map(|size| size.designation)
}

impl BoltParameters {
    /// Standard bolt of the given designation and shank length (in `unit`),
    /// with the matching nut dimensions filled in but not enabled.
    pub fn from_designation(
        designation: &str,
        length: f64,
        head_type: HeadType,
        unit: LengthUnit,
    ) -> Result<Self, ValidationError> {
        let size = lookup(designation).ok_or_else(|| {
            ValidationError::new(
                "designation",
                format!("unknown designation '{}'", designation),
            )
        })?;
        let mm = |v: f64| unit.from_millimeters(v);

        let head = match head_type {
            HeadType::Hex => HeadSpec {
                washer_face_diameter: mm(size.hex_head.washer_face_diameter),
                washer_face_thickness: mm(size.hex_head.washer_face_thickness),
                ..HeadSpec::hex(
                    mm(size.hex_head.width_across_flats),
                    mm(size.hex_head.height),
                )
            },
            HeadType::SocketCap => HeadSpec::socket_cap(
                mm(size.socket_head.head_diameter),
                mm(size.socket_head.head_height),
                mm(size.socket_head.socket_size),
                mm(size.socket_head.socket_depth),
            ),
            HeadType::Flat | HeadType::Countersunk => HeadSpec::round(
                head_type,
                mm(size.socket_head.head_diameter),
                mm(size.hex_head.height),
            ),
        };

        let mut nut = NutSpec::new(mm(size.nut.width_across_flats), mm(size.nut.height));
        nut.generate = false;
        nut.tolerance = mm(DEFAULT_NUT_TOLERANCE);

        Ok(BoltParameters {
            thread: ThreadSpec::new(mm(size.major_diameter), mm(size.pitch)),
            shank: ShankSpec::new(mm(size.major_diameter), length),
            head,
            nut,
        })
    }
}
