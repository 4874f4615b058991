use serde::Serialize;

/// Severity tier of a quake, derived from its magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum MagnitudeClass {
    Class0,
    Class1,
    Class2,
    Class3,
    Class4,
    Class5,
}

impl MagnitudeClass {
    pub const ALL: [MagnitudeClass; 6] = [
        MagnitudeClass::Class0,
        MagnitudeClass::Class1,
        MagnitudeClass::Class2,
        MagnitudeClass::Class3,
        MagnitudeClass::Class4,
        MagnitudeClass::Class5,
    ];

    /// Marker fill and stroke colour.
    pub fn color(&self) -> &'static str {
        match self {
            MagnitudeClass::Class0 => "#ddf57e",
            MagnitudeClass::Class1 => "#fde63a",
            MagnitudeClass::Class2 => "#fcbc2c",
            MagnitudeClass::Class3 => "#fd9e28",
            MagnitudeClass::Class4 => "#fa7f23",
            MagnitudeClass::Class5 => "#fb0d1b",
        }
    }

    pub fn index(&self) -> usize {
        *self as usize
    }
}

/// Maps a magnitude onto its class.
///
/// | Range       | Class  |
/// |-------------|--------|
/// | < 1         | class0 |
/// | < 2         | class1 |
/// | < 3         | class2 |
/// | < 4         | class3 |
/// | < 5         | class4 |
/// | otherwise   | class5 |
///
/// Every comparison against `NaN` is false, so a missing magnitude lands
/// in `Class5`.
pub fn classify(magnitude: f64) -> MagnitudeClass {
    match magnitude {
        m if m < 1.0 => MagnitudeClass::Class0,
        m if m < 2.0 => MagnitudeClass::Class1,
        m if m < 3.0 => MagnitudeClass::Class2,
        m if m < 4.0 => MagnitudeClass::Class3,
        m if m < 5.0 => MagnitudeClass::Class4,
        _ => MagnitudeClass::Class5,
    }
}

/// Marker radius. The magnitude itself, unclamped.
pub fn marker_radius(magnitude: f64) -> f64 {
    magnitude
}
