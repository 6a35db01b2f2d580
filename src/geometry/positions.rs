//! Named anchor points of a geometry, taken from its bounds.

use std::fmt;
use std::str::FromStr;

use super::coord::Position;
use super::model::Geometry;
use super::space::Space;
use crate::error::SoundEventError;

/// An anchor on the bounds of a geometry.
///
/// "Bottom" and "top" refer to the frequency axis, "left" and "right" to
/// the time axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PointPosition {
    #[default]
    BottomLeft,
    BottomCenter,
    BottomRight,
    CenterLeft,
    Center,
    CenterRight,
    TopLeft,
    TopCenter,
    TopRight,
}

impl PointPosition {
    pub const ALL: [PointPosition; 9] = [
        PointPosition::BottomLeft,
        PointPosition::BottomCenter,
        PointPosition::BottomRight,
        PointPosition::CenterLeft,
        PointPosition::Center,
        PointPosition::CenterRight,
        PointPosition::TopLeft,
        PointPosition::TopCenter,
        PointPosition::TopRight,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BottomLeft => "bottom-left",
            Self::BottomCenter => "bottom-center",
            Self::BottomRight => "bottom-right",
            Self::CenterLeft => "center-left",
            Self::Center => "center",
            Self::CenterRight => "center-right",
            Self::TopLeft => "top-left",
            Self::TopCenter => "top-center",
            Self::TopRight => "top-right",
        }
    }
}

impl fmt::Display for PointPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PointPosition {
    type Err = SoundEventError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|position| position.as_str() == s)
            .ok_or_else(|| SoundEventError::validation("position", format!("unknown point position '{s}'")))
    }
}

/// Returns the requested anchor of the geometry's bounds.
///
/// Time-only geometries use the full-spectrum band, so their "top" is the
/// space's frequency ceiling.
pub fn geometry_point<S: Space>(geometry: &Geometry<S>, position: PointPosition) -> Position<S> {
    let (start_time, low_freq, end_time, high_freq) = geometry.bounds().as_tuple();
    let mid_time = (start_time + end_time) / 2.0;
    let mid_freq = (low_freq + high_freq) / 2.0;

    let (time, frequency) = match position {
        PointPosition::BottomLeft => (start_time, low_freq),
        PointPosition::BottomCenter => (mid_time, low_freq),
        PointPosition::BottomRight => (end_time, low_freq),
        PointPosition::CenterLeft => (start_time, mid_freq),
        PointPosition::Center => (mid_time, mid_freq),
        PointPosition::CenterRight => (end_time, mid_freq),
        PointPosition::TopLeft => (start_time, high_freq),
        PointPosition::TopCenter => (mid_time, high_freq),
        PointPosition::TopRight => (end_time, high_freq),
    };
    Position::new(time, frequency)
}
