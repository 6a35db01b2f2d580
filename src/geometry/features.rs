//! Acoustic features read directly off a geometry.
//!
//! These need neither audio nor a spectrogram, only the geometry's bounds
//! and member count.

use std::collections::BTreeMap;
use std::fmt;

use super::model::{Coordinates, Dimensionality, Geometry};
use crate::data::Features;

/// Names of the features [`compute_geometric_features`] produces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GeometricFeature {
    /// Seconds between the earliest and latest time. Every variant.
    Duration,
    /// Lowest frequency in hertz. Variants with a frequency axis.
    LowFreq,
    /// Highest frequency in hertz. Variants with a frequency axis.
    HighFreq,
    /// `high_freq - low_freq`. Variants with a frequency axis.
    Bandwidth,
    /// Member count. `Multi*` variants only.
    NumSegments,
}

impl GeometricFeature {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Duration => "duration",
            Self::LowFreq => "low_freq",
            Self::HighFreq => "high_freq",
            Self::Bandwidth => "bandwidth",
            Self::NumSegments => "num_segments",
        }
    }
}

impl fmt::Display for GeometricFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Computes every geometric feature applicable to the geometry's variant.
pub fn compute_geometric_features(geometry: &Geometry) -> Features {
    let bounds = geometry.bounds();
    let mut values = BTreeMap::new();
    let mut put = |feature: GeometricFeature, value: f64| {
        values.insert(feature.as_str().to_string(), value);
    };

    put(GeometricFeature::Duration, bounds.duration());
    if geometry.dimensionality() == Dimensionality::TimeFrequency {
        put(GeometricFeature::LowFreq, bounds.low_freq());
        put(GeometricFeature::HighFreq, bounds.high_freq());
        put(GeometricFeature::Bandwidth, bounds.bandwidth());
    }

    let members = match geometry.coordinates() {
        Coordinates::MultiPoint(points) => Some(points.len()),
        Coordinates::MultiLineString(lines) => Some(lines.len()),
        Coordinates::MultiPolygon(polygons) => Some(polygons.len()),
        _ => None,
    };
    if let Some(count) = members {
        put(GeometricFeature::NumSegments, count as f64);
    }

    Features::from_finite(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_features() {
        let bbox = Geometry::bounding_box(0.0, 0.0, 1.0, 1000.0).unwrap();
        let features = compute_geometric_features(&bbox);
        assert_eq!(features.get("duration"), Some(1.0));
        assert_eq!(features.get("low_freq"), Some(0.0));
        assert_eq!(features.get("high_freq"), Some(1000.0));
        assert_eq!(features.get("bandwidth"), Some(1000.0));
        assert_eq!(features.get("num_segments"), None);
    }

    #[test]
    fn test_time_only_has_duration_only() {
        let stamp = Geometry::time_stamp(3.0).unwrap();
        let features = compute_geometric_features(&stamp);
        assert_eq!(features.len(), 1);
        assert_eq!(features.get("duration"), Some(0.0));

        let interval = Geometry::time_interval(1.0, 2.5).unwrap();
        assert_eq!(compute_geometric_features(&interval).get("duration"), Some(1.5));
    }

    #[test]
    fn test_multi_counts_members() {
        let points = Geometry::multi_point([(0.0, 10.0), (1.0, 20.0), (2.0, 15.0)]).unwrap();
        let features = compute_geometric_features(&points);
        assert_eq!(features.get("num_segments"), Some(3.0));
        assert_eq!(features.get("bandwidth"), Some(10.0));
    }
}
