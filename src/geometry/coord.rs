//! Typed time-frequency positions using PhantomData for compile-time safety.

use serde::{Deserialize, Serialize};
use std::marker::PhantomData;

use super::space::Physical;

/// A single (time, frequency) position with a type-level marker for the
/// coordinate space.
///
/// The `S` parameter should be either [`Physical`] or
/// [`Index`](super::Index), so that positions measured in seconds and hertz
/// cannot be mixed with array positions by accident.
#[derive(Clone, Copy, PartialEq)]
pub struct Position<S = Physical> {
    pub time: f64,
    pub frequency: f64,
    _space: PhantomData<S>,
}

impl<S> Position<S> {
    /// Creates a new position.
    #[inline]
    pub fn new(time: f64, frequency: f64) -> Self {
        Self {
            time,
            frequency,
            _space: PhantomData,
        }
    }

    /// Returns true if both components are finite (not NaN or infinite).
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.time.is_finite() && self.frequency.is_finite()
    }

    /// Returns the position as a plain `(time, frequency)` tuple.
    #[inline]
    pub fn as_tuple(&self) -> (f64, f64) {
        (self.time, self.frequency)
    }
}

impl<S> From<(f64, f64)> for Position<S> {
    fn from((time, frequency): (f64, f64)) -> Self {
        Self::new(time, frequency)
    }
}

impl<S> std::fmt::Debug for Position<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Position")
            .field(&self.time)
            .field(&self.frequency)
            .finish()
    }
}

// Positions travel as GeoJSON-style `[time, frequency]` pairs. Hand-written
// to avoid S: Serialize/Deserialize bounds.
impl<S> Serialize for Position<S> {
    fn serialize<Ser: serde::Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        (self.time, self.frequency).serialize(serializer)
    }
}

impl<'de, S> Deserialize<'de> for Position<S> {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (time, frequency) = <(f64, f64)>::deserialize(deserializer)?;
        Ok(Position::new(time, frequency))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_creation() {
        let position: Position = Position::new(1.5, 2000.0);
        assert_eq!(position.time, 1.5);
        assert_eq!(position.frequency, 2000.0);
    }

    #[test]
    fn test_position_is_finite() {
        let finite: Position = Position::new(1.0, 20.0);
        assert!(finite.is_finite());

        let nan: Position = Position::new(f64::NAN, 20.0);
        assert!(!nan.is_finite());

        let inf: Position = Position::new(1.0, f64::INFINITY);
        assert!(!inf.is_finite());
    }

    #[test]
    fn test_position_serializes_as_pair() {
        let position: Position = Position::new(0.25, 440.0);
        let json = serde_json::to_string(&position).expect("serialize position");
        assert_eq!(json, "[0.25,440.0]");

        let restored: Position = serde_json::from_str(&json).expect("parse position");
        assert_eq!(restored, position);
    }

    #[test]
    fn test_position_rejects_wrong_arity() {
        assert!(serde_json::from_str::<Position>("[1.0]").is_err());
        assert!(serde_json::from_str::<Position>("[1.0, 2.0, 3.0]").is_err());
    }
}
