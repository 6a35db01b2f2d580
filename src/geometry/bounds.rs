//! Axis-aligned bounds in the time-frequency plane.

use serde::Serialize;
use std::marker::PhantomData;

use super::space::{Physical, Space};

/// The absolute maximum frequency, in hertz, a physical geometry may use.
///
/// Also the upper edge of [`FrequencyBounds::FullSpectrum`] in physical space.
pub const MAX_FREQUENCY: f64 = 5_000_000.0;

/// Frequency extent of a [`Bounds`].
///
/// Time-only geometries carry no frequency information at all. Their extent
/// is reported as `FullSpectrum` instead of a zero-width band, so that
/// callers can tell "unknown, assume everything" apart from "exactly 0 Hz".
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FrequencyBounds {
    /// Unbounded: the geometry covers every frequency.
    FullSpectrum,
    /// A closed band `[low, high]`.
    Band { low: f64, high: f64 },
}

impl FrequencyBounds {
    /// Returns true for the full-spectrum sentinel.
    #[inline]
    pub fn is_full_spectrum(&self) -> bool {
        matches!(self, Self::FullSpectrum)
    }

    fn union(self, other: Self) -> Self {
        match (self, other) {
            (Self::Band { low: l1, high: h1 }, Self::Band { low: l2, high: h2 }) => Self::Band {
                low: l1.min(l2),
                high: h1.max(h2),
            },
            _ => Self::FullSpectrum,
        }
    }

    fn intersection(self, other: Self) -> Option<Self> {
        match (self, other) {
            (Self::FullSpectrum, band) | (band, Self::FullSpectrum) => Some(band),
            (Self::Band { low: l1, high: h1 }, Self::Band { low: l2, high: h2 }) => {
                let low = l1.max(l2);
                let high = h1.min(h2);
                (low <= high).then_some(Self::Band { low, high })
            }
        }
    }
}

/// The minimal axis-aligned region enclosing a geometry.
///
/// Like the geometries it is derived from, a `Bounds` is tagged with its
/// coordinate space.
#[derive(Clone, Copy, PartialEq)]
pub struct Bounds<S = Physical> {
    start_time: f64,
    end_time: f64,
    frequency: FrequencyBounds,
    _space: PhantomData<S>,
}

impl<S: Space> Bounds<S> {
    /// Creates bounds from a time range and a frequency extent.
    #[inline]
    pub fn new(start_time: f64, end_time: f64, frequency: FrequencyBounds) -> Self {
        Self {
            start_time,
            end_time,
            frequency,
            _space: PhantomData,
        }
    }

    /// Creates bounds covering a time range and the full spectrum.
    #[inline]
    pub fn time_only(start_time: f64, end_time: f64) -> Self {
        Self::new(start_time, end_time, FrequencyBounds::FullSpectrum)
    }

    /// Creates bounds from explicit corners.
    #[inline]
    pub fn from_corners(start_time: f64, low_freq: f64, end_time: f64, high_freq: f64) -> Self {
        Self::new(
            start_time,
            end_time,
            FrequencyBounds::Band {
                low: low_freq,
                high: high_freq,
            },
        )
    }

    #[inline]
    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    #[inline]
    pub fn end_time(&self) -> f64 {
        self.end_time
    }

    #[inline]
    pub fn frequency(&self) -> FrequencyBounds {
        self.frequency
    }

    /// Returns the lowest frequency, `0` for the full spectrum.
    #[inline]
    pub fn low_freq(&self) -> f64 {
        match self.frequency {
            FrequencyBounds::FullSpectrum => 0.0,
            FrequencyBounds::Band { low, .. } => low,
        }
    }

    /// Returns the highest frequency, the space's ceiling for the full spectrum.
    #[inline]
    pub fn high_freq(&self) -> f64 {
        match self.frequency {
            FrequencyBounds::FullSpectrum => S::FREQUENCY_CEILING,
            FrequencyBounds::Band { high, .. } => high,
        }
    }

    /// Returns true if the bounds carry no frequency information.
    #[inline]
    pub fn is_time_only(&self) -> bool {
        self.frequency.is_full_spectrum()
    }

    #[inline]
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    #[inline]
    pub fn bandwidth(&self) -> f64 {
        self.high_freq() - self.low_freq()
    }

    /// Returns the time-frequency area of the bounds.
    #[inline]
    pub fn area(&self) -> f64 {
        self.duration() * self.bandwidth()
    }

    /// Returns `(start_time, low_freq, end_time, high_freq)`.
    #[inline]
    pub fn as_tuple(&self) -> (f64, f64, f64, f64) {
        (
            self.start_time,
            self.low_freq(),
            self.end_time,
            self.high_freq(),
        )
    }

    /// Returns the smallest bounds enclosing both `self` and `other`.
    ///
    /// If either side is full-spectrum, so is the result.
    pub fn union(&self, other: &Self) -> Self {
        Self::new(
            self.start_time.min(other.start_time),
            self.end_time.max(other.end_time),
            self.frequency.union(other.frequency),
        )
    }

    /// Returns the overlap of two closed regions, or `None` if they are disjoint.
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        let start_time = self.start_time.max(other.start_time);
        let end_time = self.end_time.min(other.end_time);
        if start_time > end_time {
            return None;
        }
        let frequency = self.frequency.intersection(other.frequency)?;
        Some(Self::new(start_time, end_time, frequency))
    }

    /// Returns true if the closed time ranges of both bounds overlap.
    #[inline]
    pub fn time_overlaps(&self, other: &Self) -> bool {
        self.start_time <= other.end_time && other.start_time <= self.end_time
    }
}

impl<S> std::fmt::Debug for Bounds<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bounds")
            .field("start_time", &self.start_time)
            .field("end_time", &self.end_time)
            .field("frequency", &self.frequency)
            .finish()
    }
}

// Custom serde implementation to avoid S: Serialize bounds
impl<S: Space> Serialize for Bounds<S> {
    fn serialize<Ser: serde::Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("Bounds", 5)?;
        state.serialize_field("start_time", &self.start_time)?;
        state.serialize_field("end_time", &self.end_time)?;
        state.serialize_field("low_freq", &self.low_freq())?;
        state.serialize_field("high_freq", &self.high_freq())?;
        state.serialize_field("full_spectrum", &self.is_time_only())?;
        state.end()
    }
}
