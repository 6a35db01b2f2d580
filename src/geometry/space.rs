//! Coordinate space marker types.
//!
//! These are zero-sized types (ZSTs) used as type parameters to distinguish
//! geometries measured in physical units from geometries expressed as
//! positions in a discretized array.

use std::fmt;

use super::bounds::MAX_FREQUENCY;

/// Behaviour shared by every coordinate space.
pub trait Space: Copy + PartialEq + fmt::Debug {
    /// Human-readable name of the space, used in error messages.
    const NAME: &'static str;

    /// Upper frequency edge of the space.
    ///
    /// Time-only geometries report their frequency extent as the whole band
    /// `[0, FREQUENCY_CEILING]` when a concrete number is required.
    const FREQUENCY_CEILING: f64;
}

/// Marker type for physical coordinates: time in seconds, frequency in hertz.
///
/// Times are relative to the start of the owning recording.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Physical {}

/// Marker type for array-index coordinates.
///
/// Index coordinates address the bins of a
/// [`Discretization`](super::Discretization), e.g. spectrogram columns and
/// rows. Values are always integral.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Index {}

impl Space for Physical {
    const NAME: &'static str = "physical";
    const FREQUENCY_CEILING: f64 = MAX_FREQUENCY;
}

impl Space for Index {
    const NAME: &'static str = "index";
    const FREQUENCY_CEILING: f64 = u32::MAX as f64;
}

impl fmt::Debug for Physical {
    fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {}
    }
}

impl fmt::Debug for Index {
    fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {}
    }
}
