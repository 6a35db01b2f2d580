//! Mapping geometries between physical units and array indices.
//!
//! A [`Discretization`] holds the bin values of a spectrogram-like array:
//! one strictly increasing list of times and one of frequencies. Physical
//! coordinates map to the index of a bin according to a single [`TieBreak`]
//! policy, applied identically to every variant and both axes.

use super::model::{Coordinates, Geometry};
use super::space::{Index, Physical};
use super::GeometryError;
use crate::error::{Result, SoundEventError};

/// Which bin a coordinate between (or on) bin values maps to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TieBreak {
    /// The largest index whose bin value is `<=` the coordinate.
    ///
    /// A coordinate exactly on a bin value maps to that bin.
    #[default]
    Lower,
    /// The smallest index whose bin value is `>=` the coordinate.
    Upper,
}

/// Options for [`to_index_space`] and [`to_physical_space`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IndexOptions {
    pub tie_break: TieBreak,
}

impl IndexOptions {
    pub fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }
}

/// Bin values of the two axes of an index space.
#[derive(Clone, Debug, PartialEq)]
pub struct Discretization {
    times: Vec<f64>,
    frequencies: Option<Vec<f64>>,
}

impl Discretization {
    /// Creates a two-axis discretization.
    ///
    /// Both axes must be non-empty, finite and strictly increasing.
    pub fn new(times: Vec<f64>, frequencies: Vec<f64>) -> Result<Self> {
        check_axis("time", &times)?;
        check_axis("frequency", &frequencies)?;
        Ok(Self {
            times,
            frequencies: Some(frequencies),
        })
    }

    /// Creates a discretization of the time axis alone.
    ///
    /// Only time-only geometries can be mapped through it; anything with a
    /// frequency component fails with
    /// [`GeometryError::EmptyDiscretization`].
    pub fn time_only(times: Vec<f64>) -> Result<Self> {
        check_axis("time", &times)?;
        Ok(Self {
            times,
            frequencies: None,
        })
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn frequencies(&self) -> Option<&[f64]> {
        self.frequencies.as_deref()
    }

    /// Index of the time bin for `time`.
    pub fn time_index(&self, time: f64, tie_break: TieBreak) -> usize {
        coord_index(&self.times, time, tie_break)
    }

    /// Index of the frequency bin for `frequency`.
    pub fn frequency_index(&self, frequency: f64, tie_break: TieBreak) -> Result<usize> {
        Ok(coord_index(self.frequency_bins()?, frequency, tie_break))
    }

    fn frequency_bins(&self) -> std::result::Result<&[f64], GeometryError> {
        self.frequencies
            .as_deref()
            .ok_or(GeometryError::EmptyDiscretization { axis: "frequency" })
    }
}

fn check_axis(axis: &'static str, bins: &[f64]) -> std::result::Result<(), GeometryError> {
    if bins.is_empty() {
        return Err(GeometryError::EmptyDiscretization { axis });
    }
    if let Some(index) = bins.iter().position(|b| !b.is_finite()) {
        return Err(GeometryError::NonFiniteDiscretization { axis, index });
    }
    if let Some(i) = bins.windows(2).position(|pair| pair[0] >= pair[1]) {
        return Err(GeometryError::NonMonotonicDiscretization { axis, index: i + 1 });
    }
    Ok(())
}

/// Finds the bin index of `value` in non-empty, strictly increasing `bins`.
///
/// Values before the first or after the last bin clamp to the edge index.
fn coord_index(bins: &[f64], value: f64, tie_break: TieBreak) -> usize {
    let last = bins.len().saturating_sub(1);
    match tie_break {
        TieBreak::Lower => bins.partition_point(|b| *b <= value).saturating_sub(1),
        TieBreak::Upper => bins.partition_point(|b| *b < value).min(last),
    }
}

/// Expresses a physical geometry in the index coordinates of `discretization`.
///
/// Time-only variants use the time axis alone. The mapping keeps the
/// variant; if distinct positions fold onto the same bins so that the
/// variant's invariants no longer hold (e.g. a `LineString` collapses to
/// one position), it fails with [`GeometryError::Collapsed`].
pub fn to_index_space(
    geometry: &Geometry<Physical>,
    discretization: &Discretization,
    options: &IndexOptions,
) -> Result<Geometry<Index>> {
    let tie_break = options.tie_break;
    let coordinates: Coordinates<Index> = geometry.coordinates().try_map(
        &|time| Ok(discretization.time_index(time, tie_break) as f64),
        &|frequency| Ok(discretization.frequency_index(frequency, tie_break)? as f64),
    )?;
    revalidate(coordinates)
}

/// Maps an index-space geometry back to the bin values of `discretization`.
///
/// Fractional indices are rounded with the tie-break policy (`Lower` takes
/// the floor, `Upper` the ceiling). Indices outside the axis fail with
/// [`GeometryError::IndexOutOfRange`].
pub fn to_physical_space(
    geometry: &Geometry<Index>,
    discretization: &Discretization,
    options: &IndexOptions,
) -> Result<Geometry<Physical>> {
    let tie_break = options.tie_break;
    let coordinates: Coordinates<Physical> = geometry.coordinates().try_map(
        &|time| bin_value("time", &discretization.times, time, tie_break),
        &|frequency| bin_value("frequency", discretization.frequency_bins()?, frequency, tie_break),
    )?;
    revalidate(coordinates)
}

fn bin_value(axis: &'static str, bins: &[f64], index: f64, tie_break: TieBreak) -> Result<f64> {
    let rounded = match tie_break {
        TieBreak::Lower => index.floor(),
        TieBreak::Upper => index.ceil(),
    };
    if !(rounded >= 0.0 && rounded < bins.len() as f64) {
        return Err(GeometryError::IndexOutOfRange {
            axis,
            index,
            len: bins.len(),
        }
        .into());
    }
    Ok(bins[rounded as usize])
}

fn revalidate<S: super::Space>(coordinates: Coordinates<S>) -> Result<Geometry<S>> {
    Geometry::new(coordinates).map_err(|err| match err {
        SoundEventError::Validation { field, message } => GeometryError::Collapsed {
            reason: format!("{field}: {message}"),
        }
        .into(),
        other => other,
    })
}
