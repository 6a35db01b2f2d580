//! Affine transforms and buffering of physical geometries.
//!
//! Every transform returns a new validated geometry; inputs are never
//! modified. Time-only variants ignore the frequency arguments.

use super::bounds::MAX_FREQUENCY;
use super::model::Geometry;
use crate::error::{Result, SoundEventError};

/// Shifts the geometry by `time` seconds and `frequency` hertz.
///
/// Fails with a validation error if the result leaves the valid plane
/// (negative time or frequency, frequency above [`MAX_FREQUENCY`]).
pub fn translate(geometry: &Geometry, time: f64, frequency: f64) -> Result<Geometry> {
    check_finite("time", time)?;
    check_finite("frequency", frequency)?;
    let coordinates = geometry
        .coordinates()
        .try_map(&|t| Ok(t + time), &|f| Ok(f + frequency))?;
    Geometry::new(coordinates)
}

/// Scales the geometry about the origin.
///
/// Both factors must be finite and strictly positive.
pub fn scale(geometry: &Geometry, time_factor: f64, frequency_factor: f64) -> Result<Geometry> {
    check_factor("time_factor", time_factor)?;
    check_factor("frequency_factor", frequency_factor)?;
    let coordinates = geometry
        .coordinates()
        .try_map(&|t| Ok(t * time_factor), &|f| Ok(f * frequency_factor))?;
    Geometry::new(coordinates)
}

/// Grows the geometry's bounds by a margin on each axis.
///
/// The result is always a `BoundingBox`, clamped to non-negative times and
/// to `[0, MAX_FREQUENCY]`. Time-only geometries span the whole frequency
/// range.
pub fn buffer(geometry: &Geometry, time_buffer: f64, frequency_buffer: f64) -> Result<Geometry> {
    check_margin("time_buffer", time_buffer)?;
    check_margin("frequency_buffer", frequency_buffer)?;
    let (start_time, low_freq, end_time, high_freq) = geometry.bounds().as_tuple();
    Geometry::bounding_box(
        (start_time - time_buffer).max(0.0),
        (low_freq - frequency_buffer).max(0.0),
        end_time + time_buffer,
        (high_freq + frequency_buffer).min(MAX_FREQUENCY),
    )
}

fn check_finite(field: &str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(SoundEventError::validation(field, format!("{value} is not finite")));
    }
    Ok(())
}

fn check_factor(field: &str, value: f64) -> Result<()> {
    check_finite(field, value)?;
    if value <= 0.0 {
        return Err(SoundEventError::validation(field, format!("{value} must be positive")));
    }
    Ok(())
}

fn check_margin(field: &str, value: f64) -> Result<()> {
    check_finite(field, value)?;
    if value < 0.0 {
        return Err(SoundEventError::validation(field, format!("{value} must not be negative")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::geometry::GeometryType;

    #[test]
    fn test_translate() {
        let line = Geometry::line_string([(0.0, 100.0), (1.0, 200.0)]).unwrap();
        let moved = translate(&line, 2.0, 50.0).unwrap();
        assert_eq!(moved, Geometry::line_string([(2.0, 150.0), (3.0, 250.0)]).unwrap());

        let err = translate(&line, -1.0, 0.0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_translate_time_only_ignores_frequency() {
        let stamp = Geometry::time_stamp(1.0).unwrap();
        assert_eq!(translate(&stamp, 0.5, -1e9).unwrap(), Geometry::time_stamp(1.5).unwrap());
    }

    #[test]
    fn test_scale() {
        let bbox = Geometry::bounding_box(1.0, 100.0, 2.0, 200.0).unwrap();
        let scaled = scale(&bbox, 2.0, 0.5).unwrap();
        assert_eq!(scaled.bounds().as_tuple(), (2.0, 50.0, 4.0, 100.0));
        assert!(scale(&bbox, 0.0, 1.0).is_err());
    }

    #[test]
    fn test_buffer_clamps() {
        let point = Geometry::point(0.1, 10.0).unwrap();
        let buffered = buffer(&point, 0.5, 100.0).unwrap();
        assert_eq!(buffered.variant_tag(), GeometryType::BoundingBox);
        assert_eq!(buffered.bounds().as_tuple(), (0.0, 0.0, 0.6, 110.0));

        let interval = Geometry::time_interval(1.0, 2.0).unwrap();
        let buffered = buffer(&interval, 1.0, 1.0).unwrap();
        assert_eq!(buffered.bounds().as_tuple(), (0.0, 0.0, 3.0, MAX_FREQUENCY));
    }
}
