//! The geometry sum type and its validated construction.
//!
//! Geometries follow the GeoJSON naming and nesting conventions, with time
//! on the first axis and frequency on the second. Two time-only variants
//! (`TimeStamp` and `TimeInterval`) extend the GeoJSON set for events that
//! have no meaningful frequency extent.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use super::bounds::Bounds;
use super::coord::Position;
use super::space::{Physical, Space};
use crate::error::{Result, SoundEventError};

/// Discriminator of the geometry variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GeometryType {
    TimeStamp,
    TimeInterval,
    Point,
    LineString,
    Polygon,
    BoundingBox,
    MultiPoint,
    MultiLineString,
    MultiPolygon,
}

impl GeometryType {
    /// Every variant, in declaration order.
    pub const ALL: [GeometryType; 9] = [
        GeometryType::TimeStamp,
        GeometryType::TimeInterval,
        GeometryType::Point,
        GeometryType::LineString,
        GeometryType::Polygon,
        GeometryType::BoundingBox,
        GeometryType::MultiPoint,
        GeometryType::MultiLineString,
        GeometryType::MultiPolygon,
    ];

    /// Returns the tag used in serialized documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TimeStamp => "TimeStamp",
            Self::TimeInterval => "TimeInterval",
            Self::Point => "Point",
            Self::LineString => "LineString",
            Self::Polygon => "Polygon",
            Self::BoundingBox => "BoundingBox",
            Self::MultiPoint => "MultiPoint",
            Self::MultiLineString => "MultiLineString",
            Self::MultiPolygon => "MultiPolygon",
        }
    }

    /// Returns which axes the variant describes.
    pub fn dimensionality(&self) -> Dimensionality {
        match self {
            Self::TimeStamp | Self::TimeInterval => Dimensionality::TimeOnly,
            Self::Point
            | Self::LineString
            | Self::Polygon
            | Self::BoundingBox
            | Self::MultiPoint
            | Self::MultiLineString
            | Self::MultiPolygon => Dimensionality::TimeFrequency,
        }
    }
}

impl fmt::Display for GeometryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GeometryType {
    type Err = SoundEventError;

    fn from_str(s: &str) -> Result<Self> {
        GeometryType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| SoundEventError::validation("type", format!("unknown geometry type '{s}'")))
    }
}

/// Which axes a geometry carries information about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Dimensionality {
    /// Time axis only; frequency is unknown.
    TimeOnly,
    /// Both time and frequency.
    TimeFrequency,
}

/// Raw coordinate data of each geometry variant.
///
/// A `Coordinates` value is not validated on its own; wrap it with
/// [`Geometry::new`] to check the invariants. A validated geometry hands its
/// coordinates back out through [`Geometry::coordinates`], which is the
/// read-only view operations match on.
#[derive(Clone, Debug, PartialEq)]
pub enum Coordinates<S = Physical> {
    /// A single time.
    TimeStamp(f64),
    /// `[start, end]` times.
    TimeInterval([f64; 2]),
    /// One time-frequency position.
    Point(Position<S>),
    /// An ordered path of positions.
    LineString(Vec<Position<S>>),
    /// Closed rings; the first is the outer boundary, the rest are holes.
    Polygon(Vec<Vec<Position<S>>>),
    /// `[start_time, low_freq, end_time, high_freq]`.
    BoundingBox([f64; 4]),
    MultiPoint(Vec<Position<S>>),
    MultiLineString(Vec<Vec<Position<S>>>),
    MultiPolygon(Vec<Vec<Vec<Position<S>>>>),
}

impl<S> Coordinates<S> {
    /// Returns the variant tag of these coordinates.
    pub fn geometry_type(&self) -> GeometryType {
        match self {
            Self::TimeStamp(_) => GeometryType::TimeStamp,
            Self::TimeInterval(_) => GeometryType::TimeInterval,
            Self::Point(_) => GeometryType::Point,
            Self::LineString(_) => GeometryType::LineString,
            Self::Polygon(_) => GeometryType::Polygon,
            Self::BoundingBox(_) => GeometryType::BoundingBox,
            Self::MultiPoint(_) => GeometryType::MultiPoint,
            Self::MultiLineString(_) => GeometryType::MultiLineString,
            Self::MultiPolygon(_) => GeometryType::MultiPolygon,
        }
    }

    /// Maps every time and frequency component through the given functions.
    ///
    /// The mapping functions see one axis value at a time; the result keeps
    /// the variant and nesting unchanged.
    pub(crate) fn try_map<T>(&self, time: &AxisMap<'_>, frequency: &AxisMap<'_>) -> Result<Coordinates<T>> {
        Ok(match self {
            Self::TimeStamp(t) => Coordinates::TimeStamp(time(*t)?),
            Self::TimeInterval([start, end]) => Coordinates::TimeInterval([time(*start)?, time(*end)?]),
            Self::Point(p) => Coordinates::Point(map_position(p, time, frequency)?),
            Self::LineString(points) => Coordinates::LineString(map_line(points, time, frequency)?),
            Self::Polygon(rings) => Coordinates::Polygon(map_rings(rings, time, frequency)?),
            Self::BoundingBox([t0, f0, t1, f1]) => {
                Coordinates::BoundingBox([time(*t0)?, frequency(*f0)?, time(*t1)?, frequency(*f1)?])
            }
            Self::MultiPoint(points) => Coordinates::MultiPoint(map_line(points, time, frequency)?),
            Self::MultiLineString(lines) => Coordinates::MultiLineString(map_rings(lines, time, frequency)?),
            Self::MultiPolygon(polygons) => Coordinates::MultiPolygon(
                polygons
                    .iter()
                    .map(|rings| map_rings(rings, time, frequency))
                    .collect::<Result<_>>()?,
            ),
        })
    }
}

/// A fallible mapping applied to one axis value.
pub(crate) type AxisMap<'a> = dyn Fn(f64) -> Result<f64> + 'a;

fn map_position<S, T>(p: &Position<S>, time: &AxisMap<'_>, frequency: &AxisMap<'_>) -> Result<Position<T>> {
    Ok(Position::new(time(p.time)?, frequency(p.frequency)?))
}

fn map_line<S, T>(points: &[Position<S>], time: &AxisMap<'_>, frequency: &AxisMap<'_>) -> Result<Vec<Position<T>>> {
    points.iter().map(|p| map_position(p, time, frequency)).collect()
}

fn map_rings<S, T>(
    rings: &[Vec<Position<S>>],
    time: &AxisMap<'_>,
    frequency: &AxisMap<'_>,
) -> Result<Vec<Vec<Position<T>>>> {
    rings.iter().map(|ring| map_line(ring, time, frequency)).collect()
}

/// A validated, immutable geometry.
///
/// Construction checks every invariant of the variant:
///
/// - all values are finite and non-negative, frequencies stay below the
///   space's ceiling ([`MAX_FREQUENCY`](super::MAX_FREQUENCY) in hertz)
/// - `TimeInterval` and `BoundingBox` have `start <= end` on each axis
/// - a `LineString` has at least two distinct positions, ordered by time
/// - every polygon ring has at least four positions and is closed
///   (first == last)
/// - `Polygon` and every `Multi*` variant hold at least one member
///
/// Equality is structural and exact: same variant, element-wise equal
/// coordinates, no floating-point tolerance.
#[derive(Clone, Debug, PartialEq)]
pub struct Geometry<S = Physical> {
    coordinates: Coordinates<S>,
}

impl<S: Space> Geometry<S> {
    /// Validates raw coordinates and wraps them in a geometry.
    pub fn new(coordinates: Coordinates<S>) -> Result<Self> {
        validate(&coordinates)?;
        Ok(Self { coordinates })
    }

    /// Wraps coordinates that are valid by construction.
    pub(crate) fn new_unchecked(coordinates: Coordinates<S>) -> Self {
        Self { coordinates }
    }

    pub fn time_stamp(time: f64) -> Result<Self> {
        Self::new(Coordinates::TimeStamp(time))
    }

    pub fn time_interval(start: f64, end: f64) -> Result<Self> {
        Self::new(Coordinates::TimeInterval([start, end]))
    }

    pub fn point(time: f64, frequency: f64) -> Result<Self> {
        Self::new(Coordinates::Point(Position::new(time, frequency)))
    }

    pub fn line_string(points: impl IntoIterator<Item = (f64, f64)>) -> Result<Self> {
        Self::new(Coordinates::LineString(collect_positions(points)))
    }

    /// Builds a polygon from its rings; the first ring is the outer boundary.
    pub fn polygon<R>(rings: impl IntoIterator<Item = R>) -> Result<Self>
    where
        R: IntoIterator<Item = (f64, f64)>,
    {
        Self::new(Coordinates::Polygon(
            rings.into_iter().map(collect_positions).collect(),
        ))
    }

    pub fn bounding_box(start_time: f64, low_freq: f64, end_time: f64, high_freq: f64) -> Result<Self> {
        Self::new(Coordinates::BoundingBox([
            start_time, low_freq, end_time, high_freq,
        ]))
    }

    pub fn multi_point(points: impl IntoIterator<Item = (f64, f64)>) -> Result<Self> {
        Self::new(Coordinates::MultiPoint(collect_positions(points)))
    }

    pub fn multi_line_string<L>(lines: impl IntoIterator<Item = L>) -> Result<Self>
    where
        L: IntoIterator<Item = (f64, f64)>,
    {
        Self::new(Coordinates::MultiLineString(
            lines.into_iter().map(collect_positions).collect(),
        ))
    }

    pub fn multi_polygon<P, R>(polygons: impl IntoIterator<Item = P>) -> Result<Self>
    where
        P: IntoIterator<Item = R>,
        R: IntoIterator<Item = (f64, f64)>,
    {
        Self::new(Coordinates::MultiPolygon(
            polygons
                .into_iter()
                .map(|rings| rings.into_iter().map(collect_positions).collect())
                .collect(),
        ))
    }

    /// Returns the variant discriminator.
    #[inline]
    pub fn variant_tag(&self) -> GeometryType {
        self.coordinates.geometry_type()
    }

    #[inline]
    pub fn dimensionality(&self) -> Dimensionality {
        self.variant_tag().dimensionality()
    }

    /// Read-only view of the coordinate data.
    #[inline]
    pub fn coordinates(&self) -> &Coordinates<S> {
        &self.coordinates
    }

    pub fn into_coordinates(self) -> Coordinates<S> {
        self.coordinates
    }

    /// Computes the minimal axis-aligned region enclosing the geometry.
    ///
    /// - Polygons use their outer ring only; holes never widen the bounds.
    /// - `Multi*` variants report the union of their members' bounds.
    /// - `TimeStamp` and `TimeInterval` report
    ///   [`FrequencyBounds::FullSpectrum`](super::FrequencyBounds::FullSpectrum).
    pub fn bounds(&self) -> Bounds<S> {
        match &self.coordinates {
            Coordinates::TimeStamp(time) => Bounds::time_only(*time, *time),
            Coordinates::TimeInterval([start, end]) => Bounds::time_only(*start, *end),
            Coordinates::Point(p) => Bounds::from_corners(p.time, p.frequency, p.time, p.frequency),
            Coordinates::LineString(points) | Coordinates::MultiPoint(points) => {
                positions_bounds(points.iter())
            }
            Coordinates::Polygon(rings) => positions_bounds(rings.iter().take(1).flatten()),
            Coordinates::BoundingBox([t0, f0, t1, f1]) => Bounds::from_corners(*t0, *f0, *t1, *f1),
            Coordinates::MultiLineString(lines) => positions_bounds(lines.iter().flatten()),
            Coordinates::MultiPolygon(polygons) => {
                positions_bounds(polygons.iter().filter_map(|rings| rings.first()).flatten())
            }
        }
    }

    /// Converts the geometry to the `BoundingBox` of its bounds.
    ///
    /// Always succeeds. This is lossy: shape detail and holes are dropped,
    /// and time-only geometries span the whole frequency range
    /// `[0, S::FREQUENCY_CEILING]`. Use it only where a fixed-shape region is
    /// wanted regardless of the original precision.
    pub fn to_box(&self) -> Geometry<S> {
        let (start_time, low_freq, end_time, high_freq) = self.bounds().as_tuple();
        Geometry::new_unchecked(Coordinates::BoundingBox([
            start_time, low_freq, end_time, high_freq,
        ]))
    }

    /// Serializes the geometry to its `{"type", "coordinates"}` document form.
    pub fn to_json(&self) -> Value {
        let mut object = serde_json::Map::new();
        object.insert("type".into(), Value::from(self.variant_tag().as_str()));
        object.insert("coordinates".into(), coordinates_to_json(&self.coordinates));
        Value::Object(object)
    }

    /// Parses and validates a geometry from its document form.
    pub fn from_json(value: &Value) -> Result<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| SoundEventError::validation("geometry", "expected an object"))?;
        let kind: GeometryType = object
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| SoundEventError::validation("type", "missing geometry type"))?
            .parse()?;
        let raw = object
            .get("coordinates")
            .ok_or_else(|| SoundEventError::validation("coordinates", "missing coordinates"))?;

        let coordinates = match kind {
            GeometryType::TimeStamp => Coordinates::TimeStamp(parse_shape(raw, "a number")?),
            GeometryType::TimeInterval => Coordinates::TimeInterval(parse_shape(raw, "[start, end]")?),
            GeometryType::Point => Coordinates::Point(parse_shape(raw, "[time, frequency]")?),
            GeometryType::LineString => Coordinates::LineString(parse_shape(raw, "a list of positions")?),
            GeometryType::Polygon => Coordinates::Polygon(parse_shape(raw, "a list of rings")?),
            GeometryType::BoundingBox => Coordinates::BoundingBox(parse_shape(
                raw,
                "[start_time, low_freq, end_time, high_freq]",
            )?),
            GeometryType::MultiPoint => Coordinates::MultiPoint(parse_shape(raw, "a list of positions")?),
            GeometryType::MultiLineString => {
                Coordinates::MultiLineString(parse_shape(raw, "a list of lines")?)
            }
            GeometryType::MultiPolygon => Coordinates::MultiPolygon(parse_shape(raw, "a list of polygons")?),
        };

        Self::new(coordinates)
    }
}

// Validation rejects NaN, so equality is reflexive.
impl<S: Space> Eq for Geometry<S> {}

/// Hashes the canonical coordinate encoding: variant tag, then every value
/// in document order with nesting lengths. `-0.0` hashes like `0.0` to stay
/// consistent with `==`.
impl<S: Space> Hash for Geometry<S> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        fn value<H: Hasher>(v: f64, state: &mut H) {
            let canonical = if v == 0.0 { 0.0f64 } else { v };
            canonical.to_bits().hash(state);
        }
        fn line<S, H: Hasher>(points: &[Position<S>], state: &mut H) {
            points.len().hash(state);
            for p in points {
                value(p.time, state);
                value(p.frequency, state);
            }
        }
        fn polygon<S, H: Hasher>(rings: &[Vec<Position<S>>], state: &mut H) {
            rings.len().hash(state);
            for ring in rings {
                line(ring, state);
            }
        }

        self.variant_tag().hash(state);
        match &self.coordinates {
            Coordinates::TimeStamp(t) => value(*t, state),
            Coordinates::TimeInterval(values) => values.iter().for_each(|v| value(*v, state)),
            Coordinates::Point(p) => line(std::slice::from_ref(p), state),
            Coordinates::LineString(points) | Coordinates::MultiPoint(points) => line(points, state),
            Coordinates::Polygon(rings) | Coordinates::MultiLineString(rings) => polygon(rings, state),
            Coordinates::BoundingBox(values) => values.iter().for_each(|v| value(*v, state)),
            Coordinates::MultiPolygon(polygons) => {
                polygons.len().hash(state);
                for rings in polygons {
                    polygon(rings, state);
                }
            }
        }
    }
}

impl<S: Space> Serialize for Geometry<S> {
    fn serialize<Ser: serde::Serializer>(&self, serializer: Ser) -> std::result::Result<Ser::Ok, Ser::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de, S: Space> Deserialize<'de> for Geometry<S> {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Geometry::from_json(&value).map_err(serde::de::Error::custom)
    }
}

fn collect_positions<S>(points: impl IntoIterator<Item = (f64, f64)>) -> Vec<Position<S>> {
    points.into_iter().map(Position::from).collect()
}

fn parse_shape<T: DeserializeOwned>(raw: &Value, expected: &str) -> Result<T> {
    T::deserialize(raw).map_err(|e| SoundEventError::validation("coordinates", format!("expected {expected}: {e}")))
}

fn positions_bounds<'a, S: Space + 'a>(positions: impl Iterator<Item = &'a Position<S>>) -> Bounds<S> {
    let (t0, f0, t1, f1) = positions.fold(
        (f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        |(t0, f0, t1, f1), p| (t0.min(p.time), f0.min(p.frequency), t1.max(p.time), f1.max(p.frequency)),
    );
    Bounds::from_corners(t0, f0, t1, f1)
}

fn position_to_json<S>(p: &Position<S>) -> Value {
    Value::Array(vec![Value::from(p.time), Value::from(p.frequency)])
}

fn line_to_json<S>(points: &[Position<S>]) -> Value {
    Value::Array(points.iter().map(position_to_json).collect())
}

fn rings_to_json<S>(rings: &[Vec<Position<S>>]) -> Value {
    Value::Array(rings.iter().map(|r| line_to_json(r)).collect())
}

fn coordinates_to_json<S>(coordinates: &Coordinates<S>) -> Value {
    match coordinates {
        Coordinates::TimeStamp(t) => Value::from(*t),
        Coordinates::TimeInterval(values) => Value::Array(values.iter().map(|v| Value::from(*v)).collect()),
        Coordinates::Point(p) => position_to_json(p),
        Coordinates::LineString(points) | Coordinates::MultiPoint(points) => line_to_json(points),
        Coordinates::Polygon(rings) | Coordinates::MultiLineString(rings) => rings_to_json(rings),
        Coordinates::BoundingBox(values) => Value::Array(values.iter().map(|v| Value::from(*v)).collect()),
        Coordinates::MultiPolygon(polygons) => Value::Array(polygons.iter().map(|p| rings_to_json(p)).collect()),
    }
}

fn validate<S: Space>(coordinates: &Coordinates<S>) -> Result<()> {
    const FIELD: &str = "coordinates";

    match coordinates {
        Coordinates::TimeStamp(time) => check_time(*time, FIELD),
        Coordinates::TimeInterval([start, end]) => {
            check_time(*start, &format!("{FIELD}[0]"))?;
            check_time(*end, &format!("{FIELD}[1]"))?;
            if start > end {
                return Err(SoundEventError::validation(
                    FIELD,
                    format!("start time {start} is after end time {end}"),
                ));
            }
            Ok(())
        }
        Coordinates::Point(p) => check_position(p, FIELD),
        Coordinates::LineString(points) => check_line(points, FIELD),
        Coordinates::Polygon(rings) => check_polygon(rings, FIELD),
        Coordinates::BoundingBox([start_time, low_freq, end_time, high_freq]) => {
            check_time(*start_time, &format!("{FIELD}[0]"))?;
            check_frequency::<S>(*low_freq, &format!("{FIELD}[1]"))?;
            check_time(*end_time, &format!("{FIELD}[2]"))?;
            check_frequency::<S>(*high_freq, &format!("{FIELD}[3]"))?;
            if start_time > end_time {
                return Err(SoundEventError::validation(
                    FIELD,
                    format!("start time {start_time} is after end time {end_time}"),
                ));
            }
            if low_freq > high_freq {
                return Err(SoundEventError::validation(
                    FIELD,
                    format!("low frequency {low_freq} is above high frequency {high_freq}"),
                ));
            }
            Ok(())
        }
        Coordinates::MultiPoint(points) => {
            check_not_empty(points, FIELD, "point")?;
            for (i, p) in points.iter().enumerate() {
                check_position(p, &format!("{FIELD}[{i}]"))?;
            }
            Ok(())
        }
        Coordinates::MultiLineString(lines) => {
            check_not_empty(lines, FIELD, "line")?;
            for (i, line) in lines.iter().enumerate() {
                check_line(line, &format!("{FIELD}[{i}]"))?;
            }
            Ok(())
        }
        Coordinates::MultiPolygon(polygons) => {
            check_not_empty(polygons, FIELD, "polygon")?;
            for (i, rings) in polygons.iter().enumerate() {
                check_polygon(rings, &format!("{FIELD}[{i}]"))?;
            }
            Ok(())
        }
    }
}

fn check_not_empty<T>(items: &[T], field: &str, what: &str) -> Result<()> {
    if items.is_empty() {
        return Err(SoundEventError::validation(
            field,
            format!("must contain at least one {what}"),
        ));
    }
    Ok(())
}

fn check_time(time: f64, field: &str) -> Result<()> {
    if !time.is_finite() {
        return Err(SoundEventError::validation(field, format!("time {time} is not finite")));
    }
    if time < 0.0 {
        return Err(SoundEventError::validation(field, format!("time {time} is negative")));
    }
    Ok(())
}

fn check_frequency<S: Space>(frequency: f64, field: &str) -> Result<()> {
    if !frequency.is_finite() {
        return Err(SoundEventError::validation(
            field,
            format!("frequency {frequency} is not finite"),
        ));
    }
    if frequency < 0.0 {
        return Err(SoundEventError::validation(
            field,
            format!("frequency {frequency} is negative"),
        ));
    }
    if frequency > S::FREQUENCY_CEILING {
        return Err(SoundEventError::validation(
            field,
            format!(
                "frequency {frequency} exceeds the {} maximum of {}",
                S::NAME,
                S::FREQUENCY_CEILING
            ),
        ));
    }
    Ok(())
}

fn check_position<S: Space>(p: &Position<S>, field: &str) -> Result<()> {
    check_time(p.time, field)?;
    check_frequency::<S>(p.frequency, field)
}

fn check_line<S: Space>(points: &[Position<S>], field: &str) -> Result<()> {
    if points.len() < 2 {
        return Err(SoundEventError::validation(
            field,
            format!("a line needs at least two positions, got {}", points.len()),
        ));
    }
    for (i, p) in points.iter().enumerate() {
        check_position(p, &format!("{field}[{i}]"))?;
    }
    if let Some(i) = points.windows(2).position(|pair| pair[0].time > pair[1].time) {
        return Err(SoundEventError::validation(
            format!("{field}[{}]", i + 1),
            "line positions must be ordered by time",
        ));
    }
    if points.iter().all(|p| *p == points[0]) {
        return Err(SoundEventError::validation(
            field,
            "a line needs at least two distinct positions",
        ));
    }
    Ok(())
}

fn check_ring<S: Space>(ring: &[Position<S>], field: &str) -> Result<()> {
    if ring.len() < 4 {
        return Err(SoundEventError::validation(
            field,
            format!("a ring needs at least four positions, got {}", ring.len()),
        ));
    }
    for (i, p) in ring.iter().enumerate() {
        check_position(p, &format!("{field}[{i}]"))?;
    }
    if ring.first() != ring.last() {
        return Err(SoundEventError::validation(
            field,
            "a ring must be closed (first position == last position)",
        ));
    }
    Ok(())
}

fn check_polygon<S: Space>(rings: &[Vec<Position<S>>], field: &str) -> Result<()> {
    check_not_empty(rings, field, "ring")?;
    for (i, ring) in rings.iter().enumerate() {
        check_ring(ring, &format!("{field}[{i}]"))?;
    }
    Ok(())
}
