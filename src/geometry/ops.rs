//! Spatial predicates and overlap metrics between geometries.
//!
//! # Projection rule
//!
//! Every operation first decides which axes to compare with
//! [`comparison_dimensionality`]. When either operand is time-only
//! (`TimeStamp`, `TimeInterval`), both operands are projected onto the time
//! axis and compared as closed intervals; the frequency information of the
//! other operand is dropped. Only when both operands carry frequency
//! information is the exact time-frequency test used.
//!
//! The exact tests run on [`geo`] geometries with time on the x axis and
//! frequency on the y axis. All comparisons are closed: touching boundaries
//! count as intersecting.

use geo::{BooleanOps, Intersects, Relate};

use super::bounds::Bounds;
use super::coord::Position;
use super::model::{Coordinates, Dimensionality, Geometry};
use super::space::Space;
use super::GeometryError;
use crate::error::Result;

/// Decides which axes two geometries are compared on.
pub fn comparison_dimensionality<S: Space>(a: &Geometry<S>, b: &Geometry<S>) -> Dimensionality {
    match (a.dimensionality(), b.dimensionality()) {
        (Dimensionality::TimeFrequency, Dimensionality::TimeFrequency) => Dimensionality::TimeFrequency,
        _ => Dimensionality::TimeOnly,
    }
}

/// Returns true if the two geometries share at least one point.
pub fn intersects<S: Space>(a: &Geometry<S>, b: &Geometry<S>) -> bool {
    let (bounds_a, bounds_b) = (a.bounds(), b.bounds());
    match comparison_dimensionality(a, b) {
        Dimensionality::TimeOnly => bounds_a.time_overlaps(&bounds_b),
        Dimensionality::TimeFrequency => {
            bounds_a.intersection(&bounds_b).is_some() && to_geo(a).intersects(&to_geo(b))
        }
    }
}

/// Returns true if every point of `contained` is covered by `container`.
///
/// Areal containers (boxes, polygons) cover their interior and boundary but
/// not their holes. Linear containers only cover points on the line and
/// pieces running along it. Point containers only cover coincident points.
/// The members of a multi-part container act as one region, so a geometry
/// may straddle two members that share an edge or a vertex.
pub fn contains<S: Space>(container: &Geometry<S>, contained: &Geometry<S>) -> bool {
    let (outer, inner) = (container.bounds(), contained.bounds());
    match comparison_dimensionality(container, contained) {
        Dimensionality::TimeOnly => {
            outer.start_time() <= inner.start_time() && inner.end_time() <= outer.end_time()
        }
        Dimensionality::TimeFrequency => {
            let encloses = outer.start_time() <= inner.start_time()
                && inner.end_time() <= outer.end_time()
                && outer.low_freq() <= inner.low_freq()
                && inner.high_freq() <= outer.high_freq();
            encloses && dissolve(to_geo(container)).relate(&to_geo(contained)).is_covers()
        }
    }
}

/// Intersection-over-union of the two geometries' bounds.
///
/// Under the projection rule this is the 1D ratio of time overlap to time
/// union. Fails with [`GeometryError::ZeroMeasureUnion`] when the union has
/// no length (or area), e.g. for two identical points.
pub fn iou<S: Space>(a: &Geometry<S>, b: &Geometry<S>) -> Result<f64> {
    let (bounds_a, bounds_b) = (a.bounds(), b.bounds());
    let (intersection, union) = match comparison_dimensionality(a, b) {
        Dimensionality::TimeOnly => {
            let overlap = (bounds_a.end_time().min(bounds_b.end_time())
                - bounds_a.start_time().max(bounds_b.start_time()))
            .max(0.0);
            (overlap, bounds_a.duration() + bounds_b.duration() - overlap)
        }
        Dimensionality::TimeFrequency => {
            let overlap = bounds_a
                .intersection(&bounds_b)
                .map_or(0.0, |bounds| bounds.area());
            (overlap, bounds_a.area() + bounds_b.area() - overlap)
        }
    };

    if union <= 0.0 {
        return Err(GeometryError::ZeroMeasureUnion.into());
    }
    Ok(intersection / union)
}

/// Returns the overlap of the two geometries' bounds, if any.
///
/// Under the projection rule the result is full-spectrum.
pub fn intersection_bounds<S: Space>(a: &Geometry<S>, b: &Geometry<S>) -> Option<Bounds<S>> {
    let (bounds_a, bounds_b) = (a.bounds(), b.bounds());
    match comparison_dimensionality(a, b) {
        Dimensionality::TimeOnly => {
            let start = bounds_a.start_time().max(bounds_b.start_time());
            let end = bounds_a.end_time().min(bounds_b.end_time());
            (start <= end).then(|| Bounds::time_only(start, end))
        }
        Dimensionality::TimeFrequency => bounds_a.intersection(&bounds_b),
    }
}

fn coord<S>(position: &Position<S>) -> geo::Coord<f64> {
    let (x, y) = position.as_tuple();
    geo::Coord { x, y }
}

fn line<S>(points: &[Position<S>]) -> geo::LineString<f64> {
    geo::LineString::new(points.iter().map(coord).collect())
}

fn polygon<S>(rings: &[Vec<Position<S>>]) -> geo::Polygon<f64> {
    let mut rings = rings.iter().map(|ring| line(ring));
    let exterior = rings.next().unwrap_or_else(|| geo::LineString::new(Vec::new()));
    geo::Polygon::new(exterior, rings.collect())
}

/// A box of zero width or height is a segment (or a point), not an area.
fn extent(t0: f64, f0: f64, t1: f64, f1: f64) -> geo::Geometry<f64> {
    let (min, max) = (geo::Coord { x: t0, y: f0 }, geo::Coord { x: t1, y: f1 });
    if min == max {
        geo::Geometry::Point(geo::Point(min))
    } else if t0 == t1 || f0 == f1 {
        geo::Geometry::Line(geo::Line::new(min, max))
    } else {
        geo::Geometry::Rect(geo::Rect::new(min, max))
    }
}

fn to_geo<S: Space>(geometry: &Geometry<S>) -> geo::Geometry<f64> {
    match geometry.coordinates() {
        // Only reached when a caller bypasses the projection rule.
        Coordinates::TimeStamp(_) | Coordinates::TimeInterval(_) => {
            let (t0, f0, t1, f1) = geometry.bounds().as_tuple();
            extent(t0, f0, t1, f1)
        }
        Coordinates::Point(p) => geo::Geometry::Point(geo::Point(coord(p))),
        Coordinates::MultiPoint(points) => {
            geo::Geometry::MultiPoint(geo::MultiPoint::new(
                points.iter().map(|p| geo::Point(coord(p))).collect(),
            ))
        }
        Coordinates::LineString(points) => geo::Geometry::LineString(line(points)),
        Coordinates::MultiLineString(lines) => {
            geo::Geometry::MultiLineString(geo::MultiLineString::new(
                lines.iter().map(|points| line(points)).collect(),
            ))
        }
        Coordinates::Polygon(rings) => geo::Geometry::Polygon(polygon(rings)),
        Coordinates::MultiPolygon(polygons) => {
            geo::Geometry::MultiPolygon(geo::MultiPolygon::new(
                polygons.iter().map(|rings| polygon(rings)).collect(),
            ))
        }
        Coordinates::BoundingBox([t0, f0, t1, f1]) => extent(*t0, *f0, *t1, *f1),
    }
}

/// Merges the members of a multi-polygon so shared edges become interior.
fn dissolve(geometry: geo::Geometry<f64>) -> geo::Geometry<f64> {
    match geometry {
        geo::Geometry::MultiPolygon(parts) if parts.0.len() > 1 => {
            let merged = parts
                .0
                .into_iter()
                .fold(geo::MultiPolygon::new(Vec::new()), |merged, part| {
                    merged.union(&geo::MultiPolygon::new(vec![part]))
                });
            geo::Geometry::MultiPolygon(merged)
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::geometry::Physical;

    fn square(t0: f64, f0: f64, t1: f64, f1: f64) -> Vec<(f64, f64)> {
        vec![(t0, f0), (t1, f0), (t1, f1), (t0, f1), (t0, f0)]
    }

    fn donut() -> Geometry<Physical> {
        Geometry::polygon([square(0.0, 0.0, 10.0, 10.0), square(4.0, 4.0, 6.0, 6.0)]).unwrap()
    }

    #[test]
    fn test_projection_rule_drops_frequency() {
        let interval = Geometry::<Physical>::time_interval(1.0, 3.0).unwrap();
        let point = Geometry::point(2.0, 500.0).unwrap();
        let distant_box = Geometry::bounding_box(1.0, 600.0, 3.0, 700.0).unwrap();

        assert_eq!(comparison_dimensionality(&interval, &point), Dimensionality::TimeOnly);
        assert!(intersects(&interval, &point));
        assert!(intersects(&interval, &distant_box));
        assert!(intersects(&distant_box, &interval));
    }

    #[test]
    fn test_time_only_disjoint() {
        let a = Geometry::<Physical>::time_interval(0.0, 1.0).unwrap();
        let b = Geometry::time_stamp(1.5).unwrap();
        assert!(!intersects(&a, &b));
        assert!(intersects(&a, &Geometry::time_stamp(1.0).unwrap()));
    }

    #[test]
    fn test_point_in_polygon_hole() {
        let polygon = donut();
        assert!(intersects(&polygon, &Geometry::point(2.0, 2.0).unwrap()));
        assert!(!intersects(&polygon, &Geometry::point(5.0, 5.0).unwrap()));
        // Hole boundary belongs to the polygon.
        assert!(intersects(&polygon, &Geometry::point(4.0, 5.0).unwrap()));
    }

    #[test]
    fn test_line_crossing_box() {
        let bbox = Geometry::<Physical>::bounding_box(1.0, 1.0, 2.0, 2.0).unwrap();
        let crossing = Geometry::line_string([(0.0, 1.5), (3.0, 1.5)]).unwrap();
        let passing = Geometry::line_string([(0.0, 3.0), (3.0, 3.5)]).unwrap();
        assert!(intersects(&bbox, &crossing));
        assert!(!intersects(&bbox, &passing));
    }

    #[test]
    fn test_diagonal_line_misses_box_despite_bounds_overlap() {
        let bbox = Geometry::<Physical>::bounding_box(0.0, 8.0, 2.0, 10.0).unwrap();
        let line = Geometry::line_string([(0.0, 0.0), (10.0, 10.0)]).unwrap();
        assert!(!intersects(&bbox, &line));
    }

    #[test]
    fn test_polygon_inside_hole_does_not_intersect() {
        let inner = Geometry::<Physical>::polygon([square(4.5, 4.5, 5.5, 5.5)]).unwrap();
        assert!(!intersects(&donut(), &inner));
        assert!(!contains(&donut(), &inner));
    }

    #[test]
    fn test_contains() {
        let outer = Geometry::<Physical>::bounding_box(0.0, 0.0, 10.0, 10.0).unwrap();
        let inner = Geometry::bounding_box(1.0, 1.0, 2.0, 2.0).unwrap();
        assert!(contains(&outer, &inner));
        assert!(!contains(&inner, &outer));
        assert!(contains(&outer, &outer));

        let line = Geometry::line_string([(1.0, 1.0), (9.0, 9.0)]).unwrap();
        assert!(contains(&outer, &line));
        assert!(!contains(&donut(), &line));
    }

    #[test]
    fn test_contains_rejects_area_around_hole() {
        let around_hole = Geometry::<Physical>::bounding_box(3.0, 3.0, 7.0, 7.0).unwrap();
        assert!(!contains(&donut(), &around_hole));
        let beside_hole = Geometry::<Physical>::bounding_box(1.0, 1.0, 3.0, 3.0).unwrap();
        assert!(contains(&donut(), &beside_hole));
    }

    #[test]
    fn test_contains_rejects_area_bordering_hole() {
        // Shares its whole boundary with the hole.
        let hole_shaped = Geometry::<Physical>::bounding_box(4.0, 4.0, 6.0, 6.0).unwrap();
        assert!(!contains(&donut(), &hole_shaped));
        // Hole corners sit on the contained boundary.
        let across_hole = Geometry::<Physical>::bounding_box(4.0, 3.0, 6.0, 7.0).unwrap();
        assert!(!contains(&donut(), &across_hole));
    }

    #[test]
    fn test_contains_rejects_line_through_hole() {
        let polygon =
            Geometry::<Physical>::polygon([square(0.0, 0.0, 20.0, 20.0), square(4.0, 4.0, 6.0, 6.0)]).unwrap();
        let line = Geometry::line_string([(2.0, 2.0), (16.0, 16.0)]).unwrap();
        assert!(!contains(&polygon, &line));
        let along_hole = Geometry::line_string([(4.0, 1.0), (4.0, 9.0)]).unwrap();
        assert!(contains(&polygon, &along_hole));
    }

    #[test]
    fn test_line_contains_piece_across_vertex() {
        let line = Geometry::<Physical>::line_string([(0.0, 0.0), (1.0, 1.0), (2.0, 2.0)]).unwrap();
        let piece = Geometry::line_string([(0.5, 0.5), (1.5, 1.5)]).unwrap();
        assert!(contains(&line, &piece));

        let bent = Geometry::<Physical>::line_string([(0.0, 0.0), (1.0, 1.0), (2.0, 1.0)]).unwrap();
        assert!(!contains(&bent, &piece));
    }

    #[test]
    fn test_multi_polygon_members_act_as_one_region() {
        let halves = Geometry::<Physical>::multi_polygon([
            vec![square(0.0, 0.0, 1.0, 2.0)],
            vec![square(1.0, 0.0, 2.0, 2.0)],
        ])
        .unwrap();
        let straddling = Geometry::bounding_box(0.5, 0.5, 1.5, 1.5).unwrap();
        assert!(contains(&halves, &straddling));
    }

    #[test]
    fn test_line_contains_points_on_it() {
        let line = Geometry::<Physical>::line_string([(0.0, 0.0), (2.0, 2.0)]).unwrap();
        assert!(contains(&line, &Geometry::point(1.0, 1.0).unwrap()));
        assert!(!contains(&line, &Geometry::point(1.0, 1.5).unwrap()));
    }

    #[test]
    fn test_contains_under_projection() {
        let interval = Geometry::<Physical>::time_interval(0.0, 5.0).unwrap();
        let bbox = Geometry::bounding_box(1.0, 100.0, 4.0, 200.0).unwrap();
        assert!(contains(&interval, &bbox));
        assert!(!contains(&interval, &Geometry::bounding_box(4.0, 0.0, 6.0, 1.0).unwrap()));
    }

    #[test]
    fn test_iou_on_bounds() {
        let a = Geometry::<Physical>::bounding_box(0.0, 0.0, 2.0, 2.0).unwrap();
        let b = Geometry::bounding_box(1.0, 0.0, 3.0, 2.0).unwrap();
        let value = iou(&a, &b).unwrap();
        assert!((value - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(iou(&a, &a).unwrap(), 1.0);
    }

    #[test]
    fn test_iou_under_projection() {
        let a = Geometry::<Physical>::time_interval(0.0, 4.0).unwrap();
        let b = Geometry::bounding_box(2.0, 100.0, 6.0, 200.0).unwrap();
        assert_eq!(iou(&a, &b).unwrap(), 2.0 / 6.0);
    }

    #[test]
    fn test_iou_zero_measure_fails() {
        let a = Geometry::<Physical>::point(1.0, 1.0).unwrap();
        let err = iou(&a, &a).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Geometry);
    }

    #[test]
    fn test_intersection_bounds() {
        let a = Geometry::<Physical>::time_interval(0.0, 4.0).unwrap();
        let b = Geometry::bounding_box(2.0, 100.0, 6.0, 200.0).unwrap();
        let overlap = intersection_bounds(&a, &b).unwrap();
        assert!(overlap.is_time_only());
        assert_eq!((overlap.start_time(), overlap.end_time()), (2.0, 4.0));

        let c = Geometry::bounding_box(5.0, 300.0, 6.0, 400.0).unwrap();
        assert!(intersection_bounds(&b, &c).is_none());
    }
}
