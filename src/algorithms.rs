//! Spatial algorithms used by the navigation controller.
//!
//! Everything here is a pure function over [`geo`] primitives. Coordinates
//! are WGS84 longitude/latitude in degrees (`x` = lng, `y` = lat).

use geo::{Coord, Line, LineString, Point};

/// Mean earth radius, in meters.
const EARTH_RADIUS: f64 = 6_371_000.0;

/// The result of projecting a point onto a single segment.
#[derive(Clone, Copy, Debug)]
pub struct SegmentSnap {
    /// The nearest point on the segment.
    pub snapped: Coord,
    /// Fraction along the segment at which the snapped point lies, in [0, 1].
    pub fraction_along: f64,
    /// Great-circle distance from the query point to the snapped point, in meters.
    pub perpendicular_distance: f64,
}

/// The result of projecting a point onto a linestring.
#[derive(Clone, Copy, Debug)]
pub struct LineStringSnap {
    /// The nearest point on the linestring.
    pub snapped: Coord,
    /// Index of the segment containing the snapped point (0-based).
    pub segment_index: usize,
    /// Fraction along that segment, in [0, 1].
    pub fraction_along: f64,
    /// Great-circle distance from the query point to the snapped point, in meters.
    pub perpendicular_distance: f64,
}

/// Great-circle distance between two points, in meters.
pub fn haversine_distance(a: Point, b: Point) -> f64 {
    let lat_a = a.y().to_radians();
    let lat_b = b.y().to_radians();
    let delta_lat = (b.y() - a.y()).to_radians();
    let delta_lng = (b.x() - a.x()).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat_a.cos() * lat_b.cos() * (delta_lng / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS * h.sqrt().asin()
}

/// Projects a point onto a segment, clamping to the segment's endpoints.
///
/// Uses a planar approximation about the segment midpoint, which stays
/// within 0.5m of the spherical answer for segments shorter than ~10km
/// (the scale of a route step). The reported distance is the haversine
/// distance to the snapped point.
pub fn snap_to_segment(point: Point, segment: Line) -> SegmentSnap {
    let a = segment.start;
    let b = segment.end;
    let cos_lat = ((a.y + b.y) / 2.0).to_radians().cos();

    let dx = (b.x - a.x) * cos_lat;
    let dy = b.y - a.y;
    let px = (point.x() - a.x) * cos_lat;
    let py = point.y() - a.y;

    let length_squared = dx * dx + dy * dy;
    let fraction_along = if length_squared > 0.0 {
        ((px * dx + py * dy) / length_squared).clamp(0.0, 1.0)
    } else {
        // Degenerate (zero-length) segment
        0.0
    };

    let snapped = Coord {
        x: a.x + (b.x - a.x) * fraction_along,
        y: a.y + (b.y - a.y) * fraction_along,
    };

    SegmentSnap {
        snapped,
        fraction_along,
        perpendicular_distance: haversine_distance(point, snapped.into()),
    }
}

/// Projects a point onto the nearest segment of a linestring.
///
/// Candidates are ranked by perpendicular distance; ties go to the lowest
/// segment index, then the lowest fraction along the segment. Returns `None`
/// when the linestring has fewer than two coordinates.
pub fn snap_to_linestring(point: Point, line: &LineString) -> Option<LineStringSnap> {
    let mut best: Option<LineStringSnap> = None;

    for (segment_index, segment) in line.lines().enumerate() {
        let candidate = snap_to_segment(point, segment);
        let is_better = match &best {
            Some(current) => candidate.perpendicular_distance < current.perpendicular_distance,
            None => true,
        };

        if is_better {
            best = Some(LineStringSnap {
                snapped: candidate.snapped,
                segment_index,
                fraction_along: candidate.fraction_along,
                perpendicular_distance: candidate.perpendicular_distance,
            });
        }
    }

    best
}

/// Prefix sums of segment lengths, in meters. Index 0 is always 0.
pub fn cumulative_distances(line: &LineString) -> Vec<f64> {
    let mut distances = Vec::with_capacity(line.0.len().max(1));
    distances.push(0.0);

    let mut total = 0.0;
    for segment in line.lines() {
        total += haversine_distance(segment.start.into(), segment.end.into());
        distances.push(total);
    }

    distances
}

/// Arc length from a point on the linestring to its end, in meters.
///
/// The point is identified by the segment containing it and the fraction
/// along that segment, as reported by [`snap_to_linestring`].
pub fn remaining_line_distance(line: &LineString, segment_index: usize, fraction_along: f64) -> f64 {
    let mut remaining = 0.0;

    for (index, segment) in line.lines().enumerate() {
        if index < segment_index {
            continue;
        }

        let length = haversine_distance(segment.start.into(), segment.end.into());
        if index == segment_index {
            remaining += (1.0 - fraction_along) * length;
        } else {
            remaining += length;
        }
    }

    remaining
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn line_from_pairs(coords: &[(f64, f64)]) -> LineString {
        coords
            .iter()
            .map(|(lng, lat)| Coord { x: *lng, y: *lat })
            .collect()
    }

    // One thousandth of a degree of latitude, in meters.
    const MILLIDEGREE: f64 = 111.19492664455873;

    #[test]
    fn haversine_zero_for_identical_points() {
        let point = Point::new(24.765368, 59.442643);
        assert_eq!(haversine_distance(point, point), 0.0);
    }

    #[test]
    fn haversine_along_the_equator() {
        let distance = haversine_distance(Point::new(0.0, 0.0), Point::new(0.001, 0.0));
        assert!((distance - MILLIDEGREE).abs() < 0.01);
    }

    #[test]
    fn snap_clamps_beyond_the_segment_end() {
        let segment = Line::new(Coord { x: 0.0, y: 0.0 }, Coord { x: 0.001, y: 0.0 });
        let snap = snap_to_segment(Point::new(0.0015, 0.0), segment);

        assert_eq!(snap.fraction_along, 1.0);
        assert_eq!(snap.snapped, segment.end);
        assert!((snap.perpendicular_distance - MILLIDEGREE / 2.0).abs() < 0.01);
    }

    #[test]
    fn snap_to_degenerate_segment_returns_start() {
        let vertex = Coord { x: 0.001, y: 0.001 };
        let snap = snap_to_segment(Point::new(0.0, 0.0), Line::new(vertex, vertex));

        assert_eq!(snap.fraction_along, 0.0);
        assert_eq!(snap.snapped, vertex);
    }

    #[test]
    fn linestring_snap_ties_break_toward_the_lowest_segment_index() {
        // The same segment repeated; every candidate is equidistant.
        let line = line_from_pairs(&[(0.0, 0.0), (0.001, 0.0), (0.0, 0.0), (0.001, 0.0)]);
        let snap = snap_to_linestring(Point::new(0.0005, 0.0001), &line).unwrap();

        assert_eq!(snap.segment_index, 0);
    }

    #[test]
    fn snap_to_linestring_needs_two_coordinates() {
        let empty = LineString::new(vec![]);
        let single = LineString::new(vec![Coord { x: 0.0, y: 0.0 }]);
        let point = Point::new(0.0, 0.0);

        assert!(snap_to_linestring(point, &empty).is_none());
        assert!(snap_to_linestring(point, &single).is_none());
    }

    #[test]
    fn remaining_distance_covers_later_segments() {
        let line = line_from_pairs(&[(0.0, 0.0), (0.001, 0.0), (0.002, 0.0)]);

        let full = remaining_line_distance(&line, 0, 0.0);
        let half = remaining_line_distance(&line, 0, 0.5);
        let last = remaining_line_distance(&line, 1, 1.0);

        assert!((full - 2.0 * MILLIDEGREE).abs() < 0.01);
        assert!((half - 1.5 * MILLIDEGREE).abs() < 0.01);
        assert!(last.abs() < 1e-9);
    }

    #[test]
    fn cumulative_distances_of_a_point_is_zero() {
        let single = LineString::new(vec![Coord { x: 0.0, y: 0.0 }]);
        assert_eq!(cumulative_distances(&single), vec![0.0]);
    }

    proptest! {
        #[test]
        fn perpendicular_distance_is_nonnegative_and_bounded(
            lng in -0.05f64..0.05,
            lat in -0.05f64..0.05,
            coords in prop::collection::vec((-0.05f64..0.05, -0.05f64..0.05), 2..8),
        ) {
            let line = line_from_pairs(&coords);
            let point = Point::new(lng, lat);
            let snap = snap_to_linestring(point, &line).unwrap();

            prop_assert!(snap.perpendicular_distance >= 0.0);
            prop_assert!((0.0..=1.0).contains(&snap.fraction_along));

            // Never worse than simply standing at the nearest vertex.
            let nearest_vertex = line
                .coords()
                .map(|coord| haversine_distance(point, Point::from(*coord)))
                .fold(f64::INFINITY, f64::min);
            prop_assert!(snap.perpendicular_distance <= nearest_vertex + 0.1);
        }

        #[test]
        fn points_on_the_line_snap_onto_it(
            coords in prop::collection::vec((-0.05f64..0.05, -0.05f64..0.05), 2..8),
            vertex in any::<prop::sample::Index>(),
            fraction in 0.0f64..1.0,
        ) {
            let line = line_from_pairs(&coords);

            let on_vertex = Point::from(line.0[vertex.index(line.0.len())]);
            let snap = snap_to_linestring(on_vertex, &line).unwrap();
            prop_assert!(snap.perpendicular_distance <= 0.5);

            // A point interpolated along the first segment also lies on the line.
            let segment = line.lines().next().unwrap();
            let interpolated = Point::new(
                segment.start.x + (segment.end.x - segment.start.x) * fraction,
                segment.start.y + (segment.end.y - segment.start.y) * fraction,
            );
            let snap = snap_to_linestring(interpolated, &line).unwrap();
            prop_assert!(snap.perpendicular_distance <= 0.5);
        }

        #[test]
        fn cumulative_distances_match_the_segment_sum(
            coords in prop::collection::vec((-0.05f64..0.05, -0.05f64..0.05), 2..8),
        ) {
            let line = line_from_pairs(&coords);
            let distances = cumulative_distances(&line);

            prop_assert_eq!(distances.len(), line.0.len());
            prop_assert_eq!(distances[0], 0.0);

            let total: f64 = line
                .lines()
                .map(|segment| haversine_distance(segment.start.into(), segment.end.into()))
                .sum();
            let last = *distances.last().unwrap();
            prop_assert!((last - total).abs() <= 1e-6 * total.max(1.0));

            prop_assert!(distances.windows(2).all(|pair| pair[0] <= pair[1]));
        }
    }
}
