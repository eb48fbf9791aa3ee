//! Line geometry used to place stops and route segments on the map.
//!
//! Projection is done per segment in lon/lat space; candidates are ranked by
//! Haversine distance so the result matches what a rider sees on the map.

use geo::{Closest, ClosestPoint, Coord, HaversineDistance, LineString, Point};

/// Calculate Haversine distance between two points in meters
pub fn haversine_distance(p1: Point, p2: Point) -> f64 {
    p1.haversine_distance(&p2)
}

/// Projection of a point onto a line string.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NearestPoint {
    pub coord: Coord,
    /// Index of the segment (`line[i]..line[i + 1]`) holding `coord`
    pub segment_index: usize,
    /// Distance from `line[segment_index]` to `coord`, in meters
    pub segment_offset_m: f64,
    /// Distance from the query point to `coord`, in meters
    pub distance_m: f64,
}

impl NearestPoint {
    fn is_after(&self, other: &NearestPoint) -> bool {
        self.segment_index > other.segment_index
            || (self.segment_index == other.segment_index
                && self.segment_offset_m > other.segment_offset_m)
    }
}

/// How far a stop may sit from a later pass of a looping line and still be
/// placed there, in meters.
const LOOP_SNAP_TOLERANCE_M: f64 = 1.0;

/// Snap `point` to the closest location on `line`.
///
/// Ties go to the earliest segment. Returns `None` for an empty line.
pub fn nearest_point_on_line(line: &LineString, point: Coord) -> Option<NearestPoint> {
    let target = Point::from(point);

    if let [only] = line.0.as_slice() {
        return Some(NearestPoint {
            coord: *only,
            segment_index: 0,
            segment_offset_m: 0.0,
            distance_m: haversine_distance(target, Point::from(*only)),
        });
    }

    nearest_point_from_segment(line, target, 0)
}

fn nearest_point_from_segment(
    line: &LineString,
    target: Point,
    first_segment: usize,
) -> Option<NearestPoint> {
    let mut best: Option<NearestPoint> = None;
    for (segment_index, segment) in line.lines().enumerate().skip(first_segment) {
        let candidate = if segment.start == segment.end {
            Point::from(segment.start)
        } else {
            match segment.closest_point(&target) {
                Closest::Intersection(p) | Closest::SinglePoint(p) => p,
                Closest::Indeterminate => continue,
            }
        };

        let distance_m = haversine_distance(target, candidate);
        if best.map_or(true, |current| distance_m < current.distance_m) {
            best = Some(NearestPoint {
                coord: candidate.into(),
                segment_index,
                segment_offset_m: haversine_distance(Point::from(segment.start), candidate),
                distance_m,
            });
        }
    }
    best
}

/// The part of `line` between the projections of `start` and `stop`.
///
/// The result runs from `start`'s projection to `stop`'s projection, keeps
/// every vertex in between, and never repeats a coordinate back to back.
/// When both project onto the same spot and the line passes that spot again
/// later (a loop), `stop` is placed on the later pass.
pub fn line_slice(line: &LineString, start: Coord, stop: Coord) -> Option<LineString> {
    let from = nearest_point_on_line(line, start)?;
    let mut to = nearest_point_on_line(line, stop)?;
    if to.coord == from.coord {
        if let Some(later) =
            nearest_point_from_segment(line, Point::from(stop), from.segment_index + 1)
        {
            if later.distance_m <= to.distance_m + LOOP_SNAP_TOLERANCE_M {
                to = later;
            }
        }
    }

    let reversed = from.is_after(&to);
    let (first, last) = if reversed { (to, from) } else { (from, to) };

    let mut coords = Vec::with_capacity(last.segment_index - first.segment_index + 2);
    coords.push(first.coord);
    coords.extend(
        line.0
            .iter()
            .skip(first.segment_index + 1)
            .take(last.segment_index - first.segment_index)
            .copied(),
    );
    coords.push(last.coord);
    coords.dedup();

    if reversed {
        coords.reverse();
    }
    Some(LineString::new(coords))
}
