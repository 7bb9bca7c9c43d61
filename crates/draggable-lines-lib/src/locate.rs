//! Segment locator: closest point on a (multi-part) line for one or more query points
//!
//! Only the ordering of segments by distance matters, so distances are compared squared
//! in projected pixels and never converted to ground distances.

use crate::{
    DraggableLinesError, FractionalIndex, Geometry, LatLng, MapProjection, PolylineIndex, Result,
};
use geo::Coord;

/// Where a query point lies on a line
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Location {
    /// Fractional position of the closest point
    pub idx: FractionalIndex,
    /// The closest point on the line, in geographic coordinates
    pub closest: LatLng,
}

/// Best segment found so far for one query point
#[derive(Clone, Copy, Debug)]
struct Candidate {
    sq_dist: f64,
    part: usize,
    segment: usize,
    fraction: f64,
    closest: Coord<f64>,
}

/// Locate each of `points` on `geometry`
///
/// For each query point the segment with the smallest distance wins; ties keep the first
/// segment in scan order (parts ascending, segments ascending). With `ring` set, every part
/// gets an extra closing segment from its last vertex back to its first.
///
/// The result has the same length and order as `points`. Indexes are flat or nested like
/// `geometry`.
///
/// # Errors
/// [`DraggableLinesError::DegenerateGeometry`] when no part has at least 2 points.
pub fn locate_on_line<P: MapProjection + ?Sized>(
    view: &P,
    geometry: &Geometry<LatLng>,
    points: &[LatLng],
    ring: bool,
) -> Result<Vec<Location>> {
    locate_in_parts(view, &geometry.parts(), geometry.is_flat(), points, ring)
}

/// Single-point form of [`locate_on_line`]
pub fn locate_point_on_line<P: MapProjection + ?Sized>(
    view: &P,
    geometry: &Geometry<LatLng>,
    point: LatLng,
    ring: bool,
) -> Result<Location> {
    locate_on_line(view, geometry, &[point], ring)?
        .into_iter()
        .next()
        .ok_or(DraggableLinesError::DegenerateGeometry)
}

pub(crate) fn locate_in_parts<P: MapProjection + ?Sized>(
    view: &P,
    parts: &[&[LatLng]],
    flat: bool,
    points: &[LatLng],
    ring: bool,
) -> Result<Vec<Location>> {
    #[cfg(feature = "profiling")]
    profiling::scope!("locate::locate_in_parts");

    if !parts.iter().any(|part| part.len() >= 2) {
        return Err(DraggableLinesError::DegenerateGeometry);
    }

    let zoom = view.locate_zoom();

    // Project the query points once, not per comparison
    let projected: Vec<Coord<f64>> = points.iter().map(|p| view.project(*p, zoom)).collect();
    let mut best: Vec<Option<Candidate>> = vec![None; projected.len()];

    for (part_index, part) in parts.iter().enumerate() {
        if part.len() < 2 {
            continue;
        }

        let vertices: Vec<Coord<f64>> = part.iter().map(|p| view.project(*p, zoom)).collect();
        let segment_count = if ring { vertices.len() } else { vertices.len() - 1 };

        for segment in 0..segment_count {
            let a = vertices[segment];
            let b = vertices[(segment + 1) % vertices.len()];

            for (query, slot) in projected.iter().zip(best.iter_mut()) {
                let (fraction, closest) = closest_point_on_segment(*query, a, b);
                let sq_dist = squared_distance(*query, closest);
                if slot.is_none_or(|current| sq_dist < current.sq_dist) {
                    *slot = Some(Candidate {
                        sq_dist,
                        part: part_index,
                        segment,
                        fraction,
                        closest,
                    });
                }
            }
        }
    }

    best.into_iter()
        .map(|candidate| {
            let candidate = candidate.ok_or(DraggableLinesError::DegenerateGeometry)?;
            let position = candidate.segment as f64 + candidate.fraction;
            Ok(Location {
                idx: if flat {
                    FractionalIndex::Flat(position)
                } else {
                    FractionalIndex::Nested(candidate.part, position)
                },
                closest: view.unproject(candidate.closest, zoom),
            })
        })
        .collect()
}

/// Closest point to `p` on the segment `a`-`b` and its fraction along the segment
///
/// A zero-length segment reports a fraction of 0.5.
#[inline]
pub(crate) fn closest_point_on_segment(
    p: Coord<f64>,
    a: Coord<f64>,
    b: Coord<f64>,
) -> (f64, Coord<f64>) {
    let d = b - a;
    let dot = d.x * d.x + d.y * d.y;
    if dot > 0.0 {
        let t = (((p.x - a.x) * d.x + (p.y - a.y) * d.y) / dot).clamp(0.0, 1.0);
        (t, a + d * t)
    } else {
        (0.5, a)
    }
}

#[inline]
pub(crate) fn squared_distance(a: Coord<f64>, b: Coord<f64>) -> f64 {
    let d = a - b;
    d.x * d.x + d.y * d.y
}

/// Index at which a point dragged out of the line at `point` should be inserted
///
/// The located fractional index is rounded up: a point on vertex `k` yields `k`, a point
/// between `k` and `k + 1` yields `k + 1`. With `allow_extending_line` unset, open lines
/// never return the first or last slot of the part, so the endpoints stay in place.
pub fn get_insert_position<P: MapProjection + ?Sized>(
    view: &P,
    geometry: &Geometry<LatLng>,
    point: LatLng,
    allow_extending_line: bool,
    ring: bool,
) -> Result<PolylineIndex> {
    let idx = locate_point_on_line(view, geometry, point, ring)?.idx.ceil();
    if allow_extending_line || ring {
        return Ok(idx);
    }

    let len = geometry.part(idx).map_or(0, <[LatLng]>::len);
    let max = len.saturating_sub(1).max(1);
    Ok(idx.with_position(idx.position().clamp(1, max)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::WebMercatorView;

    fn view() -> WebMercatorView {
        WebMercatorView::new(10.0).with_max_zoom(18.0)
    }

    fn line() -> Geometry<LatLng> {
        Geometry::Flat(vec![
            LatLng::new(0.0, 0.0),
            LatLng::new(0.0, 1.0),
            LatLng::new(0.0, 2.0),
            LatLng::new(0.0, 3.0),
        ])
    }

    #[test]
    fn test_point_on_vertex() {
        let location = locate_point_on_line(&view(), &line(), LatLng::new(0.0, 2.0), false).unwrap();
        assert!((location.idx.position() - 2.0).abs() < 1e-9);
        assert_eq!(location.idx.ceil(), PolylineIndex::Flat(2));
    }

    #[test]
    fn test_point_between_vertices() {
        let location = locate_point_on_line(&view(), &line(), LatLng::new(0.1, 1.25), false).unwrap();
        let position = location.idx.position();
        assert!(position > 1.0 && position < 2.0, "position {position}");
        assert!((position - 1.25).abs() < 1e-6);
        assert_eq!(location.idx.ceil(), PolylineIndex::Flat(2));
        assert!(location.closest.lat.abs() < 1e-9);
        assert!((location.closest.lng - 1.25).abs() < 1e-6);
    }

    #[test]
    fn test_point_before_start_clamps_to_zero() {
        let location = locate_point_on_line(&view(), &line(), LatLng::new(0.0, -1.0), false).unwrap();
        assert_eq!(location.idx.position(), 0.0);
    }

    #[test]
    fn test_vertical_segment_fraction() {
        let geometry = Geometry::Flat(vec![LatLng::new(0.0, 0.0), LatLng::new(1.0, 0.0)]);
        let location =
            locate_point_on_line(&view(), &geometry, LatLng::new(0.5, 0.01), false).unwrap();
        let position = location.idx.position();
        assert!(position.is_finite());
        assert!(position > 0.4 && position < 0.6, "position {position}");
    }

    #[test]
    fn test_degenerate_segment_has_half_fraction() {
        let geometry = Geometry::Flat(vec![LatLng::new(1.0, 1.0), LatLng::new(1.0, 1.0)]);
        let location =
            locate_point_on_line(&view(), &geometry, LatLng::new(2.0, 2.0), false).unwrap();
        assert_eq!(location.idx, FractionalIndex::Flat(0.5));
        assert!(location.closest.lat.is_finite() && location.closest.lng.is_finite());
    }

    #[test]
    fn test_degenerate_geometry_fails() {
        let geometry = Geometry::Nested(vec![vec![LatLng::new(0.0, 0.0)], vec![]]);
        let result = locate_point_on_line(&view(), &geometry, LatLng::new(0.0, 0.0), false);
        assert_eq!(result, Err(DraggableLinesError::DegenerateGeometry));
    }

    #[test]
    fn test_ring_closing_segment() {
        let square = Geometry::Flat(vec![
            LatLng::new(0.0, 0.0),
            LatLng::new(1.0, 0.0),
            LatLng::new(1.0, 1.0),
            LatLng::new(0.0, 1.0),
        ]);
        // Below the bottom edge, which only exists when the ring is closed
        let point = LatLng::new(-0.01, 0.5);

        let open = locate_point_on_line(&view(), &square, point, false).unwrap();
        assert!(open.idx.position() <= 3.0);

        let closed = locate_point_on_line(&view(), &square, point, true).unwrap();
        assert!(closed.idx.position() > 3.0 && closed.idx.position() < 4.0);
        assert_eq!(closed.idx.ceil(), PolylineIndex::Flat(4));
    }

    #[test]
    fn test_multi_part_and_multi_point() {
        let geometry = Geometry::Nested(vec![
            vec![LatLng::new(0.0, 0.0), LatLng::new(0.0, 1.0)],
            vec![LatLng::new(5.0, 0.0), LatLng::new(5.0, 1.0), LatLng::new(5.0, 2.0)],
        ]);
        let locations = locate_on_line(
            &view(),
            &geometry,
            &[LatLng::new(4.9, 1.5), LatLng::new(0.1, 0.5)],
            false,
        )
        .unwrap();

        assert_eq!(locations.len(), 2);
        assert_eq!(locations[0].idx.part(), Some(1));
        assert!((locations[0].idx.position() - 1.5).abs() < 1e-6);
        assert_eq!(locations[1].idx.part(), Some(0));
        assert!((locations[1].idx.position() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_ties_keep_first_segment() {
        // Both segments pass through the query point
        let geometry = Geometry::Flat(vec![
            LatLng::new(0.0, 0.0),
            LatLng::new(0.0, 1.0),
            LatLng::new(0.0, 0.0),
        ]);
        let location =
            locate_point_on_line(&view(), &geometry, LatLng::new(0.0, 0.5), false).unwrap();
        assert!(location.idx.position() < 1.0);
    }

    #[test]
    fn test_point_on_inner_vertex_ends_earlier_segment() {
        let location = locate_point_on_line(&view(), &line(), LatLng::new(0.0, 1.0), false).unwrap();
        assert_eq!(location.idx, FractionalIndex::Flat(1.0));
        assert_eq!(location.idx.ceil(), PolylineIndex::Flat(1));
    }

    #[test]
    fn test_insert_position_clamps_when_not_extending() {
        let before_start = LatLng::new(0.0, -1.0);
        let after_end = LatLng::new(0.0, 4.0);

        let idx = get_insert_position(&view(), &line(), before_start, true, false).unwrap();
        assert_eq!(idx, PolylineIndex::Flat(0));
        let idx = get_insert_position(&view(), &line(), after_end, true, false).unwrap();
        assert_eq!(idx, PolylineIndex::Flat(3));

        let idx = get_insert_position(&view(), &line(), before_start, false, false).unwrap();
        assert_eq!(idx, PolylineIndex::Flat(1));
        let idx = get_insert_position(&view(), &line(), LatLng::new(0.0, 2.9), false, false).unwrap();
        assert_eq!(idx, PolylineIndex::Flat(3));
    }

    #[test]
    fn test_insert_position_nested() {
        let geometry = Geometry::Nested(vec![
            vec![LatLng::new(0.0, 0.0), LatLng::new(0.0, 1.0)],
            vec![LatLng::new(5.0, 0.0), LatLng::new(5.0, 1.0)],
        ]);
        let idx =
            get_insert_position(&view(), &geometry, LatLng::new(5.0, 0.5), true, false).unwrap();
        assert_eq!(idx, PolylineIndex::Nested(1, 1));
    }
}
