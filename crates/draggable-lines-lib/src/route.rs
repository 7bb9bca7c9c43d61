//! Mapping positions on a derived track back to slots in its sparse route points
//!
//! A routed line is displayed as dense "track points" computed from a few "route points"
//! (waypoints). Dragging the track must insert a new route point in the right slot so that
//! re-routing reproduces a coherent path.

use crate::locate::locate_in_parts;
use crate::{DraggableLinesError, FractionalIndex, Geometry, LatLng, MapProjection, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Route points given either as coordinates or as their precomputed track positions
#[derive(Clone, Copy, Debug)]
pub enum RouteTarget<'a> {
    /// Coordinates, located on the track on every call
    Points(&'a [LatLng]),
    /// Fractional track positions, e.g. from [`route_point_indexes`]
    Indexes(&'a [f64]),
}

/// The dragged position on the track
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TrackPosition {
    Point(LatLng),
    Index(f64),
}

/// Fractional positions of every route point on its track
///
/// Callers cache this per shape and recompute it whenever the track changes. A nested
/// part is `None` while its track has fewer than 2 points, e.g. before it is routed.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RoutePointIndexes {
    Flat(Vec<f64>),
    Nested(Vec<Option<Vec<f64>>>),
}

impl RoutePointIndexes {
    /// The route point positions relevant to a located track position
    pub fn for_position(&self, idx: FractionalIndex) -> Option<&[f64]> {
        match (self, idx) {
            (Self::Flat(indexes), FractionalIndex::Flat(_)) => Some(indexes),
            (Self::Nested(parts), FractionalIndex::Nested(part, _)) => {
                parts.get(part).and_then(Option::as_deref)
            }
            _ => None,
        }
    }
}

/// Index in the route points where a point dragged out of the track should be inserted
///
/// Returns the first slot `i >= 1` whose route point lies further along the track than the
/// dragged position, or `route_points - 1` when none does. Slot 0 is never returned: the
/// first route point is treated as a fixed start.
///
/// # Errors
/// [`DraggableLinesError::DegenerateGeometry`] when something needs locating and the
/// track has fewer than 2 points.
pub fn get_route_insert_position<P: MapProjection + ?Sized>(
    view: &P,
    route: RouteTarget<'_>,
    track: &[LatLng],
    position: TrackPosition,
) -> Result<usize> {
    let mut queries = Vec::new();
    if let TrackPosition::Point(point) = position {
        queries.push(point);
    }
    if let RouteTarget::Points(points) = route {
        queries.extend_from_slice(points);
    }

    // Locate the dragged point and all route points in a single pass
    let located: Vec<f64> = if queries.is_empty() {
        Vec::new()
    } else {
        locate_in_parts(view, &[track], true, &queries, false)?
            .iter()
            .map(|location| location.idx.position())
            .collect()
    };
    let mut located = located.as_slice();

    let point_index = match position {
        TrackPosition::Index(index) => index,
        TrackPosition::Point(_) => {
            let (first, rest) = located
                .split_first()
                .ok_or(DraggableLinesError::DegenerateGeometry)?;
            located = rest;
            *first
        }
    };
    let route_indexes = match route {
        RouteTarget::Indexes(indexes) => indexes,
        RouteTarget::Points(_) => located,
    };

    Ok(route_slot(route_indexes, point_index))
}

fn route_slot(route_indexes: &[f64], point_index: f64) -> usize {
    route_indexes
        .iter()
        .enumerate()
        .skip(1)
        .find(|(_, index)| **index > point_index)
        .map_or(route_indexes.len().saturating_sub(1), |(slot, _)| slot)
}

/// Locate every route point on the track, for caching
///
/// A flat track pairs with flat route points; a nested track pairs part `i` of the route
/// points with part `i` of the track. Nested parts are located independently, so a track
/// part that cannot be located on only leaves its own entry empty.
///
/// # Errors
/// [`DraggableLinesError::ShapeMismatch`] when the nesting differs,
/// [`DraggableLinesError::DegenerateGeometry`] when a flat track has fewer than 2 points.
pub fn route_point_indexes<P: MapProjection + ?Sized>(
    view: &P,
    track: &Geometry<LatLng>,
    route_points: &Geometry<LatLng>,
) -> Result<RoutePointIndexes> {
    match (track, route_points) {
        (Geometry::Flat(track), Geometry::Flat(points)) => Ok(RoutePointIndexes::Flat(
            locate_positions(view, track, points)?,
        )),
        (Geometry::Nested(track_parts), Geometry::Nested(point_parts)) => point_parts
            .iter()
            .enumerate()
            .map(|(i, points)| {
                let track = track_parts.get(i).map_or(&[][..], Vec::as_slice);
                match locate_positions(view, track, points) {
                    Ok(positions) => Ok(Some(positions)),
                    Err(DraggableLinesError::DegenerateGeometry) => {
                        tracing::trace!(part = i, "Track part not routed yet");
                        Ok(None)
                    }
                    Err(err) => Err(err),
                }
            })
            .collect::<Result<Vec<_>>>()
            .map(RoutePointIndexes::Nested),
        _ => Err(DraggableLinesError::ShapeMismatch {
            reason: "track points and route points must have the same nesting".to_string(),
        }),
    }
}

fn locate_positions<P: MapProjection + ?Sized>(
    view: &P,
    track: &[LatLng],
    points: &[LatLng],
) -> Result<Vec<f64>> {
    Ok(locate_in_parts(view, &[track], true, points, false)?
        .iter()
        .map(|location| location.idx.position())
        .collect())
}
