//! Marker layout: where the host draws drag, plus and temporary markers
//!
//! Layouts are plain data recomputed from the shape after every change. The host renders
//! them and reports pointer interaction back by marker position in these lists.

use crate::HandlerConfig;
use draggable_lines_lib::{
    DraggableShape, Geometry, LatLng, LineLayer, MapProjection, PolylineIndex, ShapeKind,
    plus_icon_point,
};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Which icon a drag marker shows
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MarkerRole {
    Start,
    End,
    Via,
}

/// A marker on an existing control point
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DragMarker {
    pub idx: PolylineIndex,
    pub position: LatLng,
    pub role: MarkerRole,
    /// Whether clicking removes the point
    pub removable: bool,
}

/// A marker past the end of an open line that extends it when dragged
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PlusMarker {
    /// Insertion slot of the new point
    pub idx: PolylineIndex,
    pub position: LatLng,
    pub at_start: bool,
}

/// The temporary marker following the pointer along a line
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TempMarkerPoint {
    /// Closest point on the outline
    pub closest: LatLng,
    /// Insertion slot for a point created here
    pub idx: PolylineIndex,
}

/// Every marker of one layer
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MarkerLayout {
    pub drag_markers: Vec<DragMarker>,
    pub plus_markers: Vec<PlusMarker>,
}

impl MarkerLayout {
    pub fn compute<P: MapProjection + ?Sized>(
        view: &P,
        shape: &DraggableShape,
        config: &HandlerConfig,
    ) -> Self {
        Self {
            drag_markers: drag_markers(view, shape, config),
            plus_markers: plus_markers(view, shape, config),
        }
    }
}

/// One marker per control point
///
/// Open lines mark the first point of each part as the start and the last as the end.
pub fn drag_markers<P: MapProjection + ?Sized>(
    view: &P,
    shape: &DraggableShape,
    config: &HandlerConfig,
) -> Vec<DragMarker> {
    let kind = shape.kind();
    let route_points = shape.route_points(view);
    let parts = route_points.parts();

    route_points
        .indexed()
        .into_iter()
        .map(|(idx, position)| {
            let len = idx
                .part()
                .and_then(|part| parts.get(part))
                .or_else(|| parts.first())
                .map_or(0, |part| part.len());
            let j = idx.position();

            let role = if kind != ShapeKind::Polyline {
                MarkerRole::Via
            } else if j == 0 {
                MarkerRole::Start
            } else if j + 1 == len {
                MarkerRole::End
            } else {
                MarkerRole::Via
            };

            DragMarker {
                idx,
                position: *position,
                role,
                removable: config.remove_on_click
                    && kind.has_remove()
                    && len > kind.min_route_points(),
            }
        })
        .collect()
}

/// Two markers per track part with at least 2 points, for open lines only
///
/// A routed line extends its route points: slot 0 or the route point count. Otherwise the
/// slot is 0 or the length of the track part.
pub fn plus_markers<P: MapProjection + ?Sized>(
    view: &P,
    shape: &DraggableShape,
    config: &HandlerConfig,
) -> Vec<PlusMarker> {
    let Some(line) = shape.as_line() else {
        return Vec::new();
    };
    if line.kind() != ShapeKind::Polyline || !config.allow_extending_line {
        return Vec::new();
    }

    let distance = config.plus_marker_distance + line.weight() / 2.0;
    let mut markers = Vec::new();

    for (i, track) in line.lat_lngs().parts().into_iter().enumerate() {
        if track.len() < 2 {
            continue;
        }

        for at_start in [true, false] {
            let idx = match (line.route_points(), line.lat_lngs()) {
                (Some(Geometry::Flat(route)), _) => {
                    PolylineIndex::Flat(if at_start { 0 } else { route.len() })
                }
                (Some(Geometry::Nested(route)), _) => match route.get(i) {
                    Some(part) => PolylineIndex::Nested(i, if at_start { 0 } else { part.len() }),
                    None => continue,
                },
                (None, Geometry::Flat(_)) => {
                    PolylineIndex::Flat(if at_start { 0 } else { track.len() })
                }
                (None, Geometry::Nested(_)) => {
                    PolylineIndex::Nested(i, if at_start { 0 } else { track.len() })
                }
            };

            if let Some(position) = plus_icon_point(view, track, distance, at_start) {
                markers.push(PlusMarker {
                    idx,
                    position,
                    at_start,
                });
            }
        }
    }

    markers
}
