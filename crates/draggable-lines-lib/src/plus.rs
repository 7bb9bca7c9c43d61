//! Placement of the "extend line" markers beyond the ends of a line

use crate::{LatLng, MapProjection};
use geo::Coord;

/// The point `distance` pixels before the first vertex (or past the last one)
///
/// Continues the direction from the first vertex whose pixel position differs from the
/// endpoint. When every vertex coincides with the endpoint, the marker goes to the left of
/// the start or the right of the end. Returns `None` for an empty track.
pub fn plus_icon_point<P: MapProjection + ?Sized>(
    view: &P,
    track: &[LatLng],
    distance: f64,
    at_start: bool,
) -> Option<LatLng> {
    let endpoint = if at_start { track.first() } else { track.last() }?;
    let point0 = view.lat_lng_to_container_point(*endpoint);

    let neighbour = if at_start {
        track[1..].iter().find_map(|p| distinct(view, point0, *p))
    } else {
        track[..track.len() - 1]
            .iter()
            .rev()
            .find_map(|p| distinct(view, point0, *p))
    };

    let result = match neighbour {
        Some(point1) => {
            let delta = point1 - point0;
            let fraction = distance / delta.x.hypot(delta.y);
            point0 - delta * fraction
        }
        None => Coord {
            x: point0.x + if at_start { -distance } else { distance },
            y: point0.y,
        },
    };
    Some(view.container_point_to_lat_lng(result))
}

fn distinct<P: MapProjection + ?Sized>(view: &P, point0: Coord<f64>, p: LatLng) -> Option<Coord<f64>> {
    let point = view.lat_lng_to_container_point(p);
    (point != point0).then_some(point)
}
