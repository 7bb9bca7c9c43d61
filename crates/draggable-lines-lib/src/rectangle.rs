//! Rectangle corner dragging
//!
//! A rectangle's corners are mutually constrained: moving one corner drags the latitude of
//! one neighbour and the longitude of the other, so the shape stays axis-aligned in
//! lat/lng space. Dragging a corner past its opposite side swaps which compass corner each
//! slot represents, so labels are recomputed after every move.

use crate::{DraggableLinesError, LatLng, PolylineIndex, Result, ShapeEvent};
use geo::{Coord, Rect};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Compass label of a rectangle corner
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CornerLabel {
    Sw,
    Nw,
    Ne,
    Se,
}

impl CornerLabel {
    /// Labels in slot order for a freshly created rectangle
    pub const DEFAULT_ORDER: [CornerLabel; 4] = [Self::Sw, Self::Nw, Self::Ne, Self::Se];

    fn from_sides(north: bool, east: bool) -> Self {
        match (north, east) {
            (false, false) => Self::Sw,
            (true, false) => Self::Nw,
            (true, true) => Self::Ne,
            (false, true) => Self::Se,
        }
    }

    /// The corner of `bounds` (lng as x, lat as y) carrying this label
    pub fn corner_of(self, bounds: &Rect<f64>) -> LatLng {
        let (min, max) = (bounds.min(), bounds.max());
        match self {
            Self::Sw => LatLng::new(min.y, min.x),
            Self::Nw => LatLng::new(max.y, min.x),
            Self::Ne => LatLng::new(max.y, max.x),
            Self::Se => LatLng::new(min.y, max.x),
        }
    }
}

/// Move corner `slot` to `new_position`, dragging its two neighbours along
///
/// The neighbour sharing the corner's longitude takes the new longitude, the neighbour
/// sharing its latitude takes the new latitude, and the opposite corner stays put.
///
/// # Panics
/// If `slot` is not in `0..4`.
pub fn move_rectangle_corner(corners: [LatLng; 4], slot: usize, new_position: LatLng) -> [LatLng; 4] {
    assert!(slot < 4, "corner slot {slot} out of range, rectangles have 4 corners");

    let prev = (slot + 3) % 4;
    let next = (slot + 1) % 4;
    let (same_lng, same_lat) = if shares_lng(&corners, slot, prev, next) {
        (prev, next)
    } else {
        (next, prev)
    };

    let mut result = corners;
    result[slot] = new_position;
    result[same_lat].lat = new_position.lat;
    result[same_lng].lng = new_position.lng;
    result
}

/// Whether `prev` (rather than `next`) is the neighbour sharing the longitude of `slot`
fn shares_lng(corners: &[LatLng; 4], slot: usize, prev: usize, next: usize) -> bool {
    let cur = corners[slot];
    let (prev, next) = (corners[prev], corners[next]);
    match (prev.lng == cur.lng, next.lng == cur.lng) {
        (true, false) => true,
        (false, true) => false,
        // Zero width or height: decide by which neighbour uniquely shares the latitude
        _ => match (prev.lat == cur.lat, next.lat == cur.lat) {
            (false, true) => true,
            (true, false) => false,
            _ => slot % 2 == 1,
        },
    }
}

/// Compass labels for the corners in slot order
///
/// Adjacent slots alternate between sharing a longitude (west or east side) and sharing a
/// latitude (south or north side). For the default order this returns
/// `[Sw, Nw, Ne, Se]`.
pub fn rectangle_corner_labels(corners: &[LatLng; 4]) -> [CornerLabel; 4] {
    let [c0, c1, c2, _] = *corners;

    // Does the edge between slots 0 and 1 run north-south?
    let first_edge_vertical = if c0.lng == c1.lng && c0.lat != c1.lat {
        true
    } else if c0.lat == c1.lat && c0.lng != c1.lng {
        false
    } else if c1.lat == c2.lat && c1.lng != c2.lng {
        true
    } else if c1.lng == c2.lng && c1.lat != c2.lat {
        false
    } else {
        true
    };

    if first_edge_vertical {
        // Slots 0/1 share a side; 0 and 3 share a latitude, as do 1 and 2
        let c0_north = c0.lat > c1.lat;
        let c0_east = c0.lng > c2.lng;
        [
            CornerLabel::from_sides(c0_north, c0_east),
            CornerLabel::from_sides(!c0_north, c0_east),
            CornerLabel::from_sides(!c0_north, !c0_east),
            CornerLabel::from_sides(c0_north, !c0_east),
        ]
    } else {
        let c0_east = c0.lng > c1.lng;
        let c0_north = c0.lat > c2.lat;
        [
            CornerLabel::from_sides(c0_north, c0_east),
            CornerLabel::from_sides(c0_north, !c0_east),
            CornerLabel::from_sides(!c0_north, !c0_east),
            CornerLabel::from_sides(!c0_north, c0_east),
        ]
    }
}

/// Bounds spanning all four corners, lng as x and lat as y
fn bounds_of(corners: &[LatLng; 4]) -> Rect<f64> {
    let (mut min, mut max) = (Coord::from(corners[0]), Coord::from(corners[0]));
    for corner in &corners[1..] {
        min.x = min.x.min(corner.lng);
        min.y = min.y.min(corner.lat);
        max.x = max.x.max(corner.lng);
        max.y = max.y.max(corner.lat);
    }
    Rect::new(min, max)
}

/// An axis-aligned rectangle with a remembered corner order
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RectangleLayer {
    /// Bounds with longitude as x and latitude as y
    bounds: Rect<f64>,
    /// Which compass corner each slot currently shows
    order: [CornerLabel; 4],
    #[cfg_attr(feature = "serde", serde(skip))]
    events: Vec<ShapeEvent>,
}

impl RectangleLayer {
    /// Create a rectangle from two opposite corners
    pub fn new(a: LatLng, b: LatLng) -> Self {
        Self {
            bounds: Rect::new(Coord::from(a), Coord::from(b)),
            order: CornerLabel::DEFAULT_ORDER,
            events: Vec::new(),
        }
    }

    #[inline]
    pub fn bounds(&self) -> Rect<f64> {
        self.bounds
    }

    #[inline]
    pub fn corner_order(&self) -> [CornerLabel; 4] {
        self.order
    }

    /// Replace the bounds, resetting the corner order
    pub fn set_bounds(&mut self, a: LatLng, b: LatLng) {
        self.bounds = Rect::new(Coord::from(a), Coord::from(b));
        self.order = CornerLabel::DEFAULT_ORDER;
        self.events.push(ShapeEvent::SetLatLngs);
    }

    /// The four corners in slot order
    pub fn corners(&self) -> [LatLng; 4] {
        self.order.map(|label| label.corner_of(&self.bounds))
    }

    /// Drag the corner addressed by `idx`; nested indexes use their innermost component
    ///
    /// # Errors
    /// [`DraggableLinesError::InvalidCorner`] when the position is not in `0..4`.
    pub fn move_corner(&mut self, idx: PolylineIndex, new_position: LatLng) -> Result<()> {
        let slot = idx.position();
        if slot >= 4 {
            return Err(DraggableLinesError::InvalidCorner(slot));
        }

        let corners = move_rectangle_corner(self.corners(), slot, new_position);
        self.bounds = bounds_of(&corners);
        self.order = rectangle_corner_labels(&corners);
        tracing::debug!(slot, order = ?self.order, "Moved rectangle corner");
        self.events.push(ShapeEvent::SetLatLngs);
        Ok(())
    }

    pub(crate) fn take_events(&mut self) -> Vec<ShapeEvent> {
        std::mem::take(&mut self.events)
    }
}
