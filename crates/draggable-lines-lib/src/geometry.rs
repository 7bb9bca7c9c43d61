//! Point, geometry and index types shared by every module
//!
//! A [`Geometry`] is either a single part (flat sequence) or several parts (nested
//! sequence). Indexes carry the same nesting: a [`PolylineIndex`] addresses a vertex or an
//! insertion slot, a [`FractionalIndex`] addresses a point partway along a segment.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A geographic coordinate in degrees
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// `geo` points store longitude as `x` and latitude as `y`
impl From<geo::Point<f64>> for LatLng {
    fn from(point: geo::Point<f64>) -> Self {
        Self::new(point.y(), point.x())
    }
}

impl From<LatLng> for geo::Point<f64> {
    fn from(lat_lng: LatLng) -> Self {
        geo::Point::new(lat_lng.lng, lat_lng.lat)
    }
}

impl From<LatLng> for geo::Coord<f64> {
    fn from(lat_lng: LatLng) -> Self {
        geo::Coord {
            x: lat_lng.lng,
            y: lat_lng.lat,
        }
    }
}

/// A single-part or multi-part ordered sequence
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Geometry<T> {
    /// One part, e.g. a polyline
    Flat(Vec<T>),
    /// Several parts, e.g. a multi-polyline or a polygon with holes
    Nested(Vec<Vec<T>>),
}

impl<T> Geometry<T> {
    #[inline]
    pub fn is_flat(&self) -> bool {
        matches!(self, Self::Flat(_))
    }

    /// Number of elements at the outermost level
    #[inline]
    pub fn len(&self) -> usize {
        match self {
            Self::Flat(items) => items.len(),
            Self::Nested(parts) => parts.len(),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All parts as slices; a flat geometry has exactly one part
    pub fn parts(&self) -> Vec<&[T]> {
        match self {
            Self::Flat(items) => vec![items.as_slice()],
            Self::Nested(parts) => parts.iter().map(Vec::as_slice).collect(),
        }
    }

    /// The part an index points into
    ///
    /// Returns `None` when the index depth does not match or the part does not exist.
    pub fn part(&self, idx: PolylineIndex) -> Option<&[T]> {
        match (self, idx) {
            (Self::Flat(items), PolylineIndex::Flat(_)) => Some(items.as_slice()),
            (Self::Nested(parts), PolylineIndex::Nested(part, _)) => {
                parts.get(part).map(Vec::as_slice)
            }
            _ => None,
        }
    }

    /// Apply a function to every element, keeping the nesting
    pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> Geometry<U> {
        match self {
            Self::Flat(items) => Geometry::Flat(items.iter().map(&mut f).collect()),
            Self::Nested(parts) => Geometry::Nested(
                parts
                    .iter()
                    .map(|part| part.iter().map(&mut f).collect())
                    .collect(),
            ),
        }
    }

    /// Every element paired with its structural index, in scan order
    pub fn indexed(&self) -> Vec<(PolylineIndex, &T)> {
        match self {
            Self::Flat(items) => items
                .iter()
                .enumerate()
                .map(|(i, item)| (PolylineIndex::Flat(i), item))
                .collect(),
            Self::Nested(parts) => parts
                .iter()
                .enumerate()
                .flat_map(|(i, part)| {
                    part.iter()
                        .enumerate()
                        .map(move |(j, item)| (PolylineIndex::Nested(i, j), item))
                })
                .collect(),
        }
    }
}

/// Structural index into a [`Geometry`]: a position, or a (part, position) pair
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PolylineIndex {
    Flat(usize),
    Nested(usize, usize),
}

impl PolylineIndex {
    /// The innermost component
    #[inline]
    pub fn position(&self) -> usize {
        match *self {
            Self::Flat(position) | Self::Nested(_, position) => position,
        }
    }

    #[inline]
    pub fn part(&self) -> Option<usize> {
        match *self {
            Self::Flat(_) => None,
            Self::Nested(part, _) => Some(part),
        }
    }

    /// Same part, different innermost component
    #[inline]
    pub fn with_position(self, position: usize) -> Self {
        match self {
            Self::Flat(_) => Self::Flat(position),
            Self::Nested(part, _) => Self::Nested(part, position),
        }
    }
}

impl From<usize> for PolylineIndex {
    fn from(position: usize) -> Self {
        Self::Flat(position)
    }
}

impl From<(usize, usize)> for PolylineIndex {
    fn from((part, position): (usize, usize)) -> Self {
        Self::Nested(part, position)
    }
}

/// A [`PolylineIndex`] whose innermost component is `segment + t` with `t` in `[0, 1]`
///
/// The end is closed: a point exactly on a vertex shared by two segments keeps the earlier
/// one, so it reads `segment + 1` and its ceiling is that vertex's index.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FractionalIndex {
    Flat(f64),
    Nested(usize, f64),
}

impl FractionalIndex {
    #[inline]
    pub fn position(&self) -> f64 {
        match *self {
            Self::Flat(position) | Self::Nested(_, position) => position,
        }
    }

    #[inline]
    pub fn part(&self) -> Option<usize> {
        match *self {
            Self::Flat(_) => None,
            Self::Nested(part, _) => Some(part),
        }
    }

    /// Round the innermost component up, giving an insertion slot
    ///
    /// A point exactly on vertex `k` maps to `k`, a point strictly between `k` and `k + 1`
    /// maps to `k + 1`.
    #[inline]
    pub fn ceil(&self) -> PolylineIndex {
        let slot = |position: f64| position.max(0.0).ceil() as usize;
        match *self {
            Self::Flat(position) => PolylineIndex::Flat(slot(position)),
            Self::Nested(part, position) => PolylineIndex::Nested(part, slot(position)),
        }
    }
}
