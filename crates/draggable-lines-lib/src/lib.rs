//! Draggable Lines Library - Geometry Indexing and Point Mutation Engine
//!
//! This library provides the algorithmic core behind interactively reshaping lines and
//! shapes drawn on a map: dragging existing vertices, inserting new ones from any point on
//! the outline and removing them again. Rendering, pointer events and marker visuals live in
//! the host; everything here is pure and synchronous.
//!
//! # Architecture
//!
//! - **[`MapProjection`]**: Host-supplied geo <-> pixel conversion ([`WebMercatorView`] bundled)
//! - **[`locate_on_line`]**: Closest point on a (multi-part) line as a [`FractionalIndex`]
//! - **[`sequence`]**: Pure insert/update/remove/read over flat or nested [`Geometry`]
//! - **[`get_route_insert_position`]**: Maps a track position to a sparser route-point slot
//! - **[`DraggableShape`]**: Per-kind mutation rules (lines, rectangles, circles)
//!
//! # Performance Characteristics
//!
//! - **Locate**: O(P×S×Q) with one projection pass (P=parts, S=segments, Q=query points)
//! - **Index arithmetic**: O(N) copy of the addressed part, other parts cloned untouched
//! - **Radius solve**: secant iterations, typically 3-6 evaluations

mod circle;
mod geometry;
mod locate;
mod plus;
mod projection;
mod rectangle;
mod route;
pub mod sequence;
mod shape;

// Public API exports
pub use circle::{
    CircleCorners, CircleLayer, CircleMarkerLayer, ProjectedCircle, SolverConfig, approximate,
    circle_corners, distance_to_circle, project_circle, solve_for_radius,
};
pub use geometry::{FractionalIndex, Geometry, LatLng, PolylineIndex};
pub use locate::{Location, get_insert_position, locate_on_line, locate_point_on_line};
pub use plus::plus_icon_point;
pub use projection::{MapProjection, WebMercatorView};
pub use rectangle::{CornerLabel, RectangleLayer, move_rectangle_corner, rectangle_corner_labels};
pub use route::{
    RoutePointIndexes, RouteTarget, TrackPosition, get_route_insert_position,
    route_point_indexes,
};
pub use sequence::{insert_at, read_at, remove_at, update_at};
pub use shape::{
    DraggableShape, LineLayer, PolylineLayer, ShapeEvent, ShapeKind, remove_point, set_point,
};

/// Error types for geometry operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DraggableLinesError {
    #[error("Degenerate geometry: no part has at least 2 points")]
    DegenerateGeometry,

    #[error("Shape mismatch: {reason}")]
    ShapeMismatch { reason: String },

    #[error("{kind:?} does not support {operation}")]
    UnsupportedOperation {
        kind: ShapeKind,
        operation: &'static str,
    },

    #[error("Invalid corner slot {0}, rectangles have 4 corners")]
    InvalidCorner(usize),
}

pub type Result<T> = std::result::Result<T, DraggableLinesError>;
