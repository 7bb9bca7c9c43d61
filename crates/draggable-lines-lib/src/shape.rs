//! Shape adapters and per-kind mutation dispatch
//!
//! Lines write through [`LineLayer`] accessors, targeting the route points when the shape
//! has them and the displayed vertices otherwise. Rectangles and circles have a fixed set
//! of constrained control points and only support moving them.

use crate::{
    CircleLayer, CircleMarkerLayer, DraggableLinesError, Geometry, LatLng, MapProjection,
    PolylineIndex, RectangleLayer, Result, SolverConfig, insert_at, remove_at, update_at,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Stroke weight in pixels for shapes that do not carry their own
pub const DEFAULT_WEIGHT: f64 = 3.0;

/// The kind of a draggable shape and its capabilities
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ShapeKind {
    Polyline,
    Polygon,
    Rectangle,
    Circle,
    CircleMarker,
}

impl ShapeKind {
    /// Whether the outline closes from the last vertex back to the first
    #[inline]
    pub fn is_ring(self) -> bool {
        matches!(self, Self::Polygon | Self::Rectangle)
    }

    /// Whether new points can be inserted along the outline
    #[inline]
    pub fn has_insert(self) -> bool {
        matches!(self, Self::Polyline | Self::Polygon)
    }

    #[inline]
    pub fn has_remove(self) -> bool {
        matches!(self, Self::Polyline | Self::Polygon)
    }

    /// Fewest control points a part may be left with
    pub fn min_route_points(self) -> usize {
        match self {
            Self::Polyline => 2,
            Self::Polygon => 3,
            Self::Rectangle => 4,
            Self::Circle | Self::CircleMarker => 5,
        }
    }
}

/// Change notifications for the host, drained with `take_events`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShapeEvent {
    /// The displayed vertices changed
    SetLatLngs,
    /// The route points changed; the host is expected to re-route the track
    SetRoutePoints,
}

/// Accessors a host line shape provides
pub trait LineLayer {
    /// Displayed vertices (track points)
    fn lat_lngs(&self) -> &Geometry<LatLng>;

    fn set_lat_lngs(&mut self, lat_lngs: Geometry<LatLng>);

    /// Sparse control points the track is derived from, if any
    fn route_points(&self) -> Option<&Geometry<LatLng>>;

    fn set_route_points(&mut self, route_points: Geometry<LatLng>);
}

/// Insert `point` at `idx`, or replace the point there when `insert` is unset
///
/// Writes to the route points when the layer has them, else to the displayed vertices.
///
/// # Panics
/// If `idx` is out of range or its nesting does not match the target geometry.
pub fn set_point<L: LineLayer + ?Sized>(layer: &mut L, point: LatLng, idx: PolylineIndex, insert: bool) {
    let apply = |geometry: &Geometry<LatLng>| {
        if insert {
            insert_at(geometry, point, idx)
        } else {
            update_at(geometry, point, idx)
        }
    };

    if let Some(route_points) = layer.route_points() {
        let updated = apply(route_points);
        layer.set_route_points(updated);
    } else {
        let updated = apply(layer.lat_lngs());
        layer.set_lat_lngs(updated);
    }
    tracing::debug!(?idx, insert, "Set point");
}

/// Remove the point at `idx` from the route points, or the displayed vertices
///
/// Callers check the minimum point count beforehand.
///
/// # Panics
/// If `idx` is out of range or its nesting does not match the target geometry.
pub fn remove_point<L: LineLayer + ?Sized>(layer: &mut L, idx: PolylineIndex) {
    if let Some(route_points) = layer.route_points() {
        let updated = remove_at(route_points, idx);
        layer.set_route_points(updated);
    } else {
        let updated = remove_at(layer.lat_lngs(), idx);
        layer.set_lat_lngs(updated);
    }
    tracing::debug!(?idx, "Removed point");
}

/// A polyline or polygon with optional route points
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PolylineLayer {
    lat_lngs: Geometry<LatLng>,
    route_points: Option<Geometry<LatLng>>,
    /// Polygons close each part into a ring
    ring: bool,
    /// Stroke weight in pixels
    weight: f64,
    #[cfg_attr(feature = "serde", serde(skip))]
    events: Vec<ShapeEvent>,
}

impl PolylineLayer {
    pub fn polyline(lat_lngs: Geometry<LatLng>) -> Self {
        Self {
            lat_lngs,
            route_points: None,
            ring: false,
            weight: DEFAULT_WEIGHT,
            events: Vec::new(),
        }
    }

    pub fn polygon(lat_lngs: Geometry<LatLng>) -> Self {
        Self {
            ring: true,
            ..Self::polyline(lat_lngs)
        }
    }

    pub fn with_route_points(mut self, route_points: Geometry<LatLng>) -> Self {
        self.route_points = Some(route_points);
        self
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    #[inline]
    pub fn kind(&self) -> ShapeKind {
        if self.ring {
            ShapeKind::Polygon
        } else {
            ShapeKind::Polyline
        }
    }

    #[inline]
    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub(crate) fn take_events(&mut self) -> Vec<ShapeEvent> {
        std::mem::take(&mut self.events)
    }
}

impl LineLayer for PolylineLayer {
    fn lat_lngs(&self) -> &Geometry<LatLng> {
        &self.lat_lngs
    }

    fn set_lat_lngs(&mut self, lat_lngs: Geometry<LatLng>) {
        self.lat_lngs = lat_lngs;
        self.events.push(ShapeEvent::SetLatLngs);
    }

    fn route_points(&self) -> Option<&Geometry<LatLng>> {
        self.route_points.as_ref()
    }

    fn set_route_points(&mut self, route_points: Geometry<LatLng>) {
        self.route_points = Some(route_points);
        self.events.push(ShapeEvent::SetRoutePoints);
    }
}

/// A shape the engine can edit, dispatched by kind
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DraggableShape {
    Line(PolylineLayer),
    Rectangle(RectangleLayer),
    Circle(CircleLayer),
    CircleMarker(CircleMarkerLayer),
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl DraggableShape {
    pub fn kind(&self) -> ShapeKind {
        match self {
            Self::Line(line) => line.kind(),
            Self::Rectangle(_) => ShapeKind::Rectangle,
            Self::Circle(_) => ShapeKind::Circle,
            Self::CircleMarker(_) => ShapeKind::CircleMarker,
        }
    }

    pub fn weight(&self) -> f64 {
        match self {
            Self::Line(line) => line.weight(),
            _ => DEFAULT_WEIGHT,
        }
    }

    pub fn as_line(&self) -> Option<&PolylineLayer> {
        match self {
            Self::Line(line) => Some(line),
            _ => None,
        }
    }

    pub fn as_line_mut(&mut self) -> Option<&mut PolylineLayer> {
        match self {
            Self::Line(line) => Some(line),
            _ => None,
        }
    }

    /// Whether edits target route points rather than the displayed vertices
    pub fn has_route_points(&self) -> bool {
        self.as_line()
            .is_some_and(|line| line.route_points().is_some())
    }

    /// The draggable control points
    ///
    /// Lines return their route points or vertices. Rectangles return their 4 corners in
    /// slot order. Circles return the centre followed by the top, right, bottom and left
    /// outline points at the view's current zoom.
    pub fn route_points<P: MapProjection + ?Sized>(&self, view: &P) -> Geometry<LatLng> {
        match self {
            Self::Line(line) => line
                .route_points()
                .unwrap_or_else(|| line.lat_lngs())
                .clone(),
            Self::Rectangle(rectangle) => Geometry::Flat(rectangle.corners().to_vec()),
            Self::Circle(circle) => Geometry::Flat(circle.route_points(view)),
            Self::CircleMarker(marker) => Geometry::Flat(marker.route_points(view)),
        }
    }

    /// Insert a new control point at `idx`
    ///
    /// # Errors
    /// [`DraggableLinesError::UnsupportedOperation`] for shapes without insertion.
    pub fn insert_route_point(&mut self, idx: PolylineIndex, point: LatLng) -> Result<()> {
        match self {
            Self::Line(line) => {
                set_point(line, point, idx, true);
                Ok(())
            }
            _ => Err(self.unsupported("insert")),
        }
    }

    /// Move the control point at `idx` to `point`
    ///
    /// A circle radius that cannot be solved for leaves the circle unchanged and still
    /// returns `Ok`.
    ///
    /// # Errors
    /// [`DraggableLinesError::InvalidCorner`] for a rectangle slot outside `0..4`.
    pub fn move_route_point<P: MapProjection + ?Sized>(
        &mut self,
        view: &P,
        idx: PolylineIndex,
        point: LatLng,
        solver: &SolverConfig,
    ) -> Result<()> {
        match self {
            Self::Line(line) => set_point(line, point, idx, false),
            Self::Rectangle(rectangle) => rectangle.move_corner(idx, point)?,
            Self::Circle(circle) => {
                circle.move_point(view, idx, point, solver);
            }
            Self::CircleMarker(marker) => marker.move_point(view, idx, point),
        }
        Ok(())
    }

    /// Remove the control point at `idx`
    ///
    /// # Errors
    /// [`DraggableLinesError::UnsupportedOperation`] for shapes with a fixed point count.
    pub fn remove_route_point(&mut self, idx: PolylineIndex) -> Result<()> {
        match self {
            Self::Line(line) => {
                remove_point(line, idx);
                Ok(())
            }
            _ => Err(self.unsupported("remove")),
        }
    }

    /// Drain the change notifications recorded since the last call
    pub fn take_events(&mut self) -> Vec<ShapeEvent> {
        match self {
            Self::Line(line) => line.take_events(),
            Self::Rectangle(rectangle) => rectangle.take_events(),
            Self::Circle(circle) => circle.take_events(),
            Self::CircleMarker(marker) => marker.take_events(),
        }
    }

    fn unsupported(&self, operation: &'static str) -> DraggableLinesError {
        DraggableLinesError::UnsupportedOperation {
            kind: self.kind(),
            operation,
        }
    }
}

impl From<PolylineLayer> for DraggableShape {
    fn from(line: PolylineLayer) -> Self {
        Self::Line(line)
    }
}

impl From<RectangleLayer> for DraggableShape {
    fn from(rectangle: RectangleLayer) -> Self {
        Self::Rectangle(rectangle)
    }
}

impl From<CircleLayer> for DraggableShape {
    fn from(circle: CircleLayer) -> Self {
        Self::Circle(circle)
    }
}

impl From<CircleMarkerLayer> for DraggableShape {
    fn from(marker: CircleMarkerLayer) -> Self {
        Self::CircleMarker(marker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::WebMercatorView;

    fn points(lngs: &[f64]) -> Vec<LatLng> {
        lngs.iter().map(|lng| LatLng::new(0.0, *lng)).collect()
    }

    #[test]
    fn test_capabilities() {
        assert!(ShapeKind::Polygon.is_ring());
        assert!(!ShapeKind::Polyline.is_ring());
        assert!(ShapeKind::Polyline.has_insert());
        assert!(!ShapeKind::Circle.has_insert());
        assert!(!ShapeKind::Rectangle.has_remove());
        assert_eq!(ShapeKind::Polyline.min_route_points(), 2);
        assert_eq!(ShapeKind::Polygon.min_route_points(), 3);
    }

    #[test]
    fn test_set_point_without_route_points_edits_vertices() {
        let mut line = PolylineLayer::polyline(Geometry::Flat(points(&[0.0, 1.0])));
        set_point(&mut line, LatLng::new(0.0, 0.5), PolylineIndex::Flat(1), true);
        assert_eq!(line.lat_lngs(), &Geometry::Flat(points(&[0.0, 0.5, 1.0])));

        set_point(&mut line, LatLng::new(1.0, 1.0), PolylineIndex::Flat(2), false);
        assert_eq!(
            line.lat_lngs(),
            &Geometry::Flat(vec![
                LatLng::new(0.0, 0.0),
                LatLng::new(0.0, 0.5),
                LatLng::new(1.0, 1.0)
            ])
        );
        assert_eq!(
            line.take_events(),
            vec![ShapeEvent::SetLatLngs, ShapeEvent::SetLatLngs]
        );
    }

    #[test]
    fn test_set_point_with_route_points_leaves_track_alone() {
        let track = Geometry::Flat(points(&[0.0, 0.5, 1.0, 1.5, 2.0]));
        let mut line = PolylineLayer::polyline(track.clone())
            .with_route_points(Geometry::Flat(points(&[0.0, 2.0])));

        set_point(&mut line, LatLng::new(0.1, 1.0), PolylineIndex::Flat(1), true);
        assert_eq!(line.lat_lngs(), &track);
        assert_eq!(
            line.route_points(),
            Some(&Geometry::Flat(vec![
                LatLng::new(0.0, 0.0),
                LatLng::new(0.1, 1.0),
                LatLng::new(0.0, 2.0)
            ]))
        );

        remove_point(&mut line, PolylineIndex::Flat(0));
        assert_eq!(line.route_points().map(Geometry::len), Some(2));
        assert_eq!(
            line.take_events(),
            vec![ShapeEvent::SetRoutePoints, ShapeEvent::SetRoutePoints]
        );
    }

    #[test]
    fn test_nested_remove() {
        let mut polygon = PolylineLayer::polygon(Geometry::Nested(vec![
            points(&[0.0, 1.0, 2.0, 3.0]),
            points(&[5.0, 6.0, 7.0]),
        ]));
        remove_point(&mut polygon, PolylineIndex::Nested(0, 3));
        assert_eq!(
            polygon.lat_lngs(),
            &Geometry::Nested(vec![points(&[0.0, 1.0, 2.0]), points(&[5.0, 6.0, 7.0])])
        );
    }

    #[test]
    fn test_rectangle_and_circle_reject_insert_and_remove() {
        let mut rectangle: DraggableShape =
            RectangleLayer::new(LatLng::new(0.0, 0.0), LatLng::new(1.0, 1.0)).into();
        assert_eq!(
            rectangle.insert_route_point(PolylineIndex::Flat(1), LatLng::new(0.5, 0.5)),
            Err(DraggableLinesError::UnsupportedOperation {
                kind: ShapeKind::Rectangle,
                operation: "insert"
            })
        );

        let mut circle: DraggableShape = CircleLayer::new(LatLng::new(0.0, 0.0), 100.0).into();
        assert_eq!(
            circle.remove_route_point(PolylineIndex::Flat(1)),
            Err(DraggableLinesError::UnsupportedOperation {
                kind: ShapeKind::Circle,
                operation: "remove"
            })
        );
        assert!(circle.take_events().is_empty());
    }

    #[test]
    fn test_route_points_per_kind() {
        let view = WebMercatorView::new(14.0);

        let rectangle: DraggableShape =
            RectangleLayer::new(LatLng::new(0.0, 0.0), LatLng::new(1.0, 2.0)).into();
        assert_eq!(rectangle.route_points(&view).len(), 4);

        let circle: DraggableShape = CircleLayer::new(LatLng::new(10.0, 10.0), 300.0).into();
        let Geometry::Flat(circle_points) = circle.route_points(&view) else {
            panic!("circle control points are flat");
        };
        assert_eq!(circle_points.len(), 5);
        assert_eq!(circle_points[0], LatLng::new(10.0, 10.0));

        let line: DraggableShape = PolylineLayer::polyline(Geometry::Flat(points(&[0.0, 1.0])))
            .with_route_points(Geometry::Flat(points(&[0.0])))
            .into();
        assert!(line.has_route_points());
        assert_eq!(line.route_points(&view), Geometry::Flat(points(&[0.0])));
    }

    #[test]
    fn test_move_route_point_dispatch() {
        let view = WebMercatorView::new(14.0);
        let solver = SolverConfig::default();

        let mut rectangle: DraggableShape =
            RectangleLayer::new(LatLng::new(0.0, 0.0), LatLng::new(1.0, 2.0)).into();
        rectangle
            .move_route_point(&view, PolylineIndex::Flat(2), LatLng::new(3.0, 3.0), &solver)
            .unwrap();
        assert_eq!(
            rectangle.route_points(&view),
            Geometry::Flat(vec![
                LatLng::new(0.0, 0.0),
                LatLng::new(3.0, 0.0),
                LatLng::new(3.0, 3.0),
                LatLng::new(0.0, 3.0)
            ])
        );
        assert_eq!(
            rectangle.move_route_point(&view, PolylineIndex::Flat(7), LatLng::new(0.0, 0.0), &solver),
            Err(DraggableLinesError::InvalidCorner(7))
        );

        let mut line: DraggableShape =
            PolylineLayer::polyline(Geometry::Flat(points(&[0.0, 1.0]))).into();
        line.move_route_point(&view, PolylineIndex::Flat(0), LatLng::new(1.0, 0.0), &solver)
            .unwrap();
        assert_eq!(line.take_events(), vec![ShapeEvent::SetLatLngs]);
    }
}
