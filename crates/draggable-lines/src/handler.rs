//! DraggableLines - side table of per-layer interaction state
//!
//! The host owns the shapes and passes them in on every call; this module owns everything
//! else an editing session needs: marker layouts, the hovered temporary marker, cached
//! route point positions and the drag in progress.

use crate::session::DragSession;
use crate::{
    DragSource, HandlerConfig, HandlerError, HandlerEvent, LayerId, MarkerLayout, Result,
    TempMarkerPoint,
};
use crate::{DragMarker, PlusMarker};
use draggable_lines_lib::{
    DraggableLinesError, DraggableShape, LatLng, LineLayer, Location, MapProjection,
    PolylineIndex, PolylineLayer, RoutePointIndexes, RouteTarget, TrackPosition,
    get_insert_position, get_route_insert_position, locate_point_on_line, route_point_indexes,
};
use std::collections::HashMap;

/// Interaction state of one enabled layer
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LayerState {
    layout: MarkerLayout,
    /// Layout computed during a drag, published once dragging stops
    pending: Option<MarkerLayout>,
    /// Track positions of the route points; cleared on every shape change
    route_indexes: Option<RoutePointIndexes>,
    temp_marker: Option<TempMarkerPoint>,
    /// Drag marker under the pointer
    hovered_marker: Option<PolylineIndex>,
}

impl LayerState {
    #[inline]
    pub fn drag_markers(&self) -> &[DragMarker] {
        &self.layout.drag_markers
    }

    #[inline]
    pub fn plus_markers(&self) -> &[PlusMarker] {
        &self.layout.plus_markers
    }

    #[inline]
    pub fn layout(&self) -> &MarkerLayout {
        &self.layout
    }

    #[inline]
    pub fn temp_marker(&self) -> Option<TempMarkerPoint> {
        self.temp_marker
    }

    #[inline]
    pub fn hovered_marker(&self) -> Option<PolylineIndex> {
        self.hovered_marker
    }

    #[inline]
    pub fn route_indexes(&self) -> Option<&RoutePointIndexes> {
        self.route_indexes.as_ref()
    }

    /// Whether a redraw is waiting for the host to finish dragging
    #[inline]
    pub fn has_pending_redraw(&self) -> bool {
        self.pending.is_some()
    }

    /// Replace the markers; a hovered drag marker goes away with them
    fn publish(&mut self, id: LayerId, layout: MarkerLayout, events: &mut Vec<HandlerEvent>) {
        self.layout = layout;
        self.pending = None;
        self.temp_marker = None;
        if let Some(idx) = self.hovered_marker.take() {
            events.push(HandlerEvent::DragMarkerOut { layer: id, idx });
        }
    }
}

/// Decides which shapes [`DraggableLines::layer_added`] enables
pub type LayerFilter = Box<dyn Fn(LayerId, &DraggableShape) -> bool>;

/// Interaction handler for draggable map shapes
///
/// Every call names the layer it concerns and, where needed, borrows the host's shape for
/// that layer. Emitted [`HandlerEvent`]s accumulate until [`DraggableLines::take_events`].
pub struct DraggableLines<P: MapProjection> {
    view: P,
    config: HandlerConfig,
    layer_filter: Option<LayerFilter>,
    layers: HashMap<LayerId, LayerState>,
    session: Option<DragSession>,
    /// The host's own drag-active flag
    host_dragging: bool,
    events: Vec<HandlerEvent>,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl<P: MapProjection> DraggableLines<P> {
    pub fn new(view: P, config: HandlerConfig) -> Self {
        Self {
            view,
            config,
            layer_filter: None,
            layers: HashMap::new(),
            session: None,
            host_dragging: false,
            events: Vec::new(),
        }
    }

    /// Only auto-enable shapes accepted by `filter`; without one every shape is enabled
    pub fn with_layer_filter(
        mut self,
        filter: impl Fn(LayerId, &DraggableShape) -> bool + 'static,
    ) -> Self {
        self.layer_filter = Some(Box::new(filter));
        self
    }

    #[inline]
    pub fn view(&self) -> &P {
        &self.view
    }

    /// Replace the view after the map moved or zoomed
    ///
    /// Call [`DraggableLines::zoom_end`] for each layer after a zoom change.
    pub fn set_view(&mut self, view: P) {
        self.view = view;
    }

    #[inline]
    pub fn config(&self) -> &HandlerConfig {
        &self.config
    }

    pub fn layer(&self, id: LayerId) -> Option<&LayerState> {
        self.layers.get(&id)
    }

    pub fn is_enabled(&self, id: LayerId) -> bool {
        self.layers.contains_key(&id)
    }

    /// Whether a drag is in progress, either ours or one the host reported
    #[inline]
    pub fn is_dragging(&self) -> bool {
        self.host_dragging || self.session.is_some()
    }

    /// Start handling a layer and lay out its markers
    ///
    /// Returns `false` if the layer was already enabled.
    pub fn enable_for_layer(&mut self, id: LayerId, shape: &DraggableShape) -> bool {
        if self.layers.contains_key(&id) {
            return false;
        }

        let layout = MarkerLayout::compute(&self.view, shape, &self.config);
        tracing::debug!(
            layer = %id,
            kind = ?shape.kind(),
            drag_markers = layout.drag_markers.len(),
            plus_markers = layout.plus_markers.len(),
            "Enabled layer"
        );
        self.layers.insert(
            id,
            LayerState {
                layout,
                ..LayerState::default()
            },
        );
        true
    }

    /// Stop handling a layer, dropping its markers and any drag on it
    ///
    /// Returns `false` if the layer was not enabled.
    pub fn disable_for_layer(&mut self, id: LayerId) -> bool {
        if self.session.is_some_and(|session| session.layer == id) {
            tracing::warn!(layer = %id, "Layer disabled during a drag, abandoning it");
            self.session = None;
        }

        let Some(state) = self.layers.remove(&id) else {
            return false;
        };
        if let Some(idx) = state.hovered_marker {
            self.events.push(HandlerEvent::DragMarkerOut { layer: id, idx });
        }
        tracing::debug!(layer = %id, "Disabled layer");
        true
    }

    /// The host added a shape to the map: enable it if the layer filter accepts it
    ///
    /// Returns whether the layer was newly enabled.
    pub fn layer_added(&mut self, id: LayerId, shape: &DraggableShape) -> bool {
        if self.layer_filter.as_ref().is_some_and(|filter| !filter(id, shape)) {
            tracing::trace!(layer = %id, "Layer filtered out");
            return false;
        }
        self.enable_for_layer(id, shape)
    }

    /// The host removed a shape from the map
    pub fn layer_removed(&mut self, id: LayerId) -> bool {
        self.disable_for_layer(id)
    }

    /// Recompute and publish the layer's markers
    pub fn redraw(&mut self, id: LayerId, shape: &DraggableShape) -> Result<()> {
        let state = self
            .layers
            .get_mut(&id)
            .ok_or(HandlerError::UnknownLayer(id))?;
        let layout = MarkerLayout::compute(&self.view, shape, &self.config);
        state.publish(id, layout, &mut self.events);
        Ok(())
    }

    /// Refresh a layer after the map zoomed
    ///
    /// Plus marker offsets and circle outline points are in pixels, so they move.
    pub fn zoom_end(&mut self, id: LayerId, shape: &DraggableShape) -> Result<()> {
        let state = self
            .layers
            .get_mut(&id)
            .ok_or(HandlerError::UnknownLayer(id))?;
        state.route_indexes = None;
        self.redraw(id, shape)
    }

    /// Drain the shape's change notifications and update the layer to match
    ///
    /// Call after mutating an enabled shape outside the handler, e.g. when the host
    /// re-routes a track. While a drag is active the new layout is held back.
    pub fn sync(&mut self, id: LayerId, shape: &mut DraggableShape) -> Result<()> {
        let dragging = self.is_dragging();
        let state = self
            .layers
            .get_mut(&id)
            .ok_or(HandlerError::UnknownLayer(id))?;

        let events = shape.take_events();
        if events.is_empty() {
            return Ok(());
        }

        state.route_indexes = None;
        let layout = MarkerLayout::compute(&self.view, shape, &self.config);
        if dragging {
            state.pending = Some(layout);
        } else {
            state.publish(id, layout, &mut self.events);
        }
        tracing::trace!(layer = %id, ?events, deferred = dragging, "Synced layer");
        Ok(())
    }

    /// Report the host's drag-active flag
    ///
    /// Layouts held back during a drag are published once neither the host nor the
    /// handler is dragging.
    pub fn set_host_dragging(&mut self, dragging: bool) {
        self.host_dragging = dragging;
        if self.is_dragging() {
            return;
        }

        for (id, state) in &mut self.layers {
            if let Some(layout) = state.pending.take() {
                tracing::debug!(layer = %id, "Publishing deferred redraw");
                state.publish(*id, layout, &mut self.events);
            }
        }
    }

    /// Resolve the temporary marker for the pointer at `mouse`
    ///
    /// Returns `None` while dragging, for shapes without insertion, and when the pointer
    /// is further than half the stroke weight plus the hover slop from the outline.
    pub fn hover(
        &mut self,
        id: LayerId,
        shape: &DraggableShape,
        mouse: LatLng,
    ) -> Result<Option<TempMarkerPoint>> {
        if !self.layers.contains_key(&id) {
            return Err(HandlerError::UnknownLayer(id));
        }
        if self.is_dragging() {
            return Ok(None);
        }

        let temp_marker = match shape.as_line() {
            Some(line) if shape.kind().has_insert() => self.resolve_temp_marker(id, line, mouse)?,
            _ => None,
        };
        if let Some(state) = self.layers.get_mut(&id) {
            state.temp_marker = temp_marker;
        }
        Ok(temp_marker)
    }

    /// Forget the temporary marker, e.g. when the pointer left the layer
    pub fn hover_out(&mut self, id: LayerId) {
        if self.is_dragging() {
            return;
        }
        if let Some(state) = self.layers.get_mut(&id) {
            state.temp_marker = None;
        }
    }

    /// Report the pointer entering drag marker `marker`
    ///
    /// Ignored while dragging.
    pub fn hover_drag_marker(&mut self, id: LayerId, marker: usize) -> Result<()> {
        let dragging = self.is_dragging();
        let state = self
            .layers
            .get_mut(&id)
            .ok_or(HandlerError::UnknownLayer(id))?;
        let idx = state
            .layout
            .drag_markers
            .get(marker)
            .ok_or(HandlerError::UnknownMarker { layer: id, marker })?
            .idx;
        if dragging || state.hovered_marker == Some(idx) {
            return Ok(());
        }

        if let Some(previous) = state.hovered_marker.replace(idx) {
            self.events.push(HandlerEvent::DragMarkerOut {
                layer: id,
                idx: previous,
            });
        }
        self.events.push(HandlerEvent::DragMarkerOver { layer: id, idx });
        Ok(())
    }

    /// Report the pointer leaving the hovered drag marker
    pub fn hover_out_drag_marker(&mut self, id: LayerId) {
        if self.is_dragging() {
            return;
        }
        if let Some(idx) = self
            .layers
            .get_mut(&id)
            .and_then(|state| state.hovered_marker.take())
        {
            self.events.push(HandlerEvent::DragMarkerOut { layer: id, idx });
        }
    }

    fn resolve_temp_marker(
        &mut self,
        id: LayerId,
        line: &PolylineLayer,
        mouse: LatLng,
    ) -> Result<Option<TempMarkerPoint>> {
        let ring = line.kind().is_ring();
        let Some(location) = abort_on_geometry(
            id,
            locate_point_on_line(&self.view, line.lat_lngs(), mouse, ring),
        )?
        else {
            return Ok(None);
        };

        // Polygons only show the marker over their outline, not their fill
        let offset = self.view.lat_lng_to_container_point(mouse)
            - self.view.lat_lng_to_container_point(location.closest);
        if offset.x.hypot(offset.y) > line.weight() / 2.0 + self.config.hover_slop {
            return Ok(None);
        }

        let idx = match line.route_points() {
            Some(_) => self.route_insert_position(id, line, location)?,
            None => abort_on_geometry(
                id,
                get_insert_position(
                    &self.view,
                    line.lat_lngs(),
                    location.closest,
                    self.config.allow_extending_line,
                    ring,
                ),
            )?,
        };

        Ok(idx.map(|idx| TempMarkerPoint {
            closest: location.closest,
            idx,
        }))
    }

    /// Route point slot for a position on a routed line, through the cached positions
    fn route_insert_position(
        &mut self,
        id: LayerId,
        line: &PolylineLayer,
        location: Location,
    ) -> Result<Option<PolylineIndex>> {
        let Some(route_points) = line.route_points() else {
            return Ok(None);
        };
        let state = self
            .layers
            .get_mut(&id)
            .ok_or(HandlerError::UnknownLayer(id))?;

        if state.route_indexes.is_none() {
            let Some(indexes) = abort_on_geometry(
                id,
                route_point_indexes(&self.view, line.lat_lngs(), route_points),
            )?
            else {
                return Ok(None);
            };
            tracing::trace!(layer = %id, "Cached route point positions");
            state.route_indexes = Some(indexes);
        }

        let Some(indexes) = state
            .route_indexes
            .as_ref()
            .and_then(|cached| cached.for_position(location.idx))
        else {
            return Ok(None);
        };
        let parts = line.lat_lngs().parts();
        let track = parts
            .get(location.idx.part().unwrap_or(0))
            .copied()
            .unwrap_or_default();

        let slot = get_route_insert_position(
            &self.view,
            RouteTarget::Indexes(indexes),
            track,
            TrackPosition::Index(location.idx.position()),
        )?;
        Ok(Some(match location.idx.part() {
            Some(part) => PolylineIndex::Nested(part, slot),
            None => PolylineIndex::Flat(slot),
        }))
    }

    /// Insert a point where the temporary marker is
    ///
    /// Returns the insertion index, or `None` when nothing is hovered.
    pub fn click_temp_marker(
        &mut self,
        id: LayerId,
        shape: &mut DraggableShape,
    ) -> Result<Option<PolylineIndex>> {
        let state = self
            .layers
            .get_mut(&id)
            .ok_or(HandlerError::UnknownLayer(id))?;
        let Some(temp) = state.temp_marker.take() else {
            return Ok(None);
        };

        shape.insert_route_point(temp.idx, temp.closest)?;
        tracing::debug!(layer = %id, idx = ?temp.idx, "Inserted point");
        self.events.push(HandlerEvent::Insert {
            layer: id,
            lat_lng: temp.closest,
            idx: temp.idx,
        });
        self.sync(id, shape)?;
        Ok(Some(temp.idx))
    }

    /// Remove the point under drag marker `marker`, if it is removable
    pub fn click_drag_marker(
        &mut self,
        id: LayerId,
        shape: &mut DraggableShape,
        marker: usize,
    ) -> Result<bool> {
        let state = self.layers.get(&id).ok_or(HandlerError::UnknownLayer(id))?;
        let drag_marker = *state
            .drag_markers()
            .get(marker)
            .ok_or(HandlerError::UnknownMarker { layer: id, marker })?;
        if !drag_marker.removable || self.is_dragging() {
            return Ok(false);
        }

        shape.remove_route_point(drag_marker.idx)?;
        tracing::debug!(layer = %id, idx = ?drag_marker.idx, "Removed point");
        self.events.push(HandlerEvent::Remove {
            layer: id,
            idx: drag_marker.idx,
        });
        self.sync(id, shape)?;
        Ok(true)
    }

    /// Begin dragging a marker
    ///
    /// Temporary and plus markers insert their point first. Returns the index of the
    /// dragged point.
    pub fn drag_start(
        &mut self,
        id: LayerId,
        shape: &mut DraggableShape,
        source: DragSource,
    ) -> Result<PolylineIndex> {
        if let Some(previous) = self.session.take() {
            tracing::warn!(layer = %previous.layer, "New drag started before the previous one ended");
        }

        let state = self
            .layers
            .get_mut(&id)
            .ok_or(HandlerError::UnknownLayer(id))?;
        let unknown = |marker| HandlerError::UnknownMarker { layer: id, marker };
        let (from, idx, is_new) = match source {
            DragSource::DragMarker(i) => {
                let marker = state.layout.drag_markers.get(i).ok_or_else(|| unknown(i))?;
                (marker.position, marker.idx, false)
            }
            DragSource::PlusMarker(i) => {
                let marker = state.layout.plus_markers.get(i).ok_or_else(|| unknown(i))?;
                (marker.position, marker.idx, true)
            }
            DragSource::TempMarker => {
                let temp = state
                    .temp_marker
                    .take()
                    .ok_or(HandlerError::NoTempMarker(id))?;
                (temp.closest, temp.idx, true)
            }
        };

        if is_new {
            shape.insert_route_point(idx, from)?;
        }

        let session = DragSession {
            layer: id,
            from,
            to: from,
            idx,
            is_new,
        };
        self.session = Some(session);
        tracing::debug!(layer = %id, ?idx, is_new, "Drag started");
        self.events.push(HandlerEvent::DragStart(session.event()));
        self.sync(id, shape)?;
        Ok(idx)
    }

    /// Move the dragged point to `to`
    pub fn drag(&mut self, id: LayerId, shape: &mut DraggableShape, to: LatLng) -> Result<()> {
        let session = self
            .session
            .as_mut()
            .filter(|session| session.layer == id)
            .ok_or(HandlerError::NoActiveDrag)?;
        session.to = to;
        let event = session.event();

        shape.move_route_point(&self.view, event.idx, to, &self.config.solver)?;
        tracing::trace!(layer = %id, idx = ?event.idx, ?to, "Drag");
        self.events.push(HandlerEvent::Drag(event));
        self.sync(id, shape)
    }

    /// Finish the drag at `to`
    ///
    /// Markers are redrawn right away unless the host still reports its own drag, in which
    /// case the redraw waits for [`DraggableLines::set_host_dragging`].
    pub fn drag_end(&mut self, id: LayerId, shape: &mut DraggableShape, to: LatLng) -> Result<()> {
        let mut session = match self.session {
            Some(session) if session.layer == id => session,
            _ => return Err(HandlerError::NoActiveDrag),
        };
        self.session = None;
        session.to = to;

        shape.move_route_point(&self.view, session.idx, to, &self.config.solver)?;
        tracing::debug!(layer = %id, idx = ?session.idx, is_new = session.is_new, "Drag ended");
        self.events.push(HandlerEvent::DragEnd(session.event()));

        shape.take_events();
        let state = self
            .layers
            .get_mut(&id)
            .ok_or(HandlerError::UnknownLayer(id))?;
        state.route_indexes = None;
        let layout = MarkerLayout::compute(&self.view, shape, &self.config);
        if self.host_dragging {
            state.pending = Some(layout);
        } else {
            state.publish(id, layout, &mut self.events);
        }
        Ok(())
    }

    /// Drain the events emitted since the last call
    pub fn take_events(&mut self) -> Vec<HandlerEvent> {
        std::mem::take(&mut self.events)
    }
}

/// Turn geometry failures that should quietly abort an edit into `None`
fn abort_on_geometry<T>(
    id: LayerId,
    result: std::result::Result<T, DraggableLinesError>,
) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err @ (DraggableLinesError::DegenerateGeometry | DraggableLinesError::ShapeMismatch { .. })) => {
            tracing::warn!(layer = %id, "Aborting edit: {err}");
            Ok(None)
        }
        Err(err) => Err(err.into()),
    }
}
