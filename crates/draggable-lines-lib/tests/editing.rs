//! End-to-end editing flows across the locator, index arithmetic and shape adapters

use draggable_lines_lib::{
    DraggableShape, Geometry, LatLng, LineLayer, PolylineIndex, PolylineLayer, RectangleLayer,
    RouteTarget, ShapeEvent, SolverConfig, TrackPosition, WebMercatorView, get_insert_position,
    get_route_insert_position, insert_at, read_at, remove_at, update_at,
};

fn view() -> WebMercatorView {
    WebMercatorView::new(13.0).with_max_zoom(18.0)
}

fn line(lngs: &[f64]) -> Vec<LatLng> {
    lngs.iter().map(|lng| LatLng::new(45.0, *lng)).collect()
}

#[test]
fn test_insert_and_remove_are_inverse() {
    let original = Geometry::Flat(vec!['a', 'b', 'c']);
    for i in 0..=3 {
        let inserted = insert_at(&original, 'x', PolylineIndex::Flat(i));
        assert_eq!(*read_at(&inserted, PolylineIndex::Flat(i)), 'x');
        assert_eq!(remove_at(&inserted, PolylineIndex::Flat(i)), original);
    }

    let nested = Geometry::Nested(vec![vec!["a", "b"], vec!["c", "d"]]);
    let updated = update_at(&nested, "x", PolylineIndex::Nested(1, 0));
    assert_eq!(updated, Geometry::Nested(vec![vec!["a", "b"], vec!["x", "d"]]));
    assert_eq!(
        nested,
        Geometry::Nested(vec![vec!["a", "b"], vec!["c", "d"]]),
        "input is left untouched"
    );
}

#[test]
fn test_drag_new_vertex_out_of_a_line() {
    let view = view();
    let mut shape: DraggableShape =
        PolylineLayer::polyline(Geometry::Flat(line(&[0.0, 1.0, 2.0]))).into();

    let hovered = LatLng::new(45.0, 1.5);
    let geometry = shape.route_points(&view);
    let idx = get_insert_position(&view, &geometry, hovered, true, false).unwrap();
    assert_eq!(idx, PolylineIndex::Flat(2));

    shape.insert_route_point(idx, hovered).unwrap();
    let dragged = LatLng::new(45.3, 1.6);
    shape
        .move_route_point(&view, idx, dragged, &SolverConfig::default())
        .unwrap();

    assert_eq!(
        shape.route_points(&view),
        Geometry::Flat(vec![
            LatLng::new(45.0, 0.0),
            LatLng::new(45.0, 1.0),
            dragged,
            LatLng::new(45.0, 2.0),
        ])
    );
    assert_eq!(
        shape.take_events(),
        vec![ShapeEvent::SetLatLngs, ShapeEvent::SetLatLngs]
    );
}

#[test]
fn test_routed_line_edits_route_points_only() {
    let view = view();
    let track = line(&[0.0, 0.25, 0.5, 0.75, 1.0, 1.25, 1.5, 1.75, 2.0]);
    let route = line(&[0.0, 1.0, 2.0]);
    let mut layer = PolylineLayer::polyline(Geometry::Flat(track.clone()))
        .with_route_points(Geometry::Flat(route.clone()));

    let hovered = LatLng::new(45.0, 1.6);
    let slot = get_route_insert_position(
        &view,
        RouteTarget::Points(&route),
        &track,
        TrackPosition::Point(hovered),
    )
    .unwrap();
    assert_eq!(slot, 2);

    let mut shape = DraggableShape::from(layer.clone());
    shape
        .insert_route_point(PolylineIndex::Flat(slot), hovered)
        .unwrap();
    assert_eq!(shape.take_events(), vec![ShapeEvent::SetRoutePoints]);

    let Some(edited) = shape.as_line() else {
        panic!("still a line");
    };
    assert_eq!(edited.lat_lngs(), &Geometry::Flat(track));
    assert_eq!(edited.route_points().map(Geometry::len), Some(4));

    // The host re-routes and replaces the track
    layer.set_lat_lngs(Geometry::Flat(line(&[0.0, 1.0, 1.6, 2.0])));
    assert_eq!(layer.lat_lngs().len(), 4);
}

#[test]
fn test_rectangle_drag_through_degenerate_state() {
    let view = view();
    let solver = SolverConfig::default();
    let mut shape: DraggableShape =
        RectangleLayer::new(LatLng::new(0.0, 0.0), LatLng::new(1.0, 1.0)).into();

    // Collapse to zero width, then pull out the other side
    shape
        .move_route_point(&view, PolylineIndex::Flat(2), LatLng::new(1.0, 0.0), &solver)
        .unwrap();
    shape
        .move_route_point(&view, PolylineIndex::Flat(2), LatLng::new(1.0, -1.0), &solver)
        .unwrap();

    let Geometry::Flat(corners) = shape.route_points(&view) else {
        panic!("rectangle corners are flat");
    };
    assert_eq!(corners[2], LatLng::new(1.0, -1.0));
    for i in 0..4 {
        let (a, b) = (corners[i], corners[(i + 1) % 4]);
        assert!(a.lat == b.lat || a.lng == b.lng, "{corners:?}");
    }
}
