//! Circle centre and radius dragging
//!
//! A circle with a constant ground radius renders as an ellipse on a Mercator map, and its
//! pixel centre is not the projection of its geographic centre. The ellipse is computed
//! from the projection, so a dragged outline point cannot be turned back into a radius in
//! closed form. Instead the radius is found with a secant search on the signed pixel
//! distance between the dragged point and the outline.

use crate::{LatLng, MapProjection, PolylineIndex, ShapeEvent};
use geo::Coord;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Mean earth radius in meters, as used to turn a ground radius into degrees
pub const EARTH_RADIUS: f64 = 6371000.0;

/// Settings for the derivative-free radius search
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SolverConfig {
    /// The two starting samples of the secant search
    pub initial_guesses: (f64, f64),
    /// Accepted distance from the target, in pixels
    pub tolerance: f64,
    /// Function evaluations after the two initial samples before giving up
    pub max_iterations: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            initial_guesses: (1.0, 2.0),
            tolerance: 0.1,
            max_iterations: 32,
        }
    }
}

/// Find `x` such that `f(x)` is within `config.tolerance` of `target`
///
/// Keeps the two most recent samples and extrapolates linearly between them. Returns
/// `NaN` when a sample is not finite, when `f` stops changing between samples, or when the
/// iteration cap is reached.
pub fn approximate(target: f64, mut f: impl FnMut(f64) -> f64, config: &SolverConfig) -> f64 {
    let (mut x0, mut x1) = config.initial_guesses;
    let mut y0 = f(x0) - target;
    if !y0.is_finite() {
        return f64::NAN;
    }
    if y0.abs() <= config.tolerance {
        return x0;
    }
    let mut y1 = f(x1) - target;

    for iteration in 0..=config.max_iterations {
        if !y1.is_finite() {
            break;
        }
        if y1.abs() <= config.tolerance {
            tracing::trace!(iteration, result = x1, "Secant search converged");
            return x1;
        }
        if y1 == y0 || iteration == config.max_iterations {
            break;
        }

        let x2 = x1 - y1 * (x1 - x0) / (y1 - y0);
        if !x2.is_finite() {
            break;
        }
        (x0, y0) = (x1, y1);
        x1 = x2;
        y1 = f(x1) - target;
    }

    tracing::trace!(last = x1, "Secant search did not converge");
    f64::NAN
}

/// Find the radius at which `distance_fn` reaches zero
///
/// `distance_fn` maps a candidate radius to the signed pixel distance between the dragged
/// point and the resulting outline. Returns `NaN` when no radius is found.
pub fn solve_for_radius(distance_fn: impl FnMut(f64) -> f64, config: &SolverConfig) -> f64 {
    approximate(0.0, distance_fn, config)
}

/// A circle as rendered: an axis-aligned ellipse in absolute pixels at the current zoom
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectedCircle {
    pub center: Coord<f64>,
    /// Horizontal half-width in pixels
    pub radius_x: f64,
    /// Vertical half-height in pixels
    pub radius_y: f64,
}

impl ProjectedCircle {
    /// Distance from the ellipse centre to its outline in the direction of `offset`
    fn radius_towards(&self, offset: Coord<f64>) -> f64 {
        let (rx, ry) = (self.radius_x, self.radius_y);
        let len = offset.x.hypot(offset.y);
        let denominator = (ry * offset.x).hypot(rx * offset.y);
        if len == 0.0 || denominator == 0.0 {
            return rx.min(ry);
        }
        rx * ry * len / denominator
    }
}

/// Project a circle of `radius` meters around `center` at the view's current zoom
///
/// The vertical half-height spans `radius` meters north and south of the centre. The
/// horizontal half-width spans the same ground distance along the parallel through the
/// pixel centre.
pub fn project_circle<P: MapProjection + ?Sized>(
    view: &P,
    center: LatLng,
    radius: f64,
) -> ProjectedCircle {
    let zoom = view.zoom();
    let d = std::f64::consts::PI / 180.0;
    let (lat, lng) = (center.lat, center.lng);

    let lat_r = (radius / EARTH_RADIUS) / d;
    let top = view.project(LatLng::new(lat + lat_r, lng), zoom);
    let bottom = view.project(LatLng::new(lat - lat_r, lng), zoom);
    let p = (top + bottom) / 2.0;
    let lat2 = view.unproject(p, zoom).lat;

    let mut lng_r = (((lat_r * d).cos() - (lat * d).sin() * (lat2 * d).sin())
        / ((lat * d).cos() * (lat2 * d).cos()))
    .acos()
        / d;
    if lng_r.is_nan() || lng_r == 0.0 {
        // acos loses precision for tiny radii
        lng_r = lat_r / (lat * d).cos();
    }

    let radius_x = if lng_r.is_nan() {
        0.0
    } else {
        p.x - view.project(LatLng::new(lat2, lng - lng_r), zoom).x
    };

    ProjectedCircle {
        center: p,
        radius_x,
        radius_y: p.y - top.y,
    }
}

/// The four extreme points of a rendered circle
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CircleCorners {
    pub top: LatLng,
    pub right: LatLng,
    pub bottom: LatLng,
    pub left: LatLng,
}

impl CircleCorners {
    fn from_ellipse<P: MapProjection + ?Sized>(
        view: &P,
        center: Coord<f64>,
        radius_x: f64,
        radius_y: f64,
    ) -> Self {
        let zoom = view.zoom();
        let at = |dx: f64, dy: f64| view.unproject(center + Coord { x: dx, y: dy }, zoom);
        Self {
            top: at(0.0, -radius_y),
            right: at(radius_x, 0.0),
            bottom: at(0.0, radius_y),
            left: at(-radius_x, 0.0),
        }
    }

    pub fn to_array(self) -> [LatLng; 4] {
        [self.top, self.right, self.bottom, self.left]
    }
}

/// The top, right, bottom and left outline points of a circle of `radius` meters
pub fn circle_corners<P: MapProjection + ?Sized>(
    view: &P,
    center: LatLng,
    radius: f64,
) -> CircleCorners {
    let ellipse = project_circle(view, center, radius);
    CircleCorners::from_ellipse(view, ellipse.center, ellipse.radius_x, ellipse.radius_y)
}

/// Signed pixel distance from `point` to the outline of a circle of `radius` meters
///
/// Measured along the ray from the ellipse centre through `point`: positive outside,
/// negative inside.
pub fn distance_to_circle<P: MapProjection + ?Sized>(
    view: &P,
    center: LatLng,
    radius: f64,
    point: LatLng,
) -> f64 {
    let ellipse = project_circle(view, center, radius);
    let offset = view.project(point, view.zoom()) - ellipse.center;
    offset.x.hypot(offset.y) - ellipse.radius_towards(offset)
}

/// A circle with a ground radius in meters
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CircleLayer {
    center: LatLng,
    /// Radius in meters
    radius: f64,
    #[cfg_attr(feature = "serde", serde(skip))]
    events: Vec<ShapeEvent>,
}

impl CircleLayer {
    pub fn new(center: LatLng, radius: f64) -> Self {
        Self {
            center,
            radius,
            events: Vec::new(),
        }
    }

    #[inline]
    pub fn center(&self) -> LatLng {
        self.center
    }

    #[inline]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn set_center(&mut self, center: LatLng) {
        self.center = center;
        self.events.push(ShapeEvent::SetLatLngs);
    }

    pub fn set_radius(&mut self, radius: f64) {
        self.radius = radius;
        self.events.push(ShapeEvent::SetLatLngs);
    }

    /// Draggable points: the centre followed by the top, right, bottom and left outline points
    pub fn route_points<P: MapProjection + ?Sized>(&self, view: &P) -> Vec<LatLng> {
        let mut points = vec![self.center];
        points.extend(circle_corners(view, self.center, self.radius).to_array());
        points
    }

    /// Move the centre (position 0) or drag the outline through `new_position`
    ///
    /// Returns whether the circle changed. A radius that cannot be solved for leaves the
    /// circle untouched.
    pub fn move_point<P: MapProjection + ?Sized>(
        &mut self,
        view: &P,
        idx: PolylineIndex,
        new_position: LatLng,
        config: &SolverConfig,
    ) -> bool {
        if idx.position() == 0 {
            self.set_center(new_position);
            return true;
        }

        let center = self.center;
        let radius = solve_for_radius(
            |radius| distance_to_circle(view, center, radius, new_position),
            config,
        );
        if radius.is_finite() && radius > 0.0 {
            tracing::debug!(radius, "Solved circle radius");
            self.set_radius(radius);
            true
        } else {
            tracing::warn!(?new_position, "Could not solve circle radius, keeping the old one");
            false
        }
    }

    pub(crate) fn take_events(&mut self) -> Vec<ShapeEvent> {
        std::mem::take(&mut self.events)
    }
}

/// A circle with a fixed pixel radius
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CircleMarkerLayer {
    center: LatLng,
    /// Radius in pixels
    radius: f64,
    #[cfg_attr(feature = "serde", serde(skip))]
    events: Vec<ShapeEvent>,
}

impl CircleMarkerLayer {
    pub fn new(center: LatLng, radius: f64) -> Self {
        Self {
            center,
            radius,
            events: Vec::new(),
        }
    }

    #[inline]
    pub fn center(&self) -> LatLng {
        self.center
    }

    #[inline]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Draggable points: the centre followed by the top, right, bottom and left outline points
    pub fn route_points<P: MapProjection + ?Sized>(&self, view: &P) -> Vec<LatLng> {
        let center = view.project(self.center, view.zoom());
        let mut points = vec![self.center];
        points.extend(CircleCorners::from_ellipse(view, center, self.radius, self.radius).to_array());
        points
    }

    /// Move the centre (position 0) or set the radius to reach `new_position`
    pub fn move_point<P: MapProjection + ?Sized>(
        &mut self,
        view: &P,
        idx: PolylineIndex,
        new_position: LatLng,
    ) {
        if idx.position() == 0 {
            self.center = new_position;
        } else {
            let zoom = view.zoom();
            let offset = view.project(new_position, zoom) - view.project(self.center, zoom);
            self.radius = offset.x.hypot(offset.y);
        }
        self.events.push(ShapeEvent::SetLatLngs);
    }

    pub(crate) fn take_events(&mut self) -> Vec<ShapeEvent> {
        std::mem::take(&mut self.events)
    }
}
