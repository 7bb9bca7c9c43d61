//! Handler configuration

use draggable_lines_lib::SolverConfig;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for the interaction handler
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HandlerConfig {
    /// Allow moving the ends of open lines and show "plus" markers past them.
    /// When unset, insertions never land before the first or after the last vertex.
    /// Default: true
    pub allow_extending_line: bool,
    /// Remove a control point when its marker is clicked, as long as the part keeps its
    /// minimum number of points.
    /// Default: true
    pub remove_on_click: bool,
    /// Gap in pixels between a line end and its plus marker, on top of half the stroke
    /// weight. Default: 24.0
    pub plus_marker_distance: f64,
    /// Extra pixels around half the stroke weight within which hovering shows the temporary
    /// marker. Default: 1.0
    pub hover_slop: f64,
    /// Radius search settings for circle outline drags
    pub solver: SolverConfig,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            allow_extending_line: true,
            remove_on_click: true,
            plus_marker_distance: 24.0,
            hover_slop: 1.0,
            solver: SolverConfig::default(),
        }
    }
}
