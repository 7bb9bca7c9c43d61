//! Draggable Lines - Interaction Handler for Map Shape Editing
//!
//! Keeps per-shape interaction state in a side table and turns pointer interaction
//! reported by the host into edits through the `draggable-lines-lib` engine.
//!
//! # Architecture
//!
//! - **[`DraggableLines`]**: Side table from [`LayerId`] to [`LayerState`], enabled and
//!   disabled per layer by the host
//! - **[`MarkerLayout`]**: Drag markers on control points, plus markers past line ends
//! - **Hover**: Resolves the temporary marker on an outline and its insertion slot
//! - **Drag session**: `drag_start` -> `drag`* -> `drag_end`, emitting [`HandlerEvent`]s
//!
//! Marker layouts computed while the host reports an active drag are held back and
//! published once it reports the drag finished.

mod config;
mod events;
mod handler;
mod markers;
mod session;

// Public API exports
pub use config::HandlerConfig;
pub use events::{DragEvent, HandlerEvent};
pub use handler::{DraggableLines, LayerFilter, LayerState};
pub use markers::{
    DragMarker, MarkerLayout, MarkerRole, PlusMarker, TempMarkerPoint, drag_markers, plus_markers,
};
pub use session::DragSource;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Host-assigned identity of a shape
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LayerId(pub u64);

impl std::fmt::Display for LayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Error types for interaction handling
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HandlerError {
    #[error(transparent)]
    Geometry(#[from] draggable_lines_lib::DraggableLinesError),

    #[error("Layer {0} is not enabled")]
    UnknownLayer(LayerId),

    #[error("No drag in progress")]
    NoActiveDrag,

    #[error("Layer {layer} has no marker {marker}")]
    UnknownMarker { layer: LayerId, marker: usize },

    #[error("Nothing is hovered on layer {0}")]
    NoTempMarker(LayerId),
}

pub type Result<T> = std::result::Result<T, HandlerError>;
