//! Events emitted to the host after each interaction step

use crate::LayerId;
use draggable_lines_lib::{LatLng, PolylineIndex};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Progress of a drag on one control point
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DragEvent {
    pub layer: LayerId,
    /// Where the drag started
    pub from: LatLng,
    /// Where the point is now
    pub to: LatLng,
    /// The dragged control point
    pub idx: PolylineIndex,
    /// Whether the drag inserted a new point rather than moving an existing one
    pub is_new: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum HandlerEvent {
    DragStart(DragEvent),
    Drag(DragEvent),
    DragEnd(DragEvent),
    /// A point was inserted by clicking the temporary marker
    Insert {
        layer: LayerId,
        lat_lng: LatLng,
        idx: PolylineIndex,
    },
    /// A point was removed by clicking its marker
    Remove { layer: LayerId, idx: PolylineIndex },
    /// The pointer entered a drag marker
    DragMarkerOver { layer: LayerId, idx: PolylineIndex },
    /// The pointer left a drag marker, or the marker went away under it
    DragMarkerOut { layer: LayerId, idx: PolylineIndex },
}

impl HandlerEvent {
    pub fn layer(&self) -> LayerId {
        match self {
            Self::DragStart(event) | Self::Drag(event) | Self::DragEnd(event) => event.layer,
            Self::Insert { layer, .. }
            | Self::Remove { layer, .. }
            | Self::DragMarkerOver { layer, .. }
            | Self::DragMarkerOut { layer, .. } => *layer,
        }
    }
}
