//! Drag session state

use crate::{DragEvent, LayerId};
use draggable_lines_lib::{LatLng, PolylineIndex};

/// The marker a drag was started on, addressed by its position in the layer's layout
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DragSource {
    /// An existing control point, index into the drag markers
    DragMarker(usize),
    /// The temporary marker on the outline; inserts a point where it was hovered
    TempMarker,
    /// A line extension marker, index into the plus markers
    PlusMarker(usize),
}

/// A drag in progress: started, possibly moved, not yet ended
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct DragSession {
    pub layer: LayerId,
    pub from: LatLng,
    pub to: LatLng,
    pub idx: PolylineIndex,
    pub is_new: bool,
}

impl DragSession {
    pub fn event(&self) -> DragEvent {
        DragEvent {
            layer: self.layer,
            from: self.from,
            to: self.to,
            idx: self.idx,
            is_new: self.is_new,
        }
    }
}
