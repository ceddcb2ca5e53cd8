// Port to the map-rendering collaborator
use crate::domain::marker::{LatLon, Marker};

/// Operations the map views need from a map renderer.
///
/// Handles are opaque to the core; it keeps them only to detach or update
/// what it previously added.
pub trait MapSurface {
    type MarkerHandle;
    type PopupHandle;

    fn add_marker(&mut self, marker: &Marker) -> Self::MarkerHandle;

    fn remove_marker(&mut self, handle: &Self::MarkerHandle);

    fn create_popup(&mut self) -> Self::PopupHandle;

    /// Moves the popup and replaces its content.
    fn set_popup(&mut self, popup: &Self::PopupHandle, position: LatLon, html: &str);

    fn attach_popup(&mut self, popup: &Self::PopupHandle);

    fn detach_popup(&mut self, popup: &Self::PopupHandle);
}
