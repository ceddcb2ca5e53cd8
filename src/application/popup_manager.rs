// Hover popup lifecycle - one popup instance shared by every marker of a map
use serde::Serialize;

use crate::application::map_surface::MapSurface;
use crate::domain::marker::LatLon;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "marker", rename_all = "lowercase")]
pub enum PopupState {
    Hidden,
    Shown(String),
}

/// What the popup needs to know about a hovered marker.
#[derive(Debug, Clone, PartialEq)]
pub struct HoverTarget {
    pub id: String,
    pub position: LatLon,
    pub html: String,
}

pub struct PopupManager<P> {
    popup: Option<P>,
    state: PopupState,
}

impl<P> Default for PopupManager<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> PopupManager<P> {
    pub fn new() -> Self {
        Self {
            popup: None,
            state: PopupState::Hidden,
        }
    }

    pub fn state(&self) -> &PopupState {
        &self.state
    }

    /// Shows the popup at `target`. Entering another marker while shown
    /// repositions and recontents the same popup in place.
    pub fn pointer_enter<S>(&mut self, surface: &mut S, target: &HoverTarget)
    where
        S: MapSurface<PopupHandle = P>,
    {
        let popup = self.popup.get_or_insert_with(|| surface.create_popup());
        surface.set_popup(popup, target.position, &target.html);
        if self.state == PopupState::Hidden {
            surface.attach_popup(popup);
        }

        tracing::debug!("Popup shown for marker {}", target.id);
        self.state = PopupState::Shown(target.id.clone());
    }

    /// Hides the popup if `marker_id` is the one currently shown; a stale
    /// leave from a previously hovered marker is ignored.
    pub fn pointer_leave<S>(&mut self, surface: &mut S, marker_id: &str)
    where
        S: MapSurface<PopupHandle = P>,
    {
        let PopupState::Shown(shown) = &self.state else {
            return;
        };
        if shown != marker_id {
            return;
        }

        if let Some(popup) = &self.popup {
            surface.detach_popup(popup);
        }
        tracing::debug!("Popup hidden for marker {}", marker_id);
        self.state = PopupState::Hidden;
    }

    /// Hides the popup regardless of which marker it belongs to.
    pub fn hide<S>(&mut self, surface: &mut S)
    where
        S: MapSurface<PopupHandle = P>,
    {
        if let PopupState::Shown(shown) = self.state.clone() {
            self.pointer_leave(surface, &shown);
        }
    }
}
