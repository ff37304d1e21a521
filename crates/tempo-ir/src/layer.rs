use serde::{Deserialize, Serialize};
use tempo_core::TimeWindow;

use crate::element::Element;

/// Unique identifier for a layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayerId(pub String);

impl LayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for LayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A group of elements sharing a time window and a draw priority.
///
/// Element order in the list carries no meaning; draw order comes from each
/// element's `priority`.
#[derive(Debug, Clone, Serialize)]
pub struct Layer {
    pub id: LayerId,
    pub elements: Vec<Element>,
    pub window: TimeWindow,
    /// Multiplied into every element's resolved opacity.
    pub opacity: f64,
    /// Order among sibling layers; higher sits visually above.
    pub z_index: i32,
    pub visible: bool,
}

impl Layer {
    pub fn new(id: LayerId) -> Self {
        Self {
            id,
            elements: Vec::new(),
            window: TimeWindow::always(),
            opacity: 1.0,
            z_index: 0,
            visible: true,
        }
    }

    pub fn with_window(mut self, window: TimeWindow) -> Self {
        self.window = window;
        self
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    pub fn with_element(mut self, element: Element) -> Self {
        self.elements.push(element);
        self
    }

    pub fn add_element(&mut self, element: Element) {
        self.elements.push(element);
    }

    /// Visible and inside `[start, end]`.
    pub fn is_active_at(&self, t: f64) -> bool {
        self.visible && self.window.contains(t)
    }

    /// Elements active at `t`, stably sorted by draw priority.
    pub fn active_elements(&self, t: f64) -> Vec<&Element> {
        let mut active: Vec<&Element> = self
            .elements
            .iter()
            .filter(|e| e.is_active_at(t))
            .collect();
        active.sort_by_key(|e| e.priority);
        active
    }
}
