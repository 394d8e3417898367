//! Elements placed on a slide canvas.

use crate::geometry::is_valid_rect;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Element identifier, unique within one slide.
pub type ElementId = u64;

/// What an element is for on the slide.
///
/// Title and description are "meta" elements: they live on the canvas but
/// never take part in overlap, selection, elevation or snapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementRole {
    #[default]
    Content,
    Title,
    Description,
}

impl ElementRole {
    /// Check if this is a meta role.
    pub fn is_meta(self) -> bool {
        !matches!(self, ElementRole::Content)
    }
}

/// A freely placed rectangular element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub id: ElementId,
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    /// Stacking rank among overlapping elements (`None` = never assigned).
    #[serde(default)]
    pub elevation: Option<u32>,
    /// Stable insertion index used as the stacking tie-break.
    #[serde(default)]
    pub document_order: u32,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub role: ElementRole,
}

impl Element {
    /// Create an unlocked content element with no elevation.
    pub fn new(id: ElementId, left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            id,
            left,
            top,
            width,
            height,
            elevation: None,
            document_order: 0,
            locked: false,
            role: ElementRole::Content,
        }
    }

    /// Builder-style elevation setter.
    pub fn with_elevation(mut self, elevation: u32) -> Self {
        self.elevation = Some(elevation);
        self
    }

    /// Builder-style role setter.
    pub fn with_role(mut self, role: ElementRole) -> Self {
        self.role = role;
        self
    }

    /// Builder-style lock setter.
    pub fn with_locked(mut self, locked: bool) -> Self {
        self.locked = locked;
        self
    }

    /// Bounding rectangle in canvas pixels.
    pub fn rect(&self) -> Rect {
        Rect::new(self.left, self.top, self.left + self.width, self.top + self.height)
    }

    /// Top-left corner.
    pub fn origin(&self) -> Point {
        Point::new(self.left, self.top)
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn is_meta(&self) -> bool {
        self.role.is_meta()
    }

    /// Whether the element may take part in overlap, selection and elevation.
    pub fn is_eligible(&self) -> bool {
        !self.locked && !self.is_meta() && is_valid_rect(self.rect())
    }
}

/// New elevation for one member of an overlap group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElevationAssignment {
    pub id: ElementId,
    pub elevation: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_conversion() {
        let element = Element::new(1, 10.0, 20.0, 30.0, 40.0);
        assert_eq!(element.rect(), Rect::new(10.0, 20.0, 40.0, 60.0));
        assert_eq!(element.right(), 40.0);
        assert_eq!(element.bottom(), 60.0);
    }

    #[test]
    fn test_eligibility() {
        let element = Element::new(1, 0.0, 0.0, 10.0, 10.0);
        assert!(element.is_eligible());
        assert!(!element.with_locked(true).is_eligible());
        assert!(!element.with_role(ElementRole::Title).is_eligible());
        assert!(!element.with_role(ElementRole::Description).is_eligible());
        assert!(!Element::new(2, 0.0, 0.0, 0.0, 10.0).is_eligible());
    }

    #[test]
    fn test_deserialize_defaults() {
        let element: Element =
            serde_json::from_str(r#"{"id":3,"left":1,"top":2,"width":3,"height":4}"#).unwrap();
        assert_eq!(element.elevation, None);
        assert_eq!(element.document_order, 0);
        assert!(!element.locked);
        assert_eq!(element.role, ElementRole::Content);
    }

    #[test]
    fn test_camel_case_fields() {
        let element = Element::new(1, 0.0, 0.0, 1.0, 1.0).with_elevation(2);
        let json = serde_json::to_string(&element).unwrap();
        assert!(json.contains("\"documentOrder\":0"));
        assert!(json.contains("\"elevation\":2"));
    }
}
