//! Slide document: the live set of elements on one canvas.

use crate::element::{Element, ElementId, ElevationAssignment};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Slide model errors.
#[derive(Debug, Error)]
pub enum SlideError {
    #[error("Element already on slide: {0}")]
    DuplicateElement(ElementId),
    #[error("Element not found: {0}")]
    UnknownElement(ElementId),
    #[error("Document order exhausted")]
    OrderExhausted,
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type for slide operations.
pub type SlideResult<T> = Result<T, SlideError>;

/// Source of element rectangles for the geometry engine.
///
/// Rectangles are in the canvas's own pixel space; callers subtract any
/// page or viewport offset before handing points to the engine.
pub trait ElementProvider {
    /// Snapshot of every element currently on the canvas.
    fn elements(&self) -> Vec<Element>;
}

/// A slide containing freely placed elements.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slide {
    /// Unique slide identifier.
    pub id: String,
    /// Slide name.
    pub name: String,
    /// Elements in document order.
    elements: Vec<Element>,
    /// Next document order index to hand out.
    #[serde(skip)]
    next_order: u32,
}

impl Default for Slide {
    fn default() -> Self {
        Self::new()
    }
}

impl Slide {
    /// Create a new empty slide.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: "Untitled".to_string(),
            elements: Vec::new(),
            next_order: 0,
        }
    }

    /// Build a slide from elements that already carry their document order.
    pub fn from_elements(elements: Vec<Element>) -> SlideResult<Self> {
        let mut slide = Self::new();
        for element in elements {
            if slide.get(element.id).is_some() {
                return Err(SlideError::DuplicateElement(element.id));
            }
            slide.elements.push(element);
        }
        slide.reindex();
        Ok(slide)
    }

    fn reindex(&mut self) {
        self.elements.sort_by_key(|e| (e.document_order, e.id));
        self.next_order = match self.elements.last() {
            Some(last) => last.document_order.saturating_add(1),
            None => 0,
        };
    }

    /// Renumber document order densely, keeping the relative order.
    fn compact(&mut self) {
        log::warn!("Document order exhausted, renumbering {} element(s)", self.elements.len());
        for (element, order) in self.elements.iter_mut().zip(0u32..) {
            element.document_order = order;
        }
        self.next_order = self.elements.last().map_or(0, |e| e.document_order.saturating_add(1));
    }

    /// Hand out the next document order. `u32::MAX` is never handed out so
    /// it cannot collide with an element loaded at that order.
    fn allocate_order(&mut self) -> SlideResult<u32> {
        if self.next_order == u32::MAX {
            self.compact();
        }
        let order = self.next_order;
        if order == u32::MAX {
            return Err(SlideError::OrderExhausted);
        }
        self.next_order = order + 1;
        Ok(order)
    }

    /// Place a new element on the slide, assigning the next document order.
    pub fn add_element(&mut self, mut element: Element) -> SlideResult<ElementId> {
        if self.get(element.id).is_some() {
            return Err(SlideError::DuplicateElement(element.id));
        }
        element.document_order = self.allocate_order()?;
        self.elements.push(element);
        Ok(element.id)
    }

    /// Remove an element from the slide.
    pub fn remove_element(&mut self, id: ElementId) -> Option<Element> {
        let pos = self.elements.iter().position(|e| e.id == id)?;
        Some(self.elements.remove(pos))
    }

    /// Get an element by ID.
    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.iter().find(|e| e.id == id)
    }

    fn get_mut(&mut self, id: ElementId) -> SlideResult<&mut Element> {
        self.elements
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(SlideError::UnknownElement(id))
    }

    /// Elements in document order.
    pub fn elements_ordered(&self) -> impl Iterator<Item = &Element> {
        self.elements.iter()
    }

    /// Move an element's top-left corner.
    pub fn move_to(&mut self, id: ElementId, left: f64, top: f64) -> SlideResult<()> {
        let element = self.get_mut(id)?;
        element.left = left;
        element.top = top;
        Ok(())
    }

    /// Offset an element by a delta.
    pub fn translate(&mut self, id: ElementId, dx: f64, dy: f64) -> SlideResult<()> {
        let element = self.get_mut(id)?;
        element.left += dx;
        element.top += dy;
        Ok(())
    }

    /// Re-insert an element at the end of document order (above equal-elevation peers).
    /// Returns the new document order.
    pub fn reinsert(&mut self, id: ElementId) -> SlideResult<u32> {
        let pos = self
            .elements
            .iter()
            .position(|e| e.id == id)
            .ok_or(SlideError::UnknownElement(id))?;
        let mut element = self.elements.remove(pos);
        element.document_order = match self.allocate_order() {
            Ok(order) => order,
            Err(e) => {
                self.elements.insert(pos, element);
                return Err(e);
            }
        };
        self.elements.push(element);
        Ok(element.document_order)
    }

    /// Apply a batch of elevations. Either every id exists or nothing changes.
    pub fn apply_elevations(&mut self, assignments: &[ElevationAssignment]) -> SlideResult<()> {
        if let Some(missing) = assignments.iter().find(|a| self.get(a.id).is_none()) {
            return Err(SlideError::UnknownElement(missing.id));
        }
        for assignment in assignments {
            self.get_mut(assignment.id)?.elevation = Some(assignment.elevation);
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Serialize the slide to JSON.
    pub fn to_json(&self) -> SlideResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| SlideError::Serialization(e.to_string()))
    }

    /// Deserialize a slide from JSON.
    pub fn from_json(json: &str) -> SlideResult<Self> {
        let slide: Slide =
            serde_json::from_str(json).map_err(|e| SlideError::Serialization(e.to_string()))?;
        Self::from_elements(slide.elements).map(|mut rebuilt| {
            rebuilt.id = slide.id;
            rebuilt.name = slide.name;
            rebuilt
        })
    }
}

impl ElementProvider for Slide {
    fn elements(&self) -> Vec<Element> {
        self.elements.clone()
    }
}
