use std::collections::BTreeSet;

use super::NodeId;

/// Height of a collapsed description field.
pub const COLLAPSED_DESCRIPTION_HEIGHT: f64 = 30.0;

/// A leaf content node of a TimeLine.
///
/// Items are owned by exactly one TimeLine sequence. Moving an item to another
/// place produces a copy with a fresh id (see [`TimeItem::extract_as_clone`])
/// and removes the original.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeItem {
    pub id: NodeId,
    pub title: Option<String>,
    pub description: Option<String>,
    /// Normalized `#rrggbb` color of the item's line, if any.
    pub color: Option<String>,
    /// Category colors, kept sorted so indicators render consistently.
    pub categories: BTreeSet<String>,
    /// Height of the description field when expanded.
    pub expanded_size: f64,
    pub is_expanded: bool,
}

impl Default for TimeItem {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeItem {
    /// A blank item with a fresh id.
    pub fn new() -> Self {
        Self {
            id: NodeId::generate(),
            title: None,
            description: None,
            color: None,
            categories: BTreeSet::new(),
            expanded_size: COLLAPSED_DESCRIPTION_HEIGHT,
            is_expanded: false,
        }
    }

    pub fn titled(title: impl Into<String>) -> Self {
        let mut item = Self::new();
        item.set_title(Some(title.into()));
        item
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Copy every content and size field under a new id.
    pub fn extract_as_clone(&self) -> Self {
        Self {
            id: NodeId::generate(),
            ..self.clone()
        }
    }

    /// Set the title. Blank titles are stored as `None`.
    pub fn set_title(&mut self, title: Option<String>) {
        self.title = title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
    }

    pub fn set_description(&mut self, description: Option<String>) {
        self.description = description;
    }

    pub fn set_categories<I, S>(&mut self, categories: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = categories.into_iter().map(Into::into).collect();
    }

    pub fn has_category(&self, category: &str) -> bool {
        self.categories.contains(category)
    }

    /// Items without a title render as placeholders.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
    }

    pub fn description_height(&self) -> f64 {
        if self.is_expanded {
            self.expanded_size
        } else {
            COLLAPSED_DESCRIPTION_HEIGHT
        }
    }

    /// Record a user resize of the description field. Resizing to the
    /// collapsed height or below collapses the field and keeps the last
    /// expanded size.
    pub fn resize_description(&mut self, height: f64) {
        if height <= COLLAPSED_DESCRIPTION_HEIGHT {
            self.is_expanded = false;
        } else {
            self.expanded_size = height;
            self.is_expanded = true;
        }
    }

    pub fn toggle_description_collapse(&mut self) {
        self.is_expanded = !self.is_expanded;
    }
}
