use std::fmt;

use perch_sections::SectionName;

/// Stable identity of a capturable item.
///
/// Window handles change when the owning app relaunches or redraws; this key
/// does not, so cache entries survive handle churn.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ItemInfo {
    pub namespace: String,
    pub title: String,
}

impl ItemInfo {
    pub fn new(namespace: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            title: title.into(),
        }
    }
}

impl fmt::Display for ItemInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.title)
    }
}

/// Transient handle understood by the capture primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowId(pub u32);

/// Item bounds in points.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Frame {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Frame {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// An item as reported by the item manager.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuBarItem {
    pub info: ItemInfo,
    pub window_id: WindowId,
    pub frame: Frame,
    pub section: SectionName,
}

/// A display and the pixel density of its backing store.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Display {
    pub id: u32,
    pub scale_factor: f64,
}

impl Display {
    pub fn new(id: u32, scale_factor: f64) -> Self {
        Self { id, scale_factor }
    }
}
