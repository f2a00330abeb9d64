use perch_sections::SectionName;

use crate::bitmap::Bitmap;
use crate::item::{Display, MenuBarItem, WindowId};

/// Raw window capture. Calls may block; the cache only invokes them from a
/// blocking worker.
pub trait CapturePrimitive: Send + Sync + 'static {
    /// Capture several windows into one bitmap, ignoring window framing.
    fn capture_windows(&self, ids: &[WindowId]) -> Option<Bitmap>;

    /// Capture one window, ignoring window framing.
    fn capture_window(&self, id: WindowId) -> Option<Bitmap>;
}

/// Source of the current items, ordered as they appear in the bar.
pub trait ItemManager: Send + Sync + 'static {
    fn items(&self, section: SectionName) -> Vec<MenuBarItem>;
}

/// Presentation state consulted when choosing what to refresh.
///
/// The cache only holds a weak reference to its context; when the context
/// is gone refreshes are skipped.
pub trait CacheContext: Send + Sync {
    /// Whether the settings surface is on screen.
    fn is_settings_visible(&self) -> bool;

    /// Section currently shown by the overflow bar, if any.
    fn overflow_section(&self) -> Option<SectionName>;

    /// Display to capture from.
    fn main_display(&self) -> Option<Display>;
}
