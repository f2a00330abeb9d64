//! Bitmap snapshots of menu bar items, keyed by stable item identity.
//!
//! [`ItemImageCache`] captures every item of a section through a
//! [`CapturePrimitive`], preferring one composite capture cropped into
//! per-item bitmaps and falling back to one capture per item when the
//! composite does not line up with the item frames. Captures that come back
//! transparent are discarded so the previous image stays visible.
//!
//! Refreshes are scheduled by [`ItemImageCache::perform_setup`], which runs
//! a single serial loop fed by a repeating timer and [`RefreshTrigger`]s.

mod bitmap;
mod cache;
mod capture;
mod item;
mod scheduler;
#[cfg(test)]
mod test_support;

pub use bitmap::{
    Bitmap, COMPOSITE_MAX_ALPHA, CROP_MAX_ALPHA, crop_columns, is_transparent,
};
pub use cache::{
    CacheEvent, CacheOptions, ItemImageCache, REFRESH_INTERVAL,
    sections_needing_refresh,
};
pub use capture::{CacheContext, CapturePrimitive, ItemManager};
pub use item::{Display, Frame, ItemInfo, MenuBarItem, WindowId};
pub use scheduler::{CacheHandle, RefreshTrigger};
