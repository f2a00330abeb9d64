//! Section visibility state for a menu bar.
//!
//! A bar is split into three fixed sections ([`SectionName`]), each owning a
//! [`ControlItem`] that tracks its position, whether it is enabled and
//! whether the items it governs are shown or hidden. [`SectionStore`] owns
//! the sections, applies the cross-section show/hide rules and persists the
//! result through a [`SectionStorage`] backend.
//!
//! Persistence and position updates are coalesced:
//! - position changes are throttled to one bar-wide refresh per window,
//! - saves are debounced until the store has been quiet for a while and are
//!   skipped entirely when the content hash did not change.
//!
//! Both are driven by the owner calling [`SectionStore::tick`], typically
//! when [`SectionStore::next_deadline`] elapses.

mod clock;
mod coalesce;
mod error;
mod observer;
mod section;
mod storage;
mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use coalesce::{Debounce, Throttle};
pub use error::{ParseSectionNameError, SectionsError};
pub use observer::Observers;
pub use section::{
    ControlItem, ControlItemId, HidingState, Section, SectionName,
    SectionRecord,
};
pub use storage::{MemoryStorage, SectionStorage};
pub use store::{
    SAVE_DEBOUNCE, POSITION_THROTTLE, SectionStore, SectionsEvent,
    ShortcutBinding, StoreOptions,
};
