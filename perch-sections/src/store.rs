use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::{Duration, Instant};

use flume::Receiver;
use serde_json::Value;

use crate::clock::Clock;
use crate::coalesce::{Debounce, Throttle};
use crate::observer::Observers;
use crate::section::{
    ControlItemId, HidingState, Section, SectionName, SectionRecord,
};
use crate::storage::SectionStorage;

/// Minimum spacing between bar-wide refreshes caused by position changes.
pub const POSITION_THROTTLE: Duration = Duration::from_millis(100);
/// Quiet period required before pending changes are written.
pub const SAVE_DEBOUNCE: Duration = Duration::from_secs(1);

const SECTION_COUNT: usize = SectionName::ALL.len();

/// Coalescing intervals used by [`SectionStore`].
#[derive(Debug, Clone, Copy)]
pub struct StoreOptions {
    pub position_throttle: Duration,
    pub save_debounce: Duration,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            position_throttle: POSITION_THROTTLE,
            save_debounce: SAVE_DEBOUNCE,
        }
    }
}

/// Global shortcut that toggles the always-hidden section.
pub trait ShortcutBinding: Send {
    fn set_enabled(&mut self, enabled: bool);
}

/// Notifications published by [`SectionStore`].
#[derive(Debug, Clone, PartialEq)]
pub enum SectionsEvent {
    /// Section set, visibility or hiding state changed.
    Changed,
    /// Throttled bar-wide refresh carrying the latest control item positions.
    PositionsChanged(Vec<(SectionName, Option<f64>)>),
    /// Sections were written to storage.
    Saved,
}

/// Owner of the three bar sections.
pub struct SectionStore {
    sections: Vec<Section>,
    storage: Box<dyn SectionStorage>,
    clock: Arc<dyn Clock>,
    shortcut: Option<Box<dyn ShortcutBinding>>,
    saved_hash: Option<u64>,
    needs_save: bool,
    save_debounce: Debounce,
    position_throttle: Throttle<Vec<(SectionName, Option<f64>)>>,
    observers: Observers<SectionsEvent>,
}

impl SectionStore {
    pub fn new(
        storage: Box<dyn SectionStorage>,
        clock: Arc<dyn Clock>,
        options: StoreOptions,
    ) -> Self {
        Self {
            sections: Vec::new(),
            storage,
            clock,
            shortcut: None,
            saved_hash: None,
            needs_save: false,
            save_debounce: Debounce::new(options.save_debounce),
            position_throttle: Throttle::new(options.position_throttle),
            observers: Observers::new(),
        }
    }

    pub fn with_shortcut(mut self, shortcut: Box<dyn ShortcutBinding>) -> Self {
        self.shortcut = Some(shortcut);
        self
    }

    pub fn subscribe(&mut self) -> Receiver<SectionsEvent> {
        self.observers.subscribe()
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn needs_save(&self) -> bool {
        self.needs_save
    }

    /// Populate sections from storage if none are loaded yet.
    ///
    /// Undecodable records are dropped. Anything other than the three known
    /// sections resets to the defaults. A storage failure leaves the store
    /// empty so a later call can retry.
    pub fn initialize_sections(&mut self) {
        if !self.sections.is_empty() {
            return;
        }

        let records = match self.storage.load() {
            Ok(records) => records,
            Err(err) => {
                log::error!("failed to load sections: {err}");
                return;
            },
        };

        let mut sections: Vec<Section> = records
            .into_iter()
            .filter_map(|value| {
                match serde_json::from_value::<SectionRecord>(value) {
                    Ok(record) => Some(Section::from_record(record)),
                    Err(err) => {
                        log::warn!(
                            "dropping undecodable section record: {err}"
                        );
                        None
                    },
                }
            })
            .collect();
        sections.sort_by_key(|section| section.name().index());

        if !has_canonical_layout(&sections) {
            if !sections.is_empty() {
                log::warn!(
                    "found {} stored sections, expected {SECTION_COUNT}; \
                     resetting to defaults",
                    sections.len()
                );
            }
            sections = Section::default_sections();
        }

        self.sections = sections;
        match encode_records(&self.sections) {
            Ok(records) => self.saved_hash = Some(content_hash(&records)),
            Err(err) => log::warn!("failed to hash loaded sections: {err}"),
        }
        log::debug!("initialized {} sections", self.sections.len());
        self.observers.emit(SectionsEvent::Changed);
    }

    pub fn section(&self, name: SectionName) -> Option<&Section> {
        self.sections.iter().find(|section| section.name() == name)
    }

    /// Next section in bar order, `None` after the last one.
    pub fn section_after(&self, name: SectionName) -> Option<&Section> {
        let index = self.index_of(name)?;
        self.sections.get(index + 1)
    }

    /// Previous section in bar order, `None` before the first one.
    pub fn section_before(&self, name: SectionName) -> Option<&Section> {
        let index = self.index_of(name)?;
        index.checked_sub(1).and_then(|prev| self.sections.get(prev))
    }

    /// Section owning `id`, unless that control item is currently invisible.
    pub fn section_for_control_item(
        &self,
        id: ControlItemId,
    ) -> Option<&Section> {
        self.sections.iter().find(|section| {
            section.control_item().id() == id
                && section.control_item().is_visible()
        })
    }

    pub fn is_section_hidden(&self, name: SectionName) -> bool {
        self.section(name)
            .map(|section| section.control_item().state().is_hidden())
            .unwrap_or(false)
    }

    pub fn is_section_enabled(&self, name: SectionName) -> bool {
        self.section(name)
            .map(|section| section.control_item().is_visible())
            .unwrap_or(false)
    }

    pub fn show_section(&mut self, name: SectionName) {
        self.mutate(|store| store.apply_show(name));
    }

    pub fn hide_section(&mut self, name: SectionName) {
        self.mutate(|store| store.apply_hide(name));
    }

    pub fn toggle_section(&mut self, name: SectionName) {
        let Some(section) = self.section(name) else {
            log::warn!("toggle requested for unavailable section {name}");
            return;
        };

        match section.control_item().state() {
            HidingState::ShowItems => self.hide_section(name),
            HidingState::HideItems { .. } => self.show_section(name),
        }
    }

    /// Enable or disable a section's control item.
    ///
    /// Transitions of the always-hidden section also toggle its shortcut.
    pub fn set_section_enabled(&mut self, name: SectionName, enabled: bool) {
        let Some(section) = self.section_mut(name) else {
            log::warn!("enable requested for unavailable section {name}");
            return;
        };
        if section.control_item().is_visible() == enabled {
            return;
        }

        section.control_item_mut().set_visible(enabled);
        if name == SectionName::AlwaysHidden {
            if let Some(shortcut) = self.shortcut.as_mut() {
                shortcut.set_enabled(enabled);
            }
        }
        self.did_mutate();
    }

    /// Record a new position for a control item, e.g. after a drag.
    ///
    /// Returns `false` when no section owns `id` or the position is not a
    /// finite number.
    pub fn set_position(
        &mut self,
        id: ControlItemId,
        position: Option<f64>,
    ) -> bool {
        if let Some(value) = position.filter(|value| !value.is_finite()) {
            log::warn!("rejecting non-finite control item position {value}");
            return false;
        }
        let Some(section) = self
            .sections
            .iter_mut()
            .find(|section| section.control_item().id() == id)
        else {
            return false;
        };
        if section.control_item().position() == position {
            return true;
        }

        section.control_item_mut().set_position(position);
        let now = self.clock.now();
        let positions = self.positions();
        if let Some(positions) = self.position_throttle.offer(positions, now) {
            self.observers.emit(SectionsEvent::PositionsChanged(positions));
        }
        self.mark_needs_save(now);
        true
    }

    /// Write sections unless their content matches the last saved state.
    pub fn save_sections(&mut self) {
        let records = match encode_records(&self.sections) {
            Ok(records) => records,
            Err(err) => {
                log::error!("failed to encode sections: {err}");
                return;
            },
        };

        let hash = content_hash(&records);
        if self.saved_hash == Some(hash) {
            self.needs_save = false;
            return;
        }

        match self.storage.save(&records) {
            Ok(()) => {
                self.saved_hash = Some(hash);
                self.needs_save = false;
                log::debug!("saved {} sections", records.len());
                self.observers.emit(SectionsEvent::Saved);
            },
            Err(err) => {
                log::warn!("sections save failed: {err}");
                let now = self.clock.now();
                self.save_debounce.touch(now);
            },
        }
    }

    /// Release throttled position updates and run a due save.
    pub fn tick(&mut self) {
        let now = self.clock.now();
        if let Some(positions) = self.position_throttle.poll(now) {
            self.observers.emit(SectionsEvent::PositionsChanged(positions));
        }

        if self.save_debounce.poll(now) && self.needs_save {
            self.save_sections();
        }
    }

    /// Earliest instant at which [`SectionStore::tick`] has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (
            self.position_throttle.deadline(),
            self.save_debounce.deadline(),
        ) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    fn mutate<F>(&mut self, apply: F)
    where
        F: FnOnce(&mut Self),
    {
        let before = self.states();
        apply(self);
        if self.states() != before {
            self.did_mutate();
        }
    }

    fn apply_show(&mut self, name: SectionName) {
        match name {
            SectionName::AlwaysVisible | SectionName::Hidden => {
                self.set_state(
                    SectionName::AlwaysVisible,
                    HidingState::ShowItems,
                );
                self.set_state(SectionName::Hidden, HidingState::ShowItems);
            },
            SectionName::AlwaysHidden => {
                self.apply_show(SectionName::Hidden);
                self.set_state(
                    SectionName::AlwaysHidden,
                    HidingState::ShowItems,
                );
            },
        }
    }

    fn apply_hide(&mut self, name: SectionName) {
        match name {
            SectionName::AlwaysVisible | SectionName::Hidden => {
                self.set_state(
                    SectionName::AlwaysVisible,
                    HidingState::HideItems { is_expanded: false },
                );
                self.set_state(
                    SectionName::Hidden,
                    HidingState::HideItems { is_expanded: true },
                );
                self.apply_hide(SectionName::AlwaysHidden);
            },
            SectionName::AlwaysHidden => {
                self.set_state(
                    SectionName::AlwaysHidden,
                    HidingState::HideItems { is_expanded: true },
                );
            },
        }
    }

    fn set_state(&mut self, name: SectionName, state: HidingState) {
        match self.section_mut(name) {
            Some(section) => section.control_item_mut().set_state(state),
            None => log::warn!("unsupported state change for section {name}"),
        }
    }

    fn did_mutate(&mut self) {
        let now = self.clock.now();
        self.mark_needs_save(now);
        self.observers.emit(SectionsEvent::Changed);
    }

    fn mark_needs_save(&mut self, now: Instant) {
        self.needs_save = true;
        self.save_debounce.touch(now);
    }

    fn states(&self) -> Vec<HidingState> {
        self.sections
            .iter()
            .map(|section| section.control_item().state())
            .collect()
    }

    fn positions(&self) -> Vec<(SectionName, Option<f64>)> {
        self.sections
            .iter()
            .map(|section| (section.name(), section.control_item().position()))
            .collect()
    }

    fn index_of(&self, name: SectionName) -> Option<usize> {
        self.sections
            .iter()
            .position(|section| section.name() == name)
    }

    fn section_mut(&mut self, name: SectionName) -> Option<&mut Section> {
        self.sections
            .iter_mut()
            .find(|section| section.name() == name)
    }
}

fn has_canonical_layout(sections: &[Section]) -> bool {
    sections.len() == SECTION_COUNT
        && sections
            .iter()
            .zip(SectionName::ALL)
            .all(|(section, name)| section.name() == name)
}

fn encode_records(
    sections: &[Section],
) -> Result<Vec<Value>, serde_json::Error> {
    sections
        .iter()
        .map(|section| serde_json::to_value(section.to_record()))
        .collect()
}

fn content_hash(records: &[Value]) -> u64 {
    let mut hasher = DefaultHasher::new();
    for record in records {
        record.to_string().hash(&mut hasher);
    }
    hasher.finish()
}
