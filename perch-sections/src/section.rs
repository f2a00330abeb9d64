use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ParseSectionNameError;

/// The three sections of the bar, ordered first to last.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize,
    Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum SectionName {
    AlwaysVisible,
    Hidden,
    AlwaysHidden,
}

impl SectionName {
    /// Every section in bar order.
    pub const ALL: [SectionName; 3] = [
        SectionName::AlwaysVisible,
        SectionName::Hidden,
        SectionName::AlwaysHidden,
    ];

    /// Zero-based position of the section in bar order.
    pub fn index(self) -> usize {
        match self {
            SectionName::AlwaysVisible => 0,
            SectionName::Hidden => 1,
            SectionName::AlwaysHidden => 2,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            SectionName::AlwaysVisible => "Always Visible",
            SectionName::Hidden => "Hidden",
            SectionName::AlwaysHidden => "Always Hidden",
        }
    }

    /// Default ordinal of the control item when sections are reset.
    fn default_position(self) -> Option<f64> {
        match self {
            SectionName::AlwaysVisible => Some(0.0),
            SectionName::Hidden => Some(1.0),
            SectionName::AlwaysHidden => None,
        }
    }
}

impl fmt::Display for SectionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

impl FromStr for SectionName {
    type Err = ParseSectionNameError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized: String = value
            .trim()
            .chars()
            .filter(|ch| !matches!(ch, '-' | '_' | ' '))
            .flat_map(char::to_lowercase)
            .collect();

        match normalized.as_str() {
            "alwaysvisible" | "visible" => Ok(SectionName::AlwaysVisible),
            "hidden" => Ok(SectionName::Hidden),
            "alwayshidden" => Ok(SectionName::AlwaysHidden),
            _ => Err(ParseSectionNameError(value.to_string())),
        }
    }
}

/// Show/hide state of a control item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum HidingState {
    ShowItems,
    /// `is_expanded` marks items that are hidden but revealed through the
    /// overflow presentation, as opposed to fully collapsed.
    #[serde(rename_all = "camelCase")]
    HideItems { is_expanded: bool },
}

impl HidingState {
    pub fn is_hidden(&self) -> bool {
        matches!(self, HidingState::HideItems { .. })
    }
}

impl fmt::Display for HidingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HidingState::ShowItems => f.write_str("shown"),
            HidingState::HideItems { is_expanded: true } => {
                f.write_str("hidden (expanded)")
            },
            HidingState::HideItems { is_expanded: false } => {
                f.write_str("hidden")
            },
        }
    }
}

/// Opaque identity of a control item.
///
/// Two control items with the same position, visibility and state are still
/// distinct items; lookups by control item always go through this id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ControlItemId(Uuid);

impl ControlItemId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ControlItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Per-section handle tracking position, visibility and hiding state.
#[derive(Debug, Clone)]
pub struct ControlItem {
    id: ControlItemId,
    position: Option<f64>,
    visible: bool,
    state: HidingState,
}

impl ControlItem {
    pub fn new(
        position: Option<f64>,
        visible: bool,
        state: HidingState,
    ) -> Self {
        Self {
            id: ControlItemId::new(),
            position,
            visible,
            state,
        }
    }

    pub fn id(&self) -> ControlItemId {
        self.id
    }

    /// Ordering key among all bar items; `None` places the item at the end.
    pub fn position(&self) -> Option<f64> {
        self.position
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn state(&self) -> HidingState {
        self.state
    }

    pub(crate) fn set_position(&mut self, position: Option<f64>) {
        self.position = position;
    }

    pub(crate) fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub(crate) fn set_state(&mut self, state: HidingState) {
        self.state = state;
    }
}

/// A named section and the control item it owns.
#[derive(Debug, Clone)]
pub struct Section {
    name: SectionName,
    control_item: ControlItem,
}

impl Section {
    pub fn new(name: SectionName, control_item: ControlItem) -> Self {
        Self { name, control_item }
    }

    /// Section with the default control item for `name`.
    pub fn with_defaults(name: SectionName) -> Self {
        Self::new(
            name,
            ControlItem::new(
                name.default_position(),
                true,
                HidingState::HideItems {
                    is_expanded: name != SectionName::AlwaysVisible,
                },
            ),
        )
    }

    /// The canonical three sections in bar order.
    pub fn default_sections() -> Vec<Section> {
        SectionName::ALL
            .iter()
            .map(|name| Section::with_defaults(*name))
            .collect()
    }

    pub fn name(&self) -> SectionName {
        self.name
    }

    pub fn control_item(&self) -> &ControlItem {
        &self.control_item
    }

    pub(crate) fn control_item_mut(&mut self) -> &mut ControlItem {
        &mut self.control_item
    }

    pub fn to_record(&self) -> SectionRecord {
        SectionRecord {
            name: self.name,
            position: self.control_item.position,
            visible: self.control_item.visible,
            state: self.control_item.state,
        }
    }

    /// Restore a section; the control item receives a fresh identity.
    pub fn from_record(record: SectionRecord) -> Self {
        Self::new(
            record.name,
            ControlItem::new(record.position, record.visible, record.state),
        )
    }
}

/// Serialized form of a section as written to storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionRecord {
    pub name: SectionName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<f64>,
    pub visible: bool,
    pub state: HidingState,
}
