use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use flume::{Receiver, Sender};
use image::{Rgba, RgbaImage};
use perch_sections::SectionName;

use crate::bitmap::Bitmap;
use crate::capture::{CacheContext, CapturePrimitive, ItemManager};
use crate::item::{Display, Frame, ItemInfo, MenuBarItem, WindowId};

pub(crate) fn item(
    title: &str,
    window: u32,
    x: f64,
    width: f64,
    section: SectionName,
) -> MenuBarItem {
    MenuBarItem {
        info: ItemInfo::new("test", title),
        window_id: WindowId(window),
        frame: Frame::new(x, 0.0, width, 22.0),
        section,
    }
}

pub(crate) fn solid(width: u32, height: u32, color: Rgba<u8>) -> Bitmap {
    RgbaImage::from_pixel(width, height, color)
}

/// Vertical stripes of the given widths, left to right.
pub(crate) fn striped(stripes: &[(u32, Rgba<u8>)]) -> Bitmap {
    let width = stripes.iter().map(|(w, _)| *w).sum();
    let mut bitmap = RgbaImage::new(width, 4);
    let mut x0 = 0;
    for (stripe_width, color) in stripes {
        for x in x0..x0 + stripe_width {
            for y in 0..4 {
                bitmap.put_pixel(x, y, *color);
            }
        }
        x0 += stripe_width;
    }
    bitmap
}

#[derive(Default)]
struct CaptureState {
    composite: Option<Bitmap>,
    windows: HashMap<WindowId, Bitmap>,
    composite_calls: usize,
    single_calls: usize,
    gate: Option<(Sender<()>, Receiver<()>)>,
}

/// Capture primitive serving canned bitmaps and counting calls.
#[derive(Default)]
pub(crate) struct FakeCapture {
    state: Mutex<CaptureState>,
}

impl FakeCapture {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn set_composite(&self, bitmap: Option<Bitmap>) {
        self.lock().composite = bitmap;
    }

    pub(crate) fn set_window(&self, id: WindowId, bitmap: Bitmap) {
        self.lock().windows.insert(id, bitmap);
    }

    /// Block the next composite capture: `started` is signalled on entry and
    /// the call waits for a message on `release`.
    pub(crate) fn set_gate(&self, started: Sender<()>, release: Receiver<()>) {
        self.lock().gate = Some((started, release));
    }

    pub(crate) fn composite_calls(&self) -> usize {
        self.lock().composite_calls
    }

    pub(crate) fn single_calls(&self) -> usize {
        self.lock().single_calls
    }

    fn lock(&self) -> MutexGuard<'_, CaptureState> {
        self.state.lock().expect("capture state lock")
    }
}

impl CapturePrimitive for FakeCapture {
    fn capture_windows(&self, _ids: &[WindowId]) -> Option<Bitmap> {
        let gate = {
            let mut state = self.lock();
            state.composite_calls += 1;
            state.gate.take()
        };
        if let Some((started, release)) = gate {
            let _ = started.send(());
            let _ = release.recv();
        }
        self.lock().composite.clone()
    }

    fn capture_window(&self, id: WindowId) -> Option<Bitmap> {
        let mut state = self.lock();
        state.single_calls += 1;
        state.windows.get(&id).cloned()
    }
}

/// Item manager with a mutable per-section item list.
#[derive(Default)]
pub(crate) struct FakeItems {
    items: Mutex<HashMap<SectionName, Vec<MenuBarItem>>>,
}

impl FakeItems {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn set(&self, section: SectionName, items: Vec<MenuBarItem>) {
        self.items
            .lock()
            .expect("items lock")
            .insert(section, items);
    }
}

impl ItemManager for FakeItems {
    fn items(&self, section: SectionName) -> Vec<MenuBarItem> {
        self.items
            .lock()
            .expect("items lock")
            .get(&section)
            .cloned()
            .unwrap_or_default()
    }
}

struct ContextState {
    settings_visible: bool,
    overflow: Option<SectionName>,
    display: Option<Display>,
}

pub(crate) struct FakeContext {
    state: Mutex<ContextState>,
}

impl FakeContext {
    pub(crate) fn shared(display: Display) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(ContextState {
                settings_visible: false,
                overflow: None,
                display: Some(display),
            }),
        })
    }

    pub(crate) fn weak(context: &Arc<Self>) -> Weak<dyn CacheContext> {
        let weak: Weak<FakeContext> = Arc::downgrade(context);
        weak
    }

    pub(crate) fn set_settings_visible(&self, visible: bool) {
        self.state.lock().expect("context lock").settings_visible = visible;
    }

    pub(crate) fn set_overflow(&self, section: Option<SectionName>) {
        self.state.lock().expect("context lock").overflow = section;
    }
}

impl CacheContext for FakeContext {
    fn is_settings_visible(&self) -> bool {
        self.state.lock().expect("context lock").settings_visible
    }

    fn overflow_section(&self) -> Option<SectionName> {
        self.state.lock().expect("context lock").overflow
    }

    fn main_display(&self) -> Option<Display> {
        self.state.lock().expect("context lock").display
    }
}
