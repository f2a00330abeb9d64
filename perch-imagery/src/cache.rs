use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use flume::Receiver;
use perch_sections::{Observers, SectionName};
use tokio::task;

use crate::bitmap::{
    Bitmap, COMPOSITE_MAX_ALPHA, CROP_MAX_ALPHA, crop_columns, is_transparent,
};
use crate::capture::{CacheContext, CapturePrimitive, ItemManager};
use crate::item::{Display, ItemInfo, MenuBarItem, WindowId};

/// Period of the scheduled refresh.
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(3);

/// Tunables for [`ItemImageCache`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CacheOptions {
    pub refresh_interval: Duration,
    pub composite_max_alpha: f64,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            refresh_interval: REFRESH_INTERVAL,
            composite_max_alpha: COMPOSITE_MAX_ALPHA,
        }
    }
}

/// Notifications published by [`ItemImageCache`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheEvent {
    /// New images were merged for these sections.
    Updated { sections: Vec<SectionName> },
}

/// Map of item identity to the freshest usable capture of that item.
pub struct ItemImageCache {
    images: HashMap<ItemInfo, Bitmap>,
    screen: Option<Display>,
    capture: Arc<dyn CapturePrimitive>,
    items: Arc<dyn ItemManager>,
    context: Option<Weak<dyn CacheContext>>,
    options: CacheOptions,
    observers: Observers<CacheEvent>,
    live: Arc<AtomicBool>,
}

impl ItemImageCache {
    pub fn new(
        capture: Arc<dyn CapturePrimitive>,
        items: Arc<dyn ItemManager>,
        options: CacheOptions,
    ) -> Self {
        Self {
            images: HashMap::new(),
            screen: None,
            capture,
            items,
            context: None,
            options,
            observers: Observers::new(),
            live: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Attach the presentation context. Only a weak reference is kept.
    pub fn set_context(&mut self, context: Weak<dyn CacheContext>) {
        self.context = Some(context);
    }

    pub fn subscribe(&mut self) -> Receiver<CacheEvent> {
        self.observers.subscribe()
    }

    pub fn image(&self, info: &ItemInfo) -> Option<&Bitmap> {
        self.images.get(info)
    }

    pub fn images(&self) -> &HashMap<ItemInfo, Bitmap> {
        &self.images
    }

    /// Display used by the most recent refresh.
    pub fn last_display(&self) -> Option<Display> {
        self.screen
    }

    pub fn options(&self) -> &CacheOptions {
        &self.options
    }

    /// `true` when none of the section's current items has an image.
    pub fn is_empty(&self, section: SectionName) -> bool {
        !self
            .items
            .items(section)
            .iter()
            .any(|item| self.images.contains_key(&item.info))
    }

    /// Capture fresh images for the section's current items.
    ///
    /// The shared cache is left untouched; callers decide what to merge.
    pub async fn create_images(
        &self,
        section: SectionName,
        display: Display,
    ) -> HashMap<ItemInfo, Bitmap> {
        let items = self.items.items(section);
        if items.is_empty() {
            return HashMap::new();
        }

        let capture = Arc::clone(&self.capture);
        let composite_max_alpha = self.options.composite_max_alpha;
        let worker = task::spawn_blocking(move || {
            capture_section_images(
                capture.as_ref(),
                &items,
                display.scale_factor,
                composite_max_alpha,
            )
        });

        match worker.await {
            Ok(images) => images,
            Err(err) => {
                log::error!("capture worker for {section} failed: {err}");
                HashMap::new()
            },
        }
    }

    /// Refresh the sections that are currently relevant and merge results.
    pub async fn update_cache(&mut self) {
        let Some(context) = self.context.as_ref().and_then(Weak::upgrade)
        else {
            log::debug!("image cache has no context, skipping refresh");
            return;
        };
        let Some(display) = context.main_display() else {
            log::debug!("no display available, skipping refresh");
            return;
        };
        let sections = sections_needing_refresh(context.as_ref());
        drop(context);

        let mut updated = Vec::new();
        for section in sections {
            if self.items.items(section).is_empty() {
                log::debug!("{section} has no items, nothing to capture");
                continue;
            }

            let images = self.create_images(section, display).await;
            if !self.is_live() {
                log::debug!(
                    "image cache torn down, discarding {section} captures"
                );
                return;
            }
            if images.is_empty() {
                log::warn!(
                    "no usable images for {section}, keeping cached ones"
                );
                continue;
            }

            log::trace!("caching {} images for {section}", images.len());
            self.images.extend(images);
            updated.push(section);
        }

        self.screen = Some(display);
        if !updated.is_empty() {
            self.observers.emit(CacheEvent::Updated { sections: updated });
        }
    }

    pub(crate) fn live_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.live)
    }

    fn is_live(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }
}

/// Sections to refresh given the current presentation state.
pub fn sections_needing_refresh(
    context: &dyn CacheContext,
) -> Vec<SectionName> {
    if context.is_settings_visible() {
        return SectionName::ALL.to_vec();
    }

    context.overflow_section().into_iter().collect()
}

fn capture_section_images(
    capture: &dyn CapturePrimitive,
    items: &[MenuBarItem],
    scale_factor: f64,
    composite_max_alpha: f64,
) -> HashMap<ItemInfo, Bitmap> {
    let mut images = HashMap::new();
    if items.is_empty() {
        return images;
    }

    let window_ids: Vec<WindowId> =
        items.iter().map(|item| item.window_id).collect();
    let composite = capture
        .capture_windows(&window_ids)
        .filter(|bitmap| !is_transparent(bitmap, composite_max_alpha));

    match composite {
        Some(composite) => {
            let expected_width: f64 = items
                .iter()
                .map(|item| item.frame.width * scale_factor)
                .sum();
            if f64::from(composite.width()) == expected_width {
                crop_composite(&composite, items, scale_factor, &mut images);
                return images;
            }
            log::debug!(
                "composite is {}px wide, items span {expected_width}px; \
                 capturing items individually",
                composite.width()
            );
        },
        None => {
            log::debug!(
                "composite capture unusable, capturing items individually"
            );
        },
    }

    for item in items {
        match capture.capture_window(item.window_id) {
            Some(bitmap) if !is_transparent(&bitmap, CROP_MAX_ALPHA) => {
                images.insert(item.info.clone(), bitmap);
            },
            Some(_) => {
                log::trace!("discarding transparent capture of {}", item.info)
            },
            None => log::trace!("capture of {} returned nothing", item.info),
        }
    }

    images
}

/// Split a composite left to right, one crop per item.
fn crop_composite(
    composite: &Bitmap,
    items: &[MenuBarItem],
    scale_factor: f64,
    images: &mut HashMap<ItemInfo, Bitmap>,
) {
    let mut offset = 0.0_f64;
    for item in items {
        let width = item.frame.width * scale_factor;
        let crop = crop_columns(
            composite,
            offset.round() as u32,
            width.round() as u32,
        );
        offset += width;

        match crop {
            Some(bitmap) if !is_transparent(&bitmap, CROP_MAX_ALPHA) => {
                images.insert(item.info.clone(), bitmap);
            },
            _ => log::trace!("discarding blank crop of {}", item.info),
        }
    }
}
