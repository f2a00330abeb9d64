use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use flume::{Receiver, Sender};
use perch_sections::SectionName;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::bitmap::Bitmap;
use crate::cache::{CacheEvent, ItemImageCache};
use crate::item::ItemInfo;

/// Reasons to refresh the cache. All of them are treated alike; the variant
/// is kept for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTrigger {
    Timer,
    ActiveSpaceChanged,
    ScreenParametersChanged,
    AverageColorChanged,
    ItemsChanged,
}

impl ItemImageCache {
    /// Start the refresh loop and hand the cache over to it.
    ///
    /// Must be called from within a tokio runtime. Refreshes run one at a
    /// time; triggers that arrive while a refresh is running are folded
    /// into a single follow-up refresh.
    pub fn perform_setup(self) -> CacheHandle {
        let live = self.live_flag();
        let period = self.options().refresh_interval;
        let cache = Arc::new(Mutex::new(self));
        let (triggers, trigger_rx) = flume::unbounded();

        let task = tokio::spawn(run_refresh_loop(
            Arc::clone(&cache),
            trigger_rx,
            period,
            Arc::clone(&live),
        ));

        CacheHandle {
            cache,
            triggers,
            live,
            task,
        }
    }
}

/// Owner-side handle to a running cache.
pub struct CacheHandle {
    cache: Arc<Mutex<ItemImageCache>>,
    triggers: Sender<RefreshTrigger>,
    live: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl CacheHandle {
    pub fn trigger(&self, trigger: RefreshTrigger) {
        if self.triggers.send(trigger).is_err() {
            log::debug!("refresh loop stopped, dropping {trigger:?}");
        }
    }

    pub async fn is_empty(&self, section: SectionName) -> bool {
        self.cache.lock().await.is_empty(section)
    }

    pub async fn image(&self, info: &ItemInfo) -> Option<Bitmap> {
        self.cache.lock().await.image(info).cloned()
    }

    pub async fn subscribe(&self) -> Receiver<CacheEvent> {
        self.cache.lock().await.subscribe()
    }

    /// Refresh immediately, waiting for any running refresh first.
    pub async fn refresh_now(&self) {
        self.cache.lock().await.update_cache().await;
    }

    /// Stop the timer and signal handling.
    ///
    /// A capture already running on a blocking worker is left to finish;
    /// its result is dropped.
    pub fn shutdown(self) {
        self.live.store(false, Ordering::Release);
        self.task.abort();
        log::debug!("image cache shut down");
    }
}

async fn run_refresh_loop(
    cache: Arc<Mutex<ItemImageCache>>,
    triggers: Receiver<RefreshTrigger>,
    period: Duration,
    live: Arc<AtomicBool>,
) {
    let mut timer = time::interval_at(Instant::now() + period, period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        let trigger = tokio::select! {
            _ = timer.tick() => RefreshTrigger::Timer,
            received = triggers.recv_async() => match received {
                Ok(trigger) => trigger,
                Err(_) => break,
            },
        };
        if !live.load(Ordering::Acquire) {
            break;
        }

        let coalesced = triggers.drain().count();
        log::trace!(
            "refreshing image cache on {trigger:?} (+{coalesced} coalesced)"
        );
        cache.lock().await.update_cache().await;
    }

    log::debug!("image cache refresh loop finished");
}
