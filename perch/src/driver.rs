//! Long-running mode: one loop owns the section store, feeds its throttle
//! and debounce from their deadlines, and keeps the image cache informed of
//! which section is revealed.

use std::future::{self, Future};
use std::io::{self, BufRead};
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::thread;
use std::time::Instant;

use flume::Receiver;
use perch_imagery::{
    Bitmap, CacheContext, CacheHandle, CacheOptions, CapturePrimitive,
    Display, ItemImageCache, ItemManager, MenuBarItem, RefreshTrigger,
    WindowId,
};
use perch_sections::{SectionName, SectionStore, SectionsEvent};
use tokio::time;

use crate::cli::{self, Command};

/// Display assumed when no window server is attached.
const HEADLESS_DISPLAY: Display = Display {
    id: 0,
    scale_factor: 1.0,
};

/// Capture backend without window server access; every capture fails.
struct HeadlessCapture;

impl CapturePrimitive for HeadlessCapture {
    fn capture_windows(&self, _ids: &[WindowId]) -> Option<Bitmap> {
        None
    }

    fn capture_window(&self, _id: WindowId) -> Option<Bitmap> {
        None
    }
}

/// Item source without window server access.
struct HeadlessItems;

impl ItemManager for HeadlessItems {
    fn items(&self, _section: SectionName) -> Vec<MenuBarItem> {
        Vec::new()
    }
}

/// Presentation state mirrored from the section store.
#[derive(Debug)]
struct BarContext {
    revealed: Mutex<Option<SectionName>>,
    display: Display,
}

impl BarContext {
    fn new(display: Display) -> Self {
        Self {
            revealed: Mutex::new(None),
            display,
        }
    }

    /// Returns `true` when the revealed section changed.
    fn set_revealed(&self, section: Option<SectionName>) -> bool {
        let mut revealed =
            self.revealed.lock().unwrap_or_else(PoisonError::into_inner);
        if *revealed == section {
            return false;
        }

        *revealed = section;
        true
    }
}

impl CacheContext for BarContext {
    fn is_settings_visible(&self) -> bool {
        false
    }

    fn overflow_section(&self) -> Option<SectionName> {
        *self.revealed.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn main_display(&self) -> Option<Display> {
        Some(self.display)
    }
}

/// Outermost enabled section, past the always-visible one, whose items are
/// currently shown.
fn revealed_section(store: &SectionStore) -> Option<SectionName> {
    [SectionName::AlwaysHidden, SectionName::Hidden]
        .into_iter()
        .find(|name| {
            store.is_section_enabled(*name) && !store.is_section_hidden(*name)
        })
}

/// Read commands from stdin, one per line, on a dedicated thread.
///
/// The returned channel closes at end of input.
pub(crate) fn spawn_stdin_commands() -> io::Result<Receiver<Command>> {
    let (tx, rx) = flume::unbounded();
    thread::Builder::new()
        .name(String::from("perch-stdin"))
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(err) => {
                        log::warn!("stopped reading commands: {err}");
                        break;
                    },
                };
                if line.trim().is_empty() {
                    continue;
                }

                match cli::parse_command_line(&line) {
                    Ok(command) => {
                        if tx.send(command).is_err() {
                            break;
                        }
                    },
                    Err(err) => eprint!("{err}"),
                }
            }
        })?;

    Ok(rx)
}

/// Drive the store and the image cache until `commands` closes or
/// `shutdown` resolves. Pending changes are flushed before returning.
pub(crate) async fn run<F>(
    mut store: SectionStore,
    cache_options: CacheOptions,
    commands: Receiver<Command>,
    shutdown: F,
) -> SectionStore
where
    F: Future<Output = ()>,
{
    let events = store.subscribe();
    let context = Arc::new(BarContext::new(HEADLESS_DISPLAY));
    context.set_revealed(revealed_section(&store));

    let mut cache = ItemImageCache::new(
        Arc::new(HeadlessCapture),
        Arc::new(HeadlessItems),
        cache_options,
    );
    let weak_context: Weak<dyn CacheContext> = Arc::<BarContext>::downgrade(&context);
    cache.set_context(weak_context);
    let cache = cache.perform_setup();
    tokio::pin!(shutdown);
    log::debug!("driver started");

    loop {
        let deadline = store.next_deadline();
        tokio::select! {
            _ = &mut shutdown => {
                log::info!("shutdown requested");
                break;
            },
            received = commands.recv_async() => match received {
                Ok(command) => apply_command(&mut store, &command),
                Err(_) => break,
            },
            _ = sleep_until(deadline) => store.tick(),
            Ok(event) = events.recv_async() => {
                forward_event(&store, &context, &cache, event);
            },
        }
    }

    store.save_sections();
    cache.shutdown();
    log::debug!("driver stopped");
    store
}

fn apply_command(store: &mut SectionStore, command: &Command) {
    match command {
        Command::Run | Command::Config { .. } => {
            log::warn!("{command:?} is not available while running");
        },
        command => print!("{}", cli::execute(store, command)),
    }
}

fn forward_event(
    store: &SectionStore,
    context: &BarContext,
    cache: &CacheHandle,
    event: SectionsEvent,
) {
    match event {
        SectionsEvent::Changed => {
            if context.set_revealed(revealed_section(store)) {
                cache.trigger(RefreshTrigger::ItemsChanged);
            }
        },
        SectionsEvent::PositionsChanged(positions) => {
            log::debug!("control items moved: {positions:?}");
            cache.trigger(RefreshTrigger::ItemsChanged);
        },
        SectionsEvent::Saved => log::debug!("sections saved"),
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => {
            time::sleep_until(time::Instant::from_std(deadline)).await
        },
        None => future::pending().await,
    }
}
