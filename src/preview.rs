//! Rendered preview of a single notice.
//!
//! Renders are asynchronous and may complete out of order. Each render is
//! stamped with its start time and a result is only shown if no later-started
//! render has been shown already.

use crate::notice::NoticeEvent;
use crate::provider::RenderService;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, warn};

const DEFAULT_INTERVAL_MS: u64 = 1_000;

/// Milliseconds since the Unix epoch, used to stamp renders.
pub fn now_millis() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0)
}

/// Handle for one in-flight render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RenderTicket {
    started_at: u64,
}

impl RenderTicket {
    pub fn started_at(&self) -> u64 {
        self.started_at
    }
}

#[derive(Debug)]
pub struct PreviewPanel {
    will_update: Arc<AtomicBool>,
    last_update: u64,
    html: Option<String>,
    interval: Duration,
}

impl Default for PreviewPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl PreviewPanel {
    /// A new panel starts dirty so the first refresh renders.
    pub fn new() -> Self {
        Self {
            will_update: Arc::new(AtomicBool::new(true)),
            last_update: 0,
            html: None,
            interval: Duration::from_millis(DEFAULT_INTERVAL_MS),
        }
    }

    /// Panel polling for changes every `interval_ms` milliseconds.
    pub fn with_interval(interval_ms: u64) -> Self {
        Self {
            interval: Duration::from_millis(interval_ms),
            ..Self::new()
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Listener marking this panel dirty whenever the notice is saved.
    pub fn save_listener(&self) -> impl FnMut(&NoticeEvent) + Send + 'static {
        let flag = Arc::clone(&self.will_update);
        move |event| {
            if *event == NoticeEvent::Saved {
                flag.store(true, Ordering::SeqCst);
            }
        }
    }

    pub fn mark_dirty(&self) {
        self.will_update.store(true, Ordering::SeqCst);
    }

    pub fn is_dirty(&self) -> bool {
        self.will_update.load(Ordering::SeqCst)
    }

    /// Start a render at `started_at`.
    pub fn begin(&self, started_at: u64) -> RenderTicket {
        RenderTicket { started_at }
    }

    /// Apply a finished render. Returns `false` and discards `html` if a
    /// render started at the same time or later was already applied.
    pub fn complete(&mut self, ticket: RenderTicket, html: String) -> bool {
        if self.last_update < ticket.started_at {
            self.html = Some(html);
            self.last_update = ticket.started_at;
            true
        } else {
            debug!(
                started_at = ticket.started_at,
                last_update = self.last_update,
                "Discarding stale preview"
            );
            false
        }
    }

    pub fn html(&self) -> Option<&str> {
        self.html.as_deref()
    }

    pub fn last_update(&self) -> u64 {
        self.last_update
    }

    /// Render `text` now. Render failures leave the current preview in
    /// place and return `false`.
    pub async fn refresh<R>(&mut self, renderer: &R, page: &str, text: &str) -> bool
    where
        R: RenderService + ?Sized,
    {
        let ticket = self.begin(now_millis());
        match renderer.render_to_preview_markup(page, text).await {
            Ok(html) => self.complete(ticket, html),
            Err(e) => {
                warn!(page, "Preview render failed: {}", e);
                false
            }
        }
    }

    /// Render only if a save happened since the last refresh.
    pub async fn refresh_if_dirty<R>(&mut self, renderer: &R, page: &str, text: &str) -> bool
    where
        R: RenderService + ?Sized,
    {
        if !self.will_update.swap(false, Ordering::SeqCst) {
            return false;
        }
        self.refresh(renderer, page, text).await
    }

    /// Wait one polling interval, then refresh if a save happened.
    pub async fn tick<R>(&mut self, renderer: &R, page: &str, text: &str) -> bool
    where
        R: RenderService + ?Sized,
    {
        tokio::time::sleep(self.interval).await;
        self.refresh_if_dirty(renderer, page, text).await
    }
}
