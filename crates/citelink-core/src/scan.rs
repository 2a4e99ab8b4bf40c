//! Click interception for in-document citation links.
//!
//! The host page exposes its hyperlink elements; [`LinkScanner`] periodically
//! rescans them and remembers, per element, whether it links to an internal
//! anchor. A click with the platform modifier (meta or ctrl) held on such an
//! element is intercepted and resolved in the background; every other click
//! is left to the element's own behavior.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::resolver::CitationResolver;

/// Host-assigned identity of a hyperlink element.
pub type ElementId = u64;

/// A hyperlink element as seen during a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkElement {
    pub id: ElementId,
    pub href: Option<String>,
}

impl LinkElement {
    pub fn new(id: ElementId, href: &str) -> Self {
        Self {
            id,
            href: Some(href.to_string()),
        }
    }
}

/// Modifier keys held during a click.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClickModifiers {
    pub meta: bool,
    pub ctrl: bool,
}

impl ClickModifiers {
    pub fn ctrl() -> Self {
        Self {
            ctrl: true,
            ..Self::default()
        }
    }

    fn requests_citation(&self) -> bool {
        self.meta || self.ctrl
    }
}

/// What the scanner decided for one element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instrumentation {
    /// The element targets an internal anchor and is intercepted.
    Citation { anchor: String },
    /// Seen, but not a citation link.
    Ignored,
}

/// Result of handing a click to the scanner.
#[derive(Debug)]
pub enum ClickOutcome {
    /// Let the element's default behavior run.
    PassThrough,
    /// Default navigation must be suppressed; resolution runs on the handle.
    Intercepted(JoinHandle<()>),
}

/// The page hosting the document view.
pub trait HostPage: Send + Sync {
    /// All hyperlink elements currently in the view.
    fn links(&self) -> Vec<LinkElement>;

    /// Open `url` in a new browsing context.
    fn open_url(&self, url: &str);

    /// Show an error to the user.
    fn notify_error(&self, message: &str);
}

/// The anchor part of `href`, if it has a non-empty one.
pub fn anchor_of(href: &str) -> Option<&str> {
    href.split('#').nth(1).filter(|anchor| !anchor.is_empty())
}

pub struct LinkScanner {
    resolver: CitationResolver,
    host: Arc<dyn HostPage>,
    /// Grows monotonically for the lifetime of the scanner.
    seen: Mutex<HashMap<ElementId, Instrumentation>>,
}

impl LinkScanner {
    pub fn new(resolver: CitationResolver, host: Arc<dyn HostPage>) -> Self {
        Self {
            resolver,
            host,
            seen: Mutex::new(HashMap::new()),
        }
    }

    /// Record every element not seen before. Returns how many new citation
    /// links were instrumented.
    pub fn scan(&self) -> usize {
        let elements = self.host.links();
        let mut seen = self.seen();

        let mut added = 0;
        for element in elements {
            if seen.contains_key(&element.id) {
                continue;
            }
            let state = match element.href.as_deref().and_then(anchor_of) {
                Some(anchor) => {
                    added += 1;
                    Instrumentation::Citation {
                        anchor: anchor.to_string(),
                    }
                }
                None => Instrumentation::Ignored,
            };
            seen.insert(element.id, state);
        }
        if added > 0 {
            tracing::debug!(added, total = seen.len(), "instrumented citation links");
        }
        added
    }

    /// Instrumentation state of an element, if it has been scanned.
    pub fn instrumentation(&self, id: ElementId) -> Option<Instrumentation> {
        self.seen().get(&id).cloned()
    }

    fn seen(&self) -> MutexGuard<'_, HashMap<ElementId, Instrumentation>> {
        self.seen.lock().unwrap_or_else(|e| {
            tracing::warn!("link scanner state was poisoned; recovering");
            e.into_inner()
        })
    }

    /// Handle a click on element `id`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn click(&self, id: ElementId, modifiers: ClickModifiers) -> ClickOutcome {
        if !modifiers.requests_citation() {
            return ClickOutcome::PassThrough;
        }
        let Some(Instrumentation::Citation { anchor }) = self.instrumentation(id) else {
            return ClickOutcome::PassThrough;
        };

        let resolver = self.resolver.clone();
        let host = Arc::clone(&self.host);
        ClickOutcome::Intercepted(tokio::spawn(async move {
            activate(&resolver, host.as_ref(), &anchor).await;
        }))
    }

    /// Rescan at the configured interval until `cancel` fires.
    pub async fn run(self: Arc<Self>, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.resolver.config().scan_interval());
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    self.scan();
                }
            }
        }
        tracing::debug!("link scanner stopped");
    }
}

/// Resolve `anchor` and report the outcome to the host.
pub async fn activate(resolver: &CitationResolver, host: &dyn HostPage, anchor: &str) {
    match resolver.resolve(anchor).await {
        Ok(resolved) => host.open_url(&resolved.url),
        Err(e) => {
            tracing::warn!(anchor, error = %e, "citation resolution failed");
            host.notify_error(&e.to_string());
        }
    }
}
