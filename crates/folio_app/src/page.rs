//! The page (window) and its shared timeline
//!
//! A [`Page`] plays the role of the browser's window object: it holds the
//! environment facts, the document, every intersection observer, the frame
//! ticker, the scroll position and event listeners. It also holds the one
//! shared timeline sections use to synchronise their entrances.
//!
//! The shared timeline is created lazily on first access, paused, and lives
//! as long as the page. Without a window (server rendering) there is no
//! shared timeline and callers run standalone.
//!
//! # Current page
//!
//! Components that are not handed a page explicitly can reach the current
//! one through a thread-local slot:
//!
//! ```rust
//! use folio_app::page::{get_shared_timeline, install_page, uninstall_page, Page};
//! use folio_core::env::StaticEnvironment;
//!
//! install_page(Page::new(StaticEnvironment::desktop()));
//! let a = get_shared_timeline().unwrap();
//! let b = get_shared_timeline().unwrap();
//! assert!(a.ptr_eq(&b));
//! assert!(!a.is_playing());
//! uninstall_page();
//!
//! assert!(get_shared_timeline().is_none());
//! ```

use folio_animation::{PlacementId, Sequence, Ticker, Timeline};
use folio_core::dom::{Document, Rect};
use folio_core::env::{Environment, Viewport};
use folio_core::observer::ObserverHub;
use slotmap::{new_key_type, SlotMap};
use std::cell::{Cell, OnceCell, RefCell};
use std::fmt;
use std::rc::Rc;

new_key_type! {
    /// Handle to a registered page event listener
    pub struct ListenerId;
}

/// Event kinds listeners can subscribe to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    Scroll,
    Resize,
    VisibilityChange,
}

/// Page-level event
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PageEvent {
    Scroll { y: f32 },
    Resize { width: f32, height: f32 },
    VisibilityChange { hidden: bool },
}

impl PageEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            PageEvent::Scroll { .. } => EventKind::Scroll,
            PageEvent::Resize { .. } => EventKind::Resize,
            PageEvent::VisibilityChange { .. } => EventKind::VisibilityChange,
        }
    }
}

pub type Listener = Rc<dyn Fn(&PageEvent)>;

struct PageInner {
    env: Rc<dyn Environment>,
    document: Document,
    observers: ObserverHub,
    ticker: Ticker,
    scroll_y: Cell<f32>,
    viewport: Cell<Viewport>,
    hidden: Cell<bool>,
    listeners: RefCell<SlotMap<ListenerId, (EventKind, Listener)>>,
    shared_timeline: OnceCell<Timeline>,
}

/// Cheap-clone handle to a page
#[derive(Clone)]
pub struct Page {
    inner: Rc<PageInner>,
}

impl Page {
    pub fn new(env: impl Environment + 'static) -> Self {
        Self::with_env(Rc::new(env))
    }

    pub fn with_env(env: Rc<dyn Environment>) -> Self {
        let viewport = env.viewport();
        Self {
            inner: Rc::new(PageInner {
                env,
                document: Document::new(),
                observers: ObserverHub::new(),
                ticker: Ticker::new(),
                scroll_y: Cell::new(0.0),
                viewport: Cell::new(viewport),
                hidden: Cell::new(false),
                listeners: RefCell::new(SlotMap::with_key()),
                shared_timeline: OnceCell::new(),
            }),
        }
    }

    pub fn env(&self) -> &dyn Environment {
        self.inner.env.as_ref()
    }

    pub fn document(&self) -> &Document {
        &self.inner.document
    }

    pub fn observers(&self) -> &ObserverHub {
        &self.inner.observers
    }

    pub fn ticker(&self) -> &Ticker {
        &self.inner.ticker
    }

    pub fn ptr_eq(&self, other: &Page) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// The page-wide timeline, created paused on first access
    ///
    /// `None` when there is no window.
    pub fn shared_timeline(&self) -> Option<Timeline> {
        if !self.inner.env.has_window() {
            return None;
        }
        let timeline = self.inner.shared_timeline.get_or_init(|| {
            let timeline = Timeline::new(self.inner.document.clone());
            self.inner.ticker.add(timeline.clone());
            tracing::debug!("shared timeline created");
            timeline
        });
        Some(timeline.clone())
    }

    /// Whether the shared timeline has been created yet
    pub fn has_shared_timeline(&self) -> bool {
        self.inner.shared_timeline.get().is_some()
    }

    // =========================================================================
    // Geometry
    // =========================================================================

    pub fn scroll_y(&self) -> f32 {
        self.inner.scroll_y.get()
    }

    pub fn viewport(&self) -> Viewport {
        self.inner.viewport.get()
    }

    /// The visible area in document coordinates
    pub fn viewport_rect(&self) -> Rect {
        let viewport = self.viewport();
        Rect::new(0.0, self.scroll_y(), viewport.width, viewport.height)
    }

    /// Compute and deliver pending intersection entries
    pub fn deliver_intersections(&self) -> usize {
        self.inner
            .observers
            .deliver(&self.inner.document, self.viewport_rect())
    }

    // =========================================================================
    // Events
    // =========================================================================

    pub fn add_listener<F>(&self, kind: EventKind, listener: F) -> ListenerId
    where
        F: Fn(&PageEvent) + 'static,
    {
        self.inner
            .listeners
            .borrow_mut()
            .insert((kind, Rc::new(listener)))
    }

    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.inner.listeners.borrow_mut().remove(id).is_some()
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    fn dispatch(&self, event: PageEvent) {
        let kind = event.kind();
        // Listeners may add or remove listeners while running
        let listeners: Vec<Listener> = self
            .inner
            .listeners
            .borrow()
            .values()
            .filter(|(k, _)| *k == kind)
            .map(|(_, l)| Rc::clone(l))
            .collect();
        for listener in listeners {
            listener(&event);
        }
    }

    /// Scroll to `y`, notify listeners, and deliver intersections
    pub fn scroll_to(&self, y: f32) {
        let y = y.max(0.0);
        self.inner.scroll_y.set(y);
        self.dispatch(PageEvent::Scroll { y });
        self.deliver_intersections();
    }

    pub fn resize(&self, width: f32, height: f32) {
        self.inner.viewport.set(Viewport::new(width, height));
        self.dispatch(PageEvent::Resize { width, height });
        self.deliver_intersections();
    }

    /// Tab visibility; hidden pages drop animation frames
    pub fn set_hidden(&self, hidden: bool) {
        if self.inner.hidden.replace(hidden) == hidden {
            return;
        }
        self.inner.ticker.set_suspended(hidden);
        self.dispatch(PageEvent::VisibilityChange { hidden });
    }

    pub fn is_hidden(&self) -> bool {
        self.inner.hidden.get()
    }

    /// Advance animations by one frame
    pub fn frame(&self, dt_ms: f32) -> bool {
        self.inner.ticker.frame(dt_ms)
    }

    /// Full page reload
    ///
    /// Everything attached to this page is torn down; the returned page
    /// shares only the environment.
    pub fn reload(&self) -> Page {
        self.inner.observers.clear();
        self.inner.ticker.clear();
        self.inner.listeners.borrow_mut().clear();
        if let Some(timeline) = self.inner.shared_timeline.get() {
            timeline.kill();
        }
        tracing::debug!("page reloaded");
        Page::with_env(Rc::clone(&self.inner.env))
    }
}

impl fmt::Debug for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Page")
            .field("scroll_y", &self.scroll_y())
            .field("viewport", &self.viewport())
            .field("hidden", &self.is_hidden())
            .field("listeners", &self.listener_count())
            .field("observers", &self.inner.observers.active_count())
            .field("shared_timeline", &self.has_shared_timeline())
            .finish()
    }
}

// =============================================================================
// Current page
// =============================================================================

std::thread_local! {
    static CURRENT_PAGE: RefCell<Option<Page>> = const { RefCell::new(None) };
}

/// Make `page` the current page for this thread
pub fn install_page(page: Page) {
    CURRENT_PAGE.with(|p| *p.borrow_mut() = Some(page));
}

pub fn uninstall_page() {
    CURRENT_PAGE.with(|p| *p.borrow_mut() = None);
}

pub fn current_page() -> Option<Page> {
    CURRENT_PAGE.with(|p| p.borrow().clone())
}

/// Shared timeline of the current page
///
/// `None` without an installed page or without a window; callers then run
/// standalone.
pub fn get_shared_timeline() -> Option<Timeline> {
    current_page().and_then(|page| page.shared_timeline())
}

pub fn has_checkpoint(timeline: &Timeline, label: &str) -> bool {
    timeline.has_label(label)
}

/// Splice `sequence` into `timeline` at `label`, if the label exists
pub fn insert_at(timeline: &Timeline, sequence: &Sequence, label: &str) -> Option<PlacementId> {
    timeline.insert_at(label, sequence, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_animation::Step;
    use folio_core::dom::{ElementSpec, Property};
    use folio_core::env::StaticEnvironment;

    #[test]
    fn test_shared_timeline_is_memoized_and_paused() {
        let page = Page::new(StaticEnvironment::desktop());
        assert!(!page.has_shared_timeline());
        let a = page.shared_timeline().unwrap();
        let b = page.shared_timeline().unwrap();
        assert!(a.ptr_eq(&b));
        assert!(!a.is_playing());
        assert_eq!(page.ticker().registered_count(), 1);
    }

    #[test]
    fn test_no_shared_timeline_without_window() {
        let page = Page::new(StaticEnvironment::server());
        assert!(page.shared_timeline().is_none());
        assert!(!page.has_shared_timeline());

        install_page(page);
        assert!(current_page().is_some());
        assert!(get_shared_timeline().is_none());
        uninstall_page();
        assert!(current_page().is_none());
    }

    #[test]
    fn test_checkpoint_helpers() {
        let page = Page::new(StaticEnvironment::desktop());
        let timeline = page.shared_timeline().unwrap();
        let el = page
            .document()
            .append(page.document().body(), ElementSpec::new("h1"))
            .unwrap();
        let seq = Sequence::new().then(Step::fade_in(vec![el]));

        assert!(!has_checkpoint(&timeline, "hero"));
        assert!(insert_at(&timeline, &seq, "hero").is_none());

        timeline.add_label_at("hero", 250.0);
        assert!(has_checkpoint(&timeline, "hero"));
        let id = insert_at(&timeline, &seq, "hero").unwrap();
        assert_eq!(timeline.placement_start(id), Some(250.0));
        assert_eq!(page.document().inline_style(el, Property::Opacity), Some(0.0));
    }

    #[test]
    fn test_listeners_dispatch_by_kind() {
        let page = Page::new(StaticEnvironment::desktop());
        let seen = Rc::new(RefCell::new(Vec::new()));

        let sink = Rc::clone(&seen);
        let id = page.add_listener(EventKind::Scroll, move |e| sink.borrow_mut().push(*e));
        page.resize(1000.0, 700.0);
        page.scroll_to(120.0);
        page.scroll_to(-5.0);

        assert_eq!(
            *seen.borrow(),
            vec![PageEvent::Scroll { y: 120.0 }, PageEvent::Scroll { y: 0.0 }]
        );
        assert_eq!(page.viewport(), Viewport::new(1000.0, 700.0));

        assert!(page.remove_listener(id));
        assert!(!page.remove_listener(id));
        page.scroll_to(300.0);
        assert_eq!(seen.borrow().len(), 2);
    }

    #[test]
    fn test_hidden_page_suspends_ticker() {
        let page = Page::new(StaticEnvironment::desktop());
        let timeline = page.shared_timeline().unwrap();
        let el = page
            .document()
            .append(page.document().body(), ElementSpec::new("div"))
            .unwrap();
        timeline.append(&Sequence::new().then(Step::fade_in(vec![el]).duration(1000.0)), None);
        timeline.play();

        page.frame(100.0);
        page.set_hidden(true);
        assert!(page.ticker().is_suspended());
        page.frame(100.0);
        assert_eq!(timeline.time(), 100.0);

        page.set_hidden(false);
        page.frame(50.0);
        assert_eq!(timeline.time(), 150.0);
    }

    #[test]
    fn test_reload_starts_fresh() {
        let page = Page::new(StaticEnvironment::desktop());
        let old = page.shared_timeline().unwrap();
        old.add_label("hero");
        page.add_listener(EventKind::Resize, |_| {});

        let fresh = page.reload();
        assert!(old.is_killed());
        assert_eq!(page.listener_count(), 0);
        assert_eq!(page.ticker().registered_count(), 0);

        assert!(!fresh.ptr_eq(&page));
        assert!(!fresh.has_shared_timeline());
        assert!(!fresh.shared_timeline().unwrap().has_label("hero"));
    }
}
