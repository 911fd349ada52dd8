//! Intersection observation
//!
//! A headless equivalent of the browser's intersection observer. Hosts call
//! [`ObserverHub::deliver`] whenever scroll position, viewport size or layout
//! may have changed; every observer then receives entries for targets whose
//! intersecting state changed since the last delivery. The first delivery
//! after `observe()` always produces an entry, so an element that is already
//! in view at mount time reports immediately without any scrolling.

use crate::dom::{Document, ElementId, Rect};
use crate::error::MarginError;
use slotmap::{new_key_type, SlotMap};
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::str::FromStr;

new_key_type! {
    /// Handle to a registered observer
    pub struct ObserverId;
}

/// Margin component: absolute pixels or percent of the root size
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Length {
    Px(f32),
    Percent(f32),
}

impl Length {
    fn resolve(self, basis: f32) -> f32 {
        match self {
            Length::Px(px) => px,
            Length::Percent(pct) => basis * pct / 100.0,
        }
    }

    fn parse(text: &str) -> Result<Self, MarginError> {
        let bad = || MarginError::Component(text.to_string());
        if let Some(num) = text.strip_suffix("px") {
            num.parse().map(Length::Px).map_err(|_| bad())
        } else if let Some(num) = text.strip_suffix('%') {
            num.parse().map(Length::Percent).map_err(|_| bad())
        } else if text == "0" {
            Ok(Length::Px(0.0))
        } else {
            Err(bad())
        }
    }
}

/// Root margin in CSS shorthand order (top, right, bottom, left)
///
/// Negative values shrink the root box, so `"0px 0px -100px 0px"` makes the
/// trigger line sit 100px above the bottom of the viewport.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RootMargin {
    pub top: Length,
    pub right: Length,
    pub bottom: Length,
    pub left: Length,
}

impl RootMargin {
    pub fn zero() -> Self {
        Self {
            top: Length::Px(0.0),
            right: Length::Px(0.0),
            bottom: Length::Px(0.0),
            left: Length::Px(0.0),
        }
    }

    /// Parse CSS margin shorthand with one to four components
    pub fn parse(text: &str) -> Result<Self, MarginError> {
        let parts = text
            .split_whitespace()
            .map(Length::parse)
            .collect::<Result<Vec<_>, _>>()?;

        let (top, right, bottom, left) = match parts.as_slice() {
            [all] => (*all, *all, *all, *all),
            [vertical, horizontal] => (*vertical, *horizontal, *vertical, *horizontal),
            [top, horizontal, bottom] => (*top, *horizontal, *bottom, *horizontal),
            [top, right, bottom, left] => (*top, *right, *bottom, *left),
            other => return Err(MarginError::Arity(other.len())),
        };
        Ok(Self {
            top,
            right,
            bottom,
            left,
        })
    }

    /// Apply the margin to a root rect
    pub fn apply(&self, root: Rect) -> Rect {
        root.inflate(
            self.top.resolve(root.height),
            self.right.resolve(root.width),
            self.bottom.resolve(root.height),
            self.left.resolve(root.width),
        )
    }
}

impl Default for RootMargin {
    fn default() -> Self {
        Self::zero()
    }
}

impl FromStr for RootMargin {
    type Err = MarginError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RootMargin::parse(s)
    }
}

/// Observer configuration
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ObserverConfig {
    /// Minimum visible fraction of the target, clamped into [0, 1]
    pub threshold: f32,
    pub root_margin: RootMargin,
}

impl ObserverConfig {
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold: clamp_threshold(threshold),
            root_margin: RootMargin::zero(),
        }
    }

    pub fn with_root_margin(mut self, margin: RootMargin) -> Self {
        self.root_margin = margin;
        self
    }
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self::new(0.0)
    }
}

fn clamp_threshold(threshold: f32) -> f32 {
    if threshold.is_nan() {
        0.0
    } else {
        threshold.clamp(0.0, 1.0)
    }
}

/// One observation result for one target
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IntersectionEntry {
    pub target: ElementId,
    pub is_intersecting: bool,
    /// Visible fraction of the target's box
    pub ratio: f32,
}

/// Compute the entry for a target against a (margin-adjusted) root
pub fn measure(
    document: &Document,
    target: ElementId,
    root: Rect,
    threshold: f32,
) -> IntersectionEntry {
    let not_visible = IntersectionEntry {
        target,
        is_intersecting: false,
        ratio: 0.0,
    };
    if !document.is_connected(target) {
        return not_visible;
    }
    let Some(rect) = document.rect(target) else {
        return not_visible;
    };
    let Some(overlap) = rect.intersection(&root) else {
        return not_visible;
    };

    let ratio = if rect.area() > 0.0 {
        (overlap.area() / rect.area()).clamp(0.0, 1.0)
    } else {
        1.0
    };
    IntersectionEntry {
        target,
        is_intersecting: ratio >= threshold,
        ratio,
    }
}

/// Observer callback; receives the batch and the observer that produced it
pub type ObserverCallback = Rc<dyn Fn(&[IntersectionEntry], &IntersectionObserver)>;

struct TargetRecord {
    element: ElementId,
    last: Option<bool>,
}

struct ObserverRecord {
    config: ObserverConfig,
    targets: Vec<TargetRecord>,
    callback: ObserverCallback,
}

#[derive(Default)]
struct HubInner {
    observers: SlotMap<ObserverId, ObserverRecord>,
}

/// Registry of every live observer on a page
#[derive(Clone, Default)]
pub struct ObserverHub {
    inner: Rc<RefCell<HubInner>>,
}

impl ObserverHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new observer with no targets yet
    pub fn create<F>(&self, config: ObserverConfig, callback: F) -> IntersectionObserver
    where
        F: Fn(&[IntersectionEntry], &IntersectionObserver) + 'static,
    {
        let id = self.inner.borrow_mut().observers.insert(ObserverRecord {
            config,
            targets: Vec::new(),
            callback: Rc::new(callback),
        });
        tracing::trace!(?id, threshold = config.threshold, "observer created");
        IntersectionObserver {
            id,
            hub: Rc::downgrade(&self.inner),
        }
    }

    /// Number of connected observers
    pub fn active_count(&self) -> usize {
        self.inner.borrow().observers.len()
    }

    /// Number of targets watched across all observers
    pub fn target_count(&self) -> usize {
        self.inner
            .borrow()
            .observers
            .values()
            .map(|o| o.targets.len())
            .sum()
    }

    /// Compute entries against `root` and invoke callbacks
    ///
    /// Returns the number of entries delivered. Callbacks run after the
    /// registry borrow is released, so they may freely disconnect observers
    /// (their own included).
    pub fn deliver(&self, document: &Document, root: Rect) -> usize {
        let batches: Vec<(ObserverId, ObserverCallback, Vec<IntersectionEntry>)> = {
            let mut inner = self.inner.borrow_mut();
            inner
                .observers
                .iter_mut()
                .filter_map(|(id, record)| {
                    let root = record.config.root_margin.apply(root);
                    let threshold = record.config.threshold;
                    let entries: Vec<IntersectionEntry> = record
                        .targets
                        .iter_mut()
                        .filter_map(|t| {
                            let entry = measure(document, t.element, root, threshold);
                            if t.last == Some(entry.is_intersecting) {
                                return None;
                            }
                            t.last = Some(entry.is_intersecting);
                            Some(entry)
                        })
                        .collect();
                    (!entries.is_empty()).then(|| (id, record.callback.clone(), entries))
                })
                .collect()
        };

        let mut delivered = 0;
        for (id, callback, entries) in batches {
            // An earlier callback in this batch may have disconnected us
            if !self.inner.borrow().observers.contains_key(id) {
                continue;
            }
            delivered += entries.len();
            let observer = IntersectionObserver {
                id,
                hub: Rc::downgrade(&self.inner),
            };
            callback(&entries, &observer);
        }
        if delivered > 0 {
            tracing::trace!(delivered, "intersection entries delivered");
        }
        delivered
    }

    /// Disconnect every observer (page teardown)
    pub fn clear(&self) {
        self.inner.borrow_mut().observers.clear();
    }
}

impl fmt::Debug for ObserverHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverHub")
            .field("observers", &self.active_count())
            .finish()
    }
}

/// Handle to one observer
///
/// Holds only a weak reference to the hub; operations on a handle whose hub
/// has been dropped are no-ops.
#[derive(Clone)]
pub struct IntersectionObserver {
    id: ObserverId,
    hub: Weak<RefCell<HubInner>>,
}

impl IntersectionObserver {
    pub fn id(&self) -> ObserverId {
        self.id
    }

    /// Start watching `target`; the next delivery reports its state
    pub fn observe(&self, target: ElementId) {
        if let Some(hub) = self.hub.upgrade() {
            if let Some(record) = hub.borrow_mut().observers.get_mut(self.id) {
                if !record.targets.iter().any(|t| t.element == target) {
                    record.targets.push(TargetRecord {
                        element: target,
                        last: None,
                    });
                }
            }
        }
    }

    /// Stop observing everything and unregister
    ///
    /// Safe to call any number of times, including from inside this
    /// observer's own callback. Returns `true` only for the call that
    /// actually disconnected.
    pub fn disconnect(&self) -> bool {
        let removed = self
            .hub
            .upgrade()
            .is_some_and(|hub| hub.borrow_mut().observers.remove(self.id).is_some());
        if removed {
            tracing::trace!(id = ?self.id, "observer disconnected");
        }
        removed
    }

    pub fn is_connected(&self) -> bool {
        self.hub
            .upgrade()
            .is_some_and(|hub| hub.borrow().observers.contains_key(self.id))
    }
}

impl fmt::Debug for IntersectionObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntersectionObserver")
            .field("id", &self.id)
            .field("connected", &self.is_connected())
            .finish()
    }
}
