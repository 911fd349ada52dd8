//! Frame ticker
//!
//! Drives every registered timeline once per display frame, the way a
//! `requestAnimationFrame` loop would. The host calls [`Ticker::frame`] with
//! the elapsed time since the previous frame.
//!
//! Timelines are registered explicitly and stay registered until removed;
//! a timeline that finishes is not dropped so it can pick up content
//! inserted later.
//!
//! # Suspension
//!
//! While the page is hidden (background tab) the ticker can be suspended.
//! Frames delivered while suspended are dropped, and the first frame after
//! resuming does not try to catch up on the hidden period. This is
//! independent of component teardown.

use crate::timeline::Timeline;
use slotmap::{new_key_type, SlotMap};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

new_key_type! {
    /// Handle to a timeline registered with a [`Ticker`]
    pub struct TimelineId;
}

/// Frames longer than this are treated as a stall
const DEFAULT_LAG_THRESHOLD_MS: f32 = 500.0;
/// Step used in place of a stalled frame
const DEFAULT_LAG_STEP_MS: f32 = 33.0;

struct TickerInner {
    timelines: SlotMap<TimelineId, Timeline>,
    suspended: bool,
    frames: u64,
    dropped_frames: u64,
    lag_threshold_ms: f32,
    lag_step_ms: f32,
}

/// Shared frame driver
#[derive(Clone)]
pub struct Ticker {
    inner: Rc<RefCell<TickerInner>>,
}

impl Ticker {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(TickerInner {
                timelines: SlotMap::with_key(),
                suspended: false,
                frames: 0,
                dropped_frames: 0,
                lag_threshold_ms: DEFAULT_LAG_THRESHOLD_MS,
                lag_step_ms: DEFAULT_LAG_STEP_MS,
            })),
        }
    }

    /// Configure lag smoothing: frames longer than `threshold_ms` advance
    /// animations by `step_ms` instead
    pub fn set_lag_smoothing(&self, threshold_ms: f32, step_ms: f32) {
        let mut inner = self.inner.borrow_mut();
        inner.lag_threshold_ms = threshold_ms.max(0.0);
        inner.lag_step_ms = step_ms.max(0.0);
    }

    pub fn add(&self, timeline: Timeline) -> TimelineId {
        self.inner.borrow_mut().timelines.insert(timeline)
    }

    pub fn remove(&self, id: TimelineId) -> Option<Timeline> {
        self.inner.borrow_mut().timelines.remove(id)
    }

    pub fn contains(&self, id: TimelineId) -> bool {
        self.inner.borrow().timelines.contains_key(id)
    }

    pub fn registered_count(&self) -> usize {
        self.inner.borrow().timelines.len()
    }

    /// Advance all registered timelines by one frame
    ///
    /// Returns `true` if any timeline still has content to play.
    pub fn frame(&self, dt_ms: f32) -> bool {
        let (timelines, dt) = {
            let mut inner = self.inner.borrow_mut();
            if inner.suspended {
                inner.dropped_frames += 1;
                return false;
            }
            inner.frames += 1;
            let dt = if dt_ms > inner.lag_threshold_ms {
                tracing::trace!(dt_ms, "frame stall; applying lag smoothing");
                inner.lag_step_ms
            } else {
                dt_ms.max(0.0)
            };
            let timelines: Vec<Timeline> = inner.timelines.values().cloned().collect();
            (timelines, dt)
        };

        // Ticking happens without holding the registry borrow
        let mut active = false;
        for timeline in timelines {
            active |= timeline.tick(dt);
        }
        active
    }

    /// Whether any registered timeline is playing and unfinished
    pub fn has_active_animations(&self) -> bool {
        self.inner
            .borrow()
            .timelines
            .values()
            .any(|t| t.is_playing() && !t.is_complete())
    }

    /// Pause or resume frame processing (tab visibility)
    pub fn set_suspended(&self, suspended: bool) {
        let mut inner = self.inner.borrow_mut();
        if inner.suspended != suspended {
            tracing::debug!(suspended, "ticker suspension changed");
        }
        inner.suspended = suspended;
    }

    pub fn is_suspended(&self) -> bool {
        self.inner.borrow().suspended
    }

    /// Frames processed so far
    pub fn frame_count(&self) -> u64 {
        self.inner.borrow().frames
    }

    /// Frames dropped while suspended
    pub fn dropped_frame_count(&self) -> u64 {
        self.inner.borrow().dropped_frames
    }

    /// Unregister every timeline
    pub fn clear(&self) {
        self.inner.borrow_mut().timelines.clear();
    }
}

impl Default for Ticker {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Ticker")
            .field("timelines", &inner.timelines.len())
            .field("suspended", &inner.suspended)
            .field("frames", &inner.frames)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::easing::Easing;
    use crate::sequence::{Sequence, Step};
    use folio_core::dom::{Document, ElementSpec, Property};

    fn playing_timeline(doc: &Document, duration: f32) -> (Timeline, folio_core::dom::ElementId) {
        let el = doc.append(doc.body(), ElementSpec::new("div")).unwrap();
        let tl = Timeline::new(doc.clone());
        tl.append(
            &Sequence::new().then(
                Step::fade_in(vec![el])
                    .duration(duration)
                    .easing(Easing::Linear),
            ),
            None,
        );
        tl.play();
        (tl, el)
    }

    #[test]
    fn test_ticker_drives_timelines() {
        let doc = Document::new();
        let ticker = Ticker::new();
        let (tl, el) = playing_timeline(&doc, 100.0);
        let id = ticker.add(tl.clone());

        assert!(ticker.has_active_animations());
        assert!(ticker.frame(40.0));
        assert!((doc.computed_style(el, Property::Opacity) - 0.4).abs() < 1e-5);
        assert!(!ticker.frame(100.0));
        assert!(!ticker.has_active_animations());

        // Finished timelines remain registered
        assert!(ticker.contains(id));
        assert!(ticker.remove(id).is_some());
        assert_eq!(ticker.registered_count(), 0);
    }

    #[test]
    fn test_suspended_frames_are_dropped() {
        let doc = Document::new();
        let ticker = Ticker::new();
        let (tl, _) = playing_timeline(&doc, 1000.0);
        ticker.add(tl.clone());

        ticker.frame(100.0);
        ticker.set_suspended(true);
        assert!(!ticker.frame(100.0));
        assert!(!ticker.frame(100.0));
        assert_eq!(tl.time(), 100.0);
        assert_eq!(ticker.dropped_frame_count(), 2);

        ticker.set_suspended(false);
        ticker.frame(16.0);
        assert_eq!(tl.time(), 116.0);
    }

    #[test]
    fn test_lag_smoothing() {
        let doc = Document::new();
        let ticker = Ticker::new();
        let (tl, _) = playing_timeline(&doc, 10_000.0);
        ticker.add(tl.clone());

        ticker.frame(5_000.0);
        assert_eq!(tl.time(), DEFAULT_LAG_STEP_MS);

        ticker.set_lag_smoothing(10_000.0, 16.0);
        ticker.frame(5_000.0);
        assert_eq!(tl.time(), DEFAULT_LAG_STEP_MS + 5_000.0);
    }

    #[test]
    fn test_paused_timeline_is_not_advanced() {
        let doc = Document::new();
        let ticker = Ticker::new();
        let (tl, _) = playing_timeline(&doc, 100.0);
        tl.pause();
        ticker.add(tl.clone());
        assert!(!ticker.frame(50.0));
        assert_eq!(tl.time(), 0.0);
        assert_eq!(ticker.frame_count(), 1);
    }
}
