//! Labelled timelines
//!
//! A [`Timeline`] owns a playhead and a set of placed sequences. Labels
//! ("checkpoints") are named offsets other sequences can be inserted at, so
//! independently built sections can start at the same logical instant.
//!
//! Rendering rules:
//!
//! - On insertion, the earliest tween for each (element, property) writes its
//!   `from` value immediately, so nothing flashes in its final state before
//!   its turn comes.
//! - While the playhead is inside a tween, the tween writes its interpolated
//!   value every render.
//! - When a tween completes it writes its `to` value exactly once.
//! - Pending tweens write nothing.

use crate::easing::Easing;
use crate::sequence::{PropertyTween, Sequence};
use folio_core::dom::{Document, ElementId, Property};
use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use slotmap::{new_key_type, SlotMap};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

new_key_type! {
    /// Handle to a sequence placed on a timeline
    pub struct PlacementId;
}

/// Identifies who contributed a placement (one per animation scope)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct OwnerId(u64);

impl OwnerId {
    /// Allocate a process-unique owner id
    pub fn next() -> Self {
        static NEXT_OWNER: AtomicU64 = AtomicU64::new(1);
        Self(NEXT_OWNER.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TweenPhase {
    Pending,
    Running,
    Done,
}

#[derive(Clone, Debug)]
struct ActiveTween {
    element: ElementId,
    tween: PropertyTween,
    /// Absolute start on the owning timeline
    start: f32,
    duration: f32,
    easing: Easing,
    phase: TweenPhase,
}

impl ActiveTween {
    fn phase_at(&self, time: f32) -> TweenPhase {
        if time < self.start {
            TweenPhase::Pending
        } else if time < self.start + self.duration {
            TweenPhase::Running
        } else {
            TweenPhase::Done
        }
    }

    fn value_at(&self, time: f32) -> f32 {
        let t = if self.duration > 0.0 {
            (time - self.start) / self.duration
        } else {
            1.0
        };
        self.tween.value_at(self.easing.apply(t))
    }
}

#[derive(Debug)]
struct Placement {
    owner: Option<OwnerId>,
    origin: f32,
    end: f32,
    tweens: Vec<ActiveTween>,
}

struct TimelineInner {
    document: Document,
    labels: IndexMap<String, f32>,
    placements: SlotMap<PlacementId, Placement>,
    time: f32,
    playing: bool,
    killed: bool,
}

impl TimelineInner {
    fn duration(&self) -> f32 {
        let content = self.placements.values().map(|p| p.end).fold(0.0, f32::max);
        self.labels.values().copied().fold(content, f32::max)
    }

    fn render(&mut self) {
        let time = self.time;
        let document = &self.document;
        for placement in self.placements.values_mut() {
            for tween in placement.tweens.iter_mut() {
                let phase = tween.phase_at(time);
                let write = match (tween.phase, phase) {
                    (_, TweenPhase::Running) => Some(tween.value_at(time)),
                    (TweenPhase::Done, TweenPhase::Done) => None,
                    (_, TweenPhase::Done) => Some(tween.tween.to),
                    (TweenPhase::Pending, TweenPhase::Pending) => None,
                    (_, TweenPhase::Pending) => Some(tween.tween.from),
                };
                tween.phase = phase;
                if let Some(value) = write {
                    // Elements removed from the document are skipped silently
                    let _ = document.set_style(tween.element, tween.tween.property, value);
                }
            }
        }
    }
}

/// Shared handle to a timeline
///
/// Cloning is cheap; all clones drive the same playhead.
#[derive(Clone)]
pub struct Timeline {
    inner: Rc<RefCell<TimelineInner>>,
}

impl Timeline {
    /// Create a paused, empty timeline writing into `document`
    pub fn new(document: Document) -> Self {
        Self {
            inner: Rc::new(RefCell::new(TimelineInner {
                document,
                labels: IndexMap::new(),
                placements: SlotMap::with_key(),
                time: 0.0,
                playing: false,
                killed: false,
            })),
        }
    }

    pub fn document(&self) -> Document {
        self.inner.borrow().document.clone()
    }

    /// Whether two handles refer to the same timeline
    pub fn ptr_eq(&self, other: &Timeline) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    // =========================================================================
    // Labels
    // =========================================================================

    /// Add a label at the current end of the timeline
    pub fn add_label(&self, name: &str) -> bool {
        let end = self.duration();
        self.add_label_at(name, end)
    }

    /// Add a label at an absolute offset
    ///
    /// Labels are unique; an existing label keeps its offset and `false` is
    /// returned.
    pub fn add_label_at(&self, name: &str, time_ms: f32) -> bool {
        let mut inner = self.inner.borrow_mut();
        if inner.labels.contains_key(name) {
            tracing::warn!(label = name, "timeline label already exists; keeping original offset");
            return false;
        }
        inner.labels.insert(name.to_string(), time_ms.max(0.0));
        true
    }

    pub fn has_label(&self, name: &str) -> bool {
        self.inner.borrow().labels.contains_key(name)
    }

    pub fn label_time(&self, name: &str) -> Option<f32> {
        self.inner.borrow().labels.get(name).copied()
    }

    /// Labels in insertion order
    pub fn labels(&self) -> Vec<(String, f32)> {
        self.inner
            .borrow()
            .labels
            .iter()
            .map(|(name, time)| (name.clone(), *time))
            .collect()
    }

    // =========================================================================
    // Placement
    // =========================================================================

    /// Place `sequence` at the end of the timeline
    pub fn append(&self, sequence: &Sequence, owner: Option<OwnerId>) -> PlacementId {
        let end = self.duration();
        self.insert_at_time(end, sequence, owner)
    }

    /// Place `sequence` at the label's offset
    ///
    /// Returns `None` if the label does not exist. Every insert at the same
    /// label shares one origin. If the playhead has already passed it, the
    /// immediate render fast-forwards the sequence to the playhead.
    pub fn insert_at(
        &self,
        label: &str,
        sequence: &Sequence,
        owner: Option<OwnerId>,
    ) -> Option<PlacementId> {
        let (origin, now) = {
            let inner = self.inner.borrow();
            (*inner.labels.get(label)?, inner.time)
        };
        if origin < now {
            tracing::debug!(label, origin, now, "checkpoint already passed; joining in progress");
        }
        Some(self.insert_at_time(origin, sequence, owner))
    }

    /// Place `sequence` at an absolute offset
    pub fn insert_at_time(
        &self,
        origin: f32,
        sequence: &Sequence,
        owner: Option<OwnerId>,
    ) -> PlacementId {
        let origin = origin.max(0.0);
        let mut tweens = Vec::new();
        for (step, start) in sequence.steps().iter().zip(sequence.resolve()) {
            for (index, element) in step.targets.iter().enumerate() {
                for tween in &step.tweens {
                    tweens.push(ActiveTween {
                        element: *element,
                        tween: *tween,
                        start: origin + start + index as f32 * step.stagger_ms,
                        duration: step.duration_ms,
                        easing: step.easing,
                        phase: TweenPhase::Pending,
                    });
                }
            }
        }

        let mut inner = self.inner.borrow_mut();

        // Immediate render of starting values, earliest tween per property wins
        let mut order: Vec<usize> = (0..tweens.len()).collect();
        order.sort_by(|a, b| tweens[*a].start.total_cmp(&tweens[*b].start));
        let mut seen: FxHashSet<(ElementId, Property)> = FxHashSet::default();
        for index in order {
            let tween = &tweens[index];
            if seen.insert((tween.element, tween.tween.property)) {
                let _ = inner
                    .document
                    .set_style(tween.element, tween.tween.property, tween.tween.from);
            }
        }

        let end = origin + sequence.duration_ms();
        let id = inner.placements.insert(Placement {
            owner,
            origin,
            end,
            tweens,
        });
        tracing::trace!(?id, origin, end, "sequence placed");

        // Zero-length steps at or before the playhead settle right away
        inner.render();
        id
    }

    /// Start of a placement on this timeline
    pub fn placement_start(&self, id: PlacementId) -> Option<f32> {
        self.inner.borrow().placements.get(id).map(|p| p.origin)
    }

    pub fn placement_count(&self) -> usize {
        self.inner.borrow().placements.len()
    }

    /// Remove one placement without writing anything further
    pub fn kill_placement(&self, id: PlacementId) -> bool {
        self.inner.borrow_mut().placements.remove(id).is_some()
    }

    /// Remove every placement contributed by `owner`
    pub fn kill_owner(&self, owner: OwnerId) -> usize {
        let mut inner = self.inner.borrow_mut();
        let before = inner.placements.len();
        inner.placements.retain(|_, p| p.owner != Some(owner));
        before - inner.placements.len()
    }

    /// Remove everything and stop; the timeline ignores further ticks
    pub fn kill(&self) {
        let mut inner = self.inner.borrow_mut();
        inner.placements.clear();
        inner.playing = false;
        inner.killed = true;
    }

    pub fn is_killed(&self) -> bool {
        self.inner.borrow().killed
    }

    // =========================================================================
    // Playback
    // =========================================================================

    pub fn play(&self) {
        let mut inner = self.inner.borrow_mut();
        if !inner.killed {
            inner.playing = true;
        }
    }

    pub fn pause(&self) {
        self.inner.borrow_mut().playing = false;
    }

    pub fn is_playing(&self) -> bool {
        self.inner.borrow().playing
    }

    /// Playhead position in milliseconds
    pub fn time(&self) -> f32 {
        self.inner.borrow().time
    }

    pub fn duration(&self) -> f32 {
        self.inner.borrow().duration()
    }

    /// Playhead has reached the end of all content
    pub fn is_complete(&self) -> bool {
        let inner = self.inner.borrow();
        inner.time >= inner.duration()
    }

    /// Move the playhead and render
    pub fn seek(&self, time_ms: f32) {
        let mut inner = self.inner.borrow_mut();
        if inner.killed {
            return;
        }
        let duration = inner.duration();
        inner.time = time_ms.clamp(0.0, duration);
        inner.render();
    }

    /// Advance by `dt_ms` if playing
    ///
    /// The playhead is clamped to the duration; a playing timeline that
    /// reaches its end stays playing, so content inserted later still runs.
    /// Returns `true` while there is content left to play.
    pub fn tick(&self, dt_ms: f32) -> bool {
        let mut inner = self.inner.borrow_mut();
        if !inner.playing || inner.killed {
            return false;
        }
        let duration = inner.duration();
        if inner.time >= duration {
            return false;
        }
        inner.time = (inner.time + dt_ms.max(0.0)).min(duration);
        inner.render();
        inner.time < duration
    }
}

impl fmt::Debug for Timeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Timeline")
            .field("time", &inner.time)
            .field("duration", &inner.duration())
            .field("playing", &inner.playing)
            .field("labels", &inner.labels)
            .field("placements", &inner.placements.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::{Position, Step};
    use folio_core::dom::ElementSpec;

    fn setup() -> (Document, ElementId, ElementId) {
        let doc = Document::new();
        let a = doc.append(doc.body(), ElementSpec::new("h1")).unwrap();
        let b = doc.append(doc.body(), ElementSpec::new("p")).unwrap();
        (doc, a, b)
    }

    #[test]
    fn test_new_timeline_is_paused() {
        let (doc, a, _) = setup();
        let tl = Timeline::new(doc.clone());
        tl.append(&Sequence::new().then(Step::fade_in(vec![a]).duration(100.0)), None);

        assert!(!tl.is_playing());
        assert!(!tl.tick(50.0));
        assert_eq!(tl.time(), 0.0);
        // Immediate render applied the starting value
        assert_eq!(doc.inline_style(a, Property::Opacity), Some(0.0));
    }

    #[test]
    fn test_playback_interpolates_and_completes() {
        let (doc, a, _) = setup();
        let tl = Timeline::new(doc.clone());
        tl.append(
            &Sequence::new().then(
                Step::fade_in(vec![a])
                    .duration(100.0)
                    .easing(Easing::Linear),
            ),
            None,
        );
        tl.play();

        assert!(tl.tick(50.0));
        assert!((doc.computed_style(a, Property::Opacity) - 0.5).abs() < 1e-5);

        assert!(!tl.tick(80.0));
        assert_eq!(doc.inline_style(a, Property::Opacity), Some(1.0));
        assert!(tl.is_complete());
        assert_eq!(tl.time(), 100.0);

        // Finished tweens never write again
        let writes = doc.mutation_count();
        tl.tick(16.0);
        tl.seek(100.0);
        assert_eq!(doc.mutation_count(), writes);
    }

    #[test]
    fn test_immediate_render_uses_earliest_tween() {
        let (doc, a, _) = setup();
        let tl = Timeline::new(doc.clone());
        let seq = Sequence::new()
            .then(Step::fade_in(vec![a]).duration(100.0))
            .then(Step::new(vec![a]).tween(Property::Opacity, 1.0, 0.5));
        tl.append(&seq, None);
        assert_eq!(doc.inline_style(a, Property::Opacity), Some(0.0));
    }

    #[test]
    fn test_labels_and_insert_at() {
        let (doc, a, b) = setup();
        let tl = Timeline::new(doc);
        tl.append(&Sequence::new().then(Step::fade_in(vec![a]).duration(1000.0)), None);
        assert!(tl.add_label("hero"));
        assert!(!tl.add_label_at("hero", 5.0));
        assert_eq!(tl.label_time("hero"), Some(1000.0));

        let seq = Sequence::new().then(Step::fade_in(vec![b]));
        let first = tl.insert_at("hero", &seq, None).unwrap();
        let second = tl.insert_at("hero", &seq, None).unwrap();
        assert_eq!(tl.placement_start(first), Some(1000.0));
        assert_eq!(tl.placement_start(first), tl.placement_start(second));

        assert!(tl.insert_at("missing", &seq, None).is_none());
    }

    #[test]
    fn test_late_insert_keeps_label_origin() {
        let (doc, a, b) = setup();
        let tl = Timeline::new(doc.clone());
        tl.add_label_at("about", 200.0);
        tl.append(&Sequence::new().then(Step::fade_in(vec![a]).duration(1000.0)), None);
        tl.play();
        tl.tick(600.0);

        let seq = Sequence::new().then(
            Step::fade_in(vec![b])
                .duration(800.0)
                .easing(Easing::Linear),
        );
        let id = tl.insert_at("about", &seq, None).unwrap();
        assert_eq!(tl.placement_start(id), tl.label_time("about"));

        // Rendered at the playhead, halfway through its 200..1000 span
        assert!((doc.computed_style(b, Property::Opacity) - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_content_added_after_completion_still_plays() {
        let (doc, a, b) = setup();
        let tl = Timeline::new(doc.clone());
        tl.append(&Sequence::new().then(Step::fade_in(vec![a]).duration(100.0)), None);
        tl.play();
        tl.tick(500.0);
        assert!(tl.is_complete());

        tl.append(
            &Sequence::new().then(Step::fade_in(vec![b]).duration(100.0).easing(Easing::Linear)),
            None,
        );
        assert!(tl.tick(50.0));
        assert!((doc.computed_style(b, Property::Opacity) - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_stagger_offsets_targets() {
        let (doc, a, b) = setup();
        let tl = Timeline::new(doc.clone());
        tl.append(
            &Sequence::new().then(
                Step::fade_in(vec![a, b])
                    .duration(100.0)
                    .stagger(100.0)
                    .easing(Easing::Linear),
            ),
            None,
        );
        tl.play();
        tl.tick(100.0);
        assert_eq!(doc.inline_style(a, Property::Opacity), Some(1.0));
        assert_eq!(doc.inline_style(b, Property::Opacity), Some(0.0));
        tl.tick(100.0);
        assert_eq!(doc.inline_style(b, Property::Opacity), Some(1.0));
    }

    #[test]
    fn test_kill_owner_stops_writes() {
        let (doc, a, b) = setup();
        let tl = Timeline::new(doc.clone());
        let mine = OwnerId::next();
        let theirs = OwnerId::next();
        tl.append(&Sequence::new().then(Step::fade_in(vec![a]).duration(100.0)), Some(mine));
        tl.insert_at_time(
            0.0,
            &Sequence::new().then(Step::fade_in(vec![b]).duration(100.0).at(Position::Sequential)),
            Some(theirs),
        );
        assert_eq!(tl.kill_owner(mine), 1);
        assert_eq!(tl.placement_count(), 1);

        tl.play();
        tl.tick(150.0);
        assert_eq!(doc.inline_style(a, Property::Opacity), Some(0.0));
        assert_eq!(doc.inline_style(b, Property::Opacity), Some(1.0));
    }

    #[test]
    fn test_backward_seek_restores_from_values() {
        let (doc, a, _) = setup();
        let tl = Timeline::new(doc.clone());
        tl.append(&Sequence::new().then(Step::fade_in(vec![a]).duration(100.0)), None);
        tl.seek(100.0);
        assert_eq!(doc.inline_style(a, Property::Opacity), Some(1.0));
        tl.seek(0.0);
        // At t=0 the tween is running at progress 0
        assert_eq!(doc.inline_style(a, Property::Opacity), Some(0.0));
    }

    #[test]
    fn test_killed_timeline_ignores_play() {
        let (doc, a, _) = setup();
        let tl = Timeline::new(doc);
        tl.append(&Sequence::new().then(Step::fade_in(vec![a])), None);
        tl.kill();
        tl.play();
        assert!(!tl.is_playing());
        assert!(tl.is_killed());
        assert_eq!(tl.placement_count(), 0);
    }
}
