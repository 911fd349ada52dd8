//! Revertable animation scopes
//!
//! An [`AnimationScope`] is bound to one section root. Everything animated
//! through it (owned timelines, placements on a shared timeline, immediate
//! inline state) is recorded so [`AnimationScope::revert`] can undo all of
//! it in one call. Reverting is idempotent and also runs on drop.
//!
//! Reverting only removes what this scope contributed. Placements other
//! scopes made on a shared timeline are left alone, as are the timeline's
//! labels.

use crate::sequence::Sequence;
use crate::ticker::{Ticker, TimelineId};
use crate::timeline::{OwnerId, PlacementId, Timeline};
use folio_core::dom::{Document, ElementId, Property, Selector};
use rustc_hash::FxHashSet;
use std::fmt;

pub struct AnimationScope {
    owner: OwnerId,
    document: Document,
    root: ElementId,
    ticker: Ticker,
    timelines: Vec<(TimelineId, Timeline)>,
    placements: Vec<(Timeline, PlacementId)>,
    touched: FxHashSet<(ElementId, Property)>,
    reverted: bool,
}

impl AnimationScope {
    pub fn new(document: Document, root: ElementId, ticker: Ticker) -> Self {
        Self {
            owner: OwnerId::next(),
            document,
            root,
            ticker,
            timelines: Vec::new(),
            placements: Vec::new(),
            touched: FxHashSet::default(),
            reverted: false,
        }
    }

    pub fn owner(&self) -> OwnerId {
        self.owner
    }

    pub fn root(&self) -> ElementId {
        self.root
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Descendants of the scope root matching `selector`
    ///
    /// A malformed selector yields no targets.
    pub fn select(&self, selector: &str) -> Vec<ElementId> {
        match Selector::parse(selector) {
            Ok(selector) => self.document.select_all(self.root, &selector),
            Err(err) => {
                tracing::warn!(selector, %err, "ignoring invalid selector");
                Vec::new()
            }
        }
    }

    pub fn select_one(&self, selector: &str) -> Option<ElementId> {
        self.select(selector).into_iter().next()
    }

    /// Apply inline state immediately, without animating
    pub fn set(&mut self, targets: &[ElementId], property: Property, value: f32) {
        for target in targets {
            if self.document.set_style(*target, property, value).is_ok() {
                self.touched.insert((*target, property));
                self.reverted = false;
            }
        }
    }

    /// Create a paused timeline owned by this scope and driven by the ticker
    pub fn timeline(&mut self) -> Timeline {
        let timeline = Timeline::new(self.document.clone());
        let id = self.ticker.add(timeline.clone());
        self.timelines.push((id, timeline.clone()));
        self.reverted = false;
        timeline
    }

    /// Play `sequence` on a fresh scope-owned timeline
    pub fn play(&mut self, sequence: &Sequence) -> Timeline {
        let timeline = self.timeline();
        self.record(sequence);
        timeline.append(sequence, Some(self.owner));
        timeline.play();
        timeline
    }

    /// Insert `sequence` into another timeline at `label`
    ///
    /// Returns `None` (and records nothing) if the label is missing.
    pub fn insert_into(
        &mut self,
        timeline: &Timeline,
        label: &str,
        sequence: &Sequence,
    ) -> Option<PlacementId> {
        if !timeline.has_label(label) {
            return None;
        }
        self.record(sequence);
        let id = timeline.insert_at(label, sequence, Some(self.owner))?;
        self.placements.push((timeline.clone(), id));
        Some(id)
    }

    /// Append `sequence` to the end of another timeline
    pub fn append_to(&mut self, timeline: &Timeline, sequence: &Sequence) -> PlacementId {
        self.record(sequence);
        let id = timeline.append(sequence, Some(self.owner));
        self.placements.push((timeline.clone(), id));
        id
    }

    fn record(&mut self, sequence: &Sequence) {
        self.touched.extend(sequence.touched());
        self.reverted = false;
    }

    /// Timelines this scope created and still owns
    pub fn timelines(&self) -> impl Iterator<Item = &Timeline> + '_ {
        self.timelines.iter().map(|(_, t)| t)
    }

    /// Placements this scope made on other timelines
    pub fn placements(&self) -> impl Iterator<Item = (&Timeline, PlacementId)> + '_ {
        self.placements.iter().map(|(t, id)| (t, *id))
    }

    pub fn timeline_count(&self) -> usize {
        self.timelines.len()
    }

    /// Placements this scope made on timelines it does not own
    pub fn placement_count(&self) -> usize {
        self.placements.len()
    }

    /// Kill everything this scope started and clear the inline state it wrote
    pub fn revert(&mut self) {
        if self.reverted {
            return;
        }

        let timelines = self.timelines.len();
        for (id, timeline) in self.timelines.drain(..) {
            timeline.kill();
            self.ticker.remove(id);
        }
        let placements = self.placements.len();
        for (timeline, id) in self.placements.drain(..) {
            timeline.kill_placement(id);
        }

        let mut cleared = 0usize;
        for (element, property) in self.touched.drain() {
            if self.document.clear_style(element, property) {
                cleared += 1;
            }
        }

        tracing::debug!(
            owner = ?self.owner,
            timelines,
            placements,
            cleared,
            "animation scope reverted"
        );
        self.reverted = true;
    }

    pub fn is_reverted(&self) -> bool {
        self.reverted
    }
}

impl Drop for AnimationScope {
    fn drop(&mut self) {
        self.revert();
    }
}

impl fmt::Debug for AnimationScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationScope")
            .field("owner", &self.owner)
            .field("timelines", &self.timelines.len())
            .field("placements", &self.placements.len())
            .field("touched", &self.touched.len())
            .field("reverted", &self.reverted)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::easing::Easing;
    use crate::sequence::Step;
    use folio_core::dom::ElementSpec;

    struct Fixture {
        doc: Document,
        ticker: Ticker,
        root: ElementId,
        items: Vec<ElementId>,
    }

    fn fixture() -> Fixture {
        let doc = Document::new();
        let root = doc
            .append(doc.body(), ElementSpec::new("section").id("about"))
            .unwrap();
        let items = (0..3)
            .map(|_| doc.append(root, ElementSpec::new("p").class("item")).unwrap())
            .collect();
        Fixture {
            doc,
            ticker: Ticker::new(),
            root,
            items,
        }
    }

    #[test]
    fn test_select_is_bounded_to_root() {
        let fx = fixture();
        fx.doc
            .append(fx.doc.body(), ElementSpec::new("p").class("item"))
            .unwrap();
        let scope = AnimationScope::new(fx.doc.clone(), fx.root, fx.ticker.clone());
        assert_eq!(scope.select(".item"), fx.items);
        assert!(scope.select("..bad").is_empty());
        assert_eq!(scope.select_one("p"), Some(fx.items[0]));
    }

    #[test]
    fn test_play_registers_and_revert_cleans_up() {
        let fx = fixture();
        let mut scope = AnimationScope::new(fx.doc.clone(), fx.root, fx.ticker.clone());
        let tl = scope.play(
            &Sequence::new().then(
                Step::fade_up(fx.items.clone(), 20.0)
                    .duration(100.0)
                    .stagger(50.0)
                    .easing(Easing::Linear),
            ),
        );
        assert!(tl.is_playing());
        assert_eq!(fx.ticker.registered_count(), 1);
        fx.ticker.frame(120.0);
        assert_eq!(fx.doc.inline_style(fx.items[0], Property::Opacity), Some(1.0));

        scope.revert();
        assert!(tl.is_killed());
        assert_eq!(fx.ticker.registered_count(), 0);
        for item in &fx.items {
            assert!(fx.doc.inline_properties(*item).is_empty());
        }

        // Idempotent, and the ticker no longer touches anything
        let mutations = fx.doc.mutation_count();
        scope.revert();
        fx.ticker.frame(100.0);
        assert_eq!(fx.doc.mutation_count(), mutations);
    }

    #[test]
    fn test_insert_into_only_reverts_own_placements() {
        let fx = fixture();
        let shared = Timeline::new(fx.doc.clone());
        shared.add_label_at("hero", 0.0);

        let mut mine = AnimationScope::new(fx.doc.clone(), fx.root, fx.ticker.clone());
        let mut theirs = AnimationScope::new(fx.doc.clone(), fx.root, fx.ticker.clone());

        let first = Sequence::new().then(Step::fade_in(vec![fx.items[0]]));
        let second = Sequence::new().then(Step::fade_in(vec![fx.items[1]]));
        let a = mine.insert_into(&shared, "hero", &first);
        let b = theirs.insert_into(&shared, "hero", &second);
        assert!(a.is_some() && b.is_some());
        assert_eq!(shared.placement_start(a.unwrap()), shared.placement_start(b.unwrap()));
        assert_eq!(shared.placement_count(), 2);

        mine.revert();
        assert_eq!(shared.placement_count(), 1);
        assert!(shared.has_label("hero"));
        assert_eq!(fx.doc.inline_style(fx.items[0], Property::Opacity), None);
        assert_eq!(fx.doc.inline_style(fx.items[1], Property::Opacity), Some(0.0));
    }

    #[test]
    fn test_missing_label_records_nothing() {
        let fx = fixture();
        let shared = Timeline::new(fx.doc.clone());
        let mut scope = AnimationScope::new(fx.doc.clone(), fx.root, fx.ticker.clone());
        let seq = Sequence::new().then(Step::fade_in(fx.items.clone()));
        let placed = scope.insert_into(&shared, "about", &seq);
        assert!(placed.is_none());
        assert_eq!(scope.placement_count(), 0);
        assert_eq!(fx.doc.inline_style(fx.items[0], Property::Opacity), None);
    }

    #[test]
    fn test_set_and_drop() {
        let fx = fixture();
        {
            let mut scope = AnimationScope::new(fx.doc.clone(), fx.root, fx.ticker.clone());
            scope.set(&fx.items, Property::Opacity, 1.0);
            scope.timeline();
            assert_eq!(fx.doc.inline_style(fx.items[2], Property::Opacity), Some(1.0));
            assert_eq!(fx.ticker.registered_count(), 1);
        }
        assert_eq!(fx.doc.inline_style(fx.items[2], Property::Opacity), None);
        assert_eq!(fx.ticker.registered_count(), 0);
    }
}
