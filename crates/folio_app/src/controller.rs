//! Section animation controllers
//!
//! Every animated section follows the same lifecycle:
//!
//! 1. Read the reduced-motion preference. If set, show the final state
//!    right away and stop.
//! 2. Watch the section root with a [`VisibilityGate`].
//! 3. The first time the gate fires, build the entrance [`Sequence`] once.
//! 4. If the shared timeline carries the section's checkpoint, insert the
//!    sequence there so it starts together with the other sections on the
//!    same cue. Otherwise play it standalone.
//! 5. On unmount, revert everything: kill tweens, clear inline styles,
//!    remove listeners and disconnect the gate.
//!
//! What differs per section lives in a [`Choreography`];
//! [`SectionController`] runs the lifecycle.

use crate::content::SiteContent;
use crate::page::{has_checkpoint, ListenerId, Page};
use folio_animation::{AnimationScope, Sequence};
use folio_core::dom::ElementId;
use folio_core::observer::ObserverConfig;
use folio_core::visibility::VisibilityGate;
use smallvec::SmallVec;
use std::fmt;
use std::rc::Rc;

/// Lifecycle phase of a [`SectionController`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ControllerPhase {
    /// Not mounted, or mounted before the root element existed
    Idle,
    /// Mounted; waiting for the section to become visible
    Waiting,
    /// Entrance inserted at a checkpoint on the shared timeline
    Synced,
    /// Entrance playing on its own timeline
    Standalone,
    /// Reduced motion: final state applied without animating
    Settled,
    TornDown,
}

impl ControllerPhase {
    /// The entrance has been started (or skipped) and will not be rebuilt
    pub fn is_started(self) -> bool {
        matches!(
            self,
            ControllerPhase::Synced | ControllerPhase::Standalone | ControllerPhase::Settled
        )
    }
}

/// Per-section entrance behaviour
pub trait Choreography {
    fn name(&self) -> &'static str;

    /// Label on the shared timeline this section wants to start at
    fn checkpoint(&self) -> Option<&'static str> {
        None
    }

    /// Visibility trigger for the section root
    fn gate(&self) -> ObserverConfig;

    /// Build the entrance sequence; called at most once per mount
    fn build(&self, scope: &AnimationScope, content: &SiteContent) -> Sequence;

    /// Apply the end state directly (reduced motion)
    fn settle(&self, scope: &mut AnimationScope, content: &SiteContent);

    /// Register page listeners for the lifetime of the mount
    fn listen(&self, _page: &Page, _scope: &mut AnimationScope) -> Vec<ListenerId> {
        Vec::new()
    }

    /// Start the built sequence
    ///
    /// The default inserts at [`checkpoint`](Choreography::checkpoint) when
    /// the shared timeline has it, and plays standalone otherwise.
    fn conduct(
        &self,
        page: &Page,
        scope: &mut AnimationScope,
        sequence: &Sequence,
    ) -> ControllerPhase {
        if let Some(label) = self.checkpoint() {
            if let Some(shared) = page.shared_timeline() {
                if has_checkpoint(&shared, label)
                    && scope.insert_into(&shared, label, sequence).is_some()
                {
                    tracing::debug!(
                        section = self.name(),
                        checkpoint = label,
                        "entrance synced to checkpoint"
                    );
                    return ControllerPhase::Synced;
                }
            }
            tracing::debug!(
                section = self.name(),
                checkpoint = label,
                "checkpoint missing; playing standalone"
            );
        }
        scope.play(sequence);
        ControllerPhase::Standalone
    }
}

/// Runs a [`Choreography`] against a page
pub struct SectionController<C> {
    choreography: C,
    content: Rc<SiteContent>,
    gate: VisibilityGate,
    scope: Option<AnimationScope>,
    listeners: SmallVec<[ListenerId; 2]>,
    root: Option<ElementId>,
    phase: ControllerPhase,
}

impl<C: Choreography> SectionController<C> {
    pub fn new(choreography: C, content: Rc<SiteContent>) -> Self {
        let gate = VisibilityGate::new(choreography.gate());
        Self {
            choreography,
            content,
            gate,
            scope: None,
            listeners: SmallVec::new(),
            root: None,
            phase: ControllerPhase::Idle,
        }
    }

    pub fn choreography(&self) -> &C {
        &self.choreography
    }

    pub fn phase(&self) -> ControllerPhase {
        self.phase
    }

    pub fn root(&self) -> Option<ElementId> {
        self.root
    }

    pub fn gate(&self) -> &VisibilityGate {
        &self.gate
    }

    pub fn scope(&self) -> Option<&AnimationScope> {
        self.scope.as_ref()
    }

    /// Offset of this section's entrance on the shared timeline
    pub fn placement_start(&self) -> Option<f32> {
        let scope = self.scope.as_ref()?;
        let (timeline, id) = scope.placements().next()?;
        timeline.placement_start(id)
    }

    /// Mount on `root`
    ///
    /// A root that is missing or not attached to the document yet makes
    /// this a no-op; mounting again later is fine.
    pub fn mount(&mut self, page: &Page, root: Option<ElementId>) -> ControllerPhase {
        if !matches!(self.phase, ControllerPhase::Idle | ControllerPhase::TornDown) {
            return self.phase;
        }
        let Some(root) = root.filter(|r| page.document().is_connected(*r)) else {
            tracing::debug!(
                section = self.choreography.name(),
                "root element not attached; skipping mount"
            );
            return self.phase;
        };

        let reduced_motion = page.env().prefers_reduced_motion();
        if self.phase == ControllerPhase::TornDown {
            self.gate = VisibilityGate::new(self.choreography.gate());
        }
        self.root = Some(root);

        let mut scope = AnimationScope::new(page.document().clone(), root, page.ticker().clone());
        self.listeners = self.choreography.listen(page, &mut scope).into_iter().collect();

        if reduced_motion {
            self.choreography.settle(&mut scope, &self.content);
            self.scope = Some(scope);
            self.phase = ControllerPhase::Settled;
            tracing::debug!(
                section = self.choreography.name(),
                "reduced motion; settled without animating"
            );
            return self.phase;
        }

        self.scope = Some(scope);
        self.gate.mount(page.observers(), Some(root));
        self.phase = ControllerPhase::Waiting;
        tracing::trace!(section = self.choreography.name(), "mounted; waiting for visibility");

        // Initial observation: a section already in view fires right away
        page.deliver_intersections();
        self.update(page)
    }

    /// Re-run the effect: starts the entrance once the gate has fired
    pub fn update(&mut self, page: &Page) -> ControllerPhase {
        if self.phase != ControllerPhase::Waiting || !self.gate.has_appeared() {
            return self.phase;
        }
        let Some(scope) = self.scope.as_mut() else {
            return self.phase;
        };

        let sequence = self.choreography.build(scope, &self.content);
        if sequence.is_empty() {
            tracing::debug!(section = self.choreography.name(), "nothing to animate");
        }
        self.phase = self.choreography.conduct(page, scope, &sequence);
        self.phase
    }

    /// Tear down everything this mount created; safe to call repeatedly
    pub fn unmount(&mut self, page: &Page) {
        if matches!(self.phase, ControllerPhase::Idle | ControllerPhase::TornDown) {
            return;
        }
        if let Some(mut scope) = self.scope.take() {
            scope.revert();
        }
        for id in self.listeners.drain(..) {
            page.remove_listener(id);
        }
        self.gate.unmount();
        self.phase = ControllerPhase::TornDown;
        tracing::debug!(section = self.choreography.name(), "section torn down");
    }
}

impl<C: Choreography> fmt::Debug for SectionController<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SectionController")
            .field("section", &self.choreography.name())
            .field("phase", &self.phase)
            .field("gate", &self.gate.phase())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_animation::Step;
    use folio_core::dom::{ElementSpec, Property, Rect};
    use folio_core::env::StaticEnvironment;
    use std::cell::Cell;

    struct Probe {
        builds: Rc<Cell<usize>>,
        checkpoint: Option<&'static str>,
    }

    impl Choreography for Probe {
        fn name(&self) -> &'static str {
            "probe"
        }

        fn checkpoint(&self) -> Option<&'static str> {
            self.checkpoint
        }

        fn gate(&self) -> ObserverConfig {
            ObserverConfig::new(0.5)
        }

        fn build(&self, scope: &AnimationScope, _content: &SiteContent) -> Sequence {
            self.builds.set(self.builds.get() + 1);
            Sequence::new().then(Step::fade_in(scope.select(".item")).duration(100.0))
        }

        fn settle(&self, scope: &mut AnimationScope, _content: &SiteContent) {
            let items = scope.select(".item");
            scope.set(&items, Property::Opacity, 1.0);
        }
    }

    fn page_with_section(env: StaticEnvironment, top: f32) -> (Page, ElementId, ElementId) {
        let page = Page::new(env);
        let doc = page.document().clone();
        let root = doc
            .append(
                doc.body(),
                ElementSpec::new("section").rect(Rect::new(0.0, top, 1280.0, 400.0)),
            )
            .unwrap();
        let item = doc
            .append(
                root,
                ElementSpec::new("p")
                    .class("item")
                    .rect(Rect::new(0.0, top, 100.0, 20.0)),
            )
            .unwrap();
        (page, root, item)
    }

    fn probe(checkpoint: Option<&'static str>) -> (Probe, Rc<Cell<usize>>) {
        let builds = Rc::new(Cell::new(0));
        (
            Probe {
                builds: Rc::clone(&builds),
                checkpoint,
            },
            builds,
        )
    }

    #[test]
    fn test_waits_for_visibility_and_builds_once() {
        let (page, root, item) = page_with_section(StaticEnvironment::desktop(), 2000.0);
        let (choreo, builds) = probe(None);
        let mut controller = SectionController::new(choreo, Rc::new(SiteContent::default()));

        assert_eq!(controller.mount(&page, Some(root)), ControllerPhase::Waiting);
        assert_eq!(builds.get(), 0);
        assert_eq!(page.document().inline_style(item, Property::Opacity), None);

        page.scroll_to(1800.0);
        assert_eq!(controller.update(&page), ControllerPhase::Standalone);
        for _ in 0..3 {
            page.scroll_to(0.0);
            page.scroll_to(1800.0);
            controller.update(&page);
        }
        assert_eq!(builds.get(), 1);
        assert_eq!(page.document().inline_style(item, Property::Opacity), Some(0.0));
    }

    #[test]
    fn test_missing_root_is_a_noop() {
        let page = Page::new(StaticEnvironment::desktop());
        let (choreo, builds) = probe(None);
        let mut controller = SectionController::new(choreo, Rc::new(SiteContent::default()));

        assert_eq!(controller.mount(&page, None), ControllerPhase::Idle);
        let detached = page.document().create(ElementSpec::new("section"));
        assert_eq!(controller.mount(&page, Some(detached)), ControllerPhase::Idle);
        assert_eq!(page.observers().active_count(), 0);
        controller.unmount(&page);
        assert_eq!(controller.phase(), ControllerPhase::Idle);
        assert_eq!(builds.get(), 0);
    }

    #[test]
    fn test_checkpoint_or_standalone() {
        let (page, root, _) = page_with_section(StaticEnvironment::desktop(), 0.0);
        let shared = page.shared_timeline().unwrap();
        shared.add_label_at("hero", 300.0);

        let (choreo, _) = probe(Some("hero"));
        let mut synced = SectionController::new(choreo, Rc::new(SiteContent::default()));
        assert_eq!(synced.mount(&page, Some(root)), ControllerPhase::Synced);
        assert_eq!(synced.placement_start(), Some(300.0));

        let (choreo, _) = probe(Some("about"));
        let mut standalone = SectionController::new(choreo, Rc::new(SiteContent::default()));
        assert_eq!(standalone.mount(&page, Some(root)), ControllerPhase::Standalone);
        let own = standalone.scope().unwrap().timelines().next().unwrap().clone();
        assert!(own.is_playing());
        assert_eq!(own.time(), 0.0);
    }

    #[test]
    fn test_reduced_motion_settles() {
        let (page, root, item) =
            page_with_section(StaticEnvironment::desktop().with_reduced_motion(true), 2000.0);
        let (choreo, builds) = probe(None);
        let mut controller = SectionController::new(choreo, Rc::new(SiteContent::default()));

        assert_eq!(controller.mount(&page, Some(root)), ControllerPhase::Settled);
        assert_eq!(builds.get(), 0);
        assert_eq!(page.observers().active_count(), 0);
        assert_eq!(page.ticker().registered_count(), 0);
        assert_eq!(page.document().inline_style(item, Property::Opacity), Some(1.0));
    }

    #[test]
    fn test_unmount_and_remount() {
        let (page, root, item) = page_with_section(StaticEnvironment::desktop(), 0.0);
        let (choreo, builds) = probe(None);
        let mut controller = SectionController::new(choreo, Rc::new(SiteContent::default()));
        controller.mount(&page, Some(root));
        page.frame(50.0);

        controller.unmount(&page);
        controller.unmount(&page);
        assert_eq!(controller.phase(), ControllerPhase::TornDown);
        assert_eq!(page.document().inline_style(item, Property::Opacity), None);
        assert_eq!(page.ticker().registered_count(), 0);

        assert_eq!(controller.mount(&page, Some(root)), ControllerPhase::Standalone);
        assert_eq!(builds.get(), 2);
    }
}
