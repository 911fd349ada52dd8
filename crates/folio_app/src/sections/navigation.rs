use super::{reveal, HERO_CHECKPOINT};
use crate::config::FolioConfig;
use crate::content::SiteContent;
use crate::controller::Choreography;
use crate::error::ConfigError;
use crate::page::{EventKind, ListenerId, Page, PageEvent};
use folio_animation::{AnimationScope, Position, Sequence, Step};
use folio_core::dom::Property;
use folio_core::observer::ObserverConfig;
use std::cell::Cell;

/// Navigation bar entrance plus the scrolled-backdrop toggle
#[derive(Clone, Debug)]
pub struct NavigationChoreography {
    gate: ObserverConfig,
    stagger_ms: f32,
    scroll_offset: f32,
}

impl NavigationChoreography {
    pub fn new(gate: ObserverConfig, stagger_ms: f32, scroll_offset: f32) -> Self {
        Self {
            gate,
            stagger_ms,
            scroll_offset,
        }
    }

    pub fn from_config(config: &FolioConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(
            config.sections.navigation.observer_config("navigation")?,
            config.timing.stagger_ms,
            config.navigation.scroll_offset,
        ))
    }

    pub fn scroll_offset(&self) -> f32 {
        self.scroll_offset
    }
}

impl Choreography for NavigationChoreography {
    fn name(&self) -> &'static str {
        "navigation"
    }

    fn checkpoint(&self) -> Option<&'static str> {
        Some(HERO_CHECKPOINT)
    }

    fn gate(&self) -> ObserverConfig {
        self.gate
    }

    fn build(&self, scope: &AnimationScope, _content: &SiteContent) -> Sequence {
        Sequence::new()
            .then(Step::slide_down(scope.select(".nav-bar"), 30.0).duration(600.0))
            .then(
                Step::fade_up(scope.select(".nav-link"), 10.0)
                    .duration(400.0)
                    .stagger(self.stagger_ms * 0.5)
                    .at(Position::Overlap(300.0)),
            )
    }

    fn settle(&self, scope: &mut AnimationScope, _content: &SiteContent) {
        let bar = scope.select(".nav-bar");
        let links = scope.select(".nav-link");
        reveal(scope, &bar);
        reveal(scope, &links);
    }

    fn listen(&self, page: &Page, scope: &mut AnimationScope) -> Vec<ListenerId> {
        let Some(backdrop) = scope.select_one(".nav-backdrop") else {
            return Vec::new();
        };

        let offset = self.scroll_offset;
        let scrolled = Cell::new(page.scroll_y() > offset);
        scope.set(&[backdrop], Property::Opacity, if scrolled.get() { 1.0 } else { 0.0 });

        let document = scope.document().clone();
        let id = page.add_listener(EventKind::Scroll, move |event| {
            let PageEvent::Scroll { y } = *event else {
                return;
            };
            let now = y > offset;
            if scrolled.replace(now) != now {
                let opacity = if now { 1.0 } else { 0.0 };
                let _ = document.set_style(backdrop, Property::Opacity, opacity);
                tracing::trace!(scrolled = now, "navigation backdrop toggled");
            }
        });
        vec![id]
    }
}
