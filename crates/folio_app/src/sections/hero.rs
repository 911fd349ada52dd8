use super::{reveal, HERO_CHECKPOINT};
use crate::config::FolioConfig;
use crate::content::SiteContent;
use crate::controller::Choreography;
use crate::error::ConfigError;
use folio_animation::{AnimationScope, Position, Sequence, Step};
use folio_core::dom::Property;
use folio_core::observer::ObserverConfig;

const CTA_FROM_SCALE: f32 = 0.8;

/// Hero entrance: headline, subtitle, call to action, visual
#[derive(Clone, Debug)]
pub struct HeroChoreography {
    gate: ObserverConfig,
}

impl HeroChoreography {
    pub fn new(gate: ObserverConfig) -> Self {
        Self { gate }
    }

    pub fn from_config(config: &FolioConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(config.sections.hero.observer_config("hero")?))
    }
}

impl Choreography for HeroChoreography {
    fn name(&self) -> &'static str {
        "hero"
    }

    fn checkpoint(&self) -> Option<&'static str> {
        Some(HERO_CHECKPOINT)
    }

    fn gate(&self) -> ObserverConfig {
        self.gate
    }

    fn build(&self, scope: &AnimationScope, _content: &SiteContent) -> Sequence {
        Sequence::new()
            .then(Step::fade_up(scope.select(".hero-title"), 40.0).duration(800.0))
            .then(
                Step::fade_up(scope.select(".hero-subtitle"), 20.0)
                    .duration(600.0)
                    .at(Position::Overlap(400.0)),
            )
            .then(
                Step::scale_in(scope.select(".hero-cta"), CTA_FROM_SCALE)
                    .duration(500.0)
                    .at(Position::Overlap(200.0)),
            )
            .then(
                Step::fade_in(scope.select(".hero-visual"))
                    .duration(1000.0)
                    .at(Position::WithPreviousOffset(-300.0)),
            )
    }

    fn settle(&self, scope: &mut AnimationScope, _content: &SiteContent) {
        let text: Vec<_> = scope
            .select(".hero-title")
            .into_iter()
            .chain(scope.select(".hero-subtitle"))
            .collect();
        let cta = scope.select(".hero-cta");
        let visual = scope.select(".hero-visual");

        reveal(scope, &text);
        scope.set(&cta, Property::Opacity, 1.0);
        scope.set(&cta, Property::Scale, 1.0);
        scope.set(&visual, Property::Opacity, 1.0);
    }
}
