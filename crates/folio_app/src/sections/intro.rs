use super::{ABOUT_CHECKPOINT, HERO_CHECKPOINT};
use crate::config::FolioConfig;
use crate::content::SiteContent;
use crate::controller::{Choreography, ControllerPhase};
use crate::error::ConfigError;
use crate::page::Page;
use folio_animation::{AnimationScope, Easing, Position, Sequence, Step};
use folio_core::dom::Property;
use folio_core::observer::ObserverConfig;

/// Delay between the hero and about checkpoints
const ABOUT_LAG_MS: f32 = 400.0;

/// Opening curtain; owns the master cue
///
/// Plays the curtain on the shared timeline, then places the `"hero"` and
/// `"about"` checkpoints after it so the other sections start on cue.
#[derive(Clone, Debug)]
pub struct IntroChoreography {
    gate: ObserverConfig,
    curtain_ms: f32,
    stagger_ms: f32,
}

impl IntroChoreography {
    pub fn new(gate: ObserverConfig, curtain_ms: f32, stagger_ms: f32) -> Self {
        Self {
            gate,
            curtain_ms,
            stagger_ms,
        }
    }

    pub fn from_config(config: &FolioConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(
            config.sections.intro.observer_config("intro")?,
            config.timing.curtain_ms,
            config.timing.stagger_ms,
        ))
    }

    /// How far the curtain panels travel
    fn lift(scope: &AnimationScope) -> f32 {
        scope
            .document()
            .rect(scope.root())
            .map_or(0.0, |r| r.height)
    }
}

impl Choreography for IntroChoreography {
    fn name(&self) -> &'static str {
        "intro"
    }

    fn gate(&self) -> ObserverConfig {
        self.gate
    }

    fn build(&self, scope: &AnimationScope, _content: &SiteContent) -> Sequence {
        let text = scope.select(".intro-text");
        let panels = scope.select(".curtain-panel");

        Sequence::new()
            .then(Step::fade_in(text.clone()).duration(400.0))
            .then(
                Step::new(text)
                    .tween(Property::Opacity, 1.0, 0.0)
                    .duration(300.0)
                    .at(Position::Gap(200.0)),
            )
            .then(
                Step::new(panels)
                    .tween(Property::TranslateY, 0.0, -Self::lift(scope))
                    .duration(self.curtain_ms)
                    .stagger(self.stagger_ms)
                    .easing(Easing::CubicInOut)
                    .at(Position::Overlap(150.0)),
            )
    }

    fn settle(&self, scope: &mut AnimationScope, _content: &SiteContent) {
        let text = scope.select(".intro-text");
        let panels = scope.select(".curtain-panel");
        let lift = Self::lift(scope);
        scope.set(&text, Property::Opacity, 0.0);
        scope.set(&panels, Property::TranslateY, -lift);
    }

    fn conduct(
        &self,
        page: &Page,
        scope: &mut AnimationScope,
        sequence: &Sequence,
    ) -> ControllerPhase {
        let Some(shared) = page.shared_timeline() else {
            scope.play(sequence);
            return ControllerPhase::Standalone;
        };

        scope.append_to(&shared, sequence);
        shared.add_label(HERO_CHECKPOINT);
        let hero_at = shared.label_time(HERO_CHECKPOINT).unwrap_or_else(|| shared.duration());
        shared.add_label_at(ABOUT_CHECKPOINT, hero_at + ABOUT_LAG_MS);
        shared.play();

        tracing::info!(hero_at, "intro curtain started; checkpoints placed");
        ControllerPhase::Synced
    }
}
