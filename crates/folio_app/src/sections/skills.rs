use super::{clamp_percent, reveal};
use crate::config::FolioConfig;
use crate::content::SiteContent;
use crate::controller::Choreography;
use crate::error::ConfigError;
use folio_animation::{AnimationScope, Easing, Position, Sequence, Step};
use folio_core::dom::Property;
use folio_core::observer::ObserverConfig;

/// Skill bars fill to their clamped values; always standalone
#[derive(Clone, Debug)]
pub struct SkillsChoreography {
    gate: ObserverConfig,
    stagger_ms: f32,
}

impl SkillsChoreography {
    pub fn new(gate: ObserverConfig, stagger_ms: f32) -> Self {
        Self { gate, stagger_ms }
    }

    pub fn from_config(config: &FolioConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(
            config.sections.skills.observer_config("skills")?,
            config.timing.stagger_ms,
        ))
    }
}

impl Choreography for SkillsChoreography {
    fn name(&self) -> &'static str {
        "skills"
    }

    fn gate(&self) -> ObserverConfig {
        self.gate
    }

    fn build(&self, scope: &AnimationScope, content: &SiteContent) -> Sequence {
        let mut sequence = Sequence::new().then(
            Step::fade_up(scope.select(".skill-label"), 10.0)
                .duration(400.0)
                .stagger(self.stagger_ms * 0.5),
        );

        let bars = scope.select(".skill-bar");
        for (index, (bar, skill)) in bars.into_iter().zip(&content.skills).enumerate() {
            let position = if index == 0 {
                Position::Overlap(200.0)
            } else {
                Position::WithPreviousOffset(self.stagger_ms)
            };
            sequence.push(
                Step::fill_width(bar, clamp_percent(skill.value))
                    .duration(1000.0)
                    .easing(Easing::CubicOut)
                    .at(position),
            );
        }
        sequence
    }

    fn settle(&self, scope: &mut AnimationScope, content: &SiteContent) {
        let labels = scope.select(".skill-label");
        reveal(scope, &labels);
        for (bar, skill) in scope.select(".skill-bar").into_iter().zip(&content.skills) {
            scope.set(&[bar], Property::WidthPercent, clamp_percent(skill.value));
        }
    }
}
