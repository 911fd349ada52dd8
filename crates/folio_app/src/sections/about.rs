use super::{reveal, ABOUT_CHECKPOINT};
use crate::config::FolioConfig;
use crate::content::SiteContent;
use crate::controller::Choreography;
use crate::error::ConfigError;
use folio_animation::{AnimationScope, Position, Sequence, Step};
use folio_core::dom::Property;
use folio_core::observer::ObserverConfig;

/// About entrance: heading, divider draw, paragraphs, stat counters
///
/// Counters are matched to `content.stats` by position.
#[derive(Clone, Debug)]
pub struct AboutChoreography {
    gate: ObserverConfig,
    stagger_ms: f32,
}

impl AboutChoreography {
    pub fn new(gate: ObserverConfig, stagger_ms: f32) -> Self {
        Self { gate, stagger_ms }
    }

    pub fn from_config(config: &FolioConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(
            config.sections.about.observer_config("about")?,
            config.timing.stagger_ms,
        ))
    }
}

impl Choreography for AboutChoreography {
    fn name(&self) -> &'static str {
        "about"
    }

    fn checkpoint(&self) -> Option<&'static str> {
        Some(ABOUT_CHECKPOINT)
    }

    fn gate(&self) -> ObserverConfig {
        self.gate
    }

    fn build(&self, scope: &AnimationScope, content: &SiteContent) -> Sequence {
        let mut sequence = Sequence::new()
            .then(Step::fade_up(scope.select(".about-heading"), 20.0).duration(600.0))
            .then(
                Step::draw_line(scope.select(".about-divider"))
                    .duration(800.0)
                    .at(Position::Overlap(300.0)),
            )
            .then(
                Step::fade_up(scope.select(".about-paragraph"), 16.0)
                    .duration(600.0)
                    .stagger(self.stagger_ms * 1.5)
                    .at(Position::Overlap(400.0)),
            );

        let counters = scope.select(".stat-value");
        for (index, (element, stat)) in counters.into_iter().zip(&content.stats).enumerate() {
            let position = if index == 0 {
                Position::Overlap(200.0)
            } else {
                Position::WithPreviousOffset(self.stagger_ms)
            };
            sequence.push(
                Step::count_up(element, stat.value.max(0.0))
                    .duration(1500.0)
                    .at(position),
            );
        }
        sequence
    }

    fn settle(&self, scope: &mut AnimationScope, content: &SiteContent) {
        let text: Vec<_> = scope
            .select(".about-heading")
            .into_iter()
            .chain(scope.select(".about-paragraph"))
            .collect();
        let divider = scope.select(".about-divider");
        reveal(scope, &text);
        scope.set(&divider, Property::StrokeDashoffset, 0.0);

        for (element, stat) in scope.select(".stat-value").into_iter().zip(&content.stats) {
            scope.set(&[element], Property::Counter, stat.value.max(0.0));
        }
    }
}
