//! Declarative animation sequences
//!
//! A [`Sequence`] is an ordered list of [`Step`]s. Each step says *where* it
//! starts relative to the steps before it ([`Position`]), never at an absolute
//! clock time. The same sequence can therefore be played on its own or
//! spliced into a shared timeline at a checkpoint without rewriting offsets.
//!
//! # Example
//!
//! ```rust
//! use folio_animation::{Position, Sequence, Step};
//! use folio_core::dom::{Document, ElementSpec};
//!
//! let doc = Document::new();
//! let title = doc.append(doc.body(), ElementSpec::new("h1")).unwrap();
//! let subtitle = doc.append(doc.body(), ElementSpec::new("p")).unwrap();
//!
//! let seq = Sequence::new()
//!     .then(Step::fade_up(vec![title], 40.0).duration(800.0))
//!     .then(Step::fade_up(vec![subtitle], 20.0).duration(600.0).at(Position::Overlap(400.0)));
//!
//! assert_eq!(seq.resolve(), vec![0.0, 400.0]);
//! assert_eq!(seq.duration_ms(), 1000.0);
//! ```

use crate::easing::Easing;
use folio_core::dom::{ElementId, Property};
use smallvec::SmallVec;

/// Where a step starts, relative to what came before it
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Position {
    /// When everything added so far has finished
    #[default]
    Sequential,
    /// `ms` after everything added so far has finished
    Gap(f32),
    /// `ms` before everything added so far has finished
    Overlap(f32),
    /// Together with the previous step
    WithPrevious,
    /// `ms` after the previous step starts
    WithPreviousOffset(f32),
}

/// One property interpolated from `from` to `to`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PropertyTween {
    pub property: Property,
    pub from: f32,
    pub to: f32,
}

impl PropertyTween {
    pub fn new(property: Property, from: f32, to: f32) -> Self {
        Self { property, from, to }
    }

    pub fn value_at(&self, eased: f32) -> f32 {
        self.from + (self.to - self.from) * eased
    }
}

/// A group of targets animated together, optionally staggered
#[derive(Clone, Debug)]
pub struct Step {
    pub targets: Vec<ElementId>,
    pub tweens: SmallVec<[PropertyTween; 2]>,
    pub duration_ms: f32,
    pub easing: Easing,
    /// Delay between consecutive targets
    pub stagger_ms: f32,
    pub position: Position,
}

impl Step {
    pub fn new(targets: Vec<ElementId>) -> Self {
        Self {
            targets,
            tweens: SmallVec::new(),
            duration_ms: 600.0,
            easing: Easing::default(),
            stagger_ms: 0.0,
            position: Position::Sequential,
        }
    }

    pub fn tween(mut self, property: Property, from: f32, to: f32) -> Self {
        self.tweens.push(PropertyTween::new(property, from, to));
        self
    }

    pub fn duration(mut self, ms: f32) -> Self {
        self.duration_ms = ms.max(0.0);
        self
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn stagger(mut self, ms: f32) -> Self {
        self.stagger_ms = ms.max(0.0);
        self
    }

    pub fn at(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    /// Time from the first target's start to the last target's end
    pub fn span_ms(&self) -> f32 {
        let staggered = self.targets.len().saturating_sub(1) as f32 * self.stagger_ms;
        staggered + self.duration_ms
    }

    // =========================================================================
    // Presets
    // =========================================================================

    /// Fade in while rising `distance` pixels
    pub fn fade_up(targets: Vec<ElementId>, distance: f32) -> Self {
        Self::new(targets)
            .tween(Property::Opacity, 0.0, 1.0)
            .tween(Property::TranslateY, distance, 0.0)
    }

    pub fn fade_in(targets: Vec<ElementId>) -> Self {
        Self::new(targets).tween(Property::Opacity, 0.0, 1.0)
    }

    /// Fade in while growing from `from_scale`
    pub fn scale_in(targets: Vec<ElementId>, from_scale: f32) -> Self {
        Self::new(targets)
            .tween(Property::Opacity, 0.0, 1.0)
            .tween(Property::Scale, from_scale, 1.0)
            .easing(Easing::BackOut)
    }

    /// Slide in from above by `distance` pixels
    pub fn slide_down(targets: Vec<ElementId>, distance: f32) -> Self {
        Self::new(targets)
            .tween(Property::Opacity, 0.0, 1.0)
            .tween(Property::TranslateY, -distance, 0.0)
    }

    /// Draw a stroke from hidden to fully drawn
    pub fn draw_line(targets: Vec<ElementId>) -> Self {
        Self::new(targets)
            .tween(Property::StrokeDashoffset, 100.0, 0.0)
            .easing(Easing::CubicInOut)
    }

    /// Count a single counter up from zero
    pub fn count_up(target: ElementId, value: f32) -> Self {
        Self::new(vec![target])
            .tween(Property::Counter, 0.0, value)
            .easing(Easing::QuartOut)
    }

    /// Fill a bar from empty to `percent`
    pub fn fill_width(target: ElementId, percent: f32) -> Self {
        Self::new(vec![target]).tween(Property::WidthPercent, 0.0, percent)
    }
}

/// Ordered list of steps with relative offsets
#[derive(Clone, Debug, Default)]
pub struct Sequence {
    steps: Vec<Step>,
}

impl Sequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style append
    pub fn then(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    pub fn push(&mut self, step: Step) {
        self.steps.push(step);
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Start offset of every step, relative to the sequence origin
    pub fn resolve(&self) -> Vec<f32> {
        let mut starts = Vec::with_capacity(self.steps.len());
        let mut prev_start = 0.0f32;
        let mut end = 0.0f32;

        for step in &self.steps {
            let start = match step.position {
                Position::Sequential => end,
                Position::Gap(ms) => end + ms,
                Position::Overlap(ms) => (end - ms).max(0.0),
                Position::WithPrevious => prev_start,
                Position::WithPreviousOffset(ms) => (prev_start + ms).max(0.0),
            };
            starts.push(start);
            prev_start = start;
            end = end.max(start + step.span_ms());
        }
        starts
    }

    /// End of the last staggered target
    pub fn duration_ms(&self) -> f32 {
        self.resolve()
            .iter()
            .zip(&self.steps)
            .map(|(start, step)| start + step.span_ms())
            .fold(0.0, f32::max)
    }

    /// Every (element, property) pair this sequence writes
    pub fn touched(&self) -> Vec<(ElementId, Property)> {
        let mut out: Vec<(ElementId, Property)> = Vec::new();
        for step in &self.steps {
            for target in &step.targets {
                for tween in &step.tweens {
                    let key = (*target, tween.property);
                    if !out.contains(&key) {
                        out.push(key);
                    }
                }
            }
        }
        out
    }
}
