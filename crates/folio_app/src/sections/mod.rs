//! Concrete section choreographies
//!
//! Each section reads its targets from its own subtree by class name:
//!
//! | Section | Root | Targets |
//! |---|---|---|
//! | intro | `#intro` | `.intro-text`, `.curtain-panel` |
//! | navigation | `#navigation` | `.nav-bar`, `.nav-link`, `.nav-backdrop` |
//! | hero | `#hero` | `.hero-title`, `.hero-subtitle`, `.hero-cta`, `.hero-visual` |
//! | about | `#about` | `.about-heading`, `.about-divider`, `.about-paragraph`, `.stat-value` |
//! | skills | `#skills` | `.skill-label`, `.skill-bar` |
//!
//! Missing targets are not an error; the matching steps animate nothing.

mod about;
mod hero;
mod intro;
mod navigation;
mod skills;

pub use about::AboutChoreography;
pub use hero::HeroChoreography;
pub use intro::IntroChoreography;
pub use navigation::NavigationChoreography;
pub use skills::SkillsChoreography;

use folio_animation::AnimationScope;
use folio_core::dom::{ElementId, Property};

/// Checkpoint the hero and navigation entrances start at
pub const HERO_CHECKPOINT: &str = "hero";
/// Checkpoint the about entrance starts at
pub const ABOUT_CHECKPOINT: &str = "about";

/// Clamp a skill value into a fill percentage; NaN counts as zero
pub fn clamp_percent(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 100.0)
    }
}

/// Final state of a fade-up / fade-in / slide entrance
fn reveal(scope: &mut AnimationScope, targets: &[ElementId]) {
    scope.set(targets, Property::Opacity, 1.0);
    scope.set(targets, Property::TranslateY, 0.0);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_percent() {
        assert_eq!(clamp_percent(-10.0), 0.0);
        assert_eq!(clamp_percent(150.0), 100.0);
        assert_eq!(clamp_percent(42.0), 42.0);
        assert_eq!(clamp_percent(0.0), 0.0);
        assert_eq!(clamp_percent(100.0), 100.0);
        assert_eq!(clamp_percent(f32::NAN), 0.0);
        assert_eq!(clamp_percent(f32::INFINITY), 100.0);
        assert_eq!(clamp_percent(f32::NEG_INFINITY), 0.0);
    }
}
