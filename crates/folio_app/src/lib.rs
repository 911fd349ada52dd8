//! Folio Page Runtime
//!
//! Scroll-driven entrance choreography for a portfolio page: a page-wide
//! shared timeline with named checkpoints, per-section controllers that wait
//! for visibility and either sync to a checkpoint or play standalone, and a
//! capability-gated skills showcase.
//!
//! # Example
//!
//! ```rust
//! use folio_app::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let page = Page::new(StaticEnvironment::desktop());
//!     let mut site = Site::new(page, &FolioConfig::default(), SiteContent::sample())?;
//!     site.mount();
//!
//!     // Hero and navigation start together on the intro's "hero" cue
//!     assert_eq!(site.hero().phase(), ControllerPhase::Synced);
//!     assert_eq!(site.hero().placement_start(), site.navigation().placement_start());
//!
//!     site.scroll_to(600.0);
//!     while site.frame(16.0) {}
//!     site.unmount();
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod content;
pub mod controller;
mod error;
pub mod logging;
pub mod page;
pub mod sections;
pub mod showcase;
pub mod site;


pub use config::FolioConfig;
pub use content::{SiteContent, Skill, Stat};
pub use controller::{Choreography, ControllerPhase, SectionController};
pub use error::{ConfigError, ContentError, FolioError, Result};
pub use page::{
    current_page, get_shared_timeline, has_checkpoint, insert_at, install_page, uninstall_page,
    EventKind, Page, PageEvent,
};
pub use showcase::{ShowcaseView, SkillsShowcase};
pub use site::{Site, SiteLayout};

/// Prelude module - import everything commonly needed
pub mod prelude {
    pub use crate::config::FolioConfig;
    pub use crate::content::SiteContent;
    pub use crate::controller::{Choreography, ControllerPhase, SectionController};
    pub use crate::error::{FolioError, Result};
    pub use crate::page::{get_shared_timeline, Page};
    pub use crate::showcase::ShowcaseView;
    pub use crate::site::Site;

    // Core types
    pub use folio_animation::{AnimationScope, Position, Sequence, Step, Timeline};
    pub use folio_core::{CapabilityDecision, ElementId, Property, StaticEnvironment};
}
