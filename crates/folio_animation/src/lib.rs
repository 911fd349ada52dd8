//! Folio Animation System
//!
//! Relative-offset sequences, labelled timelines, and revertable scopes.
//!
//! # Features
//!
//! - **Sequences**: ordered steps positioned relative to each other, never
//!   at absolute clock times
//! - **Timelines**: playheads with named labels (checkpoints) that other
//!   sequences can be inserted at
//! - **Ticker**: per-frame driver with tab-visibility suspension
//! - **Scopes**: record everything a section animates so it can be undone
//!   in one call

pub mod easing;
pub mod scope;
pub mod sequence;
pub mod ticker;
pub mod timeline;

pub use easing::Easing;
pub use scope::AnimationScope;
pub use sequence::{Position, PropertyTween, Sequence, Step};
pub use ticker::{Ticker, TimelineId};
pub use timeline::{OwnerId, PlacementId, Timeline};
