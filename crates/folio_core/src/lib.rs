//! Folio Core
//!
//! Headless building blocks for scroll-driven page choreography:
//!
//! - **Environment**: read-only execution facts (window present, reduced
//!   motion, viewport, graphics capability)
//! - **Document**: element tree with layout rects and inline style overrides
//! - **Intersection observation**: threshold and root-margin aware observers
//! - **Visibility gate**: one-shot "has appeared" flag that disconnects itself
//! - **Capability gate**: once-per-mount 3D / 2D / static strategy selection
//!
//! # Example
//!
//! ```rust
//! use folio_core::dom::{Document, ElementSpec, Rect};
//! use folio_core::observer::{ObserverConfig, ObserverHub};
//! use folio_core::visibility::VisibilityGate;
//!
//! let doc = Document::new();
//! let hero = doc
//!     .append(doc.body(), ElementSpec::new("section").rect(Rect::new(0.0, 0.0, 1280.0, 700.0)))
//!     .unwrap();
//!
//! let hub = ObserverHub::new();
//! let mut gate = VisibilityGate::new(ObserverConfig::new(0.2));
//! gate.mount(&hub, Some(hero));
//!
//! // Already in view at mount: the first delivery fires the gate
//! hub.deliver(&doc, Rect::new(0.0, 0.0, 1280.0, 800.0));
//! assert!(gate.has_appeared());
//! ```

pub mod capability;
pub mod dom;
pub mod env;
pub mod error;
pub mod observer;
pub mod visibility;

pub use capability::{
    probe, CapabilityDecision, CapabilityFacts, CapabilityGate, CapabilityPolicy, Use2DReason,
};
pub use dom::{Document, ElementId, ElementSpec, Property, Rect, Selector};
pub use env::{Environment, StaticEnvironment, Viewport, WebGlProbe};
pub use error::{DomError, MarginError, Result};
pub use observer::{
    IntersectionEntry, IntersectionObserver, Length, ObserverConfig, ObserverHub, ObserverId,
    RootMargin,
};
pub use visibility::{GatePhase, VisibilityGate};
