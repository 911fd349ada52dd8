//! One-shot visibility gate
//!
//! Flips from "not yet seen" to "seen" the first time its element crosses the
//! configured threshold, then stops observing. It never flips back.
//!
//! State machine:
//!
//! ```text
//! Idle ──mount──▶ Observing ──first intersecting entry──▶ Triggered
//!   │                 │                                      │
//!   └──────unmount────┴──────────────unmount─────────────────┴──▶ Disconnected
//! ```

use crate::dom::ElementId;
use crate::observer::{IntersectionObserver, ObserverConfig, ObserverHub};
use std::cell::RefCell;
use std::rc::Rc;

/// Lifecycle phase of a [`VisibilityGate`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GatePhase {
    /// Not mounted yet, or mounted without an element
    Idle,
    /// Observer registered, waiting for the first intersection
    Observing,
    /// Element has appeared; the observer disconnected itself
    Triggered,
    /// Torn down by unmount
    Disconnected,
}

#[derive(Debug)]
struct GateState {
    phase: GatePhase,
    appeared: bool,
}

/// Monotonic "has appeared" flag backed by a self-disconnecting observer
pub struct VisibilityGate {
    config: ObserverConfig,
    state: Rc<RefCell<GateState>>,
    observer: Option<IntersectionObserver>,
}

impl VisibilityGate {
    pub fn new(config: ObserverConfig) -> Self {
        Self {
            config,
            state: Rc::new(RefCell::new(GateState {
                phase: GatePhase::Idle,
                appeared: false,
            })),
            observer: None,
        }
    }

    pub fn config(&self) -> ObserverConfig {
        self.config
    }

    /// Start observing `element`
    ///
    /// No-op when the element is not available yet, when the gate has
    /// already fired, or when it is already observing.
    pub fn mount(&mut self, hub: &ObserverHub, element: Option<ElementId>) {
        let Some(element) = element else {
            tracing::debug!("visibility gate: no element to observe yet");
            return;
        };
        if self.has_appeared() {
            return;
        }
        if self.observer.as_ref().is_some_and(|o| o.is_connected()) {
            return;
        }

        let state = Rc::clone(&self.state);
        let observer = hub.create(self.config, move |entries, me| {
            for entry in entries {
                if !entry.is_intersecting {
                    continue;
                }
                {
                    let mut state = state.borrow_mut();
                    if !state.appeared {
                        state.appeared = true;
                        state.phase = GatePhase::Triggered;
                        tracing::debug!(
                            target_el = ?entry.target,
                            ratio = entry.ratio,
                            "visibility gate triggered"
                        );
                    }
                }
                me.disconnect();
                break;
            }
        });
        observer.observe(element);

        self.state.borrow_mut().phase = GatePhase::Observing;
        self.observer = Some(observer);
    }

    /// Tear down; always disconnects, safe to call repeatedly
    pub fn unmount(&mut self) {
        if let Some(observer) = self.observer.take() {
            observer.disconnect();
        }
        let mut state = self.state.borrow_mut();
        if state.phase != GatePhase::Idle || state.appeared {
            state.phase = GatePhase::Disconnected;
        }
    }

    pub fn has_appeared(&self) -> bool {
        self.state.borrow().appeared
    }

    pub fn phase(&self) -> GatePhase {
        self.state.borrow().phase
    }

    /// Whether an observer is still registered for this gate
    pub fn is_observing(&self) -> bool {
        self.observer.as_ref().is_some_and(|o| o.is_connected())
    }
}

impl Drop for VisibilityGate {
    fn drop(&mut self) {
        if let Some(observer) = self.observer.take() {
            observer.disconnect();
        }
    }
}

impl std::fmt::Debug for VisibilityGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VisibilityGate")
            .field("config", &self.config)
            .field("phase", &self.phase())
            .field("appeared", &self.has_appeared())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{Document, ElementSpec, Rect};

    fn page(y: f32) -> (Document, ObserverHub, ElementId) {
        let doc = Document::new();
        let el = doc
            .append(
                doc.body(),
                ElementSpec::new("section").rect(Rect::new(0.0, y, 1000.0, 400.0)),
            )
            .unwrap();
        (doc, ObserverHub::new(), el)
    }

    fn viewport_at(scroll_y: f32) -> Rect {
        Rect::new(0.0, scroll_y, 1000.0, 800.0)
    }

    #[test]
    fn test_gate_is_monotonic() {
        let (doc, hub, el) = page(1500.0);
        let mut gate = VisibilityGate::new(ObserverConfig::new(0.2));
        gate.mount(&hub, Some(el));
        assert_eq!(gate.phase(), GatePhase::Observing);

        let mut history = Vec::new();
        for scroll in [0.0, 400.0, 900.0, 0.0, 3000.0, 1200.0, 0.0] {
            hub.deliver(&doc, viewport_at(scroll));
            history.push(gate.has_appeared());
        }

        // false until first crossing, then true forever
        assert_eq!(
            history,
            vec![false, false, true, true, true, true, true]
        );
        let flips = history.windows(2).filter(|w| w[0] != w[1]).count();
        assert_eq!(flips, 1);
        assert_eq!(gate.phase(), GatePhase::Triggered);
        assert!(!gate.is_observing());
        assert_eq!(hub.active_count(), 0);
    }

    #[test]
    fn test_gate_fires_immediately_when_already_visible() {
        let (doc, hub, el) = page(100.0);
        let mut gate = VisibilityGate::new(ObserverConfig::new(0.3));
        gate.mount(&hub, Some(el));

        hub.deliver(&doc, viewport_at(0.0));
        assert!(gate.has_appeared());
    }

    #[test]
    fn test_gate_without_element_is_noop() {
        let hub = ObserverHub::new();
        let mut gate = VisibilityGate::new(ObserverConfig::default());
        gate.mount(&hub, None);
        assert_eq!(gate.phase(), GatePhase::Idle);
        assert_eq!(hub.active_count(), 0);

        gate.unmount();
        assert_eq!(gate.phase(), GatePhase::Idle);
    }

    #[test]
    fn test_unmount_before_appearing_disconnects() {
        let (doc, hub, el) = page(5000.0);
        let mut gate = VisibilityGate::new(ObserverConfig::new(0.1));
        gate.mount(&hub, Some(el));
        assert_eq!(hub.active_count(), 1);

        gate.unmount();
        gate.unmount();
        assert_eq!(hub.active_count(), 0);
        assert_eq!(gate.phase(), GatePhase::Disconnected);

        hub.deliver(&doc, viewport_at(5000.0));
        assert!(!gate.has_appeared());
    }

    #[test]
    fn test_remount_after_trigger_does_not_observe_again() {
        let (doc, hub, el) = page(0.0);
        let mut gate = VisibilityGate::new(ObserverConfig::new(0.1));
        gate.mount(&hub, Some(el));
        hub.deliver(&doc, viewport_at(0.0));
        assert!(gate.has_appeared());

        gate.mount(&hub, Some(el));
        assert_eq!(hub.active_count(), 0);
        assert!(!gate.is_observing());
    }

    #[test]
    fn test_drop_disconnects() {
        let (_doc, hub, el) = page(5000.0);
        {
            let mut gate = VisibilityGate::new(ObserverConfig::new(0.1));
            gate.mount(&hub, Some(el));
            assert_eq!(hub.active_count(), 1);
        }
        assert_eq!(hub.active_count(), 0);
    }
}
