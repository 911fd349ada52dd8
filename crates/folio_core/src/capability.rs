//! Device capability probing
//!
//! Picks one rendering strategy for a visually heavy widget: a full 3D
//! scene, a lightweight 2D canvas, or a static non-canvas layout. The probe
//! runs once per mount and its decision never changes afterwards, even if the
//! viewport is resized.

use crate::env::{Environment, WebGlProbe};
use std::fmt;

/// Why the lightweight 2D path was chosen
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Use2DReason {
    /// No browser globals (server rendering)
    Ssr,
    /// Viewport narrower than the mobile breakpoint
    Mobile,
    /// No hardware-accelerated 3D context (missing, or a software rasterizer)
    NoWebGl,
}

impl Use2DReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Use2DReason::Ssr => "ssr",
            Use2DReason::Mobile => "mobile",
            Use2DReason::NoWebGl => "no-webgl",
        }
    }
}

impl fmt::Display for Use2DReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rendering strategy for a capability-gated widget
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CapabilityDecision {
    /// Probe has not run yet; render a neutral placeholder
    Checking,
    Use3D,
    Use2D(Use2DReason),
    /// Even 2D drawing is unsupported; render static markup
    UseFallback,
}

impl CapabilityDecision {
    pub fn is_resolved(self) -> bool {
        !matches!(self, CapabilityDecision::Checking)
    }

    pub fn reason(self) -> Option<Use2DReason> {
        match self {
            CapabilityDecision::Use2D(reason) => Some(reason),
            _ => None,
        }
    }
}

impl fmt::Display for CapabilityDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CapabilityDecision::Checking => f.write_str("checking"),
            CapabilityDecision::Use3D => f.write_str("use3D"),
            CapabilityDecision::Use2D(reason) => write!(f, "use2D ({reason})"),
            CapabilityDecision::UseFallback => f.write_str("useFallback"),
        }
    }
}

/// Measured facts behind a decision
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CapabilityFacts {
    pub is_mobile: bool,
    pub webgl_available: bool,
    pub software_renderer: bool,
    pub canvas_2d: bool,
}

/// Tunables for the probe
#[derive(Clone, Debug, PartialEq)]
pub struct CapabilityPolicy {
    /// Widths strictly below this are treated as mobile
    pub mobile_breakpoint: f32,
    /// Lowercase substrings identifying software rasterizers
    pub software_signatures: Vec<String>,
}

impl CapabilityPolicy {
    pub fn is_software_renderer(&self, renderer: &str) -> bool {
        let renderer = renderer.to_ascii_lowercase();
        self.software_signatures
            .iter()
            .any(|sig| renderer.contains(&sig.to_ascii_lowercase()))
    }
}

impl Default for CapabilityPolicy {
    fn default() -> Self {
        Self {
            mobile_breakpoint: 768.0,
            software_signatures: [
                "swiftshader",
                "llvmpipe",
                "softpipe",
                "software",
                "microsoft basic render",
                "mesa offscreen",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

/// Evaluate the environment once
pub fn probe(
    env: &dyn Environment,
    policy: &CapabilityPolicy,
) -> (CapabilityDecision, CapabilityFacts) {
    let mut facts = CapabilityFacts::default();

    if !env.has_window() {
        return (CapabilityDecision::Use2D(Use2DReason::Ssr), facts);
    }

    facts.canvas_2d = env.supports_canvas_2d();
    facts.is_mobile = env.viewport().width < policy.mobile_breakpoint;

    let decision = if facts.is_mobile {
        CapabilityDecision::Use2D(Use2DReason::Mobile)
    } else {
        match env.probe_webgl() {
            WebGlProbe::Unavailable => CapabilityDecision::Use2D(Use2DReason::NoWebGl),
            WebGlProbe::Available { renderer } => {
                facts.webgl_available = true;
                facts.software_renderer = renderer
                    .as_deref()
                    .is_some_and(|r| policy.is_software_renderer(r));
                if facts.software_renderer {
                    CapabilityDecision::Use2D(Use2DReason::NoWebGl)
                } else {
                    CapabilityDecision::Use3D
                }
            }
        }
    };

    // Baseline 2D support is checked independently and overrides everything
    if !facts.canvas_2d {
        return (CapabilityDecision::UseFallback, facts);
    }
    (decision, facts)
}

/// Per-instance capability decision, resolved exactly once
#[derive(Debug)]
pub struct CapabilityGate {
    policy: CapabilityPolicy,
    decision: CapabilityDecision,
    facts: Option<CapabilityFacts>,
}

impl CapabilityGate {
    pub fn new(policy: CapabilityPolicy) -> Self {
        Self {
            policy,
            decision: CapabilityDecision::Checking,
            facts: None,
        }
    }

    /// Run the probe if it has not run yet
    ///
    /// Returns the committed decision. Calling again (for example after a
    /// resize) returns the same decision without probing.
    pub fn mount(&mut self, env: &dyn Environment) -> CapabilityDecision {
        if self.decision.is_resolved() {
            return self.decision;
        }
        let (decision, facts) = probe(env, &self.policy);
        tracing::debug!(%decision, ?facts, "capability decision committed");
        self.decision = decision;
        self.facts = Some(facts);
        decision
    }

    pub fn decision(&self) -> CapabilityDecision {
        self.decision
    }

    pub fn facts(&self) -> Option<CapabilityFacts> {
        self.facts
    }
}

impl Default for CapabilityGate {
    fn default() -> Self {
        Self::new(CapabilityPolicy::default())
    }
}
