//! Skills showcase
//!
//! The heaviest widget on the page. It probes the device once on mount and
//! renders one of three strategies for its whole lifetime:
//!
//! - **3D**: skills as nodes on a sphere, linked to the other nodes of the
//!   same category
//! - **2D canvas**: one horizontal bar per skill
//! - **Static grid**: plain tiles, no canvas at all
//!
//! Until the probe has run it renders a neutral placeholder.

use crate::content::{SiteContent, Skill};
use crate::sections::clamp_percent;
use folio_core::capability::{CapabilityDecision, CapabilityGate, CapabilityPolicy, Use2DReason};
use folio_core::env::Environment;
use std::f32::consts::PI;

/// Sphere radius in scene units
const CLOUD_RADIUS: f32 = 1.0;
const NODE_MIN_SIZE: f32 = 0.02;
const NODE_SIZE_RANGE: f32 = 0.06;

#[derive(Clone, Debug, PartialEq)]
pub struct CloudNode {
    pub name: String,
    pub category: String,
    pub position: [f32; 3],
    /// Node size, grows with the skill percentage
    pub size: f32,
    pub percent: f32,
}

/// Skill nodes on a sphere plus line segments between related nodes
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PointCloud {
    pub nodes: Vec<CloudNode>,
    /// Index pairs into `nodes`, `a < b`
    pub segments: Vec<(usize, usize)>,
}

impl PointCloud {
    pub fn build(skills: &[Skill]) -> Self {
        let count = skills.len();
        // Golden-angle spiral spreads points evenly over the sphere
        let golden_angle = PI * (3.0 - 5.0f32.sqrt());

        let nodes: Vec<CloudNode> = skills
            .iter()
            .enumerate()
            .map(|(i, skill)| {
                let y = if count > 1 {
                    1.0 - 2.0 * i as f32 / (count - 1) as f32
                } else {
                    0.0
                };
                let ring = (1.0 - y * y).max(0.0).sqrt();
                let theta = golden_angle * i as f32;
                let percent = clamp_percent(skill.value);

                CloudNode {
                    name: skill.name.clone(),
                    category: skill.category.clone(),
                    position: [
                        CLOUD_RADIUS * ring * theta.cos(),
                        CLOUD_RADIUS * y,
                        CLOUD_RADIUS * ring * theta.sin(),
                    ],
                    size: NODE_MIN_SIZE + NODE_SIZE_RANGE * percent / 100.0,
                    percent,
                }
            })
            .collect();

        let mut segments = Vec::new();
        for a in 0..nodes.len() {
            for b in (a + 1)..nodes.len() {
                if nodes[a].category == nodes[b].category {
                    segments.push((a, b));
                }
            }
        }

        Self { nodes, segments }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Bar {
    pub name: String,
    pub percent: f32,
}

/// 2D canvas rendering: one bar per skill
#[derive(Clone, Debug, PartialEq)]
pub struct Bars {
    pub reason: Use2DReason,
    pub bars: Vec<Bar>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Tile {
    pub name: String,
    pub category: String,
    pub percent: f32,
}

/// Static, canvas-free rendering
#[derive(Clone, Debug, PartialEq)]
pub struct Tiles(pub Vec<Tile>);

/// What the showcase renders right now
#[derive(Clone, Debug, PartialEq)]
pub enum ShowcaseView {
    Placeholder,
    Scene3D(PointCloud),
    Canvas2D(Bars),
    StaticGrid(Tiles),
}

/// Capability-gated skills visualisation
#[derive(Debug, Default)]
pub struct SkillsShowcase {
    gate: CapabilityGate,
}

impl SkillsShowcase {
    pub fn new(policy: CapabilityPolicy) -> Self {
        Self {
            gate: CapabilityGate::new(policy),
        }
    }

    /// Probe (first call only) and render
    pub fn mount(&mut self, env: &dyn Environment, content: &SiteContent) -> ShowcaseView {
        self.gate.mount(env);
        self.view(content)
    }

    pub fn decision(&self) -> CapabilityDecision {
        self.gate.decision()
    }

    pub fn gate(&self) -> &CapabilityGate {
        &self.gate
    }

    /// Render for the committed decision
    pub fn view(&self, content: &SiteContent) -> ShowcaseView {
        match self.gate.decision() {
            CapabilityDecision::Checking => ShowcaseView::Placeholder,
            CapabilityDecision::Use3D => ShowcaseView::Scene3D(PointCloud::build(&content.skills)),
            CapabilityDecision::Use2D(reason) => ShowcaseView::Canvas2D(Bars {
                reason,
                bars: content
                    .skills
                    .iter()
                    .map(|s| Bar {
                        name: s.name.clone(),
                        percent: s.percent(),
                    })
                    .collect(),
            }),
            CapabilityDecision::UseFallback => ShowcaseView::StaticGrid(Tiles(
                content
                    .skills
                    .iter()
                    .map(|s| Tile {
                        name: s.name.clone(),
                        category: s.category.clone(),
                        percent: s.percent(),
                    })
                    .collect(),
            )),
        }
    }
}
