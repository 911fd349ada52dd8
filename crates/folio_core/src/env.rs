//! Execution environment facts
//!
//! Everything the choreography layer needs to know about where it runs:
//! whether a browser window exists at all, the user's reduced-motion
//! preference, the viewport size, and what the graphics stack can do.
//! All of these are read-only from the point of view of this crate.

use std::cell::Cell;
use std::fmt;

/// Viewport size in logical (CSS) pixels
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 800.0)
    }
}

/// Result of attempting to create a hardware 3D rendering context
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WebGlProbe {
    /// No context could be created
    Unavailable,
    /// A context exists; `renderer` is the unmasked renderer string when the
    /// debug-info extension is exposed
    Available { renderer: Option<String> },
}

impl WebGlProbe {
    pub fn is_available(&self) -> bool {
        matches!(self, WebGlProbe::Available { .. })
    }

    pub fn renderer(&self) -> Option<&str> {
        match self {
            WebGlProbe::Available { renderer } => renderer.as_deref(),
            WebGlProbe::Unavailable => None,
        }
    }
}

/// Read-only view of the execution context
pub trait Environment {
    /// `false` during server rendering (no window / document globals)
    fn has_window(&self) -> bool;

    /// `prefers-reduced-motion: reduce`
    fn prefers_reduced_motion(&self) -> bool;

    fn viewport(&self) -> Viewport;

    /// Try to create a 3D rendering context and report what was found
    fn probe_webgl(&self) -> WebGlProbe;

    /// Whether a 2D canvas drawing context can be created
    fn supports_canvas_2d(&self) -> bool;
}

/// Environment with fixed facts
///
/// The viewport is interior-mutable so a host (or a test) can simulate a
/// resize after components have already mounted.
///
/// ```rust
/// use folio_core::env::{Environment, StaticEnvironment, Viewport};
///
/// let env = StaticEnvironment::desktop().with_reduced_motion(true);
/// assert!(env.has_window());
/// assert!(env.prefers_reduced_motion());
///
/// env.set_viewport(Viewport::new(400.0, 800.0));
/// assert_eq!(env.viewport().width, 400.0);
/// ```
pub struct StaticEnvironment {
    window: bool,
    reduced_motion: bool,
    viewport: Cell<Viewport>,
    webgl: WebGlProbe,
    canvas_2d: bool,
}

impl StaticEnvironment {
    /// Desktop browser with a hardware GPU
    pub fn desktop() -> Self {
        Self {
            window: true,
            reduced_motion: false,
            viewport: Cell::new(Viewport::new(1280.0, 800.0)),
            webgl: WebGlProbe::Available {
                renderer: Some("ANGLE (NVIDIA GeForce RTX 3060 Direct3D11)".to_string()),
            },
            canvas_2d: true,
        }
    }

    /// Phone-sized browser (hardware GPU present)
    pub fn mobile() -> Self {
        Self::desktop().with_viewport(Viewport::new(390.0, 844.0))
    }

    /// Server rendering: no window, nothing can be probed
    pub fn server() -> Self {
        Self {
            window: false,
            reduced_motion: false,
            viewport: Cell::new(Viewport::new(0.0, 0.0)),
            webgl: WebGlProbe::Unavailable,
            canvas_2d: false,
        }
    }

    pub fn with_reduced_motion(mut self, reduced: bool) -> Self {
        self.reduced_motion = reduced;
        self
    }

    pub fn with_viewport(self, viewport: Viewport) -> Self {
        self.viewport.set(viewport);
        self
    }

    pub fn with_webgl(mut self, webgl: WebGlProbe) -> Self {
        self.webgl = webgl;
        self
    }

    pub fn with_canvas_2d(mut self, supported: bool) -> Self {
        self.canvas_2d = supported;
        self
    }

    /// Change the viewport after construction (simulated resize)
    pub fn set_viewport(&self, viewport: Viewport) {
        self.viewport.set(viewport);
    }
}

impl Default for StaticEnvironment {
    fn default() -> Self {
        Self::desktop()
    }
}

impl Environment for StaticEnvironment {
    fn has_window(&self) -> bool {
        self.window
    }

    fn prefers_reduced_motion(&self) -> bool {
        self.window && self.reduced_motion
    }

    fn viewport(&self) -> Viewport {
        self.viewport.get()
    }

    fn probe_webgl(&self) -> WebGlProbe {
        self.webgl.clone()
    }

    fn supports_canvas_2d(&self) -> bool {
        self.window && self.canvas_2d
    }
}

impl fmt::Debug for StaticEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticEnvironment")
            .field("window", &self.window)
            .field("reduced_motion", &self.reduced_motion)
            .field("viewport", &self.viewport.get())
            .field("webgl", &self.webgl)
            .field("canvas_2d", &self.canvas_2d)
            .finish()
    }
}
