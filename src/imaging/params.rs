//! Parameter types for image re-encoding.
//!
//! These describe *what* to produce. The backend decides *how*.

/// File extension of every re-encoded image.
pub const OUTPUT_EXTENSION: &str = "avif";

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(u8);

impl Quality {
    pub fn new(value: u8) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(80)
    }
}

/// A named responsive width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Breakpoint {
    pub name: &'static str,
    pub width: u32,
}

/// Responsive tiers, narrowest first.
pub const BREAKPOINTS: [Breakpoint; 4] = [
    Breakpoint {
        name: "mobile",
        width: 480,
    },
    Breakpoint {
        name: "tablet",
        width: 768,
    },
    Breakpoint {
        name: "desktop",
        width: 1024,
    },
    Breakpoint {
        name: "wide",
        width: 1920,
    },
];

/// Full specification for one optimize call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptimizeParams {
    pub quality: Quality,
    pub breakpoints: Vec<Breakpoint>,
}

impl OptimizeParams {
    pub fn new(quality: Quality) -> Self {
        Self {
            quality,
            breakpoints: BREAKPOINTS.to_vec(),
        }
    }
}

impl Default for OptimizeParams {
    fn default() -> Self {
        Self::new(Quality::default())
    }
}
