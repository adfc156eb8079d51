//! Responsive configuration types and the compiled-in default

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Design-time base resolution. Immutable once the config is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub name: String,
    pub width: f64,
    pub height: f64,
    pub alias: String,
}

impl Viewport {
    pub fn new(name: &str, width: f64, height: f64, alias: &str) -> Self {
        Self {
            name: name.to_string(),
            width,
            height,
            alias: alias.to_string(),
        }
    }
}

/// A target device class. Same shape as [`Viewport`]; one breakpoint in the
/// configured list must equal the base viewport (the identity breakpoint).
pub type Breakpoint = Viewport;

/// Per-token scaling adjustments applied on top of the linear viewport ratio.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TokenRule {
    pub scale: f64,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub step: Option<f64>,
}

impl TokenRule {
    pub fn new(scale: f64) -> Self {
        Self {
            scale,
            min: None,
            max: None,
            step: None,
        }
    }

    pub fn with_min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn with_max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    pub fn with_step(mut self, step: f64) -> Self {
        self.step = Some(step);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoundingMode {
    Nearest,
    Up,
    Down,
}

/// Global rounding applied after token adjustments; a precision of 0.5 snaps
/// values to the nearest half pixel. Precision 0 disables rounding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoundingRule {
    pub mode: RoundingMode,
    pub precision: f64,
}

impl Default for RoundingRule {
    fn default() -> Self {
        Self {
            mode: RoundingMode::Nearest,
            precision: 0.5,
        }
    }
}

/// Which viewport dimension drives the linear scaling ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalingOrigin {
    Width,
    Height,
    Area,
    Diagonal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalingStrategy {
    pub origin: ScalingOrigin,
    pub tokens: HashMap<String, TokenRule>,
    pub rounding: RoundingRule,
}

/// Aggregate responsive configuration: one base viewport, an ordered list of
/// breakpoints, and the scaling strategy. Read-only for the duration of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponsiveConfig {
    pub base_viewport: Viewport,
    pub breakpoints: Vec<Breakpoint>,
    pub strategy: ScalingStrategy,
}

impl ResponsiveConfig {
    /// True when the given breakpoint is the identity breakpoint (equal to
    /// the base viewport). Identity breakpoints are excluded from generated
    /// per-breakpoint overrides.
    pub fn is_base(&self, breakpoint: &Breakpoint) -> bool {
        *breakpoint == self.base_viewport
    }

    pub fn token_rule(&self, token: &str) -> Option<&TokenRule> {
        self.strategy.tokens.get(token)
    }
}

impl Default for ResponsiveConfig {
    fn default() -> Self {
        default_config()
    }
}

/// The compiled-in default configuration: a 1920x1080 desktop design base
/// with mobile/tablet/laptop/desktop target breakpoints and token rules for
/// the common semantic categories.
pub fn default_config() -> ResponsiveConfig {
    let mut tokens = HashMap::new();
    tokens.insert(
        "fontSize".to_string(),
        TokenRule::new(1.0).with_min(12.0).with_max(96.0),
    );
    tokens.insert(
        "spacing".to_string(),
        TokenRule::new(1.0).with_min(2.0).with_step(2.0),
    );
    tokens.insert(
        "radius".to_string(),
        TokenRule::new(1.0).with_min(1.0).with_max(48.0),
    );
    tokens.insert(
        "shadows".to_string(),
        TokenRule::new(0.85).with_min(0.5),
    );

    ResponsiveConfig {
        base_viewport: Viewport::new("desktop", 1920.0, 1080.0, "xl"),
        breakpoints: vec![
            Viewport::new("mobile", 375.0, 667.0, "sm"),
            Viewport::new("tablet", 768.0, 1024.0, "md"),
            Viewport::new("laptop", 1366.0, 768.0, "lg"),
            Viewport::new("desktop", 1920.0, 1080.0, "xl"),
        ],
        strategy: ScalingStrategy {
            origin: ScalingOrigin::Width,
            tokens,
            rounding: RoundingRule::default(),
        },
    }
}
