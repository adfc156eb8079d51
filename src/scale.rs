//! Viewport scaling engine
//!
//! Computes the value a `rre()` base resolves to at a given breakpoint:
//! linear viewport ratio, token-specific scale factor, min/max clamps, step
//! quantization, then global rounding. The checked entry point reports
//! configuration inconsistencies and arithmetic failures as distinct error
//! kinds; the public entry point degrades fail-open to the unscaled base
//! value with a warning.

use crate::config::{Breakpoint, ResponsiveConfig, RoundingMode, ScalingOrigin, Viewport};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScaleError {
    #[error("viewport '{name}' has a non-positive {dimension} dimension")]
    InvalidViewport { name: String, dimension: String },

    #[error("token rule for '{token}' is inconsistent: {message}")]
    InvalidTokenRule { token: String, message: String },

    #[error("scaling {base_value} for breakpoint '{breakpoint}' produced a non-finite result")]
    NonFinite { base_value: f64, breakpoint: String },
}

/// Scale `base_value` from the configured base viewport to `breakpoint`,
/// returning the unscaled input when anything goes wrong. Identical inputs
/// always produce identical output for a fixed configuration.
pub fn scale(
    config: &ResponsiveConfig,
    base_value: f64,
    breakpoint: &Breakpoint,
    token: Option<&str>,
) -> f64 {
    match scale_checked(config, base_value, breakpoint, token) {
        Ok(scaled) => scaled,
        Err(err) => {
            log::warn!(
                "scaling fell back to the unscaled value {}: {}",
                base_value,
                err
            );
            base_value
        }
    }
}

/// The fallible core of [`scale`]; exposed so callers and tests can tell the
/// failure kinds apart even though they all degrade the same way.
pub fn scale_checked(
    config: &ResponsiveConfig,
    base_value: f64,
    breakpoint: &Breakpoint,
    token: Option<&str>,
) -> Result<f64, ScaleError> {
    let ratio = viewport_ratio(
        &config.base_viewport,
        breakpoint,
        config.strategy.origin,
    )?;

    let mut scaled = base_value * ratio;

    if let Some(rule) = token.and_then(|name| config.token_rule(name)) {
        let token_name = token.unwrap_or_default();

        if let (Some(min), Some(max)) = (rule.min, rule.max) {
            if min > max {
                return Err(ScaleError::InvalidTokenRule {
                    token: token_name.to_string(),
                    message: format!("min {} exceeds max {}", min, max),
                });
            }
        }
        if let Some(step) = rule.step {
            if step <= 0.0 || !step.is_finite() {
                return Err(ScaleError::InvalidTokenRule {
                    token: token_name.to_string(),
                    message: format!("step {} is not positive", step),
                });
            }
        }

        // The token's own scale factor supersedes the pure ratio rather
        // than compounding with the ratio-scaled value.
        scaled = base_value * rule.scale * ratio;

        if let Some(min) = rule.min {
            if scaled < min {
                scaled = min;
            }
        }
        if let Some(max) = rule.max {
            if scaled > max {
                scaled = max;
            }
        }
        if let Some(step) = rule.step {
            scaled = (scaled / step).round() * step;
        }
    }

    let rounding = config.strategy.rounding;
    if rounding.precision > 0.0 {
        scaled = match rounding.mode {
            RoundingMode::Nearest => (scaled / rounding.precision).round() * rounding.precision,
            RoundingMode::Up => (scaled / rounding.precision).ceil() * rounding.precision,
            RoundingMode::Down => (scaled / rounding.precision).floor() * rounding.precision,
        };
    }

    if !scaled.is_finite() {
        return Err(ScaleError::NonFinite {
            base_value,
            breakpoint: breakpoint.name.clone(),
        });
    }

    Ok(scaled)
}

fn viewport_ratio(
    base: &Viewport,
    target: &Breakpoint,
    origin: ScalingOrigin,
) -> Result<f64, ScaleError> {
    check_viewport(base)?;
    check_viewport(target)?;

    let ratio = match origin {
        ScalingOrigin::Width => target.width / base.width,
        ScalingOrigin::Height => target.height / base.height,
        ScalingOrigin::Area => (target.width * target.height) / (base.width * base.height),
        ScalingOrigin::Diagonal => {
            let target_diag = (target.width * target.width + target.height * target.height).sqrt();
            let base_diag = (base.width * base.width + base.height * base.height).sqrt();
            target_diag / base_diag
        }
    };

    Ok(ratio)
}

fn check_viewport(viewport: &Viewport) -> Result<(), ScaleError> {
    for (dimension, size) in [("width", viewport.width), ("height", viewport.height)] {
        if !(size.is_finite() && size > 0.0) {
            return Err(ScaleError::InvalidViewport {
                name: viewport.name.clone(),
                dimension: dimension.to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{default_config, TokenRule, Viewport};

    fn breakpoint<'a>(config: &'a ResponsiveConfig, name: &str) -> &'a Breakpoint {
        config
            .breakpoints
            .iter()
            .find(|bp| bp.name == name)
            .unwrap()
    }

    #[test]
    fn test_identity_breakpoint_returns_base_value() {
        let config = default_config();
        let desktop = breakpoint(&config, "desktop");
        assert_eq!(scale(&config, 16.0, desktop, None), 16.0);
        assert_eq!(scale(&config, 24.0, desktop, Some("fontSize")), 24.0);
    }

    #[test]
    fn test_linear_width_ratio() {
        let config = default_config();
        // 375 / 1920 = 0.1953125; 16 * ratio = 3.125, snapped to 3 at the
        // configured half-pixel precision
        let mobile = breakpoint(&config, "mobile");
        assert_eq!(scale(&config, 16.0, mobile, None), 3.0);

        let tablet = breakpoint(&config, "tablet");
        assert_eq!(scale(&config, 16.0, tablet, None), 6.5);
    }

    #[test]
    fn test_token_min_clamp() {
        let config = default_config();
        let mobile = breakpoint(&config, "mobile");
        // 16 * 0.1953125 = 3.125 would be unreadable; the fontSize rule
        // floors it at 12
        assert_eq!(scale(&config, 16.0, mobile, Some("fontSize")), 12.0);
    }

    #[test]
    fn test_token_step_quantization() {
        let config = default_config();
        let tablet = breakpoint(&config, "tablet");
        // 16 * 0.4 = 6.4 -> step 2 -> 6
        assert_eq!(scale(&config, 16.0, tablet, Some("spacing")), 6.0);

        let mobile = breakpoint(&config, "mobile");
        // 3.125 -> step 2 -> 4
        assert_eq!(scale(&config, 16.0, mobile, Some("spacing")), 4.0);
    }

    #[test]
    fn test_token_scale_supersedes_ratio() {
        let config = default_config();
        let desktop = breakpoint(&config, "desktop");
        // shadows scale 0.85 applies even at the identity breakpoint:
        // 16 * 0.85 = 13.6 -> half-pixel precision -> 13.5
        assert_eq!(scale(&config, 16.0, desktop, Some("shadows")), 13.5);
    }

    #[test]
    fn test_unknown_token_falls_back_to_linear() {
        let config = default_config();
        let mobile = breakpoint(&config, "mobile");
        assert_eq!(
            scale(&config, 16.0, mobile, Some("nonexistent")),
            scale(&config, 16.0, mobile, None)
        );
    }

    #[test]
    fn test_monotonic_width_scaling() {
        let config = default_config();
        let mobile = breakpoint(&config, "mobile");
        let tablet = breakpoint(&config, "tablet");
        let laptop = breakpoint(&config, "laptop");
        let desktop = breakpoint(&config, "desktop");

        for value in [4.0, 16.0, 64.0, 250.0] {
            let results = [
                scale(&config, value, mobile, None),
                scale(&config, value, tablet, None),
                scale(&config, value, laptop, None),
                scale(&config, value, desktop, None),
            ];
            for pair in results.windows(2) {
                assert!(pair[0] <= pair[1], "not monotonic for {}: {:?}", value, results);
            }
        }
    }

    #[test]
    fn test_invalid_viewport_is_distinct_error() {
        let mut config = default_config();
        config.base_viewport.width = 0.0;
        let mobile = config.breakpoints[0].clone();

        let err = scale_checked(&config, 16.0, &mobile, None).unwrap_err();
        assert!(matches!(err, ScaleError::InvalidViewport { .. }));

        // ...but the public entry point fails open
        assert_eq!(scale(&config, 16.0, &mobile, None), 16.0);
    }

    #[test]
    fn test_invalid_token_rule_is_distinct_error() {
        let mut config = default_config();
        config.strategy.tokens.insert(
            "broken".to_string(),
            TokenRule::new(1.0).with_min(10.0).with_max(2.0),
        );
        let mobile = config.breakpoints[0].clone();

        let err = scale_checked(&config, 16.0, &mobile, Some("broken")).unwrap_err();
        assert!(matches!(err, ScaleError::InvalidTokenRule { .. }));
        assert_eq!(scale(&config, 16.0, &mobile, Some("broken")), 16.0);
    }

    #[test]
    fn test_rounding_modes() {
        let mut config = default_config();
        let tablet = breakpoint(&config, "tablet").clone();
        // 16 * 0.4 = 6.4
        config.strategy.rounding.mode = RoundingMode::Up;
        assert_eq!(scale(&config, 16.0, &tablet, None), 6.5);
        config.strategy.rounding.mode = RoundingMode::Down;
        assert_eq!(scale(&config, 16.0, &tablet, None), 6.0);
    }

    #[test]
    fn test_zero_precision_disables_rounding() {
        let mut config = default_config();
        config.strategy.rounding.precision = 0.0;
        let mobile = breakpoint(&config, "mobile").clone();
        assert_eq!(scale(&config, 16.0, &mobile, None), 3.125);
    }

    #[test]
    fn test_alternate_origins() {
        let base = Viewport::new("base", 1000.0, 500.0, "base");
        let half = Viewport::new("half", 500.0, 250.0, "half");

        let mut config = default_config();
        config.base_viewport = base;
        config.strategy.rounding.precision = 0.0;

        config.strategy.origin = ScalingOrigin::Height;
        assert_eq!(scale(&config, 10.0, &half, None), 5.0);

        config.strategy.origin = ScalingOrigin::Area;
        assert_eq!(scale(&config, 10.0, &half, None), 2.5);

        config.strategy.origin = ScalingOrigin::Diagonal;
        assert_eq!(scale(&config, 10.0, &half, None), 5.0);
    }
}
