//! RRE Responsive CSS Compiler
//!
//! A transformer for stylesheets that use the custom `rre(baseValue[, token])`
//! CSS function: every valid call becomes either a responsive custom property
//! (with per-breakpoint `@media` overrides) or a literal pixel value.
//!
//! # Features
//!
//! - Breakpoint scaling from a design-time base viewport
//! - Token rules (fontSize, spacing, radius, shadows) with clamp and step
//! - Generated `:root` custom properties and `@custom-media` declarations
//! - Bounded FIFO transformation cache
//! - Fail-open handling of malformed `rre()` usage: broken calls stay
//!   visible verbatim in the output instead of aborting the build
//! - Optional output validation and run metrics
//!
//! # Basic Usage
//!
//! ```rust,no_run
//! use rrec::{transform_file, Result};
//!
//! fn main() -> Result<()> {
//!     transform_file("input.css", "output.css")?;
//!     Ok(())
//! }
//! ```
//!
//! # Transform Pipeline
//!
//! 1. **Phase 1**: Parse - CSS text to stylesheet AST
//! 2. **Phase 2**: Rewrite - replace rre() calls, inject :root and @media
//! 3. **Phase 3**: Custom media - per-breakpoint @custom-media declarations
//! 4. **Phase 4**: Serialize - AST back to CSS text
//! 5. **Phase 5**: Validate - optional balance and naming checks

pub mod ast;
pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod media;
pub mod parser;
pub mod rewriter;
pub mod scale;
pub mod utils;
pub mod validator;
pub mod value;

use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

// Re-export commonly used types and functions
pub use ast::{AtRule, Comment, Declaration, Node, Rule, Stylesheet};
pub use cache::{CacheKey, TransformCache, DEFAULT_CACHE_SIZE};
pub use config::{
    default_config, Breakpoint, ResponsiveConfig, RoundingMode, RoundingRule, ScalingOrigin,
    ScalingStrategy, TokenRule, Viewport,
};
pub use error::{ErrorContext, Result, TransformError};
pub use media::emit_custom_media;
pub use parser::parse;
pub use rewriter::TransformSession;
pub use scale::{scale, scale_checked, ScaleError};
pub use validator::{TransformMetrics, ValidationIssue, Validator};
pub use value::{parse_value, RreCall, ValueNode};

/// Transformer version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Transformer build information
pub const BUILD_INFO: TransformerInfo = TransformerInfo {
    version: VERSION,
    name: NAME,
    description: DESCRIPTION,
    supported_features: &[
        "custom-properties",
        "custom-media",
        "tokens",
        "caching",
        "validation",
        "metrics",
        "watch",
    ],
};

/// Transformer information structure
#[derive(Debug, Clone)]
pub struct TransformerInfo {
    pub version: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub supported_features: &'static [&'static str],
}

/// Hook invoked when rewriting one declaration fails; receives the error and
/// the source context of the declaration.
pub type ErrorHook = Arc<dyn Fn(&TransformError, &ErrorContext) + Send + Sync>;

/// Hook invoked after a declaration has been rewritten; receives the updated
/// declaration and a context carrying the original value.
pub type TransformHook = Arc<dyn Fn(&Declaration, &ErrorContext) + Send + Sync>;

/// Plugin options and settings
#[derive(Clone)]
pub struct PluginOptions {
    /// Emit var() references plus :root/@media custom properties; when off,
    /// rre() calls collapse to their literal base pixel value
    pub generate_custom_properties: bool,

    /// Emit per-breakpoint @custom-media declarations
    pub generate_custom_media: bool,

    /// Prefix for generated custom-property names
    pub custom_property_prefix: String,

    /// Development mode: explanatory comments and verbose phase logging
    pub development: bool,

    /// Log a metrics summary after each run
    pub performance_metrics: bool,

    /// Run balance/naming validation over the serialized output
    pub validate_css: bool,

    /// Memoize per-breakpoint value maps
    pub enable_caching: bool,

    /// Maximum cache entries before FIFO eviction
    pub cache_size: usize,

    /// Per-declaration error hook
    pub on_error: Option<ErrorHook>,

    /// Per-declaration transform hook
    pub on_transform: Option<TransformHook>,
}

impl Default for PluginOptions {
    fn default() -> Self {
        Self {
            generate_custom_properties: true,
            generate_custom_media: true,
            custom_property_prefix: "--rre".to_string(),
            development: false,
            performance_metrics: false,
            validate_css: false,
            enable_caching: true,
            cache_size: DEFAULT_CACHE_SIZE,
            on_error: None,
            on_transform: None,
        }
    }
}

impl fmt::Debug for PluginOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginOptions")
            .field("generate_custom_properties", &self.generate_custom_properties)
            .field("generate_custom_media", &self.generate_custom_media)
            .field("custom_property_prefix", &self.custom_property_prefix)
            .field("development", &self.development)
            .field("performance_metrics", &self.performance_metrics)
            .field("validate_css", &self.validate_css)
            .field("enable_caching", &self.enable_caching)
            .field("cache_size", &self.cache_size)
            .field("on_error", &self.on_error.is_some())
            .field("on_transform", &self.on_transform.is_some())
            .finish()
    }
}

/// The result of transforming one stylesheet in memory.
#[derive(Debug, Clone)]
pub struct TransformOutput {
    pub css: String,
    pub metrics: TransformMetrics,
}

/// Transformation statistics and metrics for a file-level run
#[derive(Debug, Clone, Default, Serialize)]
pub struct TransformStats {
    /// Original source size in bytes
    pub source_size: u64,

    /// Final CSS size in bytes
    pub output_size: u64,

    /// Number of rre() calls transformed
    pub transformations: usize,

    /// Number of custom properties generated
    pub custom_properties: usize,

    /// Number of @media blocks generated
    pub media_queries: usize,

    /// Number of @custom-media declarations generated
    pub custom_media: usize,

    /// Validation findings reported (zero unless validation is enabled)
    pub validation_errors: usize,

    /// Cache performance over this run
    pub cache_hits: u64,
    pub cache_misses: u64,

    /// Transform time in milliseconds
    pub transform_time_ms: u64,
}

/// Main transformer entry point with default options
pub fn transform_file(input_path: &str, output_path: &str) -> Result<TransformStats> {
    transform_file_with_options(input_path, output_path, PluginOptions::default())
}

/// Transform a file with custom options
pub fn transform_file_with_options(
    input_path: &str,
    output_path: &str,
    options: PluginOptions,
) -> Result<TransformStats> {
    use std::fs;

    let start_time = Instant::now();

    if options.development {
        log::info!("{} v{}", NAME, VERSION);
        log::info!("Transforming '{}' to '{}'...", input_path, output_path);
        log::debug!("Plugin options: {:?}", options);
    }

    let source = fs::read_to_string(input_path).map_err(|e| TransformError::FileNotFound {
        path: format!("{}: {}", input_path, e),
    })?;

    let source_size = source.len() as u64;
    let output = transform_source_with_options(&source, input_path, options.clone())?;

    fs::write(output_path, &output.css).map_err(TransformError::Io)?;

    let stats = TransformStats {
        source_size,
        output_size: output.css.len() as u64,
        transformations: output.metrics.transformations,
        custom_properties: output.metrics.custom_properties,
        media_queries: output.metrics.media_queries,
        custom_media: output.metrics.custom_media,
        validation_errors: output.metrics.validation_errors,
        cache_hits: output.metrics.cache_hits,
        cache_misses: output.metrics.cache_misses,
        transform_time_ms: start_time.elapsed().as_millis() as u64,
    };

    if options.development {
        log::info!("Transform successful!");
        log::info!("Source size: {} bytes", stats.source_size);
        log::info!("Output size: {} bytes", stats.output_size);
        log::info!("Transformations: {}", stats.transformations);
        log::info!("Transform time: {}ms", stats.transform_time_ms);
    }

    Ok(stats)
}

/// Transform CSS source text with default options
pub fn transform_source(source: &str, filename: &str) -> Result<String> {
    let output = transform_source_with_options(source, filename, PluginOptions::default())?;
    Ok(output.css)
}

/// Transform CSS source text with custom options
pub fn transform_source_with_options(
    source: &str,
    filename: &str,
    options: PluginOptions,
) -> Result<TransformOutput> {
    let mut session = TransformSession::new(options);
    transform_with_session(&mut session, source, filename)
}

/// Transform using an existing session. The session's cache persists across
/// calls, which is how repeated builds of many files share computed maps;
/// each concurrent pipeline must own its own session.
pub fn transform_with_session(
    session: &mut TransformSession,
    source: &str,
    filename: &str,
) -> Result<TransformOutput> {
    let start_time = Instant::now();
    let development = session.options().development;

    if development {
        log::debug!("Starting transform pipeline for {}", filename);
        log::debug!("Source length: {} characters", source.len());
        log::debug!("Phase 1: Parsing stylesheet...");
    }

    let mut sheet = parser::parse(source, filename)?;

    if development {
        log::debug!("Phase 1 complete. Top-level nodes: {}", sheet.nodes.len());
        log::debug!("Phase 2: Rewriting declarations...");
    }

    session.rewrite_declarations(&mut sheet, filename);

    if development {
        log::debug!(
            "Phase 2 complete. Transformations: {}, custom properties: {}",
            session.metrics().transformations,
            session.metrics().custom_properties
        );
        log::debug!("Phase 3: Emitting custom media...");
    }

    let custom_media = media::emit_custom_media(&mut sheet, session.config(), session.options());
    session.metrics_mut().custom_media = custom_media;

    if development {
        log::debug!("Phase 3 complete. Custom media emitted: {}", custom_media);
        log::debug!("Phase 4: Serializing...");
    }

    let css = sheet.to_css();

    if session.options().validate_css {
        if development {
            log::debug!("Phase 5: Validating output...");
        }
        let options = session.options().clone();
        validator::validate_output(&css, filename, &options, session.metrics_mut());
    }

    session.metrics_mut().execution_ms = start_time.elapsed().as_millis() as u64;

    let metrics = session.metrics().clone();

    if session.options().performance_metrics {
        log::info!(
            "{}: {} transformations, {} custom properties, {} media queries, \
             {} custom media, cache {}/{} hit/miss, {}ms",
            filename,
            metrics.transformations,
            metrics.custom_properties,
            metrics.media_queries,
            metrics.custom_media,
            metrics.cache_hits,
            metrics.cache_misses,
            metrics.execution_ms
        );
    }

    Ok(TransformOutput { css, metrics })
}

/// Check if the transformer supports a specific feature
pub fn supports_feature(feature: &str) -> bool {
    BUILD_INFO.supported_features.contains(&feature)
}

/// Get transformer build information
pub fn build_info() -> &'static TransformerInfo {
    &BUILD_INFO
}
