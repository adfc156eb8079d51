//! Declaration rewriting
//!
//! Walks every declaration in a stylesheet, swaps valid `rre()` calls for
//! `var()` references (or literal pixel values), and records the `:root`
//! injections and per-breakpoint `@media` blocks to attach once the walk is
//! done. A failure while rewriting one declaration is routed to the error
//! hook with its source context and the walk continues; nothing aborts the
//! stylesheet.

use crate::ast::{walk_declarations_mut, AtRule, Comment, Declaration, Node, Rule, Stylesheet};
use crate::cache::{BreakpointValues, CacheKey, TransformCache};
use crate::config::{default_config, ResponsiveConfig};
use crate::error::{ErrorContext, Result, TransformError};
use crate::scale::scale;
use crate::utils::{custom_property_name, format_number, format_px};
use crate::validator::TransformMetrics;
use crate::value::{parse_value, replace_calls, serialize, RreCall, ValueNode};
use crate::PluginOptions;

/// One transform run's worth of state: configuration, options, the bounded
/// cache, and the metrics counters. A session may be reused across files
/// (the cache carries over); concurrent pipelines each need their own.
pub struct TransformSession {
    config: ResponsiveConfig,
    options: PluginOptions,
    cache: TransformCache,
    metrics: TransformMetrics,
}

impl TransformSession {
    pub fn new(options: PluginOptions) -> Self {
        Self::with_config(options, default_config())
    }

    pub fn with_config(options: PluginOptions, config: ResponsiveConfig) -> Self {
        let cache = TransformCache::new(options.cache_size, options.enable_caching);
        Self {
            config,
            options,
            cache,
            metrics: TransformMetrics::default(),
        }
    }

    pub fn config(&self) -> &ResponsiveConfig {
        &self.config
    }

    pub fn options(&self) -> &PluginOptions {
        &self.options
    }

    pub fn metrics(&self) -> &TransformMetrics {
        &self.metrics
    }

    pub fn metrics_mut(&mut self) -> &mut TransformMetrics {
        &mut self.metrics
    }

    /// Rewrite every declaration in the sheet. Counters in
    /// [`TransformSession::metrics`] are reset for each sheet; cache contents
    /// persist across calls.
    pub fn rewrite_declarations(&mut self, sheet: &mut Stylesheet, filename: &str) {
        self.metrics = TransformMetrics::default();
        let hits_before = self.cache.hits();
        let misses_before = self.cache.misses();

        // The `:root` reuse check is positional: only the very first
        // top-level node is inspected, never the rest of the sheet. A
        // `:root` rule further down will not prevent a second one from
        // being prepended.
        let reuse_first_root =
            matches!(sheet.first(), Some(Node::Rule(rule)) if rule.selector == ":root");

        let mut root_nodes: Vec<Node> = Vec::new();
        let mut media_blocks: Vec<Node> = Vec::new();

        let config = &self.config;
        let options = &self.options;
        let cache = &mut self.cache;
        let metrics = &mut self.metrics;

        walk_declarations_mut(&mut sheet.nodes, &mut |decl| {
            if !decl.value.contains("rre(") {
                return;
            }

            let context = ErrorContext::new(filename, decl.line, decl.column)
                .with_declaration(decl.property.clone(), decl.value.clone());

            match rewrite_declaration(
                config,
                options,
                cache,
                metrics,
                decl,
                &mut root_nodes,
                &mut media_blocks,
            ) {
                Ok(true) => {
                    if let Some(hook) = &options.on_transform {
                        hook(decl, &context);
                    }
                }
                Ok(false) => {}
                Err(err) => report_error(options, &err, &context),
            }
        });

        if !root_nodes.is_empty() {
            if reuse_first_root {
                if let Some(Node::Rule(rule)) = sheet.nodes.first_mut() {
                    rule.nodes.extend(root_nodes);
                }
            } else {
                let mut root = Rule::new(":root");
                root.nodes = root_nodes;
                sheet.prepend(Node::Rule(root));
            }
        }

        sheet.nodes.extend(media_blocks);

        self.metrics.cache_hits = self.cache.hits() - hits_before;
        self.metrics.cache_misses = self.cache.misses() - misses_before;
    }
}

/// Rewrite the rre() calls in one declaration. Returns whether anything was
/// replaced; occurrences that fail to parse are never touched, so their
/// literal text stays visible in the output.
fn rewrite_declaration(
    config: &ResponsiveConfig,
    options: &PluginOptions,
    cache: &mut TransformCache,
    metrics: &mut TransformMetrics,
    decl: &mut Declaration,
    root_nodes: &mut Vec<Node>,
    media_blocks: &mut Vec<Node>,
) -> Result<bool> {
    let mut nodes = parse_value(&decl.value);
    let property = decl.property.clone();
    let mut replaced = false;

    replace_calls(&mut nodes, &mut |call| {
        let values = breakpoint_values(config, cache, call, &property);
        metrics.transformations += 1;
        replaced = true;

        if !options.generate_custom_properties {
            return Some(ValueNode::Word(format_px(call.base_value)));
        }

        let name = custom_property_name(&options.custom_property_prefix, &property);

        if options.development {
            root_nodes.push(Node::Comment(Comment {
                text: format!("responsive base for {}", property),
                line: 0,
            }));
        }
        root_nodes.push(Node::Declaration(Declaration {
            property: name.clone(),
            value: format_px(call.base_value),
            line: 0,
            column: 0,
        }));
        metrics.custom_properties += 1;

        for breakpoint in &config.breakpoints {
            if config.is_base(breakpoint) {
                continue;
            }
            let scaled = values
                .get(&breakpoint.name)
                .copied()
                .unwrap_or(call.base_value);

            let mut override_root = Rule::new(":root");
            override_root.push_declaration(name.clone(), format_px(scaled));

            let mut media = AtRule::block(
                "media",
                format!("(max-width: {}px)", format_number(breakpoint.width)),
            );
            media.push(Node::Rule(override_root));
            media_blocks.push(Node::AtRule(media));
            metrics.media_queries += 1;
        }

        Some(ValueNode::Word(format!("var({})", name)))
    });

    if replaced {
        decl.value = serialize(&nodes);
    }

    Ok(replaced)
}

/// Compute (or fetch) the per-breakpoint value map for one call.
fn breakpoint_values(
    config: &ResponsiveConfig,
    cache: &mut TransformCache,
    call: &RreCall,
    property: &str,
) -> BreakpointValues {
    let key = CacheKey::new(call.base_value, call.token.as_deref(), property);
    if let Some(values) = cache.get(&key) {
        return values.clone();
    }

    let mut values = BreakpointValues::new();
    for breakpoint in &config.breakpoints {
        values.insert(
            breakpoint.name.clone(),
            scale(config, call.base_value, breakpoint, call.token.as_deref()),
        );
    }
    cache.insert(key, values.clone());
    values
}

fn report_error(options: &PluginOptions, error: &TransformError, context: &ErrorContext) {
    match &options.on_error {
        Some(hook) => hook(error, context),
        None => log::error!("{}: {}", context.describe(), error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn session(options: PluginOptions) -> TransformSession {
        TransformSession::new(options)
    }

    fn rewrite(css: &str, options: PluginOptions) -> (String, TransformSession) {
        let mut sheet = parse(css, "test.css").unwrap();
        let mut session = session(options);
        session.rewrite_declarations(&mut sheet, "test.css");
        (sheet.to_css(), session)
    }

    #[test]
    fn test_literal_mode_replaces_with_base_px() {
        let options = PluginOptions {
            generate_custom_properties: false,
            ..Default::default()
        };
        let (css, session) = rewrite(".a { font-size: rre(16); }", options);

        assert_eq!(css, ".a {\n  font-size: 16px;\n}\n");
        assert_eq!(session.metrics().transformations, 1);
        assert_eq!(session.metrics().custom_properties, 0);
        assert_eq!(session.metrics().media_queries, 0);
    }

    #[test]
    fn test_custom_property_mode_full_output() {
        let (css, session) = rewrite(".a { font-size: rre(16); }", PluginOptions::default());

        // The declaration now references the generated property
        assert!(css.contains("font-size: var(--rre-font-size);"));
        // Base value lands in a prepended :root
        assert!(css.starts_with(":root {\n  --rre-font-size: 16px;\n}\n"));
        // One media override per non-base breakpoint, pure linear ratio
        assert!(css.contains("@media (max-width: 375px) {\n  :root {\n    --rre-font-size: 3px;"));
        assert!(css.contains("@media (max-width: 768px) {\n  :root {\n    --rre-font-size: 6.5px;"));
        assert!(css.contains("@media (max-width: 1366px) {\n  :root {\n    --rre-font-size: 11.5px;"));
        // The identity breakpoint produces no override
        assert!(!css.contains("@media (max-width: 1920px)"));

        assert_eq!(session.metrics().transformations, 1);
        assert_eq!(session.metrics().custom_properties, 1);
        assert_eq!(session.metrics().media_queries, 3);
    }

    #[test]
    fn test_token_aware_scaling_in_output() {
        let (css, _) = rewrite(".a { font-size: rre(16, fontSize); }", PluginOptions::default());
        // fontSize min clamp keeps every override readable
        assert!(css.contains("@media (max-width: 375px) {\n  :root {\n    --rre-font-size: 12px;"));
        assert!(css.contains("@media (max-width: 768px) {\n  :root {\n    --rre-font-size: 12px;"));
    }

    #[test]
    fn test_malformed_calls_survive_verbatim() {
        let (css, session) = rewrite(
            ".a { font-size: rre(); padding: rre(invalid); }",
            PluginOptions::default(),
        );

        assert!(css.contains("font-size: rre();"));
        assert!(css.contains("padding: rre(invalid);"));
        assert!(!css.contains(":root"));
        assert_eq!(session.metrics().transformations, 0);
    }

    #[test]
    fn test_graceful_mixed_input() {
        let (css, session) = rewrite(
            ".a { font-size: rre(16); } .b { padding: rre(); } .c { margin: rre(8); }",
            PluginOptions::default(),
        );

        assert!(css.contains("font-size: var(--rre-font-size);"));
        assert!(css.contains("margin: var(--rre-margin);"));
        assert!(css.contains("padding: rre();"));
        assert_eq!(session.metrics().transformations, 2);
    }

    #[test]
    fn test_mixed_valid_and_invalid_in_one_value() {
        let (css, _) = rewrite(".a { margin: rre(8) rre(); }", PluginOptions::default());
        assert!(css.contains("margin: var(--rre-margin) rre();"));
    }

    #[test]
    fn test_first_root_rule_is_reused() {
        let (css, _) = rewrite(
            ":root { --brand: blue; } .a { font-size: rre(16); }",
            PluginOptions::default(),
        );

        // The existing leading :root picks up the generated property; no
        // second top-level :root appears
        let root_block_end = css.find('}').unwrap();
        assert!(css[..root_block_end].contains("--brand: blue;"));
        assert!(css[..root_block_end].contains("--rre-font-size: 16px;"));
        // author :root + 3 media-nested :root overrides
        assert_eq!(css.matches(":root {").count(), 4);
    }

    #[test]
    fn test_root_detection_is_positional_only() {
        // A :root that is not the first node is ignored by the reuse check,
        // so a second :root gets prepended. Documented behavior, not a fix
        // target.
        let (css, _) = rewrite(
            ".a { font-size: rre(16); } :root { --brand: blue; }",
            PluginOptions::default(),
        );

        let occurrences = css.matches(":root {").count();
        // prepended :root + author :root + 3 media-nested :root overrides
        assert_eq!(occurrences, 5);
        assert!(css.starts_with(":root {\n  --rre-font-size: 16px;\n}\n"));
    }

    #[test]
    fn test_custom_prefix_round_trip() {
        let options = PluginOptions {
            custom_property_prefix: "--foo".to_string(),
            ..Default::default()
        };
        let (css, _) = rewrite(".a { border-radius: rre(8, radius); }", options);
        assert!(css.contains("border-radius: var(--foo-border-radius);"));
        assert!(css.contains("--foo-border-radius: 8px;"));
    }

    #[test]
    fn test_declarations_inside_existing_media_blocks() {
        let (css, _) = rewrite(
            "@media print { .a { margin: rre(12); } }",
            PluginOptions::default(),
        );
        assert!(css.contains("margin: var(--rre-margin);"));
        assert!(css.contains("--rre-margin: 12px;"));
    }

    #[test]
    fn test_cache_transparency() {
        let css = ".a { font-size: rre(16); } .b { font-size: rre(16); }";

        let cached = rewrite(css, PluginOptions::default()).0;
        let uncached = rewrite(
            css,
            PluginOptions {
                enable_caching: false,
                ..Default::default()
            },
        )
        .0;

        assert_eq!(cached, uncached);
    }

    #[test]
    fn test_cache_hit_on_repeated_declaration() {
        let (_, session) = rewrite(
            ".a { font-size: rre(16); } .b { font-size: rre(16); }",
            PluginOptions::default(),
        );
        assert_eq!(session.metrics().cache_hits, 1);
        assert_eq!(session.metrics().cache_misses, 1);
    }

    #[test]
    fn test_same_value_different_property_misses() {
        let (_, session) = rewrite(
            ".a { font-size: rre(16); } .b { padding: rre(16); }",
            PluginOptions::default(),
        );
        assert_eq!(session.metrics().cache_hits, 0);
        assert_eq!(session.metrics().cache_misses, 2);
    }

    #[test]
    fn test_development_mode_adds_root_comment() {
        let options = PluginOptions {
            development: true,
            ..Default::default()
        };
        let (css, _) = rewrite(".a { font-size: rre(16); }", options);
        assert!(css.contains("/* responsive base for font-size */"));
    }

    #[test]
    fn test_error_hook_receives_context() {
        use std::sync::{Arc, Mutex};

        let seen: Arc<Mutex<Vec<ErrorContext>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let options = PluginOptions {
            on_transform: Some(Arc::new(move |_decl, ctx| {
                sink.lock().unwrap().push(ctx.clone());
            })),
            ..Default::default()
        };

        rewrite(".a { font-size: rre(16); }", options);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].property, "font-size");
        assert_eq!(seen[0].value, "rre(16)");
        assert_eq!(seen[0].file, "test.css");
    }
}
