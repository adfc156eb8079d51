//! @custom-media emission
//!
//! Runs once per stylesheet, after declaration rewriting. Each breakpoint
//! (the identity breakpoint included) gets a named `@custom-media`
//! declaration prepended to the sheet; because every emission prepends, the
//! final source order is the reverse of the configuration order.

use crate::ast::{AtRule, Comment, Node, Stylesheet};
use crate::config::ResponsiveConfig;
use crate::utils::format_number;
use crate::PluginOptions;

/// Emit the per-breakpoint `@custom-media` declarations. Skipped when
/// disabled or when the sheet holds no rule, at-rule, or declaration at all
/// (comments alone do not count). Returns the number of declarations
/// emitted.
pub fn emit_custom_media(
    sheet: &mut Stylesheet,
    config: &ResponsiveConfig,
    options: &PluginOptions,
) -> usize {
    if !options.generate_custom_media {
        return 0;
    }
    if !sheet.has_content() {
        return 0;
    }

    let mut emitted = 0;
    for breakpoint in &config.breakpoints {
        sheet.prepend(Node::AtRule(AtRule::statement(
            "custom-media",
            format!(
                "--{} (max-width: {}px)",
                breakpoint.name,
                format_number(breakpoint.width)
            ),
        )));
        emitted += 1;
    }

    if options.development {
        sheet.prepend(Node::Comment(Comment {
            text: "breakpoint custom media".to_string(),
            line: 0,
        }));
    }

    emitted
}
