//! Stylesheet AST node definitions
//!
//! A small postcss-shaped tree: a root [`Stylesheet`] holding rules,
//! at-rules, declarations, and comments. Nodes are plain tagged enums;
//! rewriting constructs replacement nodes and swaps them into the parent's
//! child slot rather than mutating a node's shape in place.

use std::fmt;

/// One node in a stylesheet or rule body.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Rule(Rule),
    AtRule(AtRule),
    Declaration(Declaration),
    Comment(Comment),
}

/// A selector with a block of declarations (and comments).
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub selector: String,
    pub nodes: Vec<Node>,
    pub line: usize,
}

impl Rule {
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            nodes: Vec::new(),
            line: 0,
        }
    }

    pub fn push_declaration(&mut self, property: impl Into<String>, value: impl Into<String>) {
        self.nodes.push(Node::Declaration(Declaration {
            property: property.into(),
            value: value.into(),
            line: 0,
            column: 0,
        }));
    }

    pub fn push_comment(&mut self, text: impl Into<String>) {
        self.nodes.push(Node::Comment(Comment {
            text: text.into(),
            line: 0,
        }));
    }
}

/// An at-rule; `nodes` is `None` for statement-style at-rules that end with a
/// semicolon (`@custom-media`, `@import`) and `Some` for block at-rules
/// (`@media`).
#[derive(Debug, Clone, PartialEq)]
pub struct AtRule {
    pub name: String,
    pub params: String,
    pub nodes: Option<Vec<Node>>,
    pub line: usize,
}

impl AtRule {
    pub fn statement(name: impl Into<String>, params: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: params.into(),
            nodes: None,
            line: 0,
        }
    }

    pub fn block(name: impl Into<String>, params: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: params.into(),
            nodes: Some(Vec::new()),
            line: 0,
        }
    }

    pub fn push(&mut self, node: Node) {
        self.nodes.get_or_insert_with(Vec::new).push(node);
    }
}

/// A `property: value` declaration with its source position.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub property: String,
    pub value: String,
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub text: String,
    pub line: usize,
}

/// The root of a parsed stylesheet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stylesheet {
    pub nodes: Vec<Node>,
}

impl Stylesheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prepend(&mut self, node: Node) {
        self.nodes.insert(0, node);
    }

    pub fn append(&mut self, node: Node) {
        self.nodes.push(node);
    }

    /// The first top-level node, if any. Used for the positional `:root`
    /// reuse check: only this node is ever inspected, never the full tree.
    pub fn first(&self) -> Option<&Node> {
        self.nodes.first()
    }

    /// True when the sheet contains at least one rule, at-rule, or
    /// declaration. Comments do not count; the scan stops at the first hit.
    pub fn has_content(&self) -> bool {
        self.nodes
            .iter()
            .any(|node| !matches!(node, Node::Comment(_)))
    }

    /// Serialize back to CSS text.
    pub fn to_css(&self) -> String {
        self.to_string()
    }
}

/// Visit every declaration in the tree, depth first, including declarations
/// nested inside at-rule blocks.
pub fn walk_declarations_mut<F>(nodes: &mut [Node], visit: &mut F)
where
    F: FnMut(&mut Declaration),
{
    for node in nodes.iter_mut() {
        match node {
            Node::Declaration(decl) => visit(decl),
            Node::Rule(rule) => walk_declarations_mut(&mut rule.nodes, visit),
            Node::AtRule(at_rule) => {
                if let Some(children) = at_rule.nodes.as_mut() {
                    walk_declarations_mut(children, visit);
                }
            }
            Node::Comment(_) => {}
        }
    }
}

fn write_indent(f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
    for _ in 0..depth {
        write!(f, "  ")?;
    }
    Ok(())
}

fn write_node(f: &mut fmt::Formatter<'_>, node: &Node, depth: usize) -> fmt::Result {
    match node {
        Node::Declaration(decl) => {
            write_indent(f, depth)?;
            writeln!(f, "{}: {};", decl.property, decl.value)
        }
        Node::Comment(comment) => {
            write_indent(f, depth)?;
            writeln!(f, "/* {} */", comment.text)
        }
        Node::Rule(rule) => {
            write_indent(f, depth)?;
            writeln!(f, "{} {{", rule.selector)?;
            for child in &rule.nodes {
                write_node(f, child, depth + 1)?;
            }
            write_indent(f, depth)?;
            writeln!(f, "}}")
        }
        Node::AtRule(at_rule) => {
            write_indent(f, depth)?;
            if at_rule.params.is_empty() {
                write!(f, "@{}", at_rule.name)?;
            } else {
                write!(f, "@{} {}", at_rule.name, at_rule.params)?;
            }
            match &at_rule.nodes {
                None => writeln!(f, ";"),
                Some(children) => {
                    writeln!(f, " {{")?;
                    for child in children {
                        write_node(f, child, depth + 1)?;
                    }
                    write_indent(f, depth)?;
                    writeln!(f, "}}")
                }
            }
        }
    }
}

impl fmt::Display for Stylesheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for node in &self.nodes {
            write_node(f, node, 0)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_rule() {
        let mut rule = Rule::new(".card");
        rule.push_declaration("color", "red");
        rule.push_declaration("margin", "0 auto");

        let mut sheet = Stylesheet::new();
        sheet.append(Node::Rule(rule));

        assert_eq!(sheet.to_css(), ".card {\n  color: red;\n  margin: 0 auto;\n}\n");
    }

    #[test]
    fn test_serialize_statement_at_rule() {
        let mut sheet = Stylesheet::new();
        sheet.append(Node::AtRule(AtRule::statement(
            "custom-media",
            "--mobile (max-width: 375px)",
        )));

        assert_eq!(sheet.to_css(), "@custom-media --mobile (max-width: 375px);\n");
    }

    #[test]
    fn test_serialize_nested_media_block() {
        let mut root = Rule::new(":root");
        root.push_declaration("--rre-font-size", "13px");

        let mut media = AtRule::block("media", "(max-width: 768px)");
        media.push(Node::Rule(root));

        let mut sheet = Stylesheet::new();
        sheet.append(Node::AtRule(media));

        assert_eq!(
            sheet.to_css(),
            "@media (max-width: 768px) {\n  :root {\n    --rre-font-size: 13px;\n  }\n}\n"
        );
    }

    #[test]
    fn test_has_content_skips_comments() {
        let mut sheet = Stylesheet::new();
        assert!(!sheet.has_content());

        sheet.append(Node::Comment(Comment {
            text: "header".to_string(),
            line: 1,
        }));
        assert!(!sheet.has_content());

        sheet.append(Node::Rule(Rule::new("a")));
        assert!(sheet.has_content());
    }

    #[test]
    fn test_walk_declarations_reaches_nested_blocks() {
        let mut rule = Rule::new(".a");
        rule.push_declaration("color", "red");

        let mut inner = Rule::new(".b");
        inner.push_declaration("margin", "4px");
        let mut media = AtRule::block("media", "(max-width: 768px)");
        media.push(Node::Rule(inner));

        let mut sheet = Stylesheet::new();
        sheet.append(Node::Rule(rule));
        sheet.append(Node::AtRule(media));

        let mut seen = Vec::new();
        walk_declarations_mut(&mut sheet.nodes, &mut |decl| {
            seen.push(decl.property.clone());
        });
        assert_eq!(seen, vec!["color", "margin"]);
    }
}
