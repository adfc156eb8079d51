//! CSS text parsing into the stylesheet AST
//!
//! A small scanner covering the subset of CSS this tool cares about: rules,
//! at-rules (statement and block form), declarations, and comments, with
//! line/column positions retained on declarations. Declaration values are
//! kept as raw text; the value-level grammar lives in [`crate::value`].

use crate::ast::{AtRule, Comment, Declaration, Node, Rule, Stylesheet};
use crate::error::{Result, TransformError};

pub struct Parser<'a> {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
    filename: &'a str,
}

/// Parse CSS source text into a [`Stylesheet`].
pub fn parse(source: &str, filename: &str) -> Result<Stylesheet> {
    Parser::new(source, filename).parse()
}

impl<'a> Parser<'a> {
    pub fn new(source: &str, filename: &'a str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
            filename,
        }
    }

    pub fn parse(mut self) -> Result<Stylesheet> {
        let nodes = self.parse_nodes(true)?;
        Ok(Stylesheet { nodes })
    }

    fn parse_nodes(&mut self, top_level: bool) -> Result<Vec<Node>> {
        let mut nodes = Vec::new();

        loop {
            self.skip_whitespace();

            // Stray semicolons between statements are tolerated
            if self.peek() == Some(';') {
                self.advance();
                continue;
            }

            match self.peek() {
                None => {
                    if !top_level {
                        return Err(TransformError::parse(
                            self.filename,
                            self.line,
                            "unexpected end of input inside a block",
                        ));
                    }
                    break;
                }
                Some('}') => {
                    if top_level {
                        return Err(TransformError::parse(
                            self.filename,
                            self.line,
                            "unexpected '}'",
                        ));
                    }
                    self.advance();
                    break;
                }
                Some('/') if self.peek_ahead(1) == Some('*') => {
                    nodes.push(Node::Comment(self.parse_comment()?));
                }
                Some('@') => {
                    nodes.push(Node::AtRule(self.parse_at_rule()?));
                }
                Some(_) => {
                    nodes.push(self.parse_rule_or_declaration()?);
                }
            }
        }

        Ok(nodes)
    }

    fn parse_comment(&mut self) -> Result<Comment> {
        let line = self.line;
        self.advance(); // '/'
        self.advance(); // '*'

        let mut text = String::new();
        loop {
            match self.peek() {
                None => {
                    return Err(TransformError::parse(
                        self.filename,
                        line,
                        "unterminated comment",
                    ));
                }
                Some('*') if self.peek_ahead(1) == Some('/') => {
                    self.advance();
                    self.advance();
                    break;
                }
                Some(ch) => {
                    text.push(ch);
                    self.advance();
                }
            }
        }

        Ok(Comment {
            text: text.trim().to_string(),
            line,
        })
    }

    fn parse_at_rule(&mut self) -> Result<AtRule> {
        let line = self.line;
        self.advance(); // '@'

        let mut name = String::new();
        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == '-' {
                name.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        let (params, terminator) = self.scan_prelude()?;
        let params = params.trim().to_string();

        match terminator {
            Some('{') => {
                self.advance();
                let nodes = self.parse_nodes(false)?;
                Ok(AtRule {
                    name,
                    params,
                    nodes: Some(nodes),
                    line,
                })
            }
            _ => {
                if terminator == Some(';') {
                    self.advance();
                }
                Ok(AtRule {
                    name,
                    params,
                    nodes: None,
                    line,
                })
            }
        }
    }

    fn parse_rule_or_declaration(&mut self) -> Result<Node> {
        let line = self.line;
        let column = self.column;
        let (prelude, terminator) = self.scan_prelude()?;

        match terminator {
            Some('{') => {
                self.advance();
                let nodes = self.parse_nodes(false)?;
                Ok(Node::Rule(Rule {
                    selector: prelude.trim().to_string(),
                    nodes,
                    line,
                }))
            }
            _ => {
                if terminator == Some(';') {
                    self.advance();
                }
                let decl = self.split_declaration(&prelude, line, column)?;
                Ok(Node::Declaration(decl))
            }
        }
    }

    /// Scan raw text up to (but not consuming) the next `{`, `;`, `}` at
    /// nesting depth zero, or end of input. Quoted strings and parenthesized
    /// groups are skipped over so their contents never terminate the scan.
    fn scan_prelude(&mut self) -> Result<(String, Option<char>)> {
        let mut text = String::new();
        let mut paren_depth = 0usize;

        loop {
            match self.peek() {
                None => return Ok((text, None)),
                Some(ch @ ('{' | ';' | '}')) if paren_depth == 0 => {
                    return Ok((text, Some(ch)));
                }
                Some('(') => {
                    paren_depth += 1;
                    text.push('(');
                    self.advance();
                }
                Some(')') => {
                    paren_depth = paren_depth.saturating_sub(1);
                    text.push(')');
                    self.advance();
                }
                Some(quote @ ('"' | '\'')) => {
                    text.push(quote);
                    self.advance();
                    loop {
                        match self.peek() {
                            None => {
                                return Err(TransformError::parse(
                                    self.filename,
                                    self.line,
                                    "unterminated string",
                                ));
                            }
                            Some(ch) => {
                                text.push(ch);
                                self.advance();
                                if ch == quote {
                                    break;
                                }
                            }
                        }
                    }
                }
                Some(ch) => {
                    text.push(ch);
                    self.advance();
                }
            }
        }
    }

    fn split_declaration(&self, raw: &str, line: usize, column: usize) -> Result<Declaration> {
        // The colon separating property from value is never inside parens or
        // quotes for well-formed declarations; scan_prelude already kept
        // those regions intact.
        let mut split_at = None;
        let mut paren_depth = 0usize;
        for (idx, ch) in raw.char_indices() {
            match ch {
                '(' => paren_depth += 1,
                ')' => paren_depth = paren_depth.saturating_sub(1),
                ':' if paren_depth == 0 => {
                    split_at = Some(idx);
                    break;
                }
                _ => {}
            }
        }

        let split_at = split_at.ok_or_else(|| {
            TransformError::parse(
                self.filename,
                line,
                format!("expected ':' in declaration '{}'", raw.trim()),
            )
        })?;

        Ok(Declaration {
            property: raw[..split_at].trim().to_string(),
            value: raw[split_at + 1..].trim().to_string(),
            line,
            column,
        })
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_ahead(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn advance(&mut self) {
        if let Some(ch) = self.peek() {
            self.pos += 1;
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(ch) if ch.is_whitespace()) {
            self.advance();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Node;

    #[test]
    fn test_parse_simple_rule() {
        let sheet = parse(".card { color: red; margin: 0 auto }", "test.css").unwrap();
        assert_eq!(sheet.nodes.len(), 1);

        let Node::Rule(rule) = &sheet.nodes[0] else {
            panic!("expected rule");
        };
        assert_eq!(rule.selector, ".card");
        assert_eq!(rule.nodes.len(), 2);

        let Node::Declaration(decl) = &rule.nodes[0] else {
            panic!("expected declaration");
        };
        assert_eq!(decl.property, "color");
        assert_eq!(decl.value, "red");
    }

    #[test]
    fn test_parse_empty_and_whitespace() {
        assert!(parse("", "test.css").unwrap().nodes.is_empty());
        assert!(parse("  \n\t ", "test.css").unwrap().nodes.is_empty());
    }

    #[test]
    fn test_parse_comment_only_sheet() {
        let sheet = parse("/* just a note */", "test.css").unwrap();
        assert_eq!(sheet.nodes.len(), 1);
        assert!(matches!(&sheet.nodes[0], Node::Comment(c) if c.text == "just a note"));
        assert!(!sheet.has_content());
    }

    #[test]
    fn test_parse_statement_at_rule() {
        let sheet = parse("@import 'theme.css';", "test.css").unwrap();
        let Node::AtRule(at_rule) = &sheet.nodes[0] else {
            panic!("expected at-rule");
        };
        assert_eq!(at_rule.name, "import");
        assert_eq!(at_rule.params, "'theme.css'");
        assert!(at_rule.nodes.is_none());
    }

    #[test]
    fn test_parse_media_block() {
        let sheet = parse(
            "@media (max-width: 768px) { .a { padding: 4px; } }",
            "test.css",
        )
        .unwrap();
        let Node::AtRule(at_rule) = &sheet.nodes[0] else {
            panic!("expected at-rule");
        };
        assert_eq!(at_rule.name, "media");
        assert_eq!(at_rule.params, "(max-width: 768px)");

        let children = at_rule.nodes.as_ref().unwrap();
        assert!(matches!(&children[0], Node::Rule(r) if r.selector == ".a"));
    }

    #[test]
    fn test_value_with_nested_function_kept_raw() {
        let sheet = parse(
            ".a { width: calc(100% - rre(20)); font: 12px/1.5 'Fira Sans', serif; }",
            "test.css",
        )
        .unwrap();
        let Node::Rule(rule) = &sheet.nodes[0] else {
            panic!("expected rule");
        };
        let Node::Declaration(width) = &rule.nodes[0] else {
            panic!("expected declaration");
        };
        assert_eq!(width.value, "calc(100% - rre(20))");

        let Node::Declaration(font) = &rule.nodes[1] else {
            panic!("expected declaration");
        };
        assert_eq!(font.value, "12px/1.5 'Fira Sans', serif");
    }

    #[test]
    fn test_declaration_positions() {
        let sheet = parse(".a {\n  color: red;\n}", "test.css").unwrap();
        let Node::Rule(rule) = &sheet.nodes[0] else {
            panic!("expected rule");
        };
        let Node::Declaration(decl) = &rule.nodes[0] else {
            panic!("expected declaration");
        };
        assert_eq!(decl.line, 2);
        assert_eq!(decl.column, 3);
    }

    #[test]
    fn test_stray_semicolons_tolerated() {
        let sheet = parse(".a { color: red;; margin: 0; } ;", "test.css").unwrap();
        let Node::Rule(rule) = &sheet.nodes[0] else {
            panic!("expected rule");
        };
        assert_eq!(rule.nodes.len(), 2);
    }

    #[test]
    fn test_unterminated_block_is_error() {
        let result = parse(".a { color: red;", "test.css");
        assert!(matches!(result, Err(TransformError::Parse { .. })));
    }

    #[test]
    fn test_stray_close_brace_is_error() {
        let result = parse("} .a { color: red; }", "test.css");
        assert!(matches!(result, Err(TransformError::Parse { .. })));
    }
}
