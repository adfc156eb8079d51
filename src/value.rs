//! Declaration-value parsing and rre() call extraction
//!
//! Values are tokenized into a small node tree (words, whitespace,
//! separators, functions) that serializes back to the original text
//! byte-for-byte. `rre()` occurrences that carry a parseable base value
//! become [`RreCall`]s; anything else is left exactly as written.

use crate::utils::strip_quotes;

/// One node of a declaration value. Replacements swap a whole node in the
/// parent's slot; a node's shape is never changed after construction.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueNode {
    Word(String),
    Whitespace(String),
    Separator(char),
    Function(FunctionNode),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionNode {
    pub name: String,
    pub nodes: Vec<ValueNode>,
    /// False when the closing parenthesis was missing in the source; such
    /// functions serialize without one and are never treated as rre() calls.
    pub closed: bool,
}

/// A parsed `rre(baseValue[, token])` occurrence.
#[derive(Debug, Clone, PartialEq)]
pub struct RreCall {
    pub base_value: f64,
    pub token: Option<String>,
}

/// The CSS function name this transformer rewrites.
pub const RRE_FUNCTION: &str = "rre";

/// Tokenize a raw CSS value. Never fails: unrecognized input degrades to
/// word/whitespace nodes that round-trip unchanged.
pub fn parse_value(input: &str) -> Vec<ValueNode> {
    let chars: Vec<char> = input.chars().collect();
    let mut pos = 0;
    parse_nodes(&chars, &mut pos, false)
}

fn parse_nodes(chars: &[char], pos: &mut usize, in_function: bool) -> Vec<ValueNode> {
    let mut nodes = Vec::new();

    while let Some(&ch) = chars.get(*pos) {
        if in_function && ch == ')' {
            break;
        }

        if ch.is_whitespace() {
            let start = *pos;
            while matches!(chars.get(*pos), Some(c) if c.is_whitespace()) {
                *pos += 1;
            }
            nodes.push(ValueNode::Whitespace(chars[start..*pos].iter().collect()));
        } else if ch == ',' {
            *pos += 1;
            nodes.push(ValueNode::Separator(','));
        } else if ch == '"' || ch == '\'' {
            nodes.push(ValueNode::Word(scan_quoted(chars, pos, ch)));
        } else {
            let start = *pos;
            while let Some(&c) = chars.get(*pos) {
                if c.is_whitespace() || c == ',' || c == '(' || c == ')' || c == '"' || c == '\'' {
                    break;
                }
                *pos += 1;
            }
            let word: String = chars[start..*pos].iter().collect();

            if chars.get(*pos) == Some(&'(') && !word.is_empty() && is_identifier(&word) {
                *pos += 1; // '('
                let inner = parse_nodes(chars, pos, true);
                let closed = chars.get(*pos) == Some(&')');
                if closed {
                    *pos += 1;
                }
                nodes.push(ValueNode::Function(FunctionNode {
                    name: word,
                    nodes: inner,
                    closed,
                }));
            } else if chars.get(*pos) == Some(&'(') {
                // A bare parenthesized group, e.g. in media-query params
                *pos += 1;
                let inner = parse_nodes(chars, pos, true);
                let closed = chars.get(*pos) == Some(&')');
                if closed {
                    *pos += 1;
                }
                if !word.is_empty() {
                    nodes.push(ValueNode::Word(word));
                }
                nodes.push(ValueNode::Function(FunctionNode {
                    name: String::new(),
                    nodes: inner,
                    closed,
                }));
            } else if !word.is_empty() {
                nodes.push(ValueNode::Word(word));
            } else {
                // A stray ')' at top level; keep it so output stays verbatim
                nodes.push(ValueNode::Word(ch.to_string()));
                *pos += 1;
            }
        }
    }

    nodes
}

fn scan_quoted(chars: &[char], pos: &mut usize, quote: char) -> String {
    let start = *pos;
    *pos += 1;
    while let Some(&c) = chars.get(*pos) {
        *pos += 1;
        if c == quote {
            break;
        }
    }
    chars[start..*pos].iter().collect()
}

fn is_identifier(word: &str) -> bool {
    let mut chars = word.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '-' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Serialize a node list back to CSS value text. For unmodified trees this
/// reproduces the parser input exactly.
pub fn serialize(nodes: &[ValueNode]) -> String {
    let mut out = String::new();
    write_nodes(nodes, &mut out);
    out
}

fn write_nodes(nodes: &[ValueNode], out: &mut String) {
    for node in nodes {
        match node {
            ValueNode::Word(text) | ValueNode::Whitespace(text) => out.push_str(text),
            ValueNode::Separator(ch) => out.push(*ch),
            ValueNode::Function(func) => {
                out.push_str(&func.name);
                out.push('(');
                write_nodes(&func.nodes, out);
                if func.closed {
                    out.push(')');
                }
            }
        }
    }
}

/// Interpret a function node as an rre() call. Returns `None` when the node
/// is not one: wrong name, unterminated, empty argument list, or a first
/// argument that does not parse as a number. Arguments past the second are
/// ignored.
pub fn rre_call(func: &FunctionNode) -> Option<RreCall> {
    if func.name != RRE_FUNCTION || !func.closed {
        return None;
    }

    let args = split_arguments(&func.nodes);
    let first = args.first()?;
    let base_value: f64 = first.trim().parse().ok()?;
    if !base_value.is_finite() {
        return None;
    }

    let token = args
        .get(1)
        .map(|raw| strip_quotes(raw).to_string())
        .filter(|token| !token.is_empty());

    Some(RreCall { base_value, token })
}

fn split_arguments(nodes: &[ValueNode]) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = Vec::new();

    for node in nodes {
        if matches!(node, ValueNode::Separator(',')) {
            args.push(serialize(&current).trim().to_string());
            current.clear();
        } else {
            current.push(node.clone());
        }
    }

    let last = serialize(&current).trim().to_string();
    if !last.is_empty() || !args.is_empty() {
        args.push(last);
    }

    args
}

/// Collect every valid rre() call in the tree, including calls nested inside
/// other functions such as `calc()`.
pub fn extract_calls(nodes: &[ValueNode]) -> Vec<RreCall> {
    let mut calls = Vec::new();
    collect_calls(nodes, &mut calls);
    calls
}

fn collect_calls(nodes: &[ValueNode], calls: &mut Vec<RreCall>) {
    for node in nodes {
        if let ValueNode::Function(func) = node {
            if let Some(call) = rre_call(func) {
                calls.push(call);
            } else {
                collect_calls(&func.nodes, calls);
            }
        }
    }
}

/// Walk the tree and swap each valid rre() call for the node the callback
/// returns; a `None` from the callback leaves that occurrence untouched.
/// Invalid occurrences are never offered for replacement, so their text
/// survives verbatim in the serialized output.
pub fn replace_calls<F>(nodes: &mut [ValueNode], replace: &mut F)
where
    F: FnMut(&RreCall) -> Option<ValueNode>,
{
    for node in nodes.iter_mut() {
        let replacement = match node {
            ValueNode::Function(func) => rre_call(func).and_then(|call| replace(&call)),
            _ => None,
        };

        if let Some(new_node) = replacement {
            *node = new_node;
        } else if let ValueNode::Function(func) = node {
            replace_calls(&mut func.nodes, replace);
        }
    }
}
