//! Python signature extractor.
//!
//! Parses with tree-sitter and records every top-level function and class
//! (and the methods of each class): names, line spans, parameters,
//! decorators, the header as written, and the docstring.

use crate::flatten;
use crate::model::*;
use crate::parser::SourceParser;
use crate::pattern::PatternSet;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, debug_span};
use tree_sitter::{Node, Parser};

/// Extracts signatures from `.py` files.
#[derive(Debug, Clone)]
pub struct PythonParser {
    exclude: PatternSet,
}

impl PythonParser {
    /// `exclude_marker` removes any item whose docstring contains it.
    pub fn new(exclude_marker: &str) -> Result<Self> {
        Ok(Self {
            exclude: PatternSet::literal(exclude_marker)?,
        })
    }
}

impl SourceParser for PythonParser {
    type Content = PyContent;
    type Record = PyContent;

    fn extensions(&self) -> &[&str] {
        &[".py"]
    }

    fn parse_file(&self, path: &Path) -> Result<PyContent> {
        let source = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let _span = debug_span!("python", path = %path.display()).entered();
        parse_source(&source)
    }

    fn flatten_content(&self, content: &PyContent) -> PyContent {
        flatten::python_record(content, &self.exclude)
    }
}

/// Parse Python source text. Source with syntax errors yields empty content.
pub fn parse_source(source: &str) -> Result<PyContent> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_python::language())
        .context("failed to load the Python grammar")?;

    let Some(tree) = parser.parse(source, None) else {
        return Ok(PyContent::default());
    };
    let root = tree.root_node();
    if root.has_error() {
        debug!("syntax error, file contributes no signatures");
        return Ok(PyContent::default());
    }

    let mut content = PyContent::default();
    let mut cursor = root.walk();
    for node in root.named_children(&mut cursor) {
        let Some((def, decorators)) = unwrap_decorated(node, source) else {
            continue;
        };
        match def.kind() {
            "function_definition" => content.functions.push(function_sig(def, decorators, source)),
            "class_definition" => content.classes.push(class_sig(def, decorators, source)),
            _ => {}
        }
    }
    Ok(content)
}

// -- Definitions --------------------------------------------------------------

/// Split a (possibly decorated) definition into the definition node and its
/// rendered decorators.
fn unwrap_decorated<'t>(node: Node<'t>, source: &str) -> Option<(Node<'t>, Vec<String>)> {
    match node.kind() {
        "decorated_definition" => {
            let def = node.child_by_field_name("definition")?;
            let mut cursor = node.walk();
            let decorators = node
                .named_children(&mut cursor)
                .filter(|n| n.kind() == "decorator")
                .map(|n| format!("@{}", tidy_expr(text(n, source).trim_start_matches('@'))))
                .collect();
            Some((def, decorators))
        }
        "function_definition" | "class_definition" => Some((node, Vec::new())),
        _ => None,
    }
}

fn function_sig(def: Node, decorators: Vec<String>, source: &str) -> FunctionSig {
    let params = def.child_by_field_name("parameters");
    let (lineno_start, lineno_end) = line_span(def);

    FunctionSig {
        name: field_text(def, "name", source).unwrap_or_default(),
        lineno_start,
        lineno_end,
        args: params.map(|p| ordinary_params(p, source)).unwrap_or_default(),
        type_hints: params.map(|p| render_params(p, source)),
        returns: def
            .child_by_field_name("return_type")
            .map(|n| collapse_ws(text(n, source))),
        is_async: def.child(0).is_some_and(|c| c.kind() == "async"),
        signature: signature(def, &decorators, source),
        docstring: def
            .child_by_field_name("body")
            .and_then(|body| docstring(body, source)),
        decorators,
    }
}

fn class_sig(def: Node, decorators: Vec<String>, source: &str) -> ClassSig {
    let (lineno_start, lineno_end) = line_span(def);

    let bases = def
        .child_by_field_name("superclasses")
        .map(|args| {
            let mut cursor = args.walk();
            args.named_children(&mut cursor)
                .filter(|n| !matches!(n.kind(), "keyword_argument" | "dictionary_splat" | "comment"))
                .map(|n| collapse_ws(text(n, source)))
                .collect()
        })
        .unwrap_or_default();

    let body = def.child_by_field_name("body");
    let methods = body
        .map(|body| {
            let mut cursor = body.walk();
            body.named_children(&mut cursor)
                .filter_map(|n| unwrap_decorated(n, source))
                .filter(|(def, _)| def.kind() == "function_definition")
                .map(|(def, decorators)| function_sig(def, decorators, source))
                .collect()
        })
        .unwrap_or_default();

    ClassSig {
        name: field_text(def, "name", source).unwrap_or_default(),
        lineno_start,
        lineno_end,
        bases,
        signature: signature(def, &decorators, source),
        docstring: body.and_then(|body| docstring(body, source)),
        decorators,
        methods,
    }
}

// -- Parameters ---------------------------------------------------------------

/// Positional-or-keyword parameter names: positional-only parameters,
/// `*args`, keyword-only parameters and `**kwargs` are left out.
fn ordinary_params(params: Node, source: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut cursor = params.walk();

    for param in params.named_children(&mut cursor) {
        match param.kind() {
            "positional_separator" => names.clear(),
            "keyword_separator" | "list_splat_pattern" | "dictionary_splat_pattern" => break,
            "identifier" => names.push(text(param, source).to_string()),
            "default_parameter" | "typed_default_parameter" => {
                if let Some(name) = field_text(param, "name", source) {
                    names.push(name);
                }
            }
            "typed_parameter" => match param.named_child(0) {
                Some(inner) if inner.kind() == "identifier" => {
                    names.push(text(inner, source).to_string())
                }
                _ => break,
            },
            _ => {}
        }
    }
    names
}

/// The parameter list without its parentheses, one space after each comma.
fn render_params(params: Node, source: &str) -> String {
    let mut cursor = params.walk();
    params
        .named_children(&mut cursor)
        .filter(|n| n.kind() != "comment")
        .map(|n| collapse_ws(text(n, source)))
        .collect::<Vec<_>>()
        .join(", ")
}

// -- Source text --------------------------------------------------------------

/// Decorators followed by the header lines up to the first line ending in
/// a colon (ignoring a trailing `#` comment).
fn signature(def: Node, decorators: &[String], source: &str) -> String {
    let mut header = Vec::new();
    for line in text(def, source).lines() {
        header.push(line);
        let code = line.split('#').next().unwrap_or_default().trim_end();
        if code.ends_with(':') {
            break;
        }
    }

    decorators
        .iter()
        .map(String::as_str)
        .chain(header)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Leading string statement of a body, cleaned like `inspect.cleandoc`.
fn docstring(body: Node, source: &str) -> Option<String> {
    let mut cursor = body.walk();
    let first = body
        .named_children(&mut cursor)
        .find(|n| n.kind() != "comment")?;
    if first.kind() != "expression_statement" || first.named_child_count() != 1 {
        return None;
    }
    let expr = first.named_child(0)?;
    if expr.kind() != "string" {
        return None;
    }
    string_value(text(expr, source)).map(|value| clean_docstring(&value))
}

/// Contents of a plain (non-f, non-bytes) string literal, escapes decoded
/// unless the literal is raw.
fn string_value(literal: &str) -> Option<String> {
    let prefix_len = literal.find(['"', '\''])?;
    let prefix = &literal[..prefix_len];
    if prefix.chars().any(|c| matches!(c, 'f' | 'F' | 'b' | 'B')) {
        return None;
    }
    let quoted = &literal[prefix_len..];
    let quote = if quoted.starts_with("\"\"\"") || quoted.starts_with("'''") {
        &quoted[..3]
    } else {
        &quoted[..1]
    };
    let inner = quoted.strip_prefix(quote)?.strip_suffix(quote)?;
    if prefix.contains(['r', 'R']) {
        Some(inner.to_string())
    } else {
        Some(unescape(inner))
    }
}

/// Decode the simple backslash escapes; unknown escapes are kept verbatim.
fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('\\') => out.push('\\'),
            Some('"') => out.push('"'),
            Some('\'') => out.push('\''),
            // line continuation
            Some('\n') => {}
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Strip the common indentation of all lines after the first and drop
/// leading and trailing blank lines.
pub fn clean_docstring(raw: &str) -> String {
    let expanded: Vec<String> = raw.lines().map(expand_tabs).collect();
    let lines: Vec<&str> = expanded.iter().map(String::as_str).collect();
    let margin = lines
        .iter()
        .skip(1)
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start().len())
        .min()
        .unwrap_or(0);

    let mut cleaned: Vec<&str> = lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            if i == 0 {
                line.trim_start()
            } else {
                line.get(margin..).unwrap_or_default()
            }
        })
        .collect();

    while cleaned.last().is_some_and(|l| l.trim().is_empty()) {
        cleaned.pop();
    }
    let leading = cleaned.iter().take_while(|l| l.trim().is_empty()).count();
    cleaned[leading..].join("\n")
}

/// Replace tabs with spaces up to the next multiple of 8 columns.
fn expand_tabs(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut column = 0;
    for c in line.chars() {
        if c == '\t' {
            let width = 8 - column % 8;
            out.extend(std::iter::repeat(' ').take(width));
            column += width;
        } else {
            out.push(c);
            column += 1;
        }
    }
    out
}

/// 1-based first and last line of a node. Trailing comments do not count.
fn line_span(node: Node) -> (usize, usize) {
    let start = node.start_position();
    let mut last = node;
    while let Some(child) = (0..last.child_count())
        .rev()
        .filter_map(|i| last.child(i))
        .find(|c| c.kind() != "comment" && c.end_byte() > c.start_byte())
    {
        last = child;
    }
    let end = last.end_position();
    // A token ending at column 0 ends on the previous line.
    let end_row = if end.column == 0 && end.row > start.row {
        end.row - 1
    } else {
        end.row
    };
    (start.row + 1, end_row + 1)
}

fn text<'s>(node: Node, source: &'s str) -> &'s str {
    &source[node.start_byte()..node.end_byte()]
}

fn field_text(node: Node, field: &str, source: &str) -> Option<String> {
    node.child_by_field_name(field)
        .map(|n| text(n, source).to_string())
}

fn collapse_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Single-line form of an expression: whitespace collapsed and no padding
/// inside brackets.
fn tidy_expr(s: &str) -> String {
    let mut out = collapse_ws(s);
    for (from, to) in [("( ", "("), ("[ ", "["), ("{ ", "{"), (" )", ")"), (" ]", "]"), (" }", "}")] {
        out = out.replace(from, to);
    }
    out
}
