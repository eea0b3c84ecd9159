//! SystemVerilog module interface extractor.
//!
//! Best-effort pattern extraction, not a grammar: finds `module ... endmodule`
//! spans, isolates each header with a bracket-depth scanner, and reads the
//! parameter and port lists item by item. `docs_description` comments are
//! collected as free-text file documentation.

use crate::flatten;
use crate::model::*;
use crate::parser::balanced::{self, Header};
use crate::parser::SourceParser;
use anyhow::{Context, Result};
use regex::Regex;
use std::fs;
use std::ops::Range;
use std::path::Path;
use std::sync::LazyLock;
use tracing::{debug, debug_span, warn};

/// Comments starting with this keyword become file documentation.
pub const DOCS_MARKER: &str = "docs_description";

// -- Regex patterns -----------------------------------------------------------

static RE_INLINE_DOCS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"//[ \t]*{}[ \t]*(.*)", regex::escape(DOCS_MARKER))).unwrap()
});

static RE_BLOCK_DOCS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?s)/\*\s*{}\s*(.*?)\*/", regex::escape(DOCS_MARKER))).unwrap()
});

static RE_MODULE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\bmodule\b.*?\bendmodule\b").unwrap());

static RE_MODULE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^module\s+(?:(?:static|automatic)\s+)?([A-Za-z_]\w*)").unwrap()
});

static RE_IDENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[A-Za-z_]\w*").unwrap());

static RE_RANGE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*\[[^\[\]]*\]\s*").unwrap());

static RE_PORT_HEAD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(input|output|inout)\b\s*(?:(?:wire|reg|logic)\b\s*)?(?:(?:signed|unsigned)\b\s*)?")
        .unwrap()
});

// Continuation item of an ANSI port list: `b` in `input logic a, b`
static RE_BARE_PORT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_]\w*(?:\s*\[[^\[\]]*\])*$").unwrap());

// -- Parser -------------------------------------------------------------------

/// Extracts modules and `docs_description` comments from `.sv` files.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemVerilogParser;

impl SourceParser for SystemVerilogParser {
    type Content = SvContent;
    type Record = SvRecord;

    fn extensions(&self) -> &[&str] {
        &[".sv"]
    }

    fn parse_file(&self, path: &Path) -> Result<SvContent> {
        let source = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let _span = debug_span!("systemverilog", path = %path.display()).entered();
        let (content, skipped) = parse_with_skipped(&source);
        for line in skipped {
            warn!(path = %path.display(), line, "module header not recognized, skipping module");
        }
        Ok(content)
    }

    fn flatten_content(&self, content: &SvContent) -> SvRecord {
        flatten::sv_record(content)
    }
}

/// Parse SystemVerilog source text, silently dropping unrecognized modules.
pub fn parse_source(source: &str) -> SvContent {
    parse_with_skipped(source).0
}

/// Parse SystemVerilog source text; also returns the 1-based line of every
/// module whose header was not recognized.
pub fn parse_with_skipped(source: &str) -> (SvContent, Vec<usize>) {
    let masked = mask_comments(source);
    let mut modules = Vec::new();
    let mut skipped = Vec::new();

    for m in RE_MODULE.find_iter(&masked) {
        match parse_module(source, &masked, m.range()) {
            Some(module) => modules.push(module),
            None => skipped.push(masked[..m.start()].matches('\n').count() + 1),
        }
    }
    debug!(modules = modules.len(), skipped = skipped.len(), "parsed systemverilog source");

    let content = SvContent {
        modules,
        docs: extract_docs(source),
    };
    (content, skipped)
}

/// Collect `docs_description` comments: inline ones first, then blocks.
pub fn extract_docs(source: &str) -> Option<String> {
    let mut comments: Vec<String> = RE_INLINE_DOCS
        .captures_iter(source)
        .map(|caps| caps[1].trim_end().to_string())
        .collect();
    comments.extend(
        RE_BLOCK_DOCS
            .captures_iter(source)
            .map(|caps| caps[1].trim_end().to_string()),
    );

    if comments.is_empty() {
        None
    } else {
        Some(comments.join("\n"))
    }
}

/// Replace the body of every `//` and `/* */` comment with spaces.
///
/// Byte offsets and newlines are preserved, so positions found in the
/// masked text index the original text directly. String literals are
/// copied through untouched.
pub fn mask_comments(source: &str) -> String {
    #[derive(PartialEq)]
    enum State {
        Code,
        Str,
        Line,
        Block,
    }

    let mut out = String::with_capacity(source.len());
    let mut state = State::Code;
    let mut chars = source.char_indices();

    while let Some((i, c)) = chars.next() {
        match state {
            State::Code => {
                let rest = &source[i..];
                if rest.starts_with("//") || rest.starts_with("/*") {
                    state = if rest.starts_with("//") { State::Line } else { State::Block };
                    chars.next();
                    out.push_str("  ");
                    continue;
                }
                if c == '"' {
                    state = State::Str;
                }
                out.push(c);
            }
            State::Str => {
                out.push(c);
                if c == '\\' {
                    if let Some((_, escaped)) = chars.next() {
                        out.push(escaped);
                    }
                } else if c == '"' || c == '\n' {
                    state = State::Code;
                }
            }
            State::Line => {
                if c == '\n' {
                    state = State::Code;
                    out.push('\n');
                } else {
                    blank(&mut out, c);
                }
            }
            State::Block => {
                if source[i..].starts_with("*/") {
                    chars.next();
                    out.push_str("  ");
                    state = State::Code;
                } else if c == '\n' {
                    out.push('\n');
                } else {
                    blank(&mut out, c);
                }
            }
        }
    }
    out
}

fn blank(out: &mut String, c: char) {
    for _ in 0..c.len_utf8() {
        out.push(' ');
    }
}

// -- Module headers -----------------------------------------------------------

/// Original and masked text of one parenthesized group, parentheses removed.
struct Group<'a> {
    original: &'a str,
    masked: &'a str,
}

impl<'a> Group<'a> {
    fn new(source: &'a str, masked: &'a str, offset: usize, range: &Range<usize>) -> Self {
        let inner = offset + range.start + 1..offset + range.end - 1;
        Group {
            original: &source[inner.clone()],
            masked: &masked[inner],
        }
    }

    /// Trimmed bounds of each top-level comma-separated item.
    fn items(&self) -> impl Iterator<Item = Range<usize>> + '_ {
        balanced::split_top_level(self.masked)
            .into_iter()
            .filter_map(|r| {
                let item = &self.masked[r.clone()];
                let trimmed = item.trim();
                if trimmed.is_empty() {
                    return None;
                }
                let start = r.start + (item.len() - item.trim_start().len());
                Some(start..start + trimmed.len())
            })
    }

    /// A `//` comment following the item ending at `end`, on the same line,
    /// after at most one comma.
    fn trailing_comment(&self, end: usize) -> Option<String> {
        let rest = self.original[end..].trim_start_matches([' ', '\t']);
        let rest = rest.strip_prefix(',').unwrap_or(rest).trim_start_matches([' ', '\t']);
        if !rest.starts_with("//") {
            return None;
        }
        let line_end = rest.find('\n').unwrap_or(rest.len());
        Some(rest[..line_end].trim_end().to_string())
    }
}

fn parse_module(source: &str, masked: &str, span: Range<usize>) -> Option<ModuleDef> {
    let text = &masked[span.clone()];
    let Header { end, groups } = balanced::scan_header(text)?;
    let name = RE_MODULE_NAME.captures(&text[..end])?[1].to_string();

    let group = |range: &Range<usize>| Group::new(source, masked, span.start, range);
    let (params, ports) = match groups.as_slice() {
        [] => (None, None),
        [ports] => (None, Some(parse_ports(&group(ports)))),
        [params, ports, ..] => (
            Some(parse_params(&group(params))),
            Some(parse_ports(&group(ports))),
        ),
    };

    Some(ModuleDef { name, params, ports })
}

// -- Parameters ---------------------------------------------------------------

fn parse_params(group: &Group) -> Vec<Param> {
    group
        .items()
        .filter_map(|item| parse_param(group, item))
        .collect()
}

/// `[parameter|localparam] [type] [ranges] NAME [= DEFAULT]`
fn parse_param(group: &Group, item: Range<usize>) -> Option<Param> {
    let body = &group.masked[item.clone()];
    let (decl, default_range) = match body.find('=') {
        Some(eq) => (&body[..eq], Some(item.start + eq + 1..item.end)),
        None => (body, None),
    };

    let decl = RE_RANGE.replace_all(decl, " ");
    let name = RE_IDENT
        .find_iter(&decl)
        .last()
        .map(|m| m.as_str())
        .filter(|name| !matches!(*name, "parameter" | "localparam"))?
        .to_string();

    let default_val = default_range.and_then(|range| {
        // The default starts at the first non-blank character, possibly on
        // a later line, and ends at the end of that line.
        let masked = &group.masked[range.clone()];
        let start = masked.len() - masked.trim_start().len();
        let len = masked[start..].find(['\r', '\n']).unwrap_or(masked.len() - start);
        let value = group.original[range.start + start..range.start + start + len].trim();
        (!value.is_empty()).then(|| value.to_string())
    });

    Some(Param {
        name,
        default_val,
        comment: group.trailing_comment(item.end),
    })
}

// -- Ports --------------------------------------------------------------------

fn parse_ports(group: &Group) -> Vec<Port> {
    let mut ports = Vec::new();
    let mut direction = None;

    for item in group.items() {
        let body = &group.masked[item.clone()];
        let decl_start = if let Some(caps) = RE_PORT_HEAD.captures(body) {
            direction = Direction::parse(&caps[1]);
            caps[0].len()
        } else if RE_BARE_PORT.is_match(body) && direction.is_some() {
            0
        } else {
            // Interface ports and non-ANSI lists carry no direction here.
            direction = None;
            continue;
        };
        let Some(dir) = direction else { continue };

        let decl = &group.original[item.start + decl_start..item.end];
        let name_and_ranges = decl.split_whitespace().collect::<Vec<_>>().join(" ");
        let stripped = RE_RANGE.replace_all(&name_and_ranges, " ");
        let Some(name) = stripped.split_whitespace().last() else {
            continue;
        };

        ports.push(Port {
            direction: dir,
            name: name.to_string(),
            name_and_ranges,
            comment: group.trailing_comment(item.end),
        });
    }
    ports
}

#[cfg(test)]
mod tests {
    use super::*;

    const COUNTER: &str = "\
// docs_description Simple counter library
module counter #(
    parameter int WIDTH = 8,   // counter width
    parameter RESET_VAL = 0
) (
    input  logic             clk,    // system clock
    input  logic             rst_n,
    output logic [WIDTH-1:0] count   // current value
);
    always_ff @(posedge clk) count <= count + 1;
endmodule
";

    #[test]
    fn parses_module_name_params_and_ports() {
        let content = parse_source(COUNTER);
        assert_eq!(content.modules.len(), 1);
        let module = &content.modules[0];
        assert_eq!(module.name, "counter");

        let params = module.params.as_ref().unwrap();
        assert_eq!(params.len(), 2);
        assert_eq!(params[0].name, "WIDTH");
        assert_eq!(params[0].default_val.as_deref(), Some("8"));
        assert_eq!(params[0].comment.as_deref(), Some("// counter width"));
        assert_eq!(params[1].name, "RESET_VAL");
        assert_eq!(params[1].default_val.as_deref(), Some("0"));
        assert_eq!(params[1].comment, None);

        let ports = module.ports.as_ref().unwrap();
        assert_eq!(ports.len(), 3);
        assert_eq!(ports[0].direction, Direction::Input);
        assert_eq!(ports[0].name, "clk");
        assert_eq!(ports[0].comment.as_deref(), Some("// system clock"));
        assert_eq!(ports[1].name, "rst_n");
        assert_eq!(ports[1].comment, None);
        assert_eq!(ports[2].direction, Direction::Output);
        assert_eq!(ports[2].name, "count");
        assert_eq!(ports[2].name_and_ranges, "[WIDTH-1:0] count");
        assert!(ports[2].has_range());
        assert!(!ports[0].has_range());
    }

    #[test]
    fn collects_inline_docs() {
        let content = parse_source(COUNTER);
        assert_eq!(content.docs.as_deref(), Some("Simple counter library"));
    }

    #[test]
    fn docs_inline_before_block() {
        let src = "/* docs_description block text\n  more */\n// docs_description inline\n// unrelated\n";
        assert_eq!(
            extract_docs(src).as_deref(),
            Some("inline\nblock text\n  more")
        );
    }

    #[test]
    fn no_docs_is_absent() {
        assert_eq!(extract_docs("// just a comment\nmodule m; endmodule"), None);
    }

    #[test]
    fn ports_only_module() {
        let src = "module gate (input wire a, input wire b, output wire y);\nendmodule\n";
        let module = &parse_source(src).modules[0];
        assert_eq!(module.name, "gate");
        assert_eq!(module.params, None);
        let names: Vec<&str> = module.ports.as_ref().unwrap().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "y"]);
    }

    #[test]
    fn testbench_without_header_groups() {
        let src = "module tb;\n  initial $display(\"hi\");\nendmodule\n";
        let module = &parse_source(src).modules[0];
        assert_eq!(module.name, "tb");
        assert_eq!(module.params, None);
        assert_eq!(module.ports, None);
    }

    #[test]
    fn body_parentheses_do_not_leak_into_header() {
        let src = "module m (input logic a);\n  assign b = f(a);\nendmodule\n";
        let module = &parse_source(src).modules[0];
        assert_eq!(module.params, None);
        assert_eq!(module.ports.as_ref().unwrap().len(), 1);
    }

    #[test]
    fn nested_parentheses_in_defaults() {
        let src = "module m #(parameter DEPTH = (1 << 4), parameter W = $clog2(DEPTH)) (input logic [W-1:0] addr);\nendmodule";
        let module = &parse_source(src).modules[0];
        let params = module.params.as_ref().unwrap();
        assert_eq!(params[0].default_val.as_deref(), Some("(1 << 4)"));
        assert_eq!(params[1].name, "W");
        assert_eq!(params[1].default_val.as_deref(), Some("$clog2(DEPTH)"));
        assert_eq!(module.ports.as_ref().unwrap()[0].name, "addr");
    }

    #[test]
    fn param_without_default() {
        let src = "module m #(parameter W) (input logic a);\nendmodule";
        let params = parse_source(src).modules[0].params.clone().unwrap();
        assert_eq!(params[0].name, "W");
        assert_eq!(params[0].default_val, None);
    }

    #[test]
    fn default_on_the_line_after_equals() {
        let src = "module m #(\n    parameter W =\n        8,\n    parameter D = 4\n) (input logic a);\nendmodule";
        let params = parse_source(src).modules[0].params.clone().unwrap();
        assert_eq!(params[0].name, "W");
        assert_eq!(params[0].default_val.as_deref(), Some("8"));
        assert_eq!(params[1].default_val.as_deref(), Some("4"));
    }

    #[test]
    fn multiple_modules_in_one_file() {
        let src = "module a (input logic x);\nendmodule\n\nmodule b;\nendmodule\n";
        let names: Vec<String> = parse_source(src).modules.into_iter().map(|m| m.name).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn keywords_in_comments_are_ignored() {
        let src = "// this module (draft) is great\nmodule real_one (input logic a /* (x */);\nendmodule\n";
        let content = parse_source(src);
        assert_eq!(content.modules.len(), 1);
        assert_eq!(content.modules[0].name, "real_one");
        assert_eq!(content.modules[0].ports.as_ref().unwrap()[0].name, "a");
    }

    #[test]
    fn unrecognized_header_is_dropped() {
        let src = "module broken (input logic a\nendmodule\nmodule ok;\nendmodule\n";
        let names: Vec<String> = parse_source(src).modules.into_iter().map(|m| m.name).collect();
        assert_eq!(names, vec!["ok"]);
    }

    #[test]
    fn skipped_modules_report_their_line() {
        let src = "// header\nmodule ok;\nendmodule\n\nmodule broken (input logic a\nendmodule\n";
        let (content, skipped) = parse_with_skipped(src);
        assert_eq!(content.modules.len(), 1);
        assert_eq!(skipped, vec![5]);
    }

    #[test]
    fn ansi_continuation_inherits_direction() {
        let src = "module m (input logic a, b [3:0], output logic y);\nendmodule";
        let ports = parse_source(src).modules[0].ports.clone().unwrap();
        assert_eq!(ports.len(), 3);
        assert_eq!(ports[1].direction, Direction::Input);
        assert_eq!(ports[1].name, "b");
        assert_eq!(ports[1].name_and_ranges, "b [3:0]");
    }

    #[test]
    fn comment_on_next_item_is_not_stolen() {
        let src = "module m (input logic a, input logic b, // for b\n output logic y);\nendmodule";
        let ports = parse_source(src).modules[0].ports.clone().unwrap();
        assert_eq!(ports[0].comment, None);
        assert_eq!(ports[1].comment.as_deref(), Some("// for b"));
        assert_eq!(ports[2].comment, None);
    }

    #[test]
    fn masking_preserves_offsets() {
        let src = "a // ünïcode (\nb /* ( */ c \"// kept\"";
        let masked = mask_comments(src);
        assert_eq!(masked.len(), src.len());
        assert!(!masked.contains('('));
        assert!(masked.contains("\"// kept\""));
        assert_eq!(masked.find('b'), src.find('b'));
    }
}
