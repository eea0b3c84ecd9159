//! Bracket-depth scanning for parenthesized SystemVerilog structures.
//!
//! Works on comment-masked text (see `systemverilog::mask_comments`), so
//! every `(`, `)`, `,` and `;` seen here is real syntax.

use std::ops::Range;

/// A module header: where it ends and its top-level `( ... )` groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// Byte offset just past the terminating `;`.
    pub end: usize,
    /// Byte ranges of each top-level group, parentheses included.
    pub groups: Vec<Range<usize>>,
}

/// Walk `text` from the start, collecting top-level parenthesized groups,
/// until the first `;` at depth zero.
///
/// Returns `None` for an unbalanced `)` or when no terminating `;` exists.
pub fn scan_header(text: &str) -> Option<Header> {
    let mut depth = 0usize;
    let mut group_start = 0;
    let mut groups = Vec::new();

    for (i, b) in text.bytes().enumerate() {
        match b {
            b'(' => {
                if depth == 0 {
                    group_start = i;
                }
                depth += 1;
            }
            b')' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    groups.push(group_start..i + 1);
                }
            }
            b';' if depth == 0 => {
                return Some(Header { end: i + 1, groups });
            }
            _ => {}
        }
    }
    None
}

/// Split `text` at commas outside any `()`, `[]` or `{}` nesting.
///
/// Returned ranges cover the text between separators, untrimmed.
pub fn split_top_level(text: &str) -> Vec<Range<usize>> {
    let mut depth = 0usize;
    let mut start = 0;
    let mut items = Vec::new();

    for (i, b) in text.bytes().enumerate() {
        match b {
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => depth = depth.saturating_sub(1),
            b',' if depth == 0 => {
                items.push(start..i);
                start = i + 1;
            }
            _ => {}
        }
    }
    items.push(start..text.len());
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_with_params_and_ports() {
        let text = "module m #(parameter W = (2*4)) (input logic [W-1:0] a);\n  assign x = f(a);";
        let header = scan_header(text).unwrap();
        assert_eq!(&text[..header.end], "module m #(parameter W = (2*4)) (input logic [W-1:0] a);");
        assert_eq!(header.groups.len(), 2);
        assert_eq!(&text[header.groups[0].clone()], "(parameter W = (2*4))");
        assert_eq!(&text[header.groups[1].clone()], "(input logic [W-1:0] a)");
    }

    #[test]
    fn header_without_groups() {
        let header = scan_header("module tb;\n  initial $display(\"x\");").unwrap();
        assert_eq!(header.end, "module tb;".len());
        assert!(header.groups.is_empty());
    }

    #[test]
    fn semicolon_inside_group_does_not_end_header() {
        let text = "module m (input a; b);";
        let header = scan_header(text).unwrap();
        assert_eq!(header.end, text.len());
        assert_eq!(header.groups.len(), 1);
    }

    #[test]
    fn unbalanced_close_is_rejected() {
        assert_eq!(scan_header("module m (a));"), None);
    }

    #[test]
    fn missing_terminator_is_rejected() {
        assert_eq!(scan_header("module m (input a)\nendmodule"), None);
    }

    #[test]
    fn split_respects_nesting() {
        let text = "a = {1, 2}, b = f(x, y), c [3:0]";
        let items: Vec<&str> = split_top_level(text).into_iter().map(|r| &text[r]).collect();
        assert_eq!(items, vec!["a = {1, 2}", " b = f(x, y)", " c [3:0]"]);
    }
}
