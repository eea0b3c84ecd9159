//! Box-drawing rendering of the combined tree.

use crate::model::{DirNode, Node, Tree};

const BRANCH: &str = "├── ";
const LAST_BRANCH: &str = "└── ";
const PIPE: &str = "│   ";
const SPACE: &str = "    ";

/// How file entries are decorated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeStyle {
    /// Wrap names as `link:<rel_path>[<name>]`.
    pub links: bool,
    /// Cross-reference the file's details section.
    pub anchors: bool,
}

/// AsciiDoc anchor id of a file's details section.
pub fn anchor_id(index: usize) -> String {
    format!("file-{}", index)
}

/// Render the tree, one entry per line, no trailing newline.
pub fn render_tree<C>(tree: &Tree<C>, style: TreeStyle) -> String {
    let mut lines = vec![format!("{}/", tree.basename)];
    render_dir(&tree.root, "", style, &mut lines);
    lines.join("\n")
}

fn render_dir<C>(dir: &DirNode<C>, prefix: &str, style: TreeStyle, lines: &mut Vec<String>) {
    let count = dir.children.len();
    for (i, (name, child)) in dir.children.iter().enumerate() {
        let last = i + 1 == count;
        let branch = if last { LAST_BRANCH } else { BRANCH };
        match child {
            Node::Directory(sub) => {
                lines.push(format!("{}{}{}/", prefix, branch, name));
                let nested = format!("{}{}", prefix, if last { SPACE } else { PIPE });
                render_dir(sub, &nested, style, lines);
            }
            Node::File(file) => {
                let entry = file_entry(name, &file.rel_path, file.index, style);
                lines.push(format!("{}{}{}", prefix, branch, entry));
            }
        }
    }
}

fn file_entry(name: &str, rel_path: &str, index: Option<usize>, style: TreeStyle) -> String {
    let index = index.filter(|_| style.anchors);
    match (style.links, index) {
        (false, None) => name.to_string(),
        (true, None) => format!("link:{}[{}]", rel_path, name),
        (false, Some(i)) => format!("<<{},{}>>", anchor_id(i), name),
        (true, Some(i)) => format!("link:{}[{}] (<<{},details>>)", rel_path, name, anchor_id(i)),
    }
}
