//! Recursive directory scanner building the combined tree.

use crate::model::{DirNode, FileNode, Node, Tree, ROOT_REL_PATH};
use crate::parser::SourceParser;
use crate::pattern::{matches_any, PatternSet};
use anyhow::{bail, Context, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, info, warn};

/// Filters and bounds applied while walking the source tree.
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// Entries whose relative path matches are skipped entirely.
    pub exclude: Option<PatternSet>,
    /// Deepest level whose entries are listed; children of the root are level 0.
    pub max_depth: Option<usize>,
    /// Sort entries by name instead of keeping directory listing order.
    pub sort_entries: bool,
}

/// Walk `root` and parse every file the parser accepts.
pub fn scan<P: SourceParser>(root: &Path, parser: &P, opts: &ScanOptions) -> Result<Tree<P::Content>> {
    if !root.is_dir() {
        bail!("search directory not found: {}", root.display());
    }
    let root = root
        .canonicalize()
        .with_context(|| format!("failed to resolve {}", root.display()))?;
    let basename = root
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| root.display().to_string());

    info!(root = %root.display(), "scanning source tree");
    let scanner = Scanner { parser, opts };
    let mut tree_root = DirNode::new(ROOT_REL_PATH);
    scanner.scan_dir(&root, None, 0, &mut tree_root)?;

    Ok(Tree {
        basename,
        root: tree_root,
    })
}

struct Scanner<'a, P> {
    parser: &'a P,
    opts: &'a ScanOptions,
}

impl<P: SourceParser> Scanner<'_, P> {
    fn scan_dir(
        &self,
        dir: &Path,
        rel_dir: Option<&str>,
        depth: usize,
        node: &mut DirNode<P::Content>,
    ) -> Result<()> {
        if self.opts.max_depth.is_some_and(|max| depth > max) {
            return Ok(());
        }

        let listing = match fs::read_dir(dir) {
            Ok(listing) => listing,
            Err(e) if e.kind() == ErrorKind::PermissionDenied => {
                warn!(path = %dir.display(), "permission denied, skipping directory");
                return Ok(());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("failed to read directory {}", dir.display()))
            }
        };
        let mut entries = listing
            .collect::<std::io::Result<Vec<_>>>()
            .with_context(|| format!("failed to read directory {}", dir.display()))?;
        if self.opts.sort_entries {
            entries.sort_by_key(|entry| entry.file_name());
        }
        debug!(path = %dir.display(), entries = entries.len(), depth, "listing directory");

        for entry in entries {
            let name = entry.file_name().to_string_lossy().into_owned();
            let rel_path = match rel_dir {
                Some(parent) => format!("{}/{}", parent, name),
                None => name.clone(),
            };
            if matches_any(&rel_path, self.opts.exclude.as_ref()) {
                debug!(rel_path, "excluded");
                continue;
            }

            let path = entry.path();
            if path.is_dir() {
                let mut child = DirNode::new(rel_path.clone());
                self.scan_dir(&path, Some(&rel_path), depth + 1, &mut child)?;
                node.children.insert(name, Node::Directory(child));
            } else if self.parser.accepts(&name) {
                let content = self.parser.parse_file(&path)?;
                node.children.insert(
                    name,
                    Node::File(FileNode {
                        rel_path,
                        index: None,
                        content,
                    }),
                );
            }
        }
        Ok(())
    }
}
