//! srcdoc: extract documentation structure from a source tree.
//!
//! Walks a directory, parses every file of one language with a
//! [`SourceParser`], and produces an [`Extraction`]: a box-drawing listing
//! of the tree plus one flattened record per file, ready to be handed to a
//! document template.
//!
//! ```no_run
//! use srcdoc::{extract, ExtractOptions, PythonParser, EXCLUDE_MARKER};
//!
//! let parser = PythonParser::new(EXCLUDE_MARKER)?;
//! let opts = ExtractOptions::new(&["__pycache__"], &[] as &[&str], None)?;
//! let extraction = extract("src".as_ref(), &parser, &opts)?;
//! println!("{}", extraction.dir_tree);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod flatten;
pub mod instance;
pub mod model;
pub mod parser;
pub mod pattern;
pub mod render;
pub mod scan;
pub mod tree;

use anyhow::Result;
use std::path::Path;
use tracing::info;

pub use flatten::EXCLUDE_MARKER;
pub use model::{Extraction, FileRecord, Tree};
pub use parser::python::PythonParser;
pub use parser::systemverilog::SystemVerilogParser;
pub use parser::SourceParser;
pub use pattern::PatternSet;
pub use render::{anchor_id, render_tree, TreeStyle};
pub use scan::ScanOptions;

/// Everything that shapes one extraction run.
#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    pub scan: ScanOptions,
    /// `None` keeps every scanned entry.
    pub include: Option<PatternSet>,
    pub tree_style: TreeStyle,
}

impl ExtractOptions {
    /// Compile exclude and include patterns. An empty list disables that
    /// filter.
    pub fn new<S: AsRef<str>>(exclude: &[S], include: &[S], max_depth: Option<usize>) -> Result<Self> {
        Ok(Self {
            scan: ScanOptions {
                exclude: compile(exclude)?,
                max_depth,
                sort_entries: false,
            },
            include: compile(include)?,
            tree_style: TreeStyle::default(),
        })
    }

    pub fn sort_entries(mut self, sort: bool) -> Self {
        self.scan.sort_entries = sort;
        self
    }

    pub fn tree_style(mut self, style: TreeStyle) -> Self {
        self.tree_style = style;
        self
    }
}

fn compile<S: AsRef<str>>(patterns: &[S]) -> Result<Option<PatternSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }
    PatternSet::new(patterns).map(Some)
}

/// Scan, prune, index, render and flatten `root`.
pub fn extract<P: SourceParser>(root: &Path, parser: &P, opts: &ExtractOptions) -> Result<Extraction<P::Record>> {
    let combined = scan::scan(root, parser, &opts.scan)?;
    let pruned = tree::prune(combined, opts.include.as_ref());
    let indexed = tree::assign_indices(pruned);

    let dir_tree = render_tree(&indexed, opts.tree_style);
    let list_of_files = tree::flatten(&indexed, |content| parser.flatten_content(content));
    info!(files = list_of_files.len(), "extraction complete");

    Ok(Extraction {
        dir_tree,
        list_of_files,
    })
}
