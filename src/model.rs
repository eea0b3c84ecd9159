//! Data model for the extracted source tree.

use indexmap::IndexMap;
use serde::Serialize;

// -- Tree ---------------------------------------------------------------------

/// Relative path of the scan root.
pub const ROOT_REL_PATH: &str = ".";

/// Combined tree of directories and parsed files.
#[derive(Debug, Clone, PartialEq)]
pub struct Tree<C> {
    /// Basename of the scanned directory (never `"."`).
    pub basename: String,
    pub root: DirNode<C>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node<C> {
    Directory(DirNode<C>),
    File(FileNode<C>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DirNode<C> {
    /// `/`-joined path relative to the scan root; `"."` for the root.
    pub rel_path: String,
    /// Children keyed by basename, in traversal order.
    pub children: IndexMap<String, Node<C>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FileNode<C> {
    pub rel_path: String,
    /// Anchor ordinal, set by `tree::assign_indices`.
    pub index: Option<usize>,
    pub content: C,
}

impl<C> DirNode<C> {
    pub fn new(rel_path: impl Into<String>) -> Self {
        Self {
            rel_path: rel_path.into(),
            children: IndexMap::new(),
        }
    }
}

impl<C> Node<C> {
    pub fn rel_path(&self) -> &str {
        match self {
            Node::Directory(dir) => &dir.rel_path,
            Node::File(file) => &file.rel_path,
        }
    }
}

// -- Flattened records --------------------------------------------------------

/// One file's extracted content in render-ready form.
#[derive(Debug, Clone, Serialize)]
pub struct FileRecord<R> {
    pub basename: String,
    pub rel_path: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub index: Option<usize>,
    #[serde(flatten)]
    pub content: R,
}

/// Everything the template collaborator needs to produce a document.
#[derive(Debug, Clone, Serialize)]
pub struct Extraction<R> {
    /// Pre-rendered path listing.
    pub dir_tree: String,
    pub list_of_files: Vec<FileRecord<R>>,
}

// -- Python -------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PyContent {
    pub functions: Vec<FunctionSig>,
    pub classes: Vec<ClassSig>,
}

/// Signature of a function or method.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FunctionSig {
    pub name: String,
    pub lineno_start: usize,
    pub lineno_end: usize,
    /// Ordinary (positional-or-keyword) parameter names
    pub args: Vec<String>,
    /// Whole parameter list rendered back to text
    pub type_hints: Option<String>,
    /// Return annotation
    pub returns: Option<String>,
    pub is_async: bool,
    /// `@expr`, one per decorator
    pub decorators: Vec<String>,
    /// Decorators plus header lines through the trailing colon
    pub signature: String,
    pub docstring: Option<String>,
}

pub type MethodSig = FunctionSig;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClassSig {
    pub name: String,
    pub lineno_start: usize,
    pub lineno_end: usize,
    pub bases: Vec<String>,
    pub decorators: Vec<String>,
    pub signature: String,
    pub docstring: Option<String>,
    pub methods: Vec<MethodSig>,
}

// -- SystemVerilog ------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SvContent {
    pub modules: Vec<ModuleDef>,
    /// `docs_description` comments, joined with newlines
    pub docs: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ModuleDef {
    pub name: String,
    pub params: Option<Vec<Param>>,
    pub ports: Option<Vec<Port>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Param {
    pub name: String,
    pub default_val: Option<String>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Input,
    Output,
    Inout,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Port {
    #[serde(rename = "type")]
    pub direction: Direction,
    /// Name with ranges stripped
    pub name: String,
    /// Name as written, ranges included (e.g. `[7:0] data`)
    pub name_and_ranges: String,
    pub comment: Option<String>,
}

impl Direction {
    pub fn parse(keyword: &str) -> Option<Self> {
        match keyword {
            "input" => Some(Direction::Input),
            "output" => Some(Direction::Output),
            "inout" => Some(Direction::Inout),
            _ => None,
        }
    }
}

impl Port {
    /// True when the declared text carried at least one bracketed range.
    pub fn has_range(&self) -> bool {
        self.name_and_ranges.contains('[')
    }
}

/// A module plus its synthesized instantiation template.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleRecord {
    #[serde(flatten)]
    pub module: ModuleDef,
    pub instance: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SvRecord {
    pub modules: Vec<ModuleRecord>,
    pub docs: Option<String>,
}
