//! Parser plugins, one per source language.

pub mod balanced;
pub mod python;
pub mod systemverilog;

use anyhow::Result;
use serde::Serialize;
use std::path::Path;

/// Capability every language plugin provides to the scanner and flattener.
///
/// The scanner holds a single implementation and never inspects which
/// language it is dealing with.
pub trait SourceParser {
    /// Structural record extracted from one file.
    type Content;
    /// Render-ready form of [`Self::Content`].
    type Record: Serialize;

    /// File name suffixes this parser handles (e.g. `".py"`).
    fn extensions(&self) -> &[&str];

    /// Parse one file. Read failures are errors; malformed source is not.
    fn parse_file(&self, path: &Path) -> Result<Self::Content>;

    /// Content-level filtering and augmentation applied while flattening.
    fn flatten_content(&self, content: &Self::Content) -> Self::Record;

    fn accepts(&self, file_name: &str) -> bool {
        self.extensions().iter().any(|ext| file_name.ends_with(ext))
    }
}
