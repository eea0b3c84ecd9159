//! Per-language content filtering applied while flattening the tree.

use crate::instance::instance_template;
use crate::model::*;
use crate::pattern::PatternSet;
use regex::Regex;
use std::sync::LazyLock;

/// Docstring keyword that removes a function, class or method from output.
pub const EXCLUDE_MARKER: &str = "docs_exclude";

/// Prefix for `__dunder__` names; AsciiDoc's unconstrained-formatting escape.
pub const DUNDER_ESCAPE: &str = r"\\";

static RE_DUNDER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^__\w+__$").unwrap());

// -- Python -------------------------------------------------------------------

/// Drop items whose docstring matches `exclude` and escape dunder names.
pub fn python_record(content: &PyContent, exclude: &PatternSet) -> PyContent {
    let functions = content
        .functions
        .iter()
        .filter(|f| is_documented(f.docstring.as_deref(), exclude))
        .map(escape_function)
        .collect();

    let classes = content
        .classes
        .iter()
        .filter(|c| is_documented(c.docstring.as_deref(), exclude))
        .map(|class| ClassSig {
            name: escape_name(&class.name),
            methods: class
                .methods
                .iter()
                .filter(|m| is_documented(m.docstring.as_deref(), exclude))
                .map(escape_function)
                .collect(),
            ..class.clone()
        })
        .collect();

    PyContent { functions, classes }
}

fn is_documented(docstring: Option<&str>, exclude: &PatternSet) -> bool {
    !docstring.is_some_and(|doc| exclude.is_match(doc))
}

fn escape_function(function: &FunctionSig) -> FunctionSig {
    FunctionSig {
        name: escape_name(&function.name),
        ..function.clone()
    }
}

/// Prefix `__name__` with [`DUNDER_ESCAPE`]; other names are unchanged.
pub fn escape_name(name: &str) -> String {
    if RE_DUNDER.is_match(name) {
        format!("{}{}", DUNDER_ESCAPE, name)
    } else {
        name.to_string()
    }
}

// -- SystemVerilog ------------------------------------------------------------

/// Attach an instantiation template to every module.
pub fn sv_record(content: &SvContent) -> SvRecord {
    SvRecord {
        modules: content
            .modules
            .iter()
            .map(|module| ModuleRecord {
                instance: instance_template(module),
                module: module.clone(),
            })
            .collect(),
        docs: content.docs.clone(),
    }
}
