//! srcdoc: extract functions, classes and modules from a source tree.
//!
//! Prints the box-drawing path listing by default; `-o` writes the full
//! render context (listing plus per-file records) as JSON for a document
//! template.

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use serde::Serialize;
use srcdoc::{extract, ExtractOptions, PythonParser, SourceParser, SystemVerilogParser, TreeStyle, EXCLUDE_MARKER};
use std::fs;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "srcdoc",
    about = "Extract functions, classes and modules from a source tree for documentation"
)]
struct Cli {
    /// Directory to scan
    search_dir: PathBuf,

    /// Source language: python (py) or systemverilog (sv)
    #[arg(short = 'l', long, default_value = "python")]
    lang: String,

    /// Skip files and directories whose relative path matches. Repeatable.
    #[arg(short = 'e', long)]
    exclude: Vec<String>,

    /// Do not descend below this depth (0 lists only the top level)
    #[arg(long)]
    max_depth: Option<usize>,

    /// Keep only files matching, plus their parent directories. Repeatable.
    #[arg(short = 'i', long)]
    include: Vec<String>,

    /// Render file entries as AsciiDoc links
    #[arg(long)]
    adoc_links: bool,

    /// Cross-reference each file entry to its details section
    #[arg(long)]
    adoc_anchors: bool,

    /// Sort directory entries by name
    #[arg(long)]
    sort: bool,

    /// Write the render context as JSON instead of printing the listing
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

enum Lang {
    Python,
    SystemVerilog,
}

fn parse_lang(lang: &str) -> Result<Lang> {
    match lang {
        "python" | "py" => Ok(Lang::Python),
        "systemverilog" | "sv" => Ok(Lang::SystemVerilog),
        _ => Err(anyhow!(
            "unknown language: {}. Use python or systemverilog",
            lang
        )),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let lang = parse_lang(&cli.lang)?;
    let opts = ExtractOptions::new(&cli.exclude, &cli.include, cli.max_depth)?
        .sort_entries(cli.sort)
        .tree_style(TreeStyle {
            links: cli.adoc_links,
            anchors: cli.adoc_anchors,
        });

    match lang {
        Lang::Python => run(&cli, &PythonParser::new(EXCLUDE_MARKER)?, &opts),
        Lang::SystemVerilog => run(&cli, &SystemVerilogParser, &opts),
    }
}

fn run<P: SourceParser>(cli: &Cli, parser: &P, opts: &ExtractOptions) -> Result<()> {
    let extraction = extract(&cli.search_dir, parser, opts)?;
    match &cli.output {
        Some(path) => write_json(path, &extraction),
        None => {
            println!("{}", extraction.dir_tree);
            Ok(())
        }
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to serialize render context")?;
    fs::write(path, json + "\n").with_context(|| format!("failed to write {}", path.display()))
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .init();
}
