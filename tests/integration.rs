use predicates::prelude::*;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

fn cmd() -> assert_cmd::Command {
    assert_cmd::Command::from(Command::new(env!("CARGO_BIN_EXE_srcdoc")))
}

const APP_PY: &str = r#"def main(argv):
    """Entry point."""
    return 0


def _helper():
    """Internal. docs_exclude"""


class Server(Base):
    """Serves requests."""

    def __init__(self, port: int = 80):
        self.port = port

    async def handle(self, request):
        pass
"#;

const UTIL_PY: &str = "def util(x, y=1):\n    return x + y\n";

const FIFO_SV: &str = "\
// docs_description Synchronous FIFO
module fifo #(
    parameter DEPTH = 16
) (
    input  logic       clk,
    output logic [7:0] data   // read data
);
endmodule
";

fn python_tree() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("pkg/sub")).unwrap();
    fs::create_dir_all(root.join("__pycache__")).unwrap();
    fs::write(root.join("app.py"), APP_PY).unwrap();
    fs::write(root.join("README.md"), "# readme").unwrap();
    fs::write(root.join("pkg/util.py"), UTIL_PY).unwrap();
    fs::write(root.join("pkg/sub/deep.py"), "def deep():\n    pass\n").unwrap();
    fs::write(root.join("__pycache__/app.cpython-312.py"), "").unwrap();
    dir
}

fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

fn file_record<'a>(json: &'a serde_json::Value, rel_path: &str) -> &'a serde_json::Value {
    json["list_of_files"]
        .as_array()
        .unwrap()
        .iter()
        .find(|f| f["rel_path"] == rel_path)
        .unwrap_or_else(|| panic!("{} not in output", rel_path))
}

// -- listing --

#[test]
fn prints_sorted_listing() {
    let dir = python_tree();
    let name = dir.path().canonicalize().unwrap();
    let name = name.file_name().unwrap().to_string_lossy();
    let expected = format!(
        "{}/\n├── __pycache__/\n│   └── app.cpython-312.py\n├── app.py\n└── pkg/\n    ├── sub/\n    │   └── deep.py\n    └── util.py\n",
        name
    );

    cmd()
        .arg(dir.path())
        .arg("--sort")
        .assert()
        .success()
        .stdout(expected);
}

#[test]
fn exclude_removes_directory() {
    let dir = python_tree();
    cmd()
        .arg(dir.path())
        .args(["--sort", "-e", "__pycache__"])
        .assert()
        .success()
        .stdout(predicate::str::contains("__pycache__").not())
        .stdout(predicate::str::contains("README.md").not())
        .stdout(predicate::str::contains("util.py"));
}

#[test]
fn include_keeps_parents() {
    let dir = python_tree();
    cmd()
        .arg(dir.path())
        .args(["--sort", "-i", "deep"])
        .assert()
        .success()
        .stdout(predicate::str::contains("└── pkg/\n    └── sub/\n        └── deep.py"))
        .stdout(predicate::str::contains("app.py").not());
}

#[test]
fn max_depth_limits_listing() {
    let dir = python_tree();
    cmd()
        .arg(dir.path())
        .args(["--sort", "--max-depth", "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("pkg/"))
        .stdout(predicate::str::contains("util.py").not());
}

#[test]
fn adoc_link_and_anchor_styles() {
    let dir = python_tree();
    cmd()
        .arg(dir.path())
        .args(["--sort", "-e", "__pycache__", "--adoc-links", "--adoc-anchors"])
        .assert()
        .success()
        .stdout(predicate::str::contains("link:app.py[app.py] (<<file-1,details>>)"))
        .stdout(predicate::str::contains("link:pkg/sub/deep.py[deep.py] (<<file-2,details>>)"));
}

// -- JSON render context --

#[test]
fn python_render_context() {
    let dir = python_tree();
    let out = TempDir::new().unwrap();
    let json_path = out.path().join("context.json");

    cmd()
        .arg(dir.path())
        .args(["--sort", "-e", "__pycache__", "-o"])
        .arg(&json_path)
        .assert()
        .success()
        .stdout("");

    let json = read_json(&json_path);
    assert!(json["dir_tree"].as_str().unwrap().contains("app.py"));
    assert_eq!(json["list_of_files"].as_array().unwrap().len(), 3);

    let app = file_record(&json, "app.py");
    assert_eq!(app["basename"], "app.py");
    assert_eq!(app["type"], "file");
    assert_eq!(app["index"], 1);

    let functions = app["functions"].as_array().unwrap();
    assert_eq!(functions.len(), 1);
    assert_eq!(functions[0]["name"], "main");
    assert_eq!(functions[0]["args"], serde_json::json!(["argv"]));
    assert_eq!(functions[0]["docstring"], "Entry point.");
    assert_eq!(functions[0]["lineno_start"], 1);

    let class = &app["classes"][0];
    assert_eq!(class["name"], "Server");
    assert_eq!(class["bases"], serde_json::json!(["Base"]));
    assert_eq!(class["methods"][0]["name"], r"\\__init__");
    assert_eq!(class["methods"][0]["type_hints"], "self, port: int = 80");
    assert_eq!(class["methods"][1]["name"], "handle");
    assert_eq!(class["methods"][1]["is_async"], true);

    let util = file_record(&json, "pkg/util.py");
    assert_eq!(util["index"], 3);
    assert_eq!(util["functions"][0]["args"], serde_json::json!(["x", "y"]));
}

#[test]
fn systemverilog_render_context() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("rtl")).unwrap();
    fs::write(dir.path().join("rtl/fifo.sv"), FIFO_SV).unwrap();
    fs::write(dir.path().join("rtl/notes.py"), "def ignored():\n    pass\n").unwrap();
    let json_path = dir.path().join("out.json");

    cmd()
        .arg(dir.path().join("rtl"))
        .args(["-l", "sv", "-o"])
        .arg(&json_path)
        .assert()
        .success();

    let json = read_json(&json_path);
    let files = json["list_of_files"].as_array().unwrap();
    assert_eq!(files.len(), 1);
    let fifo = &files[0];
    assert_eq!(fifo["rel_path"], "fifo.sv");
    assert_eq!(fifo["docs"], "Synchronous FIFO");

    let module = &fifo["modules"][0];
    assert_eq!(module["name"], "fifo");
    assert_eq!(module["params"][0]["name"], "DEPTH");
    assert_eq!(module["params"][0]["default_val"], "16");
    assert_eq!(module["ports"][0]["type"], "input");
    assert_eq!(module["ports"][1]["type"], "output");
    assert_eq!(module["ports"][1]["name"], "data");
    assert_eq!(module["ports"][1]["comment"], "// read data");

    let instance = module["instance"].as_str().unwrap();
    assert!(instance.starts_with("fifo (\n    .DEPTH()  // = 16\n) i_fifo (\n"));
    assert!(instance.contains("    .clk ()"));
    assert!(instance.contains("    .data()  // [7:0] data  // read data"));
    assert!(instance.ends_with(");"));
}

// -- errors --

#[test]
fn dropped_module_warning_names_the_file() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("rtl")).unwrap();
    fs::write(dir.path().join("rtl/fifo.sv"), FIFO_SV).unwrap();
    fs::write(dir.path().join("rtl/broken.sv"), "module broken (input logic a\nendmodule\n").unwrap();

    cmd()
        .arg(dir.path())
        .args(["-l", "sv"])
        .env_remove("RUST_LOG")
        .assert()
        .success()
        .stdout(predicate::str::contains("broken.sv"))
        .stderr(predicate::str::contains("module header not recognized"))
        .stderr(predicate::str::contains("rtl/broken.sv"))
        .stderr(predicate::str::contains("line=1"))
        .stderr(predicate::str::contains("\u{1b}[").not());
}

#[test]
fn invalid_pattern_fails() {
    let dir = python_tree();
    cmd()
        .arg(dir.path())
        .args(["-e", "("])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid pattern"));
}

#[test]
fn unknown_language_fails() {
    let dir = python_tree();
    cmd()
        .arg(dir.path())
        .args(["--lang", "cobol"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown language"));
}

#[test]
fn missing_directory_fails() {
    let dir = TempDir::new().unwrap();
    cmd()
        .arg(dir.path().join("absent"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("search directory not found"));
}
