//! Instantiation template synthesis for SystemVerilog modules.

use crate::model::ModuleDef;

const INDENT: &str = "    ";

/// One `.name()  annotation  comment` line before alignment.
struct Connection<'a> {
    name: &'a str,
    annotation: String,
    comment: Option<&'a str>,
}

/// Render a copy-pasteable instantiation skeleton for `module`.
///
/// ```text
/// fifo (
///     .DEPTH()  // = 16
/// ) i_fifo (
///     .clk  ()
///     .data ()  // [7:0] data
/// );
/// ```
pub fn instance_template(module: &ModuleDef) -> String {
    let params = module.params.as_deref().unwrap_or_default();
    let ports = module.ports.as_deref().unwrap_or_default();
    let name = &module.name;

    if params.is_empty() && ports.is_empty() {
        return format!("module {} ();", name);
    }

    let param_lines = aligned(params.iter().map(|p| Connection {
        name: &p.name,
        annotation: format!("// = {}", p.default_val.as_deref().unwrap_or("")),
        comment: p.comment.as_deref(),
    }));
    let port_lines = aligned(ports.iter().map(|p| Connection {
        name: &p.name,
        annotation: if p.has_range() {
            format!("// {}", p.name_and_ranges)
        } else {
            String::new()
        },
        comment: p.comment.as_deref(),
    }));

    let mut lines = Vec::with_capacity(param_lines.len() + port_lines.len() + 3);
    if param_lines.is_empty() {
        lines.push(format!("{0} i_{0} (", name));
    } else {
        lines.push(format!("{} (", name));
        lines.extend(param_lines);
        lines.push(format!(") i_{} (", name));
    }
    lines.extend(port_lines);
    lines.push(");".to_string());
    lines.join("\n")
}

/// Pad names and annotations to the widest entry of this block.
fn aligned<'a>(connections: impl Iterator<Item = Connection<'a>>) -> Vec<String> {
    let connections: Vec<Connection> = connections.collect();
    let name_width = connections.iter().map(|c| c.name.chars().count()).max().unwrap_or(0);
    let note_width = connections
        .iter()
        .map(|c| c.annotation.chars().count())
        .max()
        .unwrap_or(0);

    connections
        .iter()
        .map(|c| {
            let mut line = format!(
                "{}.{:<name_width$}()  {:<note_width$}",
                INDENT, c.name, c.annotation
            );
            if let Some(comment) = c.comment {
                line.push_str("  ");
                line.push_str(comment);
            }
            line
        })
        .collect()
}
