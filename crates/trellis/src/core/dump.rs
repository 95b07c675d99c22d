use std::io::Write;

use comfy_table::{Cell, Color as CellColor, ContentArrangement, Table, presets::UTF8_FULL};
use termcolor::{Buffer, Color, ColorSpec, WriteColor};

use crate::{
    NodeId,
    core::{geometry::resolve, registry::Registry},
    error::Result,
    geom::Bounds,
};

/// Render a subtree as an indented plain-text outline. This is a debug
/// function.
pub fn dump(registry: &Registry, root: impl Into<NodeId>) -> Result<String> {
    let mut buffer = Buffer::no_color();
    dump_into(&mut buffer, registry, root.into())?;
    Ok(String::from_utf8_lossy(buffer.as_slice()).into_owned())
}

/// Like [`dump`], with ANSI colours.
pub fn dump_ansi(registry: &Registry, root: impl Into<NodeId>) -> Result<String> {
    let mut buffer = Buffer::ansi();
    dump_into(&mut buffer, registry, root.into())?;
    Ok(String::from_utf8_lossy(buffer.as_slice()).into_owned())
}

/// Resolve the root's parent bounds and walk the subtree.
fn dump_into(buffer: &mut Buffer, registry: &Registry, root: NodeId) -> Result<()> {
    let parent = registry.parent_bounds(root)?;
    dump_node(buffer, registry, root, parent, 0)
}

/// Write an indented, coloured label followed by a value.
fn write_field(buffer: &mut Buffer, indent: &str, label: &str, value: &str) -> Result<()> {
    write!(buffer, "{indent}  ")?;
    buffer.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
    write!(buffer, "{label}")?;
    buffer.reset()?;
    writeln!(buffer, " {value}")?;
    Ok(())
}

/// Walk a node subtree and emit formatted debug output.
fn dump_node(
    buffer: &mut Buffer,
    registry: &Registry,
    id: NodeId,
    parent: Option<Bounds>,
    level: usize,
) -> Result<()> {
    let node = registry.require(id)?;
    let indent = "    ".repeat(level);
    let bounds = resolve(node, parent);
    let flags = node.flags();

    write!(buffer, "{indent}")?;
    buffer.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)).set_bold(true))?;
    write!(buffer, "{}", node.name())?;
    buffer.reset()?;
    write!(buffer, " ({})", node.kind())?;

    let mut indicators = Vec::new();
    if id == registry.stage() {
        indicators.push(("stage", Color::Magenta));
    }
    if registry.is_orphan(id) {
        indicators.push(("orphan", Color::Red));
    }
    if flags.hidden {
        indicators.push(("hidden", Color::Yellow));
    }
    if !flags.enabled {
        indicators.push(("disabled", Color::Yellow));
    }
    if flags.clickable {
        indicators.push(("clickable", Color::Blue));
    }
    for (i, (label, color)) in indicators.iter().enumerate() {
        write!(buffer, "{}", if i == 0 { " " } else { ", " })?;
        buffer.set_color(ColorSpec::new().set_fg(Some(*color)))?;
        write!(buffer, "{label}")?;
        buffer.reset()?;
    }
    writeln!(buffer)?;

    write_field(
        buffer,
        &indent,
        "bounds:",
        &format!(
            "l: {}, t: {}, r: {}, b: {}",
            bounds.left, bounds.top, bounds.right, bounds.bottom
        ),
    )?;
    write_field(
        buffer,
        &indent,
        "order:",
        &format!("priority {}, z {}", node.priority(), node.z_order()),
    )?;

    for child in node.children() {
        dump_node(buffer, registry, *child, Some(bounds), level + 1)?;
    }
    Ok(())
}

/// Summarise every node in the registry as a table, one row per node in
/// arena order.
pub fn table(registry: &Registry) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            "name", "kind", "parent", "children", "priority", "z", "state",
        ]);
    for id in registry.node_ids() {
        let Some(node) = registry.node(id) else {
            continue;
        };
        let parent = node
            .parent()
            .and_then(|p| registry.name(p))
            .map(ToString::to_string)
            .unwrap_or_else(|| "-".into());
        let (state, color) = if registry.is_on_stage(id) {
            ("attached", CellColor::Green)
        } else if registry.is_orphan(id) {
            ("orphan", CellColor::Red)
        } else {
            ("detached", CellColor::Yellow)
        };
        table.add_row(vec![
            Cell::new(node.name()).fg(CellColor::Cyan),
            Cell::new(node.kind()),
            Cell::new(parent),
            Cell::new(node.children().len()),
            Cell::new(node.priority()),
            Cell::new(node.z_order()),
            Cell::new(state).fg(color),
        ]);
    }
    table.to_string()
}
