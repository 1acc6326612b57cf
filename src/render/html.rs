//! Self-contained HTML page for a rendered graph (vis-network).

use super::{Physics, RenderedGraph};
use crate::config::RenderConfig;

const TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Knowledge Graph</title>
<script src="{{CDN_URL}}"></script>
<style>
body{margin:0;background:{{BGCOLOR}};font-family:-apple-system,BlinkMacSystemFont,'Segoe UI',sans-serif}
#graph{width:{{WIDTH}};height:{{HEIGHT}};background:{{BGCOLOR}};border:1px solid #444}
#filter{padding:8px 12px;background:#2b2b2b;color:{{FONT_COLOR}};font-size:13px;display:{{FILTER_DISPLAY}}}
#filter select{background:#1e1e1e;color:{{FONT_COLOR}};border:1px solid #555;padding:3px 6px;margin-left:6px}
</style>
</head>
<body>
<div id="filter">
  <label for="group-filter">Filter node type</label>
  <select id="group-filter">
    <option value="">All</option>
{{GROUP_OPTIONS}}
  </select>
</div>
<div id="graph"></div>
<script>
var nodes = new vis.DataSet({{NODES}});
var edges = new vis.DataSet({{EDGES}});
var options = {{OPTIONS}};
options.nodes = {font: {color: "{{FONT_COLOR_JS}}"}};
options.edges.font = {color: "{{FONT_COLOR_JS}}", strokeWidth: 0};
var network = new vis.Network(document.getElementById("graph"), {nodes: nodes, edges: edges}, options);
document.getElementById("group-filter").addEventListener("change", function (e) {
  var group = e.target.value;
  nodes.update(nodes.get().map(function (n) {
    return {id: n.id, hidden: group !== "" && n.group !== group};
  }));
});
</script>
</body>
</html>
"##;

/// Fill the page template for a graph.
pub(super) fn render_page(
    graph: &RenderedGraph,
    config: &RenderConfig,
    physics: Physics,
) -> Result<String, serde_json::Error> {
    let nodes = script_json(&graph.nodes)?;
    let edges = script_json(&graph.edges)?;
    let options = script_json(&physics.to_options())?;

    let group_options: String = graph
        .groups()
        .iter()
        .map(|g| {
            let g = escape_html(g);
            format!("    <option value=\"{}\">{}</option>\n", g, g)
        })
        .collect();

    let filter_display = if config.filter_menu { "block" } else { "none" };

    let font_color_js = config.font_color.replace(['"', '\\', '<'], "");

    Ok(fill_template(
        TEMPLATE,
        &[
            ("CDN_URL", &escape_html(&config.cdn_url)),
            ("BGCOLOR", &escape_html(&config.bgcolor)),
            ("WIDTH", &escape_html(&config.width)),
            ("HEIGHT", &escape_html(&config.height)),
            ("FONT_COLOR", &escape_html(&config.font_color)),
            ("FONT_COLOR_JS", &font_color_js),
            ("FILTER_DISPLAY", filter_display),
            ("GROUP_OPTIONS", &group_options),
            ("NODES", &nodes),
            ("EDGES", &edges),
            ("OPTIONS", &options),
        ],
    ))
}

/// Substitute `{{KEY}}` placeholders in a single left-to-right pass.
///
/// Inserted values are never rescanned, so data that happens to contain a
/// placeholder is emitted as-is. Unknown keys are left untouched.
pub(crate) fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            out.push_str(&rest[start..]);
            return out;
        };

        let key = &after[..end];
        match values.iter().find(|(k, _)| *k == key) {
            Some((_, value)) => out.push_str(value),
            None => out.push_str(&rest[start..start + end + 4]),
        }
        rest = &after[end + 2..];
    }

    out.push_str(rest);
    out
}

/// JSON safe to inline inside a `<script>` element.
fn script_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    Ok(serde_json::to_string(value)?.replace("</", "<\\/"))
}

pub(crate) fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
