//! Graph renderer: filters a graph document down to its connected part and
//! writes it out as a self-contained interactive HTML artifact.

mod html;

pub(crate) use html::{escape_html, fill_template};

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::config::RenderConfig;
use crate::error::{Result, TextgraphError};
use crate::graph::{GraphDocument, GraphOrigin, Node, Relationship};

/// How edge labels are derived from relation names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationLabel {
    /// Use the relation name as given
    Verbatim,
    /// Lowercase the relation name (extracted graphs)
    Lowercase,
}

impl From<GraphOrigin> for RelationLabel {
    fn from(origin: GraphOrigin) -> Self {
        match origin {
            GraphOrigin::Extraction => RelationLabel::Lowercase,
            GraphOrigin::Triples => RelationLabel::Verbatim,
        }
    }
}

/// A node as handed to the browser-side network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisNode {
    pub id: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

/// An edge as handed to the browser-side network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisEdge {
    pub from: String,
    pub to: String,
    pub label: String,
}

/// The filtered graph that ends up in the artifact.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedGraph {
    pub nodes: Vec<VisNode>,
    pub edges: Vec<VisEdge>,
    /// Nodes skipped because their identity was blank
    pub rejected_nodes: usize,
    /// Relationships dropped because an endpoint was unknown
    pub dangling_edges: usize,
    /// Known nodes dropped because no valid edge touched them
    pub dropped_nodes: usize,
}

impl RenderedGraph {
    /// Sorted node identities, handy for comparing structure.
    pub fn node_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.nodes.iter().map(|n| n.id.as_str()).collect();
        ids.sort_unstable();
        ids
    }

    /// Distinct node groups in first-seen order (drives the filter menu).
    pub fn groups(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.nodes
            .iter()
            .filter_map(|n| n.group.as_deref())
            .filter(|g| seen.insert(*g))
            .collect()
    }
}

/// Build the renderable graph from typed nodes and relationships.
///
/// Rules:
/// - nodes with a blank identity are rejected and skipped
/// - duplicate identities collapse onto the first node seen
/// - relationships with an unknown source or target are dropped
/// - nodes not touched by any surviving relationship are dropped
/// - duplicate relationships are all kept
pub fn build_graph(
    nodes: &[Node],
    relationships: &[Relationship],
    labels: RelationLabel,
) -> RenderedGraph {
    let mut graph = RenderedGraph::default();

    let mut order: Vec<&str> = Vec::with_capacity(nodes.len());
    let mut index: HashMap<&str, &Node> = HashMap::with_capacity(nodes.len());
    for node in nodes {
        if node.id.trim().is_empty() {
            log::warn!("Skipping node with blank identity (type: {:?})", node.node_type);
            graph.rejected_nodes += 1;
            continue;
        }
        if !index.contains_key(node.id.as_str()) {
            index.insert(node.id.as_str(), node);
            order.push(node.id.as_str());
        }
    }

    let mut touched: HashSet<&str> = HashSet::new();
    for rel in relationships {
        let source = rel.source.id.as_str();
        let target = rel.target.id.as_str();
        if !index.contains_key(source) || !index.contains_key(target) {
            log::debug!("Dropping dangling edge {} -[{}]-> {}", source, rel.rel_type, target);
            graph.dangling_edges += 1;
            continue;
        }
        touched.insert(source);
        touched.insert(target);

        let label = match labels {
            RelationLabel::Verbatim => rel.rel_type.clone(),
            RelationLabel::Lowercase => rel.rel_type.to_lowercase(),
        };
        graph.edges.push(VisEdge {
            from: source.to_string(),
            to: target.to_string(),
            label,
        });
    }

    for id in order {
        if !touched.contains(id) {
            log::debug!("Dropping isolated node {}", id);
            graph.dropped_nodes += 1;
            continue;
        }
        let node = index[id];
        graph.nodes.push(VisNode {
            id: node.id.clone(),
            label: node.display_label().to_string(),
            title: node.node_type.clone(),
            group: node.node_type.clone(),
        });
    }

    graph
}

/// Fixed force-directed layout preset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Physics {
    pub gravitational_constant: f64,
    pub central_gravity: f64,
    pub spring_length: f64,
    pub spring_constant: f64,
    pub min_velocity: f64,
}

impl Default for Physics {
    fn default() -> Self {
        Self {
            gravitational_constant: -100.0,
            central_gravity: 0.01,
            spring_length: 200.0,
            spring_constant: 0.08,
            min_velocity: 0.75,
        }
    }
}

impl Physics {
    /// vis-network options object.
    pub fn to_options(self) -> serde_json::Value {
        serde_json::json!({
            "edges": {
                "arrows": { "to": { "enabled": true } },
                "smooth": { "type": "dynamic" }
            },
            "physics": {
                "forceAtlas2Based": {
                    "gravitationalConstant": self.gravitational_constant,
                    "centralGravity": self.central_gravity,
                    "springLength": self.spring_length,
                    "springConstant": self.spring_constant
                },
                "minVelocity": self.min_velocity,
                "solver": "forceAtlas2Based"
            }
        })
    }
}

/// A rendered HTML graph on disk.
#[derive(Debug, Clone, Serialize)]
pub struct Artifact {
    pub id: Uuid,
    pub path: PathBuf,
    pub node_count: usize,
    pub edge_count: usize,
    pub created_at: DateTime<Utc>,
}

/// File name for the artifact with the given id.
pub fn artifact_file_name(id: &Uuid) -> String {
    format!("knowledge_graph-{}.html", id)
}

/// Writes graph documents as interactive HTML files.
///
/// Every call gets its own artifact id, so concurrent renders never share
/// an output file.
pub struct Renderer {
    config: RenderConfig,
    physics: Physics,
}

impl Renderer {
    pub fn new(config: RenderConfig) -> Self {
        Self {
            config,
            physics: Physics::default(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.config.output_dir
    }

    /// Path an artifact with this id is (or would be) written to.
    pub fn artifact_path(&self, id: &Uuid) -> PathBuf {
        self.config.output_dir.join(artifact_file_name(id))
    }

    /// Render a graph document to a fresh artifact.
    pub async fn render(&self, document: &GraphDocument) -> Result<Artifact> {
        let graph = build_graph(
            &document.nodes,
            &document.relationships,
            document.origin.into(),
        );

        if graph.rejected_nodes > 0 || graph.dangling_edges > 0 || graph.dropped_nodes > 0 {
            log::info!(
                "Filtered graph: {} rejected nodes, {} dangling edges, {} isolated nodes",
                graph.rejected_nodes,
                graph.dangling_edges,
                graph.dropped_nodes
            );
        }

        let page = html::render_page(&graph, &self.config, self.physics)
            .map_err(|e| TextgraphError::Render(format!("Failed to serialize graph: {}", e)))?;

        let id = Uuid::new_v4();
        let path = self.artifact_path(&id);
        let written = match tokio::fs::create_dir_all(&self.config.output_dir).await {
            Ok(()) => tokio::fs::write(&path, page).await,
            Err(e) => Err(e),
        };
        written.map_err(|e| {
            log::error!("Error saving graph to {}: {}", path.display(), e);
            TextgraphError::Render(format!("Failed to write {}: {}", path.display(), e))
        })?;

        let shown = tokio::fs::canonicalize(&path)
            .await
            .unwrap_or_else(|_| path.clone());
        log::info!("Graph saved to {}", shown.display());

        Ok(Artifact {
            id,
            path,
            node_count: graph.nodes.len(),
            edge_count: graph.edges.len(),
            created_at: Utc::now(),
        })
    }
}
