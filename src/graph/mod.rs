//! Knowledge graph data model.
//!
//! Typed nodes and relationships as produced by extraction, plus the
//! subject/relation/object triples accepted from uploads.

mod triples;

pub use triples::{parse_triples, triples_to_document};

use serde::{Deserialize, Serialize};

/// An entity in the knowledge graph, keyed by its identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Unique identity.
    pub id: String,
    /// Display label; the identity is shown when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Category tag, e.g. `Person`; drives grouping and color.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub node_type: Option<String>,
}

impl Node {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: None,
            node_type: None,
        }
    }

    pub fn typed(id: impl Into<String>, node_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: None,
            node_type: Some(node_type.into()),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Text shown for this node.
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.id)
    }
}

/// A directed, labeled edge (source --rel_type--> target).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    pub source: Node,
    pub target: Node,
    /// Relation name, e.g. `WORKS_AT`.
    #[serde(rename = "type")]
    pub rel_type: String,
}

impl Relationship {
    pub fn new(source: Node, target: Node, rel_type: impl Into<String>) -> Self {
        Self {
            source,
            target,
            rel_type: rel_type.into(),
        }
    }
}

/// Where a graph document came from. Decides how edge labels are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GraphOrigin {
    /// Produced by a language-model extractor
    Extraction,
    /// Supplied directly as triples
    Triples,
}

/// Nodes and relationships describing one input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphDocument {
    pub nodes: Vec<Node>,
    pub relationships: Vec<Relationship>,
    pub origin: GraphOrigin,
    /// Text the document was extracted from, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_text: Option<String>,
}

impl GraphDocument {
    pub fn new(nodes: Vec<Node>, relationships: Vec<Relationship>, origin: GraphOrigin) -> Self {
        Self {
            nodes,
            relationships,
            origin,
            source_text: None,
        }
    }
}

/// A single (subject, relation, object) statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Triple {
    pub subject: String,
    pub relation: String,
    pub object: String,
}

impl Triple {
    pub fn new(
        subject: impl Into<String>,
        relation: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            relation: relation.into(),
            object: object.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_serializes_type_key() {
        let node = Node::typed("Marie Curie", "Person");
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["id"], "Marie Curie");
        assert_eq!(json["type"], "Person");

        let untyped = serde_json::to_value(Node::new("X")).unwrap();
        assert!(untyped.get("type").is_none());
        assert!(untyped.get("label").is_none());
    }

    #[test]
    fn test_display_label_defaults_to_id() {
        assert_eq!(Node::new("Q42").display_label(), "Q42");
        assert_eq!(
            Node::new("Q42").with_label("Douglas Adams").display_label(),
            "Douglas Adams"
        );
    }

    #[test]
    fn test_origin_snake_case() {
        let json = serde_json::to_string(&GraphOrigin::Extraction).unwrap();
        assert_eq!(json, "\"extraction\"");
    }
}
