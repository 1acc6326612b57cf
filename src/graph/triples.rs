//! Triple-list parsing for uploaded JSON.

use serde_json::Value;

use super::{GraphDocument, GraphOrigin, Node, Relationship, Triple};
use crate::error::{Result, TextgraphError};

const REQUIRED_KEYS: [&str; 3] = ["subject", "relation", "object"];

/// Parse and validate an uploaded triple list.
///
/// The body must be a JSON array whose every element is an object carrying
/// string `subject`, `relation` and `object` fields. One bad entry rejects
/// the whole batch.
pub fn parse_triples(content: &str) -> Result<Vec<Triple>> {
    let value: Value = serde_json::from_str(content)
        .map_err(|e| TextgraphError::InvalidInput(format!("Failed to read JSON file: {}", e)))?;

    let entries = value.as_array().ok_or_else(|| {
        TextgraphError::InvalidInput(
            "Failed to read JSON file: expected a JSON array of triples".to_string(),
        )
    })?;

    let mut triples = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        match triple_from_entry(entry) {
            Some(triple) => triples.push(triple),
            None => {
                log::warn!("Rejecting triple batch: entry {} is malformed", index);
                return Err(TextgraphError::InvalidInput(
                    "Invalid JSON format. Each entry must have 'subject', 'relation', and 'object'."
                        .to_string(),
                ));
            }
        }
    }

    Ok(triples)
}

fn triple_from_entry(entry: &Value) -> Option<Triple> {
    let map = entry.as_object()?;
    let mut fields = REQUIRED_KEYS
        .iter()
        .map(|key| map.get(*key).and_then(Value::as_str));

    let subject = fields.next()??;
    let relation = fields.next()??;
    let object = fields.next()??;

    Some(Triple::new(subject, relation, object))
}

/// Turn triples into a graph document: both ends of every triple become
/// untyped nodes and the relation becomes the edge label, verbatim.
pub fn triples_to_document(triples: &[Triple]) -> GraphDocument {
    let mut nodes = Vec::with_capacity(triples.len() * 2);
    let mut relationships = Vec::with_capacity(triples.len());

    for triple in triples {
        let subject = Node::new(triple.subject.clone());
        let object = Node::new(triple.object.clone());
        nodes.push(subject.clone());
        nodes.push(object.clone());
        relationships.push(Relationship::new(subject, object, triple.relation.clone()));
    }

    GraphDocument::new(nodes, relationships, GraphOrigin::Triples)
}
