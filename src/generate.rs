//! End-to-end generation: input -> graph document -> artifact.

use crate::error::{Result, TextgraphError};
use crate::extract::Extractor;
use crate::graph::{parse_triples, triples_to_document};
use crate::render::{Artifact, Renderer};

/// Extract a graph from text and render it.
///
/// Extraction errors propagate as-is; there is no retry.
pub async fn from_text(
    extractor: &dyn Extractor,
    renderer: &Renderer,
    text: &str,
) -> Result<Artifact> {
    if text.trim().is_empty() {
        return Err(TextgraphError::InvalidInput("Input text is empty".to_string()));
    }

    let document = extractor.extract(text).await?;
    renderer.render(&document).await
}

/// Decode uploaded bytes as UTF-8 text.
pub fn decode_text(bytes: &[u8]) -> Result<&str> {
    std::str::from_utf8(bytes)
        .map_err(|e| TextgraphError::InvalidInput(format!("File is not valid UTF-8 text: {}", e)))
}

/// Validate a JSON triple list and render it; nothing is rendered if any
/// entry is malformed.
pub async fn from_triples(renderer: &Renderer, content: &str) -> Result<Artifact> {
    let triples = parse_triples(content)?;
    log::info!("Rendering {} triples", triples.len());
    renderer.render(&triples_to_document(&triples)).await
}
