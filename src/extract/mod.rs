//! Entity/relationship extraction from free text.

pub mod gemini;

pub use gemini::GeminiExtractor;

use async_trait::async_trait;

use crate::error::Result;
use crate::graph::GraphDocument;

/// Turns raw text into a typed graph document.
///
/// Implementations make at most one outbound call per invocation and pass
/// the service's answer through without correcting it.
#[async_trait]
pub trait Extractor: Send + Sync {
    async fn extract(&self, text: &str) -> Result<GraphDocument>;
}
