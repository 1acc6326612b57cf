pub mod config;
pub mod error;
pub mod extract;
pub mod generate;
pub mod graph;
pub mod render;
pub mod web;

pub use config::Config;
pub use error::{Result, TextgraphError};
pub use extract::{Extractor, GeminiExtractor};
pub use graph::{GraphDocument, Node, Relationship, Triple};
pub use render::{Artifact, Renderer};
