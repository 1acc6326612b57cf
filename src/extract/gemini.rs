use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::OnceLock;
use std::time::Duration;

use super::Extractor;
use crate::config::ExtractionConfig;
use crate::error::{Result, TextgraphError};
use crate::graph::{GraphDocument, GraphOrigin, Node, Relationship};

const SYSTEM_PROMPT: &str = "You build knowledge graphs from text. \
Identify the entities mentioned in the text as nodes and the connections \
between them as relationships. \
Use the most complete name of an entity as its id, and always refer to the \
same entity with the same id. \
Give every node a short, general type such as Person, Organization, Location, Event or Concept. \
Relationship types are short verbs or verb phrases in UPPER_SNAKE_CASE, \
for example WORKS_AT or BORN_IN. \
Only extract what the text states. Every relationship endpoint must also appear in the node list.";

/// Request body for `models/{model}:generateContent`
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    system_instruction: RequestContent<'a>,
    contents: Vec<RequestContent<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    response_mime_type: &'static str,
    response_schema: Value,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// The JSON document the model is asked to answer with
#[derive(Deserialize)]
struct ExtractionReply {
    #[serde(default)]
    nodes: Vec<ReplyNode>,
    #[serde(default)]
    relationships: Vec<ReplyRelationship>,
}

#[derive(Deserialize)]
struct ReplyNode {
    id: String,
    #[serde(rename = "type", default)]
    node_type: Option<String>,
}

#[derive(Deserialize)]
struct ReplyRelationship {
    source_node_id: String,
    #[serde(default)]
    source_node_type: Option<String>,
    target_node_id: String,
    #[serde(default)]
    target_node_type: Option<String>,
    #[serde(rename = "type")]
    rel_type: String,
}

fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "nodes": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "id": { "type": "STRING" },
                        "type": { "type": "STRING" }
                    },
                    "required": ["id", "type"]
                }
            },
            "relationships": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "source_node_id": { "type": "STRING" },
                        "source_node_type": { "type": "STRING" },
                        "target_node_id": { "type": "STRING" },
                        "target_node_type": { "type": "STRING" },
                        "type": { "type": "STRING" }
                    },
                    "required": ["source_node_id", "target_node_id", "type"]
                }
            }
        },
        "required": ["nodes", "relationships"]
    })
}

/// Gemini-backed graph extractor
///
/// Sends the whole text as a single document in one `generateContent` call.
/// No retry, batching or caching.
pub struct GeminiExtractor {
    client: Client,
    api_key: String,
    model: String,
    endpoint: String,
    temperature: f32,
}

impl GeminiExtractor {
    /// Create a new extractor
    ///
    /// # Arguments
    ///
    /// * `api_key` - Google API key
    /// * `config` - Model, endpoint, temperature and timeout settings
    pub fn new(api_key: String, config: &ExtractionConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TextgraphError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            model: config.model.clone(),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            temperature: config.temperature,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }

    async fn generate(&self, text: &str) -> Result<String> {
        let request = GenerateRequest {
            system_instruction: RequestContent {
                role: None,
                parts: vec![RequestPart { text: SYSTEM_PROMPT }],
            },
            contents: vec![RequestContent {
                role: Some("user"),
                parts: vec![RequestPart { text }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
                response_mime_type: "application/json",
                response_schema: response_schema(),
            },
        };

        let start = std::time::Instant::now();
        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| TextgraphError::Extraction(format!("Network error: {}", e)))?;

        let status = response.status();

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());

            return Err(TextgraphError::Extraction(format!(
                "Gemini API error {}: {}",
                status, body
            )));
        }

        let result: GenerateResponse = response
            .json()
            .await
            .map_err(|e| TextgraphError::Extraction(format!("Failed to parse response: {}", e)))?;

        log::debug!("Gemini call took {:?}", start.elapsed());

        let reply: String = result
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if reply.trim().is_empty() {
            return Err(TextgraphError::Extraction(
                "Empty response from Gemini API".to_string(),
            ));
        }

        Ok(reply)
    }
}

#[async_trait]
impl Extractor for GeminiExtractor {
    async fn extract(&self, text: &str) -> Result<GraphDocument> {
        log::info!("Extracting graph from {} chars with {}", text.len(), self.model);
        let reply = self.generate(text).await?;
        let mut document = parse_reply(&reply)?;
        document.source_text = Some(text.to_string());
        log::info!(
            "Extracted {} nodes and {} relationships",
            document.nodes.len(),
            document.relationships.len()
        );
        Ok(document)
    }
}

/// Decode the model's JSON answer into a graph document.
fn parse_reply(reply: &str) -> Result<GraphDocument> {
    let reply: ExtractionReply = serde_json::from_str(strip_code_fence(reply)).map_err(|e| {
        TextgraphError::Extraction(format!("Model returned malformed graph JSON: {}", e))
    })?;

    let nodes = reply
        .nodes
        .into_iter()
        .map(|n| format_node(n.id, n.node_type))
        .collect();

    let relationships = reply
        .relationships
        .into_iter()
        .map(|r| {
            Relationship::new(
                format_node(r.source_node_id, r.source_node_type),
                format_node(r.target_node_id, r.target_node_type),
                format_relation(&r.rel_type),
            )
        })
        .collect();

    Ok(GraphDocument::new(nodes, relationships, GraphOrigin::Extraction))
}

fn strip_code_fence(reply: &str) -> &str {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    let fence = FENCE.get_or_init(|| {
        Regex::new(r"(?s)^\s*```(?:json)?\s*(.*?)\s*```\s*$").expect("Invalid regex pattern")
    });

    match fence.captures(reply).and_then(|c| c.get(1)) {
        Some(inner) => inner.as_str(),
        None => reply.trim(),
    }
}

fn format_node(id: String, node_type: Option<String>) -> Node {
    Node {
        id: title_case(&id),
        label: None,
        node_type: node_type
            .filter(|t| !t.trim().is_empty())
            .map(|t| capitalize(&t)),
    }
}

/// "marie curie" -> "Marie Curie"; letters after another letter are lowercased.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for c in s.chars() {
        if prev_alpha {
            out.extend(c.to_lowercase());
        } else {
            out.extend(c.to_uppercase());
        }
        prev_alpha = c.is_alphabetic();
    }
    out
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// "works at" -> "WORKS_AT"
fn format_relation(s: &str) -> String {
    s.trim().replace(' ', "_").to_uppercase()
}
