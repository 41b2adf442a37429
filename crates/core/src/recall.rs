//! Recall response types: what the remote memory service returns for a query.
//!
//! Ranked vector chunks, an optional knowledge graph slice, and an
//! optional side map of supplementary chunks keyed by id. Every field the
//! service may omit carries a serde default so partial payloads decode.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// Treat an explicit JSON `null` like a missing field.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One retrieved memory fragment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VectorChunk {
    #[serde(default, deserialize_with = "nullable")]
    pub chunk_uuid: String,

    #[serde(default, deserialize_with = "nullable")]
    pub source_id: String,

    #[serde(default, deserialize_with = "nullable")]
    pub chunk_content: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_upload_time: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_last_updated_time: Option<String>,

    /// Similarity to the query (0.0–1.0)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relevancy_score: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_metadata: Option<serde_json::Map<String, serde_json::Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_metadata: Option<serde_json::Map<String, serde_json::Value>>,

    /// Ids into [`RecallResponse::additional_context`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_context_ids: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<String>,
}

impl VectorChunk {
    /// Display title: the source title, else `document_metadata.title`.
    /// Empty strings count as absent.
    pub fn title(&self) -> Option<&str> {
        self.source_title
            .as_deref()
            .filter(|t| !t.is_empty())
            .or_else(|| {
                self.document_metadata
                    .as_ref()
                    .and_then(|m| m.get("title"))
                    .and_then(serde_json::Value::as_str)
                    .filter(|t| !t.is_empty())
            })
    }
}

/// A knowledge graph node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,

    #[serde(default, rename = "type", deserialize_with = "nullable")]
    pub kind: String,

    #[serde(default, deserialize_with = "nullable")]
    pub entity_id: String,
}

/// A knowledge graph edge label.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Relation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canonical_predicate: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_predicate: Option<String>,

    /// Free-text evidence for the relation
    #[serde(default, deserialize_with = "nullable")]
    pub context: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,

    /// The chunk this relation was extracted from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_id: Option<String>,

    #[serde(default, deserialize_with = "nullable")]
    pub relationship_id: String,
}

impl Relation {
    /// Raw predicate, else canonical, else `"related to"`.
    pub fn predicate(&self) -> &str {
        self.raw_predicate
            .as_deref()
            .or(self.canonical_predicate.as_deref())
            .unwrap_or("related to")
    }
}

/// One `(source) -[relation]-> (target)` edge.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathTriplet {
    #[serde(default, deserialize_with = "nullable")]
    pub source: Entity,

    #[serde(default, deserialize_with = "nullable")]
    pub relation: Relation,

    #[serde(default, deserialize_with = "nullable")]
    pub target: Entity,
}

/// A scored group of triplets: either a direct entity path or the
/// relations attached to a chunk through a group id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoredPath {
    #[serde(default, deserialize_with = "nullable")]
    pub triplets: Vec<PathTriplet>,

    #[serde(default, deserialize_with = "nullable")]
    pub relevancy_score: f64,

    /// Pre-rendered summary of the path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub combined_context: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
}

impl ScoredPath {
    /// `combined_context` when present and non-empty.
    pub fn summary(&self) -> Option<&str> {
        self.combined_context.as_deref().filter(|c| !c.is_empty())
    }
}

/// The graph slice attached to a recall response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphContext {
    #[serde(default, deserialize_with = "nullable")]
    pub query_paths: Vec<ScoredPath>,

    #[serde(default, deserialize_with = "nullable")]
    pub chunk_relations: Vec<ScoredPath>,

    #[serde(default, deserialize_with = "nullable")]
    pub chunk_id_to_group_ids: HashMap<String, Vec<String>>,
}

/// Root of a recall response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecallResponse {
    #[serde(default, deserialize_with = "nullable")]
    pub chunks: Vec<VectorChunk>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graph_context: Option<GraphContext>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_context: Option<HashMap<String, VectorChunk>>,
}
