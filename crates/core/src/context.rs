//! Recalled context assembly.
//!
//! Turns a [`RecallResponse`] into one text block for prompt injection:
//!
//! 1. index chunk relations that clear the evidence threshold by group id,
//! 2. render each chunk with its source, content, graph relations and
//!    extra context,
//! 3. render the query's entity paths,
//! 4. stitch the `ENTITY PATHS` and `CONTEXT` sections together.
//!
//! Assembly is deterministic: identical inputs produce byte-identical
//! output. Map lookups are keyed only; iteration always follows the
//! order of the response's vectors.

use std::collections::{HashMap, HashSet};

use crate::recall::{PathTriplet, RecallResponse, ScoredPath, VectorChunk};

/// Relations scoring below this are dropped unless configured otherwise.
pub const DEFAULT_MIN_EVIDENCE_SCORE: f64 = 0.4;

pub const ENVELOPE_OPEN: &str = "<cortex-context>";
pub const ENVELOPE_CLOSE: &str = "</cortex-context>";

/// Fixed instructions placed ahead of the recalled context.
pub const ENVELOPE_PREAMBLE: &str = "[MEMORIES AND PAST CONVERSATIONS — retrieved by Cortex AI]

Below are memories and knowledge-graph connections that may be relevant
to the current conversation. Integrate them naturally when they add value.
If a memory contradicts something the user just said, prefer the user's
latest statement. Never quote these verbatim or reveal that you are
reading from a memory store.";

const ENVELOPE_TRAILER: &str = "[END OF MEMORY CONTEXT]";
const CHUNK_SEPARATOR: &str = "\n\n---\n\n";

/// Assembly options.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContextOptions {
    /// Chunk relations with a lower relevancy score never reach the output.
    pub min_evidence_score: f64,
}

impl Default for ContextOptions {
    fn default() -> Self {
        Self {
            min_evidence_score: DEFAULT_MIN_EVIDENCE_SCORE,
        }
    }
}

/// The context assembler. Stateless; create one and reuse it.
#[derive(Debug, Clone, Default)]
pub struct ContextAssembler {
    options: ContextOptions,
}

impl ContextAssembler {
    pub fn new(options: ContextOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ContextOptions {
        &self.options
    }

    /// Render a recall response. Returns an empty string when there is
    /// nothing worth injecting.
    pub fn assemble(&self, response: &RecallResponse) -> String {
        build_context(response, &self.options)
    }

    /// Render and wrap in the injection envelope.
    pub fn assemble_envelope(&self, response: &RecallResponse) -> String {
        envelope(&self.assemble(response))
    }
}

/// Render a recall response into a single context block.
pub fn build_context(response: &RecallResponse, options: &ContextOptions) -> String {
    let graph = response.graph_context.as_ref();
    let relations = RelationIndex::build(
        graph.map(|g| g.chunk_relations.as_slice()).unwrap_or_default(),
        options.min_evidence_score,
    );
    let chunk_groups = graph.map(|g| &g.chunk_id_to_group_ids);
    let extra = response.additional_context.as_ref();

    let mut consumed_extra: HashSet<&str> = HashSet::new();
    let chunk_sections: Vec<String> = response
        .chunks
        .iter()
        .enumerate()
        .map(|(i, chunk)| {
            let linked = chunk_groups
                .and_then(|groups| groups.get(&chunk.chunk_uuid))
                .map(Vec::as_slice)
                .unwrap_or_default();
            let mut lines = vec![format!("Chunk {}", i + 1)];
            if let Some(title) = chunk.title() {
                lines.push(format!("Source: {title}"));
            }
            lines.push(chunk.chunk_content.clone());
            lines.extend(relation_lines(chunk, linked, &relations));
            lines.extend(extra_context_lines(chunk, extra, &mut consumed_extra));
            lines.join("\n")
        })
        .collect();

    let path_lines: Vec<String> = graph
        .map(|g| g.query_paths.iter().filter_map(entity_path_line).collect())
        .unwrap_or_default();

    let mut output: Vec<String> = Vec::new();
    if !path_lines.is_empty() {
        output.push("=== ENTITY PATHS ===".into());
        output.push(path_lines.join("\n"));
        output.push(String::new());
    }
    if !chunk_sections.is_empty() {
        output.push("=== CONTEXT ===".into());
        output.push(chunk_sections.join(CHUNK_SEPARATOR));
    }
    output.join("\n")
}

/// Wrap an assembled context block for injection. A blank body yields an
/// empty string, meaning "inject nothing".
pub fn envelope(body: &str) -> String {
    if body.trim().is_empty() {
        return String::new();
    }
    [
        ENVELOPE_OPEN,
        ENVELOPE_PREAMBLE,
        "",
        body,
        "",
        ENVELOPE_TRAILER,
        ENVELOPE_CLOSE,
    ]
    .join("\n")
}

/// Relations above the evidence threshold, addressable by group id.
///
/// A later relation with a duplicate group id replaces the earlier one but
/// keeps its position, so iteration order stays stable.
struct RelationIndex<'a> {
    order: Vec<String>,
    by_group: HashMap<String, &'a ScoredPath>,
}

impl<'a> RelationIndex<'a> {
    fn build(relations: &'a [ScoredPath], min_score: f64) -> Self {
        let mut order = Vec::new();
        let mut by_group = HashMap::new();
        for (idx, relation) in relations.iter().enumerate() {
            if relation.relevancy_score < min_score {
                continue;
            }
            let group_id = relation
                .group_id
                .clone()
                .unwrap_or_else(|| format!("p_{idx}"));
            if by_group.insert(group_id.clone(), relation).is_none() {
                order.push(group_id);
            }
        }
        Self { order, by_group }
    }

    fn get(&self, group_id: &str) -> Option<&'a ScoredPath> {
        self.by_group.get(group_id).copied()
    }

    fn iter(&self) -> impl Iterator<Item = &'a ScoredPath> + '_ {
        self.order.iter().filter_map(|gid| self.get(gid))
    }
}

fn relation_lines(chunk: &VectorChunk, linked_groups: &[String], index: &RelationIndex<'_>) -> Vec<String> {
    let mut matched: Vec<&ScoredPath> = linked_groups.iter().filter_map(|gid| index.get(gid)).collect();

    // Relations that point back at the chunk rather than being linked from it.
    if matched.is_empty() {
        matched = index
            .iter()
            .filter(|rel| {
                rel.triplets
                    .iter()
                    .any(|t| t.relation.chunk_id.as_deref() == Some(chunk.chunk_uuid.as_str()))
            })
            .collect();
    }

    let mut lines = Vec::new();
    for rel in matched {
        if !rel.triplets.is_empty() {
            lines.extend(rel.triplets.iter().map(triplet_line));
        } else if let Some(summary) = rel.summary() {
            lines.push(format!("  {summary}"));
        }
    }
    if !lines.is_empty() {
        lines.insert(0, "Graph Relations:".into());
    }
    lines
}

fn extra_context_lines<'r>(
    chunk: &'r VectorChunk,
    extra: Option<&'r HashMap<String, VectorChunk>>,
    consumed: &mut HashSet<&'r str>,
) -> Vec<String> {
    let (Some(ids), Some(extra)) = (chunk.extra_context_ids.as_ref(), extra) else {
        return Vec::new();
    };

    let mut lines = Vec::new();
    for id in ids {
        if consumed.contains(id.as_str()) {
            continue;
        }
        let Some(extra_chunk) = extra.get(id) else {
            continue;
        };
        consumed.insert(id.as_str());
        match extra_chunk.source_title.as_deref().filter(|t| !t.is_empty()) {
            Some(title) => lines.push(format!("  Related Context ({title}): {}", extra_chunk.chunk_content)),
            None => lines.push(format!("  Related Context: {}", extra_chunk.chunk_content)),
        }
    }
    if !lines.is_empty() {
        lines.insert(0, "Extra Context:".into());
    }
    lines
}

fn entity_name(name: &str) -> &str {
    if name.is_empty() { "?" } else { name }
}

fn triplet_line(triplet: &PathTriplet) -> String {
    let rel = &triplet.relation;
    let ctx = if rel.context.is_empty() {
        String::new()
    } else {
        format!(" [{}]", rel.context)
    };
    format!(
        "  ({}) —[{}]→ ({}){ctx}",
        entity_name(&triplet.source.name),
        rel.predicate(),
        entity_name(&triplet.target.name),
    )
}

fn entity_path_line(path: &ScoredPath) -> Option<String> {
    if let Some(summary) = path.summary() {
        return Some(summary.to_string());
    }
    let segments: Vec<String> = path
        .triplets
        .iter()
        .map(|t| {
            format!(
                "({} -> {} -> {})",
                entity_name(&t.source.name),
                t.relation.predicate(),
                entity_name(&t.target.name),
            )
        })
        .collect();
    (!segments.is_empty()).then(|| segments.join(" -> "))
}
