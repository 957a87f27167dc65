use serde::{Deserialize, Serialize};

use crate::{cir::CirDocument, config::ExportConfig, error::DomainError, events::Event};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PayloadSource {
    #[serde(rename = "type")]
    pub kind: String,
    pub corpus_id: String,
    pub work_id: String,
}

/// The persisted artifact for one work: score, grading events, and tags.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExportPayload {
    pub source: PayloadSource,
    pub score: CirDocument,
    pub events: Vec<Event>,
    pub tags: Vec<String>,
}

impl ExportPayload {
    pub fn new(
        work_id: impl Into<String>,
        config: &ExportConfig,
        score: CirDocument,
        events: Vec<Event>,
    ) -> Self {
        Self {
            source: PayloadSource {
                kind: config.source_type.clone(),
                corpus_id: config.corpus_id.clone(),
                work_id: work_id.into(),
            },
            score,
            events,
            tags: config.tags.clone(),
        }
    }

    /// File name the payload is stored under.
    pub fn file_name(&self) -> String {
        format!("{}.json", sanitize_identifier(&self.source.work_id))
    }
}

/// Turns a source identifier into a safe file stem.
pub fn sanitize_identifier(identifier: &str) -> String {
    let cleaned: String = identifier
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "score".to_string()
    } else {
        cleaned
    }
}

pub trait PayloadExporter {
    fn export(&self, payload: &ExportPayload) -> Result<Vec<u8>, DomainError>;
}

pub struct JsonExporter;

impl PayloadExporter for JsonExporter {
    fn export(&self, payload: &ExportPayload) -> Result<Vec<u8>, DomainError> {
        serde_json::to_vec_pretty(payload).map_err(|err| DomainError::Serialization(err.to_string()))
    }
}
