use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::clock;
use crate::section::AuditSection;

/// Longest stored query summary, in characters.
pub const QUERY_SUMMARY_MAX_CHARS: usize = 100;

/// How much a learning should weigh when replayed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Importance {
    Low,
    #[default]
    Medium,
    High,
}

/// One learned snippet of institutional memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditExperience {
    pub id: String,
    pub section: AuditSection,
    /// The originating query, cut to 100 characters.
    pub query_summary: String,
    /// A single technical sentence.
    pub technical_learning: String,
    /// Epoch milliseconds
    pub timestamp: i64,
    #[serde(default)]
    pub importance: Importance,
}

impl AuditExperience {
    /// Records a learning stamped with the current time.
    pub fn new(
        section: AuditSection,
        query: &str,
        technical_learning: impl Into<String>,
        importance: Importance,
    ) -> Self {
        let timestamp = clock::now_millis();
        Self {
            id: timestamp.to_string(),
            section,
            query_summary: query.chars().take(QUERY_SUMMARY_MAX_CHARS).collect(),
            technical_learning: technical_learning.into(),
            timestamp,
            importance,
        }
    }

    /// Overrides the timestamp (and the id derived from it).
    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = timestamp;
        self.id = timestamp.to_string();
        self
    }
}
