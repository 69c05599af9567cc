//! Usage tracking domain models.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Kind of remote feature a usage record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    CodeCompletion,
    RefactorCode,
    DocString,
}

impl FeatureKind {
    /// All kinds, in chart order.
    pub const ALL: [FeatureKind; 3] = [
        FeatureKind::CodeCompletion,
        FeatureKind::RefactorCode,
        FeatureKind::DocString,
    ];

    /// Wire name used in usage records and summaries.
    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureKind::CodeCompletion => "code_completion",
            FeatureKind::RefactorCode => "refactor_code",
            FeatureKind::DocString => "doc_string",
        }
    }

    /// Human-readable series label.
    pub fn label(&self) -> &'static str {
        match self {
            FeatureKind::CodeCompletion => "Code Completion Request",
            FeatureKind::RefactorCode => "Code Refactor Request",
            FeatureKind::DocString => "Documentation Generation Request",
        }
    }
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One logged request event, keyed by `(user_id, timestamp)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageRecord {
    #[serde(rename = "UserId")]
    pub user_id: String,
    /// Unix timestamp (seconds).
    pub timestamp: i64,
    pub feature: FeatureKind,
    pub code_language: String,
    /// Bytes of text that ended up in the user's document. Completion
    /// records start unset and are filled in once by reconciliation.
    #[serde(default)]
    pub bytes: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accepted: Option<bool>,
}

/// Per-feature request counts for one period label.
pub type FeatureCounts = BTreeMap<String, u64>;

/// Ordered `period label -> feature counts` history.
///
/// Serialized as a JSON object whose key order is the period order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestHistory {
    periods: Vec<(String, FeatureCounts)>,
}

impl RequestHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a period. A repeated label replaces the earlier counts in place.
    pub fn push(&mut self, label: impl Into<String>, counts: FeatureCounts) {
        let label = label.into();
        match self.periods.iter_mut().find(|(l, _)| *l == label) {
            Some(slot) => slot.1 = counts,
            None => self.periods.push((label, counts)),
        }
    }

    /// Period labels in order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.periods.iter().map(|(label, _)| label.as_str())
    }

    /// Count for `feature` in the period at `index`; absent entries are zero.
    pub fn count_at(&self, index: usize, feature: FeatureKind) -> u64 {
        self.periods
            .get(index)
            .and_then(|(_, counts)| counts.get(feature.as_str()))
            .copied()
            .unwrap_or(0)
    }

    /// Count for `feature` in the period labelled `label`; absent entries are zero.
    pub fn count(&self, label: &str, feature: FeatureKind) -> u64 {
        self.periods
            .iter()
            .find(|(l, _)| l == label)
            .and_then(|(_, counts)| counts.get(feature.as_str()))
            .copied()
            .unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.periods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }
}

impl Serialize for RequestHistory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.periods.len()))?;
        for (label, counts) in &self.periods {
            map.serialize_entry(label, counts)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for RequestHistory {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct HistoryVisitor;

        impl<'de> Visitor<'de> for HistoryVisitor {
            type Value = RequestHistory;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of period labels to feature counts")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut history = RequestHistory::new();
                while let Some((label, counts)) = access.next_entry::<String, FeatureCounts>()? {
                    history.push(label, counts);
                }
                Ok(history)
            }
        }

        deserializer.deserialize_map(HistoryVisitor)
    }
}

/// Aggregated usage snapshot for one user, as consumed by the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSummary {
    /// Language name -> number of requests.
    #[serde(default)]
    pub code_languages: BTreeMap<String, u64>,
    /// Total bytes written across all features.
    #[serde(default)]
    pub data_written: u64,
    #[serde(default)]
    pub requests: RequestHistory,
}
