//! JSON wire types shared by the editor session and the HTTP client.

use serde::{Deserialize, Deserializer, Serialize};

/// Document body sent to the persistence endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EssayDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    pub university: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    pub content: String,
}

impl EssayDraft {
    /// Copy of this draft carrying `content`.
    pub fn with_content(&self, content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..self.clone()
        }
    }
}

/// Body of the analysis request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    pub content: String,
}

/// Error body returned by the API on non-2xx responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub error: String,
}

/// Scores produced by the analysis service, each in `0..=100`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WritingMetrics {
    #[serde(deserialize_with = "score")]
    pub overall: u8,
    #[serde(deserialize_with = "score")]
    pub readability: u8,
    #[serde(deserialize_with = "score")]
    pub clarity: u8,
    #[serde(deserialize_with = "score")]
    pub engagement: u8,
    #[serde(deserialize_with = "score")]
    pub grammar: u8,
    #[serde(deserialize_with = "score")]
    pub coherence: u8,
    #[serde(deserialize_with = "score")]
    pub uniqueness: u8,
}

impl WritingMetrics {
    /// Label/score pairs in display order.
    pub fn entries(&self) -> [(&'static str, u8); 7] {
        [
            ("Overall", self.overall),
            ("Readability", self.readability),
            ("Clarity", self.clarity),
            ("Engagement", self.engagement),
            ("Grammar", self.grammar),
            ("Coherence", self.coherence),
            ("Uniqueness", self.uniqueness),
        ]
    }
}

/// Language models return floats as often as integers.
fn score<'de, D>(de: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = f64::deserialize(de)?;
    if !raw.is_finite() {
        return Err(serde::de::Error::custom("score is not a finite number"));
    }
    Ok(raw.round().clamp(0.0, 100.0) as u8)
}

/// Category of a writing suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionKind {
    Grammar,
    Style,
    Clarity,
    Enhancement,
    Coherence,
    Uniqueness,
}

/// How urgent a suggestion is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// One piece of feedback anchored to a position in the essay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    #[serde(rename = "type")]
    pub kind: SuggestionKind,
    pub text: String,
    pub suggestion: String,
    pub explanation: String,
    pub severity: Severity,
    pub position: usize,
}

/// Full response of the analysis endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub metrics: WritingMetrics,
    #[serde(default)]
    pub suggestions: Vec<Suggestion>,
}
