use serde::{Deserialize, Serialize};
use serde_json::Number;

/// One row of the HR export. The employee name is the record's identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeRecord {
    pub employe: String,
    pub evaluation: String,
    pub score: Number,
}

/// One offering of the training catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingRecord {
    #[serde(rename = "type")]
    pub kind: String,
    pub content: String,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    #[serde(rename = "type")]
    pub kind: String,
    pub content: String,
    pub source: String,
}

impl From<&TrainingRecord> for Suggestion {
    fn from(training: &TrainingRecord) -> Self {
        Self {
            kind: training.kind.clone(),
            content: training.content.clone(),
            source: training.source.clone(),
        }
    }
}

/// An employee together with the ranked trainings picked for them, best first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionRecord {
    pub employe: String,
    pub evaluation: String,
    pub score: Number,
    pub suggestions: Vec<Suggestion>,
}
