use std::fmt::Write as _;

use serde_json::{Map, Number, Value};

use crate::error::{RecoError, Result};
use crate::model::{Suggestion, SuggestionRecord};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentMetadata {
    pub employe: String,
}

/// Labelled plain-text rendering of one employee's suggestions, the unit that
/// gets chunked and embedded for question answering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub text: String,
    pub metadata: DocumentMetadata,
}

pub fn render_document(record: &SuggestionRecord) -> Document {
    let mut text = String::new();
    // Writing into a String cannot fail.
    let _ = writeln!(text, "Employé: {}", record.employe);
    let _ = writeln!(text, "Évaluation: {}", record.evaluation);
    let _ = writeln!(text, "Score: {}", record.score);
    text.push_str("Suggestions:\n");

    for (i, suggestion) in record.suggestions.iter().enumerate() {
        let _ = writeln!(text, "  {}. Type: {}", i + 1, suggestion.kind);
        let _ = writeln!(text, "     Contenu: {}", suggestion.content);
        let _ = writeln!(text, "     Source: {}", suggestion.source);
    }

    Document {
        text,
        metadata: DocumentMetadata {
            employe: record.employe.clone(),
        },
    }
}

pub fn build_documents(records: &[SuggestionRecord]) -> Vec<Document> {
    records.iter().map(render_document).collect()
}

/// Validates raw suggestions JSON field by field. Absent fields come back as
/// [`RecoError::MissingField`]; present fields of the wrong type as
/// [`RecoError::DataFormat`].
pub fn parse_suggestion_records(values: &[Value]) -> Result<Vec<SuggestionRecord>> {
    values
        .iter()
        .enumerate()
        .map(|(i, value)| parse_record(i, value))
        .collect()
}

pub fn documents_from_values(values: &[Value]) -> Result<Vec<Document>> {
    Ok(build_documents(&parse_suggestion_records(values)?))
}

fn parse_record(index: usize, value: &Value) -> Result<SuggestionRecord> {
    let location = format!("record {index}");
    let obj = as_object(value, &location)?;

    let employe = string_field(obj, "employe", &location)?;
    let evaluation = string_field(obj, "evaluation", &location)?;
    let score = number_field(obj, "score", &location)?;
    let raw_suggestions = match required(obj, "suggestions", &location)? {
        Value::Array(items) => items,
        _ => {
            return Err(RecoError::DataFormat(format!(
                "{location}: `suggestions` must be an array"
            )))
        }
    };

    let suggestions = raw_suggestions
        .iter()
        .enumerate()
        .map(|(j, raw)| {
            let location = format!("{location} suggestion {}", j + 1);
            let obj = as_object(raw, &location)?;
            Ok(Suggestion {
                kind: string_field(obj, "type", &location)?,
                content: string_field(obj, "content", &location)?,
                source: string_field(obj, "source", &location)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(SuggestionRecord {
        employe,
        evaluation,
        score,
        suggestions,
    })
}

fn as_object<'a>(value: &'a Value, location: &str) -> Result<&'a Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| RecoError::DataFormat(format!("{location} is not a JSON object")))
}

fn required<'a>(
    obj: &'a Map<String, Value>,
    field: &'static str,
    location: &str,
) -> Result<&'a Value> {
    obj.get(field).ok_or_else(|| RecoError::MissingField {
        location: location.to_string(),
        field,
    })
}

fn string_field(obj: &Map<String, Value>, field: &'static str, location: &str) -> Result<String> {
    match required(obj, field, location)? {
        Value::String(s) => Ok(s.clone()),
        _ => Err(RecoError::DataFormat(format!(
            "{location}: `{field}` must be a string"
        ))),
    }
}

fn number_field(obj: &Map<String, Value>, field: &'static str, location: &str) -> Result<Number> {
    match required(obj, field, location)? {
        Value::Number(n) => Ok(n.clone()),
        _ => Err(RecoError::DataFormat(format!(
            "{location}: `{field}` must be a number"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn jean_test() -> Value {
        json!({
            "employe": "Jean Test",
            "evaluation": "Bonne maîtrise technique, communication à renforcer",
            "score": 72,
            "suggestions": [
                {
                    "type": "programme de formation",
                    "content": "Communication interpersonnelle",
                    "source": "https://formation.test/communication"
                },
                {
                    "type": "programme de formation",
                    "content": "Travail en équipe",
                    "source": "https://formation.test/equipe"
                }
            ]
        })
    }

    #[test]
    fn renders_labelled_fields() {
        let docs = documents_from_values(&[jean_test()]).unwrap();
        assert_eq!(docs.len(), 1);

        let doc = &docs[0];
        assert_eq!(doc.metadata.employe, "Jean Test");
        assert!(doc.text.contains("Employé: Jean Test"));
        assert!(doc.text.contains("Score: 72"));
        assert!(doc.text.contains("Suggestions:"));
        assert!(doc.text.contains("Type: programme de formation"));
        assert!(doc.text.contains("Source: https://formation.test/equipe"));
    }

    #[test]
    fn rendering_matches_exact_layout() {
        let doc = &documents_from_values(&[jean_test()]).unwrap()[0];
        let expected = "Employé: Jean Test\n\
Évaluation: Bonne maîtrise technique, communication à renforcer\n\
Score: 72\n\
Suggestions:\n  \
1. Type: programme de formation\n     \
Contenu: Communication interpersonnelle\n     \
Source: https://formation.test/communication\n  \
2. Type: programme de formation\n     \
Contenu: Travail en équipe\n     \
Source: https://formation.test/equipe\n";
        assert_eq!(doc.text, expected);
    }

    #[test]
    fn rendering_is_deterministic() {
        let records = parse_suggestion_records(&[jean_test()]).unwrap();
        assert_eq!(render_document(&records[0]), render_document(&records[0]));
    }

    #[test]
    fn missing_employee_field_is_reported() {
        let mut value = jean_test();
        value.as_object_mut().unwrap().remove("score");

        match documents_from_values(&[value]).unwrap_err() {
            RecoError::MissingField { location, field } => {
                assert_eq!(location, "record 0");
                assert_eq!(field, "score");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn missing_suggestion_field_is_reported() {
        let mut value = jean_test();
        value["suggestions"][1].as_object_mut().unwrap().remove("source");

        match documents_from_values(&[jean_test(), value]).unwrap_err() {
            RecoError::MissingField { location, field } => {
                assert_eq!(location, "record 1 suggestion 2");
                assert_eq!(field, "source");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn wrong_type_is_data_format_error() {
        let mut value = jean_test();
        value["suggestions"] = json!("none");
        assert!(matches!(
            documents_from_values(&[value]).unwrap_err(),
            RecoError::DataFormat(_)
        ));
    }
}
