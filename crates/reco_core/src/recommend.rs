use tracing::{debug, info};

use crate::embed::EmbeddingProvider;
use crate::error::{RecoError, Result};
use crate::model::{EmployeeRecord, Suggestion, SuggestionRecord, TrainingRecord};
use crate::similarity::rank_top_k;

pub const DEFAULT_TOP_N: usize = 3;

/// Matches evaluations against a training catalog that is embedded once up front.
pub struct Recommender<'a, E: EmbeddingProvider> {
    embedder: &'a E,
    catalog: &'a [TrainingRecord],
    catalog_embeddings: Vec<Vec<f32>>,
    top_n: usize,
}

impl<'a, E: EmbeddingProvider> Recommender<'a, E> {
    pub fn new(embedder: &'a E, catalog: &'a [TrainingRecord], top_n: usize) -> Result<Self> {
        if catalog.is_empty() {
            return Err(RecoError::DataFormat(
                "training catalog is empty".to_string(),
            ));
        }
        if top_n == 0 {
            return Err(RecoError::Configuration(
                "top_n must be at least 1".to_string(),
            ));
        }

        let contents: Vec<String> = catalog.iter().map(|t| t.content.clone()).collect();
        let catalog_embeddings = embedder.embed_batch(&contents)?;
        if catalog_embeddings.len() != catalog.len() {
            return Err(RecoError::ExternalService(format!(
                "expected {} catalog embeddings, got {}",
                catalog.len(),
                catalog_embeddings.len()
            )));
        }
        info!(trainings = catalog.len(), top_n, "training catalog embedded");

        Ok(Self {
            embedder,
            catalog,
            catalog_embeddings,
            top_n,
        })
    }

    pub fn recommend(&self, employee: &EmployeeRecord) -> Result<SuggestionRecord> {
        if employee.evaluation.trim().is_empty() {
            return Err(RecoError::DataFormat(format!(
                "employee '{}' has an empty evaluation",
                employee.employe
            )));
        }

        let query = self.embedder.embed(&employee.evaluation)?;
        let ranked = rank_top_k(&query, &self.catalog_embeddings, self.top_n);
        debug!(employe = %employee.employe, matches = ?ranked, "ranked trainings");

        let suggestions = ranked
            .iter()
            .map(|(idx, _)| Suggestion::from(&self.catalog[*idx]))
            .collect();

        Ok(SuggestionRecord {
            employe: employee.employe.clone(),
            evaluation: employee.evaluation.clone(),
            score: employee.score.clone(),
            suggestions,
        })
    }

    /// All-or-nothing: the first failing employee aborts the batch.
    pub fn recommend_all(&self, employees: &[EmployeeRecord]) -> Result<Vec<SuggestionRecord>> {
        let records = employees
            .iter()
            .map(|employee| self.recommend(employee))
            .collect::<Result<Vec<_>>>()?;
        info!(employees = records.len(), "recommendations generated");
        Ok(records)
    }
}

pub fn generate_suggestions<E: EmbeddingProvider>(
    embedder: &E,
    employees: &[EmployeeRecord],
    catalog: &[TrainingRecord],
    top_n: usize,
) -> Result<Vec<SuggestionRecord>> {
    Recommender::new(embedder, catalog, top_n)?.recommend_all(employees)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embed::HashEmbeddingProvider;
    use std::cell::Cell;

    fn training(kind: &str, content: &str) -> TrainingRecord {
        TrainingRecord {
            kind: kind.to_string(),
            content: content.to_string(),
            source: format!("https://formation.test/{}", content.len()),
        }
    }

    fn employee(name: &str, evaluation: &str) -> EmployeeRecord {
        EmployeeRecord {
            employe: name.to_string(),
            evaluation: evaluation.to_string(),
            score: 72.into(),
        }
    }

    fn catalog() -> Vec<TrainingRecord> {
        vec![
            training("cours en ligne", "communication orale et prise de parole"),
            training("programme de formation", "gestion du temps et organisation"),
            training("atelier", "tableur excel formules avancées"),
            training("programme de formation", "leadership et management d'équipe"),
            training("mentorat", "organisation des priorités et gestion du stress"),
        ]
    }

    /// Returns a fixed vector per known text so scores are exact.
    struct TableEmbedder {
        calls: Cell<usize>,
    }

    impl EmbeddingProvider for TableEmbedder {
        fn embed(&self, text: &str) -> Result<Vec<f32>> {
            self.calls.set(self.calls.get() + 1);
            Ok(match text {
                "a" => vec![1.0, 0.0],
                "b" => vec![0.0, 1.0],
                "a-too" => vec![2.0, 0.0],
                _ => vec![1.0, 0.0],
            })
        }
    }

    #[test]
    fn picks_top_three_verbatim_in_score_order() {
        let embedder = HashEmbeddingProvider::default();
        let catalog = catalog();
        let records = generate_suggestions(
            &embedder,
            &[employee("Jean Test", "doit améliorer la gestion du temps et l'organisation")],
            &catalog,
            DEFAULT_TOP_N,
        )
        .unwrap();

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.employe, "Jean Test");
        assert_eq!(record.score.to_string(), "72");
        assert_eq!(record.suggestions.len(), 3);
        assert_eq!(record.suggestions[0].content, "gestion du temps et organisation");
        for suggestion in &record.suggestions {
            assert!(catalog.iter().any(|t| Suggestion::from(t) == *suggestion));
        }
    }

    #[test]
    fn small_catalog_returns_everything() {
        let embedder = HashEmbeddingProvider::default();
        let catalog = vec![training("atelier", "excel"), training("atelier", "word")];
        let records =
            generate_suggestions(&embedder, &[employee("A", "excel")], &catalog, 3).unwrap();

        assert_eq!(records[0].suggestions.len(), 2);
        assert_eq!(records[0].suggestions[0].content, "excel");
    }

    #[test]
    fn ties_break_on_catalog_order() {
        let embedder = TableEmbedder { calls: Cell::new(0) };
        let catalog = vec![
            training("t1", "b"),
            training("t2", "a"),
            training("t3", "a-too"),
            training("t4", "a"),
        ];
        let records =
            generate_suggestions(&embedder, &[employee("A", "a")], &catalog, 3).unwrap();

        let kinds: Vec<&str> = records[0].suggestions.iter().map(|s| s.kind.as_str()).collect();
        assert_eq!(kinds, vec!["t2", "t3", "t4"]);
    }

    #[test]
    fn catalog_is_embedded_once() {
        let embedder = TableEmbedder { calls: Cell::new(0) };
        let catalog = vec![training("t1", "a"), training("t2", "b")];
        let employees = vec![employee("A", "a"), employee("B", "b"), employee("C", "a")];
        generate_suggestions(&embedder, &employees, &catalog, 3).unwrap();

        assert_eq!(embedder.calls.get(), catalog.len() + employees.len());
    }

    #[test]
    fn empty_catalog_is_rejected() {
        let embedder = HashEmbeddingProvider::default();
        let err = generate_suggestions(&embedder, &[employee("A", "x")], &[], 3).unwrap_err();
        assert!(matches!(err, RecoError::DataFormat(_)));
    }

    #[test]
    fn empty_evaluation_aborts_batch() {
        let embedder = HashEmbeddingProvider::default();
        let employees = vec![employee("A", "excel"), employee("B", "   ")];
        let err = generate_suggestions(&embedder, &employees, &catalog(), 3).unwrap_err();

        match err {
            RecoError::DataFormat(msg) => assert!(msg.contains("'B'")),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
