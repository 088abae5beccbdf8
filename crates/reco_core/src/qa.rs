use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::chunk::{RecursiveCharacterSplitter, DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE};
use crate::document::Document;
use crate::embed::EmbeddingProvider;
use crate::error::{RecoError, Result};
use crate::index::{SearchHit, VectorIndex};
use crate::llm::ChatModel;
use crate::prompt::PromptTemplate;

pub const DEFAULT_RETRIEVAL_K: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QaSettings {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub retrieval_k: usize,
}

impl Default for QaSettings {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            retrieval_k: DEFAULT_RETRIEVAL_K,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QaStats {
    pub indexed_chunks: usize,
    pub questions_answered: usize,
    pub questions_failed: usize,
}

/// Question answering over a fixed set of documents.
///
/// Lifecycle: [`QaService::build`] chunks, embeds and indexes the documents
/// once; [`QaService::answer`] serves any number of questions against that
/// index; [`QaService::shutdown`] consumes the service and reports what it did.
pub struct QaService {
    embedder: Box<dyn EmbeddingProvider>,
    index: Box<dyn VectorIndex>,
    llm: Box<dyn ChatModel>,
    prompt: PromptTemplate,
    retrieval_k: usize,
    cancel: CancellationToken,
    stats: QaStats,
}

impl QaService {
    pub fn build(
        documents: &[Document],
        embedder: Box<dyn EmbeddingProvider>,
        mut index: Box<dyn VectorIndex>,
        llm: Box<dyn ChatModel>,
        settings: QaSettings,
    ) -> Result<Self> {
        if settings.retrieval_k == 0 {
            return Err(RecoError::Configuration(
                "retrieval k must be at least 1".to_string(),
            ));
        }

        let splitter = RecursiveCharacterSplitter::new(settings.chunk_size, settings.chunk_overlap)?;
        let chunks = splitter.split_documents(documents);
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let embeddings = embedder.embed_batch(&texts)?;
        if embeddings.len() != chunks.len() {
            return Err(RecoError::ExternalService(format!(
                "expected {} chunk embeddings, got {}",
                chunks.len(),
                embeddings.len()
            )));
        }

        for (chunk, embedding) in chunks.into_iter().zip(embeddings) {
            index.insert(chunk, embedding)?;
        }
        info!(
            documents = documents.len(),
            chunks = index.len(),
            chunk_size = splitter.chunk_size(),
            chunk_overlap = splitter.chunk_overlap(),
            "question answering index built"
        );

        let stats = QaStats {
            indexed_chunks: index.len(),
            questions_answered: 0,
            questions_failed: 0,
        };
        Ok(Self {
            embedder,
            index,
            llm,
            prompt: PromptTemplate::default(),
            retrieval_k: settings.retrieval_k,
            cancel: CancellationToken::new(),
            stats,
        })
    }

    pub fn with_prompt(mut self, prompt: PromptTemplate) -> Self {
        self.prompt = prompt;
        self
    }

    /// Cancelling this token aborts the in-flight and every later LLM call.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn stats(&self) -> QaStats {
        self.stats
    }

    pub fn retrieve(&self, question: &str) -> Result<Vec<SearchHit<'_>>> {
        let query = self.embedder.embed(question)?;
        Ok(self.index.search(&query, self.retrieval_k))
    }

    /// Returns the model's reply verbatim.
    pub fn answer(&mut self, question: &str) -> Result<String> {
        let result = self.answer_inner(question);
        match &result {
            Ok(_) => self.stats.questions_answered += 1,
            Err(_) => self.stats.questions_failed += 1,
        }
        result
    }

    fn answer_inner(&self, question: &str) -> Result<String> {
        let hits = self.retrieve(question)?;
        debug!(
            hits = hits.len(),
            employes = ?hits.iter().map(|h| h.chunk.employe.as_str()).collect::<Vec<_>>(),
            "context retrieved"
        );

        let context = hits
            .iter()
            .map(|hit| hit.chunk.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        let prompt = self.prompt.render(&context, question);
        self.llm.complete(&prompt, &self.cancel.child_token())
    }

    pub fn shutdown(self) -> QaStats {
        self.cancel.cancel();
        info!(
            answered = self.stats.questions_answered,
            failed = self.stats.questions_failed,
            "question answering service stopped"
        );
        self.stats
    }
}
