pub mod chunk;
pub mod config;
pub mod document;
pub mod embed;
pub mod error;
pub mod index;
pub mod llm;
pub mod minilm_embed;
pub mod model;
pub mod openai;
pub mod prompt;
pub mod qa;
pub mod recommend;
pub mod session;
pub mod similarity;
pub mod storage;

pub use chunk::{Chunk, RecursiveCharacterSplitter, DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE};
pub use config::{AppConfig, EmbedderKind};
pub use document::{build_documents, documents_from_values, render_document, Document};
pub use embed::{EmbeddingProvider, HashEmbeddingProvider};
pub use error::{RecoError, Result};
pub use index::{FlatIndex, SearchHit, VectorIndex};
pub use llm::ChatModel;
pub use minilm_embed::MiniLmEmbeddingProvider;
pub use model::{EmployeeRecord, Suggestion, SuggestionRecord, TrainingRecord};
pub use openai::{OpenAiClient, OpenAiSettings};
pub use prompt::{PromptTemplate, HR_ASSISTANT_TEMPLATE};
pub use qa::{QaService, QaSettings, QaStats, DEFAULT_RETRIEVAL_K};
pub use recommend::{generate_suggestions, Recommender, DEFAULT_TOP_N};
pub use session::{run_session, Answerer, BufReadSource, LineSource, SessionSummary};
pub use similarity::{cosine_similarity, rank_top_k};
pub use storage::{load_employees, load_suggestions, load_trainings, save_suggestions};
pub use tokio_util::sync::CancellationToken;
