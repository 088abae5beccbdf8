use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use reco_core::{AppConfig, EmbedderKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EmbedderArg {
    /// Feature hashing, no model needed
    Hash,
    /// Local all-MiniLM-L6-v2
    Minilm,
    /// OpenAI-compatible /embeddings endpoint
    Openai,
}

impl From<EmbedderArg> for EmbedderKind {
    fn from(arg: EmbedderArg) -> Self {
        match arg {
            EmbedderArg::Hash => EmbedderKind::Hash,
            EmbedderArg::Minilm => EmbedderKind::MiniLm,
            EmbedderArg::Openai => EmbedderKind::OpenAi,
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "reco",
    version,
    about = "Training recommendations from employee evaluations, with HR question answering"
)]
pub struct Cli {
    /// TOML configuration file (defaults to ./reco.toml when present)
    #[arg(long, global = true, env = "RECO_CONFIG")]
    pub config: Option<PathBuf>,

    /// Embedding backend, overriding the configured one for both pipelines
    #[arg(long, global = true, value_enum)]
    pub embedder: Option<EmbedderArg>,

    /// all-MiniLM-L6-v2 weights (.safetensors)
    #[arg(long, global = true)]
    pub model_path: Option<PathBuf>,

    /// tokenizer.json matching --model-path
    #[arg(long, global = true)]
    pub tokenizer_path: Option<PathBuf>,

    /// BERT config.json matching --model-path
    #[arg(long, global = true)]
    pub model_config_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Score every evaluation against the training catalog and write the suggestions file
    Recommend {
        #[arg(long)]
        employees: Option<PathBuf>,
        #[arg(long)]
        trainings: Option<PathBuf>,
        #[arg(long)]
        output: Option<PathBuf>,
        #[arg(long)]
        top_n: Option<usize>,
    },
    /// Answer questions about the suggestions file (interactive unless --question is given)
    Ask {
        #[arg(long)]
        suggestions: Option<PathBuf>,
        #[arg(long)]
        question: Option<String>,
        #[arg(long, env = "RECO_CHAT_MODEL")]
        model: Option<String>,
        #[arg(long)]
        temperature: Option<f32>,
        #[arg(short, long)]
        k: Option<usize>,
        #[arg(long)]
        chunk_size: Option<usize>,
        #[arg(long)]
        chunk_overlap: Option<usize>,
    },
}

impl Cli {
    /// Layers command-line values over the file configuration.
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(embedder) = self.embedder {
            config.recommend.embedder = embedder.into();
            config.qa.embedder = embedder.into();
        }
        if let Some(p) = &self.model_path {
            config.minilm.model_path = p.clone();
        }
        if let Some(p) = &self.tokenizer_path {
            config.minilm.tokenizer_path = p.clone();
        }
        if let Some(p) = &self.model_config_path {
            config.minilm.config_path = p.clone();
        }

        match &self.command {
            Commands::Recommend {
                employees,
                trainings,
                output,
                top_n,
            } => {
                if let Some(p) = employees {
                    config.paths.employees = p.clone();
                }
                if let Some(p) = trainings {
                    config.paths.trainings = p.clone();
                }
                if let Some(p) = output {
                    config.paths.suggestions = p.clone();
                }
                if let Some(n) = top_n {
                    config.recommend.top_n = *n;
                }
            }
            Commands::Ask {
                suggestions,
                model,
                temperature,
                k,
                chunk_size,
                chunk_overlap,
                ..
            } => {
                if let Some(p) = suggestions {
                    config.paths.suggestions = p.clone();
                }
                if let Some(m) = model {
                    config.openai.chat_model = m.clone();
                }
                if let Some(t) = temperature {
                    config.openai.temperature = *t;
                }
                if let Some(k) = k {
                    config.qa.retrieval_k = *k;
                }
                if let Some(size) = chunk_size {
                    config.qa.chunk_size = *size;
                }
                if let Some(overlap) = chunk_overlap {
                    config.qa.chunk_overlap = *overlap;
                }
            }
        }
    }
}
