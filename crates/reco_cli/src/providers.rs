use anyhow::{Context, Result};
use reco_core::{
    AppConfig, ChatModel, EmbedderKind, EmbeddingProvider, HashEmbeddingProvider,
    MiniLmEmbeddingProvider, OpenAiClient,
};
use tracing::info;

pub fn make_embedder(kind: EmbedderKind, config: &AppConfig) -> Result<Box<dyn EmbeddingProvider>> {
    let provider: Box<dyn EmbeddingProvider> = match kind {
        EmbedderKind::Hash => Box::new(HashEmbeddingProvider::new(config.hash_dim)),
        EmbedderKind::MiniLm => {
            let minilm = &config.minilm;
            info!(model = %minilm.model_name, path = %minilm.model_path.display(), "loading embedding model");
            Box::new(
                MiniLmEmbeddingProvider::load(
                    &minilm.model_path,
                    &minilm.tokenizer_path,
                    &minilm.config_path,
                )
                .with_context(|| format!("load {}", minilm.model_name))?,
            )
        }
        EmbedderKind::OpenAi => Box::new(openai_client(config)?),
    };
    Ok(provider)
}

pub fn make_chat_model(config: &AppConfig) -> Result<Box<dyn ChatModel>> {
    Ok(Box::new(openai_client(config)?))
}

fn openai_client(config: &AppConfig) -> Result<OpenAiClient> {
    let settings = config.openai.resolve()?;
    OpenAiClient::new(settings).context("create OpenAI client")
}
