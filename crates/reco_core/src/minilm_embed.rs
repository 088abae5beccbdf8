//! Local sentence embeddings with all-MiniLM-L6-v2 (BERT, 384 dims), mean
//! pooled over the attention mask and L2 normalised.

use std::fs;
use std::path::Path;

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config};
use tokenizers::{Tokenizer, TruncationParams};
use tracing::info;

use crate::embed::EmbeddingProvider;
use crate::error::{RecoError, Result};

pub const DEFAULT_MODEL_NAME: &str = "all-MiniLM-L6-v2";
/// Longer inputs are cut to this many tokens, the model's trained sequence length.
pub const MAX_SEQ_LENGTH: usize = 256;

pub struct MiniLmEmbeddingProvider {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
}

impl MiniLmEmbeddingProvider {
    pub fn load(model_path: &Path, tokenizer_path: &Path, config_path: &Path) -> Result<Self> {
        for path in [model_path, tokenizer_path, config_path] {
            if !path.exists() {
                return Err(RecoError::Configuration(format!(
                    "model file not found: {}",
                    path.display()
                )));
            }
        }

        let device = Device::Cpu;
        let config: Config = serde_json::from_str(&fs::read_to_string(config_path)?)?;
        let weights = fs::read(model_path)?;
        let vb = VarBuilder::from_buffered_safetensors(weights, DType::F32, &device)?;
        let model = BertModel::load(vb, &config)?;

        let mut tokenizer = Tokenizer::from_file(tokenizer_path)
            .map_err(|e| RecoError::Configuration(format!("load tokenizer: {e}")))?;
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: MAX_SEQ_LENGTH,
                ..Default::default()
            }))
            .map_err(|e| RecoError::Configuration(format!("tokenizer truncation: {e}")))?;

        info!(model = %model_path.display(), "sentence embedding model loaded");
        Ok(Self {
            model,
            tokenizer,
            device,
        })
    }
}

impl EmbeddingProvider for MiniLmEmbeddingProvider {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| RecoError::ExternalService(format!("tokenize: {e}")))?;

        let input_ids = Tensor::new(encoding.get_ids(), &self.device)?.unsqueeze(0)?;
        let token_type_ids = input_ids.zeros_like()?;
        let attention_mask = Tensor::new(encoding.get_attention_mask(), &self.device)?.unsqueeze(0)?;

        // (1, seq_len, hidden)
        let hidden = self
            .model
            .forward(&input_ids, &token_type_ids, Some(&attention_mask))?;

        let mask = attention_mask.to_dtype(DType::F32)?.unsqueeze(2)?;
        let summed = hidden.broadcast_mul(&mask)?.sum(1)?;
        let counts = mask.sum(1)?;
        let pooled = summed.broadcast_div(&counts)?.squeeze(0)?;

        let norm_val: f32 = pooled.sqr()?.sum_all()?.sqrt()?.to_scalar()?;
        let normalized = if norm_val > 0.0 {
            pooled.affine(1.0 / norm_val as f64, 0.0)?
        } else {
            pooled
        };

        Ok(normalized.to_vec1::<f32>()?)
    }
}
