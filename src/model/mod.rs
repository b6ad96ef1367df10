pub(crate) mod embedder;
pub(crate) mod emotion_model;

use std::path::Path;

use crate::error::CaptionError;

fn load_session(
    model_path: &str,
    context: &'static str,
) -> Result<ort::session::Session, CaptionError> {
    ort::session::Session::builder()
        .map_err(|e| CaptionError::model(context, e))?
        .with_execution_providers([ort::ep::CPU::default().build()])
        .map_err(|e| CaptionError::model(context, e))?
        .commit_from_file(Path::new(model_path))
        .map_err(|e| CaptionError::model(context, e))
}

fn load_tokenizer(
    tokenizer_path: &str,
    context: &'static str,
) -> Result<tokenizers::Tokenizer, CaptionError> {
    tokenizers::Tokenizer::from_file(tokenizer_path).map_err(|e| CaptionError::model(context, e))
}

/// Encodes text into input ids and an attention mask, widened to the i64
/// tensors transformer exports expect.
fn encode(
    tokenizer: &tokenizers::Tokenizer,
    text: &str,
    context: &'static str,
) -> Result<(Vec<i64>, Vec<i64>), CaptionError> {
    let encoding = tokenizer
        .encode(text, true)
        .map_err(|e| CaptionError::model(context, e))?;
    let ids = encoding.get_ids().iter().map(|&i| i as i64).collect();
    let mask = encoding
        .get_attention_mask()
        .iter()
        .map(|&m| m as i64)
        .collect();
    Ok((ids, mask))
}
