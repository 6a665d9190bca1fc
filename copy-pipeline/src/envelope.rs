use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// Uniform result of one generation: `ok:true` with three texts, or a soft
/// failure with a warning and no texts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdCopyResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    pub ad_texts: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseMeta {
    /// Wire name stays snake_case, unlike the rest of the envelope.
    #[serde(rename = "openai_status")]
    pub openai_status: u16,
}

impl AdCopyResponse {
    pub fn success(ad_texts: Vec<String>) -> Self {
        Self {
            ok: true,
            warning: None,
            ad_texts,
            detail: None,
            meta: None,
        }
    }

    pub fn failure(err: &PipelineError) -> Self {
        Self {
            ok: false,
            warning: Some(err.warning()),
            ad_texts: Vec::new(),
            detail: err.detail().map(str::to_string),
            meta: err
                .provider_status()
                .map(|openai_status| ResponseMeta { openai_status }),
        }
    }
}

impl From<Result<Vec<String>, PipelineError>> for AdCopyResponse {
    fn from(res: Result<Vec<String>, PipelineError>) -> Self {
        match res {
            Ok(texts) => Self::success(texts),
            Err(e) => Self::failure(&e),
        }
    }
}
