//! Inbound request and its validated form.

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

pub const PRODUCT_LABEL: &str = "제품명(product)";
pub const BENEFIT_LABEL: &str = "핵심 베네핏(benefit)";
pub const PAIN_POINT_LABEL: &str = "타겟 상황/고통(painPoint)";

/// Wire shape of `POST /api/generate`.
///
/// Every field is optional on the wire so a missing field is reported as
/// [`PipelineError::RequestInvalid`] instead of a decode error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    #[serde(default)]
    pub product: Option<String>,
    #[serde(default)]
    pub benefit: Option<String>,
    #[serde(default)]
    pub pain_point: Option<String>,
    #[serde(default)]
    pub promotion: Option<String>,
    #[serde(default)]
    pub tone_guide: Option<String>,
}

/// Trimmed request with every required field present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdBrief {
    pub product: String,
    pub benefit: String,
    pub pain_point: String,
    pub promotion: Option<String>,
    pub tone_guide: Option<String>,
}

impl TryFrom<&GenerationRequest> for AdBrief {
    type Error = PipelineError;

    fn try_from(req: &GenerationRequest) -> Result<Self, Self::Error> {
        let product = non_blank(&req.product);
        let benefit = non_blank(&req.benefit);
        let pain_point = non_blank(&req.pain_point);

        let mut missing = Vec::new();
        if product.is_none() {
            missing.push(PRODUCT_LABEL);
        }
        if benefit.is_none() {
            missing.push(BENEFIT_LABEL);
        }
        if pain_point.is_none() {
            missing.push(PAIN_POINT_LABEL);
        }

        match (product, benefit, pain_point) {
            (Some(product), Some(benefit), Some(pain_point)) => Ok(Self {
                product,
                benefit,
                pain_point,
                promotion: non_blank(&req.promotion),
                tone_guide: non_blank(&req.tone_guide),
            }),
            _ => Err(PipelineError::RequestInvalid { missing }),
        }
    }
}

fn non_blank(v: &Option<String>) -> Option<String> {
    v.as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
