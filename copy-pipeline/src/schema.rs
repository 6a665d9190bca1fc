//! JSON-schema output constraints sent with every completion call.

use ai_llm_service::ResponseFormat;
use serde_json::json;

use crate::config::RESULT_SIZE;

pub const LIST_SCHEMA_NAME: &str = "ad_copy_response";
pub const SINGLE_SCHEMA_NAME: &str = "ad_copy_rewrite_response";

/// `{"adTexts": [3 strings]}`, each string bounded by `max_chars`.
pub fn ad_texts_format(max_chars: usize) -> ResponseFormat {
    ResponseFormat::json_schema(
        LIST_SCHEMA_NAME,
        json!({
            "type": "object",
            "additionalProperties": false,
            "properties": {
                "adTexts": {
                    "type": "array",
                    "minItems": RESULT_SIZE,
                    "maxItems": RESULT_SIZE,
                    "items": { "type": "string", "maxLength": max_chars }
                }
            },
            "required": ["adTexts"]
        }),
    )
}

/// `{"adText": string}` used by the rewrite loop.
pub fn ad_text_format(max_chars: usize) -> ResponseFormat {
    ResponseFormat::json_schema(
        SINGLE_SCHEMA_NAME,
        json!({
            "type": "object",
            "additionalProperties": false,
            "properties": {
                "adText": { "type": "string", "maxLength": max_chars }
            },
            "required": ["adText"]
        }),
    )
}
