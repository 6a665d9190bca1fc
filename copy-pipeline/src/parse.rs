//! Decoding of completion contents into ad texts.
//!
//! Strict decode first; when the model wraps its JSON in prose or fences,
//! retry on the `{ .. }` span between the first `{` and the last `}`.
//! Failure is the [`Parsed::Unparsed`] sentinel, never an error.

use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parsed<T> {
    Parsed(T),
    Unparsed,
}

impl<T> Parsed<T> {
    /// Tries `f` only when `self` is `Unparsed`.
    pub fn or_else(self, f: impl FnOnce() -> Parsed<T>) -> Parsed<T> {
        match self {
            Parsed::Parsed(v) => Parsed::Parsed(v),
            Parsed::Unparsed => f(),
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Parsed::Parsed(v) => Some(v),
            Parsed::Unparsed => None,
        }
    }
}

#[derive(Deserialize)]
struct AdTextsPayload {
    #[serde(rename = "adTexts")]
    ad_texts: Vec<Option<String>>,
}

#[derive(Deserialize)]
struct AdTextPayload {
    #[serde(rename = "adText")]
    ad_text: String,
}

/// Decodes `{"adTexts": [..]}`. `null` entries are skipped.
pub fn parse_list(content: &str) -> Parsed<Vec<String>> {
    decode_list(content).or_else(|| match extract_json_object(content) {
        Some(span) => decode_list(span),
        None => Parsed::Unparsed,
    })
}

/// Decodes `{"adText": ".."}`.
pub fn parse_single(content: &str) -> Parsed<String> {
    decode_single(content).or_else(|| match extract_json_object(content) {
        Some(span) => decode_single(span),
        None => Parsed::Unparsed,
    })
}

/// Span from the first `{` to the last `}`, inclusive.
pub fn extract_json_object(s: &str) -> Option<&str> {
    let start = s.find('{')?;
    let end = s.rfind('}')?;
    (end > start).then(|| &s[start..=end])
}

fn decode_list(s: &str) -> Parsed<Vec<String>> {
    match serde_json::from_str::<AdTextsPayload>(s.trim()) {
        Ok(p) => Parsed::Parsed(p.ad_texts.into_iter().flatten().collect()),
        Err(_) => Parsed::Unparsed,
    }
}

fn decode_single(s: &str) -> Parsed<String> {
    match serde_json::from_str::<AdTextPayload>(s.trim()) {
        Ok(p) => Parsed::Parsed(p.ad_text),
        Err(_) => Parsed::Unparsed,
    }
}
