//! Parse reasoning service output into an answer

use crate::error::PipelineError;
use serde_json::Value;
use tracing::debug;

/// Answer fields recovered from a reasoning response
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedAnswer {
    /// Answer text
    pub answer: String,
    /// Certainty stated in the response body, if any
    pub certainty: Option<f64>,
    /// Explanation, empty when none was given
    pub justification: String,
}

/// Parse a reasoning response
///
/// JSON objects must carry a non-empty `answer`; `confidence` and
/// `reasoning` (or `justification`) are optional. Plain prose is accepted as
/// the answer. Empty output and JSON that does not parse are errors.
pub fn parse_reasoner_output(response: &str) -> Result<ParsedAnswer, PipelineError> {
    let body = strip_code_fence(response.trim());
    if body.is_empty() {
        return Err(PipelineError::Reasoning("empty response".to_string()));
    }

    if !body.starts_with('{') {
        debug!(chars = body.len(), "Reasoning response is prose");
        return Ok(ParsedAnswer {
            answer: body.to_string(),
            certainty: None,
            justification: String::new(),
        });
    }

    let json: Value = serde_json::from_str(body)
        .map_err(|e| PipelineError::Reasoning(format!("malformed JSON response: {}", e)))?;
    let obj = json
        .as_object()
        .ok_or_else(|| PipelineError::Reasoning("expected a JSON object".to_string()))?;

    let answer = obj
        .get("answer")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .ok_or_else(|| PipelineError::Reasoning("missing or empty 'answer'".to_string()))?
        .to_string();

    let certainty = obj.get("confidence").and_then(parse_certainty);

    let justification = ["reasoning", "justification"]
        .iter()
        .find_map(|key| obj.get(*key).and_then(Value::as_str))
        .unwrap_or_default()
        .trim()
        .to_string();

    Ok(ParsedAnswer {
        answer,
        certainty,
        justification,
    })
}

/// Numbers or numeric strings; values in `(1, 100]` are read as percentages
fn parse_certainty(value: &Value) -> Option<f64> {
    let raw = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse().ok()?,
        _ => return None,
    };
    if !raw.is_finite() || raw < 0.0 {
        return None;
    }
    let scaled = if raw > 1.0 && raw <= 100.0 { raw / 100.0 } else { raw };
    Some(scaled.clamp(0.0, 1.0))
}

/// Drop a surrounding markdown code fence
fn strip_code_fence(text: &str) -> &str {
    if !text.starts_with("```") {
        return text;
    }
    let inner = match text.find('\n') {
        Some(i) => &text[i + 1..],
        None => return "",
    };
    inner.trim_end().trim_end_matches("```").trim()
}
