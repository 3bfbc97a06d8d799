use serde_json::Value;

use super::error::{excerpt, AnalysisError};

/// Pull the answer text out of a chat-completion body.
///
/// Expects `{"choices": [{"message": {"content": "..."}}]}`. The content is
/// trimmed and otherwise returned untouched.
pub fn interpret(body: &Value) -> Result<String, AnalysisError> {
    let choices = body
        .get("choices")
        .and_then(Value::as_array)
        .ok_or_else(|| unexpected("choices", body))?;

    let first = choices.first().ok_or(AnalysisError::EmptyResponse)?;

    let message = first
        .get("message")
        .filter(|message| message.is_object())
        .ok_or_else(|| unexpected("choices[0].message", body))?;

    let content = message
        .get("content")
        .and_then(Value::as_str)
        .ok_or_else(|| unexpected("choices[0].message.content", body))?;

    Ok(content.trim().to_string())
}

fn unexpected(path: &str, body: &Value) -> AnalysisError {
    AnalysisError::UnexpectedShape {
        path: path.to_string(),
        excerpt: excerpt(&body.to_string()),
    }
}
