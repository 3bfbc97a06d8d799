use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::AnalysisError;

pub const SYSTEM_PROMPT_RECOMMENDATIONS: &str = "Eres un experto analista de SQL. Debes evaluar consultas SQL y \
proporcionar recomendaciones detalladas en español sobre optimización, buenas prácticas y posibles mejoras. \
Sé específico y profesional en tus respuestas. Formatea la respuesta para que sea compatible en una terminal, \
ya que el resultado o el mensaje respuesta se muestra en la terminal";

pub const SYSTEM_PROMPT_EXPLANATION: &str = "Eres un experto explicando consultas SQL a desarrolladores. \
Explica en detalle cómo funciona la consulta SQL proporcionada, paso a paso, de forma clara y concisa en español. \
Formatea la respuesta para que sea compatible en una terminal, ya que el resultado o el mensaje respuesta se \
muestra en la terminal";

/// Which AI task a request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisIntent {
    Recommendations,
    Explanation,
}

impl AnalysisIntent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Recommendations => "recommendations",
            Self::Explanation => "explanation",
        }
    }

    fn system_prompt(&self) -> &'static str {
        match self {
            Self::Recommendations => SYSTEM_PROMPT_RECOMMENDATIONS,
            Self::Explanation => SYSTEM_PROMPT_EXPLANATION,
        }
    }

    fn instruction(&self) -> &'static str {
        match self {
            Self::Recommendations => {
                "Por favor analiza la siguiente consulta SQL y proporciona recomendaciones concisas para mejorarla:"
            }
            Self::Explanation => "Explica en detalle cómo funciona esta consulta SQL:",
        }
    }
}

impl fmt::Display for AnalysisIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalysisIntent {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "recommendations" => Ok(Self::Recommendations),
            "explanation" => Ok(Self::Explanation),
            _ => Err(AnalysisError::InvalidIntent(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

/// Body of a chat-completion call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
}

/// Build the system/user message pair for `intent`, embedding `query` verbatim.
pub fn build_request(model: &str, query: &str, intent: AnalysisIntent) -> ChatRequest {
    let user_prompt = format!("{}\n\n```sql\n{}\n```", intent.instruction(), query);

    ChatRequest {
        model: model.to_string(),
        messages: vec![
            ChatMessage {
                role: Role::System,
                content: intent.system_prompt().to_string(),
            },
            ChatMessage {
                role: Role::User,
                content: user_prompt,
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::error::ErrorKind;

    #[test]
    fn recommendations_request_has_system_then_user() {
        let request = build_request("m", "select * from users", AnalysisIntent::Recommendations);

        assert_eq!(request.model, "m");
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, Role::System);
        assert_eq!(request.messages[0].content, SYSTEM_PROMPT_RECOMMENDATIONS);
        assert_eq!(request.messages[1].role, Role::User);
        assert_eq!(
            request.messages[1].content,
            "Por favor analiza la siguiente consulta SQL y proporciona recomendaciones concisas para mejorarla:\n\n```sql\nselect * from users\n```"
        );
    }

    #[test]
    fn explanation_embeds_query_verbatim() {
        let query = "SELECT a,\n  b FROM t WHERE x = '  ```  '";
        let request = build_request("m", query, AnalysisIntent::Explanation);

        assert_eq!(request.messages[0].content, SYSTEM_PROMPT_EXPLANATION);
        assert!(request.messages[1]
            .content
            .starts_with("Explica en detalle cómo funciona esta consulta SQL:"));
        assert!(request.messages[1].content.contains(query));
    }

    #[test]
    fn build_is_deterministic() {
        let a = build_request("m", "select 1", AnalysisIntent::Explanation);
        let b = build_request("m", "select 1", AnalysisIntent::Explanation);
        assert_eq!(a, b);
    }

    #[test]
    fn serializes_to_wire_shape() {
        let request = build_request("m", "select 1", AnalysisIntent::Recommendations);
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["model"], "m");
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1]["role"], "user");
    }

    #[test]
    fn parses_intent_names() {
        assert_eq!("recommendations".parse::<AnalysisIntent>().unwrap(), AnalysisIntent::Recommendations);
        assert_eq!(" Explanation ".parse::<AnalysisIntent>().unwrap(), AnalysisIntent::Explanation);

        let err = "summary".parse::<AnalysisIntent>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidIntent);
    }
}
