//! Failure taxonomy of the analysis workflow.

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

/// Longest payload fragment kept in an error, in characters.
pub const MAX_EXCERPT_CHARS: usize = 500;

/// Coarse classification of an [`AnalysisError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidIntent,
    MissingCredentials,
    Timeout,
    HttpError,
    NetworkError,
    MalformedResponse,
    UnexpectedShape,
    EmptyResponse,
    Cancelled,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidIntent => "invalid_intent",
            Self::MissingCredentials => "missing_credentials",
            Self::Timeout => "timeout",
            Self::HttpError => "http_error",
            Self::NetworkError => "network_error",
            Self::MalformedResponse => "malformed_response",
            Self::UnexpectedShape => "unexpected_shape",
            Self::EmptyResponse => "empty_response",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Everything that can go wrong between a query and an answer.
///
/// The messages are shown to the user verbatim.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AnalysisError {
    #[error("Tipo de análisis no válido: {0}")]
    InvalidIntent(String),

    #[error(
        "La funcionalidad de IA no está disponible. Configura tu token de OpenRouter \
         (OPENROUTER_API_KEY) en el archivo .env"
    )]
    MissingCredentials,

    #[error("La solicitud excedió el tiempo máximo de espera ({limit_secs}s, transcurridos {elapsed_secs:.2}s).")]
    Timeout { limit_secs: u64, elapsed_secs: f64 },

    #[error("Error de la API: HTTP {status}{}", body_suffix(.body_excerpt))]
    HttpError {
        status: u16,
        body_excerpt: Option<String>,
    },

    #[error("Error de red: {detail}")]
    NetworkError { detail: String },

    #[error("Error al decodificar la respuesta JSON de la API: {detail} - Datos: {excerpt}")]
    MalformedResponse { detail: String, excerpt: String },

    #[error("Estructura de respuesta inesperada de la API en '{path}' - Datos: {excerpt}")]
    UnexpectedShape { path: String, excerpt: String },

    #[error("Respuesta vacía de la API: no se recibió ninguna opción")]
    EmptyResponse,

    #[error("Cancelado por usuario")]
    Cancelled,
}

fn body_suffix(body: &Option<String>) -> String {
    match body {
        Some(text) if !text.is_empty() => format!(" - {}", text),
        _ => String::new(),
    }
}

impl AnalysisError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidIntent(_) => ErrorKind::InvalidIntent,
            Self::MissingCredentials => ErrorKind::MissingCredentials,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::HttpError { .. } => ErrorKind::HttpError,
            Self::NetworkError { .. } => ErrorKind::NetworkError,
            Self::MalformedResponse { .. } => ErrorKind::MalformedResponse,
            Self::UnexpectedShape { .. } => ErrorKind::UnexpectedShape,
            Self::EmptyResponse => ErrorKind::EmptyResponse,
            Self::Cancelled => ErrorKind::Cancelled,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpError { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl Serialize for AnalysisError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("AnalysisError", 3)?;
        state.serialize_field("kind", &self.kind())?;
        state.serialize_field("status", &self.status())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Cut `text` down to [`MAX_EXCERPT_CHARS`] characters.
pub fn excerpt(text: &str) -> String {
    match text.char_indices().nth(MAX_EXCERPT_CHARS) {
        Some((cut, _)) => format!("{}…", &text[..cut]),
        None => text.to_string(),
    }
}
