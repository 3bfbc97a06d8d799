pub mod analyzer;
pub mod config;
pub mod error;
pub mod interpreter;
pub mod prompt;
pub mod transport;

pub use analyzer::{AnalysisResult, AnalysisService, CancelSignal};
pub use config::{Credentials, LLMConfig};
pub use error::{AnalysisError, ErrorKind};
pub use prompt::AnalysisIntent;
pub use transport::{AnalysisStatus, ChatTransport, HttpTransport, StatusSink};

#[cfg(test)]
pub(crate) mod testing;
