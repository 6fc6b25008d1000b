use std::error::Error;
use std::fmt;
use std::io;

#[derive(Debug)]
pub enum PromptsmithError {
    Io(io::Error),
    InvalidFile(String),
    UnsupportedFormat(String),
    Validation(String),
    LlmError(String),
    Config(String),
    Serialization(String),
    BatchInProgress,
}

impl fmt::Display for PromptsmithError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PromptsmithError::Io(err) => write!(
                f,
                "IO error: {} - Please check file permissions and path",
                err
            ),
            PromptsmithError::InvalidFile(msg) => write!(
                f,
                "Invalid file: {} - Please verify the file exists and is readable",
                msg
            ),
            PromptsmithError::UnsupportedFormat(msg) => write!(
                f,
                "Unsupported format: {} - Only image/* files can be described",
                msg
            ),
            PromptsmithError::Validation(msg) => write!(f, "Validation error: {}", msg),
            PromptsmithError::LlmError(msg) => write!(
                f,
                "LLM error: {} - Please check your API configuration",
                msg
            ),
            PromptsmithError::Config(msg) => write!(
                f,
                "Configuration error: {} - Please check your config file and environment",
                msg
            ),
            PromptsmithError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            PromptsmithError::BatchInProgress => write!(
                f,
                "A batch generation is already running - Wait for it to finish"
            ),
        }
    }
}

impl Error for PromptsmithError {}

impl From<io::Error> for PromptsmithError {
    fn from(error: io::Error) -> Self {
        PromptsmithError::Io(error)
    }
}

impl From<toml::de::Error> for PromptsmithError {
    fn from(error: toml::de::Error) -> Self {
        PromptsmithError::Config(error.to_string())
    }
}

impl From<serde_json::Error> for PromptsmithError {
    fn from(error: serde_json::Error) -> Self {
        PromptsmithError::Serialization(error.to_string())
    }
}

impl From<String> for PromptsmithError {
    fn from(error: String) -> Self {
        PromptsmithError::LlmError(error)
    }
}

impl From<&str> for PromptsmithError {
    fn from(error: &str) -> Self {
        PromptsmithError::LlmError(error.to_string())
    }
}
