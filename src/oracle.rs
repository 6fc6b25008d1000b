//! Client for the generative model that writes and rewrites prompts.
//!
//! `RigOracle` works with ANY model implementing rig-core's `CompletionModel`
//! trait (Gemini, OpenAI, OpenRouter, Anthropic, ...). Every call is a single
//! request/response: no streaming, no retries, no caching.
//!
//! # Example
//! ```ignore
//! use rig::client::CompletionClient;
//! use rig::providers::gemini;
//! use promptsmith::oracle::create_oracle;
//!
//! let client = gemini::Client::from_env();
//! let oracle = create_oracle(client.completion_model("gemini-2.5-flash"));
//! ```

use async_trait::async_trait;
use rig::{
    completion::{
        message::MimeType, AssistantContent, CompletionModel, CompletionRequestBuilder,
    },
    message::{ImageDetail, ImageMediaType, Message, UserContent},
    OneOrMany,
};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, Semaphore};
use tracing::debug;

use crate::config::OracleConfig;
use crate::error::PromptsmithError;

/// The two operations the rest of the crate needs from a model.
#[async_trait]
pub trait PromptOracle: Send + Sync {
    /// Generate a reverse prompt for a base64 encoded image
    async fn describe_image(
        &self,
        base64_data: &str,
        mime_type: &str,
    ) -> Result<String, PromptsmithError>;

    /// Rewrite a prompt given a system instruction and the constructed user instruction
    async fn rewrite_text(
        &self,
        system_instruction: &str,
        user_instruction: &str,
    ) -> Result<String, PromptsmithError>;
}

/// Oracle backed by a rig-core `CompletionModel`.
pub struct RigOracle<M: CompletionModel> {
    model: Arc<M>,
    config: OracleConfig,
}

impl<M: CompletionModel> RigOracle<M> {
    pub fn new(model: M) -> Self {
        Self::with_config(model, OracleConfig::default())
    }

    pub fn with_config(model: M, config: OracleConfig) -> Self {
        Self {
            model: Arc::new(model),
            config,
        }
    }

    pub fn config(&self) -> &OracleConfig {
        &self.config
    }

    fn build_request(&self, content: OneOrMany<UserContent>) -> CompletionRequestBuilder<M> {
        let mut builder = self.model.completion_request(Message::User { content });

        if let Some(temperature) = self.config.temperature {
            builder = builder.temperature(temperature);
        }
        if let Some(max_tokens) = self.config.max_tokens {
            builder = builder.max_tokens(max_tokens);
        }

        builder
    }

    async fn send(
        &self,
        builder: CompletionRequestBuilder<M>,
        action: &str,
    ) -> Result<String, PromptsmithError> {
        self.model
            .completion(builder.build())
            .await
            .map(|r| extract_text_from_response(&r.choice))
            .map_err(|e| PromptsmithError::LlmError(format!("Failed to {}: {}", action, e)))
    }
}

/// Join the text parts of an assistant response
fn extract_text_from_response(content: &OneOrMany<AssistantContent>) -> String {
    content
        .iter()
        .filter_map(|c| match c {
            AssistantContent::Text(text) => Some(text.text.clone()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Map a MIME type to rig's media type. Types rig does not know stay unlabelled.
fn image_media_type(mime_type: &str) -> Option<ImageMediaType> {
    match mime_type.trim().to_lowercase().as_str() {
        "image/jpg" | "image/pjpeg" => Some(ImageMediaType::JPEG),
        other => ImageMediaType::from_mime_type(other),
    }
}

#[async_trait]
impl<M: CompletionModel + Send + Sync + 'static> PromptOracle for RigOracle<M> {
    async fn describe_image(
        &self,
        base64_data: &str,
        mime_type: &str,
    ) -> Result<String, PromptsmithError> {
        let media_type = image_media_type(mime_type);
        if media_type.is_none() {
            debug!(mime_type, "no provider media type for image, sending unlabelled");
        }
        let mut content = OneOrMany::one(UserContent::image_base64(
            base64_data.to_string(),
            media_type,
            Some(ImageDetail::Auto),
        ));
        content.push(UserContent::text(&self.config.caption_instruction));

        debug!(mime_type, bytes = base64_data.len(), "describe_image request");
        self.send(self.build_request(content), "generate prompt")
            .await
    }

    async fn rewrite_text(
        &self,
        system_instruction: &str,
        user_instruction: &str,
    ) -> Result<String, PromptsmithError> {
        let content = OneOrMany::one(UserContent::text(user_instruction));
        let builder = self
            .build_request(content)
            .preamble(system_instruction.to_string());

        debug!(chars = user_instruction.chars().count(), "rewrite_text request");
        self.send(builder, "modify prompt").await
    }
}

/// One call received by a [`MockOracle`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OracleCall {
    DescribeImage { base64: String, mime_type: String },
    RewriteText { system: String, user: String },
}

/// A scripted oracle for tests.
///
/// Records every call and tracks how many requests are in flight at once.
/// A hold gate makes `describe_image` wait for [`MockOracle::release`].
pub struct MockOracle {
    pub image_response: String,
    pub text_response: String,
    fail_all: Option<String>,
    fail_content: HashSet<String>,
    delay: Option<Duration>,
    gate: Option<Semaphore>,
    calls: Mutex<Vec<OracleCall>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockOracle {
    pub fn new() -> Self {
        Self {
            image_response: "A mock reverse prompt".to_string(),
            text_response: "A mock rewritten prompt".to_string(),
            fail_all: None,
            fail_content: HashSet::new(),
            delay: None,
            gate: None,
            calls: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn with_image_response(mut self, response: impl Into<String>) -> Self {
        self.image_response = response.into();
        self
    }

    pub fn with_text_response(mut self, response: impl Into<String>) -> Self {
        self.text_response = response.into();
        self
    }

    /// Fail every call with the given message
    pub fn with_failure(mut self, message: impl Into<String>) -> Self {
        self.fail_all = Some(message.into());
        self
    }

    /// Fail `describe_image` only for this exact base64 content
    pub fn with_failure_for(mut self, base64: impl Into<String>) -> Self {
        self.fail_content.insert(base64.into());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Block `describe_image` calls until permits are released
    pub fn with_hold(mut self) -> Self {
        self.gate = Some(Semaphore::new(0));
        self
    }

    /// Let `count` held calls complete
    pub fn release(&self, count: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(count);
        }
    }

    pub async fn calls(&self) -> Vec<OracleCall> {
        self.calls.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    async fn enter(&self, call: OracleCall) {
        self.calls.lock().await.push(call);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
    }

    fn leave(&self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }

    async fn wait(&self) -> Result<(), PromptsmithError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(gate) = &self.gate {
            gate.acquire()
                .await
                .map_err(|e| PromptsmithError::LlmError(e.to_string()))?
                .forget();
        }
        Ok(())
    }
}

impl Default for MockOracle {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PromptOracle for MockOracle {
    async fn describe_image(
        &self,
        base64_data: &str,
        mime_type: &str,
    ) -> Result<String, PromptsmithError> {
        self.enter(OracleCall::DescribeImage {
            base64: base64_data.to_string(),
            mime_type: mime_type.to_string(),
        })
        .await;
        let waited = self.wait().await;
        self.leave();
        waited?;

        if let Some(message) = &self.fail_all {
            return Err(PromptsmithError::LlmError(message.clone()));
        }
        if self.fail_content.contains(base64_data) {
            return Err(PromptsmithError::LlmError(format!(
                "mock failure for {} image",
                mime_type
            )));
        }
        Ok(self.image_response.clone())
    }

    async fn rewrite_text(
        &self,
        system_instruction: &str,
        user_instruction: &str,
    ) -> Result<String, PromptsmithError> {
        self.enter(OracleCall::RewriteText {
            system: system_instruction.to_string(),
            user: user_instruction.to_string(),
        })
        .await;
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.leave();

        match &self.fail_all {
            Some(message) => Err(PromptsmithError::LlmError(message.clone())),
            None => Ok(self.text_response.clone()),
        }
    }
}

/// Type alias for an oracle that can be shared across tasks
pub type SharedOracle = Arc<dyn PromptOracle>;

/// Helper function to create a shared oracle from any CompletionModel
pub fn create_oracle<M: CompletionModel + Send + Sync + 'static>(model: M) -> SharedOracle {
    Arc::new(RigOracle::new(model))
}

/// Helper function to create a shared oracle with custom config
pub fn create_oracle_with_config<M: CompletionModel + Send + Sync + 'static>(
    model: M,
    config: OracleConfig,
) -> SharedOracle {
    Arc::new(RigOracle::with_config(model, config))
}
