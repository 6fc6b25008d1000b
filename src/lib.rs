pub mod config;
pub mod error;
pub mod ingest;
pub mod model;
pub mod modify;
pub mod options;
pub mod oracle;
pub mod prompts;
pub mod workflow;

// Re-export key types
pub use config::{OracleConfig, Provider, Settings};
pub use error::PromptsmithError;
pub use ingest::{
    ingest_files, ingest_files_with_report, CandidateFile, IngestReport, SkipReason, SkippedFile,
};
pub use model::{EncodedImage, PromptRecord, RecordState, RecordView};
pub use modify::{
    build_instruction, build_instruction_with_system, submit_modification,
    submit_modification_with_system, ModificationInstruction,
};
pub use options::{
    AspectRatio, Consistency, FacialExpression, FocalLength, ModificationMode,
    ModificationRequest, QualityOption, VisualStyle,
};
pub use oracle::{
    create_oracle, create_oracle_with_config, MockOracle, OracleCall, PromptOracle, RigOracle,
    SharedOracle,
};
pub use workflow::{BatchReport, GenerationOutcome, ReversePromptWorkflow};

/// Main interface: one oracle shared by the reverse-prompt workflow and the
/// prompt modifier.
#[derive(Clone)]
pub struct Promptsmith {
    oracle: SharedOracle,
    workflow: ReversePromptWorkflow,
    system_instruction: String,
}

impl Promptsmith {
    pub fn new(oracle: SharedOracle) -> Self {
        Self {
            workflow: ReversePromptWorkflow::new(oracle.clone()),
            oracle,
            system_instruction: prompts::REWRITE_SYSTEM_INSTRUCTION.to_string(),
        }
    }

    /// Build the oracle from settings; rewrites use the configured system instruction
    pub fn from_settings(settings: &Settings) -> Result<Self, PromptsmithError> {
        Ok(Self::new(settings.build_oracle()?)
            .with_system_instruction(settings.oracle.system_instruction.clone()))
    }

    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = instruction.into();
        self
    }

    pub fn system_instruction(&self) -> &str {
        &self.system_instruction
    }

    pub fn oracle(&self) -> SharedOracle {
        self.oracle.clone()
    }

    pub fn workflow(&self) -> &ReversePromptWorkflow {
        &self.workflow
    }

    /// Ingest files into the reverse-prompt workflow
    pub async fn ingest_files(
        &self,
        files: impl IntoIterator<Item = CandidateFile>,
    ) -> IngestReport {
        self.workflow.ingest(files).await
    }

    /// Build the rewrite instruction for `request` and submit it
    pub async fn modify(&self, request: &ModificationRequest) -> Result<String, PromptsmithError> {
        submit_modification_with_system(self.oracle.as_ref(), request, &self.system_instruction)
            .await
    }
}
